//! Cache Entry Module
//!
//! Defines the persisted record for a single cached payload.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cache::clock::duration_ms;

// == Cache Entry ==
/// A payload plus the timestamps that govern its lifetime.
///
/// Serialized as `{"payload": ..., "createdAt": ..., "expiresAt": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    /// The stored value
    pub payload: T,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: i64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: i64,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry written at `now_ms` that lives for `ttl`.
    pub fn new(payload: T, now_ms: i64, ttl: Duration) -> Self {
        Self {
            payload,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(duration_ms(ttl)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry is live only while `now_ms < expires_at`; at the expiry
    /// instant it is already gone.
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at
    }

    // == Time To Live ==
    /// Returns remaining lifetime in milliseconds, 0 once expired.
    pub fn ttl_remaining_ms(&self, now_ms: i64) -> u64 {
        u64::try_from(self.expires_at.saturating_sub(now_ms)).unwrap_or(0)
    }

    /// Returns remaining lifetime in whole seconds.
    pub fn ttl_remaining(&self, now_ms: i64) -> u64 {
        self.ttl_remaining_ms(now_ms) / 1000
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde::de::IgnoredAny;

    const NOW: i64 = 1_700_000_000_000;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("hello".to_string(), NOW, Duration::from_secs(60));

        assert_eq!(entry.payload, "hello");
        assert_eq!(entry.created_at, NOW);
        assert_eq!(entry.expires_at, NOW + 60_000);
        assert!(!entry.is_expired_at(NOW));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new((), NOW, Duration::from_millis(500));

        assert!(!entry.is_expired_at(NOW + 499));
        assert!(entry.is_expired_at(NOW + 500), "Entry should be expired at boundary");
        assert!(entry.is_expired_at(NOW + 501));
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new((), NOW, Duration::from_secs(10));

        assert_eq!(entry.ttl_remaining_ms(NOW + 2_500), 7_500);
        assert_eq!(entry.ttl_remaining(NOW + 2_500), 7);
        assert_eq!(entry.ttl_remaining_ms(NOW + 20_000), 0);
    }

    #[test]
    fn test_huge_ttl_saturates() {
        let entry = CacheEntry::new((), NOW, Duration::MAX);
        assert_eq!(entry.expires_at, i64::MAX);
    }

    #[test]
    fn test_record_wire_format() {
        let entry = CacheEntry::new(vec!["a".to_string()], NOW, Duration::from_secs(1));
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["payload"][0], "a");
        assert_eq!(json["createdAt"], NOW);
        assert_eq!(json["expiresAt"], NOW + 1_000);
    }

    #[test]
    fn test_timestamps_parse_without_payload_type() {
        let raw = r#"{"payload":{"anything":[1,2,3]},"createdAt":1,"expiresAt":2}"#;
        let entry: CacheEntry<IgnoredAny> = serde_json::from_str(raw).unwrap();
        assert_eq!(entry.expires_at, 2);

        let missing_payload = r#"{"createdAt":1,"expiresAt":2}"#;
        assert!(serde_json::from_str::<CacheEntry<IgnoredAny>>(missing_payload).is_err());
    }
}
