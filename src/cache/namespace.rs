//! Namespace Module
//!
//! Logical partitions of the TTL store, each with its own key prefix and
//! default expiry.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

// == Namespace ==
/// A partition of the TTL store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Namespace {
    /// Chat transcripts, kept for 24 hours
    Chat,
    /// Polished articles, kept for 7 days
    Article,
    /// Writing analyses, kept for 7 days
    Analysis,
}

impl Namespace {
    /// Every namespace, in sweep order.
    pub const ALL: [Namespace; 3] = [Namespace::Chat, Namespace::Article, Namespace::Analysis];

    /// Key prefix under which this namespace's records are persisted.
    pub fn prefix(self) -> &'static str {
        match self {
            Namespace::Chat => "chat_",
            Namespace::Article => "article_",
            Namespace::Analysis => "analysis_",
        }
    }

    /// Expiry applied when a save does not specify one.
    pub fn default_ttl(self) -> Duration {
        match self {
            Namespace::Chat => Duration::from_secs(DAY),
            Namespace::Article | Namespace::Analysis => Duration::from_secs(7 * DAY),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Chat => "chat",
            Namespace::Article => "article",
            Namespace::Analysis => "analysis",
        }
    }

    /// Persistence key for `key` in this namespace.
    pub fn storage_key(self, key: &str) -> String {
        format!("{}{}", self.prefix(), key)
    }

    /// Caller key for a persisted key, if it belongs to this namespace.
    pub fn strip_prefix(self, storage_key: &str) -> Option<&str> {
        storage_key.strip_prefix(self.prefix())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown namespace name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown namespace: {0} (expected chat, article or analysis)")]
pub struct UnknownNamespace(pub String);

impl FromStr for Namespace {
    type Err = UnknownNamespace;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Namespace::ALL
            .into_iter()
            .find(|ns| ns.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownNamespace(s.to_string()))
    }
}
