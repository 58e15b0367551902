//! Typed helpers for the three session-keyed namespaces.

use crate::cache::{CacheEntry, Clock, Namespace, StorageBackend, StoredEntry, TtlStore};
use crate::models::{ChatMessage, GeneratedArticle, WritingAnalysis};

impl<S: StorageBackend, C: Clock> TtlStore<S, C> {
    // == Chat ==
    /// Caches a session's transcript for 24 hours.
    pub fn save_chat(&mut self, session_id: &str, messages: &[ChatMessage]) -> bool {
        self.save(Namespace::Chat, session_id, messages, None)
    }

    pub fn get_chat(&mut self, session_id: &str) -> Option<Vec<ChatMessage>> {
        self.get(Namespace::Chat, session_id)
    }

    pub fn remove_chat(&mut self, session_id: &str) {
        self.remove(Namespace::Chat, session_id);
    }

    // == Article ==
    /// Caches a generated article for 7 days.
    pub fn save_article(&mut self, session_id: &str, article: &GeneratedArticle) -> bool {
        self.save(Namespace::Article, session_id, article, None)
    }

    /// Returns the cached article along with when it was cached.
    pub fn get_article(&mut self, session_id: &str) -> Option<CacheEntry<GeneratedArticle>> {
        self.get_entry(Namespace::Article, session_id)
    }

    pub fn remove_article(&mut self, session_id: &str) {
        self.remove(Namespace::Article, session_id);
    }

    pub fn list_articles(&mut self) -> Vec<StoredEntry<GeneratedArticle>> {
        self.list_all(Namespace::Article)
    }

    // == Analysis ==
    /// Caches a writing analysis for 7 days.
    pub fn save_analysis(&mut self, session_id: &str, analysis: &WritingAnalysis) -> bool {
        self.save(Namespace::Analysis, session_id, analysis, None)
    }

    pub fn get_analysis(&mut self, session_id: &str) -> Option<WritingAnalysis> {
        self.get(Namespace::Analysis, session_id)
    }

    pub fn remove_analysis(&mut self, session_id: &str) {
        self.remove(Namespace::Analysis, session_id);
    }

    pub fn list_analyses(&mut self) -> Vec<StoredEntry<WritingAnalysis>> {
        self.list_all(Namespace::Analysis)
    }
}
