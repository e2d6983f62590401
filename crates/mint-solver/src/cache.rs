use std::collections::HashMap;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

use crate::normalize::clean_challenge;

/// Model answers keyed by the SHA-256 of the cleaned challenge, so
/// differently obfuscated copies of one puzzle share an entry.
#[derive(Debug, Default)]
pub struct AnswerCache {
    entries: Mutex<HashMap<String, String>>,
}

impl AnswerCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(challenge: &str) -> String {
        let digest = Sha256::digest(clean_challenge(challenge).as_bytes());
        format!("{digest:x}")
    }

    pub fn get(&self, challenge: &str) -> Option<String> {
        let key = Self::key(challenge);
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(&key).cloned())
    }

    pub fn insert(&self, challenge: &str, answer: &str) {
        let key = Self::key(challenge);
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, answer.to_string());
        }
    }

    pub fn remove(&self, challenge: &str) {
        let key = Self::key(challenge);
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(&key);
        }
    }

    /// Drop every entry, returning how many there were.
    pub fn clear(&self) -> usize {
        self.entries
            .lock()
            .map(|mut entries| {
                let size = entries.len();
                entries.clear();
                size
            })
            .unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_obfuscated_variants_share_key() {
        assert_eq!(
            AnswerCache::key("Twenty ~NeWtOnS"),
            AnswerCache::key("tweenty newtons")
        );
        assert_eq!(AnswerCache::key("x").len(), 64);
    }

    #[test]
    fn test_insert_get_clear() {
        let cache = AnswerCache::new();
        assert!(cache.is_empty());
        cache.insert("seven plus one", "8.00");
        assert_eq!(cache.get("SEVEN plus ONE").as_deref(), Some("8.00"));
        assert_eq!(cache.len(), 1);
        cache.remove("seven plus one");
        assert!(cache.get("seven plus one").is_none());
        cache.insert("a", "1.00");
        cache.insert("b", "2.00");
        assert_eq!(cache.clear(), 2);
        assert!(cache.is_empty());
    }
}
