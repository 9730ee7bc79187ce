//! # Credential Store
//!
//! Issues, digests, and shape-checks bot API keys.
//!
//! A key is `bot_` followed by 32 hex characters. Only a SHA-256 digest of
//! the full token is ever stored; the digest is deterministic so the
//! gateway can look a presented key up by equality. The plaintext surfaces
//! exactly once, in the creation or regeneration response, and must never
//! be logged.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Fixed tag prefixing every bot API key.
pub const KEY_PREFIX: &str = "bot_";

/// Length of the random hex portion after the prefix.
const KEY_RANDOM_LEN: usize = 32;

/// Length of the trailing hint shown to owners.
const KEY_HINT_LEN: usize = 4;

/// A freshly issued key. `plaintext` is handed to the caller once and
/// dropped; only `hash` and `hint` are persisted.
#[derive(Debug, Clone)]
pub struct IssuedKey {
    pub plaintext: String,
    pub hash: String,
    pub hint: String,
}

/// Explicitly constructed and dependency-injected; there is no global
/// hasher instance.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialStore;

impl CredentialStore {
    pub fn new() -> Self {
        CredentialStore
    }

    /// Generate a new key: `bot_<32-hex>`, its digest, and a display hint.
    pub fn issue(&self) -> IssuedKey {
        let plaintext = format!("{KEY_PREFIX}{}", Uuid::new_v4().simple());
        let hash = self.hash(&plaintext);
        let hint = plaintext[plaintext.len() - KEY_HINT_LEN..].to_string();
        IssuedKey {
            plaintext,
            hash,
            hint,
        }
    }

    /// Digest a presented token for lookup. Malformed tokens (wrong prefix,
    /// wrong length, non-hex tail) yield `None` before any gateway
    /// round-trip.
    pub fn digest(&self, presented: &str) -> Option<String> {
        let tail = presented.strip_prefix(KEY_PREFIX)?;
        if tail.len() != KEY_RANDOM_LEN || !tail.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        Some(self.hash(presented))
    }

    /// Whether a bearer token is bot-shaped at all. Anything else belongs
    /// to the session collaborator.
    pub fn looks_like_key(token: &str) -> bool {
        token.starts_with(KEY_PREFIX)
    }

    fn hash(&self, token: &str) -> String {
        hex::encode(Sha256::digest(token.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_keys_have_prefix_and_hint() {
        let store = CredentialStore::new();
        let key = store.issue();
        assert!(key.plaintext.starts_with(KEY_PREFIX));
        assert_eq!(key.plaintext.len(), KEY_PREFIX.len() + 32);
        assert_eq!(key.hint, key.plaintext[key.plaintext.len() - 4..]);
        // SHA-256 hex digest is 64 chars
        assert_eq!(key.hash.len(), 64);
    }

    #[test]
    fn digest_is_deterministic() {
        let store = CredentialStore::new();
        let key = store.issue();
        let a = store.digest(&key.plaintext).unwrap();
        let b = store.digest(&key.plaintext).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, key.hash);
    }

    #[test]
    fn distinct_issues_do_not_collide() {
        let store = CredentialStore::new();
        let a = store.issue();
        let b = store.issue();
        assert_ne!(a.plaintext, b.plaintext);
        assert_ne!(a.hash, b.hash);
    }

    #[test]
    fn malformed_tokens_rejected_before_lookup() {
        let store = CredentialStore::new();
        // missing prefix
        assert!(store.digest("0123456789abcdef0123456789abcdef").is_none());
        // wrong prefix
        assert!(store.digest("key_0123456789abcdef0123456789abcdef").is_none());
        // too short
        assert!(store.digest("bot_0123").is_none());
        // non-hex tail
        assert!(store
            .digest("bot_zzzz56789abcdef0123456789abcdef0")
            .is_none());
        assert!(store.digest("").is_none());
    }

    #[test]
    fn bot_shaped_detection() {
        assert!(CredentialStore::looks_like_key("bot_abc"));
        assert!(!CredentialStore::looks_like_key("eyJhbGciOi"));
    }
}
