/// Opaque document snapshots and the pending candidate.
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// A full serialized snapshot of a document at one instant.
///
/// Equality is exact over the serialized text: two logically identical
/// documents that serialize differently are *not* equal. Hosts must keep
/// their serialization order stable for deduplication to work.
///
/// Cloning is cheap; the text is shared.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct StateBlob(Arc<str>);

impl StateBlob {
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length of the serialized text in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for StateBlob {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for StateBlob {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl AsRef<str> for StateBlob {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

// Snapshots can be large; keep debug output to a short prefix.
impl fmt::Debug for StateBlob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const PREVIEW: usize = 32;
        let text = self.as_str();
        match text.char_indices().nth(PREVIEW) {
            Some((cut, _)) => write!(f, "StateBlob({:?}.. {} bytes)", &text[..cut], text.len()),
            None => write!(f, "StateBlob({text:?})"),
        }
    }
}

/// The most recently captured state that has not been committed yet.
///
/// Only one candidate exists at a time; capturing a new one replaces it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub blob: StateBlob,
    pub timestamp: Instant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_text_is_equal_blob() {
        let a = StateBlob::from(r#"{"nodes":[1,2]}"#);
        let b = StateBlob::from(String::from(r#"{"nodes":[1,2]}"#));
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_is_order_sensitive() {
        let a = StateBlob::from(r#"{"a":1,"b":2}"#);
        let b = StateBlob::from(r#"{"b":2,"a":1}"#);
        assert_ne!(a, b);
    }

    #[test]
    fn test_clone_shares_text() {
        let a = StateBlob::from("snapshot");
        let b = a.clone();
        assert!(std::ptr::eq(a.as_str(), b.as_str()));
    }

    #[test]
    fn test_len_and_empty() {
        assert!(StateBlob::from("").is_empty());
        assert_eq!(StateBlob::from("abc").len(), 3);
    }

    #[test]
    fn test_debug_truncates_long_blobs() {
        let blob = StateBlob::from("x".repeat(1000));
        let debug = format!("{blob:?}");
        assert!(debug.contains("1000 bytes"));
        assert!(debug.len() < 100);
    }

    #[test]
    fn test_debug_short_blob_verbatim() {
        let blob = StateBlob::from("abc");
        assert_eq!(format!("{blob:?}"), r#"StateBlob("abc")"#);
    }
}
