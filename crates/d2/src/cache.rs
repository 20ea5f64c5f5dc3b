//! Memoised parse results keyed by document and content.
//!
//! A [`TreeCache`] keeps the latest [`Parse`] of each document. Entries are
//! keyed by the document id and the blake3 hash of its text, so an unchanged
//! text is never parsed twice and a changed text replaces the old entry.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, OnceLock},
};

use log::{debug, trace};

use d2_parser::Parse;

/// One cached document: the hash of the text and its parse.
///
/// The cell is shared so the parse runs outside the map lock while other
/// callers for the same key wait on the cell.
#[derive(Debug)]
struct Entry {
    hash: blake3::Hash,
    parse: Arc<OnceLock<Arc<Parse>>>,
}

/// Thread-safe cache of parses.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use d2::cache::TreeCache;
///
/// let cache = TreeCache::new();
/// let first = cache.get_or_parse("main.d2", "a -> b", d2_parser::parse);
/// let second = cache.get_or_parse("main.d2", "a -> b", d2_parser::parse);
/// assert!(Arc::ptr_eq(&first, &second));
/// ```
#[derive(Debug, Default)]
pub struct TreeCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl TreeCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached parse of `text` for `document`, running `parse`
    /// on a miss.
    ///
    /// Concurrent callers with the same document and text share one run of
    /// `parse`. A text with a different hash evicts the document's previous
    /// entry.
    pub fn get_or_parse<F>(&self, document: &str, text: &str, parse: F) -> Arc<Parse>
    where
        F: FnOnce(&str) -> Parse,
    {
        let hash = blake3::hash(text.as_bytes());
        let cell = {
            let mut entries = self.lock();
            let cached = entries
                .get(document)
                .filter(|entry| entry.hash == hash)
                .map(|entry| Arc::clone(&entry.parse));
            match cached {
                Some(cell) => {
                    trace!(document; "Tree cache hit");
                    cell
                }
                None => {
                    let cell = Arc::new(OnceLock::new());
                    let previous = entries.insert(
                        document.to_string(),
                        Entry {
                            hash,
                            parse: Arc::clone(&cell),
                        },
                    );
                    if previous.is_some() {
                        debug!(document; "Evicted stale tree");
                    }
                    cell
                }
            }
        };

        Arc::clone(cell.get_or_init(|| {
            debug!(document, bytes = text.len(); "Parsing uncached document");
            Arc::new(parse(text))
        }))
    }

    /// Drops the entry of `document`. Returns `true` if one existed.
    pub fn remove(&self, document: &str) -> bool {
        self.lock().remove(document).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Number of cached documents.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        thread,
    };

    use super::*;

    #[test]
    fn test_hit_returns_same_parse() {
        let cache = TreeCache::new();
        let runs = AtomicUsize::new(0);
        let counted = |text: &str| {
            runs.fetch_add(1, Ordering::SeqCst);
            d2_parser::parse(text)
        };

        let first = cache.get_or_parse("a.d2", "a -> b", counted);
        let second = cache.get_or_parse("a.d2", "a -> b", counted);

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_changed_text_evicts_old_entry() {
        let cache = TreeCache::new();

        let old = cache.get_or_parse("a.d2", "a -> b", d2_parser::parse);
        let new = cache.get_or_parse("a.d2", "a -> c", d2_parser::parse);

        assert!(!Arc::ptr_eq(&old, &new));
        assert_eq!(new.tree().text(), "a -> c");
        assert_eq!(cache.len(), 1);

        let again = cache.get_or_parse("a.d2", "a -> c", d2_parser::parse);
        assert!(Arc::ptr_eq(&new, &again));
    }

    #[test]
    fn test_documents_are_independent() {
        let cache = TreeCache::new();

        let a = cache.get_or_parse("a.d2", "x", d2_parser::parse);
        let b = cache.get_or_parse("b.d2", "x", d2_parser::parse);

        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
        assert!(cache.remove("a.d2"));
        assert!(!cache.remove("a.d2"));
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_callers_parse_once() {
        let cache = TreeCache::new();
        let runs = AtomicUsize::new(0);
        let source = "a -> b -> c\nc: { shape: circle }";

        let parses: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        cache.get_or_parse("shared.d2", source, |text| {
                            runs.fetch_add(1, Ordering::SeqCst);
                            d2_parser::parse(text)
                        })
                    })
                })
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap())
                .collect()
        });

        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(parses.windows(2).all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    }
}
