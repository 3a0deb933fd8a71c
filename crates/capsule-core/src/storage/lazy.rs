//! Lazily opened, process-lifetime store handle.

use std::path::PathBuf;

use once_cell::sync::OnceCell;

use super::sqlite::SqliteCapsuleStore;
use crate::error::Result;

type Opener<S> = Box<dyn Fn() -> Result<S> + Send + Sync>;

/// A store that is opened on first use and then shared.
///
/// Concurrent first callers block on a single initialization. A failed
/// open is returned to the caller and not remembered; the next call tries
/// again.
pub struct LazyStore<S = SqliteCapsuleStore> {
    open: Opener<S>,
    cell: OnceCell<S>,
}

impl LazyStore<SqliteCapsuleStore> {
    /// Lazily open the SQLite store at `path`.
    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        let path: PathBuf = path.into();
        Self::new(move || SqliteCapsuleStore::open(&path))
    }
}

impl<S> LazyStore<S> {
    pub fn new(open: impl Fn() -> Result<S> + Send + Sync + 'static) -> Self {
        Self {
            open: Box::new(open),
            cell: OnceCell::new(),
        }
    }

    /// Get the store, opening it if this is the first successful call.
    pub fn get(&self) -> Result<&S> {
        self.cell.get_or_try_init(|| {
            tracing::debug!("initializing capsule store");
            (self.open)()
        })
    }

    /// True once a call to `get` has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<S> std::fmt::Debug for LazyStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyStore")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CapsuleError;
    use crate::storage::CapsuleStore;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_opens_once() {
        let opens = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&opens);
        let lazy = LazyStore::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            SqliteCapsuleStore::open_in_memory()
        });

        assert!(!lazy.is_initialized());
        let first = lazy.get().unwrap() as *const SqliteCapsuleStore;
        let second = lazy.get().unwrap() as *const SqliteCapsuleStore;

        assert_eq!(first, second);
        assert_eq!(opens.load(Ordering::SeqCst), 1);
        assert!(lazy.is_initialized());
    }

    #[test]
    fn test_failure_is_not_cached() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let lazy = LazyStore::new(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(CapsuleError::Storage("database unavailable".to_string()))
            } else {
                SqliteCapsuleStore::open_in_memory()
            }
        });

        assert!(matches!(lazy.get(), Err(CapsuleError::Storage(_))));
        assert!(!lazy.is_initialized());

        let store = lazy.get().unwrap();
        assert_eq!(store.count_records().unwrap(), 0);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_sqlite_constructor_opens_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("capsules.db");
        let lazy = LazyStore::sqlite(&path);

        assert!(!path.exists());
        lazy.get().unwrap();
        assert!(path.exists());
    }
}
