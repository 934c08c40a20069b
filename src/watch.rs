//! File watches
//!
//! A handle-indexed table of watched paths. Changes are detected by polling
//! each enabled path's modification time and length when
//! [`FileWatches::poll`] runs, which [`Context::process_events`] does once
//! per call. Callbacks run after the table has been scanned and must not
//! call back into the context; they typically raise a flag that the owner
//! inspects afterwards.
//!
//! [`Context::process_events`]: crate::Context::process_events

use std::ops::BitOr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

/// Handle returned by [`FileWatches::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WatchId(u32);

impl WatchId {
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Callback invoked with the handle of the watch that fired
pub type WatchCallback = Arc<dyn Fn(WatchId) + Send + Sync>;

/// Flags for [`Context::process_events`](crate::Context::process_events)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ProcessEventsFlags(u32);

impl ProcessEventsFlags {
    pub const NONE: Self = Self(0);
    /// The host runs its own main loop; backends must not iterate one
    pub const NO_MAIN_LOOP: Self = Self(1 << 0);

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ProcessEventsFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    modified: Option<SystemTime>,
    len: u64,
}

fn fingerprint(path: &Path) -> Option<Fingerprint> {
    std::fs::metadata(path).ok().map(|meta| Fingerprint {
        modified: meta.modified().ok(),
        len: meta.len(),
    })
}

struct FileWatch {
    id: WatchId,
    path: PathBuf,
    enabled: bool,
    callback: WatchCallback,
    last: Option<Fingerprint>,
}

/// Table of file watches owned by a context
#[derive(Default)]
pub struct FileWatches {
    next_id: u32,
    watches: Vec<FileWatch>,
}

impl FileWatches {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Watch `path`. The current state of the file is the baseline.
    pub fn add<F>(&mut self, path: impl Into<PathBuf>, enabled: bool, callback: F) -> WatchId
    where
        F: Fn(WatchId) + Send + Sync + 'static,
    {
        self.next_id += 1;
        let id = WatchId(self.next_id);
        let path = path.into();
        let last = fingerprint(&path);
        self.watches.push(FileWatch {
            id,
            path,
            enabled,
            callback: Arc::new(callback),
            last,
        });
        id
    }

    pub fn remove(&mut self, id: WatchId) -> bool {
        let before = self.watches.len();
        self.watches.retain(|w| w.id != id);
        self.watches.len() != before
    }

    /// Resume delivery; changes made while disabled are not reported
    pub fn enable(&mut self, id: WatchId) -> bool {
        match self.watches.iter_mut().find(|w| w.id == id) {
            Some(watch) => {
                watch.enabled = true;
                watch.last = fingerprint(&watch.path);
                true
            }
            None => false,
        }
    }

    pub fn disable(&mut self, id: WatchId) -> bool {
        match self.watches.iter_mut().find(|w| w.id == id) {
            Some(watch) => {
                watch.enabled = false;
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_enabled(&self, id: WatchId) -> Option<bool> {
        self.watches.iter().find(|w| w.id == id).map(|w| w.enabled)
    }

    #[must_use]
    pub fn path(&self, id: WatchId) -> Option<&Path> {
        self.watches
            .iter()
            .find(|w| w.id == id)
            .map(|w| w.path.as_path())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.watches.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.watches.is_empty()
    }

    /// Check every enabled watch and run the callbacks of those that changed.
    ///
    /// Returns the number of callbacks run.
    pub fn poll(&mut self) -> usize {
        let mut fired: Vec<(WatchId, WatchCallback)> = Vec::new();
        for watch in self.watches.iter_mut().filter(|w| w.enabled) {
            let current = fingerprint(&watch.path);
            if current != watch.last {
                watch.last = current;
                fired.push((watch.id, Arc::clone(&watch.callback)));
            }
        }
        for (id, callback) in &fired {
            callback(*id);
        }
        fired.len()
    }
}

impl std::fmt::Debug for FileWatches {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.watches.iter().map(|w| (w.id, &w.path, w.enabled)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    fn counter_callback() -> (Arc<AtomicUsize>, impl Fn(WatchId) + Send + Sync + 'static) {
        let counter = Arc::new(AtomicUsize::new(0));
        let clone = counter.clone();
        (counter, move |_| {
            clone.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_change_fires_once() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("watched.ini");
        std::fs::write(&path, "a").unwrap();

        let mut watches = FileWatches::new();
        let (counter, callback) = counter_callback();
        watches.add(&path, true, callback);

        assert_eq!(watches.poll(), 0);
        std::fs::write(&path, "changed").unwrap();
        assert_eq!(watches.poll(), 1);
        assert_eq!(watches.poll(), 0);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_disabled_watch_is_silent() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("watched.ini");

        let mut watches = FileWatches::new();
        let (counter, callback) = counter_callback();
        let id = watches.add(&path, false, callback);
        assert_eq!(watches.is_enabled(id), Some(false));

        std::fs::write(&path, "created").unwrap();
        assert_eq!(watches.poll(), 0);

        // enabling takes a new baseline
        watches.enable(id);
        assert_eq!(watches.poll(), 0);

        std::fs::write(&path, "created and changed").unwrap();
        assert_eq!(watches.poll(), 1);
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_remove_by_handle() {
        let dir = tempdir().unwrap();
        let mut watches = FileWatches::new();
        let first = watches.add(dir.path().join("a"), true, |_| {});
        let second = watches.add(dir.path().join("b"), true, |_| {});
        assert_ne!(first, second);

        assert!(watches.remove(first));
        assert!(!watches.remove(first));
        assert_eq!(watches.len(), 1);
        assert_eq!(watches.path(second), Some(dir.path().join("b").as_path()));
        assert!(!watches.disable(first));
    }

    #[test]
    fn test_deletion_is_a_change() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("gone.ini");
        std::fs::write(&path, "x").unwrap();

        let mut watches = FileWatches::new();
        watches.add(&path, true, |_| {});
        std::fs::remove_file(&path).unwrap();
        assert_eq!(watches.poll(), 1);
    }

    #[test]
    fn test_flags() {
        let flags = ProcessEventsFlags::NONE | ProcessEventsFlags::NO_MAIN_LOOP;
        assert!(flags.contains(ProcessEventsFlags::NO_MAIN_LOOP));
        assert_eq!(flags.bits(), 1);
        assert!(!ProcessEventsFlags::NONE.contains(ProcessEventsFlags::NO_MAIN_LOOP));
    }
}
