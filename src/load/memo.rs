//! Time-bounded read-through memo.
//!
//! Keyed by (dataset, options) so differently-filtered views never
//! bleed into each other. Entries expire after a fixed TTL or on
//! explicit refresh; expired entries are dropped on access.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::schema::Dataset;

use super::{LoadOptions, Loaded};

/// Default memo lifetime, matching the dashboard's hourly cache.
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(super) struct MemoKey {
    dataset: Dataset,
    years: Option<(i32, i32)>,
}

impl MemoKey {
    pub(super) fn new(dataset: Dataset, options: &LoadOptions) -> Self {
        Self {
            dataset,
            years: options
                .years
                .as_ref()
                .map(|range| (*range.start(), *range.end())),
        }
    }
}

pub(super) struct Memo {
    ttl: Duration,
    entries: Mutex<HashMap<MemoKey, (Instant, Loaded)>>,
}

impl Memo {
    pub(super) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub(super) fn get(&self, key: &MemoKey) -> Option<Loaded> {
        let mut entries = self.entries.lock().unwrap();
        match entries.get(key) {
            Some((stored, loaded)) if stored.elapsed() < self.ttl => Some(loaded.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub(super) fn put(&self, key: MemoKey, loaded: Loaded) {
        let mut entries = self.entries.lock().unwrap();
        entries.insert(key, (Instant::now(), loaded));
    }

    pub(super) fn clear(&self) {
        self.entries.lock().unwrap().clear();
    }
}
