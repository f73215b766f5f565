//! Thread-safe vocabulary aggregation.
//!
//! [`VocabBuilder`] is the single merge point for concurrent ingestion. The
//! map is sharded (`DashMap`), so workers inserting different words never
//! contend on one global lock; two workers hitting the same word serialize
//! only on that word's shard. Once ingestion completes the builder is
//! consumed into a plain [`Vocabulary`] for the single-threaded stages.

use dashmap::DashMap;
use neolog_types::{Entry, Observation, Vocabulary};

/// Shared merge point for observation tuples.
#[derive(Debug, Default)]
pub struct VocabBuilder {
    entries: DashMap<String, Entry>,
}

impl VocabBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one occurrence of `wordform`, creating its entry if absent.
    pub fn put(&self, wordform: &str, day_offset: i64, source: Option<&str>, in_heading: bool) {
        self.entries
            .entry(wordform.to_string())
            .or_default()
            .record(day_offset, source, in_heading);
    }

    /// Merge one file's whole batch of observations, preserving their order
    /// within each word's time series.
    pub fn put_batch(&self, observations: Vec<Observation>) {
        for obs in observations {
            self.put(&obs.wordform, obs.day_offset, obs.source.as_deref(), obs.in_heading);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Hand the merged vocabulary to the single-threaded stages.
    pub fn into_vocabulary(self) -> Vocabulary {
        self.entries.into_iter().collect()
    }
}
