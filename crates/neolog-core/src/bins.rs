//! Time-window derivation and occurrence pruning.
//!
//! Bins are day-offset boundaries, strictly decreasing (oldest first), each a
//! multiple of the configured interval and each at least one full interval
//! younger than the oldest observed day. An empty bin list means the corpus
//! does not span a single full interval; callers treat that as "not enough
//! data", never as an error.

use neolog_types::Vocabulary;

/// Derive interval-aligned bin boundaries for the observed day-offset range.
/// Returns an empty list when the span is shorter than one interval.
pub fn calculate_bins(oldest: i64, newest: i64, interval: i64) -> Vec<i64> {
    if interval <= 0 {
        return Vec::new();
    }
    (newest..=oldest)
        .rev()
        .filter(|d| oldest - d >= interval && d % interval == 0)
        .collect()
}

/// Oldest (max) and newest (min) day-offsets across every occurrence of every
/// entry, or `None` for an empty vocabulary.
pub fn observed_range(vocab: &Vocabulary) -> Option<(i64, i64)> {
    let mut oldest = i64::MIN;
    let mut newest = i64::MAX;
    let mut seen = false;
    for entry in vocab.values() {
        for &day in &entry.time_series {
            oldest = oldest.max(day);
            newest = newest.min(day);
            seen = true;
        }
    }
    seen.then_some((oldest, newest))
}

/// Keep only occurrences inside the bin range (`bins[last] <= d < bins[0]`)
/// and drop entries left with fewer than two occurrences.
pub fn refine_frequencies(vocab: &mut Vocabulary, bins: &[i64]) {
    let Some((&first, &last)) = bins.first().zip(bins.last()) else {
        return;
    };
    vocab.retain(|_, entry| {
        let kept: Vec<i64> = entry
            .time_series
            .iter()
            .copied()
            .filter(|d| (last..first).contains(d))
            .collect();
        if kept.len() <= 1 {
            false
        } else {
            entry.time_series = kept;
            true
        }
    });
}
