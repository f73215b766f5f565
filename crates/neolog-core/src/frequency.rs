//! Absolute and relative frequency computation.
//!
//! `compute_frequencies` turns each entry's raw day list into per-bin
//! absolute counts (and the shared per-bin totals); `combine_frequencies`
//! derives the relative (ppm) series and the mean/standard deviation of its
//! non-zero values. Both stages drop the data they consumed: the raw day
//! list after counting, the absolute series after normalization.
//!
//! Window boundaries: with bins strictly decreasing, bin `i` covers the
//! half-open window `(bins[i+1], bins[i]]` and the last (newest-boundary)
//! bin covers everything at or below its boundary. Stored in that order the
//! series runs oldest to newest and every retained occurrence is counted
//! exactly once.

use std::collections::HashMap;
use std::path::Path;

use neolog_types::{
    DocumentParser, LanguageResource, MAX_SERIES_VAL, RelevanceFilter, Vocabulary,
};
use tracing::{info, warn};

use crate::bins::{calculate_bins, observed_range, refine_frequencies};
use crate::ingest::{IngestError, IngestOptions, gen_wordlist};

/// Round to three decimal places.
pub(crate) fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Populate `total` (overall ppm) and `series_abs` for every entry; returns
/// the per-bin occurrence totals across the whole vocabulary. Raw day lists
/// are drained here.
pub fn compute_frequencies(vocab: &mut Vocabulary, bins: &[i64]) -> Vec<u64> {
    let mut totals = vec![0u64; bins.len()];
    let freqsum: usize = vocab.values().map(|e| e.time_series.len()).sum();
    if freqsum == 0 {
        return totals;
    }

    for entry in vocab.values_mut() {
        entry.total = Some(round3(
            entry.time_series.len() as f64 / freqsum as f64 * 1_000_000.0,
        ));

        let mut days: HashMap<i64, u64> = HashMap::new();
        for &day in &entry.time_series {
            *days.entry(day).or_insert(0) += 1;
        }

        let mut series = Vec::with_capacity(bins.len());
        for (i, &bin) in bins.iter().enumerate() {
            let count: u64 = days
                .iter()
                .filter(|&(&day, _)| match bins.get(i + 1) {
                    Some(&next) => next < day && day <= bin,
                    None => day <= bin,
                })
                .map(|(_, &n)| n)
                .sum();
            // Saturate rather than overflow the fixed-width counter.
            let capped = count.min(MAX_SERIES_VAL as u64) as u16;
            series.push(capped);
            totals[i] += capped as u64;
        }
        entry.series_abs = Some(series);
        entry.time_series = Vec::new();
    }
    totals
}

/// Derive the relative (ppm) series from the absolute counts and the shared
/// per-bin totals, then the mean and population standard deviation of the
/// non-zero relative values. Absolute series are dropped here.
pub fn combine_frequencies(vocab: &mut Vocabulary, bins: &[i64], totals: &[u64]) {
    for entry in vocab.values_mut() {
        let Some(abs) = entry.series_abs.take() else {
            continue;
        };
        let rel: Vec<f64> = (0..bins.len())
            .map(|i| {
                if totals[i] == 0 {
                    0.0
                } else {
                    abs[i] as f64 / totals[i] as f64 * 1_000_000.0
                }
            })
            .collect();

        let nonzero: Vec<f64> = rel.iter().copied().filter(|f| *f != 0.0).collect();
        let (mean, stddev) = if nonzero.is_empty() {
            (0.0, 0.0)
        } else {
            let n = nonzero.len() as f64;
            let mean = nonzero.iter().sum::<f64>() / n;
            // Population standard deviation: divide by N, not N - 1.
            let variance = nonzero.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n;
            (mean, variance.sqrt())
        };
        entry.mean = Some(round3(mean));
        entry.stddev = Some(round3(stddev));
        entry.series_rel = Some(rel);
    }
}

/// Run binning and both frequency stages over an ingested vocabulary. An
/// observed span shorter than one interval empties the vocabulary ("not
/// enough data"), it is not an error.
pub fn score_frequencies(vocab: &mut Vocabulary, interval: i64) {
    let Some((oldest, newest)) = observed_range(vocab) else {
        return;
    };
    let bins = calculate_bins(oldest, newest, interval);
    if bins.is_empty() {
        warn!(oldest, newest, interval, "not enough days to compute frequencies");
        vocab.clear();
        return;
    }
    refine_frequencies(vocab, &bins);
    let totals = compute_frequencies(vocab, &bins);
    combine_frequencies(vocab, &bins, &totals);
    info!(
        words = vocab.len(),
        bins = bins.len(),
        "frequency series computed"
    );
}

/// End to end: ingest a directory, then bin and score the vocabulary.
pub fn gen_freqlist(
    dir: &Path,
    parser: &dyn DocumentParser,
    resource: &dyn LanguageResource,
    relevance: &dyn RelevanceFilter,
    opts: &IngestOptions,
    interval: i64,
) -> Result<Vocabulary, IngestError> {
    let mut vocab = gen_wordlist(dir, parser, resource, relevance, opts)?;
    score_frequencies(&mut vocab, interval);
    Ok(vocab)
}

#[cfg(test)]
mod tests {
    use super::*;
    use neolog_types::Entry;

    fn entry_with_days(days: &[i64]) -> Entry {
        let mut entry = Entry::default();
        for &d in days {
            entry.record(d, None, false);
        }
        entry
    }

    #[test]
    fn each_occurrence_lands_in_exactly_one_bin() {
        let bins = vec![21, 14, 7, 0];
        let mut vocab = Vocabulary::new();
        vocab.insert("w".to_string(), entry_with_days(&[0, 3, 7, 8, 14, 15, 20]));

        let totals = compute_frequencies(&mut vocab, &bins);
        let abs = vocab["w"].series_abs.as_ref().unwrap();
        // Oldest to newest: (14,21], (7,14], (0,7], <=0.
        assert_eq!(abs, &vec![2, 2, 2, 1]);
        assert_eq!(abs.iter().map(|&c| c as u64).sum::<u64>(), 7);
        assert_eq!(totals, vec![2, 2, 2, 1]);
        // Raw day list is gone after counting.
        assert!(vocab["w"].time_series.is_empty());
    }

    #[test]
    fn totals_are_parts_per_million() {
        let bins = vec![14, 7, 0];
        let mut vocab = Vocabulary::new();
        vocab.insert("a".to_string(), entry_with_days(&[1, 2, 8]));
        vocab.insert("b".to_string(), entry_with_days(&[3]));

        compute_frequencies(&mut vocab, &bins);
        assert_eq!(vocab["a"].total, Some(750_000.0));
        assert_eq!(vocab["b"].total, Some(250_000.0));
    }

    #[test]
    fn relative_series_match_direct_recomputation() {
        let bins = vec![21, 14, 7, 0];
        let mut vocab = Vocabulary::new();
        vocab.insert("w".to_string(), entry_with_days(&[1, 2, 8, 9, 10]));
        vocab.insert("v".to_string(), entry_with_days(&[8, 9, 16]));

        let totals = compute_frequencies(&mut vocab, &bins);
        let abs_w: Vec<u16> = vocab["w"].series_abs.clone().unwrap();
        combine_frequencies(&mut vocab, &bins, &totals);

        let rel_w = vocab["w"].series_rel.as_ref().unwrap();
        for i in 0..bins.len() {
            let expected = if totals[i] == 0 {
                0.0
            } else {
                abs_w[i] as f64 / totals[i] as f64 * 1_000_000.0
            };
            assert_eq!(rel_w[i], expected);
        }
        // Absolute series is gone after normalization.
        assert!(vocab["w"].series_abs.is_none());
    }

    #[test]
    fn zero_total_bins_yield_zero_not_a_crash() {
        let bins = vec![21, 14, 7, 0];
        let mut vocab = Vocabulary::new();
        // Nothing in (14, 21]: that bin's total is zero.
        vocab.insert("w".to_string(), entry_with_days(&[1, 2, 8]));

        let totals = compute_frequencies(&mut vocab, &bins);
        assert_eq!(totals[0], 0);
        combine_frequencies(&mut vocab, &bins, &totals);
        assert_eq!(vocab["w"].series_rel.as_ref().unwrap()[0], 0.0);
    }

    #[test]
    fn stddev_is_population_not_sample() {
        let bins = vec![14, 7, 0];
        let mut vocab = Vocabulary::new();
        vocab.insert("w".to_string(), entry_with_days(&[1, 8]));
        vocab.insert("v".to_string(), entry_with_days(&[1, 1, 1, 8]));

        let totals = compute_frequencies(&mut vocab, &bins);
        combine_frequencies(&mut vocab, &bins, &totals);

        // w's non-zero relative series is [500000, 250000]: mean 375000,
        // population stddev 125000. The sample formula (divide by N - 1)
        // would give 176776.695 instead.
        let entry = &vocab["w"];
        assert_eq!(entry.mean, Some(375_000.0));
        assert_eq!(entry.stddev, Some(125_000.0));
    }

    #[test]
    fn single_valued_series_has_zero_stddev() {
        let bins = vec![14, 7, 0];
        let mut vocab = Vocabulary::new();
        vocab.insert("w".to_string(), entry_with_days(&[8, 8]));

        let totals = compute_frequencies(&mut vocab, &bins);
        combine_frequencies(&mut vocab, &bins, &totals);
        assert_eq!(vocab["w"].stddev, Some(0.0));
    }

    #[test]
    fn score_frequencies_empties_short_spans() {
        let mut vocab = Vocabulary::new();
        vocab.insert("w".to_string(), entry_with_days(&[0, 1, 2, 3]));
        score_frequencies(&mut vocab, 7);
        assert!(vocab.is_empty());
    }

    #[test]
    fn score_frequencies_fills_every_series() {
        let mut vocab = Vocabulary::new();
        vocab.insert("w".to_string(), entry_with_days(&[1, 5, 9, 13, 20, 27]));
        vocab.insert("v".to_string(), entry_with_days(&[2, 6, 12, 19, 28]));
        score_frequencies(&mut vocab, 7);

        assert!(!vocab.is_empty());
        for entry in vocab.values() {
            let rel = entry.series_rel.as_ref().unwrap();
            assert!(entry.total.is_some());
            assert!(entry.mean.is_some());
            assert!(entry.stddev.is_some());
            assert!(entry.series_abs.is_none());
            assert!(!rel.is_empty());
        }
    }
}
