//! The neolog engine: concurrent vocabulary aggregation over a time-stamped
//! corpus, morphological merging, time-window binning and frequency
//! statistics.
//!
//! Data flows through the stages in order:
//!
//! 1. [`ingest`] — a bounded worker pool turns files into observation
//!    tuples and feeds the sharded [`vocab::VocabBuilder`].
//! 2. [`normalize`] — lemma variants and hyphenation variants are folded
//!    into canonical entries.
//! 3. [`bins`] — fixed-width historical time windows are derived from the
//!    observed date range; entries that cannot fill a window are dropped.
//! 4. [`frequency`] — absolute per-bin counts, relative (ppm) frequencies
//!    and the mean/standard deviation of the non-zero relative series.
//! 5. [`store`] — compressed snapshots, TSV word-list import and the
//!    significance-gated TSV frequency report.
//!
//! Document parsing, tokenization and lemmatization are external
//! collaborators expressed as traits in `neolog-types`; the engine never
//! commits to a file format or a language.

pub mod bins;
pub mod dates;
pub mod filters;
pub mod frequency;
pub mod ingest;
pub mod normalize;
pub mod store;
pub mod vocab;

pub use bins::{calculate_bins, observed_range, refine_frequencies};
pub use dates::calc_timediff;
pub use filters::{Setting, SimpleRelevance, TrendFilter, apply_filters, combined_filters};
pub use frequency::{combine_frequencies, compute_frequencies, gen_freqlist, score_frequencies};
pub use ingest::{IngestError, IngestOptions, default_threads, find_files, gen_wordlist};
pub use normalize::refine_vocab;
pub use store::{StoreError, load_snapshot, load_wordlist, save_snapshot, store_freqlist};
pub use vocab::VocabBuilder;
