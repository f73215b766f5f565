//! Shared types for the neolog trend-detection pipeline.
//!
//! The central record is [`Entry`]: the per-word aggregate that accumulates
//! occurrence day-offsets during ingestion and is progressively replaced by
//! binned statistics. Fields that only exist after a given pipeline stage
//! (`series_abs`, `series_rel`, `mean`, ...) are `Option`al so that "not yet
//! computed" is a state the type system can see.
//!
//! The crate also defines the interfaces of the engine's external
//! collaborators — document parsing ([`DocumentParser`]), the linguistic
//! resource ([`LanguageResource`]) and token relevance ([`RelevanceFilter`]) —
//! so that the core stays ignorant of any concrete file format or language
//! data layout.
//!
//! ```rust
//! use neolog_types::Entry;
//!
//! let mut entry = Entry::default();
//! entry.record(12, Some("example.org"), false);
//! entry.record(5, Some("example.org"), true);
//! assert_eq!(entry.occurrences(), 2);
//! assert_eq!(entry.sources.get("example.org"), Some(&2));
//! assert!(entry.headings);
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Saturation bound for a single per-bin occurrence counter.
pub const MAX_SERIES_VAL: u16 = u16::MAX;

/// Word-form to aggregate mapping; keys are surface forms until the
/// morphological passes re-key merged variants.
pub type Vocabulary = HashMap<String, Entry>;

/// Per-word aggregate state.
///
/// `time_series` holds one day-offset per observed occurrence and is drained
/// once the absolute per-bin series is derived; `series_abs` is in turn taken
/// once the relative series exists. Downstream stages therefore never see
/// per-occurrence data they no longer need.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Day-offsets of observed occurrences, duplicates allowed.
    pub time_series: Vec<i64>,
    /// Source identifier multiset (domain or publisher), counts meaningful.
    pub sources: HashMap<String, u32>,
    /// True if the word ever occurred in a heading; never reset.
    pub headings: bool,
    /// Overall corpus frequency in parts per million, 3 decimals.
    pub total: Option<f64>,
    /// Per-bin absolute counts, oldest to newest, saturating at
    /// [`MAX_SERIES_VAL`].
    pub series_abs: Option<Vec<u16>>,
    /// Per-bin relative frequencies (ppm), same orientation as `series_abs`.
    pub series_rel: Option<Vec<f64>>,
    /// Mean of the non-zero relative frequencies, 3 decimals.
    pub mean: Option<f64>,
    /// Population standard deviation of the non-zero relative frequencies,
    /// 3 decimals.
    pub stddev: Option<f64>,
}

impl Entry {
    /// Add one occurrence: append the day-offset, count the source (if any)
    /// and raise the heading flag when the occurrence came from a heading.
    pub fn record(&mut self, day_offset: i64, source: Option<&str>, in_heading: bool) {
        self.time_series.push(day_offset);
        if let Some(source) = source
            && !source.is_empty()
        {
            *self.sources.entry(source.to_string()).or_insert(0) += 1;
        }
        if in_heading {
            self.headings = true;
        }
    }

    /// Merge another entry into this one: concatenate time series, sum the
    /// source multisets and OR the heading flag. Used when a variant
    /// word-form is folded into its canonical form.
    pub fn absorb(&mut self, other: Entry) {
        self.time_series.extend(other.time_series);
        for (source, count) in other.sources {
            *self.sources.entry(source).or_insert(0) += count;
        }
        if other.headings {
            self.headings = true;
        }
    }

    /// Number of raw occurrences currently held.
    pub fn occurrences(&self) -> usize {
        self.time_series.len()
    }
}

/// One `(token, day-offset, source, in-heading)` tuple emitted by document
/// reading, the unit fed into the vocabulary builder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Observation {
    pub wordform: String,
    pub day_offset: i64,
    pub source: Option<String>,
    pub in_heading: bool,
}

/// What a document parser extracts from one file. Every metadata field is
/// optional; the ingestion layer decides which absences make a document
/// unusable.
#[derive(Clone, Debug, Default)]
pub struct RawDocument {
    /// Publication date as written in the document, `YYYY-MM-DD`.
    pub date: Option<String>,
    pub author: Option<String>,
    /// Original document URL, preferred for source attribution.
    pub url: Option<String>,
    /// Publisher name, fallback source attribution.
    pub publisher: Option<String>,
    /// Raw text of heading/title elements.
    pub heading_texts: Vec<String>,
    /// Full body text with markup removed.
    pub body_text: String,
}

/// Structural failure while parsing a single document. Never fatal to a
/// batch: the worker pool skips the document and moves on.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("document is not valid UTF-8")]
    Encoding,
    #[error("missing {0} element")]
    MissingElement(&'static str),
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// External document parser collaborator.
pub trait DocumentParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<RawDocument, ParseError>;
}

/// External linguistic-resource collaborator: tokenization, dictionary
/// membership and lemmatization.
pub trait LanguageResource: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
    /// Whether the token is an already-known dictionary form.
    fn is_known(&self, token: &str) -> bool;
    /// Reduce a token to its lemma; `None` when no analysis exists (callers
    /// fall back to the surface form).
    fn lemmatize(&self, token: &str) -> Option<String>;
    /// True when no language data is loaded; the lemma pass is skipped then.
    fn is_empty(&self) -> bool;
}

/// External token-level relevance predicate applied before an observation
/// enters the vocabulary.
pub trait RelevanceFilter: Send + Sync {
    fn is_relevant(&self, token: &str) -> bool;
}
