//! Relevance and significance filtering.
//!
//! [`SimpleRelevance`] is the default token-level predicate applied before an
//! observation enters the vocabulary. [`TrendFilter`]s form the significance
//! chain applied to scored entries; [`combined_filters`] wires the default
//! chain for a strictness [`Setting`]. The chain is deliberately open: any
//! caller can supply its own `TrendFilter` implementations.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use neolog_types::{Entry, RelevanceFilter, Vocabulary};
use tracing::warn;

/// Strictness of the default significance chain.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Setting {
    Loose,
    #[default]
    Normal,
    Strict,
}

impl FromStr for Setting {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "loose" => Ok(Setting::Loose),
            "normal" => Ok(Setting::Normal),
            "strict" => Ok(Setting::Strict),
            _ => Err(raw.to_string()),
        }
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Setting::Loose => "loose",
            Setting::Normal => "normal",
            Setting::Strict => "strict",
        })
    }
}

impl Setting {
    /// Parse a user-supplied setting, warning and falling back to normal on
    /// anything unknown. Never an error.
    pub fn parse_or_default(raw: &str) -> Self {
        raw.parse().unwrap_or_else(|raw: String| {
            warn!(setting = %raw, "invalid filter setting, using normal");
            Setting::Normal
        })
    }
}

/// Default token predicate: starts with a letter, only letters and inner
/// joiners, between 3 and 50 characters.
pub struct SimpleRelevance;

impl RelevanceFilter for SimpleRelevance {
    fn is_relevant(&self, token: &str) -> bool {
        let length = token.chars().count();
        if !(3..=50).contains(&length) {
            return false;
        }
        let mut chars = token.chars();
        chars
            .next()
            .is_some_and(|first| first.is_alphabetic())
            && token
                .chars()
                .all(|c| c.is_alphabetic() || matches!(c, '-' | '\'' | '\u{2019}'))
    }
}

/// One stage of the significance chain: decides per scored entry.
pub trait TrendFilter {
    fn name(&self) -> &'static str;
    fn accepts(&self, entry: &Entry) -> bool;
}

/// Frequency gate: requires dispersion and either a high mean or a moderate
/// mean with low spread.
pub struct FrequencyGate {
    pub thres_a: f64,
    pub thres_b: f64,
}

impl TrendFilter for FrequencyGate {
    fn name(&self) -> &'static str {
        "frequency"
    }

    fn accepts(&self, entry: &Entry) -> bool {
        let mean = entry.mean.unwrap_or(0.0);
        let stddev = entry.stddev.unwrap_or(0.0);
        stddev > 0.0 && (mean > self.thres_a || (mean > self.thres_b && stddev < mean / 2.0))
    }
}

/// Recency gate: the strongest relative-frequency bin must lie in the newer
/// half of the series (series run oldest to newest).
pub struct RecencyGate;

impl TrendFilter for RecencyGate {
    fn name(&self) -> &'static str {
        "recency"
    }

    fn accepts(&self, entry: &Entry) -> bool {
        let Some(series) = entry.series_rel.as_ref() else {
            return false;
        };
        if series.is_empty() {
            return false;
        }
        let peak = series
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(i, _)| i)
            .unwrap_or(0);
        peak >= series.len() / 2
    }
}

/// The default chain for a strictness setting.
pub fn default_chain(setting: Setting) -> Vec<Box<dyn TrendFilter>> {
    match setting {
        Setting::Loose => vec![Box::new(FrequencyGate {
            thres_a: 0.5,
            thres_b: 0.1,
        })],
        Setting::Normal => vec![
            Box::new(FrequencyGate {
                thres_a: 1.0,
                thres_b: 0.2,
            }),
            Box::new(RecencyGate),
        ],
        Setting::Strict => vec![
            Box::new(FrequencyGate {
                thres_a: 2.0,
                thres_b: 0.5,
            }),
            Box::new(RecencyGate),
        ],
    }
}

/// Words accepted by every stage of the default chain.
pub fn combined_filters(vocab: &Vocabulary, setting: Setting) -> BTreeSet<String> {
    let chain = default_chain(setting);
    vocab
        .iter()
        .filter(|(_, entry)| chain.iter().all(|f| f.accepts(entry)))
        .map(|(word, _)| word.clone())
        .collect()
}

/// Apply the chain for a user-supplied setting string, returning the
/// accepted words sorted alphabetically.
pub fn apply_filters(vocab: &Vocabulary, raw_setting: &str) -> Vec<String> {
    let setting = Setting::parse_or_default(raw_setting);
    combined_filters(vocab, setting).into_iter().collect()
}
