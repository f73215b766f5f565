//! Morphological and orthographic vocabulary refinement.
//!
//! Two independent passes run after ingestion completes: lemma reduction
//! (fold inflected forms into their dictionary lemma) and dehyphenation
//! (fold hyphenated variants into an existing hyphen-free counterpart).
//! Merging is structural concatenation via [`Entry::absorb`]; no statistics
//! are recomputed, occurrences are only re-keyed.

use neolog_types::{Entry, LanguageResource, Vocabulary};
use tracing::debug;

/// Decide what becomes of a token in the lemma pass.
///
/// With `lemma_filter` on, tokens the dictionary already knows are dropped
/// entirely — the run is only interested in candidate new words. Otherwise
/// the token reduces to its lemma, falling back to itself when the resource
/// has no analysis.
pub fn filter_lemmaform(
    token: &str,
    resource: &dyn LanguageResource,
    lemma_filter: bool,
) -> Option<String> {
    if lemma_filter && resource.is_known(token) {
        return None;
    }
    Some(
        resource
            .lemmatize(token)
            .unwrap_or_else(|| token.to_string()),
    )
}

/// Refine the vocabulary in place: lemma pass (when language data is
/// loaded), then optional dehyphenation.
pub fn refine_vocab(
    vocab: &mut Vocabulary,
    resource: &dyn LanguageResource,
    lemma_filter: bool,
    dehyphenate: bool,
) {
    if !resource.is_empty() {
        lemma_pass(vocab, resource, lemma_filter);
    }
    if dehyphenate {
        dehyphen_vocab(vocab);
    }
}

fn lemma_pass(vocab: &mut Vocabulary, resource: &dyn LanguageResource, lemma_filter: bool) {
    let mut changes: Vec<(String, String)> = Vec::new();
    let mut deletions: Vec<String> = Vec::new();
    for token in vocab.keys() {
        match filter_lemmaform(token, resource, lemma_filter) {
            None => deletions.push(token.clone()),
            Some(lemma) if lemma != *token => changes.push((token.clone(), lemma)),
            Some(_) => {}
        }
    }
    debug!(
        merged = changes.len(),
        dropped = deletions.len(),
        "lemma pass"
    );
    for (token, lemma) in changes {
        if let Some(absorbed) = vocab.remove(&token) {
            vocab.entry(lemma).or_default().absorb(absorbed);
        }
    }
    for token in deletions {
        vocab.remove(&token);
    }
}

/// Fold hyphenated word-forms into their hyphen-free counterparts when those
/// already exist; forms without a counterpart are left untouched.
pub fn dehyphen_vocab(vocab: &mut Vocabulary) {
    let hyphenated: Vec<String> = vocab
        .keys()
        .filter(|w| w.contains('-'))
        .cloned()
        .collect();
    for wordform in hyphenated {
        let candidate = dehyphen_candidate(&wordform);
        if candidate != wordform && vocab.contains_key(&candidate) {
            if let Some(absorbed) = vocab.remove(&wordform) {
                merge_into(vocab, &candidate, absorbed);
            }
        }
    }
}

fn merge_into(vocab: &mut Vocabulary, key: &str, absorbed: Entry) {
    vocab
        .entry(key.to_string())
        .or_default()
        .absorb(absorbed);
}

/// Remove all hyphens and lowercase the rest, re-capitalizing the first
/// character when the original started uppercase.
fn dehyphen_candidate(wordform: &str) -> String {
    let mut candidate: String = wordform
        .chars()
        .filter(|c| *c != '-')
        .flat_map(char::to_lowercase)
        .collect();
    if wordform.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = candidate.chars();
        if let Some(first) = chars.next() {
            candidate = first.to_uppercase().chain(chars).collect();
        }
    }
    candidate
}
