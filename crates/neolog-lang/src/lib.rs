//! Language data loading, tokenization and lemmatization.
//!
//! Lemma dictionaries are plain TSV files, one `surface<TAB>lemma` pair per
//! line, named `<language code>.tsv` inside a data directory. [`LemmaData`]
//! loads one dictionary per requested language code and tries them in the
//! order given.
//!
//! Lemmatization is lookup-first: exact surface form, then the decapitalized
//! form, then a small set of suffix rules whose candidates are only accepted
//! when the dictionary knows them. The crate stays decoupled from the engine;
//! it merely implements the [`LanguageResource`] interface the engine
//! consumes.
//!
//! # Example
//! ```no_run
//! use neolog_lang::LemmaData;
//! use neolog_types::LanguageResource;
//!
//! # fn main() -> anyhow::Result<()> {
//! let data = LemmaData::load("data/lemmas", &["de", "en"])?;
//! assert_eq!(data.lemmatize("tests"), Some("test".to_string()));
//! # Ok(()) }
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use neolog_types::LanguageResource;

/// Lemma dictionaries for a prioritized list of languages.
#[derive(Debug, Default)]
pub struct LemmaData {
    tables: Vec<(String, HashMap<String, String>)>,
}

impl LemmaData {
    /// No language data at all; the engine skips the lemma pass.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load `<code>.tsv` from `data_dir` for every requested language code,
    /// keeping the requested order for lookup priority.
    pub fn load(data_dir: impl AsRef<Path>, langcodes: &[&str]) -> Result<Self> {
        let dir = data_dir.as_ref();
        let mut tables = Vec::with_capacity(langcodes.len());
        for code in langcodes {
            let path = dir.join(format!("{code}.tsv"));
            let table = load_dictionary(&path)
                .with_context(|| format!("load lemma data for '{code}' from {}", path.display()))?;
            tables.push((code.to_string(), table));
        }
        Ok(Self { tables })
    }

    /// Number of loaded languages.
    pub fn language_count(&self) -> usize {
        self.tables.len()
    }

    /// Total number of surface forms across all dictionaries.
    pub fn form_count(&self) -> usize {
        self.tables.iter().map(|(_, t)| t.len()).sum()
    }

    fn lookup(&self, form: &str) -> Option<&str> {
        self.tables
            .iter()
            .find_map(|(_, table)| table.get(form).map(String::as_str))
    }

    fn contains(&self, form: &str) -> bool {
        self.tables.iter().any(|(_, table)| table.contains_key(form))
    }
}

impl LanguageResource for LemmaData {
    fn tokenize(&self, text: &str) -> Vec<String> {
        tokenize(text)
    }

    fn is_known(&self, token: &str) -> bool {
        self.contains(token)
    }

    fn lemmatize(&self, token: &str) -> Option<String> {
        // Exact surface form first.
        if let Some(lemma) = self.lookup(token) {
            return Some(lemma.to_string());
        }
        // Sentence-initial capitalization: retry decapitalized.
        let decapitalized = decapitalize(token);
        if decapitalized != token
            && let Some(lemma) = self.lookup(&decapitalized)
        {
            return Some(lemma.to_string());
        }
        // Suffix-rule guesses, accepted only when the dictionary knows the
        // candidate.
        for (suffix, replacement) in SUFFIX_RULES {
            if let Some(stem) = token.strip_suffix(suffix) {
                if stem.is_empty() {
                    continue;
                }
                let candidate = format!("{stem}{replacement}");
                if self.contains(&candidate) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    fn is_empty(&self) -> bool {
        self.tables.iter().all(|(_, table)| table.is_empty())
    }
}

/// Split text into word tokens: maximal runs of alphanumeric characters,
/// keeping inner hyphens and apostrophes ("mother-in-law", "don't").
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            current.push(ch);
        } else if matches!(ch, '-' | '\'' | '\u{2019}') && !current.is_empty() {
            current.push(ch);
        } else {
            flush_token(&mut current, &mut tokens);
        }
    }
    flush_token(&mut current, &mut tokens);
    tokens
}

fn flush_token(current: &mut String, tokens: &mut Vec<String>) {
    // Joiners are only kept between alphanumeric characters.
    while current
        .chars()
        .next_back()
        .is_some_and(|c| matches!(c, '-' | '\'' | '\u{2019}'))
    {
        current.pop();
    }
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

fn decapitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn load_dictionary(path: &Path) -> Result<HashMap<String, String>> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let mut table = HashMap::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("read line {}", lineno + 1))?;
        if line.is_empty() {
            continue;
        }
        let Some((surface, lemma)) = line.split_once('\t') else {
            anyhow::bail!("line {}: expected 'surface<TAB>lemma'", lineno + 1);
        };
        table.insert(surface.to_string(), lemma.trim().to_string());
    }
    Ok(table)
}

/// Generic inflection endings tried as a last resort, most specific first.
const SUFFIX_RULES: &[(&str, &str)] = &[
    ("ies", "y"),
    ("ches", "ch"),
    ("shes", "sh"),
    ("ses", "s"),
    ("xes", "x"),
    ("es", "e"),
    ("es", ""),
    ("s", ""),
    ("ed", "e"),
    ("ed", ""),
    ("ing", "e"),
    ("ing", ""),
    ("er", ""),
    ("est", ""),
    ("en", ""),
];
