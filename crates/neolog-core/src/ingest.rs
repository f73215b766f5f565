//! Corpus discovery and the document worker pool.
//!
//! Files are processed one per task on a bounded rayon pool. Everything per
//! file — reading, parsing, date and heading extraction, tokenization — is a
//! pure function of the file's bytes producing a local observation batch;
//! only the batch merge touches shared state (the sharded
//! [`VocabBuilder`]). A document that cannot be used is skipped with a
//! reason, never aborting the batch.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use rayon::prelude::*;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

use neolog_types::{
    DocumentParser, LanguageResource, Observation, ParseError, RawDocument, RelevanceFilter,
    Vocabulary,
};

use crate::dates::calc_timediff;
use crate::normalize::refine_vocab;
use crate::vocab::VocabBuilder;

/// File suffix the corpus walk collects.
pub const CORPUS_SUFFIX: &str = "xml";

/// Default worker count: one per core, capped at 16.
pub fn default_threads() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(16)
}

/// Knobs for one ingestion run. The reference date is explicit so that runs
/// are reproducible regardless of when they execute.
#[derive(Debug)]
pub struct IngestOptions {
    /// "Today" for all day-offset computations.
    pub reference: NaiveDate,
    /// Upper bound (inclusive) on accepted day-offsets.
    pub max_diff: i64,
    /// Lower bound (exclusive) on accepted day-offsets.
    pub min_diff: i64,
    /// Documents whose author matches are skipped entirely.
    pub author_exclude: Option<Regex>,
    /// Extract sources and headings; off for plain frequency runs.
    pub details: bool,
    /// Keep candidate new words only (drop known dictionary forms).
    pub lemma_filter: bool,
    /// Fold hyphenated variants into existing hyphen-free counterparts.
    pub dehyphenate: bool,
    /// Worker pool size.
    pub threads: usize,
}

impl IngestOptions {
    pub fn new(reference: NaiveDate) -> Self {
        Self {
            reference,
            max_diff: 1000,
            min_diff: 0,
            author_exclude: None,
            details: true,
            lemma_filter: false,
            dehyphenate: true,
            threads: default_threads(),
        }
    }
}

/// Why a single document was left out of the vocabulary. Informational; the
/// pool logs these and carries on.
#[derive(Debug, Error)]
pub enum DocumentSkip {
    #[error("failed to read file: {0}")]
    Io(#[from] io::Error),
    #[error("unparseable document: {0}")]
    Parse(#[from] ParseError),
    #[error("missing or unparseable date")]
    BadDate,
    #[error("day offset {0} outside the ingestion window")]
    OutOfRange(i64),
    #[error("author matched the exclusion pattern")]
    AuthorExcluded,
}

/// A whole ingestion run failed to start; per-document problems never
/// surface here.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to scan corpus directory: {0}")]
    Io(#[from] io::Error),
    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Recursively collect files with the given suffix, sorted for stable
/// processing order.
pub fn find_files(dir: &Path, suffix: &str) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    collect_files(dir, suffix, &mut files)?;
    files.sort();
    Ok(files)
}

fn collect_files(dir: &Path, suffix: &str, out: &mut Vec<PathBuf>) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_files(&path, suffix, out)?;
        } else if path.extension().and_then(|e| e.to_str()) == Some(suffix) {
            out.push(path);
        }
    }
    Ok(())
}

/// Source identifier for a document: the URL's domain when present, else the
/// publisher field.
fn extract_source(doc: &RawDocument) -> Option<String> {
    if let Some(raw) = &doc.url
        && let Ok(url) = Url::parse(raw)
        && let Some(host) = url.host_str()
    {
        let domain = host.strip_prefix("www.").unwrap_or(host);
        return Some(domain.to_string());
    }
    doc.publisher
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
}

/// Turn one parsed document into observation tuples, or say why it cannot be
/// used.
pub fn read_document(
    bytes: &[u8],
    parser: &dyn DocumentParser,
    resource: &dyn LanguageResource,
    relevance: &dyn RelevanceFilter,
    opts: &IngestOptions,
) -> Result<Vec<Observation>, DocumentSkip> {
    let doc = parser.parse(bytes)?;

    let date = doc.date.as_deref().ok_or(DocumentSkip::BadDate)?;
    let day_offset = calc_timediff(opts.reference, date).ok_or(DocumentSkip::BadDate)?;
    if day_offset <= opts.min_diff || day_offset > opts.max_diff {
        return Err(DocumentSkip::OutOfRange(day_offset));
    }

    if let Some(pattern) = &opts.author_exclude
        && let Some(author) = &doc.author
        && pattern.is_match(author)
    {
        return Err(DocumentSkip::AuthorExcluded);
    }

    let source = if opts.details {
        extract_source(&doc)
    } else {
        None
    };
    let headwords: HashSet<String> = if opts.details {
        doc.heading_texts
            .iter()
            .flat_map(|text| resource.tokenize(text))
            .filter(|t| relevance.is_relevant(t))
            .collect()
    } else {
        HashSet::new()
    };

    let observations = resource
        .tokenize(&doc.body_text)
        .into_iter()
        .filter(|t| relevance.is_relevant(t))
        .map(|wordform| {
            let in_heading = headwords.contains(&wordform);
            Observation {
                wordform,
                day_offset,
                source: source.clone(),
                in_heading,
            }
        })
        .collect();
    Ok(observations)
}

fn read_file(
    path: &Path,
    parser: &dyn DocumentParser,
    resource: &dyn LanguageResource,
    relevance: &dyn RelevanceFilter,
    opts: &IngestOptions,
) -> Result<Vec<Observation>, DocumentSkip> {
    let bytes = fs::read(path)?;
    read_document(&bytes, parser, resource, relevance, opts)
}

/// Ingest a directory of corpus files into a refined vocabulary: discover,
/// parse and tokenize on the worker pool, merge into the shared builder,
/// then run the morphological passes.
pub fn gen_wordlist(
    dir: &Path,
    parser: &dyn DocumentParser,
    resource: &dyn LanguageResource,
    relevance: &dyn RelevanceFilter,
    opts: &IngestOptions,
) -> Result<Vocabulary, IngestError> {
    let files = find_files(dir, CORPUS_SUFFIX)?;
    info!(files = files.len(), "discovered corpus files");

    let builder = VocabBuilder::new();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(opts.threads)
        .build()?;
    pool.install(|| {
        files.par_iter().for_each(|path| {
            match read_file(path, parser, resource, relevance, opts) {
                Ok(observations) => builder.put_batch(observations),
                Err(reason) => debug!(path = %path.display(), %reason, "document skipped"),
            }
        });
    });

    let mut vocab = builder.into_vocabulary();
    info!(words = vocab.len(), "vocabulary merged");
    refine_vocab(&mut vocab, resource, opts.lemma_filter, opts.dehyphenate);
    Ok(vocab)
}
