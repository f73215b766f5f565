//! Snapshots and flat-file exchange.
//!
//! The vocabulary snapshot is gzip-compressed bincode and round-trips every
//! field exactly. TSV import accepts `token<TAB>date[<TAB>source]` lines and
//! skips malformed ones with a warning; the frequency report writes the
//! significance-gated, alphabetically sorted word table. I/O failures here
//! are the pipeline's only fatal error class — there is no safe default for
//! "could not persist".

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use chrono::NaiveDate;
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use thiserror::Error;
use tracing::warn;

use neolog_types::{LanguageResource, Vocabulary};

use crate::dates::calc_timediff;
use crate::normalize::refine_vocab;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot codec failed: {0}")]
    Codec(#[from] bincode::Error),
    #[error("tsv i/o failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Write the vocabulary as a gzip-compressed bincode snapshot.
pub fn save_snapshot(vocab: &Vocabulary, path: impl AsRef<Path>) -> Result<(), StoreError> {
    let file = File::create(path)?;
    let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
    bincode::serialize_into(&mut encoder, vocab)?;
    let mut writer = encoder.finish()?;
    writer.flush()?;
    Ok(())
}

/// Read a snapshot written by [`save_snapshot`].
pub fn load_snapshot(path: impl AsRef<Path>) -> Result<Vocabulary, StoreError> {
    let file = File::open(path)?;
    let decoder = GzDecoder::new(BufReader::new(file));
    Ok(bincode::deserialize_from(decoder)?)
}

/// Import a pre-built word list in TSV format (`token<TAB>date` with an
/// optional third source column). Malformed lines and out-of-range dates are
/// skipped; the lemma pass and dehyphenation run afterwards as for a full
/// ingestion.
pub fn load_wordlist(
    path: impl AsRef<Path>,
    resource: &dyn LanguageResource,
    reference: NaiveDate,
    max_diff: i64,
) -> Result<Vocabulary, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .flexible(true)
        .from_path(path)?;

    let mut vocab = Vocabulary::new();
    for (lineno, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                warn!(line = lineno + 1, %err, "invalid word-list line");
                continue;
            }
        };
        let (token, date, source) = match record.len() {
            2 => (&record[0], &record[1], None),
            3 => (&record[0], &record[1], Some(&record[2])),
            fields => {
                warn!(line = lineno + 1, fields, "invalid word-list line");
                continue;
            }
        };
        let Some(day_offset) = calc_timediff(reference, date) else {
            warn!(line = lineno + 1, date, "unparseable date");
            continue;
        };
        if day_offset > max_diff {
            continue;
        }
        vocab
            .entry(token.to_string())
            .or_default()
            .record(day_offset, source, false);
    }

    refine_vocab(&mut vocab, resource, false, true);
    Ok(vocab)
}

/// Write the frequency report: one row per statistically significant word,
/// sorted alphabetically. A word qualifies when its series has dispersion at
/// all and its mean clears `thres_a` outright, or clears `thres_b` with a
/// spread below half the mean.
pub fn store_freqlist(
    vocab: &Vocabulary,
    path: impl AsRef<Path>,
    thres_a: f64,
    thres_b: f64,
) -> Result<(), StoreError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?;
    writer.write_record(["word", "total", "mean", "stddev", "relfreqs"])?;

    let mut words: Vec<&String> = vocab.keys().collect();
    words.sort();
    for word in words {
        let entry = &vocab[word];
        let stddev = entry.stddev.unwrap_or(0.0);
        if stddev == 0.0 {
            continue;
        }
        let mean = entry.mean.unwrap_or(0.0);
        if mean > thres_a || (mean > thres_b && stddev < mean / 2.0) {
            let relfreqs = entry
                .series_rel
                .as_deref()
                .unwrap_or(&[])
                .iter()
                .map(f64::to_string)
                .collect::<Vec<_>>()
                .join(",");
            writer.write_record([
                word.clone(),
                entry.total.unwrap_or(0.0).to_string(),
                mean.to_string(),
                stddev.to_string(),
                relfreqs,
            ])?;
        }
    }
    writer.flush()?;
    Ok(())
}
