//! End-to-end pipeline runs over a synthetic corpus.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use neolog_core::{
    IngestOptions, apply_filters, gen_freqlist, load_snapshot, save_snapshot, store_freqlist,
};
use neolog_core::filters::SimpleRelevance;
use neolog_lang::LemmaData;
use neolog_types::{DocumentParser, ParseError, RawDocument};
use tempfile::TempDir;

/// Minimal line-oriented test format: `key=value` metadata lines, everything
/// else is body text. The engine only sees the `DocumentParser` interface,
/// so the format is arbitrary.
struct LineParser;

impl DocumentParser for LineParser {
    fn parse(&self, bytes: &[u8]) -> Result<RawDocument, ParseError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ParseError::Encoding)?;
        let mut doc = RawDocument::default();
        let mut body = String::new();
        for line in text.lines() {
            if let Some(value) = line.strip_prefix("date=") {
                doc.date = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("publisher=") {
                doc.publisher = Some(value.to_string());
            } else if let Some(value) = line.strip_prefix("heading=") {
                doc.heading_texts.push(value.to_string());
            } else {
                body.push_str(line);
                body.push(' ');
            }
        }
        doc.body_text = body;
        Ok(doc)
    }
}

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
}

fn write_doc(dir: &Path, name: &str, date: &str, heading: Option<&str>, body: &str) {
    let mut content = format!("date={date}\npublisher=Trend Post\n");
    if let Some(heading) = heading {
        content.push_str(&format!("heading={heading}\n"));
    }
    content.push_str(body);
    content.push('\n');
    fs::write(dir.join(format!("{name}.xml")), content).unwrap();
}

fn build_corpus(dir: &Path) {
    // Day-offsets from the 2021-06-01 reference: 3, 7, 9, 12, 15, 18, 20, 28.
    write_doc(dir, "a", "2021-05-29", None, "common chatter beyond the window");
    write_doc(dir, "b", "2021-05-25", None, "neolword begins common talk");
    write_doc(dir, "c", "2021-05-23", Some("neolword"), "neolword gains ground common talk");
    write_doc(dir, "d", "2021-05-20", None, "neolword everywhere common talk");
    write_doc(dir, "e", "2021-05-17", None, "common talk continues");
    write_doc(dir, "f", "2021-05-14", None, "common talk continues");
    write_doc(dir, "g", "2021-05-12", None, "common talk begins");
    write_doc(dir, "h", "2021-05-04", None, "common talk ancient");
}

#[test]
fn corpus_to_scored_vocabulary() {
    let dir = TempDir::new().unwrap();
    build_corpus(dir.path());

    let mut opts = IngestOptions::new(reference());
    opts.threads = 2;
    let vocab = gen_freqlist(
        dir.path(),
        &LineParser,
        &LemmaData::empty(),
        &SimpleRelevance,
        &opts,
        7,
    )
    .unwrap();

    // Bins over the observed span are [21, 14, 7]; only words with at least
    // two occurrences inside [7, 21) survive.
    let mut words: Vec<&String> = vocab.keys().collect();
    words.sort();
    assert_eq!(words, ["begins", "common", "continues", "neolword", "talk"]);

    let neolword = &vocab["neolword"];
    assert!(neolword.headings);
    assert_eq!(neolword.sources["Trend Post"], 3);
    assert_eq!(neolword.series_rel.as_ref().unwrap().len(), 3);
    assert!(neolword.time_series.is_empty());
    assert!(neolword.series_abs.is_none());
    assert!(neolword.stddev.unwrap() > 0.0);

    // Series totals are consistent across entries.
    for entry in vocab.values() {
        assert_eq!(entry.series_rel.as_ref().unwrap().len(), 3);
        assert!(entry.total.is_some());
    }
}

#[test]
fn scored_vocabulary_survives_snapshot_and_export() {
    let dir = TempDir::new().unwrap();
    build_corpus(dir.path());

    let opts = IngestOptions::new(reference());
    let vocab = gen_freqlist(
        dir.path(),
        &LineParser,
        &LemmaData::empty(),
        &SimpleRelevance,
        &opts,
        7,
    )
    .unwrap();

    let snapshot = dir.path().join("vocab.gz");
    save_snapshot(&vocab, &snapshot).unwrap();
    let restored = load_snapshot(&snapshot).unwrap();
    assert_eq!(restored, vocab);

    let report = dir.path().join("report.tsv");
    store_freqlist(&restored, &report, 1.0, 0.2).unwrap();
    let content = fs::read_to_string(&report).unwrap();
    let mut lines = content.lines();
    assert_eq!(lines.next(), Some("word\ttotal\tmean\tstddev\trelfreqs"));
    // Rows are alphabetical and only carry dispersed series.
    let rows: Vec<&str> = lines.collect();
    let mut row_words: Vec<&str> = rows
        .iter()
        .map(|row| row.split('\t').next().unwrap())
        .collect();
    let sorted = {
        let mut sorted = row_words.clone();
        sorted.sort();
        sorted
    };
    assert_eq!(row_words, sorted);
    assert!(row_words.contains(&"neolword"));
    row_words.retain(|w| *w == "continues");
    // "continues" sits in a single bin, has zero dispersion and stays out.
    assert!(row_words.is_empty());
}

#[test]
fn significance_chain_flags_the_rising_word() {
    let dir = TempDir::new().unwrap();
    build_corpus(dir.path());

    let opts = IngestOptions::new(reference());
    let vocab = gen_freqlist(
        dir.path(),
        &LineParser,
        &LemmaData::empty(),
        &SimpleRelevance,
        &opts,
        7,
    )
    .unwrap();

    let accepted = apply_filters(&vocab, "normal");
    assert!(accepted.contains(&"neolword".to_string()));
    // Unknown settings degrade to normal instead of failing.
    assert_eq!(apply_filters(&vocab, "bogus"), accepted);
}

#[test]
fn short_corpus_spans_produce_an_empty_result() {
    let dir = TempDir::new().unwrap();
    write_doc(dir.path(), "a", "2021-05-30", None, "brief common words");
    write_doc(dir.path(), "b", "2021-05-29", None, "brief common words");

    let opts = IngestOptions::new(reference());
    let vocab = gen_freqlist(
        dir.path(),
        &LineParser,
        &LemmaData::empty(),
        &SimpleRelevance,
        &opts,
        7,
    )
    .unwrap();
    assert!(vocab.is_empty());
}

#[test]
fn lemma_pass_merges_variants_during_ingestion() {
    let corpus = TempDir::new().unwrap();
    write_doc(
        corpus.path(),
        "a",
        "2021-05-25",
        None,
        "walked walking sidewalk",
    );
    write_doc(corpus.path(), "b", "2021-05-20", None, "walk walked");

    let data_dir = TempDir::new().unwrap();
    fs::write(
        data_dir.path().join("en.tsv"),
        "walk\twalk\nwalked\twalk\nwalking\twalk\nsidewalk\tsidewalk\n",
    )
    .unwrap();
    let resource = LemmaData::load(data_dir.path(), &["en"]).unwrap();

    let opts = IngestOptions::new(reference());
    let vocab = neolog_core::gen_wordlist(
        corpus.path(),
        &LineParser,
        &resource,
        &SimpleRelevance,
        &opts,
    )
    .unwrap();

    assert_eq!(vocab["walk"].occurrences(), 4);
    assert!(!vocab.contains_key("walked"));
    assert!(!vocab.contains_key("walking"));
    assert_eq!(vocab["sidewalk"].occurrences(), 1);
}
