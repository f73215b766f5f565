//! The TEI parser wired through the full ingestion pipeline.

use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use neolog_cli::TeiParser;
use neolog_core::filters::SimpleRelevance;
use neolog_core::{IngestOptions, gen_freqlist, gen_wordlist};
use neolog_lang::LemmaData;
use regex::Regex;
use tempfile::TempDir;

fn reference() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 6, 1).unwrap()
}

fn write_tei(dir: &Path, name: &str, date: &str, author: &str, body: &str) {
    let content = format!(
        r#"<TEI>
  <teiHeader>
    <publisher>Daily Example</publisher>
    <ptr type="URL" target="https://www.example.org/{name}"/>
    <date>{date}</date>
    <author>{author}</author>
  </teiHeader>
  <text>
    <fw>Weekly roundup</fw>
    <p>{body}</p>
  </text>
</TEI>
"#
    );
    fs::write(dir.join(format!("{name}.xml")), content).unwrap();
}

fn corpus(dir: &Path) {
    write_tei(dir, "one", "2021-05-25", "Jo Writer", "glimworth arrives with common words");
    write_tei(dir, "two", "2021-05-23", "Jo Writer", "glimworth spreads common words");
    write_tei(dir, "three", "2021-05-20", "Jo Writer", "glimworth peaks common words");
    write_tei(dir, "four", "2021-05-17", "Jo Writer", "common words continue");
    write_tei(dir, "five", "2021-05-12", "Jo Writer", "common words begin");
    write_tei(dir, "six", "2021-05-04", "Jo Writer", "common words early");
}

#[test]
fn tei_corpus_produces_scored_entries() {
    let dir = TempDir::new().unwrap();
    corpus(dir.path());

    let mut opts = IngestOptions::new(reference());
    opts.threads = 2;
    let vocab = gen_freqlist(
        dir.path(),
        &TeiParser::new(),
        &LemmaData::empty(),
        &SimpleRelevance,
        &opts,
        7,
    )
    .unwrap();

    assert!(vocab.contains_key("glimworth"));
    let entry = &vocab["glimworth"];
    assert_eq!(entry.sources["example.org"], 3);
    assert!(entry.series_rel.is_some());
    assert!(entry.total.is_some());
    // "Weekly roundup" headings never mention it.
    assert!(!entry.headings);
}

#[test]
fn author_exclusion_removes_whole_documents() {
    let dir = TempDir::new().unwrap();
    corpus(dir.path());
    write_tei(dir.path(), "wire", "2021-05-21", "Agency Newswire", "syndicated syndicated copy");

    let mut opts = IngestOptions::new(reference());
    opts.author_exclude = Some(Regex::new("(?i)newswire").unwrap());
    let vocab = gen_wordlist(
        dir.path(),
        &TeiParser::new(),
        &LemmaData::empty(),
        &SimpleRelevance,
        &opts,
    )
    .unwrap();

    assert!(!vocab.contains_key("syndicated"));
    assert!(vocab.contains_key("glimworth"));
}
