use std::env;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use chrono::NaiveDate;
use regex::Regex;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use neolog_cli::TeiParser;
use neolog_core::filters::SimpleRelevance;
use neolog_core::{
    IngestOptions, apply_filters, gen_freqlist, load_snapshot, load_wordlist, save_snapshot,
    score_frequencies, store_freqlist,
};
use neolog_lang::LemmaData;

const DEFAULT_INTERVAL: i64 = 7;
const DEFAULT_MAX_DIFF: i64 = 1000;
const DEFAULT_MIN_DIFF: i64 = 0;
const DEFAULT_THRES_A: f64 = 1.0;
const DEFAULT_THRES_B: f64 = 0.2;
const DEFAULT_REPORT: &str = "freqs.tsv";

fn main() -> Result<()> {
    init_tracing();

    let mut args = env::args().skip(1);
    let command = args.next().unwrap_or_default();
    let rest: Vec<String> = args.collect();
    match command.as_str() {
        "ingest" => cmd_ingest(&rest),
        "wordlist" => cmd_wordlist(&rest),
        "filter" => cmd_filter(&rest),
        "" | "help" | "--help" => {
            print_usage();
            Ok(())
        }
        other => {
            print_usage();
            bail!("unknown command '{other}'");
        }
    }
}

fn print_usage() {
    eprintln!(
        "usage:
  neolog ingest <corpus-dir> [--report=PATH] [--snapshot=PATH] [options]
  neolog wordlist <file.tsv> [--report=PATH] [--snapshot=PATH] [options]
  neolog filter <snapshot> [--setting=loose|normal|strict]

options:
  --langs=CODES            comma-separated language codes (env NEOLOG_LANGS)
  --lang-data=DIR          lemma dictionary directory (env NEOLOG_LANG_DATA)
  --today=YYYY-MM-DD       reference date for day offsets (default: today)
  --interval=DAYS          bin width in days (default {DEFAULT_INTERVAL})
  --max-diff=DAYS          oldest accepted day offset (default {DEFAULT_MAX_DIFF})
  --min-diff=DAYS          newest accepted day offset, exclusive (default {DEFAULT_MIN_DIFF})
  --threads=N              worker pool size (env NEOLOG_THREADS)
  --exclude-authors=REGEX  skip documents whose author matches
  --lemma-filter           keep candidate new words only
  --no-dehyphenation       keep hyphenated variants separate
  --no-details             skip source and heading extraction
  --thres-a=F --thres-b=F  report significance thresholds"
    );
}

#[derive(Debug)]
struct Options {
    target: PathBuf,
    report: Option<PathBuf>,
    snapshot: Option<PathBuf>,
    langs: Vec<String>,
    lang_data: Option<PathBuf>,
    today: NaiveDate,
    interval: i64,
    max_diff: i64,
    min_diff: i64,
    threads: usize,
    exclude_authors: Option<Regex>,
    lemma_filter: bool,
    dehyphenate: bool,
    details: bool,
    thres_a: f64,
    thres_b: f64,
    setting: String,
}

fn parse_options(args: &[String]) -> Result<Options> {
    let mut target: Option<PathBuf> = None;
    let mut opts = Options {
        target: PathBuf::new(),
        report: None,
        snapshot: None,
        langs: env_list("NEOLOG_LANGS"),
        lang_data: env::var("NEOLOG_LANG_DATA").ok().map(PathBuf::from),
        today: chrono::Local::now().date_naive(),
        interval: DEFAULT_INTERVAL,
        max_diff: DEFAULT_MAX_DIFF,
        min_diff: DEFAULT_MIN_DIFF,
        threads: env::var("NEOLOG_THREADS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or_else(neolog_core::default_threads),
        exclude_authors: None,
        lemma_filter: false,
        dehyphenate: true,
        details: true,
        thres_a: DEFAULT_THRES_A,
        thres_b: DEFAULT_THRES_B,
        setting: "normal".to_string(),
    };

    for arg in args {
        if let Some(value) = arg.strip_prefix("--report=") {
            opts.report = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--snapshot=") {
            opts.snapshot = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--langs=") {
            opts.langs = value.split(',').map(str::to_string).collect();
        } else if let Some(value) = arg.strip_prefix("--lang-data=") {
            opts.lang_data = Some(PathBuf::from(value));
        } else if let Some(value) = arg.strip_prefix("--today=") {
            opts.today = NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .with_context(|| format!("invalid --today value '{value}'"))?;
        } else if let Some(value) = arg.strip_prefix("--interval=") {
            opts.interval = parse_number(value, "--interval")?;
        } else if let Some(value) = arg.strip_prefix("--max-diff=") {
            opts.max_diff = parse_number(value, "--max-diff")?;
        } else if let Some(value) = arg.strip_prefix("--min-diff=") {
            opts.min_diff = parse_number(value, "--min-diff")?;
        } else if let Some(value) = arg.strip_prefix("--threads=") {
            opts.threads = parse_number(value, "--threads")?;
        } else if let Some(value) = arg.strip_prefix("--exclude-authors=") {
            let pattern = Regex::new(value)
                .with_context(|| format!("invalid --exclude-authors pattern '{value}'"))?;
            opts.exclude_authors = Some(pattern);
        } else if let Some(value) = arg.strip_prefix("--thres-a=") {
            opts.thres_a = parse_number(value, "--thres-a")?;
        } else if let Some(value) = arg.strip_prefix("--thres-b=") {
            opts.thres_b = parse_number(value, "--thres-b")?;
        } else if let Some(value) = arg.strip_prefix("--setting=") {
            opts.setting = value.to_string();
        } else if arg == "--lemma-filter" {
            opts.lemma_filter = true;
        } else if arg == "--no-dehyphenation" {
            opts.dehyphenate = false;
        } else if arg == "--no-details" {
            opts.details = false;
        } else if arg.starts_with("--") {
            bail!("unknown option '{arg}'");
        } else if target.is_none() {
            target = Some(PathBuf::from(arg));
        } else {
            bail!("unexpected argument '{arg}'");
        }
    }

    opts.target = target.context("missing input path argument")?;
    Ok(opts)
}

fn parse_number<T: std::str::FromStr>(value: &str, flag: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("invalid {flag} value '{value}'"))
}

fn env_list(name: &str) -> Vec<String> {
    env::var(name)
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn load_resource(opts: &Options) -> Result<LemmaData> {
    if opts.langs.is_empty() {
        info!("no language codes given, lemma pass disabled");
        return Ok(LemmaData::empty());
    }
    let dir = opts
        .lang_data
        .as_ref()
        .context("--langs given but no --lang-data directory (or NEOLOG_LANG_DATA)")?;
    let codes: Vec<&str> = opts.langs.iter().map(String::as_str).collect();
    let data = LemmaData::load(dir, &codes)?;
    info!(
        languages = data.language_count(),
        forms = data.form_count(),
        "lemma data loaded"
    );
    Ok(data)
}

fn ingest_options(opts: &Options) -> IngestOptions {
    let mut ingest = IngestOptions::new(opts.today);
    ingest.max_diff = opts.max_diff;
    ingest.min_diff = opts.min_diff;
    ingest.author_exclude = opts.exclude_authors.clone();
    ingest.details = opts.details;
    ingest.lemma_filter = opts.lemma_filter;
    ingest.dehyphenate = opts.dehyphenate;
    ingest.threads = opts.threads;
    ingest
}

fn write_outputs(vocab: &neolog_types::Vocabulary, opts: &Options) -> Result<()> {
    let report = opts
        .report
        .clone()
        .or_else(|| opts.snapshot.is_none().then(|| PathBuf::from(DEFAULT_REPORT)));
    if let Some(path) = report {
        store_freqlist(vocab, &path, opts.thres_a, opts.thres_b)?;
        info!(path = %path.display(), "frequency report written");
    }
    if let Some(path) = &opts.snapshot {
        save_snapshot(vocab, path)?;
        info!(path = %path.display(), "snapshot written");
    }
    Ok(())
}

fn cmd_ingest(args: &[String]) -> Result<()> {
    let opts = parse_options(args)?;
    let resource = load_resource(&opts)?;
    let parser = TeiParser::new();
    let ingest = ingest_options(&opts);

    let start = Instant::now();
    let vocab = gen_freqlist(
        &opts.target,
        &parser,
        &resource,
        &SimpleRelevance,
        &ingest,
        opts.interval,
    )?;
    info!(
        words = vocab.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "ingestion finished"
    );

    write_outputs(&vocab, &opts)
}

fn cmd_wordlist(args: &[String]) -> Result<()> {
    let opts = parse_options(args)?;
    let resource = load_resource(&opts)?;

    let start = Instant::now();
    let mut vocab = load_wordlist(&opts.target, &resource, opts.today, opts.max_diff)?;
    info!(
        words = vocab.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "word list loaded"
    );
    score_frequencies(&mut vocab, opts.interval);

    write_outputs(&vocab, &opts)
}

fn cmd_filter(args: &[String]) -> Result<()> {
    let opts = parse_options(args)?;
    let vocab = load_snapshot(&opts.target)?;
    info!(words = vocab.len(), "snapshot loaded");
    for word in apply_filters(&vocab, &opts.setting) {
        println!("{word}");
    }
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let max_level = env_filter
        .max_level_hint()
        .and_then(|hint| hint.into_level())
        .unwrap_or(Level::INFO);
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_level(true)
        .with_max_level(max_level)
        .init();
}
