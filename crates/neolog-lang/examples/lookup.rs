//! Look up lemmas from a dictionary directory.
//!
//! Usage: `cargo run -p neolog-lang --example lookup -- <data-dir> <langs> <word>...`
//! where `<langs>` is a comma-separated list of language codes.

use anyhow::{Context, Result};
use neolog_lang::LemmaData;
use neolog_types::LanguageResource;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let dir = args.next().context("missing data directory argument")?;
    let langs = args.next().context("missing language codes argument")?;
    let codes: Vec<&str> = langs.split(',').collect();

    let data = LemmaData::load(&dir, &codes)?;
    println!(
        "loaded {} languages, {} surface forms",
        data.language_count(),
        data.form_count()
    );

    for word in args {
        match data.lemmatize(&word) {
            Some(lemma) => println!("{word} -> {lemma}"),
            None => println!("{word} -> (no analysis)"),
        }
    }
    Ok(())
}
