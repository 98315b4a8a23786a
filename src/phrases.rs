use anyhow::{Context, Result};
use rand::Rng;
use std::path::Path;
use strum::{Display, EnumString};

/// Column header selecting the phrases in the input file.
const PHRASE_COLUMN: &str = "english";

#[derive(Debug, Clone, Copy, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    fn as_char(self) -> char {
        match self {
            Delimiter::Comma => ',',
            Delimiter::Tab => '\t',
        }
    }
}

pub fn load_phrases(path: &Path, delimiter: Delimiter) -> Result<Vec<String>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read phrase file `{}`", path.display()))?;
    parse_phrases(&contents, delimiter)
}

fn parse_phrases(contents: &str, delimiter: Delimiter) -> Result<Vec<String>> {
    let separator = delimiter.as_char();
    let mut lines = contents.lines();

    let header = lines.next().context("Phrase file is empty")?;
    let column = header
        .split(separator)
        .position(|name| name.trim() == PHRASE_COLUMN)
        .with_context(|| format!("Phrase file has no `{PHRASE_COLUMN}` column"))?;

    let phrases: Vec<String> = lines
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| line.split(separator).nth(column))
        .map(|cell| cell.trim().to_owned())
        .filter(|phrase| !phrase.is_empty())
        .collect();

    anyhow::ensure!(!phrases.is_empty(), "Phrase file contains no phrases");
    Ok(phrases)
}

/// Picks a phrase uniformly at random. `phrases` must be non-empty, which
/// `load_phrases` guarantees.
pub fn select_phrase(phrases: &[String]) -> &str {
    let index = rand::thread_rng().gen_range(0..phrases.len());
    &phrases[index]
}
