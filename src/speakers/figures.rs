/*!
 * Character names from the dramatis personae (table of contents) text.
 */

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::page::PageDocument;

static POSSESSIVE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"['‘’`´]s\b").expect("Invalid possessive regex"));

static HAS_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-zÄÖÜäöüß]").expect("Invalid letter regex"));

static NOBILIARY_PARTICLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s+von.*$").expect("Invalid particle regex"));

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("Invalid non-word regex"));

/// Number of leading words of a line that may hold names
const NAME_WORDS: usize = 3;

/// Text of every TOC line across the documents, one per line
pub fn dramatis_personae(documents: &[PageDocument]) -> String {
    documents
        .iter()
        .flat_map(PageDocument::toc_lines)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Extract normalized character names from dramatis personae lines.
///
/// Only the first three words of a line are considered, split on commas.
/// Catch-word lines (`^`) are ignored.
pub fn extract_figures(dramatis_personae: &str) -> BTreeSet<String> {
    let mut figures = BTreeSet::new();

    for line in dramatis_personae.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('^') {
            continue;
        }

        let line = POSSESSIVE.replace_all(line, "");
        let head = line.split_whitespace().take(NAME_WORDS).collect::<Vec<_>>().join(" ");

        for part in head.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            if !HAS_LETTER.is_match(part) {
                continue;
            }
            let name = NOBILIARY_PARTICLE.replace(part, "");
            let name = NON_WORD.replace_all(name.trim(), "").replace('ſ', "s");
            let name = name.trim().to_lowercase();
            if !name.is_empty() {
                figures.insert(name);
            }
        }
    }

    figures
}
