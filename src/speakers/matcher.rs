/*!
 * Fuzzy matching of speaker labels against the dramatis personae.
 *
 * Similarity is the gestalt (Ratcliff/Obershelp) ratio: twice the number of
 * characters in the longest common blocks, found recursively, divided by the
 * combined length of both strings.
 */

use std::collections::{BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::app_config::SpeakerConfig;

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("Invalid non-word regex"));

/// How likely a candidate label names a character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Probable,
    Possible,
    Unlikely,
}

impl Verdict {
    /// Band a similarity score; both bounds are exclusive
    pub fn classify(score: f64, config: &SpeakerConfig) -> Self {
        if score > config.probable_threshold {
            Self::Probable
        } else if score > config.accept_threshold {
            Self::Possible
        } else {
            Self::Unlikely
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            Self::Probable => "probably a character",
            Self::Possible => "possibly a character",
            Self::Unlikely => "not a character",
        }
    }
}

/// Remove punctuation, trim and lowercase
pub fn clean_label(label: &str) -> String {
    NON_WORD.replace_all(label, "").trim().to_lowercase()
}

/// Matches labels against a fixed set of reference names
#[derive(Debug, Clone, Default)]
pub struct SpeakerMatcher {
    names: BTreeSet<String>,
}

impl SpeakerMatcher {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &BTreeSet<String> {
        &self.names
    }

    /// Best reference name for any token of the label, with its score.
    ///
    /// An exact token match short-circuits with a score of 1.0. Equal scores
    /// prefer the name whose length is closer to the token's.
    pub fn best_match(&self, label: &str) -> (Option<String>, f64) {
        let cleaned = clean_label(label);
        let mut best: Option<&str> = None;
        let mut best_score = 0.0;

        for token in cleaned.split_whitespace() {
            let token_len = token.chars().count();
            for name in &self.names {
                if token == name {
                    return (Some(name.clone()), 1.0);
                }

                let score = gestalt_ratio(token, name);
                let name_gap = token_len.abs_diff(name.chars().count());
                let best_gap = best.map_or(100, |b| token_len.abs_diff(b.chars().count()));

                if score > best_score || (score == best_score && name_gap < best_gap) {
                    best_score = score;
                    best = Some(name.as_str());
                }
            }
        }

        (best.map(str::to_string), best_score)
    }
}

/// Gestalt pattern matching ratio in 0.0..=1.0
pub fn gestalt_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let mut positions: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        positions.entry(*c).or_default().push(j);
    }

    let matched = matching_characters(&a, &positions, 0, a.len(), 0, b.len());
    2.0 * matched as f64 / total as f64
}

fn matching_characters(
    a: &[char],
    positions: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> usize {
    let (i, j, size) = longest_match(a, positions, alo, ahi, blo, bhi);
    if size == 0 {
        return 0;
    }

    let mut matched = size;
    if alo < i && blo < j {
        matched += matching_characters(a, positions, alo, i, blo, j);
    }
    if i + size < ahi && j + size < bhi {
        matched += matching_characters(a, positions, i + size, ahi, j + size, bhi);
    }
    matched
}

/// Longest common block inside the window, earliest in `a` on ties
fn longest_match(
    a: &[char],
    positions: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // run length of the match ending at (i - 1, j), keyed by j
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next: HashMap<usize, usize> = HashMap::new();
        if let Some(js) = positions.get(c) {
            for &j in js {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_lengths.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next.insert(j, k);
                if k > best_size {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_size = k;
                }
            }
        }
        run_lengths = next;
    }

    (best_i, best_j, best_size)
}
