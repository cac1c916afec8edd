/*!
 * Speaker label harvesting and ranking.
 *
 * Speaker labels in printed drama are short capitalized runs closed by a dot
 * near the start of a line ("Hans.", "Der Graf."). Every such prefix found in
 * paragraph text becomes a candidate, ranked against the dramatis personae.
 */

use std::collections::{BTreeMap, BTreeSet};

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::app_config::SpeakerConfig;
use crate::speakers::matcher::{SpeakerMatcher, Verdict, clean_label};

/// Lowercase `v`/`V` openers ("v. Berg.") are accepted besides capitals
static PARTICLE_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[vV](\.|\s|,|;)\s*").expect("Invalid particle regex"));

/// Labels harvested from paragraph lines
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelHarvest {
    /// Raw labels, each ending with its dot
    pub labels: BTreeSet<String>,

    /// First full line seen for each cleaned label
    pub examples: BTreeMap<String, String>,
}

impl LabelHarvest {
    /// Collect candidate labels from unprefixed paragraph lines
    pub fn from_lines<I, S>(lines: I, config: &SpeakerConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut harvest = Self::default();

        for line in lines {
            let clean_text = line.as_ref().trim_start_matches(['#', '@', '$', '^']).trim();
            let starts_like_label = clean_text.chars().next().is_some_and(char::is_uppercase)
                || PARTICLE_START.is_match(clean_text);
            if !starts_like_label {
                continue;
            }

            let dots = clean_text
                .char_indices()
                .enumerate()
                .filter(|(_, (_, c))| *c == '.')
                .take_while(|(position, _)| *position <= config.label_dot_window)
                .map(|(_, (byte, _))| byte)
                .take(config.max_labels_per_line);

            for byte in dots {
                let label = clean_text[..=byte].trim().to_string();
                harvest
                    .examples
                    .entry(clean_label(&label))
                    .or_insert_with(|| clean_text.to_string());
                harvest.labels.insert(label);
            }
        }

        debug!("Harvested {} speaker label candidates", harvest.labels.len());
        harvest
    }

    /// Example line for a label: by its cleaned form, else by its first known token
    pub fn example_for(&self, label: &str) -> Option<&str> {
        let cleaned = clean_label(label);
        self.examples
            .get(&cleaned)
            .or_else(|| cleaned.split_whitespace().find_map(|token| self.examples.get(token)))
            .map(String::as_str)
    }

    /// Number of example keys containing the cleaned label or one of its tokens
    pub fn example_count(&self, label: &str) -> usize {
        let cleaned = clean_label(label);
        let tokens: Vec<&str> = cleaned.split_whitespace().collect();
        self.examples
            .keys()
            .filter(|key| key.contains(cleaned.as_str()) || tokens.iter().any(|t| key.contains(t)))
            .count()
    }
}

/// One label with its ranking against the dramatis personae
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeakerCandidate {
    pub raw_label: String,
    pub best_match: Option<String>,
    pub similarity: f64,
    pub example_context: Option<String>,
    pub example_count: usize,
    pub verdict: Verdict,
}

impl SpeakerCandidate {
    /// Whether the label is kept without asking the operator
    pub fn is_accepted(&self, config: &SpeakerConfig) -> bool {
        self.similarity > config.accept_threshold
    }
}

/// Rank every harvested label, in label order
pub fn rank_candidates(harvest: &LabelHarvest, matcher: &SpeakerMatcher, config: &SpeakerConfig) -> Vec<SpeakerCandidate> {
    harvest
        .labels
        .iter()
        .map(|label| {
            let (best_match, similarity) = matcher.best_match(label);
            SpeakerCandidate {
                raw_label: label.clone(),
                best_match,
                similarity,
                example_context: harvest.example_for(label).map(str::to_string),
                example_count: harvest.example_count(label),
                verdict: Verdict::classify(similarity, config),
            }
        })
        .collect()
}

/// Labels accepted by score alone
pub fn accepted_labels(candidates: &[SpeakerCandidate], config: &SpeakerConfig) -> Vec<String> {
    candidates
        .iter()
        .filter(|c| c.is_accepted(config))
        .map(|c| c.raw_label.clone())
        .collect()
}
