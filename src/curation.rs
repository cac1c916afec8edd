/*!
 * Operator curation steps between extraction and cleanup.
 *
 * Every function takes the current EzDrama text (or its lines) plus the
 * operator's decisions and returns the corrected text. The CLI gathers the
 * decisions; nothing here prompts or touches the filesystem.
 */

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};
use serde::Serialize;

/// A complete speaker line: `@Name.`
static SPEAKER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^@(.*)\.$").expect("Invalid speaker line regex"));

/// Any `@` line in a multi-line text
static SPEAKER_LABEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^@(.*?)$").expect("Invalid speaker label regex"));

/// Parenthesized run, possibly spanning lines
static BRACKET_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\(.*?\)").expect("Invalid bracket regex"));

/// A line that starts with a known speaker but was not tagged
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissedSpeakerLine {
    /// Zero-based line index
    pub index: usize,
    pub speaker: String,
    pub line: String,
}

/// Names of all complete `@Name.` lines, sorted
fn known_speakers(lines: &[&str]) -> BTreeSet<String> {
    lines
        .iter()
        .filter_map(|line| SPEAKER_LINE.captures(line.trim()))
        .map(|caps| caps[1].to_string())
        .collect()
}

fn leading_speaker<'a>(line: &str, speakers: &'a BTreeSet<String>) -> Option<&'a String> {
    speakers.iter().find(|speaker| {
        !speaker.is_empty()
            && (line == speaker.as_str()
                || line
                    .strip_prefix(speaker.as_str())
                    .is_some_and(|rest| rest.starts_with(' ')))
    })
}

/// Untagged lines opening with a speaker name that is tagged elsewhere
pub fn find_missed_speaker_lines(lines: &[&str]) -> Vec<MissedSpeakerLine> {
    let speakers = known_speakers(lines);
    lines
        .iter()
        .enumerate()
        .filter_map(|(index, line)| {
            leading_speaker(line.trim(), &speakers).map(|speaker| MissedSpeakerLine {
                index,
                speaker: speaker.clone(),
                line: line.trim_end_matches(['\r', '\n']).to_string(),
            })
        })
        .collect()
}

/// Rewrite the selected lines into `@Name.` plus the rest of the line
pub fn rewrite_speaker_lines(lines: &[&str], selection: &BTreeSet<usize>) -> Vec<String> {
    let speakers = known_speakers(lines);
    let mut output = Vec::with_capacity(lines.len());

    for (index, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        let speaker = selection
            .contains(&index)
            .then(|| leading_speaker(trimmed, &speakers))
            .flatten();

        match speaker {
            Some(speaker) => {
                output.push(format!("@{}.", speaker));
                let rest = trimmed[speaker.len()..].trim_start();
                if !rest.is_empty() {
                    output.push(rest.to_string());
                }
            }
            None => output.push(line.trim_end_matches(['\r', '\n']).to_string()),
        }
    }

    output
}

/// Every parenthesized run in document order, brackets included
pub fn extract_bracket_contents(text: &str) -> Vec<String> {
    BRACKET_RUN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Replace the first `edits.len()` parenthesized runs with the edits, in order
pub fn replace_bracket_contents(text: &str, edits: &[String]) -> String {
    let mut edits = edits.iter();
    let mut result = String::with_capacity(text.len());
    let mut last = 0;

    for m in BRACKET_RUN.find_iter(text) {
        let Some(edit) = edits.next() else {
            break;
        };
        result.push_str(&text[last..m.start()]);
        result.push_str(edit);
        last = m.end();
    }

    result.push_str(&text[last..]);
    result
}

/// Sorted unique labels of all `@` lines
pub fn detect_speaker_labels(text: &str) -> Vec<String> {
    SPEAKER_LABEL
        .captures_iter(text)
        .map(|caps| caps[1].trim_end_matches('\r').to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Map spelling variants to one normalized speaker.
///
/// `groups` maps a bare name ("Klingbeil") to the labels that mean it
/// ("Klingb.", "Klingbeil"). Every whole line `@<variant>` becomes `@<name>.`.
pub fn unify_speakers(text: &str, groups: &BTreeMap<String, Vec<String>>) -> String {
    let mut unified = text.to_string();

    for (name, variants) in groups {
        let replacement = format!("@{}.", name.trim());
        for variant in variants {
            let pattern = format!(r"(?m)^@{}\r?$", regex::escape(variant));
            // variants are escaped, so the pattern is always valid
            if let Ok(re) = Regex::new(&pattern) {
                unified = re.replace_all(&unified, NoExpand(&replacement)).into_owned();
            }
        }
    }

    unified
}
