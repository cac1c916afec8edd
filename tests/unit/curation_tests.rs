/*!
 * Tests for the operator curation transforms
 */

use std::collections::{BTreeMap, BTreeSet};
use ezdrama::curation::{
    detect_speaker_labels, extract_bracket_contents, find_missed_speaker_lines, replace_bracket_contents,
    rewrite_speaker_lines, unify_speakers,
};

#[test]
fn test_missed_then_rewrite_withAllSelected_shouldTagEveryLine() {
    let text = "@Hans.\nGuten Tag.\n@Anna.\nAnna Guten Tag!\nHans Wie geht's?\nAnnabell kommt.";
    let lines: Vec<&str> = text.lines().collect();

    let missed = find_missed_speaker_lines(&lines);
    let summary: Vec<(usize, &str)> = missed.iter().map(|m| (m.index, m.speaker.as_str())).collect();
    assert_eq!(summary, vec![(3, "Anna"), (4, "Hans")]);

    let selection: BTreeSet<usize> = missed.iter().map(|m| m.index).collect();
    assert_eq!(
        rewrite_speaker_lines(&lines, &selection),
        vec!["@Hans.", "Guten Tag.", "@Anna.", "@Anna.", "Guten Tag!", "@Hans.", "Wie geht's?", "Annabell kommt."]
    );
}

#[test]
fn test_detect_speaker_labels_shouldBeSortedAndUnique() {
    let labels = detect_speaker_labels("@Hans.\nJa.\n@Anna.\r\n@Hans.\n");
    assert_eq!(labels, vec!["Anna.", "Hans."]);
}

#[test]
fn test_unify_speakers_withVariants_shouldRewriteWholeLinesOnly() {
    let mut groups = BTreeMap::new();
    groups.insert("Klingbeil".to_string(), vec!["Klingb.".to_string(), "Klingbeil".to_string()]);

    let text = "@Klingb.\nJa.\n@Klingbeil\n@Klingbeil.\n@Klingb. (leise)\n";
    assert_eq!(
        unify_speakers(text, &groups),
        "@Klingbeil.\nJa.\n@Klingbeil.\n@Klingbeil.\n@Klingb. (leise)\n"
    );
}

#[test]
fn test_bracket_contents_shouldSpanLinesAndReplaceInOrder() {
    let text = "Er (lacht) sagt (leise\nund laut) ja (nein)";
    assert_eq!(extract_bracket_contents(text), vec!["(lacht)", "(leise\nund laut)", "(nein)"]);

    let edits = vec!["(lächelt)".to_string(), "(leise)".to_string()];
    assert_eq!(replace_bracket_contents(text, &edits), "Er (lächelt) sagt (leise) ja (nein)");
}
