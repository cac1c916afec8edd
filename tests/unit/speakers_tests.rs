/*!
 * Tests for speaker label harvesting and fuzzy matching
 */

use std::collections::BTreeSet;
use ezdrama::app_config::SpeakerConfig;
use ezdrama::speakers::{
    LabelHarvest, SpeakerMatcher, Verdict, accepted_labels, clean_label, extract_figures, gestalt_ratio,
    rank_candidates,
};

fn matcher() -> SpeakerMatcher {
    SpeakerMatcher::new(["grete", "hans"])
}

#[test]
fn test_extract_figures_withTocLines_shouldSplitOnCommas() {
    let figures = extract_figures("Hans, ein Bauer.\nGrete, seine Frau.\n\n^Perſonen");
    let expected: BTreeSet<String> = ["ein bauer", "grete", "hans", "seine frau"].iter().map(|s| s.to_string()).collect();
    assert_eq!(figures, expected);
}

#[test]
fn test_gestalt_ratio_withKnownPairs_shouldMatchBlockCounts() {
    assert_eq!(gestalt_ratio("hans", "hans"), 1.0);
    assert_eq!(gestalt_ratio("abc", "xyz"), 0.0);
    assert!((gestalt_ratio("gretchen", "grätchen") - 0.875).abs() < 1e-9);
    assert!((gestalt_ratio("hanns", "hans") - 8.0 / 9.0).abs() < 1e-9);
}

#[test]
fn test_best_match_withExactToken_shouldScoreOne() {
    assert_eq!(matcher().best_match("Der alte Hans:"), (Some("hans".to_string()), 1.0));
}

#[test]
fn test_best_match_withMisspelling_shouldBeProbable() {
    let (name, score) = matcher().best_match("Hanns.");
    assert_eq!(name.as_deref(), Some("hans"));
    assert_eq!(Verdict::classify(score, &SpeakerConfig::default()), Verdict::Probable);
}

#[test]
fn test_classify_withBoundaryScores_shouldUseExclusiveBounds() {
    let config = SpeakerConfig::default();
    assert_eq!(Verdict::classify(0.75, &config), Verdict::Possible);
    assert_eq!(Verdict::classify(0.76, &config), Verdict::Probable);
    assert_eq!(Verdict::classify(0.5, &config), Verdict::Unlikely);
}

#[test]
fn test_clean_label_shouldStripPunctuationAndLowercase() {
    assert_eq!(clean_label(" Hans (leise): "), "hans leise");
}

#[test]
fn test_rank_candidates_withHarvestedLabels_shouldAcceptCloseMatches() {
    let config = SpeakerConfig::default();
    let lines = ["Hanns. Wo bist du?", "Grete. Hier. Komm.", "kleiner Text. Nein.", "v. Berg. Halt!"];
    let harvest = LabelHarvest::from_lines(lines, &config);

    let labels: Vec<&str> = harvest.labels.iter().map(String::as_str).collect();
    assert_eq!(labels, vec!["Grete.", "Grete. Hier.", "Hanns.", "v.", "v. Berg."]);
    assert_eq!(harvest.example_for("Grete."), Some("Grete. Hier. Komm."));
    assert_eq!(harvest.example_count("Grete."), 2);
    assert_eq!(harvest.example_count("Hanns."), 1);

    let candidates = rank_candidates(&harvest, &matcher(), &config);
    assert_eq!(candidates.len(), 5);
    assert_eq!(accepted_labels(&candidates, &config), vec!["Grete.", "Grete. Hier.", "Hanns."]);

    let berg = candidates.iter().find(|c| c.raw_label == "v. Berg.").unwrap();
    assert_eq!(berg.verdict, Verdict::Unlikely);
    assert!(!berg.is_accepted(&config));
}

#[test]
fn test_rank_candidates_shouldSerializeForTheOperator() {
    let config = SpeakerConfig::default();
    let harvest = LabelHarvest::from_lines(["Hans. Ja."], &config);
    let candidates = rank_candidates(&harvest, &matcher(), &config);

    let json = serde_json::to_value(&candidates).unwrap();
    assert_eq!(json[0]["raw_label"], "Hans.");
    assert_eq!(json[0]["best_match"], "hans");
    assert_eq!(json[0]["verdict"], "probable");
    assert_eq!(json[0]["example_context"], "Hans. Ja.");
}
