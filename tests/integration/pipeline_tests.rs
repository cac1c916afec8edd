/*!
 * End-to-end tests for the PAGE to EzDrama to TEI pipeline
 */

use std::fs;
use std::path::PathBuf;
use anyhow::Result;
use chrono::NaiveDate;
use tempfile::TempDir;
use ezdrama::app_config::Config;
use ezdrama::app_controller::Controller;
use ezdrama::speakers::Verdict;
use crate::common;

fn controller_with_title() -> Result<Controller> {
    let mut config = Config::default();
    config.metadata.title = "Der Bauer".to_string();
    Controller::with_config(config)
}

/// Temp dir holding the sample play in `faust/`
fn sample_play() -> Result<(TempDir, PathBuf)> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let play_dir = temp_dir.path().join("faust");
    fs::create_dir(&play_dir)?;
    common::create_sample_play(&play_dir)?;
    Ok((temp_dir, play_dir))
}

const EXPECTED_EZDRAMA: &str = "@title Der Bauer\n\n##Der Bauer\n~Personen.\n~Hans, ein Bauer.\n~Grete, seine Frau.\n#Erster Aufzug.\n@Hans.\nGuten Tag, mein lie-\nbes Weib.\n@Grete.\nGuten Tag (lacht).\n";

#[tokio::test]
async fn test_load_documents_shouldKeepFilenameOrder() -> Result<()> {
    let (_temp_dir, play_dir) = sample_play()?;
    common::create_test_file(&play_dir, "notes.txt", "not a page")?;

    let controller = Controller::new_for_test()?;
    let documents = controller.load_documents(&play_dir).await?;

    let names: Vec<String> = documents
        .iter()
        .filter_map(|d| d.source.file_name())
        .map(|n| n.to_string_lossy().to_string())
        .collect();
    assert_eq!(names, vec!["0001.xml", "0002.xml"]);
    Ok(())
}

#[tokio::test]
async fn test_load_documents_withBrokenPage_shouldSkipIt() -> Result<()> {
    let (_temp_dir, play_dir) = sample_play()?;
    common::create_test_file(&play_dir, "0003.xml", "<PcGts><Page>")?;

    let documents = Controller::new_for_test()?.load_documents(&play_dir).await?;
    assert_eq!(documents.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_load_documents_withoutPages_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = Controller::new_for_test()?;

    assert!(controller.load_documents(temp_dir.path()).await.is_err());
    assert!(controller.load_documents(&temp_dir.path().join("missing")).await.is_err());
    Ok(())
}

#[tokio::test]
async fn test_speaker_candidates_shouldMatchDramatisPersonae() -> Result<()> {
    let (_temp_dir, play_dir) = sample_play()?;
    let controller = Controller::new_for_test()?;
    let documents = controller.load_documents(&play_dir).await?;

    let candidates = controller.speaker_candidates(&documents);
    let labels: Vec<&str> = candidates.iter().map(|c| c.raw_label.as_str()).collect();
    assert_eq!(labels, vec!["Grete.", "Hans."]);
    assert!(candidates.iter().all(|c| c.similarity == 1.0 && c.verdict == Verdict::Probable));
    assert_eq!(candidates[1].best_match.as_deref(), Some("hans"));

    assert_eq!(controller.approved_speakers(&candidates), vec!["Grete.", "Hans."]);
    Ok(())
}

#[tokio::test]
async fn test_extract_then_clean_shouldProduceStageTexts() -> Result<()> {
    let (_temp_dir, play_dir) = sample_play()?;
    let controller = controller_with_title()?;
    let documents = controller.load_documents(&play_dir).await?;
    let speakers = vec!["Grete.".to_string(), "Hans.".to_string()];

    let ezdrama = controller.extract_ezdrama(&documents, &speakers);
    assert_eq!(ezdrama, EXPECTED_EZDRAMA);

    let cleaned = controller.clean(&ezdrama);
    assert_eq!(
        cleaned,
        "@title Der Bauer\n##Der Bauer\n~Personen.\n~Hans, ein Bauer.\n~Grete, seine Frau.\n#Erster Aufzug.\n@Hans.\nGuten Tag, mein liebes Weib.\n@Grete.\nGuten Tag (lacht).\n"
    );
    Ok(())
}

#[test]
fn test_missed_speakers_shouldFindUntaggedSpeechStart() -> Result<()> {
    let controller = Controller::new_for_test()?;
    let text = format!("{}Hans Was lachst du?\n", EXPECTED_EZDRAMA);

    let missed = controller.missed_speakers(&text);
    assert_eq!(missed.len(), 1);
    assert_eq!(missed[0].speaker, "Hans");
    assert_eq!(missed[0].line, "Hans Was lachst du?");
    assert_eq!(missed[0].index, 12);
    Ok(())
}

#[test]
fn test_convert_withCleanedPlay_shouldBuildTei() -> Result<()> {
    let controller = controller_with_title()?;
    let options = controller
        .parse_options()
        .with_date(NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    let cleaned = controller.clean(EXPECTED_EZDRAMA);

    let tei = controller.convert(&cleaned, &options)?;
    assert!(tei.contains("<title type=\"main\">Der Bauer</title>"));
    assert!(tei.contains("<div type=\"act\">"));
    assert!(tei.contains("<head>Erster Aufzug.</head>"));
    assert!(tei.contains("<sp who=\"#hans\">"));
    assert!(tei.contains("<p>Guten Tag, mein liebes Weib.</p>"));
    assert!(tei.contains("<p>Guten Tag <stage>(lacht).</stage></p>"));
    assert!(tei.contains("<person xml:id=\"grete\" sex=\"FEMALE\">"));
    assert!(tei.contains("<change when=\"2024-06-01\">DESCRIBE CHANGE</change>"));
    Ok(())
}

#[tokio::test]
async fn test_run_shouldWriteAllThreeArtifacts() -> Result<()> {
    let (temp_dir, play_dir) = sample_play()?;
    let output_dir = temp_dir.path().join("out");
    let controller = controller_with_title()?;

    let outputs = controller.run(play_dir, output_dir.clone(), false).await?;

    assert_eq!(outputs.ezdrama, output_dir.join("faust.ezd.txt"));
    assert_eq!(outputs.cleaned, output_dir.join("faust.clean.txt"));
    assert_eq!(outputs.tei, output_dir.join("faust.tei.xml"));
    assert_eq!(fs::read_to_string(&outputs.ezdrama)?, EXPECTED_EZDRAMA);
    assert!(fs::read_to_string(&outputs.cleaned)?.contains("mein liebes Weib."));

    let tei = fs::read_to_string(&outputs.tei)?;
    assert!(roxmltree::Document::parse(&tei).is_ok());
    assert!(tei.contains("<speaker>Grete.</speaker>"));
    Ok(())
}

#[tokio::test]
async fn test_run_withExistingTei_shouldSkipUnlessForced() -> Result<()> {
    let (temp_dir, play_dir) = sample_play()?;
    let output_dir = temp_dir.path().join("out");
    fs::create_dir(&output_dir)?;
    common::create_test_file(&output_dir, "faust.tei.xml", "old")?;
    let controller = controller_with_title()?;

    let outputs = controller.run(play_dir.clone(), output_dir.clone(), false).await?;
    assert_eq!(fs::read_to_string(&outputs.tei)?, "old");
    assert!(!outputs.ezdrama.exists());

    let outputs = controller.run(play_dir, output_dir, true).await?;
    assert!(fs::read_to_string(&outputs.tei)?.starts_with("<?xml"));
    assert!(outputs.ezdrama.exists());
    Ok(())
}

#[test]
fn test_write_artifact_shouldRespectForceFlag() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "play.clean.txt", "alt")?;
    let controller = Controller::new_for_test()?;

    assert!(!controller.write_artifact(&path, "neu", false)?);
    assert_eq!(fs::read_to_string(&path)?, "alt");
    assert!(controller.write_artifact(&path, "neu", true)?);
    assert_eq!(fs::read_to_string(&path)?, "neu");
    Ok(())
}
