/*!
 * Tests for application configuration functionality
 */

use anyhow::Result;
use ezdrama::app_config::{Config, DramaMetadata, LogLevel};
use crate::common;

/// Test default configuration values
#[test]
fn test_default_config_withNoParameters_shouldHaveCorrectDefaults() {
    let config = Config::default();

    assert_eq!(config.extraction.gap_factor, 0.5);
    assert_eq!(config.extraction.bucket_size, 5.0);
    assert_eq!(config.speakers.accept_threshold, 0.5);
    assert_eq!(config.speakers.probable_threshold, 0.75);
    assert_eq!(config.speakers.label_dot_window, 13);
    assert_eq!(config.speakers.max_labels_per_line, 3);
    assert!(config.tei.bracket_stages);
    assert!(config.tei.prose);
    assert_eq!(config.tei.document_id, "insert_id");
    assert_eq!(config.tei.language, "de");
    assert_eq!(config.log_level, LogLevel::Info);
    assert!(config.validate().is_ok());
}

/// Test configuration validation
#[test]
fn test_config_validation_withVariousConfigs_shouldValidateCorrectly() {
    let mut config = Config::default();

    config.tei.language = "xyz".to_string();
    assert!(config.validate().is_err());
    config.tei.language = "ger".to_string();
    assert!(config.validate().is_ok());

    config.tei.document_id = "has space".to_string();
    assert!(config.validate().is_err());
    config.tei.document_id = "1play".to_string();
    assert!(config.validate().is_err());
    config.tei.document_id = "ger000123".to_string();
    assert!(config.validate().is_ok());

    config.speakers.accept_threshold = 1.5;
    assert!(config.validate().is_err());
    config.speakers.accept_threshold = 0.5;

    config.extraction.bucket_size = 0.0;
    assert!(config.validate().is_err());
}

/// Missing sections fall back to their defaults
#[test]
fn test_config_deserialize_withPartialJson_shouldFillDefaults() -> Result<()> {
    let config: Config = serde_json::from_str(r#"{"tei": {"language": "uk"}, "log_level": "debug"}"#)?;

    assert_eq!(config.tei.language, "uk");
    assert!(config.tei.bracket_stages);
    assert_eq!(config.tei.document_id, "insert_id");
    assert_eq!(config.speakers.label_dot_window, 13);
    assert_eq!(config.log_level, LogLevel::Debug);
    Ok(())
}

#[test]
fn test_load_or_create_withMissingFile_shouldWriteDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("conf.json");

    let (config, created) = Config::load_or_create(&path)?;
    assert!(created);
    assert!(path.exists());
    assert_eq!(config.tei.language, "de");

    let (reloaded, created) = Config::load_or_create(&path)?;
    assert!(!created);
    assert_eq!(reloaded.speakers, config.speakers);
    Ok(())
}

#[test]
fn test_load_or_create_withBrokenJson_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "conf.json", "{ not json")?;

    assert!(Config::load_or_create(&path).is_err());
    Ok(())
}

#[test]
fn test_to_ezdrama_block_withEmptyFields_shouldSkipThem() {
    let metadata = DramaMetadata {
        title: "Der Bauer".to_string(),
        subtitle: "  ".to_string(),
        author: " Anonym ".to_string(),
    };

    assert_eq!(metadata.to_ezdrama_block(), "@title Der Bauer\n@author Anonym");
    assert_eq!(DramaMetadata::default().to_ezdrama_block(), "");
}
