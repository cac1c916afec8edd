use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Application configuration module
/// This module handles loading, validating and saving the pipeline settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Play metadata written as the EzDrama header block
    #[serde(default)]
    pub metadata: DramaMetadata,

    /// Geometry grouping settings
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Speaker candidate settings
    #[serde(default)]
    pub speakers: SpeakerConfig,

    /// TEI conversion settings
    #[serde(default)]
    pub tei: TeiConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Title block of the play
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct DramaMetadata {
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub subtitle: String,

    #[serde(default)]
    pub author: String,
}

impl DramaMetadata {
    /// Render the `@title`/`@subtitle`/`@author` block, skipping empty fields
    pub fn to_ezdrama_block(&self) -> String {
        let fields = [
            ("@title", &self.title),
            ("@subtitle", &self.subtitle),
            ("@author", &self.author),
        ];
        fields
            .iter()
            .filter(|(_, value)| !value.trim().is_empty())
            .map(|(tag, value)| format!("{} {}", tag, value.trim()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Settings for reconstructing reading order from PAGE geometry
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ExtractionConfig {
    /// Share of the median line gap within which lines join one row
    #[serde(default = "default_gap_factor")]
    pub gap_factor: f64,

    /// Vertical bucket used to pre-sort lines before grouping
    #[serde(default = "default_bucket_size")]
    pub bucket_size: f64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            gap_factor: default_gap_factor(),
            bucket_size: default_bucket_size(),
        }
    }
}

/// Settings for harvesting and ranking speaker labels
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SpeakerConfig {
    /// Candidates scoring strictly above this are accepted without a human
    #[serde(default = "default_accept_threshold")]
    pub accept_threshold: f64,

    /// Candidates scoring strictly above this are reported as probable characters
    #[serde(default = "default_probable_threshold")]
    pub probable_threshold: f64,

    /// A label's closing dot must sit at or before this character index
    #[serde(default = "default_label_dot_window")]
    pub label_dot_window: usize,

    /// Maximum number of labels harvested from a single line
    #[serde(default = "default_max_labels_per_line")]
    pub max_labels_per_line: usize,
}

impl Default for SpeakerConfig {
    fn default() -> Self {
        Self {
            accept_threshold: default_accept_threshold(),
            probable_threshold: default_probable_threshold(),
            label_dot_window: default_label_dot_window(),
            max_labels_per_line: default_max_labels_per_line(),
        }
    }
}

/// Settings for the EzDrama to TEI conversion
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct TeiConfig {
    /// Turn parenthesized runs inside speeches into stage directions
    #[serde(default = "default_true")]
    pub bracket_stages: bool,

    /// Speech lines default to prose paragraphs (`p`) instead of verse lines (`l`)
    #[serde(default = "default_true")]
    pub prose: bool,

    /// Value of the root `xml:id`
    #[serde(default = "default_document_id")]
    pub document_id: String,

    /// Value of the root `xml:lang` (ISO 639 code)
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for TeiConfig {
    fn default() -> Self {
        Self {
            bracket_stages: true,
            prose: true,
            document_id: default_document_id(),
            language: default_language(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_gap_factor() -> f64 {
    0.5
}

fn default_bucket_size() -> f64 {
    5.0
}

fn default_accept_threshold() -> f64 {
    0.5
}

fn default_probable_threshold() -> f64 {
    0.75
}

fn default_label_dot_window() -> usize {
    13
}

fn default_max_labels_per_line() -> usize {
    3
}

fn default_true() -> bool {
    true
}

fn default_document_id() -> String {
    "insert_id".to_string()
}

fn default_language() -> String {
    "de".to_string()
}

impl Config {
    /// Load a configuration file, or create one with defaults when it is missing
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<(Self, bool)> {
        let path = path.as_ref();
        if path.exists() {
            let file = File::open(path)
                .map_err(|e| anyhow!("Failed to open config file {:?}: {}", path, e))?;
            let config: Config = serde_json::from_reader(BufReader::new(file))
                .map_err(|e| anyhow!("Failed to parse config file {:?}: {}", path, e))?;
            return Ok((config, false));
        }

        let config = Config::default();
        let json = serde_json::to_string_pretty(&config)
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;
        std::fs::write(path, json)
            .map_err(|e| anyhow!("Failed to write default config to {:?}: {}", path, e))?;
        Ok((config, true))
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        crate::language_utils::validate_language_code(&self.tei.language)?;

        let id = &self.tei.document_id;
        if id.is_empty() || id.chars().any(char::is_whitespace) {
            return Err(anyhow!("Document id must be non-empty and contain no whitespace: {:?}", id));
        }
        if id.starts_with(|c: char| c.is_ascii_digit()) {
            return Err(anyhow!("Document id must not start with a digit: {:?}", id));
        }

        for (name, value) in [
            ("accept_threshold", self.speakers.accept_threshold),
            ("probable_threshold", self.speakers.probable_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("{} must be within 0.0..=1.0, got {}", name, value));
            }
        }

        if self.extraction.gap_factor < 0.0 {
            return Err(anyhow!("gap_factor must not be negative"));
        }
        if self.extraction.bucket_size <= 0.0 {
            return Err(anyhow!("bucket_size must be positive"));
        }

        Ok(())
    }
}
