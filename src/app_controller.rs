use anyhow::{Result, Context, anyhow};
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use log::{warn, info, debug};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::curation::{self, MissedSpeakerLine};
use crate::file_utils::FileManager;
use crate::language_utils;
use crate::normalizer;
use crate::page::{PageDocument, ParagraphGrouper, assemble_ezdrama};
use crate::speakers::{
    LabelHarvest, SpeakerCandidate, SpeakerMatcher, accepted_labels, dramatis_personae, extract_figures,
    rank_candidates,
};
use crate::tei::{self, ParseOptions};

// @module: Application controller for the drama pipeline

/// Artifacts written by an end-to-end run
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutputs {
    pub ezdrama: PathBuf,
    pub cleaned: PathBuf,
    pub tei: PathBuf,
}

/// Main application controller running the pipeline stages
pub struct Controller {
    // @field: App configuration
    config: Config,
}

impl Controller {
    /// Create a new controller for test purposes with default configuration
    pub fn new_for_test() -> Result<Self> {
        Self::with_config(Config::default())
    }

    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Conversion options from the `tei` section, dated today
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions::from_config(&self.config.tei)
    }

    /// Load every PAGE document of a directory, in filename order.
    /// Documents are parsed in parallel; unreadable ones are skipped with a warning.
    pub async fn load_documents(&self, input_dir: &Path) -> Result<Vec<PageDocument>> {
        let files = FileManager::find_page_files(input_dir)?;
        if files.is_empty() {
            return Err(anyhow!("No PAGE-XML files found in {:?}", input_dir));
        }

        let progress_bar = ProgressBar::new(files.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pages ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));

        let tasks = files.into_iter().map(|path| {
            let progress_bar = progress_bar.clone();
            tokio::task::spawn_blocking(move || {
                let result = PageDocument::load(&path);
                progress_bar.inc(1);
                result
            })
        });

        let mut documents = Vec::new();
        for result in join_all(tasks).await {
            match result.context("PAGE extraction task failed")? {
                Ok(document) => documents.push(document),
                Err(e) => warn!("Skipping page: {}", e),
            }
        }
        progress_bar.finish_and_clear();

        info!("Loaded {} PAGE documents from {:?}", documents.len(), input_dir);
        Ok(documents)
    }

    /// Rank speaker labels found in paragraph text against the dramatis personae
    pub fn speaker_candidates(&self, documents: &[PageDocument]) -> Vec<SpeakerCandidate> {
        let figures = extract_figures(&dramatis_personae(documents));
        if figures.is_empty() {
            warn!("No dramatis personae found, every label will score 0");
        } else {
            debug!("Dramatis personae: {:?}", figures);
        }
        let matcher = SpeakerMatcher::new(figures);

        let lines = documents.iter().flat_map(|d| d.paragraph_lines());
        let harvest = LabelHarvest::from_lines(lines, &self.config.speakers);
        let candidates = rank_candidates(&harvest, &matcher, &self.config.speakers);

        info!("Found {} speaker label candidates", candidates.len());
        candidates
    }

    /// Labels accepted by threshold alone
    pub fn approved_speakers(&self, candidates: &[SpeakerCandidate]) -> Vec<String> {
        accepted_labels(candidates, &self.config.speakers)
    }

    /// Assemble the EzDrama text of all documents, tagging the approved speakers
    pub fn extract_ezdrama(&self, documents: &[PageDocument], speakers: &[String]) -> String {
        let grouper = ParagraphGrouper::from_config(&self.config.extraction);
        let lines: Vec<String> = documents
            .iter()
            .flat_map(|document| grouper.ordered_lines(document.raw_lines(), speakers))
            .collect();
        debug!("Extracted {} EzDrama lines", lines.len());
        assemble_ezdrama(&self.config.metadata, &lines)
    }

    /// Untagged lines starting with a known speaker
    pub fn missed_speakers(&self, text: &str) -> Vec<MissedSpeakerLine> {
        let lines: Vec<&str> = text.lines().collect();
        curation::find_missed_speaker_lines(&lines)
    }

    /// Cleanup pass: hyphen merging, verse tracking, orthography
    pub fn clean(&self, text: &str) -> String {
        normalizer::normalize_text(text)
    }

    /// EzDrama to verified TEI
    pub fn convert(&self, text: &str, options: &ParseOptions) -> Result<String> {
        let language = language_utils::get_language_name(&options.language)
            .unwrap_or_else(|_| options.language.clone());
        info!("Converting to TEI: {} ({})", options.document_id, language);

        let output = tei::convert(text, options)
            .inspect_err(|e| debug!("Malformed TEI rendering:\n{}", e.content()))?;
        Ok(output)
    }

    /// Write a stage artifact, refusing to overwrite unless forced
    pub fn write_artifact(&self, path: &Path, content: &str, force_overwrite: bool) -> Result<bool> {
        if FileManager::file_exists(path) && !force_overwrite {
            warn!("Skipping {:?}, file already exists (use -f to force overwrite)", path);
            return Ok(false);
        }
        FileManager::write_atomic(path, content)?;
        info!("Wrote {:?}", path);
        Ok(true)
    }

    /// Run extraction, cleanup and conversion without operator input
    pub async fn run(&self, input_dir: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<PipelineOutputs> {
        let start_time = Instant::now();
        FileManager::ensure_dir(&output_dir)?;

        let outputs = PipelineOutputs {
            ezdrama: FileManager::generate_output_path(&input_dir, &output_dir, "ezd", "txt"),
            cleaned: FileManager::generate_output_path(&input_dir, &output_dir, "clean", "txt"),
            tei: FileManager::generate_output_path(&input_dir, &output_dir, "tei", "xml"),
        };
        if FileManager::file_exists(&outputs.tei) && !force_overwrite {
            warn!("Skipping {:?}, TEI output already exists (use -f to force overwrite)", input_dir);
            return Ok(outputs);
        }

        let documents = self.load_documents(&input_dir).await?;
        let candidates = self.speaker_candidates(&documents);
        let speakers = self.approved_speakers(&candidates);
        info!("Accepted {} of {} speaker labels", speakers.len(), candidates.len());

        let ezdrama = self.extract_ezdrama(&documents, &speakers);
        self.write_artifact(&outputs.ezdrama, &ezdrama, true)?;

        let cleaned = self.clean(&ezdrama);
        self.write_artifact(&outputs.cleaned, &cleaned, true)?;

        let tei = self.convert(&cleaned, &self.parse_options())?;
        self.write_artifact(&outputs.tei, &tei, true)?;

        info!("Pipeline complete in {}", Self::format_duration(start_time.elapsed()));
        Ok(outputs)
    }

    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
