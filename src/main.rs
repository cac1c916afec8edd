// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]
// Add other lints specific to this module that you want to allow but not auto-fix

use anyhow::{Result, anyhow, Context};
use log::{warn, info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::collections::{BTreeMap, BTreeSet};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use clap::{Parser, ValueEnum, CommandFactory, Subcommand, Args};
use clap_complete::{generate, Shell};

use ezdrama::app_config::{self, Config};
use ezdrama::app_controller::Controller;
use ezdrama::curation;
use ezdrama::file_utils::FileManager;
use ezdrama::speakers::SpeakerCandidate;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank speaker labels found in a directory of PAGE-XML files
    Speakers {
        /// Directory containing the PAGE-XML files of one play
        #[arg(value_name = "INPUT_DIR")]
        input_dir: PathBuf,

        /// Print the candidates as JSON
        #[arg(long)]
        json: bool,

        /// Ask for every candidate instead of using the acceptance threshold
        #[arg(short, long)]
        interactive: bool,

        /// Where to write the approved labels, one per line
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Assemble EzDrama text from a directory of PAGE-XML files
    Extract {
        #[arg(value_name = "INPUT_DIR")]
        input_dir: PathBuf,

        /// Approved speaker labels, one per line (ranked automatically when omitted)
        #[arg(short, long)]
        speakers: Option<PathBuf>,

        #[command(flatten)]
        metadata: MetadataArgs,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List untagged lines that start with a known speaker, optionally tagging them
    Missed {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Comma-separated line indices to tag
        #[arg(long, value_delimiter = ',', conflicts_with = "all")]
        select: Vec<usize>,

        /// Tag every reported line
        #[arg(long)]
        all: bool,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge spelling variants of speaker labels
    Unify {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// JSON object mapping a name to its variant labels; lists the labels when omitted
        #[arg(short, long)]
        groups: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List or replace parenthesized runs
    Brackets {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// JSON array of replacements, applied in document order
        #[arg(short, long)]
        edits: Option<PathBuf>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Merge hyphenated words, track verse and modernize orthography
    Clean {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert EzDrama text to TEI
    Convert {
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        #[command(flatten)]
        tei: TeiArgs,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Run extraction, cleanup and conversion without prompts
    Run {
        #[arg(value_name = "INPUT_DIR")]
        input_dir: PathBuf,

        #[command(flatten)]
        metadata: MetadataArgs,

        #[command(flatten)]
        tei: TeiArgs,

        /// Output directory (defaults to the input's parent)
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },

    /// Generate shell completions for ezdrama
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug, Default)]
struct MetadataArgs {
    /// Play title
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    subtitle: Option<String>,

    #[arg(long)]
    author: Option<String>,
}

#[derive(Args, Debug, Default)]
struct TeiArgs {
    /// Keep parenthesized runs as speech text
    #[arg(long)]
    no_bracket_stages: bool,

    /// Start speeches in verse mode
    #[arg(long)]
    verse: bool,

    /// Root xml:id of the TEI document
    #[arg(long)]
    document_id: Option<String>,

    /// Language code (e.g., 'de', 'uk', 'yi')
    #[arg(long)]
    language: Option<String>,
}

/// ezdrama - PAGE-XML to EzDrama to TEI drama conversion
///
/// Turns OCR output of historical plays into DraCor TEI, one stage at a time
/// or end-to-end.
#[derive(Parser, Debug)]
#[command(name = "ezdrama")]
#[command(version)]
#[command(about = "PAGE-XML to EzDrama to TEI drama conversion")]
#[command(long_about = "ezdrama reconstructs plays from PAGE-XML OCR output, tags speakers and converts the result to DraCor TEI.

EXAMPLES:
    ezdrama speakers pages/ -i                  # Approve speaker labels interactively
    ezdrama extract pages/ -s pages.speakers.txt --title Faust
    ezdrama missed pages.ezd.txt --all          # Tag lines that start with a known speaker
    ezdrama clean pages.ezd.txt                 # Merge hyphens, modernize orthography
    ezdrama convert pages.clean.txt --language de
    ezdrama run pages/ -o out/                  # Everything, threshold-approved speakers
    ezdrama completions bash > ezdrama.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    /// Force overwrite of existing output files
    #[arg(short, long, global = true)]
    force_overwrite: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: Emoji for log level
    fn get_emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌ ",
            Level::Warn => "🚧 ",
            Level::Info => " ",
            Level::Debug => "🔍 ",
            Level::Trace => "📋 ",
        }
    }

    // @returns: ANSI colour for log level
    fn get_color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {} {}\x1B[0m",
                Self::get_color_for_level(level),
                now,
                Self::get_emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Trace is filtered by max level until the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "ezdrama", &mut std::io::stdout());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let force_overwrite = cli.force_overwrite;

    match cli.command {
        Commands::Speakers { input_dir, json, interactive, output } => {
            let controller = Controller::with_config(config)?;
            run_speakers(&controller, &input_dir, json, interactive, output, force_overwrite).await
        }
        Commands::Extract { input_dir, speakers, metadata, output } => {
            let controller = Controller::with_config(with_metadata(config, metadata))?;
            let documents = controller.load_documents(&input_dir).await?;
            let speakers = match speakers {
                Some(path) => read_speaker_list(&path)?,
                None => {
                    let candidates = controller.speaker_candidates(&documents);
                    controller.approved_speakers(&candidates)
                }
            };
            let text = controller.extract_ezdrama(&documents, &speakers);
            let output = output_path(output, &input_dir, "ezd", "txt");
            controller.write_artifact(&output, &text, force_overwrite)?;
            Ok(())
        }
        Commands::Missed { input, select, all, output } => {
            let controller = Controller::with_config(config)?;
            let text = FileManager::read_to_string(&input)?;
            let missed = controller.missed_speakers(&text);
            for line in &missed {
                println!("{:>6}  {:<20} {}", line.index, line.speaker, line.line);
            }
            info!("{} untagged speaker lines", missed.len());

            let selection: BTreeSet<usize> = if all {
                missed.iter().map(|m| m.index).collect()
            } else {
                select.into_iter().collect()
            };
            if selection.is_empty() {
                return Ok(());
            }

            let lines: Vec<&str> = text.lines().collect();
            let rewritten = curation::rewrite_speaker_lines(&lines, &selection);
            let output = output_path(output, &input, "tagged", "txt");
            controller.write_artifact(&output, &join_lines(&rewritten), force_overwrite)?;
            Ok(())
        }
        Commands::Unify { input, groups, output } => {
            let controller = Controller::with_config(config)?;
            let text = FileManager::read_to_string(&input)?;
            let Some(groups) = groups else {
                for label in curation::detect_speaker_labels(&text) {
                    println!("{}", label);
                }
                return Ok(());
            };

            let groups: BTreeMap<String, Vec<String>> = serde_json::from_str(&FileManager::read_to_string(&groups)?)
                .context("Failed to parse speaker groups")?;
            let unified = curation::unify_speakers(&text, &groups);
            let output = output_path(output, &input, "unified", "txt");
            controller.write_artifact(&output, &unified, force_overwrite)?;
            Ok(())
        }
        Commands::Brackets { input, edits, output } => {
            let controller = Controller::with_config(config)?;
            let text = FileManager::read_to_string(&input)?;
            let Some(edits) = edits else {
                let runs = curation::extract_bracket_contents(&text);
                println!("{}", serde_json::to_string_pretty(&runs)?);
                return Ok(());
            };

            let edits: Vec<String> = serde_json::from_str(&FileManager::read_to_string(&edits)?)
                .context("Failed to parse bracket edits")?;
            let replaced = curation::replace_bracket_contents(&text, &edits);
            let output = output_path(output, &input, "brackets", "txt");
            controller.write_artifact(&output, &replaced, force_overwrite)?;
            Ok(())
        }
        Commands::Clean { input, output } => {
            let controller = Controller::with_config(config)?;
            let text = FileManager::read_to_string(&input)?;
            let cleaned = controller.clean(&text);
            let output = output_path(output, &input, "clean", "txt");
            controller.write_artifact(&output, &cleaned, force_overwrite)?;
            Ok(())
        }
        Commands::Convert { input, tei, output } => {
            let controller = Controller::with_config(with_tei(config, tei))?;
            let text = FileManager::read_to_string(&input)?;
            let document = controller.convert(&text, &controller.parse_options())?;
            let output = output_path(output, &input, "tei", "xml");
            controller.write_artifact(&output, &document, force_overwrite)?;
            Ok(())
        }
        Commands::Run { input_dir, metadata, tei, output_dir } => {
            let controller = Controller::with_config(with_tei(with_metadata(config, metadata), tei))?;
            let output_dir = output_dir.unwrap_or_else(|| parent_dir(&input_dir));
            let outputs = controller.run(input_dir, output_dir, force_overwrite).await?;
            info!("TEI: {:?}", outputs.tei);
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

/// Load or create the configuration and apply the global CLI overrides
fn load_config(cli: &CommandLineOptions) -> Result<Config> {
    if let Some(level) = &cli.log_level {
        let level: app_config::LogLevel = level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let (mut config, created) = Config::load_or_create(&cli.config_path)?;
    if created {
        warn!("Config file not found at '{}', created default config.", cli.config_path);
    }

    match &cli.log_level {
        Some(level) => config.log_level = level.clone().into(),
        None => log::set_max_level(config.log_level.to_level_filter()),
    }

    Ok(config)
}

fn with_metadata(mut config: Config, args: MetadataArgs) -> Config {
    if let Some(title) = args.title {
        config.metadata.title = title;
    }
    if let Some(subtitle) = args.subtitle {
        config.metadata.subtitle = subtitle;
    }
    if let Some(author) = args.author {
        config.metadata.author = author;
    }
    config
}

fn with_tei(mut config: Config, args: TeiArgs) -> Config {
    if args.no_bracket_stages {
        config.tei.bracket_stages = false;
    }
    if args.verse {
        config.tei.prose = false;
    }
    if let Some(document_id) = args.document_id {
        config.tei.document_id = document_id;
    }
    if let Some(language) = args.language {
        config.tei.language = language;
    }
    config
}

async fn run_speakers(
    controller: &Controller,
    input_dir: &Path,
    json: bool,
    interactive: bool,
    output: Option<PathBuf>,
    force_overwrite: bool,
) -> Result<()> {
    let documents = controller.load_documents(input_dir).await?;
    let candidates = controller.speaker_candidates(&documents);

    if json {
        println!("{}", serde_json::to_string_pretty(&candidates)?);
    } else if !interactive {
        for candidate in &candidates {
            println!("{}", describe_candidate(candidate));
        }
    }

    let approved = if interactive {
        approve_interactively(&candidates)?
    } else {
        controller.approved_speakers(&candidates)
    };
    info!("Approved {} of {} speaker labels", approved.len(), candidates.len());

    let output = output_path(output, input_dir, "speakers", "txt");
    controller.write_artifact(&output, &join_lines(&approved), force_overwrite)?;
    Ok(())
}

fn describe_candidate(candidate: &SpeakerCandidate) -> String {
    format!(
        "{:<24} -> {:<20} {:.2}  {:<22} ({} examples) {}",
        candidate.raw_label,
        candidate.best_match.as_deref().unwrap_or("-"),
        candidate.similarity,
        candidate.verdict.describe(),
        candidate.example_count,
        candidate.example_context.as_deref().unwrap_or(""),
    )
}

fn approve_interactively(candidates: &[SpeakerCandidate]) -> Result<Vec<String>> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut approved = Vec::new();

    for candidate in candidates {
        println!("{}", describe_candidate(candidate));
        if confirm(&mut input, &format!("Accept '{}'?", candidate.raw_label))? {
            approved.push(candidate.raw_label.clone());
        }
    }

    Ok(approved)
}

/// Ask until the answer is y or n; end of input counts as no
fn confirm<R: BufRead>(input: &mut R, prompt: &str) -> Result<bool> {
    loop {
        print!("{} [y/n] ", prompt);
        std::io::stdout().flush()?;

        let mut answer = String::new();
        if input.read_line(&mut answer)? == 0 {
            return Ok(false);
        }
        match answer.trim().to_lowercase().as_str() {
            "y" | "yes" => return Ok(true),
            "n" | "no" => return Ok(false),
            _ => println!("Please answer y or n."),
        }
    }
}

fn read_speaker_list(path: &Path) -> Result<Vec<String>> {
    let content = FileManager::read_to_string(path)?;
    let speakers: Vec<String> = content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if speakers.is_empty() {
        return Err(anyhow!("Speaker list {:?} is empty", path));
    }
    Ok(speakers)
}

fn output_path(explicit: Option<PathBuf>, input: &Path, stage: &str, extension: &str) -> PathBuf {
    explicit.unwrap_or_else(|| FileManager::generate_output_path(input, parent_dir(input), stage, extension))
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent().map(Path::to_path_buf).unwrap_or_default()
}

fn join_lines(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
