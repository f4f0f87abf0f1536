//! studypal: IGCSE study material from your own notes.
//!
//! Notes are read from a `.txt`, `.md` or `.pdf` file (or `-` for stdin),
//! sent to the configured generation backend, and printed as text or JSON.

mod commands;
mod render;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studypal_core::{defaults, ContentKind, IgcseSubject};

#[derive(Parser)]
#[command(name = "studypal")]
#[command(author, version, about = "Summaries, quizzes and past-paper practice from IGCSE notes")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(short, long, value_enum, global = true, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Library directory (default: $STUDYPAL_DATA_DIR or ./.studypal)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate summaries, flashcards, quizzes or past-paper questions from notes
    Generate {
        /// brief-summary, detailed-summary, flashcards, mcqs, true-false or past-papers
        #[arg(short, long, value_parser = parse_kind)]
        kind: ContentKind,

        /// Subject (key such as physics_p2, or any subject name)
        #[arg(short, long)]
        subject: Option<String>,

        /// Previously generated item to avoid (repeatable)
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<String>,

        /// Notes file, or '-' for stdin
        input: String,
    },

    /// Remove page numbers, headers and other non-content text
    Clean {
        /// Notes file, or '-' for stdin
        input: String,
    },

    /// Split long notes into parts
    Split {
        /// Maximum characters per part
        #[arg(long, default_value_t = defaults::NOTE_PART_CHAR_LIMIT)]
        limit: usize,

        /// Print only this part (numbered from 1)
        #[arg(long)]
        part: Option<usize>,

        /// Notes file, or '-' for stdin
        input: String,
    },

    /// Find authentic past-paper MCQs with web search
    PastMcqs {
        #[command(flatten)]
        topic: TopicArgs,

        /// Number of questions
        #[arg(short, long, default_value_t = 10)]
        count: usize,

        /// Number of most recent exam years to search
        #[arg(long, default_value_t = 1)]
        years: u32,
    },

    /// Generate exam-style MCQs on a syllabus topic
    TopicMcqs {
        #[command(flatten)]
        topic: TopicArgs,

        /// Number of questions
        #[arg(short, long, default_value_t = 10)]
        count: usize,
    },

    /// Find past-paper theory questions matching a criteria (e.g. "4 marks")
    TheoryQuestions {
        #[command(flatten)]
        topic: TopicArgs,

        /// Question criteria
        #[arg(long)]
        criteria: String,

        /// Number of questions
        #[arg(short, long, default_value_t = 5)]
        count: usize,

        /// Number of most recent exam years to search
        #[arg(long, default_value_t = 1)]
        years: u32,
    },

    /// Extract MCQs from pasted question text, or generate them from notes
    Sme {
        /// Generate further questions instead of extracting
        #[arg(long)]
        more: bool,

        /// Existing question to avoid with --more (repeatable)
        #[arg(long = "existing")]
        existing: Vec<String>,

        /// Question text or notes file, or '-' for stdin
        input: String,
    },

    /// Hurry Study: quick topic-by-topic revision
    Hurry {
        #[command(subcommand)]
        command: HurryCommand,
    },

    /// Saved notes
    Notes {
        #[command(subcommand)]
        command: NotesCommand,
    },

    /// Saved past-paper questions
    Papers {
        #[command(subcommand)]
        command: PapersCommand,
    },

    /// List supported subjects
    Subjects {
        /// Include syllabus chapters
        #[arg(long)]
        chapters: bool,
    },

    /// Check that the generation backend is reachable
    Health,
}

#[derive(Args)]
pub struct TopicArgs {
    /// Subject (key such as physics_p1, or display name)
    #[arg(short, long, value_parser = parse_subject)]
    pub subject: IgcseSubject,

    /// Free-form topic; takes precedence over --chapter/--subtopic
    #[arg(short, long)]
    pub topic: Option<String>,

    /// Syllabus chapter (repeatable)
    #[arg(long = "chapter")]
    pub chapters: Vec<String>,

    /// Syllabus subtopic (repeatable)
    #[arg(long = "subtopic")]
    pub subtopics: Vec<String>,
}

#[derive(Subcommand)]
pub enum HurryCommand {
    /// List the main topics in the notes
    Topics {
        /// Notes file, or '-' for stdin
        input: String,
    },

    /// Explain one topic simply
    Explain {
        #[arg(short, long)]
        topic: String,
        /// Notes file, or '-' for stdin
        input: String,
    },

    /// Generate a theory test (easy and hard questions)
    Theory {
        #[arg(short, long)]
        topic: String,
        /// Notes file, or '-' for stdin
        input: String,
    },

    /// Grade answers to a theory test
    Grade {
        #[arg(short, long)]
        topic: String,

        /// Questions JSON, as printed by `hurry theory --format json`
        #[arg(long)]
        questions: PathBuf,

        /// Answers JSON object keyed by question id
        #[arg(long)]
        answers: PathBuf,

        /// Notes file, or '-' for stdin
        input: String,
    },

    /// Rapid-fire true/false and MCQ drill
    Drill {
        #[arg(short, long)]
        topic: String,
        /// Notes file, or '-' for stdin
        input: String,
    },
}

#[derive(Subcommand)]
pub enum NotesCommand {
    /// Save notes to the library
    Save {
        /// Title (default: first line of the notes)
        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        subject: Option<String>,

        /// Notes file, or '-' for stdin
        input: String,
    },

    /// List saved notes, newest first
    List,

    /// Print a saved note
    Show { id: String },

    /// Delete a saved note
    Delete { id: String },
}

#[derive(Subcommand)]
pub enum PapersCommand {
    /// List saved past-paper questions
    List {
        #[arg(short, long, value_parser = parse_subject)]
        subject: Option<IgcseSubject>,
    },

    /// Remove all saved past-paper questions
    Clear,
}

fn parse_kind(raw: &str) -> Result<ContentKind, String> {
    raw.parse().map_err(|e: studypal_core::Error| e.to_string())
}

fn parse_subject(raw: &str) -> Result<IgcseSubject, String> {
    raw.parse().map_err(|e: studypal_core::Error| e.to_string())
}

/// Initialize tracing.
///
/// Environment variables:
///   LOG_FORMAT  - "json" or "text" (default: "text")
///   LOG_FILE    - path to log file (optional, enables file logging)
///   LOG_ANSI    - "true"/"false" override ANSI colors
///   RUST_LOG    - standard env filter (default: "studypal=info")
///
/// Console logs go to stderr so stdout carries only command output.
fn init_tracing() -> Option<WorkerGuard> {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "studypal=info".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("studypal.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stderr)"),
        "Logging initialized"
    );
    guard
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let _log_guard = init_tracing();

    match commands::run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
