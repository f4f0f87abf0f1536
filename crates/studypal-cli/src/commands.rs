//! Command handlers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use studypal_core::{
    GeneratedContent, GenerationBackend, GenerationRequest, IgcseSubject, TheoryQuestion,
};
use studypal_inference::InferenceConfig;
use studypal_study::{
    chapters_for, combine_topics, find_chapter, ingest_file, ContentOrchestrator, HurryStudy,
    JsonFileStore, Library, NoteParts, NoteTools, OrchestratorConfig, PracticeFinder,
    TheoryAnswers,
};

use crate::render::{self, ChapterEntry, SubjectEntry};
use crate::{Cli, Commands, HurryCommand, NotesCommand, OutputFormat, PapersCommand, TopicArgs};

/// Per-invocation settings shared by every command.
struct App {
    format: OutputFormat,
    data_dir: Option<PathBuf>,
}

impl App {
    fn library(&self) -> Library<JsonFileStore> {
        let store = match &self.data_dir {
            Some(dir) => JsonFileStore::new(dir),
            None => JsonFileStore::from_env(),
        };
        debug!(dir = %store.dir().display(), "Opening library");
        Library::new(store)
    }

    fn emit<T: Serialize + ?Sized>(&self, value: &T, text: impl FnOnce(&T) -> String) -> Result<()> {
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
            OutputFormat::Text => println!("{}", text(value)),
        }
        Ok(())
    }
}

fn backend() -> Result<Arc<dyn GenerationBackend>> {
    let config = InferenceConfig::from_env()?;
    config.validate()?;
    Ok(config.build_backend()?)
}

/// Read notes from a file through the extractors, or from stdin for `-`.
async fn read_notes(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("failed to read notes from stdin")?;
        return Ok(text);
    }
    ingest_file(input)
        .await
        .with_context(|| format!("failed to read notes from {}", input))
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid JSON in {}", path.display()))
}

/// Known subjects resolve to their display name; anything else is used as given.
fn subject_name(raw: &str) -> String {
    raw.parse::<IgcseSubject>()
        .map(|s| s.display_name().to_string())
        .unwrap_or_else(|_| raw.trim().to_string())
}

impl TopicArgs {
    /// The topic string sent to the model.
    fn resolve(&self) -> Result<String> {
        if let Some(topic) = self.topic.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            return Ok(topic.to_string());
        }
        if chapters_for(self.subject).is_some() {
            for chapter in &self.chapters {
                if find_chapter(self.subject, chapter).is_none() {
                    warn!(subject = %self.subject, chapter = %chapter, "Chapter is not in the syllabus catalogue");
                }
            }
        }
        let combined = combine_topics(&self.chapters, &self.subtopics);
        if combined.is_empty() {
            bail!("provide --topic, or at least one --chapter or --subtopic");
        }
        Ok(combined)
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let app = App {
        format: cli.format,
        data_dir: cli.data_dir,
    };

    match cli.command {
        Commands::Generate {
            kind,
            subject,
            exclude,
            input,
        } => {
            let notes = read_notes(&input).await?;
            let subject = subject.as_deref().map(subject_name);

            let orchestrator = ContentOrchestrator::new(backend()?, OrchestratorConfig::from_env()?)?;
            let mut request = GenerationRequest::new(notes, kind).with_exclusions(exclude);
            if let Some(subject) = &subject {
                request = request.with_subject(subject.clone());
            }
            let content = orchestrator.generate(&request).await?;

            if let (Some(subject), GeneratedContent::PastPapers(items)) = (&subject, &content) {
                let added = app.library().add_past_papers(subject, items).await?;
                info!(subject = %subject, added, "Past paper questions added to library");
            }
            app.emit(&content, render::content)
        }

        Commands::Clean { input } => {
            let notes = read_notes(&input).await?;
            let cleaned = NoteTools::new(backend()?).clean_notes(&notes).await?;
            app.emit(&cleaned, |c| c.clone())
        }

        Commands::Split { limit, part, input } => {
            let notes = read_notes(&input).await?;
            let mut parts = NoteParts::split(&notes, limit)?;
            match part {
                Some(0) => bail!("parts are numbered from 1"),
                Some(n) => {
                    let total = parts.len();
                    let text = parts.go_to(n - 1)?.to_string();
                    app.emit(&text, |t| format!("Part {} of {}\n\n{}", n, total, t))
                }
                None => app.emit(parts.parts(), render::parts),
            }
        }

        Commands::PastMcqs {
            topic,
            count,
            years,
        } => {
            let content = PracticeFinder::new(backend()?)
                .find_past_paper_mcqs(topic.subject.display_name(), &topic.resolve()?, count, years)
                .await?;
            app.emit(&content, render::content)
        }

        Commands::TopicMcqs { topic, count } => {
            let content = PracticeFinder::new(backend()?)
                .generate_topic_mcqs(topic.subject.display_name(), &topic.resolve()?, count)
                .await?;
            app.emit(&content, render::content)
        }

        Commands::TheoryQuestions {
            topic,
            criteria,
            count,
            years,
        } => {
            let subject = topic.subject.display_name();
            let content = PracticeFinder::new(backend()?)
                .find_specific_past_paper_questions(subject, &topic.resolve()?, &criteria, count, years)
                .await?;
            if let GeneratedContent::PastPapers(items) = &content {
                let added = app.library().add_past_papers(subject, items).await?;
                info!(subject, added, "Past paper questions added to library");
            }
            app.emit(&content, render::content)
        }

        Commands::Sme {
            more,
            existing,
            input,
        } => {
            let text = read_notes(&input).await?;
            let tools = NoteTools::new(backend()?);
            let content = if more {
                tools.generate_more_sme_mcqs(&text, &existing).await?
            } else {
                if !existing.is_empty() {
                    warn!("--existing is only used with --more");
                }
                tools.parse_sme_mcqs(&text).await?
            };
            app.emit(&content, render::content)
        }

        Commands::Hurry { command } => run_hurry(&app, command).await,
        Commands::Notes { command } => run_notes(&app, command).await,
        Commands::Papers { command } => run_papers(&app, command).await,

        Commands::Subjects { chapters } => {
            let entries: Vec<SubjectEntry> = IgcseSubject::ALL
                .into_iter()
                .map(|subject| SubjectEntry {
                    key: subject.key(),
                    name: subject.display_name(),
                    chapters: match (chapters, chapters_for(subject)) {
                        (true, Some(list)) => list
                            .iter()
                            .map(|c| ChapterEntry {
                                name: c.name,
                                subtopics: c.subtopics,
                            })
                            .collect(),
                        _ => Vec::new(),
                    },
                })
                .collect();
            app.emit(entries.as_slice(), render::subjects)
        }

        Commands::Health => {
            let backend = backend()?;
            let healthy = backend.health_check().await?;
            let status = json!({ "model": backend.model_name(), "healthy": healthy });
            app.emit(&status, |_| {
                format!(
                    "{}: {}",
                    backend.model_name(),
                    if healthy { "healthy" } else { "unavailable" }
                )
            })?;
            if !healthy {
                bail!("generation backend is not healthy");
            }
            Ok(())
        }
    }
}

async fn run_hurry(app: &App, command: HurryCommand) -> Result<()> {
    match command {
        HurryCommand::Topics { input } => {
            let notes = read_notes(&input).await?;
            let topics = HurryStudy::new(backend()?).extract_topics(&notes).await;
            app.emit(topics.as_slice(), render::topics)
        }
        HurryCommand::Explain { topic, input } => {
            let notes = read_notes(&input).await?;
            let text = HurryStudy::new(backend()?).explain_topic(&notes, &topic).await?;
            app.emit(&text, |t| t.clone())
        }
        HurryCommand::Theory { topic, input } => {
            let notes = read_notes(&input).await?;
            let test = HurryStudy::new(backend()?)
                .generate_theory_questions(&notes, &topic)
                .await?;
            let max_score = test.max_score();
            app.emit(test.questions().as_slice(), |qs| {
                format!("{}\n\nTotal: {} marks", render::theory_questions(qs), max_score)
            })
        }
        HurryCommand::Grade {
            topic,
            questions,
            answers,
            input,
        } => {
            let notes = read_notes(&input).await?;
            let questions: Vec<TheoryQuestion> = read_json(&questions).await?;
            let answers: TheoryAnswers = read_json(&answers).await?;
            let result = HurryStudy::new(backend()?)
                .grade_theory_questions(&notes, &topic, &questions, &answers)
                .await?;
            app.emit(&result, render::grading)
        }
        HurryCommand::Drill { topic, input } => {
            let notes = read_notes(&input).await?;
            let drill = HurryStudy::new(backend()?)
                .generate_drill_questions(&notes, &topic)
                .await?;
            app.emit(&drill, render::drill)
        }
    }
}

async fn run_notes(app: &App, command: NotesCommand) -> Result<()> {
    let library = app.library();
    match command {
        NotesCommand::Save {
            title,
            subject,
            input,
        } => {
            let notes = read_notes(&input).await?;
            let subject = subject.as_deref().map(subject_name);
            let note = library
                .save_note(title.as_deref(), subject.as_deref(), &notes)
                .await?;
            app.emit(&note, render::saved_note)
        }
        NotesCommand::List => {
            let notes = library.notes().await?;
            app.emit(notes.as_slice(), render::note_list)
        }
        NotesCommand::Show { id } => {
            let note = library.note(&id).await?;
            app.emit(&note, |n| n.content.clone())
        }
        NotesCommand::Delete { id } => {
            library.delete_note(&id).await?;
            app.emit(&json!({ "deleted": &id }), |_| format!("Deleted note {}", id))
        }
    }
}

async fn run_papers(app: &App, command: PapersCommand) -> Result<()> {
    let library = app.library();
    match command {
        PapersCommand::List { subject } => {
            let mut papers = library.past_papers().await?;
            if let Some(subject) = subject {
                papers.retain(|name, _| name == subject.display_name());
            }
            app.emit(&papers, render::papers)
        }
        PapersCommand::Clear => {
            library.clear_past_papers().await?;
            app.emit(&json!({ "cleared": true }), |_| {
                "Cleared saved past paper questions.".to_string()
            })
        }
    }
}
