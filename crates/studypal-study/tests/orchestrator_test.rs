//! Orchestrator scenarios against the scripted mock backend.

use std::sync::Arc;

use studypal_core::{
    ContentKind, Error, GeneratedContent, GenerationBackend, GenerationRequest, GroundingCitation,
};
use studypal_inference::MockGenerationBackend;
use studypal_study::{ContentOrchestrator, FailurePolicy, OrchestratorConfig};

const LIMIT: usize = 1000;

/// ~900-character paragraph tagged with a label that appears nowhere else.
fn paragraph(label: &str) -> String {
    format!("{} {}", label, "Forces change motion. ".repeat(40))
}

/// Three paragraphs that each need their own chunk at `LIMIT`.
fn long_notes() -> String {
    [paragraph("ALPHA"), paragraph("BRAVO"), paragraph("CHARLIE")].join("\n\n")
}

fn orchestrator(mock: &MockGenerationBackend, config: OrchestratorConfig) -> ContentOrchestrator {
    let backend: Arc<dyn GenerationBackend> = Arc::new(mock.clone());
    ContentOrchestrator::new(backend, config).expect("valid config")
}

fn small_chunks() -> OrchestratorConfig {
    OrchestratorConfig {
        chunk_limit: LIMIT,
        ..Default::default()
    }
}

fn mcq_json(questions: &[&str]) -> String {
    let items: Vec<serde_json::Value> = questions
        .iter()
        .map(|q| {
            serde_json::json!({
                "question": q,
                "options": ["Newton", "Joule", "Watt", "Pascal"],
                "answer": "Newton"
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}

#[test]
fn test_fixture_paragraphs_fit_one_chunk_each() {
    let para = paragraph("ALPHA");
    assert!(para.chars().count() > LIMIT / 2);
    assert!(para.chars().count() <= LIMIT);
    assert!(long_notes().chars().count() > LIMIT);
}

#[tokio::test]
async fn test_short_note_summary_is_single_call() {
    let reply = "## Summary\n\nForces cause acceleration.\n";
    let mock = MockGenerationBackend::new().with_default_response(reply);
    let orch = orchestrator(&mock, OrchestratorConfig::default());

    let notes: String = "Newton's second law: F = ma. ".repeat(20).chars().take(500).collect();
    let request = GenerationRequest::new(notes, ContentKind::BriefSummary);
    let content = orch.generate(&request).await.unwrap();

    assert_eq!(content, GeneratedContent::BriefSummary(reply.to_string()));
    let calls = mock.get_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].options.response_schema.is_none());
    assert!(!calls[0].options.search);
    assert!(calls[0].prompt.contains("Newton's second law: F = ma."));
}

#[tokio::test]
async fn test_short_note_mcqs_request_schema() {
    let mock = MockGenerationBackend::new().with_default_response(mcq_json(&["Unit of force?"]));
    let orch = orchestrator(&mock, OrchestratorConfig::default());

    let request = GenerationRequest::new("Force is measured in newtons.", ContentKind::Mcqs)
        .with_subject("Physics P2");
    let content = orch.generate(&request).await.unwrap();

    assert_eq!(content.item_count(), 1);
    let calls = mock.get_calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].options.response_schema.is_some());
    assert!(calls[0].prompt.starts_with("Generate 5 multiple-choice questions"));
    assert!(calls[0].prompt.contains("Physics P2"));
}

#[tokio::test]
async fn test_long_note_mcqs_skip_failing_chunk() {
    let mock = MockGenerationBackend::new()
        .with_failure_on("BRAVO", "simulated outage")
        .with_response_on("ALPHA", mcq_json(&["A1", "A2"]))
        .with_response_on("CHARLIE", mcq_json(&["C1"]));
    let orch = orchestrator(&mock, small_chunks());

    let request = GenerationRequest::new(long_notes(), ContentKind::Mcqs);
    let content = orch.generate(&request).await.unwrap();

    assert_eq!(content.item_texts(), vec!["A1", "A2", "C1"]);
    let prompts = mock.prompts();
    assert_eq!(prompts.len(), 3);
    assert!(prompts[0].contains("ALPHA"));
    assert!(prompts[1].contains("BRAVO"));
    assert!(prompts[2].contains("CHARLIE"));
    assert!(prompts
        .iter()
        .all(|p| p.starts_with("Generate 2 multiple-choice questions")));
}

#[tokio::test]
async fn test_long_note_items_fail_fast_policy() {
    let mock = MockGenerationBackend::new()
        .with_failure_on("BRAVO", "simulated outage")
        .with_default_response(mcq_json(&["Q"]));
    let config = OrchestratorConfig {
        item_policy: FailurePolicy::FailFast,
        ..small_chunks()
    };
    let orch = orchestrator(&mock, config);

    let err = orch
        .generate(&GenerationRequest::new(long_notes(), ContentKind::Mcqs))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UpstreamFailure(_)));
    assert_eq!(mock.call_count(), 2);
}

#[tokio::test]
async fn test_malformed_chunk_is_skipped() {
    let mock = MockGenerationBackend::new()
        .with_response_on("ALPHA", "I could not think of any questions.")
        .with_default_response(r#"[{"statement": "Forces change motion.", "answer": true}]"#);
    let orch = orchestrator(&mock, small_chunks());

    let content = orch
        .generate(&GenerationRequest::new(long_notes(), ContentKind::TrueFalse))
        .await
        .unwrap();
    assert_eq!(content.item_count(), 2);
}

#[tokio::test]
async fn test_long_note_summary_map_reduce() {
    let mock = MockGenerationBackend::new()
        .with_response_on("Combine them", "Final combined summary.\n")
        .with_response_on("ALPHA", "sum-a")
        .with_response_on("BRAVO", "sum-b")
        .with_response_on("CHARLIE", "sum-c");
    let orch = orchestrator(&mock, small_chunks());

    let content = orch
        .generate(&GenerationRequest::new(long_notes(), ContentKind::DetailedSummary))
        .await
        .unwrap();

    assert_eq!(
        content,
        GeneratedContent::DetailedSummary("Final combined summary.\n".to_string())
    );
    let prompts = mock.prompts();
    assert_eq!(prompts.len(), 4);
    assert!(prompts[..3]
        .iter()
        .all(|p| p.starts_with("Generate a concise, brief summary")));
    let reduce = &prompts[3];
    assert!(reduce.contains("cohesive detailed summary"));
    assert!(reduce.contains("sum-a\n\nsum-b\n\nsum-c"));
}

#[tokio::test]
async fn test_summary_map_failure_fails_by_default() {
    let mock = MockGenerationBackend::new()
        .with_failure_on("BRAVO", "simulated outage")
        .with_default_response("partial");
    let orch = orchestrator(&mock, small_chunks());

    let err = orch
        .generate(&GenerationRequest::new(long_notes(), ContentKind::BriefSummary))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UpstreamFailure(_)));
    assert!(mock.prompts().iter().all(|p| !p.contains("Combine them")));
}

#[tokio::test]
async fn test_summary_map_best_effort_reduces_survivors() {
    let mock = MockGenerationBackend::new()
        .with_response_on("Combine them", "Combined.")
        .with_failure_on("BRAVO", "simulated outage")
        .with_response_on("ALPHA", "sum-a")
        .with_response_on("CHARLIE", "sum-c");
    let config = OrchestratorConfig {
        summary_policy: FailurePolicy::BestEffort,
        ..small_chunks()
    };
    let orch = orchestrator(&mock, config);

    let content = orch
        .generate(&GenerationRequest::new(long_notes(), ContentKind::BriefSummary))
        .await
        .unwrap();
    assert_eq!(content, GeneratedContent::BriefSummary("Combined.".to_string()));
    let prompts = mock.prompts();
    let reduce = prompts.last().unwrap();
    assert!(reduce.contains("cohesive brief summary"));
    assert!(reduce.contains("sum-a\n\nsum-c"));
}

#[tokio::test]
async fn test_exclusions_are_bounded_to_most_recent() {
    let mock = MockGenerationBackend::new().with_default_response(mcq_json(&["New question"]));
    let config = OrchestratorConfig {
        exclusion_limit: 2,
        ..Default::default()
    };
    let orch = orchestrator(&mock, config);

    let request = GenerationRequest::new("Short notes on density.", ContentKind::Mcqs)
        .with_exclusions(vec![
            "EXCL-ONE".to_string(),
            "EXCL-TWO".to_string(),
            "EXCL-THREE".to_string(),
        ]);
    orch.generate(&request).await.unwrap();

    let prompt = &mock.prompts()[0];
    assert!(!prompt.contains("EXCL-ONE"));
    assert!(prompt.contains("1. EXCL-TWO"));
    assert!(prompt.contains("2. EXCL-THREE"));
}

#[tokio::test]
async fn test_dedup_removes_repeated_items_when_enabled() {
    let mock = MockGenerationBackend::new()
        .with_default_response(mcq_json(&["What is the unit of force?", "What is density?"]));
    let request = GenerationRequest::new("Notes.", ContentKind::Mcqs)
        .with_exclusions(vec!["what is the UNIT of force?".to_string()]);

    let plain = orchestrator(&mock, OrchestratorConfig::default());
    assert_eq!(plain.generate(&request).await.unwrap().item_count(), 2);

    let dedup = orchestrator(
        &mock,
        OrchestratorConfig {
            dedup_exclusions: true,
            ..Default::default()
        },
    );
    let content = dedup.generate(&request).await.unwrap();
    assert_eq!(content.item_texts(), vec!["What is density?"]);
}

#[tokio::test]
async fn test_empty_notes_rejected_without_calls() {
    let mock = MockGenerationBackend::new();
    let orch = orchestrator(&mock, OrchestratorConfig::default());

    let err = orch
        .generate(&GenerationRequest::new("   \n", ContentKind::Flashcards))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    assert_eq!(mock.call_count(), 0);
}

const EXTRACTION_MARKER: &str = "Identify the specific IGCSE Subject";
const SEARCH_MARKER: &str = "Find 4-5 authentic";

#[tokio::test]
async fn test_past_papers_two_step_protocol() {
    let papers = r#"Here is what I found:
```json
[
  {"question": "Explain why metals are good conductors of heat.", "answer": "**Free electrons** transfer energy.", "difficulty": "Medium", "sourceUrl": "https://papers.example/0625_s22_qp_42.pdf"},
  {"question": "State two uses of thermal expansion.", "answer": "**Thermostats** and rail gaps.", "difficulty": "easy"}
]
```"#;
    let mock = MockGenerationBackend::new()
        .with_response_on(
            EXTRACTION_MARKER,
            r#"{"subject": "Physics", "topic": "Thermal Physics", "searchQuery": "IGCSE Physics thermal past paper questions"}"#,
        )
        .with_grounded_response_on(
            SEARCH_MARKER,
            papers,
            vec![GroundingCitation {
                uri: "https://search.example/result".to_string(),
                title: Some("Thermal physics questions".to_string()),
            }],
        );
    let orch = orchestrator(&mock, small_chunks());

    let request =
        GenerationRequest::new(long_notes(), ContentKind::PastPapers).with_subject("Physics P2");
    let content = orch.generate(&request).await.unwrap();

    let calls = mock.get_calls();
    assert_eq!(calls.len(), 2, "past papers are never chunked");
    assert!(calls[0].prompt.contains(EXTRACTION_MARKER));
    assert!(calls[0].options.json_mode);
    assert!(!calls[0].options.search);
    assert!(calls[1].options.search);
    assert!(!calls[1].options.wants_json());
    assert!(calls[1].prompt.contains("\"Thermal Physics\""));
    assert!(calls[1].prompt.contains("IGCSE Physics thermal past paper questions"));

    match content {
        GeneratedContent::PastPapers(items) => {
            assert_eq!(items.len(), 2);
            assert_eq!(
                items[0].source_url.as_deref(),
                Some("https://papers.example/0625_s22_qp_42.pdf")
            );
            assert_eq!(
                items[1].source_url.as_deref(),
                Some("https://search.example/result")
            );
        }
        other => panic!("expected past papers, got {:?}", other),
    }
}

#[tokio::test]
async fn test_past_papers_topic_extraction_falls_back() {
    let mock = MockGenerationBackend::new()
        .with_failure_on(EXTRACTION_MARKER, "extraction outage")
        .with_response_on(SEARCH_MARKER, "[]");
    let orch = orchestrator(&mock, OrchestratorConfig::default());

    let request = GenerationRequest::new("Notes about moles.", ContentKind::PastPapers)
        .with_subject("Chemistry P2");
    let content = orch.generate(&request).await.unwrap();

    assert_eq!(content.item_count(), 0);
    let prompts = mock.prompts();
    assert_eq!(prompts.len(), 2);
    assert!(prompts[1].contains("Chemistry P2 questions based on notes"));
}

#[tokio::test]
async fn test_past_papers_unparseable_search_is_malformed() {
    let mock = MockGenerationBackend::new()
        .with_response_on(EXTRACTION_MARKER, "not json at all")
        .with_response_on(SEARCH_MARKER, "I could not find any past paper questions.");
    let orch = orchestrator(&mock, OrchestratorConfig::default());

    let err = orch
        .generate(&GenerationRequest::new("Notes.", ContentKind::PastPapers))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::MalformedResponse { .. }));
    assert!(mock.prompts()[1].contains("IGCSE questions based on notes"));
}
