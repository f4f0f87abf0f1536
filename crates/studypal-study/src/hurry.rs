//! Hurry Study: topic-by-topic revision sessions built from the user's
//! notes (topic list, simple explanation, graded theory test, drill).

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use studypal_core::{
    defaults, extract_as, DrillSet, Error, GenerationBackend, GenerationOptions, HurryStudyTopic,
    McqQuestion, Result, TheoryGradingResult, TheoryLevel, TheoryQuestion, TrueFalseQuestion,
};

use crate::prompts::{self, preview};
use crate::schema;

#[derive(Debug, Deserialize)]
struct QuestionText {
    #[serde(default)]
    question: String,
}

#[derive(Debug, Default, Deserialize)]
struct TheoryQuestionSet {
    #[serde(default)]
    easy: Vec<QuestionText>,
    #[serde(default)]
    hard: Vec<QuestionText>,
}

/// Generated theory test: easy questions first, then hard ones.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TheoryTest {
    pub easy: Vec<TheoryQuestion>,
    pub hard: Vec<TheoryQuestion>,
}

impl TheoryTest {
    /// All questions in presentation order.
    pub fn questions(&self) -> Vec<TheoryQuestion> {
        self.easy.iter().chain(self.hard.iter()).cloned().collect()
    }

    /// Maximum achievable score.
    pub fn max_score(&self) -> u32 {
        self.easy
            .iter()
            .chain(self.hard.iter())
            .map(|q| q.level.max_score())
            .sum()
    }
}

/// Student answers keyed by question id.
pub type TheoryAnswers = BTreeMap<u32, String>;

fn fallback_topics() -> Vec<HurryStudyTopic> {
    vec![HurryStudyTopic {
        id: "1".to_string(),
        name: "General Content".to_string(),
    }]
}

/// Number questions of one level; hard ids start after the easy block.
fn number_questions(items: Vec<QuestionText>, level: TheoryLevel, first_id: u32) -> Vec<TheoryQuestion> {
    items
        .into_iter()
        .filter(|q| !q.question.trim().is_empty())
        .enumerate()
        .map(|(i, q)| TheoryQuestion {
            id: first_id + i as u32,
            question: q.question.trim().to_string(),
            level,
        })
        .collect()
}

/// "Question (easy): ...\nStudent Answer: ..." blocks for the grading prompt.
pub fn qa_pairs(questions: &[TheoryQuestion], answers: &TheoryAnswers) -> String {
    questions
        .iter()
        .map(|q| {
            let answer = answers
                .get(&q.id)
                .map(|a| a.trim())
                .filter(|a| !a.is_empty())
                .unwrap_or("No answer provided.");
            let level = match q.level {
                TheoryLevel::Easy => "easy",
                TheoryLevel::Hard => "hard",
            };
            format!("Question ({}): {}\nStudent Answer: {}", level, q.question, answer)
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Hurry Study session services.
pub struct HurryStudy {
    backend: Arc<dyn GenerationBackend>,
}

impl HurryStudy {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self { backend }
    }

    async fn structured<T: serde::de::DeserializeOwned>(
        &self,
        prompt: &str,
        schema: serde_json::Value,
    ) -> Result<T> {
        let output = self
            .backend
            .generate_with_options(prompt, &GenerationOptions::structured(schema))
            .await?;
        extract_as::<T>(&output.text)
    }

    /// Identify up to six topics in the notes.
    ///
    /// Any failure yields a single "General Content" topic.
    #[instrument(skip(self, notes), fields(subsystem = "study", component = "hurry", op = "extract_topics"))]
    pub async fn extract_topics(&self, notes: &str) -> Vec<HurryStudyTopic> {
        let prompt = prompts::hurry_topics(
            preview(notes, defaults::HURRY_TOPIC_PREVIEW_CHARS),
            defaults::HURRY_MAX_TOPICS,
        );
        let topics = match self
            .structured::<Vec<HurryStudyTopic>>(&prompt, schema::hurry_topics())
            .await
        {
            Ok(topics) => topics,
            Err(e) => {
                warn!(error = %e, "Topic extraction failed, using general topic");
                return fallback_topics();
            }
        };

        let mut topics: Vec<HurryStudyTopic> = topics
            .into_iter()
            .filter(|t| !t.name.trim().is_empty())
            .take(defaults::HURRY_MAX_TOPICS)
            .collect();
        if topics.is_empty() {
            warn!("Model returned no topics, using general topic");
            return fallback_topics();
        }
        for (i, topic) in topics.iter_mut().enumerate() {
            if topic.id.trim().is_empty() {
                topic.id = (i + 1).to_string();
            }
        }
        info!(topic_count = topics.len(), "Topics extracted");
        topics
    }

    /// Simple markdown explanation of one topic.
    #[instrument(skip(self, notes), fields(subsystem = "study", component = "hurry", op = "explain_topic"))]
    pub async fn explain_topic(&self, notes: &str, topic: &str) -> Result<String> {
        let prompt = prompts::explain_topic(preview(notes, defaults::HURRY_CONTENT_PREVIEW_CHARS), topic);
        let text = self.backend.generate(&prompt).await?;
        Ok(text.trim().to_string())
    }

    /// Five easy (ids 0-4) and five hard (ids 5-9) questions grounded in the notes.
    #[instrument(skip(self, notes), fields(subsystem = "study", component = "hurry", op = "theory_questions"))]
    pub async fn generate_theory_questions(&self, notes: &str, topic: &str) -> Result<TheoryTest> {
        let per_level = defaults::THEORY_QUESTIONS_PER_LEVEL;
        let prompt = prompts::theory_questions(
            preview(notes, defaults::HURRY_CONTENT_PREVIEW_CHARS),
            topic,
            per_level,
        );
        let set: TheoryQuestionSet = self.structured(&prompt, schema::theory_questions()).await?;

        let test = TheoryTest {
            easy: number_questions(set.easy, TheoryLevel::Easy, 0),
            hard: number_questions(set.hard, TheoryLevel::Hard, per_level as u32),
        };
        if test.easy.is_empty() && test.hard.is_empty() {
            return Err(Error::malformed("no theory questions returned", String::new()));
        }
        debug!(easy = test.easy.len(), hard = test.hard.len(), "Theory questions generated");
        Ok(test)
    }

    /// Grade answers as an examiner: easy questions out of 3, hard out of 6.
    ///
    /// When the model returns one feedback per question, feedback ids are
    /// reassigned positionally to the asked question ids.
    #[instrument(skip(self, notes, questions, answers), fields(subsystem = "study", component = "hurry", op = "grade_theory", question_count = questions.len()))]
    pub async fn grade_theory_questions(
        &self,
        notes: &str,
        topic: &str,
        questions: &[TheoryQuestion],
        answers: &TheoryAnswers,
    ) -> Result<TheoryGradingResult> {
        if questions.is_empty() {
            return Err(Error::InvalidArgument("no questions to grade".to_string()));
        }
        let prompt = prompts::grade_theory(
            preview(notes, defaults::GRADING_PREVIEW_CHARS),
            topic,
            &qa_pairs(questions, answers),
        );
        let mut result: TheoryGradingResult =
            self.structured(&prompt, schema::theory_grading()).await?;

        if result.feedbacks.len() == questions.len() {
            for (feedback, question) in result.feedbacks.iter_mut().zip(questions) {
                feedback.question_id = question.id;
            }
        } else {
            warn!(
                feedback_count = result.feedbacks.len(),
                question_count = questions.len(),
                "Feedback count differs from question count, keeping model ids"
            );
        }
        info!(
            total_score = result.total_score,
            max_total_score = result.max_total_score,
            "Theory answers graded"
        );
        Ok(result)
    }

    /// Ten true/false and ten MCQ drill questions.
    #[instrument(skip(self, notes), fields(subsystem = "study", component = "hurry", op = "drill"))]
    pub async fn generate_drill_questions(&self, notes: &str, topic: &str) -> Result<DrillSet> {
        let prompt = prompts::drill(
            preview(notes, defaults::HURRY_CONTENT_PREVIEW_CHARS),
            topic,
            defaults::DRILL_QUESTIONS_PER_FORMAT,
        );
        let set: DrillSet = self.structured(&prompt, schema::drill_set()).await?;

        let tf: Vec<TrueFalseQuestion> = set.tf.into_iter().filter(|q| q.is_valid()).collect();
        let mcq: Vec<McqQuestion> = set
            .mcq
            .into_iter()
            .map(McqQuestion::normalized)
            .filter(|q| q.is_valid())
            .collect();
        if tf.is_empty() && mcq.is_empty() {
            return Err(Error::malformed("no drill questions returned", String::new()));
        }
        debug!(tf = tf.len(), mcq = mcq.len(), "Drill generated");
        Ok(DrillSet { tf, mcq })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: u32, level: TheoryLevel) -> TheoryQuestion {
        TheoryQuestion {
            id,
            question: format!("Question {}", id),
            level,
        }
    }

    #[test]
    fn test_number_questions_offsets_hard_ids() {
        let items = vec![
            QuestionText {
                question: "Explain convection.".to_string(),
            },
            QuestionText {
                question: "  ".to_string(),
            },
            QuestionText {
                question: "Explain radiation.".to_string(),
            },
        ];
        let numbered = number_questions(items, TheoryLevel::Hard, 5);
        let ids: Vec<u32> = numbered.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![5, 6]);
        assert!(numbered.iter().all(|q| q.level == TheoryLevel::Hard));
    }

    #[test]
    fn test_qa_pairs_marks_missing_answers() {
        let questions = vec![question(0, TheoryLevel::Easy), question(5, TheoryLevel::Hard)];
        let mut answers = TheoryAnswers::new();
        answers.insert(0, "Heat rises.".to_string());
        answers.insert(5, "   ".to_string());
        let text = qa_pairs(&questions, &answers);
        assert_eq!(
            text,
            "Question (easy): Question 0\nStudent Answer: Heat rises.\n\nQuestion (hard): Question 5\nStudent Answer: No answer provided."
        );
    }

    #[test]
    fn test_theory_test_max_score() {
        let test = TheoryTest {
            easy: vec![question(0, TheoryLevel::Easy), question(1, TheoryLevel::Easy)],
            hard: vec![question(5, TheoryLevel::Hard)],
        };
        assert_eq!(test.max_score(), 12);
        assert_eq!(test.questions().len(), 3);
    }
}
