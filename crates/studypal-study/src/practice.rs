//! Practice finders: past-paper searches and syllabus-topic quizzes that
//! work from a subject and topic instead of the user's notes.

use std::sync::Arc;

use tracing::{info, instrument};

use studypal_core::{
    defaults, Error, GeneratedContent, GenerationBackend, GenerationOptions, Result,
};

use crate::kinds;
use crate::prompts;
use crate::schema;

/// First and last exam year of a window ending at `end_year`.
pub fn year_window(end_year: i32, year_range: u32) -> (i32, i32) {
    let span = year_range.max(1) as i32;
    (end_year - span + 1, end_year)
}

/// Human phrasing of the year window used in search prompts.
pub fn year_text(end_year: i32, year_range: u32) -> String {
    let (start, end) = year_window(end_year, year_range);
    if start == end {
        format!("from the year {}", end)
    } else {
        format!("between the years {} and {}", start, end)
    }
}

fn require(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(Error::InvalidArgument(message.to_string()))
    }
}

/// Finds and generates practice questions for a subject and topic.
pub struct PracticeFinder {
    backend: Arc<dyn GenerationBackend>,
    end_year: i32,
}

impl PracticeFinder {
    pub fn new(backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            backend,
            end_year: defaults::PAST_PAPER_END_YEAR,
        }
    }

    /// Set the last exam year covered by searches.
    pub fn with_end_year(mut self, end_year: i32) -> Self {
        self.end_year = end_year;
        self
    }

    pub fn end_year(&self) -> i32 {
        self.end_year
    }

    /// Search for authentic past-paper MCQs with their source paper.
    ///
    /// Missing or placeholder source URLs are replaced with grounding
    /// citations, cycling through them by item index.
    #[instrument(skip(self), fields(subsystem = "study", component = "practice", op = "find_past_paper_mcqs"))]
    pub async fn find_past_paper_mcqs(
        &self,
        subject: &str,
        topic: &str,
        count: usize,
        year_range: u32,
    ) -> Result<GeneratedContent> {
        require(!topic.trim().is_empty(), "topic is required")?;
        require(count > 0, "question count must be positive")?;
        require(year_range >= 1, "year range must be at least one year")?;

        let prompt = prompts::past_paper_mcqs(
            subject,
            topic,
            count,
            &year_text(self.end_year, year_range),
        );
        let output = self.backend.generate_grounded(&prompt).await?;
        let mut items = kinds::parse_sourced_mcqs(&output.text)?;
        kinds::apply_citations_to_mcqs(&mut items, &output.citations);

        info!(
            item_count = items.len(),
            citation_count = output.citations.len(),
            "Past paper MCQs found"
        );
        Ok(GeneratedContent::SourcedMcqs(items))
    }

    /// Search for past-paper theory questions matching `criteria`
    /// (for example "4 marks").
    #[instrument(skip(self), fields(subsystem = "study", component = "practice", op = "find_specific_questions"))]
    pub async fn find_specific_past_paper_questions(
        &self,
        subject: &str,
        topic: &str,
        criteria: &str,
        count: usize,
        year_range: u32,
    ) -> Result<GeneratedContent> {
        require(!topic.trim().is_empty(), "topic is required")?;
        require(!criteria.trim().is_empty(), "question criteria is required")?;
        require(count > 0, "question count must be positive")?;
        require(year_range >= 1, "year range must be at least one year")?;

        let prompt = prompts::specific_past_paper_questions(
            subject,
            topic,
            criteria.trim(),
            count,
            &year_text(self.end_year, year_range),
        );
        let output = self.backend.generate_grounded(&prompt).await?;
        let mut content =
            kinds::parse_output(studypal_core::ContentKind::PastPapers, &output.text)?;
        if let GeneratedContent::PastPapers(items) = &mut content {
            kinds::apply_citations_to_papers(items, &output.citations);
        }

        info!(item_count = content.item_count(), "Past paper questions found");
        Ok(content)
    }

    /// Generate exam-style MCQs on a syllabus topic without notes.
    #[instrument(skip(self), fields(subsystem = "study", component = "practice", op = "generate_topic_mcqs"))]
    pub async fn generate_topic_mcqs(
        &self,
        subject: &str,
        topic: &str,
        count: usize,
    ) -> Result<GeneratedContent> {
        require(!topic.trim().is_empty(), "topic is required")?;
        require(count > 0, "question count must be positive")?;

        let output = self
            .backend
            .generate_with_options(
                &prompts::topic_mcqs(subject, topic, count),
                &GenerationOptions::structured(schema::mcq_list()),
            )
            .await?;
        let content = kinds::parse_output(studypal_core::ContentKind::Mcqs, &output.text)?;

        info!(item_count = content.item_count(), "Topic MCQs generated");
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_year_window() {
        assert_eq!(year_window(2025, 1), (2025, 2025));
        assert_eq!(year_window(2025, 5), (2021, 2025));
        assert_eq!(year_window(2025, 0), (2025, 2025));
    }

    #[test]
    fn test_year_text() {
        assert_eq!(year_text(2025, 1), "from the year 2025");
        assert_eq!(year_text(2025, 3), "between the years 2023 and 2025");
    }
}
