//! Prompt builders for every generation call.
//!
//! Builders are plain functions over borrowed inputs so the orchestrator
//! and the practice/note/Hurry Study services can share them and tests can
//! assert on prompt text without a backend.

/// Inputs shared by the per-kind note prompts.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub notes: &'a str,
    pub subject: Option<&'a str>,
    /// Items requested from this call.
    pub item_count: usize,
    /// Exclusion entries already bounded to the configured limit.
    pub exclusions: &'a [String],
}

impl<'a> PromptContext<'a> {
    pub fn new(notes: &'a str, subject: Option<&'a str>, item_count: usize) -> Self {
        Self {
            notes,
            subject,
            item_count,
            exclusions: &[],
        }
    }

    pub fn with_exclusions(mut self, exclusions: &'a [String]) -> Self {
        self.exclusions = exclusions;
        self
    }
}

/// Prefix of `text` holding at most `max_chars` characters.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// The most recent `limit` entries of an exclusion list.
pub fn recent_exclusions(exclusions: &[String], limit: usize) -> &[String] {
    &exclusions[exclusions.len().saturating_sub(limit)..]
}

fn subject_clause(subject: Option<&str>) -> String {
    match subject {
        Some(s) if !s.trim().is_empty() => format!(" for the IGCSE subject \"{}\"", s.trim()),
        _ => String::new(),
    }
}

fn numbered(items: &[String]) -> String {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| format!("{}. {}", i + 1, item.trim()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Numbered "do not repeat" block, empty when there is nothing to exclude.
pub fn exclusion_block(exclusions: &[String]) -> String {
    if exclusions.is_empty() {
        return String::new();
    }
    format!(
        "\n\nThe following items have ALREADY been generated. Do not repeat them or ask about the same fact in different words:\n{}",
        numbered(exclusions)
    )
}

fn notes_block(notes: &str) -> String {
    format!("Notes:\n\"\"\"\n{}\n\"\"\"", notes)
}

// =============================================================================
// NOTE CONTENT
// =============================================================================

pub fn brief_summary(ctx: &PromptContext<'_>) -> String {
    format!(
        "Generate a concise, brief summary of the following notes{}.\n\n{}",
        subject_clause(ctx.subject),
        notes_block(ctx.notes)
    )
}

pub fn detailed_summary(ctx: &PromptContext<'_>) -> String {
    format!(
        "Generate a detailed, comprehensive summary of the following notes{}.\n\n{}",
        subject_clause(ctx.subject),
        notes_block(ctx.notes)
    )
}

pub fn mcqs(ctx: &PromptContext<'_>) -> String {
    format!(
        "Generate {} multiple-choice questions with exactly 4 options each based on the following notes{}. The answer must be one of the options.{}\n\n{}",
        ctx.item_count,
        subject_clause(ctx.subject),
        exclusion_block(ctx.exclusions),
        notes_block(ctx.notes)
    )
}

pub fn true_false(ctx: &PromptContext<'_>) -> String {
    format!(
        "Generate {} true/false questions based on the following notes{}. Each item is a statement and a boolean answer.{}\n\n{}",
        ctx.item_count,
        subject_clause(ctx.subject),
        exclusion_block(ctx.exclusions),
        notes_block(ctx.notes)
    )
}

pub fn flashcards(ctx: &PromptContext<'_>) -> String {
    format!(
        "Generate {} flashcards based on the following notes{}. The front is a short question or key term; the back is a concise answer or definition.{}\n\n{}",
        ctx.item_count,
        subject_clause(ctx.subject),
        exclusion_block(ctx.exclusions),
        notes_block(ctx.notes)
    )
}

/// Combine per-chunk summaries into one summary of the requested grain.
pub fn reduce_summaries(partials: &[String], detailed: bool) -> String {
    format!(
        "The following are summaries of different parts of a larger document. Combine them into a single, cohesive {} summary.\n\nSummaries:\n\"\"\"\n{}\n\"\"\"",
        if detailed { "detailed" } else { "brief" },
        partials.join("\n\n")
    )
}

// =============================================================================
// PAST PAPERS
// =============================================================================

/// JSON-mode call identifying the subject, topic and a search phrase.
pub fn topic_extraction(notes_preview: &str, subject: Option<&str>) -> String {
    format!(
        "Analyze the following study notes. Identify the specific IGCSE Subject (if not provided) and the main Topic/Chapter name.\n\
         Subject provided: {}\n\n\
         Return a JSON object with:\n\
         - subject: string\n\
         - topic: string\n\
         - searchQuery: A specific search phrase to find IGCSE past paper questions for this topic (e.g. \"IGCSE Physics Thermal Properties past paper questions worksheet pdf\")\n\n\
         Notes Preview:\n\"\"\"\n{}\n\"\"\"",
        subject.filter(|s| !s.trim().is_empty()).unwrap_or("Not specified"),
        notes_preview
    )
}

/// Search query used when topic extraction fails.
pub fn fallback_search_query(subject: Option<&str>) -> String {
    format!(
        "{} questions based on notes",
        subject.filter(|s| !s.trim().is_empty()).unwrap_or("IGCSE")
    )
}

/// Search-grounded call for theory questions on an extracted topic.
pub fn past_papers_search(topic: &str, search_query: &str, exclusions: &[String]) -> String {
    format!(
        "You are an expert IGCSE tutor.\n\
         Task: Find 4-5 authentic, high-quality IGCSE past paper questions (can be Theory or multiple choice) that test the topic \"{}\".\n\n\
         Use the Google Search tool to find real questions from past papers.\n\
         Search Query: \"{}\"\n\n\
         For each question found:\n\
         1. **Question**: The exact text of the question.\n\
         2. **Answer**: A detailed model answer (use bolding for key terms).\n\
         3. **Difficulty**: Easy, Medium, or Hard.{}\n\n\
         Output Format: Return a SINGLE JSON array of objects inside a markdown code block (e.g., ```json ... ```).\n\
         Schema: [{{ \"question\": \"...\", \"answer\": \"...\", \"difficulty\": \"...\" }}]",
        topic,
        search_query,
        exclusion_block(exclusions)
    )
}

/// Search-grounded call for authentic past-paper MCQs with provenance.
pub fn past_paper_mcqs(subject: &str, topic: &str, count: usize, year_text: &str) -> String {
    format!(
        "You are an expert IGCSE O-Level examination tutor. Your task is to find authentic past paper Multiple Choice Questions (MCQs) based on a specific subject, topic, and year range. You MUST use your search tool to find these questions from reliable online past paper repositories. Do NOT invent, create, or modify any questions.\n\n\
         **Instructions:**\n\n\
         1. **Search:** For the IGCSE subject \"{subject}\" and the topic \"{topic}\", search for {count} unique MCQs from official past papers published {year_text}.\n\
         2. **Extract:** For each question found, extract the full question text, exactly four multiple-choice options, the correct answer, the precise source of the paper (e.g., \"June 2022, Paper 1, Variant 2, Question 15\") and the full URL of the page where you found the question.\n\
         3. **Format:** Return your findings as a single, valid JSON array of objects inside a markdown code block (e.g., ```json ... ```).\n\n\
         **Crucial Constraints:**\n\
         * **Authenticity is Paramount:** Only return questions you have found verbatim from past papers. If you cannot find a real question, do not include a substitute.\n\
         * **No AI Generation:** Do not generate any part of the question, options, or answer.\n\
         * **Complete Data:** Every field (question, options, answer, sourcePaper, sourceUrl) is mandatory for each object.\n\n\
         **Subject:** \"{subject}\"\n\
         **Topic:** \"{topic}\"\n\
         **Number of Questions:** {count}"
    )
}

/// Search-grounded call for theory questions matching a criteria string.
pub fn specific_past_paper_questions(
    subject: &str,
    topic: &str,
    criteria: &str,
    count: usize,
    year_text: &str,
) -> String {
    format!(
        "You are an expert IGCSE O-Level examination tutor. Use your search tool to find {count} authentic past paper theory questions for the IGCSE subject \"{subject}\" on the topic \"{topic}\" from papers published {year_text}.\n\n\
         Only include questions matching this criteria: \"{criteria}\".\n\
         Do NOT invent questions. If you cannot find enough real questions, return fewer.\n\n\
         For each question found:\n\
         1. **question**: The exact text of the question, including its mark allocation.\n\
         2. **answer**: A detailed model answer based on the mark scheme (use bolding for key terms).\n\
         3. **difficulty**: Easy, Medium, or Hard.\n\
         4. **sourceUrl**: The full URL of the page where you found the question.\n\n\
         Output Format: Return a SINGLE JSON array of objects inside a markdown code block (e.g., ```json ... ```).\n\
         Schema: [{{ \"question\": \"...\", \"answer\": \"...\", \"difficulty\": \"...\", \"sourceUrl\": \"...\" }}]"
    )
}

/// Structured-output MCQs on a syllabus topic, without notes.
pub fn topic_mcqs(subject: &str, topic: &str, count: usize) -> String {
    format!(
        "You are an experienced IGCSE examiner. Write {count} exam-style multiple-choice questions for the IGCSE subject \"{subject}\" covering the syllabus topic(s): \"{topic}\".\n\n\
         Each question must have exactly 4 options and the answer must be the exact text of one of the options. Match the style and difficulty of Cambridge Paper 1/Paper 2 MCQs and cover different sub-areas of the topic."
    )
}

// =============================================================================
// NOTE TOOLS
// =============================================================================

pub fn clean_notes(raw: &str) -> String {
    format!(
        "You are a text-cleaning assistant. Your task is to process the following study notes and remove all non-essential information.\n\
         Please remove:\n\
         - Page numbers\n\
         - Headers and footers\n\
         - \"Learning Outcomes\", \"Syllabus Aims\", or similar sections\n\
         - Tables of contents or indexes\n\
         - Any other administrative or metadata text.\n\
         The output should be ONLY the core educational content, with paragraphs preserved. Do not add any introduction or conclusion of your own.\n\n\
         Here are the notes:\n\"\"\"\n{}\n\"\"\"",
        raw
    )
}

pub fn parse_sme(raw: &str) -> String {
    format!(
        "You are an intelligent educational AI assistant. Your task is to output a structured Multiple Choice Quiz (MCQ) from the provided input text.\n\n\
         **Analysis Strategy:**\n\n\
         1. **Check for Existing Questions:** Does the text contain pre-written multiple-choice questions (e.g., from a past paper PDF)?\n\
         * **If YES:** Extract the questions and options.\n\
         * **CRITICAL:** If the answer key is missing, YOU MUST SOLVE THE QUESTION yourself and provide the correct answer. Do not skip questions because the answer is missing.\n\n\
         2. **Check for Study Notes:** If the text does NOT contain clearly formatted questions (e.g., it is just study notes, summaries, or paragraphs of text):\n\
         * **If YES:** GENERATE new high-quality multiple-choice questions based on the content of the notes.\n\
         * Create between 5 to 15 questions depending on the length of the text.\n\n\
         **Output Format:**\n\
         Return a single JSON array of objects. Each object must have:\n\
         - `question`: The question text.\n\
         - `options`: An array of exactly 4 strings.\n\
         - `answer`: The correct option string (must be one of the options).\n\n\
         **Input Text:**\n\"\"\"\n{}\n\"\"\"",
        raw
    )
}

pub fn more_sme(raw: &str, existing: &[String]) -> String {
    format!(
        "You are an intelligent educational AI assistant.\n\
         Task: Generate 5-10 *new* Multiple Choice Questions (MCQ) from the provided input text.\n\n\
         **Constraint:**\n\
         The following questions have ALREADY been generated. **Do not** repeat them.\n\
         Focus on topics, details, concepts, or sections of the text that have **not** yet been tested.\n\
         If the text is fully covered, create questions that test understanding from a different angle or deeper inference.\n\n\
         **Existing Questions (to avoid):**\n\"\"\"\n{}\n\"\"\"\n\n\
         **Input Text:**\n\"\"\"\n{}\n\"\"\"\n\n\
         **Output Format:**\n\
         Return a single JSON array of objects with the standard schema:\n\
         - `question`: string\n\
         - `options`: string[] (4 options)\n\
         - `answer`: string (must be one of the options)",
        numbered(existing),
        raw
    )
}

// =============================================================================
// HURRY STUDY
// =============================================================================

pub fn hurry_topics(notes_preview: &str, max_topics: usize) -> String {
    format!(
        "Analyze the provided study notes. Identify the distinct main topics or sections (e.g., \"Cotton Industries\", \"Nuclear Physics\", \"The Prophet's Life\").\n\
         Limit to {} distinct topics.\n\
         Return a JSON array of objects with \"id\" (short unique string) and \"name\" (topic name).\n\n{}",
        max_topics,
        notes_block(notes_preview)
    )
}

pub fn explain_topic(notes_preview: &str, topic: &str) -> String {
    format!(
        "Based strictly on the provided notes, explain the topic \"{}\" in a simple, easy-to-grasp manner for a student.\n\n\
         **Format Instructions:**\n\
         - Use \"## \" for main sections (e.g., Introduction, Key Processes, Significance).\n\
         - Use \"### \" for sub-sections.\n\
         - Use bullet points \"- \" for lists.\n\
         - **CRITICAL:** Use \"**bold**\" for ALL key terms, definitions, and important dates.\n\
         - Use \"> \" (blockquotes) for \"Key Takeaways\" or \"Important Rules/Formulas\" to highlight them.\n\
         - Make the content visually structured, spaced out, and easy to scan.\n\n{}",
        topic,
        notes_block(notes_preview)
    )
}

pub fn theory_questions(notes_preview: &str, topic: &str, per_level: usize) -> String {
    format!(
        "You are an examiner creating a test based ONLY on the provided study notes for the topic \"{topic}\".\n\n\
         Task:\n\
         1. Generate {per_level} \"Easy\" questions (answerable in 2-3 lines).\n\
         2. Generate {per_level} \"Hard\" questions (answerable in 3-6 lines).\n\n\
         CRITICAL INSTRUCTIONS:\n\
         - **Strict Grounding:** You must ONLY ask questions where the answer is explicitly found in the \"Notes\" section below.\n\
         - **No Outside Knowledge:** Do not ask about facts, dates, or concepts not present in the text, even if they are relevant to the topic in real life.\n\
         - **Verification:** Before outputting a question, verify that the answer exists in the provided text.\n\n\
         Return a JSON object: {{ \"easy\": [{{ \"question\": \"...\" }}], \"hard\": [{{ \"question\": \"...\" }}] }}\n\n{}",
        notes_block(notes_preview)
    )
}

pub fn grade_theory(notes_preview: &str, topic: &str, qa_pairs: &str) -> String {
    format!(
        "You are a Cambridge O Level examiner. Grade the following student answers based on the provided notes for topic \"{topic}\".\n\n\
         For each question:\n\
         1. Score it (Easy questions out of 3, Hard questions out of 6).\n\
         2. Provide constructive feedback and the correct model answer.\n\n\
         Also provide general advice on how to improve.\n\n\
         Return JSON with \"feedbacks\" (questionId, score, maxScore, feedback, modelAnswer), \"generalAdvice\", \"totalScore\" and \"maxTotalScore\".\n\n\
         Q&A Pairs:\n{qa_pairs}\n\n\
         Context Notes:\n\"\"\"\n{notes_preview}\n\"\"\""
    )
}

pub fn drill(notes_preview: &str, topic: &str, per_format: usize) -> String {
    format!(
        "Generate drill questions for topic \"{topic}\" based STRICTLY on the notes.\n\
         1. {per_format} True/False questions.\n\
         2. {per_format} Multiple Choice Questions (4 options).\n\n\
         CRITICAL:\n\
         - All questions must be answerable purely from the provided notes.\n\
         - Do not use outside knowledge.\n\n\
         Return JSON: {{ \"tf\": [{{ \"statement\": \"...\", \"answer\": boolean }}], \"mcq\": [{{ \"question\": \"...\", \"options\": [\"...\"], \"answer\": \"...\" }}] }}\n\n{}",
        notes_block(notes_preview)
    )
}
