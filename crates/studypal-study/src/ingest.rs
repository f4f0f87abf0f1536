//! File ingestion: turn uploaded `.txt` and `.pdf` files into note text.

use std::io::Write;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

use studypal_core::defaults::{EXTRACTION_CMD_TIMEOUT_SECS, PDF_PAGE_SEPARATOR};
use studypal_core::{Error, Result, TextExtractor};

const PDF_MAGIC: &[u8] = b"%PDF";

/// Reads bytes as UTF-8, replacing invalid sequences.
pub struct PlainTextExtractor;

#[async_trait]
impl TextExtractor for PlainTextExtractor {
    async fn extract(&self, data: &[u8], _filename: &str) -> Result<String> {
        Ok(String::from_utf8_lossy(data).into_owned())
    }

    fn name(&self) -> &str {
        "plain_text"
    }
}

/// Extracts the text layer of a PDF with `pdftotext` (poppler-utils).
///
/// Pages are separated by form feeds in `pdftotext` output; they are
/// re-joined with the configured page separator.
pub struct PdfTextExtractor {
    timeout_secs: u64,
}

impl Default for PdfTextExtractor {
    fn default() -> Self {
        Self {
            timeout_secs: EXTRACTION_CMD_TIMEOUT_SECS,
        }
    }
}

impl PdfTextExtractor {
    pub fn with_timeout(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    /// Whether `pdftotext` is installed.
    pub async fn available() -> bool {
        match Command::new("pdftotext").arg("-v").output().await {
            // Older poppler releases exit 99 after printing the version.
            Ok(output) => output.status.success() || output.status.code() == Some(99),
            Err(_) => false,
        }
    }
}

/// Join `pdftotext` pages (form-feed separated) with the page separator.
pub fn join_pdf_pages(raw: &str) -> String {
    let mut pages: Vec<&str> = raw.split('\u{000C}').collect();
    if pages.last().is_some_and(|p| p.trim().is_empty()) {
        pages.pop();
    }
    pages
        .iter()
        .map(|p| p.trim_end_matches('\n'))
        .collect::<Vec<_>>()
        .join(PDF_PAGE_SEPARATOR)
}

/// Run `cmd` to completion; on timeout the child is killed when its future drops.
async fn run_cmd_with_timeout(cmd: &mut Command, timeout_secs: u64) -> Result<String> {
    cmd.kill_on_drop(true);
    let output = tokio::time::timeout(Duration::from_secs(timeout_secs), cmd.output())
        .await
        .map_err(|_| Error::Internal(format!("External command timed out after {}s", timeout_secs)))?
        .map_err(|e| Error::Internal(format!("Failed to execute command: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Internal(format!(
            "Command failed (exit {}): {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, data: &[u8], filename: &str) -> Result<String> {
        if data.is_empty() {
            return Err(Error::InvalidArgument(format!("File '{}' is empty", filename)));
        }
        if !data.starts_with(PDF_MAGIC) {
            return Err(Error::InvalidArgument(format!(
                "File '{}' is not a valid PDF (missing %PDF header)",
                filename
            )));
        }

        let mut tmpfile = NamedTempFile::new()
            .map_err(|e| Error::Internal(format!("Failed to create temp file: {}", e)))?;
        tmpfile
            .write_all(data)
            .map_err(|e| Error::Internal(format!("Failed to write temp file: {}", e)))?;

        let raw = run_cmd_with_timeout(
            Command::new("pdftotext").arg(tmpfile.path()).arg("-"),
            self.timeout_secs,
        )
        .await?;
        let text = join_pdf_pages(&raw);

        if text.trim().is_empty() {
            warn!(filename, "PDF has no text layer; scanned pages are not supported");
        }
        debug!(filename, char_count = text.chars().count(), "PDF text extracted");
        Ok(text)
    }

    fn name(&self) -> &str {
        "pdf_text"
    }
}

/// Choose an extractor by extension, falling back to magic bytes.
pub fn extractor_for(filename: &str, data: &[u8]) -> Result<Box<dyn TextExtractor>> {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    match extension.as_deref() {
        Some("pdf") => Ok(Box::new(PdfTextExtractor::default())),
        _ if data.starts_with(PDF_MAGIC) => Ok(Box::new(PdfTextExtractor::default())),
        Some("txt") | Some("text") | Some("md") | None => Ok(Box::new(PlainTextExtractor)),
        Some(other) => Err(Error::InvalidArgument(format!(
            "Unsupported file type '.{}' for '{}': expected .txt or .pdf",
            other, filename
        ))),
    }
}

/// Extract in-memory file contents with the matching extractor.
pub async fn ingest_bytes(data: &[u8], filename: &str) -> Result<String> {
    let extractor = extractor_for(filename, data)?;
    let text = extractor.extract(data, filename).await?;
    info!(
        filename,
        extractor = extractor.name(),
        char_count = text.chars().count(),
        "File ingested"
    );
    Ok(text)
}

/// Read a file from disk and extract its text.
#[instrument(skip_all, fields(subsystem = "study", component = "ingest", op = "ingest_file", path = %path.as_ref().display()))]
pub async fn ingest_file(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let data = tokio::fs::read(path).await?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    ingest_bytes(&data, &filename).await
}

/// Append extracted file text to existing notes under a marker line.
pub fn append_to_notes(notes: &str, filename: &str, text: &str) -> String {
    format!("{}\n\n--- Appended from {} ---\n{}", notes, filename, text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[tokio::test]
    async fn test_timed_out_command_is_killed() {
        let dir = tempfile::TempDir::new().unwrap();
        let marker = dir.path().join("finished");
        let script = format!("sleep 2 && touch '{}'", marker.display());

        let err = run_cmd_with_timeout(Command::new("sh").arg("-c").arg(&script), 1)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Internal(ref m) if m.contains("timed out")));

        tokio::time::sleep(Duration::from_millis(2500)).await;
        assert!(!marker.exists());
    }

    #[tokio::test]
    async fn test_plain_text_is_lossy_utf8() {
        let text = PlainTextExtractor
            .extract(b"Caf\xC3\xA9 \xFF notes", "notes.txt")
            .await
            .unwrap();
        assert_eq!(text, "Café \u{FFFD} notes");
    }

    #[tokio::test]
    async fn test_pdf_rejects_missing_magic() {
        let err = PdfTextExtractor::default()
            .extract(b"not a pdf", "fake.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_pdf_rejects_empty() {
        let err = PdfTextExtractor::default()
            .extract(b"", "empty.pdf")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[test]
    fn test_join_pdf_pages() {
        assert_eq!(join_pdf_pages("Page one\n\u{000C}Page two\n\u{000C}"), "Page one\nPage two");
        assert_eq!(join_pdf_pages("Only page"), "Only page");
    }

    #[test]
    fn test_extractor_dispatch() {
        assert_eq!(extractor_for("notes.TXT", b"x").unwrap().name(), "plain_text");
        assert_eq!(extractor_for("paper.pdf", b"x").unwrap().name(), "pdf_text");
        assert_eq!(extractor_for("upload", b"%PDF-1.7").unwrap().name(), "pdf_text");
        assert_eq!(extractor_for("README", b"hello").unwrap().name(), "plain_text");
        assert!(matches!(
            extractor_for("slides.pptx", b"PK"),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_append_to_notes() {
        assert_eq!(
            append_to_notes("Existing", "ch1.txt", "New text"),
            "Existing\n\n--- Appended from ch1.txt ---\nNew text"
        );
    }
}
