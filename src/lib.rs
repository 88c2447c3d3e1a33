mod docx;
mod error;
mod model;
mod quiz;

pub use docx::media::{data_uri, sniff_mime};
pub use error::Error;
pub use model::{
    ParagraphEntry, QuestionKind, QuestionType, RawOption, RawQuestion, SanitizedOption,
    SanitizedQuestion,
};
pub use quiz::export::{round_trips, to_quiz_text};
pub use quiz::lines::{GroupState, LineContext, LineOutcome, classify_line, group_questions};
pub use quiz::marker::MarkerPolicy;
pub use quiz::text_entries;

use std::path::Path;
use std::time::Instant;

#[derive(Clone, Debug)]
pub struct ParseOptions {
    pub markers: MarkerPolicy,
    /// Also read paragraphs from `word/footnotes.xml`, after the body.
    pub include_footnotes: bool,
    pub parallel_images: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            markers: MarkerPolicy::default(),
            include_footnotes: false,
            parallel_images: true,
        }
    }
}

/// Input of one import: a `.docx` buffer, plain text, or both.
/// The text is only consulted when the buffer is absent or yields no lines.
#[derive(Clone, Debug, Default)]
pub struct ImportSource {
    pub buffer: Option<Vec<u8>>,
    pub text: Option<String>,
}

impl ImportSource {
    pub fn docx(buffer: Vec<u8>) -> Self {
        Self {
            buffer: Some(buffer),
            text: None,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self {
            buffer: None,
            text: Some(text.into()),
        }
    }
}

pub fn parse_quiz(
    source: &ImportSource,
    options: &ParseOptions,
) -> Result<Vec<SanitizedQuestion>, Error> {
    let t0 = Instant::now();

    let mut entries = match &source.buffer {
        Some(bytes) => extract_entries(bytes, options)?,
        None => Vec::new(),
    };
    if entries.is_empty()
        && let Some(text) = &source.text
    {
        log::info!("Using plain text input");
        entries = quiz::text_entries(text);
    }
    if entries.is_empty() {
        return Err(Error::NoContent);
    }
    let t_extract = t0.elapsed();

    let questions = quiz::build_questions(&entries);
    let t_total = t0.elapsed();

    log::info!(
        "Timing: extract={:.1}ms, group={:.1}ms, total={:.1}ms ({} lines, {} questions)",
        t_extract.as_secs_f64() * 1000.0,
        (t_total - t_extract).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        entries.len(),
        questions.len(),
    );

    Ok(questions)
}

pub fn parse_docx_bytes(
    input: &[u8],
    options: &ParseOptions,
) -> Result<Vec<SanitizedQuestion>, Error> {
    parse_quiz(&ImportSource::docx(input.to_vec()), options)
}

pub fn parse_docx_file(
    input: &Path,
    options: &ParseOptions,
) -> Result<Vec<SanitizedQuestion>, Error> {
    let bytes = std::fs::read(input).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, input.display())),
        ),
        _ => Error::Io(e),
    })?;
    parse_quiz(&ImportSource::docx(bytes), options)
}

pub fn parse_text(input: &str, options: &ParseOptions) -> Result<Vec<SanitizedQuestion>, Error> {
    parse_quiz(&ImportSource::text(input), options)
}

/// Paragraph entries of a `.docx` buffer, before any grouping.
pub fn extract_entries(input: &[u8], options: &ParseOptions) -> Result<Vec<ParagraphEntry>, Error> {
    docx::extract_entries(
        input,
        &options.markers,
        options.include_footnotes,
        options.parallel_images,
    )
}

/// Run grouping, classification and sanitizing over already-extracted entries.
pub fn questions_from_entries(entries: &[ParagraphEntry]) -> Vec<SanitizedQuestion> {
    quiz::build_questions(entries)
}
