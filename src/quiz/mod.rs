pub mod classify;
pub mod export;
pub mod lines;
pub mod marker;
pub mod sanitize;

use crate::model::{ParagraphEntry, SanitizedQuestion};

/// Group, classify and sanitize already-extracted lines.
pub fn build_questions(entries: &[ParagraphEntry]) -> Vec<SanitizedQuestion> {
    let mut raw = lines::group_questions(entries);
    for q in &mut raw {
        classify::classify_question(q);
    }
    let grouped = raw.len();
    let questions = sanitize::sanitize(raw);
    log::info!(
        "Built {} question(s) from {} line(s), {} dropped",
        questions.len(),
        entries.len(),
        grouped - questions.len()
    );
    questions
}

/// Entries for the plain-text fallback: one unmarked line per non-blank input line.
pub fn text_entries(text: &str) -> Vec<ParagraphEntry> {
    text.lines()
        .map(|l| l.replace('\u{a0}', " ").trim().to_string())
        .filter(|l| !l.is_empty())
        .map(ParagraphEntry::plain)
        .collect()
}
