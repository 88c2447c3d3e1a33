use std::fmt::Write;

use crate::model::{QuestionType, SanitizedQuestion};

/// Option letters a lettered line can carry when parsed back.
const ROUND_TRIP_LETTERS: usize = 4;

/// Whether [`to_quiz_text`] output for `q` parses back to the same option texts
/// and answer set. Only choice questions with options `A` to `D` do; a fifth
/// option would be written as `E.` and read back as text of option `D`.
pub fn round_trips(q: &SanitizedQuestion) -> bool {
    matches!(
        q.question_type,
        QuestionType::SingleChoice | QuestionType::MultipleChoice
    ) && q.options.len() <= ROUND_TRIP_LETTERS
}

/// Write questions back in the `Câu k: title` / `A. option` text form.
///
/// Correct options get a `(*)` suffix. The result re-parses losslessly only
/// for questions accepted by [`round_trips`]; other shapes are written for
/// reading.
pub fn to_quiz_text(questions: &[SanitizedQuestion]) -> String {
    let mut out = String::new();
    for (n, q) in questions.iter().enumerate() {
        if n > 0 {
            out.push('\n');
        }
        write_question(&mut out, n + 1, q);
    }
    out
}

fn write_question(out: &mut String, number: usize, q: &SanitizedQuestion) {
    let answer = q.options.first().map(|o| o.text.as_str()).unwrap_or("");
    if q.question_type == QuestionType::FillInBlank && q.title.ends_with('?') {
        let _ = writeln!(out, "Câu {number}: {} {answer}", q.title);
        return;
    }

    let _ = writeln!(out, "Câu {number}: {}", q.title);
    if let Some(content) = &q.content {
        let _ = writeln!(out, "{content}");
    }

    match q.question_type {
        QuestionType::FillInBlank => {
            let _ = writeln!(out, "Đáp án: {answer}");
        }
        QuestionType::Matching => {
            for pair in q.options.chunks(2) {
                if let [left, right] = pair {
                    let _ = writeln!(out, "{} | {}", left.text, right.text);
                }
            }
        }
        QuestionType::SingleChoice | QuestionType::MultipleChoice => {
            for (i, option) in q.options.iter().enumerate() {
                let letter = char::from(b'A' + (i % 26) as u8);
                let mark = if option.is_correct { "(*)" } else { "" };
                let _ = writeln!(out, "{letter}. {}{mark}", option.text);
            }
        }
    }
}
