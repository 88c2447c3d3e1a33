//! Single pass over paragraph entries that groups lines into raw question blocks.

use std::sync::LazyLock;

use regex::Regex;

use super::marker::{is_marked_correct, strip_markers};
use crate::model::{ParagraphEntry, RawOption, RawQuestion};

/// Question text longer than this spills into `content`.
const TITLE_SOFT_LIMIT: usize = 200;
/// List-numbered lines become options A through J at most.
const MAX_LIST_OPTIONS: usize = 10;

static HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^câu\s+\d+\s*[:.\-]?\s*(.*)$").unwrap());

static ASTERISK_OPTION: LazyLock<[Regex; 4]> = LazyLock::new(|| {
    [
        // *A. text
        Regex::new(r"^\*\s*([A-DĐ])[.)]\s*(.+)$").unwrap(),
        // A. *text
        Regex::new(r"^([A-DĐ])[.)]\s*\*\s*(.+)$").unwrap(),
        // A. text*
        Regex::new(r"^([A-DĐ])[.)]\s*(.+?)\s*\*$").unwrap(),
        // A. te*xt, A. text(*)
        Regex::new(r"^([A-DĐ])[.)]\s*(.*\*.*)$").unwrap(),
    ]
});

// The delimiter must be followed by whitespace so "a.b" style text stays text.
static LETTERED_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-DĐ])[.)](?:\s+(.*))?$").unwrap());

static TRUE_FALSE: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)^([A-DĐ])[.)]\s*\*?\s*(đúng|sai|true|false)\b").unwrap(),
        Regex::new(r"(?i)^(?:([A-DĐ])[.)]\s*)?\*?\s*(đúng|sai|true|false)\s*\*?\s*$").unwrap(),
        Regex::new(r"(?i)^[\s*(\[]*()(đúng|sai|true|false)[\s*)\].!]*$").unwrap(),
    ]
});

const MULTI_HINT_PHRASE: &str = r"(?:chọn\s+(?:\d+|hai|ba|bốn|nhiều|các|tất\s+cả)\s+(?:đáp\s+án|phương\s+án|câu\s+trả\s+lời|ý)(?:\s+đúng)?|nhiều\s+đáp\s+án\s+đúng|(?:choose|select)\s+(?:\d+|two|three|four|all|multiple)\s+(?:correct\s+)?(?:answers?|options?))";

static MULTI_HINT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("(?i){MULTI_HINT_PHRASE}")).unwrap());

static MULTI_HINT_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)^[\s(\[]*{MULTI_HINT_PHRASE}[\s)\].:!]*$")).unwrap()
});

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupState {
    NoQuestion,
    /// A question is open but none of its text has been seen yet.
    CollectingQuestionText,
    /// Question text is known, no option yet.
    AwaitingOptions,
    HasOptions,
}

#[derive(Clone, Copy, Debug)]
pub struct LineContext {
    pub state: GroupState,
    pub option_count: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LineOutcome {
    Question { title: String, multi_hint: bool },
    Option { key: String, value: String, is_correct: bool },
    TrueFalse { key: Option<String>, value: String, is_correct: bool },
    Label,
    Fallback,
}

type Rule = fn(&ParagraphEntry, &LineContext) -> Option<LineOutcome>;

/// Evaluated in order, first match wins.
const RULES: &[Rule] = &[
    question_header,
    asterisk_option,
    lettered_option,
    true_false_line,
    list_option,
    multi_hint_label,
];

pub fn classify_line(entry: &ParagraphEntry, ctx: &LineContext) -> LineOutcome {
    RULES
        .iter()
        .find_map(|rule| rule(entry, ctx))
        .unwrap_or(LineOutcome::Fallback)
}

fn option_key(letter: &str) -> String {
    match letter.to_uppercase().as_str() {
        "Đ" => "D".to_string(),
        other => other.to_string(),
    }
}

fn positional_key(index: usize) -> String {
    char::from(b'A' + (index % 26) as u8).to_string()
}

pub fn question_header(entry: &ParagraphEntry, _: &LineContext) -> Option<LineOutcome> {
    let caps = HEADER.captures(&entry.text)?;
    Some(LineOutcome::Question {
        title: caps[1].trim().to_string(),
        multi_hint: MULTI_HINT.is_match(&entry.text),
    })
}

pub fn asterisk_option(entry: &ParagraphEntry, _: &LineContext) -> Option<LineOutcome> {
    if !entry.text.contains('*') {
        return None;
    }
    ASTERISK_OPTION.iter().find_map(|re| {
        let caps = re.captures(&entry.text)?;
        let value = strip_markers(&caps[2]);
        if value.is_empty() {
            return None;
        }
        Some(LineOutcome::Option {
            key: option_key(&caps[1]),
            value,
            is_correct: true,
        })
    })
}

pub fn lettered_option(entry: &ParagraphEntry, _: &LineContext) -> Option<LineOutcome> {
    let caps = LETTERED_OPTION.captures(&entry.text)?;
    let raw = caps.get(2).map_or("", |m| m.as_str());
    let value = strip_markers(raw);
    if value.is_empty() && entry.image_ref.is_none() {
        return None;
    }
    Some(LineOutcome::Option {
        key: option_key(&caps[1]),
        value,
        is_correct: is_marked_correct(entry, &entry.text),
    })
}

pub fn true_false_line(entry: &ParagraphEntry, ctx: &LineContext) -> Option<LineOutcome> {
    if ctx.state == GroupState::NoQuestion || ctx.option_count >= 2 {
        return None;
    }
    TRUE_FALSE.iter().find_map(|re| {
        let caps = re.captures(&entry.text)?;
        Some(LineOutcome::TrueFalse {
            key: caps
                .get(1)
                .filter(|m| !m.as_str().is_empty())
                .map(|m| option_key(m.as_str())),
            value: caps[2].to_string(),
            is_correct: is_marked_correct(entry, &entry.text),
        })
    })
}

pub fn list_option(entry: &ParagraphEntry, ctx: &LineContext) -> Option<LineOutcome> {
    if !entry.is_listed()
        || entry.text.is_empty()
        || ctx.option_count >= MAX_LIST_OPTIONS
        || ctx.state == GroupState::CollectingQuestionText
    {
        return None;
    }
    Some(LineOutcome::Option {
        key: positional_key(ctx.option_count),
        value: strip_markers(&entry.text),
        is_correct: is_marked_correct(entry, &entry.text),
    })
}

pub fn multi_hint_label(entry: &ParagraphEntry, _: &LineContext) -> Option<LineOutcome> {
    MULTI_HINT_LABEL
        .is_match(&entry.text)
        .then_some(LineOutcome::Label)
}

/// A question under construction. Converted once by [`QuestionBuilder::finalize`].
#[derive(Default)]
struct QuestionBuilder {
    question: RawQuestion,
    pending_text: Vec<String>,
}

impl QuestionBuilder {
    fn state(&self) -> GroupState {
        if !self.question.options.is_empty() {
            GroupState::HasOptions
        } else if self.question.title.is_empty() && self.pending_text.is_empty() {
            GroupState::CollectingQuestionText
        } else {
            GroupState::AwaitingOptions
        }
    }

    fn flush_text(&mut self) {
        for line in self.pending_text.drain(..) {
            let q = &mut self.question;
            if q.title.chars().count() < TITLE_SOFT_LIMIT {
                if !q.title.is_empty() {
                    q.title.push(' ');
                }
                q.title.push_str(&line);
            } else {
                if !q.content.is_empty() {
                    q.content.push('\n');
                }
                q.content.push_str(&line);
            }
        }
    }

    fn push_option(&mut self, key: String, value: String, is_correct: bool, image: Option<String>) {
        self.flush_text();
        self.question.options.push(RawOption {
            key,
            value,
            is_correct,
            image_url: image,
        });
    }

    fn absorb(&mut self, entry: &ParagraphEntry) {
        let q = &mut self.question;
        let Some(last) = q.options.last_mut() else {
            if !entry.text.is_empty() {
                self.pending_text.push(entry.text.clone());
            }
            if q.image_url.is_none() {
                q.image_url = entry.image_ref.clone();
            }
            return;
        };

        if !entry.text.is_empty() {
            let combined = format!("{} {}", last.value, entry.text);
            last.value = strip_markers(&combined);
            last.is_correct |= is_marked_correct(entry, &entry.text);
        }
        if let Some(image) = &entry.image_ref {
            if last.image_url.is_none() {
                last.image_url = Some(image.clone());
            } else if q.image_url.is_none() {
                q.image_url = Some(image.clone());
            }
        }
    }

    fn finalize(mut self) -> RawQuestion {
        self.flush_text();
        self.question
    }
}

#[derive(Default)]
struct Grouper {
    current: Option<QuestionBuilder>,
    preamble: Vec<String>,
    questions: Vec<RawQuestion>,
}

impl Grouper {
    fn context(&self) -> LineContext {
        match &self.current {
            None => LineContext {
                state: GroupState::NoQuestion,
                option_count: 0,
            },
            Some(b) => LineContext {
                state: b.state(),
                option_count: b.question.options.len(),
            },
        }
    }

    fn finish_current(&mut self) {
        if let Some(builder) = self.current.take() {
            self.questions.push(builder.finalize());
        }
    }

    /// The open question, or an implicit one titled from the preamble.
    fn open_question(&mut self) -> &mut QuestionBuilder {
        let preamble = &mut self.preamble;
        self.current.get_or_insert_with(|| {
            log::debug!("Option before any question header, opening an implicit question");
            QuestionBuilder {
                pending_text: std::mem::take(preamble),
                ..QuestionBuilder::default()
            }
        })
    }

    fn accept(&mut self, entry: &ParagraphEntry) {
        let ctx = self.context();
        let outcome = classify_line(entry, &ctx);
        log::debug!("{} <- {:?}", outcome_name(&outcome), entry.text);

        match outcome {
            LineOutcome::Question { title, multi_hint } => {
                self.finish_current();
                if !self.preamble.is_empty() {
                    log::debug!("Discarding {} preamble line(s)", self.preamble.len());
                    self.preamble.clear();
                }
                self.current = Some(QuestionBuilder {
                    question: RawQuestion {
                        title,
                        is_multi_hint: multi_hint,
                        image_url: entry.image_ref.clone(),
                        ..RawQuestion::default()
                    },
                    pending_text: Vec::new(),
                });
            }
            LineOutcome::Option {
                key,
                value,
                is_correct,
            } => {
                let image = entry.image_ref.clone();
                self.open_question().push_option(key, value, is_correct, image);
            }
            LineOutcome::TrueFalse {
                key,
                value,
                is_correct,
            } => {
                let builder = self.open_question();
                let key = key.unwrap_or_else(|| positional_key(builder.question.options.len()));
                builder.push_option(key, value, is_correct, entry.image_ref.clone());
            }
            LineOutcome::Label => {
                if let Some(builder) = self.current.as_mut() {
                    builder.question.is_multi_hint = true;
                }
            }
            LineOutcome::Fallback => match self.current.as_mut() {
                Some(builder) => builder.absorb(entry),
                None if !entry.text.is_empty() => self.preamble.push(entry.text.clone()),
                None => log::debug!("Dropping image outside of any question"),
            },
        }
    }
}

fn outcome_name(outcome: &LineOutcome) -> &'static str {
    match outcome {
        LineOutcome::Question { .. } => "question",
        LineOutcome::Option { .. } => "option",
        LineOutcome::TrueFalse { .. } => "true/false",
        LineOutcome::Label => "label",
        LineOutcome::Fallback => "fallback",
    }
}

/// Group entries into raw question blocks in document order.
pub fn group_questions(entries: &[ParagraphEntry]) -> Vec<RawQuestion> {
    let mut grouper = Grouper::default();
    for entry in entries {
        grouper.accept(entry);
    }
    grouper.finish_current();
    grouper.questions
}
