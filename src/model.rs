use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One logical line of source text, after run/break flattening.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphEntry {
    pub text: String,
    pub is_marked: bool, // any run with a non-black, non-auto color
    pub is_red: bool,    // a run color accepted by the red predicate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_level: Option<String>,
    /// A resolved `data:` URI, or the bare relationship id when the media
    /// part could not be materialized.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}

impl ParagraphEntry {
    /// An unmarked, imageless, non-listed line, as produced by the text fallback.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn is_listed(&self) -> bool {
        self.list_id.is_some()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum QuestionKind {
    #[default]
    Regular,
    TrueFalse,
    Matching,
    FillInBlank,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawOption {
    pub key: String, // "A", "L1", "R1", "ANSWER"
    pub value: String,
    pub is_correct: bool,
    pub image_url: Option<String>,
}

impl RawOption {
    pub fn new(key: impl Into<String>, value: impl Into<String>, is_correct: bool) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            is_correct,
            image_url: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawQuestion {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub options: Vec<RawOption>,
    pub correct_indexes: BTreeSet<usize>,
    pub is_multi_hint: bool,
    pub kind: QuestionKind,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    Matching,
    FillInBlank,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
    pub order: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SanitizedQuestion {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "type")]
    pub question_type: QuestionType,
    pub options: Vec<SanitizedOption>,
    pub multi: bool,
}
