//! Second pass over each raw question: detect matching, true/false and
//! fill-in-blank shapes and re-derive title, content and options.

use std::sync::LazyLock;

use regex::Regex;

use super::marker::strip_markers;
use crate::model::{QuestionKind, QuestionType, RawOption, RawQuestion};

pub const BLANK: &str = "_______";
const ANSWER_KEY: &str = "ANSWER";
const MAX_TRAILING_ANSWER_CHARS: usize = 60;
const MIN_SENTENCE_CHARS: usize = 10;

static HIDDEN_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)câu\s+\d+.*?(\p{S})").unwrap());

static TRAILING_ANSWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^(.+\?)\s*([^?]+)$").unwrap());

static ARROW: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"→|->|=>|⇒|⟶|➔|➜").unwrap());

static PIPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\|").unwrap());

static NUMBERED_FAMILIES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?:^|\s)\d+\)\s*").unwrap(),
        Regex::new(r"(?:^|\s)\d+\.\s+").unwrap(),
        Regex::new(r"(?:^|\s)\d+\s*-\s+").unwrap(),
    ]
});

const TRUE_TOKENS: &[&str] = &[
    "đúng", "true", "t", "đ", "yes", "y", "có", "phải", "right", "correct",
];
const FALSE_TOKENS: &[&str] = &[
    "sai", "false", "f", "s", "no", "n", "không", "không đúng", "wrong", "incorrect",
];

type TypeRule = fn(&mut RawQuestion) -> bool;

/// Evaluated in order, the first rule that reshapes the question wins.
const TYPE_RULES: &[TypeRule] = &[
    hidden_token_blank,
    pipe_matching,
    arrow_matching,
    true_false,
    trailing_answer_blank,
    numbered_content,
];

/// Reclassify a grouped question in place.
pub fn classify_question(q: &mut RawQuestion) {
    if !TYPE_RULES.iter().any(|rule| rule(q)) {
        log::debug!("No type rule matched {:?}", q.title);
    }
    finalize_correctness(q);
}

pub fn question_type(q: &RawQuestion) -> QuestionType {
    match q.kind {
        QuestionKind::Matching => QuestionType::Matching,
        QuestionKind::FillInBlank => QuestionType::FillInBlank,
        _ if q.is_multi_hint || q.correct_indexes.len() > 1 => QuestionType::MultipleChoice,
        _ => QuestionType::SingleChoice,
    }
}

fn finalize_correctness(q: &mut RawQuestion) {
    q.correct_indexes = q
        .options
        .iter()
        .enumerate()
        .filter(|(_, o)| o.is_correct)
        .map(|(i, _)| i)
        .collect();
    if q.correct_indexes.len() > 1 && q.kind != QuestionKind::Matching {
        q.is_multi_hint = true;
    }
}

fn set_fill_in_blank(q: &mut RawQuestion, title: String, answer: String) {
    q.title = title;
    q.options = vec![RawOption::new(ANSWER_KEY, answer, true)];
    q.kind = QuestionKind::FillInBlank;
}

fn hidden_token_blank(q: &mut RawQuestion) -> bool {
    if !q.options.is_empty() {
        return false;
    }
    let Some(token) = HIDDEN_TOKEN.captures(&q.title).and_then(|c| c.get(1)) else {
        return false;
    };
    let answer = token.as_str().to_string();
    let mut title = q.title.clone();
    title.replace_range(token.range(), BLANK);
    set_fill_in_blank(q, title, answer);
    true
}

fn trailing_answer_blank(q: &mut RawQuestion) -> bool {
    if !q.options.is_empty() {
        return false;
    }
    let Some(caps) = TRAILING_ANSWER.captures(&q.title) else {
        return false;
    };
    let answer = strip_markers(&caps[2]);
    if answer.is_empty() || answer.chars().count() > MAX_TRAILING_ANSWER_CHARS {
        return false;
    }
    let prompt = caps[1].trim().to_string();
    set_fill_in_blank(q, prompt, answer);
    true
}

fn question_text(q: &RawQuestion) -> String {
    if q.content.is_empty() {
        q.title.clone()
    } else {
        format!("{}\n{}", q.title, q.content)
    }
}

fn pipe_matching(q: &mut RawQuestion) -> bool {
    apply_matching(q, &PIPE)
}

fn arrow_matching(q: &mut RawQuestion) -> bool {
    apply_matching(q, &ARROW)
}

fn apply_matching(q: &mut RawQuestion, delimiter: &Regex) -> bool {
    let text = question_text(q);
    let Some((prefix_end, pairs)) = split_pairs(&text, delimiter) else {
        return false;
    };
    q.title = text[..prefix_end]
        .trim_end_matches(|c: char| {
            c.is_whitespace() || BULLETS.contains(&c) || LINE_BREAKS.contains(&c)
        })
        .trim()
        .to_string();
    q.content.clear();
    q.options = pair_options(pairs);
    q.kind = QuestionKind::Matching;
    true
}

fn pair_options(pairs: Vec<(String, String)>) -> Vec<RawOption> {
    pairs
        .into_iter()
        .enumerate()
        .flat_map(|(i, (left, right))| {
            [
                RawOption::new(format!("L{}", i + 1), left, true),
                RawOption::new(format!("R{}", i + 1), right, true),
            ]
        })
        .collect()
}

const BULLETS: &[char] = &[
    '•', '·', '‣', '◦', '▪', '▫', '■', '□', '●', '○', '◆', '◇', '-', '–', '—', '*', '+',
];

fn clean_side(s: &str) -> String {
    s.trim_matches(|c: char| c.is_whitespace() || BULLETS.contains(&c))
        .trim_end_matches([',', ';'])
        .trim()
        .to_string()
}

/// Characters that always end the previous pair.
const LINE_BREAKS: &[char] = &['\n', ';', '•', '●', '○', '▪', '■', '◦', '·', '‣'];

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+").unwrap());

/// Byte offset inside `seg` where the left side of the next pair starts.
///
/// A line break or bullet wins. Otherwise the trailing run of capitalized words is taken,
/// unless it covers the whole segment, in which case only the last word is.
fn left_side_start(seg: &str, split_at_colon: bool) -> usize {
    let hard_break = seg
        .char_indices()
        .filter(|&(_, c)| LINE_BREAKS.contains(&c) || (split_at_colon && c == ':'))
        .last();
    if let Some((i, c)) = hard_break {
        return i + c.len_utf8();
    }

    let words: Vec<(usize, &str)> = WORD.find_iter(seg).map(|m| (m.start(), m.as_str())).collect();
    let Some(&(last_start, _)) = words.last() else {
        return seg.len();
    };
    let capitalized = |w: &str| w.chars().next().is_some_and(char::is_uppercase);
    let run_start = words
        .iter()
        .rposition(|(_, w)| !capitalized(*w))
        .map_or(0, |i| i + 1);
    if run_start == 0 || run_start == words.len() {
        // split_at_colon marks the title prefix: there everything may be the left side
        if split_at_colon && run_start == 0 {
            return 0;
        }
        return last_start;
    }
    words[run_start].0
}

/// Split `text` around every delimiter into `(left, right)` pairs.
/// Returns the end of the leading prefix and the pairs when at least two are found.
fn split_pairs(text: &str, delimiter: &Regex) -> Option<(usize, Vec<(String, String)>)> {
    let delims: Vec<(usize, usize)> = delimiter.find_iter(text).map(|m| (m.start(), m.end())).collect();
    if delims.len() < 2 {
        return None;
    }

    let head = &text[..delims[0].0];
    let prefix_end = left_side_start(head, true);
    let mut lefts = vec![prefix_end];
    let mut rights = Vec::with_capacity(delims.len());

    for pair in delims.windows(2) {
        let (seg_start, seg_end) = (pair[0].1, pair[1].0);
        let split = seg_start + left_side_start(&text[seg_start..seg_end], false);
        rights.push((seg_start, split));
        lefts.push(split);
    }
    rights.push((delims[delims.len() - 1].1, text.len()));

    let mut pairs = Vec::with_capacity(delims.len());
    for (i, &(d_start, _)) in delims.iter().enumerate() {
        let left = clean_side(&text[lefts[i]..d_start]);
        let right = clean_side(&text[rights[i].0..rights[i].1]);
        if left.is_empty() || right.is_empty() {
            return None;
        }
        pairs.push((left, right));
    }
    Some((prefix_end, pairs))
}

fn normalize_tf(value: &str) -> String {
    value
        .trim_end_matches(|c: char| c.is_whitespace() || ".,;:!?".contains(c))
        .trim()
        .to_lowercase()
}

fn has_word_at(value: &str, token: &str, at: usize) -> bool {
    let before_ok = value[..at].chars().next_back().is_none_or(|c| !c.is_alphanumeric());
    let after_ok = value[at + token.len()..]
        .chars()
        .next()
        .is_none_or(|c| !c.is_alphanumeric());
    before_ok && after_ok
}

fn contains_word(value: &str, token: &str) -> bool {
    value.match_indices(token).any(|(i, _)| has_word_at(value, token, i))
}

/// `Some(true)` for a true-like answer, `Some(false)` for a false-like one.
fn truth_value(raw: &str) -> Option<bool> {
    let value = normalize_tf(raw);
    if FALSE_TOKENS.contains(&value.as_str()) {
        return Some(false);
    }
    if TRUE_TOKENS.contains(&value.as_str()) {
        return Some(true);
    }
    // negations contain the positive word, so false-like tokens are tried first
    let multi_char = |t: &&&str| t.chars().count() > 1;
    for (tokens, truth) in [(FALSE_TOKENS, false), (TRUE_TOKENS, true)] {
        if tokens
            .iter()
            .filter(multi_char)
            .any(|t| value.starts_with(*t) && has_word_at(&value, t, 0))
        {
            return Some(truth);
        }
    }
    for (tokens, truth) in [(FALSE_TOKENS, false), (TRUE_TOKENS, true)] {
        if tokens.iter().filter(multi_char).any(|t| contains_word(&value, t)) {
            return Some(truth);
        }
    }
    None
}

fn true_false(q: &mut RawQuestion) -> bool {
    if q.options.len() != 2 {
        return false;
    }
    match (truth_value(&q.options[0].value), truth_value(&q.options[1].value)) {
        (Some(true), Some(false)) => {}
        (Some(false), Some(true)) => q.options.swap(0, 1),
        _ => return false,
    }
    q.kind = QuestionKind::TrueFalse;
    true
}

fn segment_correct(segment: &str) -> bool {
    let lower = segment.to_lowercase();
    segment.contains('*') || ["đúng", "true", "correct"].iter().any(|w| lower.contains(w))
}

fn segment_options(segments: &[&str]) -> Vec<RawOption> {
    segments
        .iter()
        .enumerate()
        .map(|(i, seg)| {
            let key = char::from(b'A' + (i % 26) as u8).to_string();
            RawOption::new(key, strip_markers(seg), segment_correct(seg))
        })
        .collect()
}

/// Segments following each numbering marker, and the text before the first one.
fn numbered_segments<'t>(content: &'t str, marker: &Regex) -> (&'t str, Vec<&'t str>) {
    let marks: Vec<(usize, usize)> = marker.find_iter(content).map(|m| (m.start(), m.end())).collect();
    let Some(&(first, _)) = marks.first() else {
        return (content, Vec::new());
    };
    let segments = marks
        .iter()
        .enumerate()
        .map(|(i, &(_, end))| {
            let stop = marks.get(i + 1).map_or(content.len(), |m| m.0);
            content[end..stop].trim()
        })
        .filter(|s| !s.is_empty())
        .collect();
    (&content[..first], segments)
}

fn sentence_segments(content: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut start = 0;
    let mut chars = content.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') && chars.peek().is_some_and(|(_, n)| n.is_whitespace()) {
            segments.push(content[start..i + c.len_utf8()].trim());
            start = i + c.len_utf8();
        }
    }
    segments.push(content[start..].trim());
    segments
        .into_iter()
        .filter(|s| s.chars().count() > MIN_SENTENCE_CHARS)
        .collect()
}

/// Best-effort: turn numbered or sentence-shaped content into options.
/// Ordinary prose with 2 to 6 long sentences is misread as options.
fn numbered_content(q: &mut RawQuestion) -> bool {
    if q.content.is_empty() || !q.options.is_empty() {
        return false;
    }
    for marker in NUMBERED_FAMILIES.iter() {
        let (lead, segments) = numbered_segments(&q.content, marker);
        if segments.len() >= 2 {
            q.options = segment_options(&segments);
            q.content = lead.trim().to_string();
            return true;
        }
    }

    let sentences = sentence_segments(&q.content);
    if (2..=6).contains(&sentences.len()) {
        q.options = segment_options(&sentences);
        q.content.clear();
        return true;
    }
    q.options.clear();
    false
}
