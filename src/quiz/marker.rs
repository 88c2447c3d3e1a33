//! Answer-key markers: run colors and literal asterisks.

use crate::model::ParagraphEntry;

/// Reds that Word's palette and common templates use for answer keys.
const DEFAULT_RED_COLORS: &[&str] = &[
    "ff0000", "fe0000", "ee0000", "e00000", "c00000", "cc0000", "d00000", "b00000", "a00000",
    "990000", "8b0000", "c0504d", "e74c3c", "c0392b", "dc143c", "b22222", "ea4335", "ff3333",
];

/// Decides which run colors count as "red" and therefore as an answer mark.
#[derive(Clone, Debug)]
pub struct MarkerPolicy {
    red_colors: Vec<String>,
    /// Treat any 6-digit hex starting with `ff` as red. This also accepts
    /// orange (`ffa500`) and yellow (`ffff00`).
    pub ff_prefix_heuristic: bool,
}

impl Default for MarkerPolicy {
    fn default() -> Self {
        Self {
            red_colors: DEFAULT_RED_COLORS.iter().map(|c| c.to_string()).collect(),
            ff_prefix_heuristic: true,
        }
    }
}

impl MarkerPolicy {
    /// Only the allowlist, without the `ff` prefix heuristic.
    pub fn strict() -> Self {
        Self {
            ff_prefix_heuristic: false,
            ..Self::default()
        }
    }

    /// Add a color to the allowlist. Accepts `#RRGGBB` or `RRGGBB`, any case.
    pub fn with_red_color(mut self, hex: &str) -> Self {
        let c = normalize_hex(hex);
        if !c.is_empty() && !self.red_colors.contains(&c) {
            self.red_colors.push(c);
        }
        self
    }

    pub fn red_colors(&self) -> &[String] {
        &self.red_colors
    }

    pub fn is_red(&self, color: &str) -> bool {
        let c = normalize_hex(color);
        if self.red_colors.iter().any(|r| *r == c) {
            return true;
        }
        self.ff_prefix_heuristic
            && c.len() == 6
            && c.starts_with("ff")
            && c.chars().all(|ch| ch.is_ascii_hexdigit())
    }
}

fn normalize_hex(val: &str) -> String {
    val.trim().trim_start_matches('#').to_ascii_lowercase()
}

/// A run color that differs from the default text color.
pub fn is_marking_color(val: &str) -> bool {
    let c = normalize_hex(val);
    !c.is_empty() && c != "auto" && c != "000000"
}

/// An answer is correct when its line is colored or carries a literal `*`.
pub fn is_marked_correct(entry: &ParagraphEntry, raw_text: &str) -> bool {
    entry.is_red || entry.is_marked || raw_text.contains('*')
}

/// Remove `(*)` and `*` markers and collapse the whitespace they leave behind.
pub fn strip_markers(text: &str) -> String {
    let cleaned = text.replace("(*)", " ").replace('*', " ");
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}
