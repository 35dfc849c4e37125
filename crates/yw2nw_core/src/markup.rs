//! Inline markup conversion between yWriter and novelWriter text.
//!
//! # Responsibility
//! - Map yWriter run tags (`[i]`, `[b]`, `[s]`) to novelWriter emphasis
//!   (`_`, `**`, `~~`) and back.
//! - Switch between single and doubled paragraph breaks.
//!
//! # Invariants
//! - `to_yw(to_markdown(text)) == text` for text made only of balanced
//!   emphasis runs without leading/trailing spaces inside. Runs may span line
//!   breaks and may nest when their kinds differ.
//! - Alignment, highlight and underline tags have no novelWriter form and are
//!   dropped.

use once_cell::sync::Lazy;
use regex::Regex;

static UNSUPPORTED_TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[/?[hcru]\d*\]").expect("valid unsupported tag regex"));
static BOLD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)\*\*(.+?)\*\*").expect("valid bold regex"));
static ITALIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_([^ _](?:[^_]*?[^ _])?)_").expect("valid italic regex"));
static STRIKE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)~~(.+?)~~").expect("valid strikethrough regex"));

/// Tag pairs moved so that spaces stay outside the emphasis, then replaced.
const YW_TO_MD: &[(&str, &str)] = &[
    ("[i] ", " [i]"),
    ("[b] ", " [b]"),
    ("[s] ", " [s]"),
    (" [/i]", "[/i] "),
    (" [/b]", "[/b] "),
    (" [/s]", "[/s] "),
    ("[i]", "_"),
    ("[/i]", "_"),
    ("[b]", "**"),
    ("[/b]", "**"),
    ("[s]", "~~"),
    ("[/s]", "~~"),
    ("  ", " "),
];

/// Converts yWriter body text to novelWriter text.
pub fn to_markdown(text: &str, double_linebreaks: bool) -> String {
    let mut text = if double_linebreaks {
        text.replace('\n', "\n\n")
    } else {
        text.to_string()
    };
    for (yw, md) in YW_TO_MD {
        text = text.replace(yw, md);
    }
    UNSUPPORTED_TAG_RE.replace_all(&text, "").into_owned()
}

/// Converts novelWriter text to yWriter body text.
pub fn to_yw(text: &str, double_linebreaks: bool) -> String {
    let text = BOLD_RE.replace_all(text, "[b]${1}[/b]");
    let text = ITALIC_RE.replace_all(&text, "[i]${1}[/i]");
    let text = STRIKE_RE.replace_all(&text, "[s]${1}[/s]");
    if double_linebreaks {
        text.replace("\n\n", "\n")
    } else {
        text.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::{to_markdown, to_yw};

    #[test]
    fn spaces_move_outside_emphasis() {
        assert_eq!(to_markdown("a[i] b [/i]c", false), "a _b_ c");
    }

    #[test]
    fn single_character_italics_convert_back() {
        assert_eq!(to_yw("_x_ and _yz_", false), "[i]x[/i] and [i]yz[/i]");
    }
}
