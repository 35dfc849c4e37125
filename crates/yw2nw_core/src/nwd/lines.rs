//! Line classification for novelWriter content files.
//!
//! Every line is classified once into a `Line`; the codecs then dispatch on
//! the variant instead of probing prefixes in a fixed order.

/// One classified line of a `.nwd` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// Empty or whitespace only.
    Blank,
    /// `%%` comment, including the `%%~` file header.
    Comment,
    /// `@key: value` reference tag.
    Keyword { key: &'a str, value: &'a str },
    /// `% key: value` or `%key: value`.
    Command { key: &'a str, value: &'a str },
    /// `% text` without a key.
    Note(&'a str),
    /// `#` to `####` followed by a space, `!` or the line end; `#!` and `##!`
    /// count like `#` and `##`.
    Heading { level: usize, title: &'a str },
    Text(&'a str),
}

impl<'a> Line<'a> {
    pub fn classify(line: &'a str) -> Self {
        if line.trim().is_empty() {
            return Self::Blank;
        }
        if line.starts_with("%%") {
            return Self::Comment;
        }
        if let Some(rest) = line.strip_prefix('@') {
            let (key, value) = split_key(rest).unwrap_or((rest.trim(), ""));
            return Self::Keyword { key, value };
        }
        if let Some(rest) = line.strip_prefix('%') {
            let rest = rest.trim_start();
            return match split_key(rest) {
                Some((key, value)) => Self::Command { key, value },
                None => Self::Note(rest.trim_end()),
            };
        }
        if line.starts_with('#') {
            let level = line.chars().take_while(|c| *c == '#').count();
            let rest = &line[level..];
            if rest.is_empty() || rest.starts_with([' ', '!']) {
                let rest = rest.strip_prefix('!').unwrap_or(rest);
                return Self::Heading {
                    level,
                    title: rest.trim(),
                };
            }
        }
        Self::Text(line)
    }

    /// True for `key` compared case-insensitively.
    pub fn is_command(&self, keyword: &str) -> bool {
        matches!(self, Self::Command { key, .. } if key.eq_ignore_ascii_case(keyword))
    }
}

/// Splits `key: value` when the key is a single word.
fn split_key(text: &str) -> Option<(&str, &str)> {
    let (key, value) = text.split_once(':')?;
    let key = key.trim();
    if key.is_empty() || key.contains(char::is_whitespace) {
        return None;
    }
    Some((key, value.trim()))
}

/// Classifies every line of `text`.
pub fn tokenize(text: &str) -> impl Iterator<Item = (&str, Line<'_>)> {
    text.split('\n').map(|raw| {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);
        (raw, Line::classify(raw))
    })
}

#[cfg(test)]
mod tests {
    use super::Line;

    #[test]
    fn classifies_each_prefix_once() {
        assert_eq!(Line::classify(""), Line::Blank);
        assert_eq!(Line::classify("%%~name: x"), Line::Comment);
        assert_eq!(
            Line::classify("@pov: Jane_Doe"),
            Line::Keyword {
                key: "pov",
                value: "Jane_Doe"
            }
        );
        assert_eq!(
            Line::classify("% Synopsis: A: B"),
            Line::Command {
                key: "Synopsis",
                value: "A: B"
            }
        );
        assert_eq!(Line::classify("% just a note"), Line::Note("just a note"));
        assert_eq!(
            Line::classify("#### Later"),
            Line::Heading {
                level: 4,
                title: "Later"
            }
        );
        assert_eq!(
            Line::classify("##! Prologue"),
            Line::Heading {
                level: 2,
                title: "Prologue"
            }
        );
        assert_eq!(Line::classify("Plain text"), Line::Text("Plain text"));
    }

    #[test]
    fn hash_runs_glued_to_text_are_prose() {
        assert_eq!(Line::classify("#1 rule"), Line::Text("#1 rule"));
        assert_eq!(Line::classify("#hashtag"), Line::Text("#hashtag"));
        assert_eq!(Line::classify("####x"), Line::Text("####x"));
        assert_eq!(Line::classify("##"), Line::Heading { level: 2, title: "" });
        assert_eq!(
            Line::classify("#! Title"),
            Line::Heading {
                level: 1,
                title: "Title"
            }
        );
    }

    #[test]
    fn command_keywords_ignore_case() {
        assert!(Line::classify("%TAG: x").is_command("tag"));
        assert!(!Line::classify("%aka: x").is_command("tag"));
    }
}
