//! yWriter 7 project files (`.yw7`).
//!
//! # Responsibility
//! - Read a `.yw7` file into a `Novel` and write a `Novel` back.
//!
//! # Invariants
//! - Ids are taken over verbatim; sort orders follow document order.
//! - Boolean flags are set when their element is present with a value other
//!   than `0`; they are written as `-1`.
//! - Writes never leave a partial file behind at the target path.

use std::path::PathBuf;
use thiserror::Error;

mod reader;
mod writer;

pub use reader::read_yw7;
pub use writer::write_yw7;

/// File extension of yWriter 7 projects.
pub const EXTENSION: &str = "yw7";
/// Root element.
pub const YW7_TAG: &str = "YWRITER7";
/// Separator of the `Tags` element.
pub const TAG_SEPARATOR: &str = ";";

/// `Fields/Field_SceneType` value of notes scenes.
pub(crate) const SCENE_TYPE_NOTES: &str = "1";
/// `Fields/Field_SceneType` value of to-do scenes.
pub(crate) const SCENE_TYPE_TODO: &str = "2";

#[derive(Debug, Error)]
pub enum Yw7Error {
    #[error("can not read `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("can not write `{path}`: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("`{path}` is not a yWriter 7 project: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

impl Yw7Error {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "yw7_read_failed",
            Self::Write { .. } => "yw7_write_failed",
            Self::Malformed { .. } => "yw7_malformed",
        }
    }
}

/// Splits a `Tags` value, dropping empty entries.
pub(crate) fn split_tags(value: &str) -> Vec<String> {
    value
        .split(TAG_SEPARATOR)
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::split_tags;

    #[test]
    fn tags_split_on_semicolons() {
        assert_eq!(split_tags("a; b;;c "), vec!["a", "b", "c"]);
        assert!(split_tags("").is_empty());
    }
}
