//! novelWriter content files (`content/<handle>.nwd`).
//!
//! # Responsibility
//! - Read and write one text file per FILE item, with the `%%~` header.
//! - Hold the per-read session state shared by the codecs.
//!
//! # Invariants
//! - Codecs never touch the filesystem; they turn one text into model
//!   entities and back.
//! - Ids minted during a read come from the session counters only.

use crate::model::novel::{ElementId, Novel};
use crate::nwx::item::NwItem;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod character;
pub mod lines;
pub mod novel;
pub mod world;

/// Content directory below the project folder.
pub const CONTENT_DIR: &str = "content";
/// Content file extension.
pub const EXTENSION: &str = "nwd";

#[derive(Debug, Error)]
pub enum NwdError {
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
    /// A scene refers to an entity id that is not in the novel.
    #[error("scene `{scene}` refers to unknown {kind} `{id}`")]
    UnknownReference {
        scene: String,
        kind: &'static str,
        id: String,
    },
}

impl NwdError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "nwd_read_failed",
            Self::Write { .. } => "nwd_write_failed",
            Self::UnknownReference { .. } => "nwd_unknown_reference",
        }
    }
}

/// Mutable state of one project read.
///
/// Counters mint the ids of new entities. `current_chapter` carries over
/// between files, because scene files follow their chapter heading file.
#[derive(Debug, Default)]
pub struct ReadSession {
    pub novel: Novel,
    pub current_chapter: Option<ElementId>,
    chapter_count: u32,
    scene_count: u32,
    character_count: u32,
    location_count: u32,
    item_count: u32,
}

impl ReadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_chapter_id(&mut self) -> ElementId {
        self.chapter_count += 1;
        self.chapter_count.to_string()
    }

    pub fn next_scene_id(&mut self) -> ElementId {
        self.scene_count += 1;
        self.scene_count.to_string()
    }

    pub fn next_character_id(&mut self) -> ElementId {
        self.character_count += 1;
        self.character_count.to_string()
    }

    pub fn next_location_id(&mut self) -> ElementId {
        self.location_count += 1;
        self.location_count.to_string()
    }

    pub fn next_item_id(&mut self) -> ElementId {
        self.item_count += 1;
        self.item_count.to_string()
    }

    /// Number of scenes minted so far.
    pub fn scene_count(&self) -> u32 {
        self.scene_count
    }

    pub fn into_novel(self) -> Novel {
        self.novel
    }
}

/// Path of the content file for `handle`.
pub fn content_path(project_dir: &Path, handle: &str) -> PathBuf {
    project_dir
        .join(CONTENT_DIR)
        .join(format!("{handle}.{EXTENSION}"))
}

/// Reads the content file of `item`.
pub fn read_content(project_dir: &Path, item: &NwItem) -> Result<String, NwdError> {
    let path = content_path(project_dir, &item.handle);
    std::fs::read_to_string(&path).map_err(|source| NwdError::Read { path, source })
}

/// The three synthetic header lines of a content file.
pub fn header(item: &NwItem) -> String {
    let class = item.class.as_ref().map(|c| c.as_str()).unwrap_or("NONE");
    let layout = item.layout.as_ref().map(|l| l.as_str()).unwrap_or("NONE");
    format!(
        "%%~name: {}\n%%~path: {}/{}\n%%~kind: {class}/{layout}",
        item.name, item.parent, item.handle
    )
}

/// Writes `body` below the header into the content file of `item`.
pub fn write_content(project_dir: &Path, item: &NwItem, body: &str) -> Result<(), NwdError> {
    let path = content_path(project_dir, &item.handle);
    let mut text = header(item);
    if !body.is_empty() {
        text.push('\n');
        text.push_str(body);
    }
    std::fs::write(&path, text).map_err(|source| NwdError::Write { path, source })
}

/// Joins non-empty `lines` with newlines, dropping trailing blank lines.
pub(crate) fn join_trimmed(lines: &[&str]) -> String {
    let end = lines
        .iter()
        .rposition(|line| !line.trim().is_empty())
        .map_or(0, |index| index + 1);
    lines[..end].join("\n")
}

/// Joins `lines` with newlines, dropping leading and trailing blank lines.
pub(crate) fn join_paragraphs(lines: &[&str]) -> String {
    let start = lines
        .iter()
        .position(|line| !line.trim().is_empty())
        .unwrap_or(lines.len());
    join_trimmed(&lines[start..])
}

/// Restores spaces in a title written as a reference tag value.
pub(crate) fn untag(value: &str) -> String {
    value.trim().replace('_', " ")
}

/// Encodes a title for use as a reference tag value.
pub(crate) fn tag(title: &str) -> String {
    title.replace(' ', "_")
}
