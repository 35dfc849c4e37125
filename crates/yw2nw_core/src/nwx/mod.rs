//! novelWriter project index (`nwProject.nwx`).
//!
//! # Responsibility
//! - Read an index plus its content files into a `Novel`.
//! - Write a `Novel` as a fresh index with one content file per element.
//!
//! # Invariants
//! - Only the file format versions named by `FileVersion` are accepted.
//! - Every handle in a read index is valid and unique; every parent exists.

use crate::handles::HandleError;
use crate::nwd::NwdError;
use item::ItemError;
use std::path::PathBuf;
use thiserror::Error;

pub mod item;
mod outline;
pub mod project;

pub use project::NwxProject;

/// Index file name inside a project folder.
pub const PROJECT_FILE: &str = "nwProject.nwx";
/// Present while novelWriter has the project open.
pub const LOCK_FILE: &str = "nwProject.lock";
/// Root element of the index.
pub const NWX_TAG: &str = "novelWriterXML";

#[derive(Debug, Error)]
pub enum NwxError {
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
    #[error("can not process `{path}`: {source}")]
    Xml {
        path: PathBuf,
        source: roxmltree::Error,
    },
    #[error("`{path}` is not a novelWriter project file")]
    NotNovelWriter { path: PathBuf },
    #[error("unsupported file version `{version}` (must be 1.3, 1.4 or 1.5)")]
    UnsupportedVersion { version: String },
    #[error("invalid handle: {handle}")]
    InvalidHandle { handle: String },
    #[error("item `{handle}` has unknown parent `{parent}`")]
    UnknownParent { handle: String, parent: String },
    /// A scene refers to a title that no roster entry carries.
    #[error("scene `{scene}` refers to unknown {kind} `{title}`")]
    UnresolvedReference {
        scene: String,
        kind: &'static str,
        title: String,
    },
    /// A scene refers to a title that several roster entries carry.
    #[error("scene `{scene}` refers to {kind} `{title}`, which is not unique")]
    AmbiguousReference {
        scene: String,
        kind: &'static str,
        title: String,
    },
    #[error(transparent)]
    Item(#[from] ItemError),
    #[error(transparent)]
    Nwd(#[from] NwdError),
    #[error(transparent)]
    Handle(#[from] HandleError),
}

impl NwxError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Read { .. } => "nwx_read_failed",
            Self::Write { .. } => "nwx_write_failed",
            Self::Xml { .. } => "nwx_malformed",
            Self::NotNovelWriter { .. } => "nwx_wrong_root",
            Self::UnsupportedVersion { .. } => "nwx_unsupported_version",
            Self::InvalidHandle { .. } => "nwx_invalid_handle",
            Self::UnknownParent { .. } => "nwx_unknown_parent",
            Self::UnresolvedReference { .. } => "nwx_unresolved_reference",
            Self::AmbiguousReference { .. } => "nwx_ambiguous_reference",
            Self::Item(_) => "nwx_invalid_item",
            Self::Nwd(err) => err.code(),
            Self::Handle(_) => "handle_exhausted",
        }
    }
}
