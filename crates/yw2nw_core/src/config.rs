//! Converter settings.
//!
//! # Responsibility
//! - Provide the tunable label sets and keywords used by the content codecs.
//! - Load overrides from a TOML file; unset keys keep their defaults.
//!
//! # Invariants
//! - A missing configuration file is not an error.
//! - `scene_status` is indexed by scene status ordinal, `0` meaning "none".

use crate::nwx::item::FileVersion;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "yw2nw.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("can not read configuration `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid configuration `{path}`: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Fully resolved converter settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    /// novelWriter status labels read as yWriter "Outline".
    pub outline_status: Vec<String>,
    pub draft_status: Vec<String>,
    pub first_edit_status: Vec<String>,
    pub second_edit_status: Vec<String>,
    pub done_status: Vec<String>,
    /// Labels written for scene statuses `0..=5`.
    pub scene_status: Vec<String>,
    /// Importance (or, before format 1.5, status) labels of major characters.
    pub major_character_status: Vec<String>,
    pub character_notes_heading: String,
    pub character_goals_heading: String,
    pub character_bio_heading: String,
    pub ywriter_aka_keyword: String,
    pub ywriter_tag_keyword: String,
    /// Paragraphs are separated by an empty line in novelWriter.
    pub double_linebreaks: bool,
    /// Index format version written for new projects.
    pub file_version: FileVersion,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            outline_status: labels(&["Outline", "New", "Notes"]),
            draft_status: labels(&["Draft", "Started", "1st Draft"]),
            first_edit_status: labels(&["1st Edit", "2nd Draft"]),
            second_edit_status: labels(&["2nd Edit", "3rd Draft"]),
            done_status: labels(&["Done", "Finished"]),
            scene_status: labels(&["None", "Outline", "Draft", "1st Edit", "2nd Edit", "Done"]),
            major_character_status: labels(&["Major", "Main"]),
            character_notes_heading: "## Notes".to_string(),
            character_goals_heading: "## Goals".to_string(),
            character_bio_heading: "## Bio".to_string(),
            ywriter_aka_keyword: "aka".to_string(),
            ywriter_tag_keyword: "tag".to_string(),
            double_linebreaks: true,
            file_version: FileVersion::V1_5,
        }
    }
}

impl ConverterConfig {
    /// Loads settings from `path`, falling back to defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.is_file() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Label written for a scene status ordinal; out-of-range ordinals use the
    /// last configured label.
    pub fn scene_status_label(&self, ordinal: u8) -> Option<&str> {
        self.scene_status
            .get(usize::from(ordinal))
            .or_else(|| self.scene_status.last())
            .map(String::as_str)
    }
}

fn labels(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| (*value).to_string()).collect()
}
