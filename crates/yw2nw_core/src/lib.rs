//! Conversion between yWriter 7 projects and novelWriter projects.
//! This crate owns the novel model and both file formats.

pub mod config;
pub mod converter;
pub mod handles;
pub mod logging;
pub mod markup;
pub mod model;
pub mod nwd;
pub mod nwx;
pub mod xml;
pub mod yw7;

pub use config::{ConfigError, ConverterConfig, CONFIG_FILE_NAME};
pub use converter::{Conversion, ConvertError, Converter, Reporter, SilentReporter};
pub use handles::{HandleError, Handles};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::novel::{
    Chapter, ChapterLevel, ChapterType, Character, ElementId, Novel, Scene, SceneStatus,
    WorldElement,
};
pub use nwx::item::FileVersion;
pub use nwx::{NwxError, NwxProject};
pub use yw7::{read_yw7, write_yw7, Yw7Error};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
