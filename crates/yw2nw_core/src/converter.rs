//! Conversion driver.
//!
//! # Responsibility
//! - Pick the direction from the source extension and derive the target path.
//! - Back up existing targets and report progress through a `Reporter`.
//!
//! # Invariants
//! - A project open in novelWriter (lock file present) is never replaced.
//! - An existing target is moved aside, never overwritten in place.
//! - A declined overwrite leaves the filesystem untouched.

use crate::config::ConverterConfig;
use crate::nwd::CONTENT_DIR;
use crate::nwx::{NwxError, NwxProject, LOCK_FILE};
use crate::yw7::{self, Yw7Error};
use log::{error, info};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension of novelWriter project folders created from a yWriter file.
pub const PROJECT_DIR_EXTENSION: &str = "nw";
/// Highest numbered backup suffix (`.bk999`).
pub const MAX_BACKUP_INDEX: u32 = 999;
const BACKUP_EXTENSION: &str = "bak";
const FALLBACK_TITLE: &str = "NewProject";

/// Receives progress messages and answers the overwrite question.
pub trait Reporter {
    /// What is being done.
    fn info_what(&mut self, message: &str);
    /// How it went.
    fn info_how(&mut self, message: &str);
    /// Whether the existing `path` may be replaced.
    fn confirm_overwrite(&mut self, path: &Path) -> bool;
}

/// Reporter that logs messages and always confirms.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn info_what(&mut self, message: &str) {
        info!("event=report module=converter status=ok kind=what message={message}");
    }

    fn info_how(&mut self, message: &str) {
        info!("event=report module=converter status=ok kind=how message={message}");
    }

    fn confirm_overwrite(&mut self, _path: &Path) -> bool {
        true
    }
}

/// Outcome of a conversion that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conversion {
    Written(PathBuf),
    Canceled,
}

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("file `{0}` not found")]
    NotFound(PathBuf),
    #[error("file type of `{0}` not supported")]
    Unsupported(PathBuf),
    #[error("project `{0}` is open in novelWriter; please exit novelWriter")]
    ProjectLocked(PathBuf),
    #[error("unable to back up `{0}`: every backup name is taken")]
    BackupExhausted(PathBuf),
    #[error("can not move or create `{path}`: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error(transparent)]
    Yw7(#[from] Yw7Error),
    #[error(transparent)]
    Nwx(#[from] NwxError),
}

impl ConvertError {
    /// Stable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "source_not_found",
            Self::Unsupported(_) => "source_unsupported",
            Self::ProjectLocked(_) => "project_locked",
            Self::BackupExhausted(_) => "backup_exhausted",
            Self::Io { .. } => "io_failed",
            Self::Yw7(err) => err.code(),
            Self::Nwx(err) => err.code(),
        }
    }
}

/// Converts in both directions with one configuration.
#[derive(Debug, Clone, Default)]
pub struct Converter {
    config: ConverterConfig,
}

impl Converter {
    pub fn new(config: ConverterConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ConverterConfig {
        &self.config
    }

    /// Converts `source` and reports the result through `reporter`.
    ///
    /// `.yw7` sources become a `<stem>.nw` project folder next to the source;
    /// `.nwx` sources become `<title>.yw7` next to the project folder.
    pub fn run(
        &self,
        source: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<Conversion, ConvertError> {
        info!("event=convert module=converter status=start source={}", source.display());
        let result = self.dispatch(source, reporter);
        match &result {
            Ok(Conversion::Written(target)) => {
                info!(
                    "event=convert module=converter status=ok target={}",
                    target.display()
                );
                reporter.info_how(&format!("File written: \"{}\".", target.display()));
            }
            Ok(Conversion::Canceled) => {
                info!("event=convert module=converter status=canceled");
                reporter.info_what("Action canceled by user.");
            }
            Err(err) => {
                error!(
                    "event=convert module=converter status=error error_code={} error={err}",
                    err.code()
                );
                reporter.info_how(&format!("Error: {err}"));
            }
        }
        result
    }

    fn dispatch(
        &self,
        source: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<Conversion, ConvertError> {
        if !source.is_file() {
            return Err(ConvertError::NotFound(source.to_path_buf()));
        }
        match source.extension().and_then(|ext| ext.to_str()) {
            Some(yw7::EXTENSION) => self.yw7_to_nw(source, reporter),
            Some("nwx") => self.nw_to_yw7(source, reporter),
            _ => Err(ConvertError::Unsupported(source.to_path_buf())),
        }
    }

    fn yw7_to_nw(
        &self,
        source: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<Conversion, ConvertError> {
        let project_dir = source.with_extension(PROJECT_DIR_EXTENSION);
        reporter.info_what(&format!(
            "Input: yWriter 7 project \"{}\"\nOutput: novelWriter project \"{}\"",
            source.display(),
            project_dir.display()
        ));
        if project_dir.join(LOCK_FILE).is_file() {
            return Err(ConvertError::ProjectLocked(project_dir));
        }

        let novel = yw7::read_yw7(source)?;
        if project_dir.exists() {
            let backup = backup_dir_path(&project_dir)?;
            rename(&project_dir, &backup)?;
            reporter.info_what(&format!("Backup folder \"{}\" saved.", backup.display()));
        }
        let content_dir = project_dir.join(CONTENT_DIR);
        std::fs::create_dir_all(&content_dir).map_err(|source| ConvertError::Io {
            path: content_dir,
            source,
        })?;

        let index = NwxProject::write(&novel, &project_dir, &self.config)?;
        Ok(Conversion::Written(index))
    }

    fn nw_to_yw7(
        &self,
        source: &Path,
        reporter: &mut dyn Reporter,
    ) -> Result<Conversion, ConvertError> {
        let title = NwxProject::read_title(source)?
            .map(|title| file_name_safe(&title))
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());
        let target = parent_of_project(source).join(format!("{title}.{}", yw7::EXTENSION));
        reporter.info_what(&format!(
            "Input: novelWriter project \"{}\"\nOutput: yWriter 7 project \"{}\"",
            source.display(),
            target.display()
        ));

        if target.exists() {
            if !reporter.confirm_overwrite(&target) {
                return Ok(Conversion::Canceled);
            }
            let backup = with_suffix(&target, BACKUP_EXTENSION);
            rename(&target, &backup)?;
            reporter.info_what(&format!("Backup file \"{}\" saved.", backup.display()));
        }

        let novel = NwxProject::read(source, &self.config)?;
        yw7::write_yw7(&novel, &target)?;
        Ok(Conversion::Written(target))
    }
}

/// Directory that contains the project folder of the index `source`.
fn parent_of_project(source: &Path) -> PathBuf {
    match source.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => match dir.parent() {
            Some(up) if !up.as_os_str().is_empty() && dir.file_name().is_some() => {
                up.to_path_buf()
            }
            _ => dir.join(".."),
        },
        _ => PathBuf::from(".."),
    }
}

/// `path` with `.suffix` appended to the full file name.
fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// First free backup name: `.bak`, then `.bk000` to `.bk999`.
pub fn backup_dir_path(dir: &Path) -> Result<PathBuf, ConvertError> {
    std::iter::once(BACKUP_EXTENSION.to_string())
        .chain((0..=MAX_BACKUP_INDEX).map(|index| format!("bk{index:03}")))
        .map(|suffix| with_suffix(dir, &suffix))
        .find(|candidate| !candidate.exists())
        .ok_or_else(|| ConvertError::BackupExhausted(dir.to_path_buf()))
}

fn rename(from: &Path, to: &Path) -> Result<(), ConvertError> {
    std::fs::rename(from, to).map_err(|source| ConvertError::Io {
        path: from.to_path_buf(),
        source,
    })
}

/// Replaces path separators so a project title can name a file.
fn file_name_safe(title: &str) -> String {
    title
        .trim()
        .chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{backup_dir_path, file_name_safe, with_suffix};
    use std::path::Path;

    #[test]
    fn suffix_is_appended_to_the_full_name() {
        assert_eq!(
            with_suffix(Path::new("/tmp/My Novel.nw"), "bak"),
            Path::new("/tmp/My Novel.nw.bak")
        );
    }

    #[test]
    fn backup_names_skip_taken_slots() {
        let dir = tempfile::tempdir().unwrap();
        let project = dir.path().join("novel.nw");
        assert_eq!(backup_dir_path(&project).unwrap(), dir.path().join("novel.nw.bak"));

        std::fs::create_dir(dir.path().join("novel.nw.bak")).unwrap();
        std::fs::create_dir(dir.path().join("novel.nw.bk000")).unwrap();
        assert_eq!(
            backup_dir_path(&project).unwrap(),
            dir.path().join("novel.nw.bk001")
        );
    }

    #[test]
    fn separators_are_removed_from_titles() {
        assert_eq!(file_name_safe(" A/B\\C "), "A_B_C");
    }
}
