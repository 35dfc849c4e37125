//! `yw2nw` command line entry point.
//!
//! # Responsibility
//! - Parse arguments, load the configuration and start file logging.
//! - Run one conversion with a terminal reporter.

use clap::Parser;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use yw2nw_core::{
    default_log_level, init_logging, Conversion, Converter, ConverterConfig, Reporter,
    CONFIG_FILE_NAME,
};

const APP_NAME: &str = "yw2nw";

#[derive(Parser, Debug)]
#[command(
    name = "yw2nw",
    version,
    about = "Converter between yWriter and novelWriter"
)]
struct Args {
    /// The path of the .nwx or .yw7 file.
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Paragraph breaks are represented by double line breaks in novelWriter.
    #[arg(short = 'd', long = "double-linebreaks")]
    double_linebreaks: bool,

    /// Suppress messages and the request to confirm overwriting.
    #[arg(long)]
    silent: bool,

    /// Configuration file; defaults to the platform config directory.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// trace, debug, info, warn or error.
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<String>,

    /// Absolute directory for log files.
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,
}

/// Prints progress to the terminal and asks before overwriting.
struct TerminalReporter {
    silent: bool,
}

impl Reporter for TerminalReporter {
    fn info_what(&mut self, message: &str) {
        if !self.silent {
            println!("{message}");
        }
    }

    fn info_how(&mut self, message: &str) {
        if !self.silent {
            println!("{message}");
        }
    }

    fn confirm_overwrite(&mut self, path: &Path) -> bool {
        if self.silent {
            return true;
        }
        print!("Overwrite existing file \"{}\"? (y/n) ", path.display());
        if std::io::stdout().flush().is_err() {
            return false;
        }
        let mut answer = String::new();
        if std::io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILE_NAME))
}

fn default_log_dir() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join(APP_NAME).join("logs"))
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = args
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    if let Some(log_dir) = args.log_dir.clone().or_else(default_log_dir) {
        if let Err(err) = init_logging(&level, &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    let config_path = args.config.clone().or_else(default_config_path);
    log::info!(
        "event=cli_start module=cli status=ok source={} config={}",
        args.source.display(),
        config_path
            .as_deref()
            .map_or_else(|| "default".to_string(), |path| path.display().to_string())
    );
    let mut config = match config_path {
        Some(path) => match ConverterConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("{err}");
                return ExitCode::FAILURE;
            }
        },
        None => ConverterConfig::default(),
    };
    if args.double_linebreaks {
        config.double_linebreaks = true;
    }

    let mut reporter = TerminalReporter {
        silent: args.silent,
    };
    match Converter::new(config).run(&args.source, &mut reporter) {
        Ok(Conversion::Written(_)) | Ok(Conversion::Canceled) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::Args;
    use clap::Parser;

    #[test]
    fn flags_parse() {
        let args = Args::try_parse_from(["yw2nw", "-d", "--silent", "novel.yw7"]).unwrap();
        assert!(args.double_linebreaks);
        assert!(args.silent);
        assert_eq!(args.source.to_str(), Some("novel.yw7"));
        assert!(args.config.is_none());
    }
}
