//! Tracing setup
//!
//! The TUI owns stderr, so events go to a log file. `PORTFOLIO_LOG` takes an
//! `EnvFilter` directive and overrides the default levels.

use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "PORTFOLIO_LOG";

pub fn log_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|dir| dir.join("portfolio").join("portfolio.log"))
}

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("portfolio=debug,portfolio_core=debug,info")
        } else {
            EnvFilter::new("portfolio=info,portfolio_core=info,warn")
        }
    })
}

/// Where events end up when the log file can't be opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    Stderr,
    Discard,
}

impl Fallback {
    /// The TUI draws on stderr, so an interactive session drops events.
    pub fn for_session(interactive: bool) -> Self {
        if interactive {
            Fallback::Discard
        } else {
            Fallback::Stderr
        }
    }

    fn writer(self) -> BoxMakeWriter {
        match self {
            Fallback::Stderr => BoxMakeWriter::new(std::io::stderr),
            Fallback::Discard => BoxMakeWriter::new(std::io::sink),
        }
    }
}

/// Install the global subscriber. Returns the log file path when file
/// logging could be set up.
pub fn init(verbose: bool, interactive: bool) -> Option<PathBuf> {
    if let Some(log_path) = log_path() {
        let dir_ready = log_path.parent().map_or(false, |dir| std::fs::create_dir_all(dir).is_ok());
        if dir_ready {
            if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
                let file_layer = tracing_subscriber::fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true);

                tracing_subscriber::registry()
                    .with(default_filter(verbose))
                    .with(file_layer)
                    .init();

                tracing::info!(path = ?log_path, "Tracing initialized");
                return Some(log_path);
            }
        }
    }

    // Errors only, and nothing at all while the TUI owns the terminal
    tracing_subscriber::fmt()
        .with_writer(Fallback::for_session(interactive).writer())
        .with_env_filter(EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("error")))
        .init();
    None
}
