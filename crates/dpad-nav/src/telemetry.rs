//! Log setup for hosts embedding the navigator.
//!
//! The navigator only emits `tracing` events; installing a subscriber is the
//! host's choice. `init_tracing` is the stock one: navigator crates log at
//! the requested level, everything else at `warn`.

use std::io::IsTerminal;
use std::path::Path;
use std::path::PathBuf;

use tracing::info;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

const LOG_FILE_ENV: &str = "DPAD_NAV_LOG";

const NAVIGATOR_TARGETS: [&str; 3] = ["dpad_nav", "dpad_nav_core", "dpad_nav_common"];

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

impl LogTarget {
    /// Reads `DPAD_NAV_LOG`; unset or blank means stderr.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(LOG_FILE_ENV).ok().as_deref())
    }

    fn from_value(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(path) if !path.is_empty() => LogTarget::File(PathBuf::from(path)),
            _ => LogTarget::Stderr,
        }
    }
}

/// Keeps the background file writer alive; drop it to flush.
#[derive(Debug)]
pub struct TelemetryGuard {
    installed: bool,
    log_file: Option<PathBuf>,
    _worker: Option<WorkerGuard>,
}

impl TelemetryGuard {
    fn inactive() -> Self {
        Self {
            installed: false,
            log_file: None,
            _worker: None,
        }
    }

    /// File receiving log lines, when this call installed a file writer.
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    /// Whether this call installed the global subscriber.
    pub fn is_active(&self) -> bool {
        self.installed
    }
}

/// Filter used when `RUST_LOG` is unset.
fn navigator_directives(level: &str) -> String {
    let mut directives = String::from("warn");
    for target in NAVIGATOR_TARGETS {
        directives.push(',');
        directives.push_str(target);
        directives.push('=');
        directives.push_str(level);
    }
    directives
}

/// Installs the global subscriber. `RUST_LOG` overrides `level` entirely.
///
/// Returns an inactive guard when another subscriber is already installed.
pub fn init_tracing(level: &str) -> TelemetryGuard {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(navigator_directives(level)));

    let mut open_error = None;
    let (writer, worker, log_file) = match LogTarget::from_env() {
        LogTarget::File(path) => {
            match std::fs::OpenOptions::new().create(true).append(true).open(&path) {
                Ok(file) => {
                    let (non_blocking, worker) = tracing_appender::non_blocking(file);
                    (BoxMakeWriter::new(non_blocking), Some(worker), Some(path))
                }
                Err(err) => {
                    open_error = Some((path, err));
                    (BoxMakeWriter::new(std::io::stderr), None, None)
                }
            }
        }
        LogTarget::Stderr => (BoxMakeWriter::new(std::io::stderr), None, None),
    };

    let ansi = log_file.is_none() && std::io::stderr().is_terminal();
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_ansi(ansi)
        .with_writer(writer)
        .try_init();
    if installed.is_err() {
        return TelemetryGuard::inactive();
    }

    if let Some((path, err)) = open_error {
        warn!(path = %path.display(), error = %err, "cannot open log file; logging to stderr");
    }
    info!(level, file = ?log_file, "navigator logging initialised");

    TelemetryGuard {
        installed: true,
        log_file,
        _worker: worker,
    }
}
