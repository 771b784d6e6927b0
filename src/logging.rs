#![cfg(feature = "std")]
//! Stderr logger for the server and the demo.
//!
//! `BATTLEROOM_LOG` holds a default level, optionally followed by
//! per-module overrides: `warn,battleroom::service=debug` keeps everything
//! at `warn` except the service, which logs down to `debug`. Unparsable
//! directives are skipped; an empty or missing variable means `info`.

use std::env;
use std::sync::OnceLock;

use log::{LevelFilter, Log, Metadata, Record};

use crate::config::LOG_ENV;

#[derive(Debug, Clone, PartialEq, Eq)]
struct Directives {
    default: LevelFilter,
    /// Longest module path first, so the most specific override wins.
    modules: Vec<(String, LevelFilter)>,
}

impl Directives {
    fn parse(raw: &str) -> Self {
        let mut out = Directives {
            default: LevelFilter::Info,
            modules: Vec::new(),
        };
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match part.split_once('=') {
                Some((module, level)) => {
                    if let Ok(level) = level.trim().parse() {
                        out.modules.push((module.trim().to_string(), level));
                    }
                }
                None => {
                    if let Ok(level) = part.parse() {
                        out.default = level;
                    }
                }
            }
        }
        out.modules.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()));
        out
    }

    fn level_for(&self, target: &str) -> LevelFilter {
        self.modules
            .iter()
            .find(|(module, _)| covers(module, target))
            .map(|&(_, level)| level)
            .unwrap_or(self.default)
    }

    /// The most verbose level any directive allows.
    fn ceiling(&self) -> LevelFilter {
        self.modules
            .iter()
            .map(|&(_, level)| level)
            .fold(self.default, std::cmp::max)
    }
}

fn covers(module: &str, target: &str) -> bool {
    match target.strip_prefix(module) {
        Some(rest) => rest.is_empty() || rest.starts_with("::"),
        None => false,
    }
}

struct StderrLogger {
    directives: OnceLock<Directives>,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.directives
            .get()
            .is_some_and(|d| metadata.level() <= d.level_for(metadata.target()))
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{:<5} [{}] {}", record.level(), record.target(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger {
    directives: OnceLock::new(),
};

/// Install the logger configured from `BATTLEROOM_LOG`. Later calls are
/// ignored.
pub fn init_logging() {
    let raw = env::var(LOG_ENV).unwrap_or_default();
    let ceiling = LOGGER.directives.get_or_init(|| Directives::parse(&raw)).ceiling();
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(ceiling);
    }
}
