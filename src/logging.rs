#![cfg(feature = "std")]

use std::env;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Metadata, Record};

/// Writes records to stderr so machine-readable stdout stays clean.
struct StderrLogger {
    started: OnceLock<Instant>,
}

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let elapsed = self.started.get_or_init(Instant::now).elapsed();
        eprintln!(
            "[{:>9.3}s {:<5} {}] {}",
            elapsed.as_secs_f64(),
            record.level(),
            record.target(),
            record.args()
        );
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger {
    started: OnceLock::new(),
};

/// Install the stderr logger at the level named by `SOLVER_LOG`
/// (`error` .. `trace`, or `off`). Defaults to `info`.
///
/// Calling it again leaves the first logger in place.
pub fn init_logging() {
    let level = env::var("SOLVER_LOG")
        .ok()
        .and_then(|lvl| lvl.parse().ok())
        .unwrap_or(LevelFilter::Info);
    if log::set_logger(&LOGGER).is_ok() {
        LOGGER.started.get_or_init(Instant::now);
        log::set_max_level(level);
    }
}
