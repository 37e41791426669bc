//! Minimal stderr backend for the `log` facade.
//!
//! Level comes from `-v` flags, else `TMUXDIR_LOG`, else warn.

use log::{LevelFilter, Log, Metadata, Record};

pub const ENV_LOG: &str = "TMUXDIR_LOG";

struct StderrLogger {
    level: LevelFilter,
}

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!(
                "[{}] [{}] {}",
                record.level(),
                record.target(),
                record.args()
            );
        }
    }

    fn flush(&self) {}
}

fn level_for(verbose: u8, env: Option<&str>) -> LevelFilter {
    match verbose {
        0 => env
            .and_then(|value| value.trim().parse().ok())
            .unwrap_or(LevelFilter::Warn),
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

pub fn init(verbose: u8) {
    let env = std::env::var(ENV_LOG).ok();
    let level = level_for(verbose, env.as_deref());
    if log::set_boxed_logger(Box::new(StderrLogger { level })).is_ok() {
        log::set_max_level(level);
    }
}
