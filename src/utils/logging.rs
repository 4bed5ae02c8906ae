// Tue Jan 13 2026 - Alex

use colored::*;
use log::{Level, LevelFilter, Log, Metadata, Record};
use once_cell::sync::OnceCell;
use std::time::Instant;

static LOGGER: OnceCell<ColoredLogger> = OnceCell::new();

pub struct LoggingUtils;

impl LoggingUtils {
    /// Installs the colored stderr logger. Later calls only adjust the level.
    pub fn init_logger(level: LevelFilter) {
        let logger = LOGGER.get_or_init(ColoredLogger::new);
        if log::set_logger(logger).is_err() {
            log::trace!("Logger already installed");
        }
        log::set_max_level(level);
    }

    pub fn level_from_str(s: &str) -> Option<LevelFilter> {
        match s.to_lowercase().as_str() {
            "error" => Some(LevelFilter::Error),
            "warn" | "warning" => Some(LevelFilter::Warn),
            "info" => Some(LevelFilter::Info),
            "debug" => Some(LevelFilter::Debug),
            "trace" => Some(LevelFilter::Trace),
            "off" => Some(LevelFilter::Off),
            _ => None,
        }
    }

    pub fn level_from_verbosity(verbosity: usize) -> LevelFilter {
        match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

struct ColoredLogger {
    use_color: bool,
}

impl ColoredLogger {
    fn new() -> Self {
        Self {
            use_color: std::env::var_os("NO_COLOR").is_none(),
        }
    }

    fn format_level(&self, level: Level) -> ColoredString {
        match level {
            Level::Error => "ERROR".red().bold(),
            Level::Warn => "WARN ".yellow().bold(),
            Level::Info => "INFO ".green().bold(),
            Level::Debug => "DEBUG".blue().bold(),
            Level::Trace => "TRACE".magenta().bold(),
        }
    }
}

impl Log for ColoredLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level_str = if self.use_color {
            self.format_level(record.level()).to_string()
        } else {
            format!("{:5}", record.level())
        };

        // Worker threads are named, so the thread tells which pool slot logged.
        let current = std::thread::current();
        let thread = current.name().unwrap_or("unnamed");

        eprintln!(
            "{} {} {}",
            level_str,
            format!("[{}]", thread).dimmed(),
            record.args()
        );
    }

    fn flush(&self) {}
}

pub struct ScopedTimer {
    name: String,
    start: Instant,
}

impl ScopedTimer {
    pub fn new(name: &str) -> Self {
        log::debug!("[TIMER] {} started", name);
        Self {
            name: name.to_string(),
            start: Instant::now(),
        }
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        log::debug!("[TIMER] {} took {:.2}ms", self.name, self.elapsed_ms());
    }
}

/// Uses `RUST_LOG` when set, `default_level` otherwise.
pub fn init_from_env(default_level: &str) {
    let env = env_logger::Env::default().default_filter_or(default_level);
    if env_logger::Builder::from_env(env).try_init().is_err() {
        log::trace!("Logger already installed");
    }
}

pub fn scoped_timer(name: &str) -> ScopedTimer {
    ScopedTimer::new(name)
}

/// Logs progress in 10% steps, for runs without a progress bar.
pub struct ProgressLogger {
    name: String,
    total: usize,
    current: usize,
    last_percent: usize,
}

impl ProgressLogger {
    pub fn new(name: &str, total: usize) -> Self {
        log::info!("[{}] Starting (0/{})", name, total);
        Self {
            name: name.to_string(),
            total,
            current: 0,
            last_percent: 0,
        }
    }

    pub fn set_total(&mut self, total: usize) {
        self.total = total;
    }

    pub fn set(&mut self, value: usize) {
        self.current = value;
        self.maybe_log();
    }

    pub fn current(&self) -> usize {
        self.current
    }

    fn maybe_log(&mut self) {
        if self.total == 0 {
            return;
        }

        let percent = (self.current * 100) / self.total;
        if percent >= self.last_percent + 10 {
            self.last_percent = percent - percent % 10;
            log::info!("[{}] Progress: {}% ({}/{})", self.name, self.last_percent, self.current, self.total);
        }
    }

    pub fn finish(&self) {
        log::info!("[{}] Completed ({}/{})", self.name, self.current, self.total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_from_str() {
        assert_eq!(LoggingUtils::level_from_str("WARNING"), Some(LevelFilter::Warn));
        assert_eq!(LoggingUtils::level_from_str("trace"), Some(LevelFilter::Trace));
        assert_eq!(LoggingUtils::level_from_str("chatty"), None);
    }

    #[test]
    fn test_level_from_verbosity() {
        assert_eq!(LoggingUtils::level_from_verbosity(0), LevelFilter::Warn);
        assert_eq!(LoggingUtils::level_from_verbosity(2), LevelFilter::Debug);
        assert_eq!(LoggingUtils::level_from_verbosity(9), LevelFilter::Trace);
    }

    #[test]
    fn test_init_logger_twice_is_harmless() {
        LoggingUtils::init_logger(LevelFilter::Warn);
        LoggingUtils::init_logger(LevelFilter::Error);
        init_from_env("info");
        log::error!("still logging");
    }

    #[test]
    fn test_progress_logger_steps() {
        let mut progress = ProgressLogger::new("test", 50);
        progress.set(4);
        assert_eq!(progress.last_percent, 0);
        progress.set(26);
        assert_eq!(progress.last_percent, 50);
        progress.set(50);
        assert_eq!(progress.last_percent, 100);
        assert_eq!(progress.current(), 50);
        progress.finish();
    }

    #[test]
    fn test_scoped_timer_measures() {
        let timer = scoped_timer("sleep");
        std::thread::sleep(std::time::Duration::from_millis(2));
        assert!(timer.elapsed_ms() >= 2.0);
    }
}
