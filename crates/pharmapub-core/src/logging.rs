//! Logging setup: env_logger behind the `log` facade, routed through
//! indicatif when a record bar is on screen.

use std::fmt::Write as _;

use indicatif::MultiProgress;

/// Padded label for a log level
fn level_label(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "ERROR",
        log::Level::Warn => "WARN ",
        log::Level::Info => "INFO ",
        log::Level::Debug => "DEBUG",
        log::Level::Trace => "TRACE",
    }
}

fn level_color(level: log::Level) -> &'static str {
    match level {
        log::Level::Error => "\x1b[31m",
        log::Level::Warn => "\x1b[33m",
        log::Level::Info => "\x1b[32m",
        log::Level::Debug => "\x1b[36m",
        log::Level::Trace => "\x1b[35m",
    }
}

/// One log line: `[LEVEL] message`, or `[LEVEL target] message` below info.
fn format_line(record: &log::Record, color: bool) -> String {
    let level = record.level();
    let mut line = String::from("[");
    if color {
        let _ = write!(line, "{}{}\x1b[0m", level_color(level), level_label(level));
    } else {
        line.push_str(level_label(level));
    }
    if level > log::Level::Info {
        let _ = write!(line, " {}", record.target());
    }
    let _ = write!(line, "] {}", record.args());
    line
}

/// Default filter directive for the given verbosity flags.
///
/// `debug` wins over `quiet`. `RUST_LOG` still overrides either.
pub fn default_level(quiet: bool, debug: bool) -> &'static str {
    if debug {
        "debug"
    } else if quiet {
        "warn"
    } else {
        "info"
    }
}

/// Logger that prints through indicatif MultiProgress so lines don't tear the record bar.
pub struct IndicatifLogger {
    inner: env_logger::Logger,
    multi: MultiProgress,
}

impl IndicatifLogger {
    pub fn new(inner: env_logger::Logger, multi: MultiProgress) -> Self {
        Self { inner, multi }
    }
}

impl log::Log for IndicatifLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &log::Record) {
        if self.inner.matches(record) {
            // only installed in TTY mode
            let line = format_line(record, true);
            self.multi.suspend(|| eprintln!("{line}"));
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

/// Install the global logger. Later calls are no-ops.
///
/// With `multi` (TTY), lines go through [`IndicatifLogger`] in color.
/// Without it, plain lines go straight to stderr.
pub fn init_logging(quiet: bool, debug: bool, multi: Option<&MultiProgress>) {
    use std::io::Write;

    let env = env_logger::Env::default().default_filter_or(default_level(quiet, debug));

    match multi {
        Some(multi) => {
            let logger = env_logger::Builder::from_env(env).build();
            let max_level = logger.filter();
            if log::set_boxed_logger(Box::new(IndicatifLogger::new(logger, multi.clone()))).is_ok()
            {
                log::set_max_level(max_level);
            }
        }
        None => {
            let _ = env_logger::Builder::from_env(env)
                .format(|buf, record| writeln!(buf, "{}", format_line(record, false)))
                .try_init();
        }
    }
}
