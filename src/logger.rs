use log::{Level, LevelFilter, Metadata, Record, SetLoggerError};

pub struct SimpleLogger;

/// html5ever and selectors are very chatty below info
fn is_parser_noise(record: &Record) -> bool {
    let module = record.module_path().unwrap_or("unknown");
    (module.starts_with("selectors") || module.starts_with("html5ever"))
        && record.level() > Level::Info
}

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) || is_parser_noise(record) {
            return;
        }
        if record.target() == "progress" {
            eprintln!("{}...", record.args());
        } else {
            let color = match record.level() {
                Level::Error => "\x1b[31;1m",
                Level::Warn => "\x1b[33;1m",
                Level::Info => "\x1b[1m",
                Level::Debug => "",
                Level::Trace => "",
            };
            let color_end = "\x1b[0m";
            eprintln!("[{color}{}{color_end}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: SimpleLogger = SimpleLogger;

/// `verbosity` counts `-v` flags on top of the default info level, `quiet` drops to warnings
pub fn init(verbosity: u8, quiet: bool) -> Result<(), SetLoggerError> {
    let level = match (quiet, verbosity) {
        (true, _) => LevelFilter::Warn,
        (false, 0) => LevelFilter::Info,
        (false, 1) => LevelFilter::Debug,
        (false, _) => LevelFilter::Trace,
    };
    log::set_logger(&LOGGER).map(|()| log::set_max_level(level))
}

#[cfg(test)]
pub use test_log::*;
