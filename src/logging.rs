//! Logger mínimo hacia stderr para el binario. La biblioteca solo usa las macros de `log`.

use chrono::Local;
use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", format_line(record.level(), &record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

/// Instala el logger una sola vez; llamadas posteriores solo ajustan el nivel.
pub fn init(level: LevelFilter) {
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(level);
}

fn format_line(level: Level, message: &str) -> String {
    let label = match level {
        Level::Error => "ERROR",
        Level::Warn => "AVISO",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRAZA",
    };
    format!("{} [{label}] {message}", Local::now().format("%H:%M:%S"))
}
