use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

use crate::config::Settings;

/// Environment variable overriding the terminal log level.
pub const LEVEL_ENV: &str = "WSRUN_LOG";

/// Install the global logger: stderr at the configured level, plus a
/// debug-level append log under ~/.local/share/wsrun/run.log.
/// Best-effort: failures are silently ignored (logging must never block a run).
pub fn init(settings: &Settings) {
    let level = std::env::var(LEVEL_ENV)
        .ok()
        .and_then(|v| parse_level(&v))
        .or_else(|| parse_level(&settings.log_level))
        .unwrap_or(LevelFilter::Info);

    let config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let mut loggers: Vec<Box<dyn SharedLogger>> = Vec::new();
    loggers.push(TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ));
    if settings.log_file
        && let Some(file) = open_log_file()
    {
        loggers.push(WriteLogger::new(LevelFilter::Debug, config, file));
    }
    let _ = CombinedLogger::init(loggers);
}

/// Level name as accepted by `WSRUN_LOG` (`error`, `warn`, `info`, `debug`,
/// `trace`, `off`), case-insensitive.
pub fn parse_level(name: &str) -> Option<LevelFilter> {
    name.trim().parse().ok()
}

fn open_log_file() -> Option<std::fs::File> {
    let home = std::env::var_os("HOME")?;
    let log_dir = std::path::Path::new(&home).join(".local/share/wsrun");
    let _ = std::fs::create_dir_all(&log_dir);

    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("run.log"))
        .ok()
}
