use log::LevelFilter;
use log4rs::append::console::ConsoleAppender;
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config as LogConfig, Root};
use log4rs::encode::pattern::PatternEncoder;

use crate::config::ConfigError;

/// Sets up file (and optionally console) logging for the process.
///
/// # Arguments
///
/// * 'log_path' - path to the log file
/// * 'log_level' - minimum level to record
/// * 'log_to_stdout' - whether to additionally log to stdout
pub fn setup_logger(log_path: &str, log_level: LevelFilter, log_to_stdout: bool) -> Result<(), ConfigError> {
    const PATTERN: &str = "{d(%Y-%m-%d %H:%M:%S)} {l} [{M}] {m}{n}";

    let file = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(PATTERN)))
        .build(log_path)
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    let mut builder = LogConfig::builder().appender(Appender::builder().build("file", Box::new(file)));
    let mut root = Root::builder().appender("file");

    if log_to_stdout {
        let stdout = ConsoleAppender::builder().encoder(Box::new(PatternEncoder::new(PATTERN))).build();
        builder = builder.appender(Appender::builder().build("stdout", Box::new(stdout)));
        root = root.appender("stdout");
    }

    let log_config = builder
        .build(root.build(log_level))
        .map_err(|e| ConfigError::Logging(e.to_string()))?;

    log4rs::init_config(log_config).map_err(|e| ConfigError::Logging(e.to_string()))?;

    Ok(())
}
