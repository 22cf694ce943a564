use std::{
    fmt::Display,
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::PathBuf,
    sync::Arc,
};

use hashbrown::HashMap;

use super::{GlobalConfig, launch::LaunchLogLevel, transpose::TransposeLogLevel};

/// Configuration of one logger, parameterized by a log level type.
///
/// Every enabled sink receives the messages, so a logger can write to a file and to stderr at the
/// same time.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
#[serde(bound = "")]
pub struct LoggerConfig<L: LogLevel> {
    /// Path to the log file, if file logging is enabled.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Whether to append to the log file (true) or truncate it (false).
    #[serde(default = "append_default")]
    pub append: bool,

    /// Whether to log to standard output.
    #[serde(default)]
    pub stdout: bool,

    /// Whether to log to standard error.
    #[serde(default)]
    pub stderr: bool,

    /// Forward messages to the `log` crate at the given level.
    #[serde(default)]
    pub log: Option<LogCrateLevel>,

    /// The log level for this logger, determining verbosity.
    #[serde(default)]
    pub level: L,
}

impl<L: LogLevel> Default for LoggerConfig<L> {
    fn default() -> Self {
        Self {
            file: None,
            append: true,
            stdout: false,
            stderr: false,
            log: None,
            level: L::default(),
        }
    }
}

fn append_default() -> bool {
    true
}

/// Levels of the `log` crate a logger can forward to.
#[derive(
    Clone, Copy, Debug, Default, serde::Serialize, serde::Deserialize, Hash, PartialEq, Eq,
)]
pub enum LogCrateLevel {
    /// Logs informational messages.
    #[default]
    #[serde(rename = "info")]
    Info,

    /// Logs debugging messages.
    #[serde(rename = "debug")]
    Debug,

    /// Logs trace-level messages.
    #[serde(rename = "trace")]
    Trace,
}

/// Trait for types that can be used as log levels in [`LoggerConfig`].
pub trait LogLevel:
    serde::de::DeserializeOwned + serde::Serialize + Clone + Copy + core::fmt::Debug + Default
{
}

/// Binary log level for enabling or disabling logging.
#[derive(Default, Copy, Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum BinaryLogLevel {
    /// Logging is disabled.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// Logging is fully enabled.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for BinaryLogLevel {}

/// Logger writing launch and transpose messages to their configured sinks.
///
/// Sinks shared by both subsystems (the same file, stdout, ...) are opened once.
#[derive(Debug)]
pub struct Logger {
    sinks: Vec<Sink>,
    launch_sinks: Vec<usize>,
    transpose_sinks: Vec<usize>,
    /// Configuration the logger was built from.
    pub config: Arc<GlobalConfig>,
}

#[derive(Hash, PartialEq, Eq)]
enum SinkId {
    File(PathBuf),
    Stdout,
    Stderr,
    LogCrate(LogCrateLevel),
}

impl Default for Logger {
    fn default() -> Self {
        Self::new(GlobalConfig::get())
    }
}

impl Logger {
    /// Creates a logger with the sinks enabled in `config`.
    pub fn new(config: Arc<GlobalConfig>) -> Self {
        let mut registry = SinkRegistry::default();

        let launch_sinks = match config.launch.logger.level {
            LaunchLogLevel::Disabled => Vec::new(),
            _ => registry.register(&config.launch.logger),
        };
        let transpose_sinks = match config.transpose.logger.level {
            TransposeLogLevel::Disabled => Vec::new(),
            TransposeLogLevel::Full => registry.register(&config.transpose.logger),
        };

        Self {
            sinks: registry.sinks,
            launch_sinks,
            transpose_sinks,
            config,
        }
    }

    /// Logs a message to every launch sink.
    pub fn log_launch<S: Display>(&mut self, msg: &S) {
        for index in self.launch_sinks.iter() {
            self.sinks[*index].log(msg);
        }
    }

    /// Logs a message to every transpose sink.
    pub fn log_transpose<S: Display>(&mut self, msg: &S) {
        for index in self.transpose_sinks.iter() {
            self.sinks[*index].log(msg);
        }
    }

    /// Returns the current launch log level.
    pub fn log_level_launch(&self) -> LaunchLogLevel {
        if self.launch_sinks.is_empty() {
            LaunchLogLevel::Disabled
        } else {
            self.config.launch.logger.level
        }
    }

    /// Returns the current transpose log level.
    pub fn log_level_transpose(&self) -> TransposeLogLevel {
        if self.transpose_sinks.is_empty() {
            TransposeLogLevel::Disabled
        } else {
            self.config.transpose.logger.level
        }
    }
}

#[derive(Default)]
struct SinkRegistry {
    sinks: Vec<Sink>,
    ids: HashMap<SinkId, usize>,
}

impl SinkRegistry {
    fn register<L: LogLevel>(&mut self, config: &LoggerConfig<L>) -> Vec<usize> {
        let mut indices = Vec::new();

        if let Some(path) = &config.file {
            match FileSink::new(path, config.append) {
                Ok(sink) => indices.push(self.insert(SinkId::File(path.clone()), || {
                    Sink::File(sink)
                })),
                Err(err) => log::warn!("Can't open log file {}: {err}", path.display()),
            }
        }
        if config.stdout {
            indices.push(self.insert(SinkId::Stdout, || Sink::Stdout));
        }
        if config.stderr {
            indices.push(self.insert(SinkId::Stderr, || Sink::Stderr));
        }
        if let Some(level) = config.log {
            indices.push(self.insert(SinkId::LogCrate(level), || Sink::Log(level)));
        }

        indices
    }

    fn insert(&mut self, id: SinkId, sink: impl FnOnce() -> Sink) -> usize {
        *self.ids.entry(id).or_insert_with(|| {
            self.sinks.push(sink());
            self.sinks.len() - 1
        })
    }
}

#[derive(Debug)]
enum Sink {
    File(FileSink),
    Stdout,
    Stderr,
    Log(LogCrateLevel),
}

impl Sink {
    fn log<S: Display>(&mut self, msg: &S) {
        match self {
            Sink::File(file) => file.log(msg),
            Sink::Stdout => println!("{msg}"),
            Sink::Stderr => eprintln!("{msg}"),
            Sink::Log(level) => match level {
                LogCrateLevel::Info => log::info!("{msg}"),
                LogCrateLevel::Debug => log::debug!("{msg}"),
                LogCrateLevel::Trace => log::trace!("{msg}"),
            },
        }
    }
}

#[derive(Debug)]
struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    fn new(path: &PathBuf, append: bool) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .write(true)
            .append(append)
            .truncate(!append)
            .create(true)
            .open(path)?;

        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn log<S: Display>(&mut self, msg: &S) {
        let result = writeln!(self.writer, "{msg}").and_then(|_| self.writer.flush());
        if let Err(err) = result {
            log::warn!("Can't write to the log file: {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_levels_open_no_sink() {
        let mut config = GlobalConfig::default();
        config.launch.logger.stdout = true;

        let logger = Logger::new(Arc::new(config));

        assert!(logger.sinks.is_empty());
        assert_eq!(logger.log_level_launch(), LaunchLogLevel::Disabled);
    }

    #[test]
    fn shared_sinks_are_opened_once() {
        let mut config = GlobalConfig::default();
        config.launch.logger.level = LaunchLogLevel::Basic;
        config.launch.logger.stderr = true;
        config.launch.logger.log = Some(LogCrateLevel::Debug);
        config.transpose.logger.level = TransposeLogLevel::Full;
        config.transpose.logger.stderr = true;

        let logger = Logger::new(Arc::new(config));

        assert_eq!(logger.sinks.len(), 2);
        assert_eq!(logger.launch_sinks, vec![0, 1]);
        assert_eq!(logger.transpose_sinks, vec![0]);
        assert_eq!(logger.log_level_transpose(), TransposeLogLevel::Full);
    }
}
