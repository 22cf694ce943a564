use core::fmt::Display;
use std::sync::Arc;

use crate::config::{
    GlobalConfig, Logger, launch::LaunchLogLevel, transpose::TransposeLogLevel,
};

static CUBEPERM_LOGGER: spin::Mutex<Option<Arc<EngineLogger>>> = spin::Mutex::new(None);

/// Logger shared by every launch of the process.
///
/// Messages are built lazily, so a disabled logger costs a branch per call.
#[derive(Debug)]
pub struct EngineLogger {
    kind: LoggerKind,
}

#[derive(Debug)]
enum LoggerKind {
    Activated {
        logger: spin::Mutex<Logger>,
        launch: LaunchLogLevel,
        transpose: TransposeLogLevel,
    },
    None,
}

impl Default for EngineLogger {
    fn default() -> Self {
        Self::new(GlobalConfig::get())
    }
}

impl EngineLogger {
    /// Create a logger from the given configuration.
    pub fn new(config: Arc<GlobalConfig>) -> Self {
        let logger = Logger::new(config);
        let launch = logger.log_level_launch();
        let transpose = logger.log_level_transpose();

        let kind = match (launch, transpose) {
            (LaunchLogLevel::Disabled, TransposeLogLevel::Disabled) => LoggerKind::None,
            _ => LoggerKind::Activated {
                logger: spin::Mutex::new(logger),
                launch,
                transpose,
            },
        };

        Self { kind }
    }

    /// The process wide logger, created from the [global configuration](GlobalConfig) on first
    /// use.
    pub fn global() -> Arc<Self> {
        let mut state = CUBEPERM_LOGGER.lock();

        match state.as_ref() {
            Some(logger) => logger.clone(),
            None => {
                let logger = Arc::new(Self::new(GlobalConfig::get()));
                *state = Some(logger.clone());
                logger
            }
        }
    }

    /// A logger that never logs.
    pub fn disabled() -> Self {
        Self {
            kind: LoggerKind::None,
        }
    }

    /// Returns the launch log level.
    pub fn launch_level(&self) -> LaunchLogLevel {
        match &self.kind {
            LoggerKind::Activated { launch, .. } => *launch,
            LoggerKind::None => LaunchLogLevel::Disabled,
        }
    }

    /// Returns true if transpose decisions should be logged.
    pub fn transpose_activated(&self) -> bool {
        match &self.kind {
            LoggerKind::Activated { transpose, .. } => {
                matches!(transpose, TransposeLogLevel::Full)
            }
            LoggerKind::None => false,
        }
    }

    /// Log a launch message when the launch logger is at least at `level`.
    pub fn log_launch<S, F>(&self, level: LaunchLogLevel, msg: F)
    where
        S: Display,
        F: FnOnce() -> S,
    {
        if level == LaunchLogLevel::Disabled {
            return;
        }

        let enabled = match (self.launch_level(), level) {
            (LaunchLogLevel::Disabled, _) => false,
            (LaunchLogLevel::Basic, LaunchLogLevel::Full) => false,
            _ => true,
        };

        if let (true, LoggerKind::Activated { logger, .. }) = (enabled, &self.kind) {
            logger.lock().log_launch(&msg());
        }
    }

    /// Log a transpose message when the transpose logger is activated.
    pub fn log_transpose<S, F>(&self, msg: F)
    where
        S: Display,
        F: FnOnce() -> S,
    {
        if !self.transpose_activated() {
            return;
        }

        if let LoggerKind::Activated { logger, .. } = &self.kind {
            logger.lock().log_transpose(&msg());
        }
    }
}
