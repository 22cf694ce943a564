use super::logger::{LogLevel, LoggerConfig};

/// Configuration of the kernel launch logger.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct LaunchConfig {
    /// Logger for kernel launches.
    #[serde(default)]
    pub logger: LoggerConfig<LaunchLogLevel>,
}

/// Verbosity of the launch logger.
#[derive(Default, Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum LaunchLogLevel {
    /// Nothing is logged.
    #[default]
    #[serde(rename = "disabled")]
    Disabled,

    /// Kernel names and launch geometry are logged.
    #[serde(rename = "basic")]
    Basic,

    /// Bindings and execution failures are logged as well.
    #[serde(rename = "full")]
    Full,
}

impl LogLevel for LaunchLogLevel {}
