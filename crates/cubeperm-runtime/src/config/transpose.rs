use super::logger::{BinaryLogLevel, LoggerConfig};

/// Configuration of the permutation engine.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct TransposeConfig {
    /// Logger recording the strategy picked for each permutation.
    #[serde(default)]
    pub logger: LoggerConfig<TransposeLogLevel>,

    /// Whether swapping the two inner axes of a rank-3 problem may use the tiled kernel.
    #[serde(default = "enabled")]
    pub tiled_3d: bool,

    /// Whether 2D-equivalent permutations may be delegated to the matrix transpose routine.
    #[serde(default = "enabled")]
    pub matrix_fast_path: bool,
}

/// Verbosity of the transpose logger.
pub type TransposeLogLevel = BinaryLogLevel;

impl Default for TransposeConfig {
    fn default() -> Self {
        Self {
            logger: LoggerConfig::default(),
            tiled_3d: true,
            matrix_fast_path: true,
        }
    }
}

fn enabled() -> bool {
    true
}
