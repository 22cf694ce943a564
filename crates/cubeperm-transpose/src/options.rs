use cubeperm_runtime::config::GlobalConfig;

/// Strategies a permutation is allowed to use.
///
/// The generic kernel is always allowed.
#[derive(new, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransposeOptions {
    /// Use the shared memory tiled kernel when a rank-3 problem swaps its inner axes.
    pub tiled_3d: bool,
    /// Hand 2D-equivalent problems of float tensors to the matrix transpose routine.
    pub matrix_fast_path: bool,
}

impl Default for TransposeOptions {
    fn default() -> Self {
        Self {
            tiled_3d: true,
            matrix_fast_path: true,
        }
    }
}

impl TransposeOptions {
    /// Options from the [global config](GlobalConfig).
    pub fn from_config() -> Self {
        let config = GlobalConfig::get();

        Self {
            tiled_3d: config.transpose.tiled_3d,
            matrix_fast_path: config.transpose.matrix_fast_path,
        }
    }

    /// Disable every optional strategy.
    pub fn minimal() -> Self {
        Self {
            tiled_3d: false,
            matrix_fast_path: false,
        }
    }
}
