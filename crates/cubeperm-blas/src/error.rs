use cubeperm_runtime::LaunchError;

/// Status of a failed BLAS call.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum BlasError {
    /// An argument is out of its valid range.
    #[error("Invalid value for argument `{argument}`: {reason}")]
    InvalidValue {
        /// Name of the argument.
        argument: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// The routine couldn't be launched.
    #[error("The routine failed to launch\nCaused by:\n  {0}")]
    ExecutionFailed(#[from] LaunchError),
}

impl BlasError {
    pub(crate) fn invalid(argument: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            argument,
            reason: reason.into(),
        }
    }
}
