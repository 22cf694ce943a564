use std::{path::Path, sync::Arc};

use super::{
    launch::{LaunchConfig, LaunchLogLevel},
    transpose::{TransposeConfig, TransposeLogLevel},
};

/// Static mutex holding the global configuration, initialized as `None`.
static CUBEPERM_GLOBAL_CONFIG: spin::Mutex<Option<Arc<GlobalConfig>>> = spin::Mutex::new(None);

const CONFIG_FILE_NAME: &str = "cubeperm.toml";
const DEFAULT_LOG_FILE: &str = "/tmp/cubeperm.log";

/// Global configuration, combining the launch and transpose settings.
#[derive(Default, Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct GlobalConfig {
    /// Configuration of kernel launches.
    #[serde(default)]
    pub launch: LaunchConfig,

    /// Configuration of the permutation engine.
    #[serde(default)]
    pub transpose: TransposeConfig,
}

/// Errors raised while loading a configuration file.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// The file couldn't be read.
    #[error("Can't read the config file\nCaused by:\n  {0}")]
    Io(#[from] std::io::Error),

    /// The file isn't valid toml for a [`GlobalConfig`].
    #[error("The config file doesn't have the right format\nCaused by:\n  {0}")]
    Format(#[from] toml::de::Error),
}

impl GlobalConfig {
    /// Retrieves the current global configuration, loading it if not set.
    ///
    /// The first call looks for `cubeperm.toml` in the current directory or its parents, falls
    /// back to the default configuration, then applies the environment overrides.
    ///
    /// Calling this function takes a global lock, so callers read it once at initialization.
    pub fn get() -> Arc<Self> {
        let mut state = CUBEPERM_GLOBAL_CONFIG.lock();

        match state.as_ref() {
            Some(config) => config.clone(),
            None => {
                let config = Arc::new(Self::from_current_dir().override_from_env());
                *state = Some(config.clone());
                config
            }
        }
    }

    /// Sets the global configuration to the provided value.
    ///
    /// # Panics
    /// Panics if the configuration has already been set or read, as it cannot be overridden.
    pub fn set(config: Self) {
        let mut state = CUBEPERM_GLOBAL_CONFIG.lock();
        if state.is_some() {
            panic!("Cannot set the global configuration multiple times.");
        }
        *state = Some(Arc::new(config));
    }

    /// Save the current configuration to the provided file path.
    pub fn save_default<P: AsRef<Path>>(path: P) -> std::io::Result<()> {
        let config = Self::get();
        let content = toml::to_string_pretty(config.as_ref()).map_err(std::io::Error::other)?;
        std::fs::write(path, content)
    }

    /// Overrides configuration fields based on environment variables.
    pub fn override_from_env(self) -> Self {
        self.override_from_env_with(|key| std::env::var(key).ok())
    }

    /// Overrides configuration fields from the variables returned by `lookup`.
    pub fn override_from_env_with<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("CUBEPERM_DEBUG_LOG") {
            self.launch.logger.level = LaunchLogLevel::Full;
            self.transpose.logger.level = TransposeLogLevel::Full;

            match val.as_str() {
                "stdout" => {
                    self.launch.logger.stdout = true;
                    self.transpose.logger.stdout = true;
                }
                "stderr" => {
                    self.launch.logger.stderr = true;
                    self.transpose.logger.stderr = true;
                }
                "1" | "true" => {
                    self.launch.logger.file = Some(DEFAULT_LOG_FILE.into());
                    self.transpose.logger.file = Some(DEFAULT_LOG_FILE.into());
                }
                "0" | "false" => {
                    self.launch.logger.level = LaunchLogLevel::Disabled;
                    self.transpose.logger.level = TransposeLogLevel::Disabled;
                }
                file_path => {
                    self.launch.logger.file = Some(file_path.into());
                    self.transpose.logger.file = Some(file_path.into());
                }
            }
        }

        if let Some(enabled) = lookup("CUBEPERM_TRANSPOSE_TILED_3D").and_then(|v| parse_flag(&v)) {
            self.transpose.tiled_3d = enabled;
        }

        if let Some(enabled) =
            lookup("CUBEPERM_TRANSPOSE_MATRIX_FAST_PATH").and_then(|v| parse_flag(&v))
        {
            self.transpose.matrix_fast_path = enabled;
        }

        self
    }

    /// Loads the configuration from a toml file.
    pub fn from_file_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    // Traverses up the directory tree until a config file is found or the root is reached.
    fn from_current_dir() -> Self {
        let Ok(mut dir) = std::env::current_dir() else {
            return Self::default();
        };

        loop {
            let path = dir.join(CONFIG_FILE_NAME);
            if path.is_file() {
                match Self::from_file_path(&path) {
                    Ok(config) => return config,
                    Err(err) => {
                        log::warn!("Ignoring {}: {err}", path.display());
                        return Self::default();
                    }
                }
            }

            if !dir.pop() {
                break;
            }
        }

        Self::default()
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashMap;

    fn lookup<'a>(vars: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let vars: HashMap<_, _> = vars.iter().copied().collect();
        move |key| vars.get(key).map(|v| v.to_string())
    }

    #[test]
    fn default_enables_every_strategy() {
        let config = GlobalConfig::default();

        assert!(config.transpose.tiled_3d);
        assert!(config.transpose.matrix_fast_path);
        assert_eq!(config.launch.logger.level, LaunchLogLevel::Disabled);
    }

    #[test]
    fn env_disables_strategies() {
        let config = GlobalConfig::default().override_from_env_with(lookup(&[
            ("CUBEPERM_TRANSPOSE_TILED_3D", "0"),
            ("CUBEPERM_TRANSPOSE_MATRIX_FAST_PATH", "false"),
        ]));

        assert!(!config.transpose.tiled_3d);
        assert!(!config.transpose.matrix_fast_path);
    }

    #[test]
    fn env_ignores_unknown_flag_values() {
        let config = GlobalConfig::default()
            .override_from_env_with(lookup(&[("CUBEPERM_TRANSPOSE_TILED_3D", "maybe")]));

        assert!(config.transpose.tiled_3d);
    }

    #[test]
    fn debug_log_to_stderr() {
        let config = GlobalConfig::default()
            .override_from_env_with(lookup(&[("CUBEPERM_DEBUG_LOG", "stderr")]));

        assert_eq!(config.launch.logger.level, LaunchLogLevel::Full);
        assert!(config.launch.logger.stderr);
        assert!(config.transpose.logger.stderr);
        assert!(!config.transpose.logger.stdout);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: GlobalConfig = toml::from_str(
            r#"
            [transpose]
            tiled_3d = false

            [launch.logger]
            level = "basic"
            stdout = true
            "#,
        )
        .unwrap();

        assert!(!config.transpose.tiled_3d);
        assert!(config.transpose.matrix_fast_path);
        assert_eq!(config.launch.logger.level, LaunchLogLevel::Basic);
        assert!(config.launch.logger.stdout);
        assert!(config.launch.logger.append);
    }
}
