//! CLI configuration
use crate::error::{CliError, Result};
use segue_playback::PlaybackConfig;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "segue.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SegueConfig {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub render: RenderSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Output sample rate in Hz
    pub sample_rate: u32,

    /// Frames rendered per block
    pub block_frames: usize,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            sample_rate: 44_100,
            block_frames: 1_024,
        }
    }
}

impl SegueConfig {
    /// Load configuration from file and environment
    ///
    /// Sources, later ones winning: built-in defaults, `path` (or
    /// `segue.toml` in the working directory if it exists), then
    /// `SEGUE_<SECTION>__<KEY>` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Same as `load`, reading variables from `env` instead of the process
    pub fn load_with_env(
        path: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                if !path.exists() {
                    return Err(CliError::Config(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // e.g. SEGUE_PLAYBACK__CROSSFADE_SECONDS=2.5
        settings = settings.add_source(
            config::Environment::with_prefix("SEGUE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.playback
            .validate()
            .map_err(|e| CliError::Config(e.to_string()))?;

        if self.render.sample_rate == 0 {
            return Err(CliError::Config("render.sample_rate must be > 0".to_string()));
        }
        if self.render.block_frames == 0 {
            return Err(CliError::Config("render.block_frames must be > 0".to_string()));
        }
        Ok(())
    }

    /// Apply command-line flags on top of the loaded values
    pub fn apply_overrides(
        &mut self,
        crossfade: Option<f64>,
        sample_rate: Option<u32>,
    ) -> Result<()> {
        if let Some(seconds) = crossfade {
            self.playback.crossfade_seconds = seconds;
        }
        if let Some(hz) = sample_rate {
            self.render.sample_rate = hz;
        }
        self.validate()
    }

    /// Effective configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))
    }
}
