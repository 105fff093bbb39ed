//! Engine configuration, loadable from JSON.
//!
//! Every field has a default, so a config file only needs the values it
//! changes.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading, saving or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Window creation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Vertical blanks to wait per swap when vsync is on.
    pub v_blanks: u32,
    pub vsync: bool,
    pub resizable: bool,
    pub fullscreen: bool,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "Window".to_owned(),
            width: 860,
            height: 480,
            v_blanks: 1,
            vsync: true,
            resizable: false,
            fullscreen: false,
        }
    }
}

/// When `render` is called relative to simulation steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    /// Render once per loop iteration.
    #[default]
    EveryIteration,
    /// Render only in iterations where at least one update ran.
    Staggered,
}

/// Loop pacing parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Fixed simulation steps per second.
    pub ups: u32,
    /// Display rate the sync wait aims for when the platform has no vsync.
    pub target_fps: u32,
    /// Update ticks between FPS/UPS title reports.
    pub report_interval_ticks: u32,
    pub render_mode: RenderMode,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            ups: 60,
            target_fps: 75,
            report_interval_ticks: 100,
            render_mode: RenderMode::EveryIteration,
        }
    }
}

impl LoopConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ups == 0 {
            return Err(ConfigError::Invalid("ups must be non-zero".into()));
        }
        if self.target_fps == 0 {
            return Err(ConfigError::Invalid("target_fps must be non-zero".into()));
        }
        if self.report_interval_ticks == 0 {
            return Err(ConfigError::Invalid(
                "report_interval_ticks must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub window: WindowSettings,
    pub timing: LoopConfig,
}

impl EngineConfig {
    /// Read and validate a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let data = std::fs::read(path.as_ref())?;
        let config: Self = serde_json::from_slice(&data)?;
        config.validate()?;
        tracing::debug!(path = %path.as_ref().display(), "loaded engine config");
        Ok(config)
    }

    /// Write this config as pretty JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        serde_json::to_writer_pretty(std::fs::File::create(path.as_ref())?, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window.width == 0 || self.window.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "window size {}x{} has a zero dimension",
                self.window.width, self.window.height
            )));
        }
        self.timing.validate()
    }
}
