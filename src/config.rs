use std::{fs, path::Path, path::PathBuf};

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use vsearch_experiment::ExperimentConfig;
use vsearch_render::CanvasStyle;

/// Everything the binary reads from its JSON config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub experiment: ExperimentConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default = "AppConfig::default_data_directory")]
    pub data_directory: PathBuf,
}

impl AppConfig {
    fn default_data_directory() -> PathBuf {
        PathBuf::from("data")
    }
}

/// Physical monitor setup, used to convert degrees of visual angle to pixels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "DisplayConfig::default_monitor_distance_cm")]
    pub monitor_distance_cm: f64,
    #[serde(default = "DisplayConfig::default_monitor_width_cm")]
    pub monitor_width_cm: f64,
    #[serde(default = "DisplayConfig::default_fullscreen")]
    pub fullscreen: bool,
    /// TTF/OTF file for message screens. Without one, messages show as a
    /// plain background.
    #[serde(default)]
    pub font_path: Option<PathBuf>,
    #[serde(default = "DisplayConfig::default_font_size_px")]
    pub font_size_px: f32,
    #[serde(default = "DisplayConfig::default_stroke_ratio")]
    pub stroke_ratio: f32,
}

impl DisplayConfig {
    fn default_monitor_distance_cm() -> f64 {
        90.0
    }
    fn default_monitor_width_cm() -> f64 {
        53.0
    }
    fn default_fullscreen() -> bool {
        true
    }
    fn default_font_size_px() -> f32 {
        28.0
    }
    fn default_stroke_ratio() -> f32 {
        0.18
    }

    /// Canvas style for the search display of `experiment`.
    pub fn canvas_style(&self, experiment: &ExperimentConfig) -> CanvasStyle {
        CanvasStyle {
            background: experiment.colors.background,
            foreground: experiment.colors.text,
            stim_size_deg: experiment.stim_size_deg,
            stroke_ratio: self.stroke_ratio,
            font_size_px: self.font_size_px,
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            monitor_distance_cm: Self::default_monitor_distance_cm(),
            monitor_width_cm: Self::default_monitor_width_cm(),
            fullscreen: Self::default_fullscreen(),
            font_path: None,
            font_size_px: Self::default_font_size_px(),
            stroke_ratio: Self::default_stroke_ratio(),
        }
    }
}

/// Load a JSON configuration from disk, creating it with the provided initializer if missing.
pub fn load_or_init<T, F>(path: &Path, initializer: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> T,
{
    if path.exists() {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;
        let value = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse config from {}", path.display()))?;
        Ok(value)
    } else {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let value = initializer();
        let serialized = serde_json::to_string_pretty(&value)?;
        fs::write(path, serialized)
            .with_context(|| format!("failed to write config to {}", path.display()))?;
        Ok(value)
    }
}
