//! Configuration loading

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub hotspots: HotspotConfig,
    #[serde(default)]
    pub scene: SceneConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    /// Canvas selector used by the browser build
    #[serde(default = "default_canvas")]
    pub canvas: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            width: default_width(),
            height: default_height(),
            canvas: default_canvas(),
        }
    }
}

fn default_title() -> String {
    "Pinpoint - GLB Hotspot Viewer".to_string()
}

fn default_width() -> u32 {
    1280
}

fn default_height() -> u32 {
    800
}

fn default_canvas() -> String {
    "#bevy-canvas".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CameraConfig {
    /// Vertical field of view in degrees
    #[serde(default = "default_fov")]
    pub fov_degrees: f32,
    #[serde(default = "default_near")]
    pub near: f32,
    #[serde(default = "default_far")]
    pub far: f32,
    /// Camera position before any model is loaded
    #[serde(default = "default_initial_position")]
    pub initial_position: [f32; 3],
    /// Offset from a hotspot to the camera when viewing it
    #[serde(default = "default_focus_offset")]
    pub focus_offset: [f32; 3],
    /// Multiplier on the fit distance when framing a new model
    #[serde(default = "default_framing_margin")]
    pub framing_margin: f32,
    /// Orbit radians per dragged pixel
    #[serde(default = "default_sensitivity")]
    pub sensitivity: f32,
    #[serde(default = "default_zoom_speed")]
    pub zoom_speed: f32,
    /// Damping factor, higher is snappier
    #[serde(default = "default_smooth_factor")]
    pub smooth_factor: f32,
    #[serde(default = "default_min_distance")]
    pub min_distance: f32,
    #[serde(default = "default_max_distance")]
    pub max_distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: default_fov(),
            near: default_near(),
            far: default_far(),
            initial_position: default_initial_position(),
            focus_offset: default_focus_offset(),
            framing_margin: default_framing_margin(),
            sensitivity: default_sensitivity(),
            zoom_speed: default_zoom_speed(),
            smooth_factor: default_smooth_factor(),
            min_distance: default_min_distance(),
            max_distance: default_max_distance(),
        }
    }
}

impl CameraConfig {
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}

fn default_fov() -> f32 {
    75.0
}

fn default_near() -> f32 {
    0.1
}

fn default_far() -> f32 {
    1000.0
}

fn default_initial_position() -> [f32; 3] {
    [2.0, 2.0, 5.0]
}

fn default_focus_offset() -> [f32; 3] {
    [2.0, 2.0, 2.0]
}

fn default_framing_margin() -> f32 {
    1.5
}

fn default_sensitivity() -> f32 {
    0.005
}

fn default_zoom_speed() -> f32 {
    0.1
}

fn default_smooth_factor() -> f32 {
    0.15
}

fn default_min_distance() -> f32 {
    0.05
}

fn default_max_distance() -> f32 {
    500.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HotspotConfig {
    #[serde(default = "default_marker_radius")]
    pub marker_radius: f32,
    /// Linear RGB marker color
    #[serde(default = "default_marker_color")]
    pub marker_color: [f32; 3],
    #[serde(default = "default_selected_color")]
    pub selected_color: [f32; 3],
    /// Height of the label plate above its anchor
    #[serde(default = "default_label_offset")]
    pub label_offset: f32,
    /// World-space text height of labels
    #[serde(default = "default_label_height")]
    pub label_height: f32,
}

impl Default for HotspotConfig {
    fn default() -> Self {
        Self {
            marker_radius: default_marker_radius(),
            marker_color: default_marker_color(),
            selected_color: default_selected_color(),
            label_offset: default_label_offset(),
            label_height: default_label_height(),
        }
    }
}

fn default_marker_radius() -> f32 {
    0.1
}

fn default_marker_color() -> [f32; 3] {
    [1.0, 0.0, 0.0]
}

fn default_selected_color() -> [f32; 3] {
    [1.0, 0.8, 0.0]
}

fn default_label_offset() -> f32 {
    0.3
}

fn default_label_height() -> f32 {
    0.12
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default = "default_true")]
    pub show_grid: bool,
    #[serde(default = "default_true")]
    pub show_axes: bool,
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,
    #[serde(default = "default_axes_length")]
    pub axes_length: f32,
    #[serde(default = "default_background")]
    pub background: [f32; 3],
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            show_grid: true,
            show_axes: true,
            grid_size: default_grid_size(),
            axes_length: default_axes_length(),
            background: default_background(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_grid_size() -> u32 {
    10
}

fn default_axes_length() -> f32 {
    5.0
}

fn default_background() -> [f32; 3] {
    [0.94, 0.94, 0.94]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level when `--log-level` is not given
    #[serde(default = "default_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

fn default_level() -> String {
    "info".to_string()
}

/// Load configuration from file, falling back to defaults when it does not exist
pub fn load_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        let config: ViewerConfig = toml::from_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    } else {
        info!(
            path = %path.display(),
            "Configuration file not found, using defaults"
        );
        Ok(ViewerConfig::default())
    }
}

/// Save default configuration to file
pub fn save_default_config(path: &Path) -> Result<(), ConfigError> {
    let content = toml::to_string_pretty(&ViewerConfig::default())?;
    std::fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_config(&temp.path().join("absent.toml")).unwrap();
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.camera.focus_offset, [2.0, 2.0, 2.0]);
        assert_eq!(config.hotspots.marker_radius, 0.1);
        assert_eq!(config.scene.grid_size, 10);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pinpoint.toml");
        std::fs::write(
            &path,
            "[camera]\nfov_degrees = 60.0\n\n[scene]\nshow_grid = false\n",
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.camera.fov_degrees, 60.0);
        assert_eq!(config.camera.near, 0.1);
        assert!(!config.scene.show_grid);
        assert!(config.scene.show_axes);
        assert_eq!(config.window.width, 1280);
    }

    #[test]
    fn test_save_default_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("pinpoint.toml");
        save_default_config(&path).unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.window.title, default_title());
        assert_eq!(config.camera.framing_margin, 1.5);
        assert_eq!(config.hotspots.marker_color, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_invalid_toml_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.toml");
        std::fs::write(&path, "[camera\nfov = ").unwrap();
        assert!(matches!(load_config(&path), Err(ConfigError::Parse(_))));
    }
}
