use crate::editor::EditorDefaults;
use crate::scene::{PointParams, TorusParams, DEFAULT_CURVE_SAMPLES};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Startup settings. Every field falls back to its default when missing
/// from the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub vsync: bool,
    pub target_frame_hz: f32,
    pub cursor: [f32; 3],
    pub torus: TorusParams,
    pub point: PointParams,
    pub curve_samples_per_segment: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vsync: true,
            target_frame_hz: 60.0,
            cursor: [0.0, 0.0, 0.0],
            torus: TorusParams::default(),
            point: PointParams::default(),
            curve_samples_per_segment: DEFAULT_CURVE_SAMPLES,
        }
    }
}

impl Settings {
    pub fn editor_defaults(&self) -> EditorDefaults {
        EditorDefaults {
            torus: self.torus.clamped(),
            point: self.point.clamped(),
            curve_samples: self.curve_samples_per_segment.max(1),
        }
    }

    /// Frame budget, or `None` when the frame rate is uncapped.
    pub fn target_frame_duration(&self) -> Option<std::time::Duration> {
        if self.target_frame_hz > 0.0 && self.target_frame_hz.is_finite() {
            Some(std::time::Duration::from_secs_f32(1.0 / self.target_frame_hz))
        } else {
            None
        }
    }
}

pub fn save_settings_to_file(settings: &Settings, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(settings)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_settings_from_file(path: &Path) -> Result<Settings> {
    let json = std::fs::read_to_string(path)?;
    let settings: Settings = serde_json::from_str(&json)?;
    Ok(settings)
}

/// Loads `path` if given, otherwise returns defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Settings> {
    match path {
        Some(path) => {
            let settings = load_settings_from_file(path)?;
            log::info!("Loaded settings from {}", path.display());
            Ok(settings)
        }
        None => Ok(Settings::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        path.push(format!("bezcad_{}_{}_{}.json", name, std::process::id(), nonce));
        path
    }

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings =
            serde_json::from_str(r#"{ "vsync": false, "torus": { "major_radius": 0.9 } }"#)
                .unwrap();
        assert!(!settings.vsync);
        assert_eq!(settings.torus.major_radius, 0.9);
        assert_eq!(settings.torus.minor_radius, TorusParams::default().minor_radius);
        assert_eq!(settings.point, PointParams::default());
        assert_eq!(settings.curve_samples_per_segment, DEFAULT_CURVE_SAMPLES);
    }

    #[test]
    fn save_then_load_via_file() {
        let settings = Settings {
            vsync: false,
            target_frame_hz: 144.0,
            cursor: [1.0, -2.0, 0.5],
            ..Settings::default()
        };
        let path = temp_path("settings");
        save_settings_to_file(&settings, &path).unwrap();
        let loaded = load_or_default(Some(&path)).unwrap();
        assert_eq!(loaded, settings);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn broken_files_report_their_cause() {
        let missing = temp_path("missing");
        assert!(matches!(
            load_settings_from_file(&missing),
            Err(SettingsError::Io(_))
        ));

        let path = temp_path("broken");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            load_settings_from_file(&path),
            Err(SettingsError::Json(_))
        ));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn editor_defaults_are_clamped() {
        let settings = Settings {
            torus: TorusParams {
                major_segments: 1,
                ..TorusParams::default()
            },
            curve_samples_per_segment: 0,
            ..Settings::default()
        };
        let defaults = settings.editor_defaults();
        assert_eq!(defaults.torus.major_segments, 3);
        assert_eq!(defaults.curve_samples, 1);

        let uncapped = Settings {
            target_frame_hz: 0.0,
            ..Settings::default()
        };
        assert!(uncapped.target_frame_duration().is_none());
    }
}
