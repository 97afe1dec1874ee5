//! Startup configuration.
//!
//! Settings are read once from a RON file. Every field falls back to its
//! default, so a file only needs to list what it changes:
//!
//! ```ron
//! (
//!     simulation: (particle_count: 150, gravity: 2.5),
//!     camera: (fovy: 90.0),
//! )
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::container::Container;
use crate::light::Light;
use crate::simulation::{self, SimulationParams};

pub const SETTINGS_FILE: &str = "particle_box.ron";
pub const SETTINGS_ENV: &str = "PARTICLE_BOX_SETTINGS";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub width: f32,
    pub height: f32,
    pub title: String,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            title: "particle box".to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub position: [f32; 3],
    pub target: [f32; 3],
    /// Vertical field of view in degrees.
    pub fovy: f32,
    /// Degrees of rotation per pixel of mouse movement.
    pub sensitivity: f32,
    /// World units per second.
    pub move_speed: f32,
    pub sprint_multiplier: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            target: [-1.0, -1.0, -1.0],
            fovy: 120.0,
            sensitivity: 0.17,
            move_speed: 24.0,
            sprint_multiplier: 2.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerSettings {
    pub center: [f32; 3],
    pub size: [f32; 3],
    pub cell_size: f32,
    pub damping: f32,
}

impl Default for ContainerSettings {
    fn default() -> Self {
        Self {
            center: [0.0, 0.0, 0.0],
            size: [100.0, 100.0, 100.0],
            cell_size: 4.0,
            damping: Container::DEFAULT_DAMPING,
        }
    }
}

impl ContainerSettings {
    pub fn build(&self) -> Container {
        Container::new(self.center.into(), self.size.into(), self.cell_size)
            .with_damping(self.damping)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    pub particle_count: u32,
    pub radius: f32,
    /// In g.
    pub gravity: f32,
    pub target_fps: u32,
    /// Upper bound of each velocity component given to a new particle.
    pub spawn_speed: f32,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        let params = SimulationParams::default();
        Self {
            particle_count: params.target_count,
            radius: params.radius,
            gravity: params.gravity,
            target_fps: params.target_fps,
            spawn_speed: params.spawn_speed,
        }
    }
}

impl SimulationSettings {
    pub fn params(&self) -> SimulationParams {
        SimulationParams {
            radius: self.radius,
            target_count: self.particle_count,
            gravity: self.gravity,
            target_fps: self.target_fps,
            spawn_speed: self.spawn_speed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub window: WindowSettings,
    pub camera: CameraSettings,
    pub container: ContainerSettings,
    pub simulation: SimulationSettings,
    pub lights: Vec<Light>,
    /// RGBA ambient term added to every lit surface.
    pub ambient: [f32; 4],
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            window: WindowSettings::default(),
            camera: CameraSettings::default(),
            container: ContainerSettings::default(),
            simulation: SimulationSettings::default(),
            lights: Light::default_scene(),
            ambient: [0.1, 0.1, 0.1, 1.0],
        }
    }
}

impl Settings {
    pub fn default_path() -> PathBuf {
        PathBuf::from(SETTINGS_FILE)
    }

    /// Loads settings from the path in `PARTICLE_BOX_SETTINGS`, or from the default file.
    pub fn load() -> Result<Self, SettingsLoadError> {
        let explicit = std::env::var_os(SETTINGS_ENV).map(PathBuf::from);
        Self::load_with(explicit, &Self::default_path())
    }

    /// An `explicit` path must load. The `default` file is optional and falls back to defaults
    /// when missing or broken.
    pub fn load_with(explicit: Option<PathBuf>, default: &Path) -> Result<Self, SettingsLoadError> {
        if let Some(path) = explicit {
            let settings = Self::load_from_file(&path)?;
            log::info!("Loaded settings from {:?}", path);
            return Ok(settings);
        }

        if !default.exists() {
            log::info!("No settings file at {:?}, using defaults", default);
            return Ok(Self::default());
        }

        match Self::load_from_file(default) {
            Ok(settings) => {
                log::info!("Loaded settings from {:?}", default);
                Ok(settings)
            }
            Err(e) => {
                log::warn!("Failed to load settings from {default:?}: {e}. Using defaults.");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self, SettingsLoadError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents)
    }

    pub fn from_ron(contents: &str) -> Result<Self, SettingsLoadError> {
        let settings: Self = ron::from_str(contents)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsSaveError> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        self.check_finite()?;

        let container = &self.container;
        if container.size.iter().any(|s| !(*s > 0.0)) {
            return Err(SettingsError::ContainerSize(container.size));
        }
        if !(container.cell_size > 0.0) {
            return Err(SettingsError::CellSize(container.cell_size));
        }
        let smallest = container.size.into_iter().fold(f32::INFINITY, f32::min);
        if container.cell_size * 2.0 > smallest {
            return Err(SettingsError::CellTooLarge {
                cell_size: container.cell_size,
                smallest,
            });
        }
        if !(self.camera.fovy > 0.0 && self.camera.fovy < 180.0) {
            return Err(SettingsError::FieldOfView(self.camera.fovy));
        }
        if !(self.window.width > 0.0 && self.window.height > 0.0) {
            return Err(SettingsError::WindowSize(self.window.width, self.window.height));
        }
        if self.simulation.particle_count > simulation::MAX_PARTICLES {
            log::warn!(
                "particle_count {} is above the slider range and will be clamped to {}",
                self.simulation.particle_count,
                simulation::MAX_PARTICLES
            );
        }
        Ok(())
    }

    /// RON accepts `NaN` and `inf`, neither of which any field can use.
    fn check_finite(&self) -> Result<(), SettingsError> {
        let window = &self.window;
        finite("window size", &[window.width, window.height])?;

        let camera = &self.camera;
        finite("camera.position", &camera.position)?;
        finite("camera.target", &camera.target)?;
        finite("camera.fovy", &[camera.fovy])?;
        finite("camera.sensitivity", &[camera.sensitivity])?;
        finite("camera.move_speed", &[camera.move_speed])?;
        finite("camera.sprint_multiplier", &[camera.sprint_multiplier])?;

        let container = &self.container;
        finite("container.center", &container.center)?;
        finite("container.size", &container.size)?;
        finite("container.cell_size", &[container.cell_size])?;
        finite("container.damping", &[container.damping])?;

        let simulation = &self.simulation;
        finite("simulation.radius", &[simulation.radius])?;
        finite("simulation.gravity", &[simulation.gravity])?;
        finite("simulation.spawn_speed", &[simulation.spawn_speed])?;

        finite("ambient", &self.ambient)?;
        for light in &self.lights {
            finite("light.position", &light.position)?;
            finite("light.target", &light.target)?;
            finite("light.color", &light.color)?;
            finite("light.intensity", &[light.intensity])?;
        }
        Ok(())
    }
}

fn finite(field: &'static str, values: &[f32]) -> Result<(), SettingsError> {
    if values.iter().all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(SettingsError::NotFinite(field))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
    #[error("container size must be positive on every axis, got {0:?}")]
    ContainerSize([f32; 3]),
    #[error("cell size must be positive, got {0}")]
    CellSize(f32),
    #[error(
        "cell size {cell_size} does not fit twice in the container (smallest side {smallest})"
    )]
    CellTooLarge { cell_size: f32, smallest: f32 },
    #[error("field of view must be between 0 and 180 degrees, got {0}")]
    FieldOfView(f32),
    #[error("window size must be positive, got {0}x{1}")]
    WindowSize(f32, f32),
}

/// Error type for settings loading.
#[derive(Debug, thiserror::Error)]
pub enum SettingsLoadError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON parse error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("invalid settings: {0}")]
    Invalid(#[from] SettingsError),
}

/// Error type for settings saving.
#[derive(Debug, thiserror::Error)]
pub enum SettingsSaveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON serialize error: {0}")]
    Ron(#[from] ron::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let settings = Settings::from_ron("()").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn partial_file_overrides_only_listed_fields() {
        let settings =
            Settings::from_ron("(simulation: (gravity: 2.5), camera: (fovy: 90.0))").unwrap();
        assert_eq!(settings.simulation.gravity, 2.5);
        assert_eq!(settings.simulation.particle_count, 100);
        assert_eq!(settings.camera.fovy, 90.0);
        assert_eq!(settings.lights.len(), 2);
    }

    #[test]
    fn lights_can_be_replaced() {
        let settings = Settings::from_ron(
            "(lights: [(position: (1.0, 2.0, 3.0), color: (1.0, 0.0, 0.0), intensity: 0.5)])",
        )
        .unwrap();
        assert_eq!(settings.lights.len(), 1);
        assert!(settings.lights[0].enabled);
        assert_eq!(settings.lights[0].position, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn oversized_cell_is_rejected() {
        let err = Settings::from_ron("(container: (size: (10.0, 10.0, 10.0), cell_size: 6.0))")
            .unwrap_err();
        assert!(matches!(
            err,
            SettingsLoadError::Invalid(SettingsError::CellTooLarge { .. })
        ));
    }

    #[test]
    fn nan_gravity_is_rejected() {
        let err = Settings::from_ron("(simulation: (gravity: NaN))").unwrap_err();
        assert!(matches!(
            err,
            SettingsLoadError::Invalid(SettingsError::NotFinite("simulation.gravity"))
        ));
    }

    #[test]
    fn infinite_spawn_speed_is_rejected() {
        let err = Settings::from_ron("(simulation: (spawn_speed: inf))").unwrap_err();
        assert!(matches!(
            err,
            SettingsLoadError::Invalid(SettingsError::NotFinite("simulation.spawn_speed"))
        ));
    }

    #[test]
    fn non_finite_light_is_rejected() {
        let err = Settings::from_ron(
            "(lights: [(position: (0.0, inf, 0.0), color: (1.0, 1.0, 1.0), intensity: 1.0)])",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SettingsLoadError::Invalid(SettingsError::NotFinite("light.position"))
        ));
    }

    #[test]
    fn bad_syntax_is_a_parse_error() {
        let err = Settings::from_ron("(simulation: ").unwrap_err();
        assert!(matches!(err, SettingsLoadError::Ron(_)));
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("particle_box_{}_{}.ron", name, std::process::id()))
    }

    #[test]
    fn save_then_load_keeps_values() {
        let path = temp_path("save");
        let mut settings = Settings::default();
        settings.simulation.target_fps = 144;
        settings.save(&path).unwrap();

        let loaded = Settings::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.simulation.target_fps, 144);
    }

    #[test]
    fn explicit_path_must_load() {
        let path = temp_path("explicit_broken");
        std::fs::write(&path, "(simulation: ").unwrap();
        let missing = temp_path("explicit_unused_default");

        let result = Settings::load_with(Some(path.clone()), &missing);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(SettingsLoadError::Ron(_))));
    }

    #[test]
    fn missing_explicit_path_is_an_io_error() {
        let path = temp_path("explicit_missing");
        let missing = temp_path("explicit_missing_default");

        let result = Settings::load_with(Some(path), &missing);

        assert!(matches!(result, Err(SettingsLoadError::Io(_))));
    }

    #[test]
    fn explicit_path_wins_over_default_file() {
        let explicit = temp_path("explicit_good");
        let default = temp_path("explicit_good_default");
        std::fs::write(&explicit, "(simulation: (target_fps: 30))").unwrap();
        std::fs::write(&default, "(simulation: (target_fps: 90))").unwrap();

        let result = Settings::load_with(Some(explicit.clone()), &default);
        std::fs::remove_file(&explicit).ok();
        std::fs::remove_file(&default).ok();

        assert_eq!(result.unwrap().simulation.target_fps, 30);
    }

    #[test]
    fn broken_default_file_falls_back_to_defaults() {
        let path = temp_path("default_broken");
        std::fs::write(&path, "(container: (cell_size: NaN))").unwrap();

        let result = Settings::load_with(None, &path);
        std::fs::remove_file(&path).ok();

        assert_eq!(result.unwrap(), Settings::default());
    }

    #[test]
    fn missing_default_file_gives_defaults() {
        let path = temp_path("default_missing");
        let settings = Settings::load_with(None, &path).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn default_file_is_read_when_present() {
        let path = temp_path("default_good");
        std::fs::write(&path, "(simulation: (particle_count: 12))").unwrap();

        let result = Settings::load_with(None, &path);
        std::fs::remove_file(&path).ok();

        assert_eq!(result.unwrap().simulation.particle_count, 12);
    }
}
