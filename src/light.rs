use encase::ShaderType;
use serde::{Deserialize, Serialize};

/// Lights past this count are dropped before upload.
pub const MAX_LIGHTS: usize = 4;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LightKind {
    Directional,
    #[default]
    Point,
}

/// Fixed shader light. Only affects shading of the 3D scene.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Light {
    #[serde(default)]
    pub kind: LightKind,
    pub position: [f32; 3],
    /// Only used by directional lights.
    #[serde(default)]
    pub target: [f32; 3],
    pub color: [f32; 3],
    pub intensity: f32,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

const YELLOW: [f32; 3] = [253.0 / 255.0, 249.0 / 255.0, 0.0];

impl Light {
    pub fn point(position: [f32; 3], target: [f32; 3], color: [f32; 3], intensity: f32) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            target,
            color,
            intensity,
            enabled: true,
        }
    }

    pub fn default_scene() -> Vec<Self> {
        vec![
            Self::point([0.0, 0.0, 0.0], [0.0, -25.0, 0.0], YELLOW, 0.1),
            Self::point([-25.0, -25.0, 0.0], [0.0, -25.0, 0.0], YELLOW, 0.6),
        ]
    }

    pub fn to_gpu(&self) -> GpuLight {
        GpuLight {
            position: self.position.into(),
            kind: match self.kind {
                LightKind::Directional => 0,
                LightKind::Point => 1,
            },
            target: self.target.into(),
            intensity: self.intensity,
            color: self.color.into(),
            enabled: self.enabled as u32,
        }
    }
}

#[derive(Clone, Copy, ShaderType)]
pub struct GpuLight {
    pub position: cgmath::Vector3<f32>,
    pub kind: u32,
    pub target: cgmath::Vector3<f32>,
    pub intensity: f32,
    pub color: cgmath::Vector3<f32>,
    pub enabled: u32,
}

impl GpuLight {
    fn disabled() -> Self {
        Self {
            position: cgmath::vec3(0.0, 0.0, 0.0),
            kind: 1,
            target: cgmath::vec3(0.0, 0.0, 0.0),
            intensity: 0.0,
            color: cgmath::vec3(0.0, 0.0, 0.0),
            enabled: 0,
        }
    }
}

/// Packs up to [`MAX_LIGHTS`] lights into the fixed array the shader expects.
pub fn pack_lights(lights: &[Light]) -> ([GpuLight; MAX_LIGHTS], u32) {
    if lights.len() > MAX_LIGHTS {
        log::warn!(
            "{} lights configured, only the first {MAX_LIGHTS} are used",
            lights.len()
        );
    }

    let mut packed = [GpuLight::disabled(); MAX_LIGHTS];
    let count = lights.len().min(MAX_LIGHTS);
    for (slot, light) in packed.iter_mut().zip(lights) {
        *slot = light.to_gpu();
    }
    (packed, count as u32)
}
