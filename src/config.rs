//! Viewer configuration, read from YAML.
//!
//! Every field has a default, so an empty mapping (`{}`) or an empty string is
//! a complete configuration.

use serde::{Deserialize, Serialize};
use crate::animation::WaveParams;
use crate::error::{FurError, FurResult};
use crate::math::Vec3;
use crate::mesh::MeshSelection;
use crate::render::ShaderVariant;
use crate::strands::{ColorMode, Rgb, StrandParams};

/// Camera, colors and line drawing settings for the render pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub clear_color: Rgb,
    /// Color of the base model under the fur
    pub mesh_color: Rgb,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Rotation of the model about the vertical axis, in radians
    pub model_yaw: f32,
    /// Requested line width; most WebGL implementations clamp this to 1
    pub line_width: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            clear_color: Rgb::BLACK,
            mesh_color: Rgb::from_hex(0x6b4a2f),
            camera_position: Vec3::new(-1.0, 0.8, -4.0),
            camera_target: Vec3::ZERO,
            fov_degrees: 75.0,
            near: 0.1,
            far: 20.0,
            model_yaw: std::f32::consts::PI,
            line_width: 3.0,
        }
    }
}

impl RenderSettings {
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    pub fn validate(&self) -> FurResult<()> {
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(FurError::Config(format!(
                "fov_degrees must be in (0, 180), got {}",
                self.fov_degrees
            )));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(FurError::Config(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                self.near, self.far
            )));
        }
        if !self.camera_position.is_finite() || !self.camera_target.is_finite() {
            return Err(FurError::Config("camera position and target must be finite".into()));
        }
        if self.camera_position == self.camera_target {
            return Err(FurError::Config("camera position and target coincide".into()));
        }
        Ok(())
    }
}

/// Complete viewer configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FurConfig {
    pub strands: StrandParams,
    pub color: ColorMode,
    pub wave: WaveParams,
    pub shader: ShaderVariant,
    pub render: RenderSettings,
    pub selection: MeshSelection,
}

impl FurConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml(yaml: &str) -> FurResult<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: FurConfig = serde_yaml::from_str(yaml)
            .map_err(|e| FurError::Config(format!("YAML parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> FurResult<String> {
        serde_yaml::to_string(self).map_err(|e| FurError::Config(e.to_string()))
    }

    pub fn validate(&self) -> FurResult<()> {
        self.strands.validate()?;
        self.wave.validate()?;
        self.render.validate()?;
        if let ColorMode::BaseHue { min_intensity, .. } = self.color {
            if !(0.0..=1.0).contains(&min_intensity) {
                return Err(FurError::Config(format!(
                    "min_intensity must be within [0, 1], got {}",
                    min_intensity
                )));
            }
        }
        Ok(())
    }
}
