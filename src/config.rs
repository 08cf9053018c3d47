//! Render configuration
//!
//! Uses RON (Rusty Object Notation) for human-readable config files. The
//! renderer reads these values every frame, so edits made between frames
//! take effect immediately.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rasterizer::{Color, Transform, Vec3, HEIGHT, WIDTH};

/// Error type for config loading and validation
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Render target width in pixels
    pub width: usize,
    /// Render target height in pixels
    pub height: usize,
    /// Vertical field of view, radians
    pub fov: f32,
    pub near_clip: f32,
    pub far_clip: f32,
    /// Frame cap for the viewer; 0 disables pacing
    pub target_fps: u32,
    pub clear_color: Color,
    /// Color for faces without a texture
    pub debug_color: Color,
    /// Overlay triangle edges after filling
    pub wireframe: bool,
    pub wire_color: Color,
    /// Where the camera starts
    pub camera: Transform,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: WIDTH,
            height: HEIGHT,
            fov: std::f32::consts::FRAC_PI_2,
            near_clip: 0.1,
            far_clip: 10.0,
            target_fps: 100,
            clear_color: Color::BLACK,
            debug_color: Color::PURPLE,
            wireframe: false,
            wire_color: Color::GREEN,
            camera: Transform::at(Vec3::new(0.0, 0.0, -1.0)),
        }
    }
}

impl RenderConfig {
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width == 0 || self.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "render target must be non-empty, got {}x{}",
                self.width, self.height
            )));
        }
        if !(self.near_clip > 0.0 && self.near_clip < self.far_clip) {
            return Err(ConfigError::Invalid(format!(
                "need 0 < near_clip < far_clip, got near = {}, far = {}",
                self.near_clip, self.far_clip
            )));
        }
        if !(self.fov > 0.0 && self.fov < std::f32::consts::PI) {
            return Err(ConfigError::Invalid(format!(
                "fov must be in (0, pi) radians, got {}",
                self.fov
            )));
        }
        Ok(())
    }
}

/// Load and validate a config from a RON file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<RenderConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    config_from_str(&contents)
}

/// Parse and validate a config from a RON string
pub fn config_from_str(s: &str) -> Result<RenderConfig, ConfigError> {
    let config: RenderConfig = ron::from_str(s)?;
    config.validate()?;
    Ok(config)
}

/// Save a config to a RON file
pub fn save_config<P: AsRef<Path>>(config: &RenderConfig, path: P) -> Result<(), ConfigError> {
    let pretty = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());

    let contents = ron::ser::to_string_pretty(config, pretty)?;
    fs::write(path, contents)?;
    Ok(())
}
