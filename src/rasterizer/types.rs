//! Core types for the rasterizer

use serde::{Deserialize, Serialize};

use super::math::{Mat4, Vec3};
use crate::loader::LoadError;

/// RGBA color (0-255 per channel)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color { r: 0, g: 0, b: 0, a: 255 };
    pub const WHITE: Color = Color { r: 255, g: 255, b: 255, a: 255 };
    pub const RED: Color = Color { r: 255, g: 0, b: 0, a: 255 };
    pub const GREEN: Color = Color { r: 0, g: 255, b: 0, a: 255 };
    pub const BLUE: Color = Color { r: 0, g: 0, b: 255, a: 255 };
    pub const PURPLE: Color = Color { r: 128, g: 0, b: 128, a: 255 };
    pub const GRAY: Color = Color { r: 0x16, g: 0x16, b: 0x16, a: 255 };
    /// Returned by the sampler on bad input
    pub const TRANSPARENT: Color = Color { r: 0, g: 0, b: 0, a: 0 };

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pack into a u32 whose little-endian bytes are `[r, g, b, a]`
    pub fn pack(self) -> u32 {
        u32::from_le_bytes([self.r, self.g, self.b, self.a])
    }

    pub fn unpack(packed: u32) -> Self {
        let [r, g, b, a] = packed.to_le_bytes();
        Self { r, g, b, a }
    }

    /// Blend from `start` to `end`; `t` is clamped to [0, 1]. Result is opaque.
    pub fn lerp(start: Color, end: Color, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let inv = 1.0 - t;
        let mix = |a: u8, b: u8| (a as f32 * inv + b as f32 * t) as u8;
        Self {
            r: mix(start.r, end.r),
            g: mix(start.g, end.g),
            b: mix(start.b, end.b),
            a: 255,
        }
    }
}

/// Texture coordinate in [0,1] x [0,1], v = 0 is the top image row
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Uv {
    pub u: f32,
    pub v: f32,
}

impl Uv {
    pub const fn new(u: f32, v: f32) -> Self {
        Self { u, v }
    }
}

/// One corner of a face: indices into the vertex, uv and normal arrays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexRecord {
    pub v_index: usize,
    pub uv_index: usize,
    pub n_index: usize,
}

impl IndexRecord {
    pub const fn new(v_index: usize, uv_index: usize, n_index: usize) -> Self {
        Self { v_index, uv_index, n_index }
    }

    /// Shift every index by the given base offsets
    pub fn offset(self, vertex: usize, uv: usize, normal: usize) -> Self {
        Self {
            v_index: self.v_index + vertex,
            uv_index: self.uv_index + uv,
            n_index: self.n_index + normal,
        }
    }
}

/// A triangle: three index records plus an optional texture id
/// (`None` draws with the flat debug color)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub corners: [IndexRecord; 3],
    pub texture_id: Option<usize>,
}

impl Face {
    pub fn new(corners: [IndexRecord; 3]) -> Self {
        Self { corners, texture_id: None }
    }

    /// Build from a signed texture id; negative means untextured
    pub fn from_signed(corners: [IndexRecord; 3], texture_id: i32) -> Self {
        Self {
            corners,
            texture_id: usize::try_from(texture_id).ok(),
        }
    }
}

/// Position + Euler angles (radians; x = pitch, y = yaw, z = roll)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub position: Vec3,
    pub angles: Vec3,
}

impl Transform {
    pub fn new(position: Vec3, angles: Vec3) -> Self {
        Self { position, angles }
    }

    pub fn at(position: Vec3) -> Self {
        Self { position, angles: Vec3::ZERO }
    }

    pub fn model_matrix(&self) -> Mat4 {
        Mat4::model(self.position, self.angles)
    }

    /// Move along `dir` expressed in this transform's local axes
    pub fn move_dir(&mut self, dir: Vec3, speed: f32) {
        if speed == 0.0 || dir.len() == 0.0 {
            return;
        }
        let world = Mat4::rotation_from_angles(self.angles)
            .transform_direction(dir)
            .normalize();
        self.position = self.position + world * speed;
    }
}

/// Contiguous slice `[start, start + count)` of the face array
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexRange {
    pub start: usize,
    pub count: usize,
}

impl IndexRange {
    pub const fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }

    pub fn end(&self) -> usize {
        self.start + self.count
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }

    pub fn iter(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }
}

/// Integer rectangle for debug overlays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RectI {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl RectI {
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }
}

/// Immutable RGBA image with normalized-coordinate sampling
#[derive(Debug, Clone)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<Color>,
    pub name: String,
}

/// Bias added to `dimension - 1` before rounding so texels at the far edge
/// still receive their share of the [0,1] range.
const SAMPLE_BIAS: f32 = 0.09;

impl Texture {
    /// Uniform-color texture (defaults and error stand-ins)
    pub fn from_color(width: usize, height: usize, color: Color) -> Self {
        Self {
            width,
            height,
            pixels: vec![color; width * height],
            name: String::new(),
        }
    }

    pub fn from_pixels(width: usize, height: usize, pixels: Vec<Color>) -> Self {
        assert_eq!(pixels.len(), width * height, "texture pixel count does not match {}x{}", width, height);
        Self {
            width,
            height,
            pixels,
            name: String::new(),
        }
    }

    /// Load texture from an image file (PNG, JPEG, BMP)
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();

        let tex = Self::from_bytes(&bytes, name)?;
        log::info!("Loaded texture: {} ({}x{})", tex.name, tex.width, tex.height);
        Ok(tex)
    }

    /// Decode texture from encoded image bytes
    pub fn from_bytes(bytes: &[u8], name: String) -> Result<Self, LoadError> {
        let img = image::load_from_memory(bytes)?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let pixels: Vec<Color> = rgba
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();

        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
            name,
        })
    }

    /// Create a checkerboard test texture
    pub fn checkerboard(width: usize, height: usize, cell: usize, color1: Color, color2: Color) -> Self {
        let cell = cell.max(1);
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let checker = ((x / cell) + (y / cell)) % 2 == 0;
                pixels.push(if checker { color1 } else { color2 });
            }
        }
        Self { width, height, pixels, name: "checkerboard".to_string() }
    }

    /// Nearest-texel lookup. Coordinates are clamped to [0,1]; NaN or an
    /// index that still lands outside the image yields `Color::TRANSPARENT`.
    pub fn sample(&self, u: f32, v: f32) -> Color {
        if u.is_nan() || v.is_nan() {
            log::warn!("texture '{}': NaN uv ({}, {})", self.name, u, v);
            return Color::TRANSPARENT;
        }
        let u = u.clamp(0.0, 1.0);
        let v = v.clamp(0.0, 1.0);

        let x = (u * (self.width as f32 - 1.0 + SAMPLE_BIAS)).round() as i64;
        let y = (v * (self.height as f32 - 1.0 + SAMPLE_BIAS)).round() as i64;

        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            log::error!(
                "texture '{}': uv ({}, {}) mapped to texel ({}, {}) outside {}x{}",
                self.name, u, v, x, y, self.width, self.height
            );
            return Color::TRANSPARENT;
        }
        self.pixels[x as usize + y as usize * self.width]
    }

    /// Get pixel at x,y coordinates
    pub fn get_pixel(&self, x: usize, y: usize) -> Color {
        if x < self.width && y < self.height {
            self.pixels[y * self.width + x]
        } else {
            Color::TRANSPARENT
        }
    }
}
