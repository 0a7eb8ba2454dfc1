//! Render backend interface
//!
//! The mapping core never touches graphics objects. It hands plain buffers,
//! matrices and per-draw parameters to a [`RenderBackend`], which owns the
//! textures and rasterizes the display quad.

pub mod software;

pub use software::SoftwareBackend;

use crate::color::{FragmentParams, Sample};
use crate::error::{AdjustError, Result};
use crate::lut::ColorLut;
use crate::transform::Mat4;
use crate::types::Rgba;
use std::sync::Arc;

/// Texel layout of an uploaded image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureFormat {
    /// Two bytes per texel: low byte as luminance, high byte as alpha
    LuminanceAlpha,
    Rgb,
    Rgba,
}

impl TextureFormat {
    #[inline]
    #[must_use]
    pub fn bytes_per_texel(self) -> usize {
        match self {
            Self::LuminanceAlpha => 2,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Which of the two bound images a call refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureSlot {
    Base,
    Overlay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    width: u32,
    height: u32,
    format: TextureFormat,
    bytes: Vec<u8>,
}

impl TextureData {
    /// # Errors
    ///
    /// `DimensionMismatch` when `bytes` does not hold exactly `width * height` texels
    pub fn new(width: u32, height: u32, format: TextureFormat, bytes: Vec<u8>) -> Result<Self> {
        let expected = width as usize * height as usize * format.bytes_per_texel();
        if bytes.len() != expected {
            return Err(AdjustError::DimensionMismatch {
                expected,
                actual: bytes.len(),
            });
        }

        Ok(Self {
            width,
            height,
            format,
            bytes,
        })
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[must_use]
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Nearest-neighbour fetch with clamp-to-edge addressing
    ///
    /// `v = 0` selects the first uploaded row.
    #[must_use]
    pub fn fetch(&self, u: f32, v: f32) -> Option<Sample> {
        if self.width == 0 || self.height == 0 {
            return None;
        }

        let x = texel_index(u, self.width);
        let y = texel_index(v, self.height);
        let bpp = self.format.bytes_per_texel();
        let offset = (y * self.width as usize + x) * bpp;
        let texel = &self.bytes[offset..offset + bpp];
        let norm = |b: u8| f32::from(b) / 255.0;

        Some(match self.format {
            TextureFormat::LuminanceAlpha => Sample::Packed {
                high: norm(texel[1]),
                low: norm(texel[0]),
            },
            TextureFormat::Rgb => {
                Sample::Color(Rgba::new(norm(texel[0]), norm(texel[1]), norm(texel[2]), 1.0))
            }
            TextureFormat::Rgba => {
                Sample::Color(Rgba::from_rgba8([texel[0], texel[1], texel[2], texel[3]]))
            }
        })
    }
}

#[inline]
fn texel_index(coord: f32, size: u32) -> usize {
    let scaled = (coord * size as f32).floor();
    if scaled.is_nan() || scaled < 0.0 {
        0
    } else {
        (scaled as usize).min(size as usize - 1)
    }
}

/// Operations the display core drives
///
/// Calls mirror a programmable graphics pipeline: textures and the color
/// table are uploaded once and stay bound; matrices, blending and fragment
/// parameters are set before each [`draw_quad`](RenderBackend::draw_quad).
pub trait RenderBackend {
    fn upload_image(&mut self, slot: TextureSlot, texture: TextureData);

    /// The previous table stays alive for as long as anything else holds it
    fn upload_lut(&mut self, lut: Arc<ColorLut>);

    fn set_transform(&mut self, model: Mat4, view: Mat4);

    fn set_blend_mode(&mut self, enabled: bool);

    fn set_fragment_params(&mut self, params: FragmentParams);

    fn clear(&mut self);

    fn draw_quad(&mut self, slot: TextureSlot, invert_vertical: bool);
}
