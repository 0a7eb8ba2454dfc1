//! Domain types shared by the mapping pipeline

use crate::error::{AdjustError, Result};
use image::RgbaImage;
use std::fmt;
use std::str::FromStr;

/// 8-bit RGB triple, the unit of a color lookup table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Self = Self::gray(0);
    pub const WHITE: Self = Self::gray(255);

    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    #[must_use]
    pub const fn gray(value: u8) -> Self {
        Self {
            r: value,
            g: value,
            b: value,
        }
    }

    #[inline]
    #[must_use]
    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{r},{g},{b}", r = self.r, g = self.g, b = self.b)
    }
}

/// Parses `R,G,B` with each component in 0-255
impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [r, g, b] = parts.as_slice() else {
            return Err(format!("expected R,G,B but got '{s}'"));
        };

        let component = |v: &str| {
            v.parse::<u8>()
                .map_err(|e| format!("invalid color component '{v}': {e}"))
        };

        Ok(Self::new(component(r)?, component(g)?, component(b)?))
    }
}

/// Normalized RGBA color, each channel nominally in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Rgba {
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn opaque_gray(value: f32) -> Self {
        Self::new(value, value, value, 1.0)
    }

    #[must_use]
    pub fn from_rgb(color: Rgb) -> Self {
        Self::new(
            f32::from(color.r) / 255.0,
            f32::from(color.g) / 255.0,
            f32::from(color.b) / 255.0,
            1.0,
        )
    }

    #[must_use]
    pub fn from_rgba8(pixel: [u8; 4]) -> Self {
        let [r, g, b, a] = pixel.map(|c| f32::from(c) / 255.0);
        Self::new(r, g, b, a)
    }

    /// Quantize back to 8 bits per channel, clamping out-of-range values
    #[must_use]
    pub fn to_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a].map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
    }

    #[inline]
    #[must_use]
    pub fn is_gray(&self) -> bool {
        self.r == self.g && self.r == self.b
    }
}

/// Bit depth of a grayscale base image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitDepth {
    Eight,
    Twelve,
    Sixteen,
}

impl BitDepth {
    #[inline]
    #[must_use]
    pub fn bits(self) -> u16 {
        match self {
            Self::Eight => 8,
            Self::Twelve => 12,
            Self::Sixteen => 16,
        }
    }

    /// 12 and 16-bit samples travel split across two 8-bit channels
    #[inline]
    #[must_use]
    pub fn is_packed(self) -> bool {
        !matches!(self, Self::Eight)
    }

    #[inline]
    #[must_use]
    pub fn max_value(self) -> u16 {
        u16::MAX >> (16 - self.bits())
    }
}

impl TryFrom<u16> for BitDepth {
    type Error = AdjustError;

    fn try_from(bits: u16) -> Result<Self> {
        match bits {
            8 => Ok(Self::Eight),
            12 => Ok(Self::Twelve),
            16 => Ok(Self::Sixteen),
            other => Err(AdjustError::UnsupportedBitDepth(other)),
        }
    }
}

impl fmt::Display for BitDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bits", self.bits())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{w}x{h}", w = self.width, h = self.height)
    }
}

/// Grayscale intensity buffer, row-major with the top row first
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    samples: Vec<u16>,
    dimensions: Dimensions,
    bit_depth: BitDepth,
}

impl Image {
    /// # Errors
    ///
    /// Returns `UnsupportedBitDepth` for depths other than 8, 12 or 16 and
    /// `DimensionMismatch` when the buffer does not cover `width * height`
    pub fn new(samples: Vec<u16>, width: u32, height: u32, bits: u16) -> Result<Self> {
        let bit_depth = BitDepth::try_from(bits)?;
        let dimensions = Dimensions::new(width, height);

        if samples.len() != dimensions.pixel_count() {
            return Err(AdjustError::DimensionMismatch {
                expected: dimensions.pixel_count(),
                actual: samples.len(),
            });
        }

        Ok(Self {
            samples,
            dimensions,
            bit_depth,
        })
    }

    #[must_use]
    pub fn samples(&self) -> &[u16] {
        &self.samples
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        self.dimensions
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.dimensions.width
    }

    #[must_use]
    pub fn height(&self) -> u32 {
        self.dimensions.height
    }

    #[must_use]
    pub fn bit_depth(&self) -> BitDepth {
        self.bit_depth
    }
}

/// Secondary RGBA layer stretched over the same quad as the base image
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayImage {
    pixels: RgbaImage,
}

impl OverlayImage {
    #[must_use]
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.pixels.width(), self.pixels.height())
    }

    #[must_use]
    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }
}

impl From<RgbaImage> for OverlayImage {
    fn from(pixels: RgbaImage) -> Self {
        Self::new(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_rgb_from_str() {
        assert_eq!("10,20,30".parse::<Rgb>(), Ok(Rgb::new(10, 20, 30)));
        assert_eq!(" 0, 255 ,7".parse::<Rgb>(), Ok(Rgb::new(0, 255, 7)));
        assert!("10,20".parse::<Rgb>().is_err());
        assert!("10,20,300".parse::<Rgb>().is_err());
        assert_eq!(Rgb::new(1, 2, 3).to_string(), "1,2,3");
    }

    #[test]
    fn test_bit_depth_conversion() {
        assert_eq!(BitDepth::try_from(12), Ok(BitDepth::Twelve));
        assert_matches!(BitDepth::try_from(10), Err(AdjustError::UnsupportedBitDepth(10)));
        assert_eq!(BitDepth::Twelve.max_value(), 4095);
        assert_eq!(BitDepth::Eight.max_value(), 255);
        assert!(BitDepth::Sixteen.is_packed());
        assert!(!BitDepth::Eight.is_packed());
    }

    #[test]
    fn test_image_rejects_short_buffer() {
        let result = Image::new(vec![0; 5], 2, 3, 16);
        assert_matches!(
            result,
            Err(AdjustError::DimensionMismatch { expected: 6, actual: 5 })
        );
    }

    #[test]
    fn test_image_rejects_bit_depth() {
        assert_matches!(
            Image::new(vec![0; 4], 2, 2, 32),
            Err(AdjustError::UnsupportedBitDepth(32))
        );
    }

    #[test]
    fn test_rgba_quantization_clamps() {
        let color = Rgba::new(1.5, -0.2, 0.5, 1.0);
        assert_eq!(color.to_rgba8(), [255, 0, 128, 255]);
        assert_eq!(Rgba::from_rgba8([0, 51, 255, 255]).to_rgba8(), [0, 51, 255, 255]);
    }
}
