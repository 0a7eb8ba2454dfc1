//! Per-fragment color mapping
//!
//! This is the function a fragment stage evaluates for every covered pixel of
//! the base image: decode the sample, window it, then look it up in the color
//! table. True color samples bypass windowing and the table.

pub mod overlay;

pub use overlay::{BrightnessMode, brightness, composite, effective_alpha};

use crate::lut::{ColorLut, WindowMode, WindowRange};
use crate::pixel::decode16;
use crate::types::Rgba;

/// Full scale of a decoded two-channel sample
const PACKED_FULL_SCALE: f32 = 65535.0;
/// Full scale of an 8-bit channel
const BYTE_FULL_SCALE: f32 = 255.0;

/// A texel as fetched from the bound image
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    /// Luminance-alpha texel of a 12/16-bit image, channels normalized to [0, 1]
    Packed { high: f32, low: f32 },
    /// RGB(A) texel of an 8-bit image; grayscale when R == G == B
    Color(Rgba),
}

impl Sample {
    #[must_use]
    pub fn packed(value: u16) -> Self {
        let (high, low) = crate::pixel::encode16(value);
        Self::Packed { high, low }
    }
}

/// Per-draw uniforms consumed by the fragment stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentParams {
    /// Window applied before the table, `None` when windowing is off
    pub window: Option<WindowRange>,
    pub window_mode: WindowMode,
    pub use_lut: bool,
    pub global_alpha: f32,
    pub auto_alpha: bool,
    pub brightness: BrightnessMode,
}

impl Default for FragmentParams {
    fn default() -> Self {
        Self {
            window: None,
            window_mode: WindowMode::default(),
            use_lut: false,
            global_alpha: 1.0,
            auto_alpha: false,
            brightness: BrightnessMode::default(),
        }
    }
}

/// Map one sample to its display color
///
/// Table indices outside the table clamp to its ends; a missing or empty
/// table falls back to the grayscale value.
#[must_use]
pub fn map_pixel(sample: Sample, params: &FragmentParams, lut: Option<&ColorLut>) -> Rgba {
    // Stored samples are integral; rounding keeps table indices exact
    let (value, full_scale) = match sample {
        Sample::Packed { high, low } => (decode16(high, low).round(), PACKED_FULL_SCALE),
        Sample::Color(color) if color.is_gray() => {
            ((color.r * BYTE_FULL_SCALE).round(), BYTE_FULL_SCALE)
        }
        Sample::Color(color) => return color,
    };

    // f64 so that `coord * len` floors to the sample's own entry across 16 bits
    let normalized = match params.window {
        Some(range) if range.is_active() => f64::from(range.normalize(value, params.window_mode)),
        _ => f64::from(value) / f64::from(full_scale),
    };

    if params.use_lut
        && let Some(color) = lut.and_then(|lut| lut.sample(normalized))
    {
        return Rgba::from_rgb(color);
    }

    Rgba::opaque_gray(normalized as f32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lut::{LutDomain, WindowSpec, build_window_lut};
    use crate::types::Rgb;
    use approx::assert_relative_eq;

    fn windowed(begin: f32, end: f32) -> FragmentParams {
        FragmentParams {
            window: Some(WindowRange::new(begin, end)),
            ..FragmentParams::default()
        }
    }

    #[test]
    fn test_packed_without_window_normalizes_full_range() {
        let params = FragmentParams::default();
        let out = map_pixel(Sample::packed(65535), &params, None);
        assert_relative_eq!(out.r, 1.0);
        assert_relative_eq!(out.a, 1.0);

        let out = map_pixel(Sample::packed(32768), &params, None);
        assert_relative_eq!(out.g, 32768.0 / 65535.0, epsilon = 1e-6);
        assert!(out.is_gray());
    }

    #[test]
    fn test_packed_window_clamps() {
        let params = windowed(1000.0, 2000.0);
        assert_relative_eq!(map_pixel(Sample::packed(500), &params, None).r, 0.0);
        assert_relative_eq!(map_pixel(Sample::packed(1500), &params, None).r, 0.5, epsilon = 1e-4);
        assert_relative_eq!(map_pixel(Sample::packed(4000), &params, None).r, 1.0);
    }

    #[test]
    fn test_collapsed_window_falls_back() {
        let params = windowed(100.0, 100.0);
        let out = map_pixel(Sample::packed(65535), &params, None);
        assert_relative_eq!(out.r, 1.0);
    }

    #[test]
    fn test_gray_color_sample_is_windowed() {
        let params = windowed(0.0, 100.0);
        let gray = Rgba::from_rgba8([50, 50, 50, 255]);
        assert_relative_eq!(map_pixel(Sample::Color(gray), &params, None).r, 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_true_color_bypasses_window_and_lut() {
        let lut = ColorLut::new(vec![Rgb::new(9, 9, 9); 256]);
        let params = FragmentParams {
            use_lut: true,
            ..windowed(0.0, 10.0)
        };
        let color = Rgba::from_rgba8([200, 10, 30, 128]);
        assert_eq!(map_pixel(Sample::Color(color), &params, Some(&lut)), color);
    }

    #[test]
    fn test_lut_lookup_matches_raw_index() {
        let spec = WindowSpec::new(100.0, 150.0, 8, Rgb::new(10, 20, 30));
        let lut = build_window_lut(&spec, LutDomain::Word).unwrap();
        let params = FragmentParams {
            use_lut: true,
            ..FragmentParams::default()
        };

        for (value, expected) in [
            (99, Rgb::BLACK),
            (150, Rgb::gray(128)),
            (199, Rgb::gray(252)),
            (200, Rgb::WHITE),
            (256, Rgb::new(10, 20, 30)),
            (65535, Rgb::new(10, 20, 30)),
        ] {
            let out = map_pixel(Sample::packed(value), &params, Some(&lut));
            assert_eq!(out.to_rgba8(), [expected.r, expected.g, expected.b, 255], "value {value}");
        }
    }

    #[test]
    fn test_lut_after_window() {
        let lut = ColorLut::new(vec![Rgb::new(0, 0, 255), Rgb::new(255, 0, 0)]);
        let params = FragmentParams {
            use_lut: true,
            ..windowed(0.0, 1000.0)
        };
        assert_eq!(map_pixel(Sample::packed(100), &params, Some(&lut)).to_rgba8(), [0, 0, 255, 255]);
        assert_eq!(map_pixel(Sample::packed(900), &params, Some(&lut)).to_rgba8(), [255, 0, 0, 255]);
    }

    #[test]
    fn test_every_word_sample_hits_its_own_entry() {
        let entries = (0..=u16::MAX)
            .map(|v| Rgb::new((v >> 8) as u8, v as u8, 0))
            .collect();
        let lut = ColorLut::new(entries);
        let params = FragmentParams {
            use_lut: true,
            ..FragmentParams::default()
        };

        for v in 0..=u16::MAX {
            let out = map_pixel(Sample::packed(v), &params, Some(&lut)).to_rgba8();
            assert_eq!(out, [(v >> 8) as u8, v as u8, 0, 255], "sample {v}");
        }
    }

    #[test]
    fn test_lut_flag_without_table_is_gray() {
        let params = FragmentParams {
            use_lut: true,
            ..FragmentParams::default()
        };
        let out = map_pixel(Sample::packed(0), &params, None);
        assert_eq!(out, Rgba::opaque_gray(0.0));
    }
}
