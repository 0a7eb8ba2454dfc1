use super::DicomFile;
use crate::pixel::stored::rescale;
use crate::types::Dimensions;
use anyhow::{Context, Result};
use dicom::dictionary_std::tags;
use std::fmt;

/// How samples are laid out in the Pixel Data element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelLayout {
    pub bits_allocated: u16,
    pub bits_stored: u16,
    pub high_bit: u16,
    /// Pixel Representation 1: two's complement samples
    pub signed: bool,
}

impl PixelLayout {
    /// Largest value representable in `bits_stored` bits
    #[inline]
    #[must_use]
    pub fn max_stored(&self) -> u16 {
        if self.bits_stored >= 16 {
            u16::MAX
        } else {
            (1u16 << self.bits_stored) - 1
        }
    }

    /// Offset added to signed samples to make them unsigned
    #[inline]
    #[must_use]
    pub fn sign_offset(&self) -> f64 {
        if self.signed {
            f64::from(1u32 << (self.bits_stored - 1))
        } else {
            0.0
        }
    }
}

impl fmt::Display for PixelLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} bits, high bit {}{}",
            self.bits_stored,
            self.bits_allocated,
            self.high_bit,
            if self.signed { ", signed" } else { "" }
        )
    }
}

/// Modality rescale to output units (Hounsfield units for CT)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rescale {
    pub slope: f64,
    pub intercept: f64,
}

impl Rescale {
    #[inline]
    #[must_use]
    pub fn apply(&self, stored: f64) -> f64 {
        rescale(stored, self.slope, self.intercept)
    }

    /// Output units back to stored units
    #[inline]
    #[must_use]
    pub fn invert(&self, value: f64) -> f64 {
        (value - self.intercept) / self.slope
    }
}

impl Default for Rescale {
    fn default() -> Self {
        Self {
            slope: 1.0,
            intercept: 0.0,
        }
    }
}

/// Window width and center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowLevel {
    pub width: f64,
    pub center: f64,
}

impl fmt::Display for WindowLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "W {:.1} / C {:.1}", self.width, self.center)
    }
}

pub fn extract_dimensions(obj: &DicomFile) -> Result<Dimensions> {
    let rows = obj
        .get(tags::ROWS)
        .and_then(|e| e.to_int::<u16>().ok())
        .context("Missing or invalid Rows tag")?;

    let cols = obj
        .get(tags::COLUMNS)
        .and_then(|e| e.to_int::<u16>().ok())
        .context("Missing or invalid Columns tag")?;

    Ok(Dimensions::new(u32::from(cols), u32::from(rows)))
}

pub fn extract_pixel_layout(obj: &DicomFile) -> Result<PixelLayout> {
    let bits_allocated = obj
        .get(tags::BITS_ALLOCATED)
        .and_then(|e| e.to_int::<u16>().ok())
        .context("Missing or invalid Bits Allocated tag")?;

    // Bits Stored and High Bit default to a fully used allocation
    let bits_stored = obj
        .get(tags::BITS_STORED)
        .and_then(|e| e.to_int::<u16>().ok())
        .unwrap_or(bits_allocated);

    let high_bit = obj
        .get(tags::HIGH_BIT)
        .and_then(|e| e.to_int::<u16>().ok())
        .unwrap_or_else(|| bits_stored.saturating_sub(1));

    let signed = obj
        .get(tags::PIXEL_REPRESENTATION)
        .and_then(|e| e.to_int::<u16>().ok())
        .is_some_and(|v| v == 1);

    Ok(PixelLayout {
        bits_allocated,
        bits_stored,
        high_bit,
        signed,
    })
}

pub fn extract_rescale(obj: &DicomFile) -> Rescale {
    // Present mostly on CT and PET
    let slope = obj
        .get(tags::RESCALE_SLOPE)
        .and_then(|e| e.to_float64().ok())
        .filter(|s| s.is_finite() && *s != 0.0)
        .unwrap_or(1.0);

    let intercept = obj
        .get(tags::RESCALE_INTERCEPT)
        .and_then(|e| e.to_float64().ok())
        .unwrap_or(0.0);

    Rescale { slope, intercept }
}

/// First Window Center / Window Width pair, in output units
pub fn extract_window(obj: &DicomFile) -> Option<WindowLevel> {
    let center = obj
        .get(tags::WINDOW_CENTER)
        .and_then(|e| e.to_float64().ok())?;

    let width = obj
        .get(tags::WINDOW_WIDTH)
        .and_then(|e| e.to_float64().ok())
        .filter(|w| *w > 0.0)?;

    Some(WindowLevel { width, center })
}

#[inline]
pub fn extract_samples_per_pixel(obj: &DicomFile) -> u16 {
    obj.get(tags::SAMPLES_PER_PIXEL)
        .and_then(|e| e.to_int::<u16>().ok())
        .unwrap_or(1)
}

#[inline]
pub fn extract_number_of_frames(obj: &DicomFile) -> u32 {
    obj.get(tags::NUMBER_OF_FRAMES)
        .and_then(|e| e.to_int::<u32>().ok())
        .unwrap_or(1)
}

pub fn extract_modality(obj: &DicomFile) -> Option<String> {
    obj.get(tags::MODALITY)
        .and_then(|e| e.value().to_str().ok())
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rescale_round_trip() {
        let ct = Rescale {
            slope: 1.0,
            intercept: -1024.0,
        };
        assert_relative_eq!(ct.apply(1024.0), 0.0);
        assert_relative_eq!(ct.invert(40.0), 1064.0);

        let scaled = Rescale {
            slope: 0.5,
            intercept: 10.0,
        };
        assert_relative_eq!(scaled.invert(scaled.apply(300.0)), 300.0);
    }

    #[test]
    fn test_layout_limits() {
        let layout = PixelLayout {
            bits_allocated: 16,
            bits_stored: 12,
            high_bit: 11,
            signed: true,
        };
        assert_eq!(layout.max_stored(), 4095);
        assert_relative_eq!(layout.sign_offset(), 2048.0);
        assert_eq!(layout.to_string(), "12/16 bits, high bit 11, signed");

        let full = PixelLayout {
            bits_stored: 16,
            high_bit: 15,
            signed: false,
            ..layout
        };
        assert_eq!(full.max_stored(), u16::MAX);
        assert_relative_eq!(full.sign_offset(), 0.0);
    }
}
