//! Window/level ramps and the LUT generator built on them

use super::{ColorLut, LutDomain};
use crate::error::{AdjustError, Result};
use crate::types::Rgb;

/// Shape of the ramp between the window edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowMode {
    /// Straight line from black at the lower edge to white at the upper edge
    #[default]
    Linear,
    /// Hermite S-curve across the same edges
    Smoothstep,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowSpec {
    pub width: f64,
    pub center: f64,
    pub valid_bits: u8,
    pub invalid_color: Rgb,
    pub mode: WindowMode,
}

impl WindowSpec {
    #[must_use]
    pub fn new(width: f64, center: f64, valid_bits: u8, invalid_color: Rgb) -> Self {
        Self {
            width,
            center,
            valid_bits,
            invalid_color,
            mode: WindowMode::default(),
        }
    }

    #[must_use]
    pub fn with_mode(self, mode: WindowMode) -> Self {
        Self { mode, ..self }
    }

    /// # Errors
    ///
    /// `InvalidWindow` for a non-positive or non-finite width or a non-finite
    /// center, `InvalidValidBits` outside 1..=16
    pub fn validate(&self) -> Result<()> {
        if !(self.width.is_finite() && self.center.is_finite()) || self.width <= 0.0 {
            return Err(AdjustError::InvalidWindow {
                width: self.width,
                center: self.center,
            });
        }

        if !(1..=16).contains(&self.valid_bits) {
            return Err(AdjustError::InvalidValidBits(self.valid_bits));
        }

        Ok(())
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> f64 {
        self.center - self.width / 2.0
    }

    #[inline]
    #[must_use]
    pub fn range(&self) -> WindowRange {
        WindowRange::new(
            self.start() as f32,
            (self.center + self.width / 2.0) as f32,
        )
    }

    /// First index rendered with `invalid_color`
    #[inline]
    #[must_use]
    pub fn valid_limit(&self) -> usize {
        1usize
            .checked_shl(u32::from(self.valid_bits))
            .unwrap_or(usize::MAX)
    }

    /// Gray level for intensity `x`, ignoring the valid-bits cutoff
    #[must_use]
    pub fn level(&self, x: f64) -> u8 {
        let start = self.start();
        let end = start + self.width;

        if x < start {
            0
        } else if x >= end {
            255
        } else {
            let level = match self.mode {
                WindowMode::Linear => (x - start) * 255.0 / self.width,
                WindowMode::Smoothstep => 255.0 * smoothstep(start, end, x),
            };
            level.round().clamp(0.0, 255.0) as u8
        }
    }
}

/// Window edges in intensity units, used for per-fragment windowing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowRange {
    pub begin: f32,
    pub end: f32,
}

impl WindowRange {
    #[must_use]
    pub fn new(begin: f32, end: f32) -> Self {
        Self { begin, end }
    }

    /// A collapsed or inverted window falls back to fixed normalization
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.end > self.begin
    }

    /// Map an intensity into [0, 1]
    #[inline]
    #[must_use]
    pub fn normalize(&self, value: f32, mode: WindowMode) -> f32 {
        match mode {
            WindowMode::Linear => ((value - self.begin) / (self.end - self.begin)).clamp(0.0, 1.0),
            WindowMode::Smoothstep => {
                let t = ((value - self.begin) / (self.end - self.begin)).clamp(0.0, 1.0);
                t * t * (3.0 - 2.0 * t)
            }
        }
    }
}

#[inline]
#[must_use]
pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Build a table covering `domain` from a window
///
/// Indices below the window are black, inside it follow the ramp, above it
/// are white. Indices at or beyond `2^valid_bits` take `invalid_color`.
///
/// # Errors
///
/// Propagates [`WindowSpec::validate`] failures
pub fn build_window_lut(spec: &WindowSpec, domain: LutDomain) -> Result<ColorLut> {
    spec.validate()?;

    let valid_limit = spec.valid_limit();
    let entries = (0..domain.len())
        .map(|i| {
            if i >= valid_limit {
                spec.invalid_color
            } else {
                Rgb::gray(spec.level(i as f64))
            }
        })
        .collect();

    Ok(ColorLut::new(entries))
}
