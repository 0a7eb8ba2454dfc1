//! Color lookup tables
//!
//! A [`ColorLut`] maps an intensity index to an output RGB color. Its byte
//! layout is a flat `[R0, G0, B0, R1, G1, B1, ...]` sequence, three bytes per
//! entry, which is also the only persisted format the crate understands.

pub mod window;

pub use window::{WindowMode, WindowRange, WindowSpec, build_window_lut, smoothstep};

use crate::error::{AdjustError, Result};
use crate::types::{BitDepth, Rgb};

/// Largest table any bit depth can address
pub const MAX_LUT_ENTRIES: usize = 1 << 16;

/// Standard table lengths, one per sampling path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LutDomain {
    /// 256 entries, indexed by 8-bit samples
    Byte,
    /// 65536 entries, indexed by 12 and 16-bit samples
    Word,
}

impl LutDomain {
    #[inline]
    #[must_use]
    pub fn len(self) -> usize {
        match self {
            Self::Byte => 256,
            Self::Word => MAX_LUT_ENTRIES,
        }
    }

    #[must_use]
    pub fn for_bit_depth(bit_depth: BitDepth) -> Self {
        if bit_depth.is_packed() { Self::Word } else { Self::Byte }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorLut {
    entries: Vec<Rgb>,
}

impl ColorLut {
    #[must_use]
    pub fn new(entries: Vec<Rgb>) -> Self {
        Self { entries }
    }

    /// Identity gray ramp spread over the whole domain
    #[must_use]
    pub fn grayscale(domain: LutDomain) -> Self {
        let len = domain.len();
        let entries = (0..len)
            .map(|i| Rgb::gray(((i * 255 + (len - 1) / 2) / (len - 1)) as u8))
            .collect();
        Self { entries }
    }

    /// Parse the flat byte layout, rejecting tables beyond `capacity` entries
    ///
    /// # Errors
    ///
    /// `MalformedColorTable` if the length is zero or not a multiple of 3,
    /// `ColorTableTooLarge` if it holds more than `capacity` entries
    pub fn from_bytes(bytes: &[u8], capacity: usize) -> Result<Self> {
        if bytes.is_empty() || !bytes.len().is_multiple_of(3) {
            return Err(AdjustError::MalformedColorTable(bytes.len()));
        }

        let entries = bytes.len() / 3;
        if entries > capacity {
            return Err(AdjustError::ColorTableTooLarge { entries, capacity });
        }

        Ok(Self {
            entries: bytes
                .chunks_exact(3)
                .map(|c| Rgb::new(c[0], c[1], c[2]))
                .collect(),
        })
    }

    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        self.entries.iter().flat_map(|c| c.to_array()).collect()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn entries(&self) -> &[Rgb] {
        &self.entries
    }

    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Rgb> {
        self.entries.get(index).copied()
    }

    /// Entry selected by a normalized coordinate, as a nearest-filtered
    /// texture fetch would pick it. Out-of-range coordinates clamp to the
    /// first or last entry.
    #[inline]
    #[must_use]
    pub fn sample(&self, coord: f64) -> Option<Rgb> {
        let last = self.entries.len().checked_sub(1)?;
        let index = if coord.is_nan() {
            0
        } else {
            ((coord * self.entries.len() as f64).floor().max(0.0) as usize).min(last)
        };
        Some(self.entries[index])
    }
}
