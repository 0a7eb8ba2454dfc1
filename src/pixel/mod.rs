//! Two-channel packing of 16-bit samples
//!
//! A texel carries the low byte of a sample in its luminance channel and the
//! high byte in its alpha channel. Once a sampler normalizes both channels to
//! [0, 1] the intensity is recovered as `high * 65280 + low * 255`; 65280 is
//! 255 * 256, not 65536, because the high byte was divided by 255 too.

pub mod stored;

use crate::types::{BitDepth, Image};

/// Weight of the normalized high-byte channel
pub const HIGH_BYTE_SCALE: f32 = 65280.0;
/// Weight of the normalized low-byte channel
pub const LOW_BYTE_SCALE: f32 = 255.0;

/// Reconstruct an intensity in [0, 65535] from normalized channel values
#[inline(always)]
#[must_use]
pub fn decode16(high: f32, low: f32) -> f32 {
    high.mul_add(HIGH_BYTE_SCALE, low * LOW_BYTE_SCALE)
}

/// Split a sample into normalized `(high, low)` channel values
#[inline]
#[must_use]
pub fn encode16(value: u16) -> (f32, f32) {
    let [low, high] = value.to_le_bytes();
    (f32::from(high) / 255.0, f32::from(low) / 255.0)
}

/// Texel bytes `[low, high]` per sample, the luminance-alpha upload layout
#[must_use]
pub fn pack_luminance_alpha(samples: &[u16]) -> Vec<u8> {
    samples.iter().flat_map(|&v| v.to_le_bytes()).collect()
}

/// Texel bytes `[v, v, v]` per sample for 8-bit images uploaded as RGB
#[must_use]
pub fn pack_gray_rgb(samples: &[u16]) -> Vec<u8> {
    samples
        .iter()
        .flat_map(|&v| {
            let gray = v.min(255) as u8;
            [gray, gray, gray]
        })
        .collect()
}

/// Upload bytes for an image in the layout its bit depth calls for
#[must_use]
pub fn pack_image(image: &Image) -> Vec<u8> {
    match image.bit_depth() {
        BitDepth::Eight => pack_gray_rgb(image.samples()),
        BitDepth::Twelve | BitDepth::Sixteen => pack_luminance_alpha(image.samples()),
    }
}
