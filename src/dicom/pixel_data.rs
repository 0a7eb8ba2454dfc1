//! DICOM pixel data extraction
//!
//! Produces the first frame as unsigned stored values: bits of interest
//! extracted, signed samples shifted to offset binary and MONOCHROME1
//! flipped so that larger always means brighter.

use super::{DicomFile, PixelLayout};
use crate::pixel::stored::{endian_value, stored_bits};
use crate::types::Dimensions;
use anyhow::{Context, Result, bail};
use dicom::dictionary_std::tags;
use dicom::pixeldata::PixelDecoder;

/// Decode the first frame into one `u16` per pixel
pub fn extract_samples(
    obj: &DicomFile,
    dimensions: Dimensions,
    layout: &PixelLayout,
    invert: bool,
) -> Result<Vec<u16>> {
    let little_endian = !is_big_endian(obj);
    let bytes = if layout.bits_allocated == 16 && !little_endian {
        raw_pixel_bytes(obj)?
    } else {
        obj.decode_pixel_data()
            .context("Failed to decode pixel data")?
            .data()
            .to_vec()
    };

    let count = dimensions.pixel_count();
    let bytes_per_sample = usize::from(layout.bits_allocated / 8);
    let needed = count * bytes_per_sample;
    if bytes.len() < needed {
        bail!(
            "Pixel data holds {} bytes, a {dimensions} frame needs {needed}",
            bytes.len()
        );
    }

    let sign_bit = if layout.signed {
        1u16 << (layout.bits_stored - 1)
    } else {
        0
    };
    let max = layout.max_stored();

    (0..count)
        .map(|i| {
            let raw = if bytes_per_sample == 1 {
                Some(u16::from(bytes[i]))
            } else {
                endian_value(&bytes, i * 2, little_endian)
            }?;

            let value = stored_bits(raw, layout.bits_stored, layout.high_bit) ^ sign_bit;
            Some(if invert { max - value } else { value })
        })
        .collect::<Option<Vec<u16>>>()
        .context("Truncated pixel data")
}

fn is_big_endian(obj: &DicomFile) -> bool {
    #[allow(deprecated)]
    use dicom::dictionary_std::uids::EXPLICIT_VR_BIG_ENDIAN;

    obj.meta().transfer_syntax().trim_end_matches('\0') == EXPLICIT_VR_BIG_ENDIAN
}

fn raw_pixel_bytes(obj: &DicomFile) -> Result<Vec<u8>> {
    let pixel_data = obj.get(tags::PIXEL_DATA).context("Missing pixel data")?;

    Ok(pixel_data
        .to_bytes()
        .context("Failed to get raw pixel data bytes")?
        .to_vec())
}
