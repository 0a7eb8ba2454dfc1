use super::{PhotometricInterpretation, PixelLayout};
use anyhow::{Result, bail};

#[inline]
pub fn validate_photometric_samples(
    photometric_interpretation: &PhotometricInterpretation,
    samples_per_pixel: u16,
) -> Result<()> {
    if !photometric_interpretation.is_grayscale() {
        bail!("Unsupported photometric interpretation {photometric_interpretation} (expected MONOCHROME1 or MONOCHROME2)");
    }

    if samples_per_pixel != 1 {
        bail!(
            "Inconsistent photometric interpretation {photometric_interpretation} with samples per pixel {samples_per_pixel}"
        );
    }

    Ok(())
}

pub fn validate_layout(layout: &PixelLayout) -> Result<()> {
    if !matches!(layout.bits_allocated, 8 | 16) {
        bail!(
            "Unsupported bits allocated: {} (expected 8 or 16)",
            layout.bits_allocated
        );
    }

    if layout.bits_stored == 0 || layout.bits_stored > layout.bits_allocated {
        bail!(
            "Bits stored {} does not fit in bits allocated {}",
            layout.bits_stored,
            layout.bits_allocated
        );
    }

    if layout.high_bit >= layout.bits_allocated || layout.high_bit + 1 < layout.bits_stored {
        bail!(
            "High bit {} is inconsistent with {} stored bits",
            layout.high_bit,
            layout.bits_stored
        );
    }

    Ok(())
}
