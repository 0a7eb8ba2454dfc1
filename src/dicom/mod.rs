//! Monochrome DICOM loading
//!
//! Opens a DICOM file and turns its first frame into an [`Image`] the color
//! adjuster can bind, together with the window the file recommends.

mod parser;
mod photometric;
mod pixel_data;
#[cfg(test)]
pub(crate) mod test_support;
mod validation;

pub use parser::{PixelLayout, Rescale, WindowLevel};
pub use photometric::PhotometricInterpretation;

use crate::types::Image;
use anyhow::{Context, Result};
use dicom::dictionary_std::tags;
use dicom::object::{FileDicomObject, InMemDicomObject, StandardDataDictionary, open_file};
use std::path::Path;
use tracing::{debug, warn};

pub type DicomFile = FileDicomObject<InMemDicomObject<StandardDataDictionary>>;

/// Open and parse a DICOM file
pub fn open_dicom_file(file_path: &Path) -> Result<DicomFile> {
    open_file(file_path)
        .with_context(|| format!("Failed to open DICOM file: {}", file_path.display()))
}

/// A decoded grayscale frame and the header values needed to display it
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub image: Image,
    pub photometric: PhotometricInterpretation,
    pub layout: PixelLayout,
    pub rescale: Rescale,
    /// Window from the header, already converted to sample units
    pub file_window: Option<WindowLevel>,
    pub modality: Option<String>,
}

impl LoadedImage {
    /// The header window, or one spanning the actual sample range
    #[must_use]
    pub fn default_window(&self) -> WindowLevel {
        self.file_window
            .unwrap_or_else(|| sample_range_window(self.image.samples()))
    }

    /// Convert a window given in output units to the image's sample units
    #[must_use]
    pub fn to_sample_units(&self, window: WindowLevel) -> WindowLevel {
        let center = self.rescale.invert(window.center) + self.layout.sign_offset();

        WindowLevel {
            width: window.width / self.rescale.slope.abs(),
            center: if self.photometric.should_invert() {
                f64::from(self.layout.max_stored()) - center
            } else {
                center
            },
        }
    }

    /// Convert a value in sample units back to output units
    #[must_use]
    pub fn to_output_units(&self, sample: f64) -> f64 {
        let stored = if self.photometric.should_invert() {
            f64::from(self.layout.max_stored()) - sample
        } else {
            sample
        };
        self.rescale.apply(stored - self.layout.sign_offset())
    }

    /// Stored bits of the source, the natural valid-bits limit
    #[must_use]
    pub fn valid_bits(&self) -> u8 {
        u8::try_from(self.layout.bits_stored).unwrap_or(16)
    }
}

/// Decode the first frame of a monochrome image
pub fn load_image(obj: &DicomFile) -> Result<LoadedImage> {
    let dimensions = parser::extract_dimensions(obj)?;
    let layout = parser::extract_pixel_layout(obj)?;
    let rescale = parser::extract_rescale(obj);
    let samples_per_pixel = parser::extract_samples_per_pixel(obj);
    let number_of_frames = parser::extract_number_of_frames(obj);

    let photometric = obj
        .get(tags::PHOTOMETRIC_INTERPRETATION)
        .and_then(|e| e.value().to_str().ok())
        .and_then(|s| s.parse::<PhotometricInterpretation>().ok())
        .unwrap_or(PhotometricInterpretation::Monochrome2);

    validation::validate_photometric_samples(&photometric, samples_per_pixel)?;
    validation::validate_layout(&layout)?;

    if number_of_frames > 1 {
        warn!(frames = number_of_frames, "Multi-frame image, showing the first frame only");
    }

    let invert = photometric.should_invert();
    let samples = pixel_data::extract_samples(obj, dimensions, &layout, invert)?;
    let image = Image::new(
        samples,
        dimensions.width,
        dimensions.height,
        image_bits(layout.bits_stored),
    )
    .context("Decoded frame is not a displayable image")?;

    debug!(
        dimensions = %dimensions,
        layout = %layout,
        photometric = %photometric,
        "Loaded DICOM frame"
    );

    let mut loaded = LoadedImage {
        image,
        photometric,
        layout,
        rescale,
        file_window: None,
        modality: parser::extract_modality(obj),
    };
    loaded.file_window = parser::extract_window(obj).map(|window| loaded.to_sample_units(window));

    Ok(loaded)
}

/// Smallest supported display depth holding `bits_stored` bits
#[inline]
fn image_bits(bits_stored: u16) -> u16 {
    match bits_stored {
        0..=8 => 8,
        9..=12 => 12,
        _ => 16,
    }
}

fn sample_range_window(samples: &[u16]) -> WindowLevel {
    let min = samples.iter().copied().min().unwrap_or(0);
    let max = samples.iter().copied().max().unwrap_or(0);
    let width = f64::from(max - min).max(1.0);

    WindowLevel {
        width,
        center: f64::from(min) + width / 2.0,
    }
}
