//! One file through the viewer: open, load, configure, render, display

use crate::adjuster::ColorAdjuster;
use crate::backend::SoftwareBackend;
use crate::cli::Args;
use crate::dicom::{self, LoadedImage, WindowLevel};
use crate::display;
use crate::types::OverlayImage;
use anyhow::{Context, Result, bail};
use image::RgbaImage;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

/// Failure of a single file, tagged with the stage that failed
#[derive(Error, Debug)]
pub enum ProcessError {
    /// Not readable as DICOM
    #[error("{0:#}")]
    OpenFailed(anyhow::Error),

    /// DICOM, but no displayable grayscale frame
    #[error("{0:#}")]
    LoadFailed(anyhow::Error),

    /// Window, color table or overlay rejected
    #[error("{0:#}")]
    ConfigurationFailed(anyhow::Error),

    #[error("{0:#}")]
    RenderFailed(anyhow::Error),

    /// Frame ready but could not be shown or written
    #[error("{0:#}")]
    DisplayFailed(anyhow::Error),
}

/// Process a single DICOM file
pub fn process_file(file_path: &Path, args: &Args) -> Result<(), ProcessError> {
    // Stage 1: Open DICOM file
    let obj = dicom::open_dicom_file(file_path).map_err(ProcessError::OpenFailed)?;

    // Stage 2: Decode the first frame
    let loaded = dicom::load_image(&obj).map_err(ProcessError::LoadFailed)?;

    let window = resolve_window(&loaded, args);
    if args.verbose {
        display::print_details(&loaded, window);
    }

    // Stage 3: Bind image, window, color table and overlay
    let adjuster = configure(&loaded, window, args).map_err(ProcessError::ConfigurationFailed)?;

    // Stage 4: Draw
    let frame = render(adjuster, args).map_err(ProcessError::RenderFailed)?;

    // Stage 5: Terminal or file
    match &args.output {
        Some(path) => {
            display::save_frame(&frame, path).map_err(ProcessError::DisplayFailed)?;
            info!(path = %path.display(), "Frame written");
        }
        None => display::print_frame(frame, args).map_err(ProcessError::DisplayFailed)?,
    }

    Ok(())
}

/// Window in sample units; command line values override the file's
#[must_use]
pub fn resolve_window(loaded: &LoadedImage, args: &Args) -> WindowLevel {
    let default = loaded.default_window();

    match (args.window_width, args.window_center) {
        (None, None) => default,
        (width, center) => {
            // Fill the missing half from the default, in output units
            let rescale = loaded.rescale;
            let requested = WindowLevel {
                width: width.unwrap_or(default.width * rescale.slope.abs()),
                center: center.unwrap_or_else(|| loaded.to_output_units(default.center)),
            };
            loaded.to_sample_units(requested)
        }
    }
}

fn configure(
    loaded: &LoadedImage,
    window: WindowLevel,
    args: &Args,
) -> Result<ColorAdjuster<SoftwareBackend>> {
    let frame_size = args
        .frame_size
        .unwrap_or_else(|| loaded.image.dimensions());
    let backend = SoftwareBackend::new(frame_size.width, frame_size.height);
    let mut adjuster = ColorAdjuster::new(backend, args.adjuster_config());

    adjuster
        .set_image(&loaded.image)
        .context("Failed to bind image")?;

    let valid_bits = args.valid_bits.unwrap_or_else(|| loaded.valid_bits());
    adjuster
        .set_window(window.width, window.center, valid_bits, args.invalid_color)
        .with_context(|| format!("Invalid window ({window})"))?;

    if let Some(path) = &args.color_table {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read color table: {}", path.display()))?;
        adjuster
            .set_color_table(&bytes)
            .with_context(|| format!("Invalid color table: {}", path.display()))?;
    }

    if let Some(path) = &args.overlay {
        let overlay = image::open(path)
            .with_context(|| format!("Failed to read overlay: {}", path.display()))?
            .to_rgba8();
        adjuster
            .set_overlay(
                Some(&OverlayImage::new(overlay)),
                true,
                args.auto_alpha,
                args.overlay_alpha,
            )
            .context("Failed to bind overlay")?;
    }

    if !args.zoom.is_finite() || args.zoom <= 0.0 {
        bail!("Zoom must be a positive number, got {}", args.zoom);
    }
    adjuster.set_scale(args.zoom);
    if let Some((x, y)) = args.pan {
        adjuster.set_translate(x, y);
    }

    debug!(frame = %frame_size, "Adjuster configured");
    Ok(adjuster)
}

fn render(mut adjuster: ColorAdjuster<SoftwareBackend>, args: &Args) -> Result<RgbaImage> {
    let (width, height) = adjuster.backend().frame().dimensions();
    if width == 0 || height == 0 {
        bail!("Nothing to render: empty {width}x{height} frame");
    }

    adjuster.clear();
    // Rows are stored top first, which is the inverted texture orientation
    adjuster.draw(!args.invert);

    Ok(adjuster.teardown().into_frame())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dicom::test_support::{build, words};
    use assert_matches::assert_matches;
    use clap::Parser;
    use std::path::PathBuf;

    fn write_test_file(dir: &Path) -> PathBuf {
        let obj = build(
            "MONOCHROME2",
            (2, 2),
            (16, 12, 11, 0),
            words(&[0, 1000, 2000, 4095]),
            vec![],
        );
        let path = dir.join("gradient.dcm");
        obj.write_to_file(&path).unwrap();
        path
    }

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["dcmwl"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_missing_file_fails_to_open() {
        let args = args(&["missing.dcm"]);
        let result = process_file(Path::new("missing.dcm"), &args);
        assert_matches!(result, Err(ProcessError::OpenFailed(_)));
    }

    #[test]
    fn test_non_dicom_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"not a dicom file").unwrap();

        let result = process_file(&path, &args(&[]));
        assert_matches!(result, Err(ProcessError::OpenFailed(_)));
    }

    #[test]
    fn test_render_windowed_frame_to_png() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_test_file(dir.path());
        let output = dir.path().join("frame.png");
        let args = args(&[
            "--window-width",
            "2000",
            "--window-center",
            "1000",
            "--output",
            output.to_str().unwrap(),
        ]);

        process_file(&input, &args).unwrap();

        let frame = image::open(&output).unwrap().to_rgba8();
        assert_eq!(frame.dimensions(), (2, 2));
        assert_eq!(frame.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(frame.get_pixel(1, 0).0, [128, 128, 128, 255]);
        assert_eq!(frame.get_pixel(0, 1).0, [255, 255, 255, 255]);
        assert_eq!(frame.get_pixel(1, 1).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_invalid_window_fails_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_test_file(dir.path());
        let output = dir.path().join("frame.png");
        let args = args(&["--window-width", "0", "--output", output.to_str().unwrap()]);

        let result = process_file(&input, &args);
        assert_matches!(result, Err(ProcessError::ConfigurationFailed(_)));
        assert!(!output.exists());
    }

    #[test]
    fn test_oversized_color_table_fails_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_test_file(dir.path());
        let table = dir.path().join("table.lut");
        std::fs::write(&table, vec![0u8; (65536 + 1) * 3]).unwrap();
        let args = args(&["--color-table", table.to_str().unwrap(), "--output", "unused.png"]);

        let result = process_file(&input, &args);
        assert_matches!(result, Err(ProcessError::ConfigurationFailed(_)));
    }

    #[test]
    fn test_partial_window_keeps_default_center() {
        let dir = tempfile::tempdir().unwrap();
        let obj = dicom::open_dicom_file(&write_test_file(dir.path())).unwrap();
        let loaded = dicom::load_image(&obj).unwrap();

        let window = resolve_window(&loaded, &args(&["--window-width", "100"]));
        assert_eq!(window.width, 100.0);
        assert_eq!(window.center, loaded.default_window().center);

        assert_eq!(resolve_window(&loaded, &args(&[])), loaded.default_window());
    }

    #[test]
    fn test_zero_zoom_fails_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_test_file(dir.path());

        let result = process_file(&input, &args(&["--zoom", "0", "--output", "unused.png"]));
        assert_matches!(result, Err(ProcessError::ConfigurationFailed(_)));
    }
}
