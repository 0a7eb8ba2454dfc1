use crate::cli::Args;
use crate::dicom::{LoadedImage, WindowLevel};
use anyhow::{Context, Result, anyhow};
use image::{DynamicImage, RgbaImage};
use std::io::{IsTerminal, Write};
use std::path::Path;
use viuer::{Config as ViuerConfig, print};

/// Print a rendered frame to the terminal
pub fn print_frame(frame: RgbaImage, args: &Args) -> Result<()> {
    let is_tty = std::io::stdout().is_terminal();

    let (config_width, config_height) = match (args.width, args.height) {
        (Some(w), ..) => (Some(w), None),
        (None, Some(h)) => (None, Some(h)),
        (None, None) => (Some(24), None),
    };

    let config = ViuerConfig {
        width: config_width,
        height: config_height,
        absolute_offset: false,
        use_kitty: is_tty,
        use_iterm: is_tty,
        use_sixel: is_tty,
        ..Default::default()
    };

    std::io::stdout()
        .flush()
        .map_err(|e| anyhow!("Failed to flush stdout: {e}"))?;

    print(&DynamicImage::ImageRgba8(frame), &config)
        .map_err(|e| anyhow!("Failed to display image: {e}"))?;

    Ok(())
}

pub fn save_frame(frame: &RgbaImage, path: &Path) -> Result<()> {
    frame
        .save(path)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Verbose summary of what is about to be drawn
pub fn print_details(loaded: &LoadedImage, window: WindowLevel) {
    if let Some(modality) = &loaded.modality {
        println!("{:20}: {}", "Modality", modality);
    }
    println!(
        "{:20}: {} [{}]",
        "Dimensions",
        loaded.image.dimensions(),
        loaded.photometric
    );
    println!("{:20}: {}", "Pixel Layout", loaded.layout);
    println!("{:20}: {}", "Display Depth", loaded.image.bit_depth());

    let rescale = loaded.rescale;
    if rescale.slope != 1.0 || rescale.intercept != 0.0 {
        println!(
            "{:20}: slope {} intercept {}",
            "Rescale", rescale.slope, rescale.intercept
        );
    }

    let samples = loaded.image.samples();
    if let (Some(&lo), Some(&hi)) = (samples.iter().min(), samples.iter().max()) {
        let (a, b) = (
            loaded.to_output_units(f64::from(lo)),
            loaded.to_output_units(f64::from(hi)),
        );
        println!("{:20}: {} to {}", "Value Range", a.min(b), a.max(b));
    }

    let source = if loaded.file_window.is_some() {
        "file"
    } else {
        "sample range"
    };
    println!("{:20}: {} ({})", "Default Window", loaded.default_window(), source);
    println!("{:20}: {}", "Window", window);
    println!();
}
