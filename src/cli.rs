use crate::adjuster::{AdjusterConfig, WindowPath};
use crate::color::BrightnessMode;
use crate::lut::WindowMode;
use crate::types::{Dimensions, Rgb};
use clap::Parser;
use std::path::PathBuf;

/// Window/level viewer for grayscale DICOM images
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// DICOM file path(s) to display
    #[arg(value_name = "FILE")]
    pub files: Vec<PathBuf>,

    /// Output width in terminal columns
    #[arg(short = 'W', long)]
    pub width: Option<u32>,

    /// Output height in terminal rows
    #[arg(short = 'H', long)]
    pub height: Option<u32>,

    /// Window width in output units (defaults to the file's window)
    #[arg(long, allow_hyphen_values = true)]
    pub window_width: Option<f64>,

    /// Window center in output units (defaults to the file's window)
    #[arg(long, allow_hyphen_values = true)]
    pub window_center: Option<f64>,

    /// Samples at or above 2^BITS are painted with the invalid color
    #[arg(long, value_name = "BITS", value_parser = clap::value_parser!(u8).range(1..=16))]
    pub valid_bits: Option<u8>,

    /// Color for samples beyond the valid bits
    #[arg(long, value_name = "R,G,B", default_value = "0,0,0")]
    pub invalid_color: Rgb,

    /// Smoothstep window instead of a linear ramp
    #[arg(long)]
    pub smooth: bool,

    /// Apply the window per pixel instead of baking it into the color table
    #[arg(long)]
    pub fragment_window: bool,

    /// Raw color table: consecutive R,G,B bytes, indexed by the windowed value
    #[arg(long, value_name = "PATH")]
    pub color_table: Option<PathBuf>,

    /// Color image blended over the base image
    #[arg(long, value_name = "PATH")]
    pub overlay: Option<PathBuf>,

    /// Overlay opacity in [0, 1]
    #[arg(long, value_name = "ALPHA", default_value_t = 1.0)]
    pub overlay_alpha: f32,

    /// Scale overlay opacity by overlay brightness
    #[arg(long)]
    pub auto_alpha: bool,

    /// Derive overlay brightness from the channel sum instead of the mean
    #[arg(long)]
    pub sum_brightness: bool,

    /// Flip texture coordinates vertically
    #[arg(long)]
    pub invert: bool,

    /// Zoom factor, 1 fills the frame
    #[arg(long, default_value_t = 1.0)]
    pub zoom: f32,

    /// Pan in image widths and heights, Y up
    #[arg(long, value_name = "X,Y", value_parser = parse_pan, allow_hyphen_values = true)]
    pub pan: Option<(f32, f32)>,

    /// Rendered frame size (defaults to the image size)
    #[arg(long, value_name = "WxH", value_parser = parse_frame_size)]
    pub frame_size: Option<Dimensions>,

    /// Write the rendered frame to a PNG instead of the terminal
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Show image details
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    #[must_use]
    pub fn adjuster_config(&self) -> AdjusterConfig {
        AdjusterConfig {
            window_mode: if self.smooth {
                WindowMode::Smoothstep
            } else {
                WindowMode::Linear
            },
            // A custom table is indexed after the window, so it needs the fragment path
            window_path: if self.fragment_window || self.color_table.is_some() {
                WindowPath::Fragment
            } else {
                WindowPath::Table
            },
            brightness: if self.sum_brightness {
                BrightnessMode::Sum
            } else {
                BrightnessMode::Average
            },
            ..AdjusterConfig::default()
        }
    }
}

fn parse_pan(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<f32>()
            .map_err(|e| format!("invalid pan component '{v}': {e}"))
    };
    Ok((parse(x)?, parse(y)?))
}

fn parse_frame_size(s: &str) -> Result<Dimensions, String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WxH, got '{s}'"))?;
    let parse = |v: &str| match v.trim().parse::<u32>() {
        Ok(0) => Err("frame size must be positive".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("invalid frame size '{v}': {e}")),
    };
    Ok(Dimensions::new(parse(w)?, parse(h)?))
}
