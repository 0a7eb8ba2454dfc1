pub mod adjuster;
pub mod backend;
pub mod cli;
pub mod color;
pub mod dicom;
pub mod display;
pub mod error;
pub mod logger;
pub mod lut;
pub mod pixel;
pub mod process;
pub mod transform;
pub mod types;

// Re-export commonly used items
pub use adjuster::{AdjusterConfig, ColorAdjuster, RenderState, StatePolicy, WindowPath};
pub use backend::{RenderBackend, SoftwareBackend};
pub use error::{AdjustError, Result};
pub use lut::ColorLut;
