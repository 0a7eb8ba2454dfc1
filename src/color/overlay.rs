//! Overlay alpha compositing

use crate::types::Rgba;

/// How overlay brightness is derived for auto-alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrightnessMode {
    /// Mean of the three channels
    #[default]
    Average,
    /// Channel sum clamped to 1; any moderately bright pixel saturates
    Sum,
}

#[inline]
#[must_use]
pub fn brightness(color: Rgba, mode: BrightnessMode) -> f32 {
    let sum = color.r + color.g + color.b;
    let value = match mode {
        BrightnessMode::Average => sum / 3.0,
        BrightnessMode::Sum => sum,
    };
    value.clamp(0.0, 1.0)
}

/// Opacity the overlay pixel is blended with
#[inline]
#[must_use]
pub fn effective_alpha(
    overlay: Rgba,
    global_alpha: f32,
    auto_alpha: bool,
    mode: BrightnessMode,
) -> f32 {
    let alpha = overlay.a * global_alpha;
    if auto_alpha {
        alpha * brightness(overlay, mode)
    } else {
        alpha
    }
}

/// Blend `overlay` over an already mapped `base`; the result is opaque
#[must_use]
pub fn composite(
    base: Rgba,
    overlay: Rgba,
    global_alpha: f32,
    auto_alpha: bool,
    mode: BrightnessMode,
) -> Rgba {
    let alpha = effective_alpha(overlay, global_alpha, auto_alpha, mode);
    let keep = 1.0 - alpha;

    Rgba::new(
        base.r * keep + overlay.r * alpha,
        base.g * keep + overlay.g * alpha,
        base.b * keep + overlay.b * alpha,
        1.0,
    )
}
