//! Display context: render state, active color table and the backend
//!
//! A [`ColorAdjuster`] is created once per display surface and owns
//! everything the draws need. Window, table and overlay settings persist
//! across draws until changed, unless the context is configured with
//! [`StatePolicy::ResetAfterDraw`].

use crate::backend::{RenderBackend, TextureData, TextureFormat, TextureSlot};
use crate::color::{BrightnessMode, FragmentParams};
use crate::error::Result;
use crate::lut::{ColorLut, LutDomain, MAX_LUT_ENTRIES, WindowMode, WindowSpec, build_window_lut};
use crate::pixel::pack_image;
use crate::transform::{Mat4, default_view, model_matrix};
use crate::types::{BitDepth, Image, OverlayImage, Rgb};
use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Lifetime of the render flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatePolicy {
    /// Flags stay as set until explicitly changed
    #[default]
    Persistent,
    /// Window, table, alpha and zoom/pan are cleared after every draw
    ResetAfterDraw,
}

/// Where the window is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowPath {
    /// Bake the window into the color table; the table is indexed by raw intensity
    #[default]
    Table,
    /// Normalize through the window per fragment, then index any custom table
    Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdjusterConfig {
    pub window_mode: WindowMode,
    pub window_path: WindowPath,
    pub brightness: BrightnessMode,
    pub state_policy: StatePolicy,
    /// Largest color table accepted, in entries
    pub lut_capacity: usize,
    pub view: Mat4,
}

impl Default for AdjusterConfig {
    fn default() -> Self {
        Self {
            window_mode: WindowMode::default(),
            window_path: WindowPath::default(),
            brightness: BrightnessMode::default(),
            state_policy: StatePolicy::default(),
            lut_capacity: MAX_LUT_ENTRIES,
            view: default_view(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderState {
    pub use_window: bool,
    pub use_lut: bool,
    pub use_alpha: bool,
    pub auto_alpha: bool,
    pub invert_vertical: bool,
    pub global_alpha: f32,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            use_window: false,
            use_lut: false,
            use_alpha: false,
            auto_alpha: false,
            invert_vertical: false,
            global_alpha: 1.0,
        }
    }
}

#[derive(Debug)]
pub struct ColorAdjuster<B: RenderBackend> {
    backend: B,
    config: AdjusterConfig,
    state: RenderState,
    window: Option<WindowSpec>,
    lut: Option<Arc<ColorLut>>,
    /// Active table was generated from `window` rather than supplied
    lut_from_window: bool,
    domain: LutDomain,
    has_overlay: bool,
    zoom: f32,
    pan: (f32, f32),
    transform: Mat4,
}

impl<B: RenderBackend> ColorAdjuster<B> {
    #[must_use]
    pub fn new(backend: B, config: AdjusterConfig) -> Self {
        Self {
            backend,
            config,
            state: RenderState::default(),
            window: None,
            lut: None,
            lut_from_window: false,
            domain: LutDomain::Word,
            has_overlay: false,
            zoom: 1.0,
            pan: (0.0, 0.0),
            transform: Mat4::IDENTITY,
        }
    }

    /// Release the context, handing back the backend
    #[must_use]
    pub fn teardown(self) -> B {
        debug!("Color adjuster torn down");
        self.backend
    }

    /// Bind a grayscale base image
    ///
    /// 12 and 16-bit images upload as luminance-alpha texels, 8-bit images as
    /// RGB. A window set for a different bit depth is rebuilt for the new one.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the packed buffer does not match the image size
    pub fn set_image(&mut self, image: &Image) -> Result<()> {
        let format = match image.bit_depth() {
            BitDepth::Eight => TextureFormat::Rgb,
            BitDepth::Twelve | BitDepth::Sixteen => TextureFormat::LuminanceAlpha,
        };
        let texture = TextureData::new(image.width(), image.height(), format, pack_image(image))?;

        self.backend.upload_image(TextureSlot::Base, texture);
        info!(
            dimensions = %image.dimensions(),
            bit_depth = %image.bit_depth(),
            "Base image bound"
        );
        self.set_domain(LutDomain::for_bit_depth(image.bit_depth()))
    }

    /// Bind an 8-bit color base image; gray pixels are still windowed
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the buffer does not match the image size
    pub fn set_color_image(&mut self, image: &RgbaImage) -> Result<()> {
        let texture = TextureData::new(
            image.width(),
            image.height(),
            TextureFormat::Rgba,
            image.as_raw().clone(),
        )?;

        self.backend.upload_image(TextureSlot::Base, texture);
        info!(width = image.width(), height = image.height(), "Color base image bound");
        self.set_domain(LutDomain::Byte)
    }

    fn set_domain(&mut self, domain: LutDomain) -> Result<()> {
        if domain == self.domain {
            return Ok(());
        }
        self.domain = domain;

        if self.lut_from_window
            && let Some(spec) = self.window
        {
            self.publish(build_window_lut(&spec, domain)?);
        }

        Ok(())
    }

    /// Set the window from its width and center
    ///
    /// Samples at or above `2^valid_bits` render as `invalid_color` on the
    /// table path. On error nothing changes.
    ///
    /// # Errors
    ///
    /// `InvalidWindow` or `InvalidValidBits`
    pub fn set_window(
        &mut self,
        width: f64,
        center: f64,
        valid_bits: u8,
        invalid_color: Rgb,
    ) -> Result<()> {
        let spec = WindowSpec::new(width, center, valid_bits, invalid_color)
            .with_mode(self.config.window_mode);

        if let Err(e) = spec.validate() {
            warn!(width, center, valid_bits, "Window rejected: {e}");
            return Err(e);
        }

        match self.config.window_path {
            WindowPath::Table => {
                self.publish(build_window_lut(&spec, self.domain)?);
                self.lut_from_window = true;
                self.state.use_lut = true;
                self.state.use_window = false;
            }
            WindowPath::Fragment => {
                self.state.use_window = true;
            }
        }

        debug!(width, center, valid_bits, path = ?self.config.window_path, "Window set");
        self.window = Some(spec);
        Ok(())
    }

    /// Install a custom color table from its flat RGB byte layout
    ///
    /// # Errors
    ///
    /// `ColorTableTooLarge` beyond the configured capacity,
    /// `MalformedColorTable` for a partial entry; the previous table stays active
    pub fn set_color_table(&mut self, bytes: &[u8]) -> Result<()> {
        let lut = match ColorLut::from_bytes(bytes, self.config.lut_capacity) {
            Ok(lut) => lut,
            Err(e) => {
                warn!(bytes = bytes.len(), "Color table rejected: {e}");
                return Err(e);
            }
        };

        if lut.len() != self.domain.len() {
            debug!(
                entries = lut.len(),
                expected = self.domain.len(),
                "Color table length differs from the bound image's domain"
            );
        }

        self.publish(lut);
        self.lut_from_window = false;
        self.state.use_lut = true;
        Ok(())
    }

    /// Swap in a fully built table; holders of the old one keep it intact
    fn publish(&mut self, lut: ColorLut) {
        let lut = Arc::new(lut);
        self.backend.upload_lut(Arc::clone(&lut));
        self.lut = Some(lut);
    }

    /// Bind, replace or drop the overlay and set how it is blended
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the overlay buffer is inconsistent
    pub fn set_overlay(
        &mut self,
        image: Option<&OverlayImage>,
        enabled: bool,
        auto_alpha: bool,
        alpha: f32,
    ) -> Result<()> {
        match image {
            Some(overlay) => {
                let dims = overlay.dimensions();
                let texture = TextureData::new(
                    dims.width,
                    dims.height,
                    TextureFormat::Rgba,
                    overlay.as_raw().to_vec(),
                )?;
                self.backend.upload_image(TextureSlot::Overlay, texture);
                self.has_overlay = true;
                debug!(dimensions = %dims, "Overlay bound");
            }
            None => self.has_overlay = false,
        }

        self.state.use_alpha = enabled;
        self.set_alpha_values(alpha, auto_alpha);
        Ok(())
    }

    /// Enable overlay blending with a global factor and optional auto-alpha
    pub fn set_alpha(&mut self, global: f32, auto_alpha: bool) {
        self.state.use_alpha = true;
        self.set_alpha_values(global, auto_alpha);
    }

    fn set_alpha_values(&mut self, global: f32, auto_alpha: bool) {
        self.state.global_alpha = if global.is_nan() { 1.0 } else { global.clamp(0.0, 1.0) };
        self.state.auto_alpha = auto_alpha;
    }

    pub fn set_use_window(&mut self, enabled: bool) {
        self.state.use_window = enabled && self.window.is_some();
    }

    pub fn set_use_lut(&mut self, enabled: bool) {
        self.state.use_lut = enabled && self.lut.is_some();
    }

    pub fn set_use_alpha(&mut self, enabled: bool) {
        self.state.use_alpha = enabled;
    }

    pub fn set_scale(&mut self, zoom: f32) {
        self.zoom = zoom;
    }

    /// Pan in units of the image size; 1.0 moves by a whole image
    pub fn set_translate(&mut self, x: f32, y: f32) {
        self.pan = (x, y);
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
    }

    pub fn clear(&mut self) {
        self.backend.clear();
    }

    /// Draw the base image, then the overlay when blending is on
    pub fn draw(&mut self, invert_vertical: bool) {
        self.state.invert_vertical = invert_vertical;

        let model = model_matrix(self.zoom, self.pan.0, self.pan.1, &self.transform);
        self.backend.set_transform(model, self.config.view);

        self.backend.set_blend_mode(false);
        self.backend.set_fragment_params(self.base_params());
        self.backend.draw_quad(TextureSlot::Base, invert_vertical);

        if self.state.use_alpha && self.has_overlay {
            self.backend.set_blend_mode(true);
            self.backend.set_fragment_params(self.overlay_params());
            self.backend.draw_quad(TextureSlot::Overlay, invert_vertical);
        }

        debug!(state = ?self.state, "Frame drawn");

        if self.config.state_policy == StatePolicy::ResetAfterDraw {
            self.reset_after_draw();
        }
    }

    fn base_params(&self) -> FragmentParams {
        FragmentParams {
            window: self
                .window
                .filter(|_| self.state.use_window)
                .map(|spec| spec.range()),
            window_mode: self.config.window_mode,
            use_lut: self.state.use_lut,
            global_alpha: 1.0,
            auto_alpha: false,
            brightness: self.config.brightness,
        }
    }

    fn overlay_params(&self) -> FragmentParams {
        FragmentParams {
            window: None,
            window_mode: self.config.window_mode,
            use_lut: false,
            global_alpha: self.state.global_alpha,
            auto_alpha: self.state.auto_alpha,
            brightness: self.config.brightness,
        }
    }

    fn reset_after_draw(&mut self) {
        self.state.use_alpha = false;
        self.state.use_window = false;
        self.state.use_lut = false;
        self.zoom = 1.0;
        self.pan = (0.0, 0.0);
    }

    #[must_use]
    pub fn render_state(&self) -> &RenderState {
        &self.state
    }

    #[must_use]
    pub fn active_lut(&self) -> Option<&Arc<ColorLut>> {
        self.lut.as_ref()
    }

    #[must_use]
    pub fn window(&self) -> Option<&WindowSpec> {
        self.window.as_ref()
    }

    #[must_use]
    pub fn domain(&self) -> LutDomain {
        self.domain
    }

    #[must_use]
    pub fn config(&self) -> &AdjusterConfig {
        &self.config
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
