//! CPU rasterizer for the display quad
//!
//! Projects the quad through `view * model`, covers it with two triangles and
//! evaluates the fragment stage for each pixel center inside. The surface is
//! opaque: every written pixel has alpha 255.

use super::{RenderBackend, TextureData, TextureSlot};
use crate::color::{FragmentParams, Sample, composite, map_pixel};
use crate::lut::ColorLut;
use crate::transform::{Mat4, QUAD_VERTICES, tex_coords};
use crate::types::Rgba;
use image::{Rgba as Pixel, RgbaImage};
use std::sync::Arc;
use tracing::{debug, warn};

const CLEAR_COLOR: Pixel<u8> = Pixel([0, 0, 0, 255]);

/// Projected quad corner: screen position, reciprocal depth and
/// texture coordinates pre-divided by clip w
#[derive(Debug, Clone, Copy)]
struct ScreenVertex {
    x: f32,
    y: f32,
    inv_w: f32,
    u_over_w: f32,
    v_over_w: f32,
}

#[derive(Debug)]
pub struct SoftwareBackend {
    frame: RgbaImage,
    base: Option<TextureData>,
    overlay: Option<TextureData>,
    lut: Option<Arc<ColorLut>>,
    model: Mat4,
    view: Mat4,
    blend: bool,
    params: FragmentParams,
}

impl SoftwareBackend {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            frame: RgbaImage::from_pixel(width, height, CLEAR_COLOR),
            base: None,
            overlay: None,
            lut: None,
            model: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            blend: false,
            params: FragmentParams::default(),
        }
    }

    #[must_use]
    pub fn frame(&self) -> &RgbaImage {
        &self.frame
    }

    #[must_use]
    pub fn into_frame(self) -> RgbaImage {
        self.frame
    }

    #[must_use]
    pub fn lut(&self) -> Option<&Arc<ColorLut>> {
        self.lut.as_ref()
    }

    fn texture(&self, slot: TextureSlot) -> Option<&TextureData> {
        match slot {
            TextureSlot::Base => self.base.as_ref(),
            TextureSlot::Overlay => self.overlay.as_ref(),
        }
    }

    fn project(&self, invert_vertical: bool) -> Option<[ScreenVertex; 4]> {
        let mvp = self.view * self.model;
        let (width, height) = (self.frame.width() as f32, self.frame.height() as f32);
        let coords = tex_coords(invert_vertical);

        let mut out = [ScreenVertex {
            x: 0.0,
            y: 0.0,
            inv_w: 0.0,
            u_over_w: 0.0,
            v_over_w: 0.0,
        }; 4];

        for ((vertex, tex), slot) in QUAD_VERTICES.iter().zip(coords.iter()).zip(out.iter_mut()) {
            let clip = mvp.transform_point([vertex[0], vertex[1], vertex[2], 1.0]);
            // Behind the eye; no clipping stage to rescue it
            if clip[3] <= f32::EPSILON {
                return None;
            }

            let inv_w = 1.0 / clip[3];
            let (ndc_x, ndc_y) = (clip[0] * inv_w, clip[1] * inv_w);
            *slot = ScreenVertex {
                x: (ndc_x + 1.0) * 0.5 * width,
                y: (1.0 - ndc_y) * 0.5 * height,
                inv_w,
                u_over_w: tex[0] * inv_w,
                v_over_w: tex[1] * inv_w,
            };
        }

        Some(out)
    }

    fn shade(&self, slot: TextureSlot, sample: Sample) -> Rgba {
        match (slot, sample) {
            (TextureSlot::Overlay, Sample::Color(color)) => color,
            _ => map_pixel(sample, &self.params, self.lut.as_deref()),
        }
    }
}

impl RenderBackend for SoftwareBackend {
    fn upload_image(&mut self, slot: TextureSlot, texture: TextureData) {
        debug!(
            ?slot,
            width = texture.width(),
            height = texture.height(),
            format = ?texture.format(),
            "Texture uploaded"
        );
        match slot {
            TextureSlot::Base => self.base = Some(texture),
            TextureSlot::Overlay => self.overlay = Some(texture),
        }
    }

    fn upload_lut(&mut self, lut: Arc<ColorLut>) {
        debug!(entries = lut.len(), "Color table uploaded");
        self.lut = Some(lut);
    }

    fn set_transform(&mut self, model: Mat4, view: Mat4) {
        self.model = model;
        self.view = view;
    }

    fn set_blend_mode(&mut self, enabled: bool) {
        self.blend = enabled;
    }

    fn set_fragment_params(&mut self, params: FragmentParams) {
        self.params = params;
    }

    fn clear(&mut self) {
        for pixel in self.frame.pixels_mut() {
            *pixel = CLEAR_COLOR;
        }
    }

    fn draw_quad(&mut self, slot: TextureSlot, invert_vertical: bool) {
        let Some(texture) = self.texture(slot) else {
            debug!(?slot, "Nothing bound, draw skipped");
            return;
        };
        let Some(corners) = self.project(invert_vertical) else {
            warn!(?slot, "Quad lies behind the viewer, draw skipped");
            return;
        };

        // Triangle strip order: (0, 1, 2) then (1, 3, 2)
        let triangles = [
            [corners[0], corners[1], corners[2]],
            [corners[1], corners[3], corners[2]],
        ];

        let min_x = corners.iter().map(|c| c.x).fold(f32::INFINITY, f32::min);
        let max_x = corners.iter().map(|c| c.x).fold(f32::NEG_INFINITY, f32::max);
        let min_y = corners.iter().map(|c| c.y).fold(f32::INFINITY, f32::min);
        let max_y = corners.iter().map(|c| c.y).fold(f32::NEG_INFINITY, f32::max);

        let (frame_w, frame_h) = (self.frame.width(), self.frame.height());
        let x0 = min_x.floor().max(0.0) as u32;
        let y0 = min_y.floor().max(0.0) as u32;
        let x1 = (max_x.ceil().max(0.0) as u32).min(frame_w);
        let y1 = (max_y.ceil().max(0.0) as u32).min(frame_h);

        let mut fragments = Vec::new();
        for y in y0..y1 {
            for x in x0..x1 {
                let (px, py) = (x as f32 + 0.5, y as f32 + 0.5);
                let Some((u, v)) = triangles.iter().find_map(|t| interpolate(t, px, py)) else {
                    continue;
                };
                if let Some(sample) = texture.fetch(u, v) {
                    fragments.push((x, y, self.shade(slot, sample)));
                }
            }
        }

        debug!(?slot, fragments = fragments.len(), blend = self.blend, "Quad drawn");

        let params = self.params;
        for (x, y, color) in fragments {
            let out = if self.blend {
                let dst = Rgba::from_rgba8(self.frame.get_pixel(x, y).0);
                composite(
                    dst,
                    color,
                    params.global_alpha,
                    params.auto_alpha,
                    params.brightness,
                )
            } else {
                color
            };
            let [r, g, b, _] = out.to_rgba8();
            self.frame.put_pixel(x, y, Pixel([r, g, b, 255]));
        }
    }
}

/// Perspective-correct texture coordinates at `(px, py)`, or `None` outside the triangle
fn interpolate(t: &[ScreenVertex; 3], px: f32, py: f32) -> Option<(f32, f32)> {
    let edge = |a: &ScreenVertex, b: &ScreenVertex| (b.x - a.x) * (py - a.y) - (b.y - a.y) * (px - a.x);

    let area = (t[1].x - t[0].x) * (t[2].y - t[0].y) - (t[1].y - t[0].y) * (t[2].x - t[0].x);
    if area.abs() <= f32::EPSILON {
        return None;
    }

    let w0 = edge(&t[1], &t[2]) / area;
    let w1 = edge(&t[2], &t[0]) / area;
    let w2 = edge(&t[0], &t[1]) / area;
    if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
        return None;
    }

    let inv_w = w0 * t[0].inv_w + w1 * t[1].inv_w + w2 * t[2].inv_w;
    let u = (w0 * t[0].u_over_w + w1 * t[1].u_over_w + w2 * t[2].u_over_w) / inv_w;
    let v = (w0 * t[0].v_over_w + w1 * t[1].v_over_w + w2 * t[2].v_over_w) / inv_w;
    Some((u, v))
}
