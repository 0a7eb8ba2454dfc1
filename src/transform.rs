//! Column-major 4x4 matrices used to place the display quad
//!
//! Element `(row, col)` lives at index `col * 4 + row`, the layout graphics
//! APIs expect for uniform upload.

use std::ops::Mul;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mat4([f32; 16]);

impl Mat4 {
    pub const IDENTITY: Self = Self([
        1.0, 0.0, 0.0, 0.0, // column 1
        0.0, 1.0, 0.0, 0.0, // column 2
        0.0, 0.0, 1.0, 0.0, // column 3
        0.0, 0.0, 0.0, 1.0, // column 4 (translate)
    ]);

    #[must_use]
    pub const fn from_cols_array(m: [f32; 16]) -> Self {
        Self(m)
    }

    #[must_use]
    pub const fn to_cols_array(self) -> [f32; 16] {
        self.0
    }

    #[inline]
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.0[col * 4 + row]
    }

    /// Apply to a homogeneous column vector
    #[must_use]
    pub fn transform_point(&self, v: [f32; 4]) -> [f32; 4] {
        let m = &self.0;
        std::array::from_fn(|row| {
            m[row] * v[0] + m[4 + row] * v[1] + m[8 + row] * v[2] + m[12 + row] * v[3]
        })
    }
}

#[cfg(test)]
impl approx::AbsDiffEq for Mat4 {
    type Epsilon = f32;

    fn default_epsilon() -> f32 {
        f32::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .all(|(a, b)| (a - b).abs() <= epsilon)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        multiply(&self, &rhs)
    }
}

#[must_use]
pub fn identity() -> Mat4 {
    Mat4::IDENTITY
}

#[must_use]
pub fn scale(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4([
        x, 0.0, 0.0, 0.0, //
        0.0, y, 0.0, 0.0, //
        0.0, 0.0, z, 0.0, //
        0.0, 0.0, 0.0, 1.0,
    ])
}

#[must_use]
pub fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4([
        1.0, 0.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, 0.0, //
        0.0, 0.0, 1.0, 0.0, //
        x, y, z, 1.0,
    ])
}

/// Perspective projection for the viewing volume bounded by the given planes
///
/// Degenerate bounds (`left == right`, `z_near == z_far`, ...) divide by zero.
#[must_use]
pub fn frustum(left: f32, right: f32, bottom: f32, top: f32, z_near: f32, z_far: f32) -> Mat4 {
    let width = right - left;
    let height = top - bottom;
    let depth = z_far - z_near;

    Mat4([
        2.0 * z_near / width,
        0.0,
        0.0,
        0.0,
        //
        0.0,
        2.0 * z_near / height,
        0.0,
        0.0,
        //
        (right + left) / width,
        (top + bottom) / height,
        -(z_far + z_near) / depth,
        -1.0,
        //
        0.0,
        0.0,
        -2.0 * z_far * z_near / depth,
        0.0,
    ])
}

/// `a * b`: applying the result to `v` equals `a * (b * v)`
#[must_use]
pub fn multiply(a: &Mat4, b: &Mat4) -> Mat4 {
    let (a, b) = (&a.0, &b.0);
    let mut c = [0.0_f32; 16];

    for col in 0..4 {
        for row in 0..4 {
            c[col * 4 + row] = a[row] * b[col * 4]
                + a[4 + row] * b[col * 4 + 1]
                + a[8 + row] * b[col * 4 + 2]
                + a[12 + row] * b[col * 4 + 3];
        }
    }

    Mat4(c)
}

/// Near and far planes of the display view
pub const VIEW_Z_NEAR: f32 = 0.2;
pub const VIEW_Z_FAR: f32 = 10.0;
/// Half extent of the near plane; puts the quad at `QUAD_DEPTH` edge to edge
const VIEW_HALF_EXTENT: f32 = VIEW_Z_NEAR / -QUAD_DEPTH;

/// Projection under which the unit quad exactly fills the viewport at scale 1
#[must_use]
pub fn default_view() -> Mat4 {
    frustum(
        -VIEW_HALF_EXTENT,
        VIEW_HALF_EXTENT,
        -VIEW_HALF_EXTENT,
        VIEW_HALF_EXTENT,
        VIEW_Z_NEAR,
        VIEW_Z_FAR,
    )
}

/// Model matrix from the simple zoom/pan state plus an arbitrary user transform
///
/// Pan is in whole-quad units; the quad spans 2 in model space, hence the doubling.
#[must_use]
pub fn model_matrix(zoom: f32, pan_x: f32, pan_y: f32, user: &Mat4) -> Mat4 {
    translate(pan_x * 2.0, pan_y * 2.0, 0.0) * scale(zoom, zoom, 1.0) * *user
}

pub const QUAD_DEPTH: f32 = -0.5;

/// Quad corners in triangle-strip order: bottom left, top left, bottom right, top right
pub const QUAD_VERTICES: [[f32; 3]; 4] = [
    [-1.0, -1.0, QUAD_DEPTH],
    [-1.0, 1.0, QUAD_DEPTH],
    [1.0, -1.0, QUAD_DEPTH],
    [1.0, 1.0, QUAD_DEPTH],
];

pub const TEX_COORDS: [[f32; 2]; 4] = [[0.0, 0.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]];

pub const TEX_COORDS_INVERTED: [[f32; 2]; 4] = [[0.0, 1.0], [0.0, 0.0], [1.0, 1.0], [1.0, 0.0]];

#[must_use]
pub fn tex_coords(invert_vertical: bool) -> &'static [[f32; 2]; 4] {
    if invert_vertical {
        &TEX_COORDS_INVERTED
    } else {
        &TEX_COORDS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    /// Deterministic pseudo-random matrix (64-bit LCG)
    fn pseudo_random_matrix(seed: u64) -> Mat4 {
        let mut state = seed;
        Mat4(std::array::from_fn(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            ((state >> 40) as f32 / (1u64 << 24) as f32) * 20.0 - 10.0
        }))
    }

    #[test]
    fn test_identity_is_two_sided_unit() {
        for seed in 0..64 {
            let m = pseudo_random_matrix(seed);
            assert_abs_diff_eq!(multiply(&identity(), &m), m, epsilon = 1e-6);
            assert_abs_diff_eq!(multiply(&m, &identity()), m, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_scale_times_translate() {
        let product = scale(2.0, 3.0, 1.0) * translate(1.0, 1.0, 0.0);
        let expected = Mat4::from_cols_array([
            2.0, 0.0, 0.0, 0.0, //
            0.0, 3.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            2.0, 3.0, 0.0, 1.0,
        ]);
        assert_eq!(product, expected);
    }

    #[test]
    fn test_translate_times_scale() {
        let product = translate(1.0, 1.0, 0.0) * scale(2.0, 3.0, 1.0);
        let expected = Mat4::from_cols_array([
            2.0, 0.0, 0.0, 0.0, //
            0.0, 3.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            1.0, 1.0, 0.0, 1.0,
        ]);
        assert_eq!(product, expected);
    }

    #[test]
    fn test_product_applies_right_operand_first() {
        let a = pseudo_random_matrix(7);
        let b = pseudo_random_matrix(11);
        let v = [0.25, -1.5, 2.0, 1.0];

        let combined = (a * b).transform_point(v);
        let sequential = a.transform_point(b.transform_point(v));

        for (x, y) in combined.iter().zip(sequential.iter()) {
            assert_relative_eq!(x, y, epsilon = 1e-3, max_relative = 1e-5);
        }
    }

    #[test]
    fn test_frustum_closed_form() {
        let (z_near, z_far, width, height) = (0.2_f32, 10.0_f32, 0.2_f32, 0.2_f32);
        let m = frustum(
            -width / 2.0,
            width / 2.0,
            -height / 2.0,
            height / 2.0,
            z_near,
            z_far,
        );

        assert_relative_eq!(m.get(0, 0), z_near / (width / 2.0), epsilon = 1e-6);
        assert_relative_eq!(m.get(1, 1), z_near / (height / 2.0), epsilon = 1e-6);
        assert_relative_eq!(m.get(2, 2), -(z_far + z_near) / (z_far - z_near), epsilon = 1e-6);
        assert_relative_eq!(m.get(3, 2), -1.0);
        assert_relative_eq!(
            m.get(2, 3).abs(),
            2.0 * z_near * z_far / (z_far - z_near),
            epsilon = 1e-6
        );
        assert_relative_eq!(m.get(0, 2), 0.0);
        assert_relative_eq!(m.get(3, 3), 0.0);
    }

    #[test]
    fn test_default_view_fills_viewport() {
        let view = default_view();
        for (corner, expected) in QUAD_VERTICES.iter().zip([
            [-1.0, -1.0],
            [-1.0, 1.0],
            [1.0, -1.0],
            [1.0, 1.0],
        ]) {
            let clip = view.transform_point([corner[0], corner[1], corner[2], 1.0]);
            assert_relative_eq!(clip[0] / clip[3], expected[0], epsilon = 1e-5);
            assert_relative_eq!(clip[1] / clip[3], expected[1], epsilon = 1e-5);
        }
    }

    #[test]
    fn test_model_matrix_doubles_pan() {
        let model = model_matrix(0.5, 0.25, -0.5, &identity());
        let p = model.transform_point([1.0, 1.0, QUAD_DEPTH, 1.0]);
        assert_relative_eq!(p[0], 1.0);
        assert_relative_eq!(p[1], -0.5);
        assert_relative_eq!(p[2], QUAD_DEPTH);
    }
}
