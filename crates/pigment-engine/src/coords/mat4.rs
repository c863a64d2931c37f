use core::ops::Mul;

use bytemuck::{Pod, Zeroable};

use super::Vec2;

/// Column-major 4x4 matrix.
///
/// `cols[c][r]` addresses column `c`, row `r`. The memory layout is what a WGSL
/// `mat4x4<f32>` uniform expects, so the matrix can be uploaded with
/// `bytemuck::bytes_of` without reordering.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Mat4 = Mat4 {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    #[inline]
    pub const fn from_scale(x: f32, y: f32, z: f32) -> Self {
        Self {
            cols: [
                [x, 0.0, 0.0, 0.0],
                [0.0, y, 0.0, 0.0],
                [0.0, 0.0, z, 0.0],
                [0.0, 0.0, 0.0, 1.0],
            ],
        }
    }

    #[inline]
    pub const fn from_translation(x: f32, y: f32, z: f32) -> Self {
        Self {
            cols: [
                [1.0, 0.0, 0.0, 0.0],
                [0.0, 1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0, 0.0],
                [x, y, z, 1.0],
            ],
        }
    }

    /// Diagonal X entry (the X scale factor for affine 2D transforms).
    #[inline]
    pub fn x_scale(&self) -> f32 {
        self.cols[0][0]
    }

    /// Diagonal Y entry.
    #[inline]
    pub fn y_scale(&self) -> f32 {
        self.cols[1][1]
    }

    /// Translation column as `(x, y)`.
    #[inline]
    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.cols[3][0], self.cols[3][1])
    }

    /// Transforms the point `(p.x, p.y, 0, 1)` and returns the resulting `(x, y)`
    /// after the perspective divide.
    pub fn transform_point2(&self, p: Vec2) -> Vec2 {
        let c = &self.cols;
        let x = c[0][0] * p.x + c[1][0] * p.y + c[3][0];
        let y = c[0][1] * p.x + c[1][1] * p.y + c[3][1];
        let w = c[0][3] * p.x + c[1][3] * p.y + c[3][3];
        if w == 0.0 || w == 1.0 {
            Vec2::new(x, y)
        } else {
            Vec2::new(x / w, y / w)
        }
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (c, col) in out.iter_mut().enumerate() {
            for (r, cell) in col.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.cols[k][r] * rhs.cols[c][k]).sum();
            }
        }
        Mat4 { cols: out }
    }
}
