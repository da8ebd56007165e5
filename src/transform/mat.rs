use anyhow::{Result, bail};

use super::radians;
use super::vec::{Vec2, Vec3, Vec4};

macro_rules! mat_common_impl {
    ($m:ident, $v:ident, $n:literal) => {
        #[repr(C)]
        #[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
        pub struct $m {
            pub rows: [[f32; $n]; $n],
        }

        impl $m {
            /// Identity matrix.
            #[inline]
            pub fn identity() -> $m {
                $m::from_diagonal(1.0)
            }

            /// `d` on the diagonal, zero elsewhere.
            #[inline]
            pub fn from_diagonal(d: f32) -> $m {
                let mut rows = [[0.0; $n]; $n];
                for i in 0..$n {
                    rows[i][i] = d;
                }
                $m { rows }
            }

            #[inline]
            pub fn from_rows(rows: [$v; $n]) -> $m {
                let mut m = $m::identity();
                for i in 0..$n {
                    m.rows[i] = bytemuck::cast(rows[i]);
                }
                m
            }

            #[inline]
            pub fn row(&self, i: usize) -> $v {
                bytemuck::cast(self.rows[i])
            }

            #[inline]
            pub fn transpose(&self) -> $m {
                let mut m = $m { rows: [[0.0; $n]; $n] };
                for i in 0..$n {
                    for j in 0..$n {
                        m.rows[i][j] = self.rows[j][i];
                    }
                }
                m
            }

            #[inline]
            pub fn approx_eq(&self, rhs: &$m, tolerance: f32) -> bool {
                for i in 0..$n {
                    for j in 0..$n {
                        if (self.rows[i][j] - rhs.rows[i][j]).abs() > tolerance {
                            return false;
                        }
                    }
                }
                true
            }
        }

        impl Default for $m {
            fn default() -> Self {
                Self::identity()
            }
        }

        impl std::ops::Mul<$m> for $m {
            type Output = $m;

            /// Standard matrix product.
            fn mul(self, rhs: $m) -> $m {
                let mut m = $m { rows: [[0.0; $n]; $n] };
                for i in 0..$n {
                    for j in 0..$n {
                        let mut sum = 0.0;
                        for k in 0..$n {
                            sum += self.rows[i][k] * rhs.rows[k][j];
                        }
                        m.rows[i][j] = sum;
                    }
                }
                m
            }
        }

        impl std::ops::Mul<$v> for $m {
            type Output = $v;

            /// Linear map applied to a column vector.
            fn mul(self, rhs: $v) -> $v {
                let mut out = [0.0; $n];
                let v: [f32; $n] = bytemuck::cast(rhs);
                for i in 0..$n {
                    let mut sum = 0.0;
                    for j in 0..$n {
                        sum += self.rows[i][j] * v[j];
                    }
                    out[i] = sum;
                }
                bytemuck::cast(out)
            }
        }
    };
}

mat_common_impl!(Mat2, Vec2, 2);
mat_common_impl!(Mat3, Vec3, 3);
mat_common_impl!(Mat4, Vec4, 4);

// Determinant of a 3x3 given as rows, shared by Mat3 and the Mat4 cofactor
// expansion.
#[inline]
fn det3(m: &[[f32; 3]; 3]) -> f32 {
    m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
        - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
        + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
}

const SINGULAR_EPSILON: f32 = 1e-8;

impl Mat2 {
    #[inline]
    pub fn det(&self) -> f32 {
        let m = &self.rows;
        m[0][0] * m[1][1] - m[0][1] * m[1][0]
    }

    /// Inverse via the adjugate. Fails on (near-)singular input instead of
    /// returning non-finite entries.
    pub fn inverse(&self) -> Result<Mat2> {
        let d = self.det();
        if !d.is_finite() || d.abs() < SINGULAR_EPSILON {
            bail!("inverse of a singular 2x2 matrix (det = {d})");
        }
        let m = &self.rows;
        Ok(Mat2 {
            rows: [[m[1][1] / d, -m[0][1] / d], [-m[1][0] / d, m[0][0] / d]],
        })
    }
}

impl Mat3 {
    #[inline]
    pub fn det(&self) -> f32 {
        det3(&self.rows)
    }

    /// Cofactor-expansion inverse. Fails on (near-)singular input.
    pub fn inverse(&self) -> Result<Mat3> {
        let d = self.det();
        if !d.is_finite() || d.abs() < SINGULAR_EPSILON {
            bail!("inverse of a singular 3x3 matrix (det = {d})");
        }
        let m = &self.rows;
        let minor = |r: usize, c: usize| -> f32 {
            let mut sub = [[0.0; 2]; 2];
            let (mut si, mut sj);
            si = 0;
            for i in 0..3 {
                if i == r {
                    continue;
                }
                sj = 0;
                for j in 0..3 {
                    if j == c {
                        continue;
                    }
                    sub[si][sj] = m[i][j];
                    sj += 1;
                }
                si += 1;
            }
            sub[0][0] * sub[1][1] - sub[0][1] * sub[1][0]
        };
        let mut inv = Mat3 { rows: [[0.0; 3]; 3] };
        for i in 0..3 {
            for j in 0..3 {
                let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
                // Adjugate: transposed cofactor matrix.
                inv.rows[j][i] = sign * minor(i, j) / d;
            }
        }
        Ok(inv)
    }
}

impl Mat4 {
    #[inline]
    pub fn det(&self) -> f32 {
        let m = &self.rows;
        let mut d = 0.0;
        for c in 0..4 {
            let sign = if c % 2 == 0 { 1.0 } else { -1.0 };
            d += sign * m[0][c] * det3(&minor4(m, 0, c));
        }
        d
    }

    /// Cofactor-expansion inverse. Fails when `|det| < 1e-8` rather than
    /// silently producing `inf`/`NaN` entries.
    pub fn inverse(&self) -> Result<Mat4> {
        let d = self.det();
        if !d.is_finite() || d.abs() < SINGULAR_EPSILON {
            bail!("inverse of a singular 4x4 matrix (det = {d})");
        }
        let m = &self.rows;
        let mut inv = Mat4 { rows: [[0.0; 4]; 4] };
        for i in 0..4 {
            for j in 0..4 {
                let sign = if (i + j) % 2 == 0 { 1.0 } else { -1.0 };
                inv.rows[j][i] = sign * det3(&minor4(m, i, j)) / d;
            }
        }
        Ok(inv)
    }

    /// Upper-left 3x3 block.
    #[inline]
    pub fn truncate(&self) -> Mat3 {
        let mut m = Mat3::identity();
        for i in 0..3 {
            for j in 0..3 {
                m.rows[i][j] = self.rows[i][j];
            }
        }
        m
    }

    /// Column-major 2D array for GPU upload.
    ///
    /// Storage here is row-major while uniform blocks expect column-major
    /// mat4x4 data, so this is the mandatory transpose-before-flatten step of
    /// the shader contract.
    #[inline]
    pub fn to_columns_2d(&self) -> [[f32; 4]; 4] {
        self.transpose().rows
    }
}

fn minor4(m: &[[f32; 4]; 4], r: usize, c: usize) -> [[f32; 3]; 3] {
    let mut sub = [[0.0; 3]; 3];
    let mut si = 0;
    for i in 0..4 {
        if i == r {
            continue;
        }
        let mut sj = 0;
        for j in 0..4 {
            if j == c {
                continue;
            }
            sub[si][sj] = m[i][j];
            sj += 1;
        }
        si += 1;
    }
    sub
}

/// Identity with the translation column overwritten.
pub fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = Mat4::identity();
    m.rows[0][3] = x;
    m.rows[1][3] = y;
    m.rows[2][3] = z;
    m
}

pub fn translate_vec(v: Vec3) -> Mat4 {
    translate(v.x, v.y, v.z)
}

/// Identity with the diagonal scale factors overwritten.
pub fn scalem(x: f32, y: f32, z: f32) -> Mat4 {
    let mut m = Mat4::identity();
    m.rows[0][0] = x;
    m.rows[1][1] = y;
    m.rows[2][2] = z;
    m
}

pub fn scalem_vec(v: Vec3) -> Mat4 {
    scalem(v.x, v.y, v.z)
}

/// Rotation about the X axis, right-handed, angle in degrees.
pub fn rotate_x(theta_deg: f32) -> Mat4 {
    let (s, c) = radians(theta_deg).sin_cos();
    Mat4::from_rows([
        Vec4::new(1.0, 0.0, 0.0, 0.0),
        Vec4::new(0.0, c, -s, 0.0),
        Vec4::new(0.0, s, c, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    ])
}

/// Rotation about the Y axis, right-handed, angle in degrees.
pub fn rotate_y(theta_deg: f32) -> Mat4 {
    let (s, c) = radians(theta_deg).sin_cos();
    Mat4::from_rows([
        Vec4::new(c, 0.0, s, 0.0),
        Vec4::new(0.0, 1.0, 0.0, 0.0),
        Vec4::new(-s, 0.0, c, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    ])
}

/// Rotation about the Z axis, right-handed, angle in degrees.
pub fn rotate_z(theta_deg: f32) -> Mat4 {
    let (s, c) = radians(theta_deg).sin_cos();
    Mat4::from_rows([
        Vec4::new(c, -s, 0.0, 0.0),
        Vec4::new(s, c, 0.0, 0.0),
        Vec4::new(0.0, 0.0, 1.0, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    ])
}

/// General-axis rotation (Rodrigues' formula), angle in degrees. The axis is
/// normalized internally; a zero axis is an error.
pub fn rotate(angle_deg: f32, axis: Vec3) -> Result<Mat4> {
    let Some(v) = axis.try_normalize() else {
        bail!("rotate: axis has zero length");
    };
    let (x, y, z) = (v.x, v.y, v.z);
    let c = radians(angle_deg).cos();
    let s = radians(angle_deg).sin();
    let omc = 1.0 - c;
    Ok(Mat4::from_rows([
        Vec4::new(x * x * omc + c, x * y * omc - z * s, x * z * omc + y * s, 0.0),
        Vec4::new(x * y * omc + z * s, y * y * omc + c, y * z * omc - x * s, 0.0),
        Vec4::new(x * z * omc - y * s, y * z * omc + x * s, z * z * omc + c, 0.0),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    ]))
}

/// View matrix via Gram-Schmidt orthogonalization of the view direction and
/// `up`. `eye == at` has no defined view direction; the identity matrix is
/// returned for that case so callers never divide by zero.
pub fn look_at(eye: Vec3, at: Vec3, up: Vec3) -> Mat4 {
    if eye == at {
        return Mat4::identity();
    }
    let v = (at - eye).normalize();
    let n = v.cross(up).normalize();
    let u = n.cross(v).normalize();
    let v = -v;
    Mat4::from_rows([
        Vec4::new(n.x, n.y, n.z, -n.dot(eye)),
        Vec4::new(u.x, u.y, u.z, -u.dot(eye)),
        Vec4::new(v.x, v.y, v.z, -v.dot(eye)),
        Vec4::new(0.0, 0.0, 0.0, 1.0),
    ])
}

/// Symmetric-frustum perspective projection mapping the view volume to a
/// [0, 1] clip-space depth range (the WebGPU/wgpu convention, not OpenGL's
/// [-1, 1]). `fovy` is the vertical field of view in degrees.
pub fn perspective(fovy_deg: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    let f = 1.0 / (radians(fovy_deg) / 2.0).tan();
    let mut m = Mat4 { rows: [[0.0; 4]; 4] };
    m.rows[0][0] = f / aspect;
    m.rows[1][1] = f;
    m.rows[2][2] = far / (near - far);
    m.rows[2][3] = near * far / (near - far);
    m.rows[3][2] = -1.0;
    m
}

/// Orthographic projection with the same [0, 1] depth convention as
/// [`perspective`]. Coincident clip planes are an error.
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Result<Mat4> {
    if left == right {
        bail!("ortho: left and right are equal");
    }
    if bottom == top {
        bail!("ortho: bottom and top are equal");
    }
    if near == far {
        bail!("ortho: near and far are equal");
    }
    let mut m = Mat4::identity();
    m.rows[0][0] = 2.0 / (right - left);
    m.rows[1][1] = 2.0 / (top - bottom);
    m.rows[2][2] = 1.0 / (near - far);
    m.rows[0][3] = -(left + right) / (right - left);
    m.rows[1][3] = -(top + bottom) / (top - bottom);
    m.rows[2][3] = near / (near - far);
    Ok(m)
}

/// `inverse(transpose(M))` truncated to 3x3, for transforming normals
/// correctly under non-uniform scale. Fails when `M` is singular.
pub fn normal_matrix(m: &Mat4) -> Result<Mat3> {
    Ok(m.transpose().inverse()?.truncate())
}
