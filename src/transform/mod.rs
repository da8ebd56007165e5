//! Vector/matrix transform kernel.
//!
//! A small, self-contained linear-algebra layer for scene transforms: fixed
//! size vectors and square matrices plus the handful of constructions a
//! real-time renderer needs (translate, scale, axis and general rotations,
//! look-at, perspective, transpose/determinant/inverse up to 4x4).
//!
//! Conventions:
//! - all values are `f32` and passed by copy; every operation returns a new
//!   value, nothing is mutated in place
//! - matrices are stored row-major and multiply column vectors (`M * v`);
//!   use [`Mat4::to_columns_2d`] to get the column-major layout GPU uniform
//!   blocks expect
//! - angles are taken in degrees and converted internally
//! - dimension mismatches are unrepresentable: `Vec3` vs `Vec4` and
//!   `Mat3` vs `Mat4` are distinct types, so shape errors are caught by the
//!   compiler instead of a runtime tag check

mod mat;
mod vec;

pub use mat::{Mat2, Mat3, Mat4};
pub use vec::{Vec2, Vec3, Vec4};

pub use mat::{
    look_at, normal_matrix, ortho, perspective, rotate, rotate_x, rotate_y, rotate_z, scalem,
    scalem_vec, translate, translate_vec,
};

/// Degrees to radians.
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * std::f32::consts::PI / 180.0
}
