use std::ops::{Add, Mul, Neg, Sub};

macro_rules! vec_common_impl {
    ($v:ident, $($e:ident),*) => {
        impl $v {
            pub const ZERO: $v = $v { $($e: 0.0),* };

            #[inline]
            pub fn dot(self, rhs: $v) -> f32 {
                0.0 $(+ self.$e * rhs.$e)*
            }

            /// Element-wise (Hadamard) product. This is the deliberate
            /// vector-times-vector convention of the kernel; it is not a dot
            /// product.
            #[inline]
            pub fn hadamard(self, rhs: $v) -> $v {
                $v { $($e: self.$e * rhs.$e),* }
            }

            #[inline]
            pub fn length(self) -> f32 {
                self.dot(self).sqrt()
            }

            /// Unit-length copy, or `None` when the vector is too short to
            /// normalize without blowing up.
            #[inline]
            pub fn try_normalize(self) -> Option<$v> {
                let len = self.length();
                if len < 1e-8 {
                    return None;
                }
                Some($v { $($e: self.$e / len),* })
            }

            /// Unit-length copy. Returns the zero vector unchanged instead of
            /// producing non-finite components.
            #[inline]
            pub fn normalize(self) -> $v {
                self.try_normalize().unwrap_or(self)
            }

            /// Linear interpolation: `(1 - s) * self + s * rhs`.
            #[inline]
            pub fn lerp(self, rhs: $v, s: f32) -> $v {
                $v { $($e: (1.0 - s) * self.$e + s * rhs.$e),* }
            }

            #[inline]
            pub fn approx_eq(self, rhs: $v, tolerance: f32) -> bool {
                true $(&& (self.$e - rhs.$e).abs() <= tolerance)*
            }
        }

        impl Add for $v {
            type Output = $v;

            #[inline]
            fn add(self, rhs: $v) -> $v {
                $v { $($e: self.$e + rhs.$e),* }
            }
        }

        impl Sub for $v {
            type Output = $v;

            #[inline]
            fn sub(self, rhs: $v) -> $v {
                $v { $($e: self.$e - rhs.$e),* }
            }
        }

        impl Neg for $v {
            type Output = $v;

            #[inline]
            fn neg(self) -> $v {
                $v { $($e: -self.$e),* }
            }
        }

        impl Mul<f32> for $v {
            type Output = $v;

            #[inline]
            fn mul(self, s: f32) -> $v {
                $v { $($e: self.$e * s),* }
            }
        }

        impl Mul<$v> for f32 {
            type Output = $v;

            #[inline]
            fn mul(self, v: $v) -> $v {
                v * self
            }
        }
    };
}

/// 2-component vector (UV coordinates, 2D positions).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// 3-component vector (positions, directions, axes).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 4-component homogeneous vector.
///
/// Use [`Vec4::point`] (w = 1) for positions and [`Vec4::direction`] (w = 0)
/// for directions so translation applies to the former and not the latter.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vec4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

vec_common_impl!(Vec2, x, y);
vec_common_impl!(Vec3, x, y, z);
vec_common_impl!(Vec4, x, y, z, w);

impl Vec2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl Vec3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub fn cross(self, rhs: Vec3) -> Vec3 {
        Vec3 {
            x: self.y * rhs.z - self.z * rhs.y,
            y: self.z * rhs.x - self.x * rhs.z,
            z: self.x * rhs.y - self.y * rhs.x,
        }
    }
}

impl Vec4 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Homogeneous point: w = 1, so translation matrices move it.
    #[inline]
    pub const fn point(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
            w: 1.0,
        }
    }

    /// Homogeneous direction: w = 0, immune to translation.
    #[inline]
    pub const fn direction(v: Vec3) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
            w: 0.0,
        }
    }

    /// Drops the homogeneous component.
    #[inline]
    pub const fn truncate(self) -> Vec3 {
        Vec3 {
            x: self.x,
            y: self.y,
            z: self.z,
        }
    }

    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl From<[f32; 4]> for Vec4 {
    #[inline]
    fn from(a: [f32; 4]) -> Self {
        Self::new(a[0], a[1], a[2], a[3])
    }
}

impl From<[f32; 3]> for Vec3 {
    #[inline]
    fn from(a: [f32; 3]) -> Self {
        Self::new(a[0], a[1], a[2])
    }
}
