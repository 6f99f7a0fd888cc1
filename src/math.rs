//! Math type aliases and helper functions.
//!
//! All geometry math runs on f32. Vectors are nalgebra column vectors,
//! matrices are column-major; frames built by [`first_frame`]/[`next_frame`]
//! map local (x, y, 0, 1) cross-section coordinates into world space with
//! the local +Z axis following the curve tangent.

pub use nalgebra;

use nalgebra::UnitQuaternion;

/// 2D vector (f32).
pub type Vec2 = nalgebra::Vector2<f32>;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 4D vector (f32).
pub type Vec4 = nalgebra::Vector4<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Linear interpolation between two scalars.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Shortest-arc rotation taking `from` to `to`. Falls back to a half-turn
/// about an arbitrary perpendicular axis when the vectors are opposed.
pub fn rotation_between(from: &Vec3, to: &Vec3) -> UnitQuaternion<f32> {
    UnitQuaternion::rotation_between(from, to).unwrap_or_else(|| {
        let axis = perpendicular(from);
        UnitQuaternion::from_axis_angle(
            &nalgebra::Unit::new_normalize(axis),
            std::f32::consts::PI,
        )
    })
}

/// Any unit vector perpendicular to `v` (which need not be normalized).
pub fn perpendicular(v: &Vec3) -> Vec3 {
    let candidate = if v.x.abs() < v.y.abs() && v.x.abs() < v.z.abs() {
        Vec3::x()
    } else if v.y.abs() < v.z.abs() {
        Vec3::y()
    } else {
        Vec3::z()
    };
    v.cross(&candidate).normalize()
}

/// Initial parallel-transport frame at `p0`, oriented from the first three
/// samples of a curve.
pub fn first_frame(p0: Vec3, p1: Vec3, p2: Vec3) -> Mat4 {
    let tangent = (p1 - p0).normalize();
    let mut normal = tangent.cross(&(p2 - p0)).cross(&tangent);
    if normal.norm_squared() < 1.0e-12 {
        normal = perpendicular(&tangent);
    } else {
        normal.normalize_mut();
    }
    let binormal = tangent.cross(&normal);

    #[rustfmt::skip]
    let frame = Mat4::new(
        normal.x, binormal.x, tangent.x, p0.x,
        normal.y, binormal.y, tangent.y, p0.y,
        normal.z, binormal.z, tangent.z, p0.z,
        0.0,      0.0,        0.0,       1.0,
    );
    frame
}

/// Transport a frame from `prev_pos` to `cur_pos`, rotating it by the
/// minimal rotation carrying `prev_tan` onto `cur_tan`.
pub fn next_frame(prev: &Mat4, prev_pos: Vec3, cur_pos: Vec3, prev_tan: Vec3, cur_tan: Vec3) -> Mat4 {
    let rotation = if prev_tan.norm_squared() < 1.0e-12 || cur_tan.norm_squared() < 1.0e-12 {
        Mat4::identity()
    } else {
        rotation_between(&prev_tan, &cur_tan).to_homogeneous()
    };
    Mat4::new_translation(&cur_pos) * rotation * Mat4::new_translation(&-prev_pos) * prev
}

/// Axis-aligned bounding box, grown point by point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// An inverted box that any `include` call will snap onto.
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::INFINITY),
            max: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x
    }

    pub fn include(&mut self, point: Vec3) {
        self.min = self.min.inf(&point);
        self.max = self.max.sup(&point);
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}
