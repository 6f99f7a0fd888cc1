//! Primitive geometry generators.
//!
//! Every shape is a [`crate::source::Source`] with a consuming builder.
//! Setters that change vertex or index counts recompute the cached counts
//! immediately, so count queries stay O(1) without re-tessellating.

mod bspline;
mod capsule;
mod circle;
mod cube;
mod cylinder;
mod extrude;
mod icosahedron;
mod plane;
mod rect;
mod sphere;
mod teapot;
mod teapot_data;
mod torus;
mod wire;

pub use bspline::BSpline;
pub use capsule::Capsule;
pub use circle::{Circle, Ring};
pub use cube::Cube;
pub use cylinder::{Cone, Cylinder};
pub use extrude::{Extrude, ExtrudeSpline};
pub use icosahedron::{Icosahedron, Icosphere};
pub use plane::Plane;
pub use rect::{Rect, RoundedRect};
pub use sphere::Sphere;
pub use teapot::Teapot;
pub use torus::{Helix, Torus, TorusKnot};
pub use wire::{WireCircle, WireCube, WireIcosahedron, WirePlane, WireRect, WireSphere};

use crate::math::Vec3;

/// Map a unit vector into the RGB cube, the debug-color convention shared
/// by several generators.
pub(crate) fn normal_color(n: Vec3) -> Vec3 {
    n * 0.5 + Vec3::repeat(0.5)
}
