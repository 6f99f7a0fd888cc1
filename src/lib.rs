//! Procedural geometry pipeline.
//!
//! Geometry flows from a [`Source`] (a primitive generator or a replayable
//! [`MeshData`] buffer) into a [`Target`], optionally passing through a
//! chain of [`Modifier`]s composed with [`SourceMods`].
//!
//! # Features
//! - Primitive generators: rects, cubes, spheres, icospheres, tori, knots,
//!   cylinders, capsules, the Utah teapot, extrusions along lines and
//!   splines, and wireframe variants
//! - Attribute-polymorphic transfer: targets receive data at any
//!   dimensionality and topology, converting on the fly
//! - Composable modifiers: transforms, twists, wireframing, tangent
//!   generation, subdivision, per-attribute rewrites
//!
//! ```no_run
//! use procgeom::prelude::*;
//!
//! let geom = SourceMods::new(Sphere::new().with_radius(2.0))
//!     .with(Twist::new())
//!     .with(Lines::new());
//! let mut mesh = MeshData::new();
//! geom.load_into(&mut mesh, AttribSet::POSITION | AttribSet::NORMAL)?;
//! # Ok::<(), procgeom::GeomError>(())
//! ```

pub mod attrib;
pub mod buffer_layout;
pub mod error;
pub mod math;
pub mod mesh_data;
pub mod modifier;
pub mod shapes;
pub mod source;
pub mod spline;
pub mod triangulate;

pub use attrib::{Attrib, AttribSet, DataType, Primitive};
pub use buffer_layout::{AttribInfo, BufferLayout};
pub use error::{GeomError, Result};
pub use math::{Aabb, Mat3, Mat4, Vec2, Vec3, Vec4};
pub use mesh_data::MeshData;
pub use modifier::{
    AttribFn, AttribValue, Bounds, ColorFromAttrib, Constant, Invert, Lines, Modifier, Params,
    Remove, SourceMods, SourceModsContext, Subdivide, Tangents, Transform, Twist,
    VertexNormalLines,
};
pub use shapes::{
    BSpline, Capsule, Circle, Cone, Cube, Cylinder, Extrude, ExtrudeSpline, Helix, Icosahedron,
    Icosphere, Plane, Rect, Ring, RoundedRect, Sphere, Teapot, Torus, TorusKnot, WireCircle,
    WireCube, WireIcosahedron, WirePlane, WireRect, WireSphere,
};
pub use source::{Source, Target};
pub use spline::BSplineCurve;
pub use triangulate::Triangulator;

/// Everything needed for typical pipeline assembly.
pub mod prelude {
    pub use crate::attrib::{Attrib, AttribSet, Primitive};
    pub use crate::error::{GeomError, Result};
    pub use crate::math::{Vec2, Vec3, Vec4};
    pub use crate::mesh_data::MeshData;
    pub use crate::modifier::{
        AttribFn, Bounds, ColorFromAttrib, Constant, Invert, Lines, Modifier, Remove, SourceMods,
        Subdivide, Tangents, Transform, Twist, VertexNormalLines,
    };
    pub use crate::shapes::*;
    pub use crate::source::{Source, Target};
    pub use crate::spline::BSplineCurve;
}
