//! Geometry modifier pipeline.
//!
//! A [`Modifier`] sits between an upstream [`Source`](crate::source::Source)
//! (or another modifier) and a target. Its `process` implementation must
//! call [`SourceModsContext::process_upstream`] with its downstream request
//! plus whatever attributes it needs to read, then inspect or rewrite the
//! context buffers.
//!
//! The count/primitive/attrib queries predict what `process` will produce
//! from the upstream [`Params`] alone, without running the pipeline. They
//! must stay consistent with `process`; [`SourceMods`] relies on them for
//! O(1) count queries.

mod attrib_fn;
mod color;
mod context;
mod lines;
mod normal_lines;
mod simple;
mod source_mods;
mod subdivide;
mod tangents;
mod transform;
mod twist;

pub use attrib_fn::{AttribFn, AttribValue};
pub use color::ColorFromAttrib;
pub use context::SourceModsContext;
pub use lines::Lines;
pub use normal_lines::VertexNormalLines;
pub use simple::{Bounds, Constant, Invert, Remove};
pub use source_mods::SourceMods;
pub use subdivide::Subdivide;
pub use tangents::{calculate_tangents, Tangents};
pub use transform::Transform;
pub use twist::Twist;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;

/// Snapshot of the pipeline state at one point of a modifier chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    pub num_vertices: usize,
    pub num_indices: usize,
    pub primitive: Primitive,
    pub attribs: AttribSet,
}

pub trait Modifier: ModifierClone {
    fn num_vertices(&self, upstream: &Params) -> usize {
        upstream.num_vertices
    }

    fn num_indices(&self, upstream: &Params) -> usize {
        upstream.num_indices
    }

    fn primitive(&self, upstream: &Params) -> Primitive {
        upstream.primitive
    }

    fn attrib_dims(&self, _attrib: Attrib, upstream_dims: u8) -> u8 {
        upstream_dims
    }

    fn available_attribs(&self, upstream: &Params) -> AttribSet {
        upstream.attribs
    }

    fn process(&self, ctx: &mut SourceModsContext, requested: AttribSet) -> Result<()>;
}

pub trait ModifierClone {
    fn clone_box(&self) -> Box<dyn Modifier>;
}

impl<T> ModifierClone for T
where
    T: Modifier + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn Modifier> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Modifier> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}
