//! Composition of sources and modifier chains.

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::modifier::{Modifier, Params, SourceModsContext};
use crate::source::{Source, Target};

/// A [`Source`] built from another source, a modifier chain and, optionally,
/// appended sibling geometry.
///
/// A `SourceMods` is either a bachelor (one source plus its modifiers) or a
/// combine node (two or more children whose outputs are folded together,
/// plus modifiers applied to the combined result). Appending to a bachelor
/// turns it into a combine node holding the old bachelor as its first child.
///
/// ```no_run
/// use procgeom::prelude::*;
///
/// let geom = SourceMods::new(Sphere::new())
///     .with(Transform::translate(Vec3::new(0.0, 1.0, 0.0)))
///     .appended(SourceMods::new(Cube::new()));
/// ```
#[derive(Clone, Default)]
pub struct SourceMods {
    source: Option<Box<dyn Source>>,
    modifiers: Vec<Box<dyn Modifier>>,
    children: Vec<SourceMods>,
}

impl SourceMods {
    pub fn new(source: impl Source + 'static) -> Self {
        SourceMods {
            source: Some(Box::new(source)),
            modifiers: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append `modifier` to the chain; it runs after everything already
    /// attached.
    pub fn with(mut self, modifier: impl Modifier + 'static) -> Self {
        self.modifiers.push(Box::new(modifier));
        self
    }

    /// Fold `other`'s output into this geometry.
    pub fn append(&mut self, other: SourceMods) {
        if self.source.is_none() && self.modifiers.is_empty() && self.children.is_empty() {
            *self = other;
            return;
        }
        if self.children.is_empty() {
            let bachelor = std::mem::take(self);
            self.children = vec![bachelor, other];
        } else {
            self.children.push(other);
        }
    }

    /// Consuming form of [`append`](Self::append).
    pub fn appended(mut self, other: SourceMods) -> Self {
        self.append(other);
        self
    }

    pub(super) fn context(&self) -> SourceModsContext<'_> {
        SourceModsContext::new(self.source.as_deref(), &self.children, &self.modifiers)
    }

    /// Predicted pipeline state below the modifier chain.
    fn upstream_params(&self) -> Params {
        if !self.children.is_empty() {
            return self.combined_params();
        }
        match self.source.as_deref() {
            Some(source) => Params {
                num_vertices: source.num_vertices(),
                num_indices: source.num_indices(),
                primitive: source.primitive(),
                attribs: source.available_attribs(),
            },
            None => Params {
                num_vertices: 0,
                num_indices: 0,
                primitive: Primitive::Triangles,
                attribs: AttribSet::empty(),
            },
        }
    }

    /// Predicted result of folding the children together, mirroring
    /// [`SourceModsContext::combine`].
    fn combined_params(&self) -> Params {
        let first = match self.children.first() {
            Some(child) => child.final_params(),
            None => return self.upstream_params(),
        };
        let all_triangles = self
            .children
            .iter()
            .all(|c| c.final_params().primitive.is_triangles_like());
        let bucket = if all_triangles {
            Primitive::Triangles
        } else {
            Primitive::Lines
        };
        let mut num_vertices = 0;
        let mut num_indices = 0;
        for child in &self.children {
            let params = child.final_params();
            num_vertices += params.num_vertices;
            num_indices += converted_index_count(bucket, &params);
        }
        Params {
            num_vertices,
            num_indices,
            primitive: bucket,
            attribs: first.attribs,
        }
    }

    /// Predicted pipeline state after the full modifier chain.
    fn final_params(&self) -> Params {
        let mut params = self.upstream_params();
        for modifier in &self.modifiers {
            params = Params {
                num_vertices: modifier.num_vertices(&params),
                num_indices: modifier.num_indices(&params),
                primitive: modifier.primitive(&params),
                attribs: modifier.available_attribs(&params),
            };
        }
        params
    }
}

/// Index count of one child after conversion into the combine bucket.
fn converted_index_count(bucket: Primitive, params: &Params) -> usize {
    let n = if params.num_indices > 0 {
        params.num_indices
    } else {
        params.num_vertices
    };
    match (bucket, params.primitive) {
        (Primitive::Triangles, Primitive::Triangles) => n,
        (Primitive::Triangles, _) => (3 * n).saturating_sub(6),
        (Primitive::Lines, Primitive::Lines) => n,
        (Primitive::Lines, _) => (2 * n).saturating_sub(2),
        _ => n,
    }
}

impl Source for SourceMods {
    fn num_vertices(&self) -> usize {
        self.final_params().num_vertices
    }

    fn num_indices(&self) -> usize {
        self.final_params().num_indices
    }

    fn primitive(&self) -> Primitive {
        self.final_params().primitive
    }

    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        let mut dims = if !self.children.is_empty() {
            self.children
                .first()
                .map(|c| Source::attrib_dims(c, attrib))
                .unwrap_or(0)
        } else {
            self.source
                .as_deref()
                .map(|s| s.attrib_dims(attrib))
                .unwrap_or(0)
        };
        for modifier in &self.modifiers {
            dims = modifier.attrib_dims(attrib, dims);
        }
        dims
    }

    fn available_attribs(&self) -> AttribSet {
        self.final_params().attribs
    }

    fn load_into(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        self.context().load_into(target, requested)
    }
}
