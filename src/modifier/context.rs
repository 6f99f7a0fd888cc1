//! Intermediate capture target driving a modifier chain.

use log::warn;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::modifier::{Modifier, SourceMods};
use crate::source::{
    calc_indices_required_bytes, check_index_storage, copy_data, to_lines, to_triangles, Source,
    Target,
};

/// Packed per-channel capture buffer.
#[derive(Debug, Clone)]
struct AttribBuffer {
    dims: u8,
    data: Vec<f32>,
}

#[derive(Clone, Copy)]
enum Upstream<'a> {
    None,
    Source(&'a dyn Source),
    Children(&'a [SourceMods]),
}

/// A [`Target`] that captures geometry into planar buffers so modifiers can
/// inspect and rewrite it before it reaches the real target.
///
/// Construction walks the modifier chain back-to-front: each call to
/// [`process_upstream`](Self::process_upstream) pops the next modifier and
/// hands it the context, until the chain is exhausted and the underlying
/// source (or the combined children) fills the buffers.
pub struct SourceModsContext<'a> {
    upstream: Upstream<'a>,
    modifier_stack: Vec<&'a dyn Modifier>,
    attrib_mask: Option<AttribSet>,
    num_vertices: usize,
    attribs: [Option<AttribBuffer>; Attrib::COUNT],
    indices: Vec<u32>,
    primitive: Option<Primitive>,
}

impl<'a> SourceModsContext<'a> {
    pub(super) fn new(
        source: Option<&'a dyn Source>,
        children: &'a [SourceMods],
        modifiers: &'a [Box<dyn Modifier>],
    ) -> Self {
        let upstream = if !children.is_empty() {
            Upstream::Children(children)
        } else if let Some(source) = source {
            Upstream::Source(source)
        } else {
            Upstream::None
        };
        SourceModsContext {
            upstream,
            modifier_stack: modifiers.iter().map(|m| m.as_ref()).collect(),
            attrib_mask: None,
            num_vertices: 0,
            attribs: std::array::from_fn(|_| None),
            indices: Vec::new(),
            primitive: None,
        }
    }

    /// Run the remaining pipeline above the caller.
    ///
    /// Every modifier calls this exactly once from its `process`, passing the
    /// downstream request plus whatever channels it needs to read. Writes of
    /// channels outside `requested` are dropped while the upstream runs, so a
    /// modifier must widen the request for anything it consumes.
    pub fn process_upstream(&mut self, requested: AttribSet) -> Result<()> {
        let prev_mask = self.attrib_mask.replace(requested);
        let result = match self.modifier_stack.pop() {
            Some(modifier) => modifier.process(self, requested),
            None => match self.upstream {
                Upstream::Source(source) => {
                    let result = source.load_into(self, requested);
                    if self.primitive.is_none() {
                        self.primitive = Some(source.primitive());
                    }
                    result
                }
                Upstream::Children(children) => {
                    let mut result = Ok(());
                    for child in children {
                        let mut child_ctx = child.context();
                        result = child_ctx
                            .process_upstream(requested)
                            .and_then(|_| self.combine(child_ctx));
                        if result.is_err() {
                            break;
                        }
                    }
                    result
                }
                Upstream::None => Ok(()),
            },
        };
        self.attrib_mask = prev_mask;
        result
    }

    /// Run the whole pipeline and forward the captured result to `target`.
    pub fn load_into(&mut self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        self.process_upstream(requested)?;
        self.complete(target, requested)
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_indices(&self) -> usize {
        self.indices.len()
    }

    /// Captured topology; `None` until upstream has run.
    pub fn primitive(&self) -> Option<Primitive> {
        self.primitive
    }

    pub fn set_primitive(&mut self, primitive: Primitive) {
        self.primitive = Some(primitive);
    }

    pub fn attrib_dims(&self, attrib: Attrib) -> u8 {
        self.attribs[attrib.index()]
            .as_ref()
            .map(|buf| buf.dims)
            .unwrap_or(0)
    }

    /// Channels currently captured.
    pub fn available_attribs(&self) -> AttribSet {
        Attrib::ALL
            .into_iter()
            .filter(|a| self.attribs[a.index()].is_some())
            .collect()
    }

    pub fn attrib_data(&self, attrib: Attrib) -> Option<&[f32]> {
        self.attribs[attrib.index()]
            .as_ref()
            .map(|buf| buf.data.as_slice())
    }

    pub fn attrib_data_mut(&mut self, attrib: Attrib) -> Option<&mut [f32]> {
        self.attribs[attrib.index()]
            .as_mut()
            .map(|buf| buf.data.as_mut_slice())
    }

    pub fn indices_data(&self) -> &[u32] {
        &self.indices
    }

    pub fn clear_attrib(&mut self, attrib: Attrib) {
        self.attribs[attrib.index()] = None;
    }

    pub fn clear_indices(&mut self) {
        self.indices.clear();
    }

    /// Fold another capture into this one.
    ///
    /// Both sides are converted to a shared topology bucket (Triangles or
    /// Lines), non-indexed sides get a trivial index list, and the right-hand
    /// indices are offset past the existing vertices. Only channels already
    /// present on the left survive; channels the right side lacks are
    /// zero-padded.
    pub fn combine(&mut self, rhs: SourceModsContext) -> Result<()> {
        let (lhs_prim, rhs_prim) = match (self.primitive, rhs.primitive) {
            (None, _) => {
                self.num_vertices = rhs.num_vertices;
                self.attribs = rhs.attribs;
                self.indices = rhs.indices;
                self.primitive = rhs.primitive;
                return Ok(());
            }
            (Some(_), None) => return Ok(()),
            (Some(l), Some(r)) => (l, r),
        };
        let bucket = if lhs_prim.is_triangles_like() && rhs_prim.is_triangles_like() {
            Primitive::Triangles
        } else if lhs_prim.is_lines_like() && rhs_prim.is_lines_like() {
            Primitive::Lines
        } else {
            warn!(
                "combine: cannot merge {:?} geometry into {:?}, skipping",
                rhs_prim, lhs_prim
            );
            return Ok(());
        };

        let convert = |primitive: Primitive, indices: &[u32], num_vertices: usize| {
            let indices = if indices.is_empty() {
                (0..num_vertices as u32).collect()
            } else {
                indices.to_vec()
            };
            match bucket {
                Primitive::Triangles => to_triangles(primitive, &indices),
                _ => to_lines(primitive, &indices),
            }
        };
        self.indices = convert(lhs_prim, &self.indices, self.num_vertices)?;
        let offset = self.num_vertices as u32;
        self.indices.extend(
            convert(rhs_prim, &rhs.indices, rhs.num_vertices)?
                .into_iter()
                .map(|i| i + offset),
        );
        self.primitive = Some(bucket);

        for attrib in Attrib::ALL {
            let Some(lhs_buf) = self.attribs[attrib.index()].as_mut() else {
                continue;
            };
            let dims = lhs_buf.dims as usize;
            match rhs.attribs[attrib.index()].as_ref() {
                Some(rhs_buf) => {
                    let start = lhs_buf.data.len();
                    lhs_buf
                        .data
                        .resize(start + rhs.num_vertices * dims, 0.0);
                    copy_data(
                        rhs_buf.dims,
                        0,
                        &rhs_buf.data,
                        rhs.num_vertices,
                        dims as u8,
                        0,
                        &mut lhs_buf.data[start..],
                    )?;
                }
                None => {
                    warn!(
                        "combine: {:?} missing on appended geometry, zero-padding",
                        attrib
                    );
                    lhs_buf
                        .data
                        .resize(lhs_buf.data.len() + rhs.num_vertices * dims, 0.0);
                }
            }
        }
        self.num_vertices += rhs.num_vertices;
        Ok(())
    }

    /// Deliver the captured geometry to the real target.
    ///
    /// POSITION is always emitted; other channels only when requested.
    pub fn complete(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        for attrib in Attrib::ALL {
            if attrib != Attrib::Position && !requested.contains_attrib(attrib) {
                continue;
            }
            if let Some(buf) = self.attribs[attrib.index()].as_ref() {
                target.copy_attrib(attrib, buf.dims, 0, &buf.data, self.num_vertices)?;
            }
        }
        if !self.indices.is_empty() {
            let primitive = self.primitive.unwrap_or(Primitive::Triangles);
            target.copy_indices(
                primitive,
                &self.indices,
                calc_indices_required_bytes(self.indices.len()),
            )?;
        }
        Ok(())
    }
}

impl Target for SourceModsContext<'_> {
    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        SourceModsContext::attrib_dims(self, attrib)
    }

    fn copy_attrib(
        &mut self,
        attrib: Attrib,
        dims: u8,
        stride_bytes: usize,
        data: &[f32],
        count: usize,
    ) -> Result<()> {
        if let Some(mask) = self.attrib_mask {
            if attrib != Attrib::Position && !mask.contains_attrib(attrib) {
                return Ok(());
            }
        }
        let slot = &mut self.attribs[attrib.index()];
        let needs_alloc = match slot {
            Some(buf) => buf.dims != dims || buf.data.len() != count * dims as usize,
            None => true,
        };
        if needs_alloc {
            *slot = Some(AttribBuffer {
                dims,
                data: vec![0.0; count * dims as usize],
            });
        }
        if let Some(buf) = slot {
            copy_data(dims, stride_bytes, data, count, dims, 0, &mut buf.data)?;
        }
        self.num_vertices = count;
        Ok(())
    }

    fn copy_indices(
        &mut self,
        primitive: Primitive,
        indices: &[u32],
        required_bytes_per_index: u8,
    ) -> Result<()> {
        check_index_storage(indices, required_bytes_per_index)?;
        self.primitive = Some(primitive);
        self.indices = indices.to_vec();
        Ok(())
    }
}
