//! Conversion of any topology into independent line segments.

use crate::attrib::{AttribSet, Primitive};
use crate::error::Result;
use crate::modifier::{Modifier, Params, SourceModsContext};
use crate::source::{calc_indices_required_bytes, Target};

/// Converts the upstream topology into LINES.
///
/// Triangles become their three edges, strips and fans are unrolled edge by
/// edge, and a fan additionally gets its outer rim. Existing line
/// primitives are split into independent segments.
#[derive(Debug, Clone, Default)]
pub struct Lines;

impl Lines {
    pub fn new() -> Self {
        Lines
    }
}

impl Modifier for Lines {
    fn num_indices(&self, upstream: &Params) -> usize {
        let n = if upstream.num_indices > 0 {
            upstream.num_indices
        } else {
            upstream.num_vertices
        };
        if n < 2 {
            return n;
        }
        match upstream.primitive {
            Primitive::Lines => n,
            Primitive::LineStrip => (n - 1) * 2,
            Primitive::Triangles => n * 2,
            Primitive::TriangleStrip => (n.saturating_sub(2)) * 6,
            Primitive::TriangleFan => 4 * n - 2,
        }
    }

    fn primitive(&self, _upstream: &Params) -> Primitive {
        Primitive::Lines
    }

    fn process(&self, ctx: &mut SourceModsContext, requested: AttribSet) -> Result<()> {
        ctx.process_upstream(requested)?;

        let primitive = match ctx.primitive() {
            Some(p) => p,
            None => return Ok(()),
        };
        let indices: Vec<u32> = if ctx.num_indices() > 0 {
            ctx.indices_data().to_vec()
        } else {
            (0..ctx.num_vertices() as u32).collect()
        };
        let n = indices.len();
        if n < 2 {
            ctx.copy_indices(Primitive::Lines, &indices, calc_indices_required_bytes(n))?;
            return Ok(());
        }
        let out = match primitive {
            Primitive::Lines => indices,
            Primitive::LineStrip => {
                let mut out = Vec::with_capacity((n - 1) * 2);
                for i in 0..n - 1 {
                    out.extend_from_slice(&[indices[i], indices[i + 1]]);
                }
                out
            }
            Primitive::Triangles => {
                let mut out = Vec::with_capacity(n * 2);
                for tri in indices.chunks_exact(3) {
                    out.extend_from_slice(&[tri[0], tri[1], tri[1], tri[2], tri[2], tri[0]]);
                }
                out
            }
            Primitive::TriangleStrip => {
                let mut out = Vec::with_capacity(n.saturating_sub(2) * 6);
                for i in 0..n.saturating_sub(2) {
                    out.extend_from_slice(&[
                        indices[i],
                        indices[i + 1],
                        indices[i + 1],
                        indices[i + 2],
                        indices[i + 2],
                        indices[i],
                    ]);
                }
                out
            }
            Primitive::TriangleFan => {
                let mut out = Vec::with_capacity(4 * n - 2);
                for i in 1..n {
                    out.extend_from_slice(&[indices[0], indices[i]]);
                }
                let mut j = n - 1;
                for (i, &index) in indices.iter().enumerate() {
                    out.extend_from_slice(&[indices[j], index]);
                    j = i;
                }
                out
            }
        };
        ctx.copy_indices(Primitive::Lines, &out, calc_indices_required_bytes(out.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::MeshData;
    use crate::modifier::SourceMods;
    use crate::shapes::{Cube, Rect};
    use crate::source::Source;

    #[test]
    fn triangles_become_edge_pairs() {
        let mods = SourceMods::new(Cube::new()).with(Lines::new());
        assert_eq!(mods.primitive(), Primitive::Lines);
        assert_eq!(mods.num_indices(), Cube::new().num_indices() * 2);

        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        assert_eq!(mesh.num_indices(), Cube::new().num_indices() * 2);
        assert_eq!(mesh.primitive(), Primitive::Lines);
    }

    #[test]
    fn strip_without_indices_is_unrolled() {
        // A rect is a non-indexed 4-vertex strip, so 2 triangles, 6 edges.
        let mods = SourceMods::new(Rect::new()).with(Lines::new());
        assert_eq!(mods.num_indices(), 12);
        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        assert_eq!(mesh.indices(), &[0, 1, 1, 2, 2, 0, 1, 2, 2, 3, 3, 1]);
    }

    #[test]
    fn lines_input_passes_through_unchanged() {
        let mut source = MeshData::new();
        Target::copy_attrib(
            &mut source,
            crate::attrib::Attrib::Position,
            3,
            0,
            &[0.0; 12],
            4,
        )
        .unwrap();
        source
            .copy_indices(Primitive::Lines, &[0, 1, 2, 3, 1, 3], 1)
            .unwrap();

        let mods = SourceMods::new(source).with(Lines::new());
        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        assert_eq!(mesh.indices(), &[0, 1, 2, 3, 1, 3]);
        assert_eq!(mesh.primitive(), Primitive::Lines);
    }

    #[test]
    fn prediction_matches_output_counts() {
        for (primitive, n, expected) in [
            (Primitive::Lines, 8, 8),
            (Primitive::LineStrip, 5, 8),
            (Primitive::Triangles, 6, 12),
            (Primitive::TriangleStrip, 6, 24),
            (Primitive::TriangleFan, 6, 22),
        ] {
            let params = Params {
                num_vertices: n,
                num_indices: n,
                primitive,
                attribs: AttribSet::POSITION,
            };
            assert_eq!(Lines::new().num_indices(&params), expected);
        }
    }
}
