//! Centroid subdivision of triangle geometry.

use log::warn;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::modifier::{Modifier, Params, SourceModsContext};
use crate::source::{calc_indices_required_bytes, to_triangles, Target};

fn triangle_count(params: &Params) -> usize {
    let n = if params.num_indices > 0 {
        params.num_indices
    } else {
        params.num_vertices
    };
    match params.primitive {
        Primitive::Triangles => n / 3,
        Primitive::TriangleStrip | Primitive::TriangleFan => n.saturating_sub(2),
        _ => 0,
    }
}

/// Splits every triangle into three by inserting its centroid.
///
/// The centroid vertex averages all channels of the corners; direction
/// channels (NORMAL, TANGENT, BITANGENT) are re-normalized after averaging.
/// Output is always indexed TRIANGLES.
#[derive(Debug, Clone, Default)]
pub struct Subdivide;

impl Subdivide {
    pub fn new() -> Self {
        Subdivide
    }
}

impl Modifier for Subdivide {
    fn num_vertices(&self, upstream: &Params) -> usize {
        upstream.num_vertices + triangle_count(upstream)
    }

    fn num_indices(&self, upstream: &Params) -> usize {
        triangle_count(upstream) * 9
    }

    fn primitive(&self, upstream: &Params) -> Primitive {
        if upstream.primitive.is_triangles_like() {
            Primitive::Triangles
        } else {
            upstream.primitive
        }
    }

    fn process(&self, ctx: &mut SourceModsContext, requested: AttribSet) -> Result<()> {
        ctx.process_upstream(requested)?;

        let primitive = match ctx.primitive() {
            Some(p) if p.is_triangles_like() => p,
            _ => {
                warn!("Subdivide: requires triangle geometry");
                return Ok(());
            }
        };
        let indices: Vec<u32> = if ctx.num_indices() > 0 {
            ctx.indices_data().to_vec()
        } else {
            (0..ctx.num_vertices() as u32).collect()
        };
        let triangles = to_triangles(primitive, &indices)?;
        let num_triangles = triangles.len() / 3;
        let old_count = ctx.num_vertices();
        let new_count = old_count + num_triangles;

        let mut new_indices = Vec::with_capacity(num_triangles * 9);
        for (t, tri) in triangles.chunks_exact(3).enumerate() {
            let m = (old_count + t) as u32;
            new_indices.extend_from_slice(&[
                tri[0], tri[1], m, tri[1], tri[2], m, tri[2], tri[0], m,
            ]);
        }

        for attrib in ctx.available_attribs().attribs() {
            if attrib != Attrib::Position && !requested.contains_attrib(attrib) {
                ctx.clear_attrib(attrib);
                continue;
            }
            let dims = ctx.attrib_dims(attrib) as usize;
            let mut data = match ctx.attrib_data(attrib) {
                Some(data) => data.to_vec(),
                None => continue,
            };
            let renormalize = matches!(
                attrib,
                Attrib::Normal | Attrib::Tangent | Attrib::Bitangent
            );
            data.reserve(num_triangles * dims);
            for tri in triangles.chunks_exact(3) {
                let mut centroid = vec![0.0f32; dims];
                for &corner in tri {
                    for d in 0..dims {
                        centroid[d] += data[corner as usize * dims + d] / 3.0;
                    }
                }
                if renormalize {
                    let len = centroid.iter().map(|v| v * v).sum::<f32>().sqrt();
                    if len > f32::EPSILON {
                        for v in &mut centroid {
                            *v /= len;
                        }
                    }
                }
                data.extend_from_slice(&centroid);
            }
            ctx.copy_attrib(attrib, dims as u8, 0, &data, new_count)?;
        }
        ctx.copy_indices(
            Primitive::Triangles,
            &new_indices,
            calc_indices_required_bytes(new_indices.len()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::MeshData;
    use crate::modifier::SourceMods;
    use crate::shapes::Cube;
    use crate::source::Source;

    #[test]
    fn counts_match_prediction() {
        let cube = Cube::new();
        let tris = cube.num_indices() / 3;
        let expected_verts = cube.num_vertices() + tris;
        let mods = SourceMods::new(cube).with(Subdivide::new());
        assert_eq!(mods.num_vertices(), expected_verts);
        assert_eq!(mods.num_indices(), tris * 9);

        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        assert_eq!(mesh.num_vertices(), expected_verts);
        assert_eq!(mesh.num_indices(), tris * 9);
        assert_eq!(mesh.primitive(), Primitive::Triangles);
    }

    #[test]
    fn centroid_normals_stay_unit() {
        let mods = SourceMods::new(Cube::new()).with(Subdivide::new());
        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION | AttribSet::NORMAL)
            .unwrap();
        for n in mesh.attrib_data(Attrib::Normal).unwrap().chunks(3) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-4);
        }
    }
}
