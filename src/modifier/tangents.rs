//! Tangent-frame generation from positions, normals and texture coordinates.

use log::warn;

use crate::attrib::{Attrib, AttribSet};
use crate::error::Result;
use crate::math::Vec3;
use crate::modifier::{Modifier, Params, SourceModsContext};
use crate::source::{to_triangles, Target};

/// Per-vertex tangents via Lengyel's method.
///
/// Accumulates the texture-space S direction over every triangle touching a
/// vertex, then Gram-Schmidt orthogonalizes the sum against the vertex
/// normal. `texcoords` may be 2, 3 or 4 dimensional; only UV is read.
/// Returns `count * 3` floats.
pub fn calculate_tangents(
    indices: &[u32],
    positions: &[f32],
    normals: &[f32],
    texcoords: &[f32],
    tex_dims: usize,
) -> Vec<f32> {
    let count = positions.len() / 3;
    let mut accum = vec![Vec3::zeros(); count];
    for tri in indices.chunks_exact(3) {
        let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
        let p = |i: usize| Vec3::new(positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]);
        let uv = |i: usize| (texcoords[i * tex_dims], texcoords[i * tex_dims + 1]);

        let e1 = p(b) - p(a);
        let e2 = p(c) - p(a);
        let (u1, v1) = uv(a);
        let (u2, v2) = uv(b);
        let (u3, v3) = uv(c);
        let s1 = u2 - u1;
        let s2 = u3 - u1;
        let t1 = v2 - v1;
        let t2 = v3 - v1;
        let denom = s1 * t2 - s2 * t1;
        if denom.abs() <= f32::EPSILON {
            continue;
        }
        let r = 1.0 / denom;
        let sdir = (e1 * t2 - e2 * t1) * r;
        accum[a] += sdir;
        accum[b] += sdir;
        accum[c] += sdir;
    }

    let mut tangents = vec![0.0f32; count * 3];
    for i in 0..count {
        let n = Vec3::new(normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]);
        let t = accum[i];
        let tangent = (t - n * n.dot(&t))
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(|| crate::math::perpendicular(&n));
        tangents[i * 3..i * 3 + 3].copy_from_slice(tangent.as_slice());
    }
    tangents
}

/// Adds a TANGENT channel (and BITANGENT, when requested) to triangle
/// geometry.
#[derive(Debug, Clone, Default)]
pub struct Tangents;

impl Tangents {
    pub fn new() -> Self {
        Tangents
    }
}

impl Modifier for Tangents {
    fn attrib_dims(&self, attrib: Attrib, upstream_dims: u8) -> u8 {
        match attrib {
            Attrib::Tangent | Attrib::Bitangent => 3,
            _ => upstream_dims,
        }
    }

    fn available_attribs(&self, upstream: &Params) -> AttribSet {
        upstream.attribs | AttribSet::TANGENT | AttribSet::BITANGENT
    }

    fn process(&self, ctx: &mut SourceModsContext, requested: AttribSet) -> Result<()> {
        ctx.process_upstream(
            requested | AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
        )?;

        let primitive = match ctx.primitive() {
            Some(p) if p.is_triangles_like() => p,
            _ => {
                warn!("Tangents: requires triangle geometry");
                return Ok(());
            }
        };
        let tex_dims = ctx.attrib_dims(Attrib::TexCoord0) as usize;
        if ctx.attrib_dims(Attrib::Position) != 3
            || ctx.attrib_dims(Attrib::Normal) != 3
            || tex_dims < 2
        {
            warn!("Tangents: requires 3D positions, 3D normals and texture coordinates");
            return Ok(());
        }
        let indices: Vec<u32> = if ctx.num_indices() > 0 {
            ctx.indices_data().to_vec()
        } else {
            (0..ctx.num_vertices() as u32).collect()
        };
        let triangles = to_triangles(primitive, &indices)?;
        let (positions, normals, texcoords) = match (
            ctx.attrib_data(Attrib::Position),
            ctx.attrib_data(Attrib::Normal),
            ctx.attrib_data(Attrib::TexCoord0),
        ) {
            (Some(p), Some(n), Some(t)) => (p.to_vec(), n.to_vec(), t.to_vec()),
            _ => return Ok(()),
        };
        let count = ctx.num_vertices();
        let tangents = calculate_tangents(&triangles, &positions, &normals, &texcoords, tex_dims);
        ctx.copy_attrib(Attrib::Tangent, 3, 0, &tangents, count)?;

        if requested.contains_attrib(Attrib::Bitangent) {
            let mut bitangents = vec![0.0f32; count * 3];
            for i in 0..count {
                let n = Vec3::new(normals[i * 3], normals[i * 3 + 1], normals[i * 3 + 2]);
                let t = Vec3::new(tangents[i * 3], tangents[i * 3 + 1], tangents[i * 3 + 2]);
                let b = n.cross(&t);
                bitangents[i * 3..i * 3 + 3].copy_from_slice(b.as_slice());
            }
            ctx.copy_attrib(Attrib::Bitangent, 3, 0, &bitangents, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::MeshData;
    use crate::modifier::SourceMods;
    use crate::shapes::Sphere;
    use crate::source::Source;

    #[test]
    fn tangents_are_unit_and_orthogonal_to_normals() {
        let mods = SourceMods::new(Sphere::new()).with(Tangents::new());
        let mut mesh = MeshData::new();
        mods.load_into(
            &mut mesh,
            AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TANGENT,
        )
        .unwrap();
        let normals = mesh.attrib_data(Attrib::Normal).unwrap();
        let tangents = mesh.attrib_data(Attrib::Tangent).unwrap();
        assert_eq!(tangents.len(), normals.len());
        for (n, t) in normals.chunks(3).zip(tangents.chunks(3)) {
            let len = (t[0] * t[0] + t[1] * t[1] + t[2] * t[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-3);
            let dot = n[0] * t[0] + n[1] * t[1] + n[2] * t[2];
            assert!(dot.abs() < 1e-3);
        }
    }

    #[test]
    fn bitangents_complete_the_frame() {
        let mods = SourceMods::new(Sphere::new()).with(Tangents::new());
        let mut mesh = MeshData::new();
        mods.load_into(
            &mut mesh,
            AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TANGENT | AttribSet::BITANGENT,
        )
        .unwrap();
        let normals = mesh.attrib_data(Attrib::Normal).unwrap();
        let tangents = mesh.attrib_data(Attrib::Tangent).unwrap();
        let bitangents = mesh.attrib_data(Attrib::Bitangent).unwrap();
        for i in 0..normals.len() / 3 {
            let n = &normals[i * 3..i * 3 + 3];
            let t = &tangents[i * 3..i * 3 + 3];
            let b = &bitangents[i * 3..i * 3 + 3];
            let cross = [
                n[1] * t[2] - n[2] * t[1],
                n[2] * t[0] - n[0] * t[2],
                n[0] * t[1] - n[1] * t[0],
            ];
            for (x, y) in cross.iter().zip(b) {
                assert!((x - y).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn predicted_channels_include_tangents() {
        let mods = SourceMods::new(Sphere::new()).with(Tangents::new());
        assert!(mods.available_attribs().contains_attrib(Attrib::Tangent));
        assert_eq!(Source::attrib_dims(&mods, Attrib::Tangent), 3);
    }
}
