//! Debug visualization of normals (or tangents) as line segments.

use log::warn;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::modifier::{Modifier, Params, SourceModsContext};
use crate::source::Target;

/// Replaces the geometry with one line segment per vertex reference,
/// pointing along its normal (or tangent).
///
/// Each segment's endpoints carry 0 and 1 in CUSTOM_0 so a shader can fade
/// or color along the segment. Texture coordinates are duplicated onto both
/// endpoints; normals and colors do not survive.
#[derive(Debug, Clone)]
pub struct VertexNormalLines {
    length: f32,
    attrib: Attrib,
}

impl VertexNormalLines {
    pub fn new(length: f32) -> Self {
        VertexNormalLines {
            length,
            attrib: Attrib::Normal,
        }
    }

    /// Visualize a different direction channel, e.g. TANGENT.
    pub fn with_attrib(mut self, attrib: Attrib) -> Self {
        self.attrib = attrib;
        self
    }
}

impl Modifier for VertexNormalLines {
    fn num_vertices(&self, upstream: &Params) -> usize {
        let n = if upstream.num_indices > 0 {
            upstream.num_indices
        } else {
            upstream.num_vertices
        };
        n * 2
    }

    fn num_indices(&self, _upstream: &Params) -> usize {
        0
    }

    fn primitive(&self, _upstream: &Params) -> Primitive {
        Primitive::Lines
    }

    fn attrib_dims(&self, attrib: Attrib, upstream_dims: u8) -> u8 {
        match attrib {
            Attrib::Position => 3,
            Attrib::Custom0 => 1,
            Attrib::Normal | Attrib::Color => 0,
            _ => upstream_dims,
        }
    }

    fn available_attribs(&self, upstream: &Params) -> AttribSet {
        (upstream.attribs - (AttribSet::NORMAL | AttribSet::COLOR)) | AttribSet::CUSTOM_0
    }

    fn process(&self, ctx: &mut SourceModsContext, requested: AttribSet) -> Result<()> {
        ctx.process_upstream(
            requested | AttribSet::POSITION | self.attrib.flag() | AttribSet::TEX_COORD_0,
        )?;

        if ctx.attrib_dims(Attrib::Position) != 3 || ctx.attrib_dims(self.attrib) != 3 {
            warn!(
                "VertexNormalLines: need 3D POSITION and {:?}, got dims {} and {}",
                self.attrib,
                ctx.attrib_dims(Attrib::Position),
                ctx.attrib_dims(self.attrib)
            );
            return Ok(());
        }
        let positions = match ctx.attrib_data(Attrib::Position) {
            Some(data) => data.to_vec(),
            None => return Ok(()),
        };
        let directions = match ctx.attrib_data(self.attrib) {
            Some(data) => data.to_vec(),
            None => return Ok(()),
        };
        let tex_dims = ctx.attrib_dims(Attrib::TexCoord0) as usize;
        let texcoords = ctx.attrib_data(Attrib::TexCoord0).map(|d| d.to_vec());

        let refs: Vec<usize> = if ctx.num_indices() > 0 {
            ctx.indices_data().iter().map(|&i| i as usize).collect()
        } else {
            (0..ctx.num_vertices()).collect()
        };
        let count = refs.len() * 2;
        let mut out_positions = Vec::with_capacity(count * 3);
        let mut out_flags = Vec::with_capacity(count);
        let mut out_texcoords = Vec::with_capacity(count * tex_dims);
        for &v in &refs {
            let p = &positions[v * 3..v * 3 + 3];
            let d = &directions[v * 3..v * 3 + 3];
            out_positions.extend_from_slice(p);
            out_positions.extend_from_slice(&[
                p[0] + d[0] * self.length,
                p[1] + d[1] * self.length,
                p[2] + d[2] * self.length,
            ]);
            out_flags.extend_from_slice(&[0.0, 1.0]);
            if let Some(tex) = &texcoords {
                let t = &tex[v * tex_dims..(v + 1) * tex_dims];
                out_texcoords.extend_from_slice(t);
                out_texcoords.extend_from_slice(t);
            }
        }

        for attrib in Attrib::ALL {
            ctx.clear_attrib(attrib);
        }
        ctx.clear_indices();
        ctx.copy_attrib(Attrib::Position, 3, 0, &out_positions, count)?;
        ctx.copy_attrib(Attrib::Custom0, 1, 0, &out_flags, count)?;
        if !out_texcoords.is_empty() {
            ctx.copy_attrib(Attrib::TexCoord0, tex_dims as u8, 0, &out_texcoords, count)?;
        }
        ctx.set_primitive(Primitive::Lines);
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
    fn emits_one_segment_per_index() {
        let sphere = Sphere::new();
        let expected = sphere.num_indices() * 2;
        let mods = SourceMods::new(sphere).with(VertexNormalLines::new(0.25));
        assert_eq!(mods.num_vertices(), expected);
        assert_eq!(mods.num_indices(), 0);
        assert_eq!(mods.primitive(), Primitive::Lines);

        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION | AttribSet::CUSTOM_0)
            .unwrap();
        assert_eq!(mesh.num_vertices(), expected);
        assert_eq!(mesh.num_indices(), 0);
        let flags = mesh.attrib_data(Attrib::Custom0).unwrap();
        for pair in flags.chunks(2) {
            assert_eq!(pair, &[0.0, 1.0]);
        }
    }

    #[test]
    fn segment_length_matches_setting() {
        let mods = SourceMods::new(Sphere::new()).with(VertexNormalLines::new(0.5));
        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let positions = mesh.attrib_data(Attrib::Position).unwrap();
        for segment in positions.chunks(6) {
            let dx = segment[3] - segment[0];
            let dy = segment[4] - segment[1];
            let dz = segment[5] - segment[2];
            let len = (dx * dx + dy * dy + dz * dz).sqrt();
            assert!((len - 0.5).abs() < 1e-4);
        }
    }

    #[test]
    fn custom_flag_write_respects_request() {
        let mods = SourceMods::new(Sphere::new()).with(VertexNormalLines::new(0.25));
        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        assert!(mesh.attrib_data(Attrib::Custom0).is_none());
    }
}
