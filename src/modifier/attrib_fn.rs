//! Per-vertex rewriting of a single channel through a user function.

use std::fmt;
use std::sync::Arc;

use log::warn;

use crate::attrib::{Attrib, AttribSet};
use crate::error::Result;
use crate::math::{Vec2, Vec3, Vec4};
use crate::modifier::{Modifier, SourceModsContext};
use crate::source::Target;

/// A fixed-dimensionality value an attribute element can be read as.
pub trait AttribValue: Copy {
    const DIMS: u8;

    fn from_slice(slice: &[f32]) -> Self;
    fn write_to(self, out: &mut [f32]);
}

impl AttribValue for f32 {
    const DIMS: u8 = 1;

    fn from_slice(slice: &[f32]) -> Self {
        slice[0]
    }

    fn write_to(self, out: &mut [f32]) {
        out[0] = self;
    }
}

impl AttribValue for Vec2 {
    const DIMS: u8 = 2;

    fn from_slice(slice: &[f32]) -> Self {
        Vec2::new(slice[0], slice[1])
    }

    fn write_to(self, out: &mut [f32]) {
        out.copy_from_slice(self.as_slice());
    }
}

impl AttribValue for Vec3 {
    const DIMS: u8 = 3;

    fn from_slice(slice: &[f32]) -> Self {
        Vec3::new(slice[0], slice[1], slice[2])
    }

    fn write_to(self, out: &mut [f32]) {
        out.copy_from_slice(self.as_slice());
    }
}

impl AttribValue for Vec4 {
    const DIMS: u8 = 4;

    fn from_slice(slice: &[f32]) -> Self {
        Vec4::new(slice[0], slice[1], slice[2], slice[3])
    }

    fn write_to(self, out: &mut [f32]) {
        out.copy_from_slice(self.as_slice());
    }
}

/// Applies `func` to every element of one channel, possibly changing its
/// dimensionality from `S` to `D`.
///
/// Passes through with a warning when the upstream channel is absent or not
/// `S`-dimensional.
#[derive(Clone)]
pub struct AttribFn<S, D> {
    attrib: Attrib,
    func: Arc<dyn Fn(S) -> D + Send + Sync>,
}

impl<S: AttribValue, D: AttribValue> AttribFn<S, D> {
    pub fn new(attrib: Attrib, func: impl Fn(S) -> D + Send + Sync + 'static) -> Self {
        AttribFn {
            attrib,
            func: Arc::new(func),
        }
    }
}

impl<S, D> fmt::Debug for AttribFn<S, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttribFn")
            .field("attrib", &self.attrib)
            .finish_non_exhaustive()
    }
}

impl<S, D> Modifier for AttribFn<S, D>
where
    S: AttribValue + 'static,
    D: AttribValue + 'static,
{
    fn attrib_dims(&self, attrib: Attrib, upstream_dims: u8) -> u8 {
        if attrib == self.attrib && upstream_dims == S::DIMS {
            D::DIMS
        } else {
            upstream_dims
        }
    }

    fn process(&self, ctx: &mut SourceModsContext, requested: AttribSet) -> Result<()> {
        ctx.process_upstream(requested | self.attrib.flag())?;

        if ctx.attrib_dims(self.attrib) != S::DIMS {
            warn!(
                "AttribFn: {:?} has dims {}, expected {}",
                self.attrib,
                ctx.attrib_dims(self.attrib),
                S::DIMS
            );
            return Ok(());
        }
        let input = match ctx.attrib_data(self.attrib) {
            Some(data) => data.to_vec(),
            None => return Ok(()),
        };
        let count = ctx.num_vertices();
        let src_dims = S::DIMS as usize;
        let dst_dims = D::DIMS as usize;
        let mut output = vec![0.0f32; count * dst_dims];
        for i in 0..count {
            let value = S::from_slice(&input[i * src_dims..i * src_dims + src_dims]);
            (self.func)(value).write_to(&mut output[i * dst_dims..i * dst_dims + dst_dims]);
        }
        ctx.copy_attrib(self.attrib, D::DIMS, 0, &output, count)
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
    fn rewrites_positions_in_place() {
        let mods = SourceMods::new(Cube::new())
            .with(AttribFn::<Vec3, Vec3>::new(Attrib::Position, |p| p * 3.0));
        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let positions = mesh.attrib_data(Attrib::Position).unwrap();
        // the unit cube has half-extent 0.5, so tripling puts corners at 1.5
        let max = positions.iter().fold(0.0f32, |m, v| m.max(v.abs()));
        assert!((max - 1.5).abs() < 1e-5);
    }

    #[test]
    fn can_change_dimensionality() {
        let mods = SourceMods::new(Cube::new()).with(AttribFn::<Vec2, Vec3>::new(
            Attrib::TexCoord0,
            |uv| Vec3::new(uv.x, uv.y, 0.5),
        ));
        assert_eq!(Source::attrib_dims(&mods, Attrib::TexCoord0), 3);
        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION | AttribSet::TEX_COORD_0)
            .unwrap();
        let uvs = mesh.attrib_data(Attrib::TexCoord0).unwrap();
        assert_eq!(uvs.len(), mesh.num_vertices() * 3);
        for uvw in uvs.chunks(3) {
            assert!((uvw[2] - 0.5).abs() < 1e-6);
        }
    }
}
