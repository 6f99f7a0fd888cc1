//! Small single-purpose modifiers.

use std::sync::{Arc, Mutex};

use log::warn;

use crate::attrib::{Attrib, AttribSet};
use crate::error::Result;
use crate::math::{Aabb, Vec3};
use crate::modifier::{AttribValue, Modifier, Params, SourceModsContext};
use crate::source::Target;

/// Fills one channel with the same value for every vertex.
#[derive(Debug, Clone)]
pub struct Constant {
    attrib: Attrib,
    value: [f32; 4],
    dims: u8,
}

impl Constant {
    pub fn new<V: AttribValue>(attrib: Attrib, value: V) -> Self {
        let mut stored = [0.0f32; 4];
        value.write_to(&mut stored[..V::DIMS as usize]);
        Constant {
            attrib,
            value: stored,
            dims: V::DIMS,
        }
    }
}

impl Modifier for Constant {
    fn attrib_dims(&self, attrib: Attrib, upstream_dims: u8) -> u8 {
        if attrib == self.attrib {
            self.dims
        } else {
            upstream_dims
        }
    }

    fn available_attribs(&self, upstream: &Params) -> AttribSet {
        upstream.attribs | self.attrib.flag()
    }

    fn process(&self, ctx: &mut SourceModsContext, requested: AttribSet) -> Result<()> {
        ctx.process_upstream(requested)?;
        let count = ctx.num_vertices();
        let dims = self.dims as usize;
        let mut data = Vec::with_capacity(count * dims);
        for _ in 0..count {
            data.extend_from_slice(&self.value[..dims]);
        }
        ctx.copy_attrib(self.attrib, self.dims, 0, &data, count)
    }
}

/// Negates every component of one channel in place.
#[derive(Debug, Clone)]
pub struct Invert {
    attrib: Attrib,
}

impl Invert {
    pub fn new(attrib: Attrib) -> Self {
        Invert { attrib }
    }
}

impl Modifier for Invert {
    fn process(&self, ctx: &mut SourceModsContext, requested: AttribSet) -> Result<()> {
        ctx.process_upstream(requested | self.attrib.flag())?;
        if let Some(data) = ctx.attrib_data_mut(self.attrib) {
            for v in data {
                *v = -*v;
            }
        }
        Ok(())
    }
}

/// Strips one channel from the pipeline.
#[derive(Debug, Clone)]
pub struct Remove {
    attrib: Attrib,
}

impl Remove {
    pub fn new(attrib: Attrib) -> Self {
        Remove { attrib }
    }
}

impl Modifier for Remove {
    fn attrib_dims(&self, attrib: Attrib, upstream_dims: u8) -> u8 {
        if attrib == self.attrib {
            0
        } else {
            upstream_dims
        }
    }

    fn available_attribs(&self, upstream: &Params) -> AttribSet {
        upstream.attribs - self.attrib.flag()
    }

    fn process(&self, ctx: &mut SourceModsContext, requested: AttribSet) -> Result<()> {
        ctx.process_upstream(requested - self.attrib.flag())?;
        ctx.clear_attrib(self.attrib);
        Ok(())
    }
}

/// Captures the axis-aligned extent of one channel flowing past, without
/// altering the pipeline.
///
/// The result handle can be read after the pipeline has been loaded.
#[derive(Debug, Clone)]
pub struct Bounds {
    attrib: Attrib,
    result: Arc<Mutex<Aabb>>,
}

impl Bounds {
    pub fn new(result: Arc<Mutex<Aabb>>) -> Self {
        Bounds {
            attrib: Attrib::Position,
            result,
        }
    }

    pub fn with_attrib(mut self, attrib: Attrib) -> Self {
        self.attrib = attrib;
        self
    }
}

impl Modifier for Bounds {
    fn process(&self, ctx: &mut SourceModsContext, requested: AttribSet) -> Result<()> {
        ctx.process_upstream(requested | self.attrib.flag())?;
        let dims = ctx.attrib_dims(self.attrib) as usize;
        if !(1..=4).contains(&dims) {
            warn!("Bounds: {:?} unavailable", self.attrib);
            return Ok(());
        }
        let mut aabb = Aabb::empty();
        if let Some(data) = ctx.attrib_data(self.attrib) {
            for v in data.chunks_exact(dims) {
                let point = match dims {
                    1 => Vec3::new(v[0], 0.0, 0.0),
                    2 => Vec3::new(v[0], v[1], 0.0),
                    _ => Vec3::new(v[0], v[1], v[2]),
                };
                aabb.include(point);
            }
        }
        if let Ok(mut result) = self.result.lock() {
            *result = aabb;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::MeshData;
    use crate::modifier::SourceMods;
    use crate::shapes::{Cube, Sphere};
    use crate::source::Source;

    #[test]
    fn constant_fills_every_vertex() {
        let mods = SourceMods::new(Cube::new())
            .with(Constant::new(Attrib::Color, Vec3::new(1.0, 0.5, 0.25)));
        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION | AttribSet::COLOR)
            .unwrap();
        for c in mesh.attrib_data(Attrib::Color).unwrap().chunks(3) {
            assert_eq!(c, &[1.0, 0.5, 0.25]);
        }
    }

    #[test]
    fn invert_flips_normals() {
        let plain = SourceMods::new(Sphere::new());
        let flipped = SourceMods::new(Sphere::new()).with(Invert::new(Attrib::Normal));
        let mut a = MeshData::new();
        let mut b = MeshData::new();
        let request = AttribSet::POSITION | AttribSet::NORMAL;
        plain.load_into(&mut a, request).unwrap();
        flipped.load_into(&mut b, request).unwrap();
        let na = a.attrib_data(Attrib::Normal).unwrap();
        let nb = b.attrib_data(Attrib::Normal).unwrap();
        for (x, y) in na.iter().zip(nb) {
            assert!((x + y).abs() < 1e-6);
        }
    }

    #[test]
    fn remove_strips_the_channel() {
        let mods = SourceMods::new(Sphere::new()).with(Remove::new(Attrib::Normal));
        assert!(!mods.available_attribs().contains_attrib(Attrib::Normal));
        assert_eq!(Source::attrib_dims(&mods, Attrib::Normal), 0);
        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION | AttribSet::NORMAL)
            .unwrap();
        assert!(mesh.attrib_data(Attrib::Normal).is_none());
    }

    #[test]
    fn bounds_capture_the_extent() {
        let result = Arc::new(Mutex::new(Aabb::empty()));
        let mods = SourceMods::new(Cube::new()).with(Bounds::new(result.clone()));
        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let aabb = result.lock().unwrap();
        let size = aabb.size();
        assert!((size.x - 1.0).abs() < 1e-5);
        assert!((size.y - 1.0).abs() < 1e-5);
        assert!((size.z - 1.0).abs() < 1e-5);
    }
}
