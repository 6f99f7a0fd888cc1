//! Deriving vertex colors from another channel.

use std::fmt;
use std::sync::Arc;

use log::warn;

use crate::attrib::{Attrib, AttribSet};
use crate::error::Result;
use crate::math::Vec3;
use crate::modifier::{Modifier, Params, SourceModsContext};
use crate::source::Target;

/// Maps an input channel through a user function into 3-component COLOR.
///
/// 2D input is widened with a zero Z, 4D input loses its W.
#[derive(Clone)]
pub struct ColorFromAttrib {
    attrib: Attrib,
    func: Arc<dyn Fn(Vec3) -> Vec3 + Send + Sync>,
}

impl ColorFromAttrib {
    pub fn new(attrib: Attrib, func: impl Fn(Vec3) -> Vec3 + Send + Sync + 'static) -> Self {
        ColorFromAttrib {
            attrib,
            func: Arc::new(func),
        }
    }
}

impl fmt::Debug for ColorFromAttrib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColorFromAttrib")
            .field("attrib", &self.attrib)
            .finish_non_exhaustive()
    }
}

impl Modifier for ColorFromAttrib {
    fn attrib_dims(&self, attrib: Attrib, upstream_dims: u8) -> u8 {
        if attrib == Attrib::Color {
            3
        } else {
            upstream_dims
        }
    }

    fn available_attribs(&self, upstream: &Params) -> AttribSet {
        upstream.attribs | AttribSet::COLOR
    }

    fn process(&self, ctx: &mut SourceModsContext, requested: AttribSet) -> Result<()> {
        ctx.process_upstream(requested | self.attrib.flag())?;

        let dims = ctx.attrib_dims(self.attrib);
        let input = match ctx.attrib_data(self.attrib) {
            Some(data) if (2..=4).contains(&dims) => data.to_vec(),
            _ => {
                warn!(
                    "ColorFromAttrib: {:?} unavailable at usable dims, passing through",
                    self.attrib
                );
                return Ok(());
            }
        };
        let count = ctx.num_vertices();
        let mut colors = vec![0.0f32; count * 3];
        for i in 0..count {
            let base = i * dims as usize;
            let v = match dims {
                2 => Vec3::new(input[base], input[base + 1], 0.0),
                _ => Vec3::new(input[base], input[base + 1], input[base + 2]),
            };
            let c = (self.func)(v);
            colors[i * 3..i * 3 + 3].copy_from_slice(&[c.x, c.y, c.z]);
        }
        ctx.copy_attrib(Attrib::Color, 3, 0, &colors, count)
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
    fn colors_follow_the_source_attrib() {
        let mods = SourceMods::new(Sphere::new())
            .with(ColorFromAttrib::new(Attrib::Normal, |n| n * 0.5 + Vec3::repeat(0.5)));
        assert_eq!(Source::attrib_dims(&mods, Attrib::Color), 3);
        assert!(mods.available_attribs().contains_attrib(Attrib::Color));

        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION | AttribSet::COLOR)
            .unwrap();
        let normals = mesh.attrib_data(Attrib::Normal);
        assert!(normals.is_none() || !normals.unwrap().is_empty());
        let colors = mesh.attrib_data(Attrib::Color).unwrap();
        assert_eq!(colors.len(), mesh.num_vertices() * 3);
        for c in colors {
            assert!((0.0..=1.0).contains(c));
        }
    }

    #[test]
    fn missing_attrib_passes_through() {
        let mods = SourceMods::new(Sphere::new())
            .with(ColorFromAttrib::new(Attrib::Custom3, |v| v));
        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION | AttribSet::COLOR)
            .unwrap();
        assert_eq!(mesh.num_vertices(), Sphere::new().num_vertices());
    }
}
