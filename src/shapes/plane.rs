//! Subdivided planar grid.

use bytemuck::cast_slice;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::math::{Vec2, Vec3};
use crate::shapes::normal_color;
use crate::source::{calc_indices_required_bytes, Source, Target};

/// Flat grid spanned by two axes. The normal is the cross product of the
/// v and u axes, so the default plane faces +Y.
#[derive(Debug, Clone)]
pub struct Plane {
    origin: Vec3,
    u_axis: Vec3,
    v_axis: Vec3,
    size: Vec2,
    subdivisions: (usize, usize),
    enabled: AttribSet,
}

impl Plane {
    pub fn new() -> Self {
        Self {
            origin: Vec3::zeros(),
            u_axis: Vec3::x(),
            v_axis: Vec3::z(),
            size: Vec2::new(2.0, 2.0),
            subdivisions: (1, 1),
            enabled: AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
        }
    }

    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_axes(mut self, u_axis: Vec3, v_axis: Vec3) -> Self {
        self.u_axis = u_axis.normalize();
        self.v_axis = v_axis.normalize();
        self
    }

    /// Orients the plane so its normal matches `normal`, deriving the two
    /// spanning axes from any non-parallel helper vector.
    pub fn with_normal(mut self, normal: Vec3) -> Self {
        let normal = normal.normalize();
        let helper = if normal.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
        self.u_axis = normal.cross(&helper).normalize();
        self.v_axis = self.u_axis.cross(&normal).normalize();
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn with_subdivisions(mut self, x: usize, y: usize) -> Self {
        self.subdivisions = (x.max(1), y.max(1));
        self
    }

    pub fn with_colors(mut self) -> Self {
        self.enabled |= AttribSet::COLOR;
        self
    }

    pub fn without_attrib(mut self, attrib: Attrib) -> Self {
        self.enabled -= attrib.flag();
        self
    }

    fn normal(&self) -> Vec3 {
        self.v_axis.cross(&self.u_axis).normalize()
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Plane {
    fn num_vertices(&self) -> usize {
        (self.subdivisions.0 + 1) * (self.subdivisions.1 + 1)
    }

    fn num_indices(&self) -> usize {
        self.subdivisions.0 * self.subdivisions.1 * 6
    }

    fn primitive(&self) -> Primitive {
        Primitive::Triangles
    }

    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        if !self.enabled.contains_attrib(attrib) {
            return 0;
        }
        match attrib {
            Attrib::Position | Attrib::Normal | Attrib::Color => 3,
            Attrib::TexCoord0 => 2,
            _ => 0,
        }
    }

    fn available_attribs(&self) -> AttribSet {
        self.enabled
    }

    fn load_into(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        let wanted = requested & self.enabled;
        let (sx, sy) = self.subdivisions;
        let count = self.num_vertices();
        let normal = self.normal();

        let mut positions = Vec::with_capacity(count);
        let mut tex_coords = Vec::with_capacity(count);
        for y in 0..=sy {
            for x in 0..=sx {
                let u = x as f32 / sx as f32;
                let v = y as f32 / sy as f32;
                positions.push(
                    self.origin
                        + self.u_axis * self.size.x * (u - 0.5)
                        + self.v_axis * self.size.y * (v - 0.5),
                );
                tex_coords.push(Vec2::new(u, v));
            }
        }

        target.copy_attrib(Attrib::Position, 3, 0, cast_slice(&positions), count)?;
        if wanted.contains_attrib(Attrib::Normal) {
            let normals = vec![normal; count];
            target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(&normals), count)?;
        }
        if wanted.contains_attrib(Attrib::TexCoord0) {
            target.copy_attrib(Attrib::TexCoord0, 2, 0, cast_slice(&tex_coords), count)?;
        }
        if wanted.contains_attrib(Attrib::Color) {
            let colors = vec![normal_color(normal); count];
            target.copy_attrib(Attrib::Color, 3, 0, cast_slice(&colors), count)?;
        }

        let mut indices = Vec::with_capacity(self.num_indices());
        let row = (sx + 1) as u32;
        for y in 0..sy as u32 {
            for x in 0..sx as u32 {
                let i = y * row + x;
                indices.extend_from_slice(&[i, i + row, i + row + 1]);
                indices.extend_from_slice(&[i, i + row + 1, i + 1]);
            }
        }
        target.copy_indices(
            Primitive::Triangles,
            &indices,
            calc_indices_required_bytes(indices.len()),
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::MeshData;

    #[test]
    fn default_plane_faces_up() {
        let plane = Plane::new();
        let mut mesh = MeshData::new();
        plane.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert_eq!(Source::num_vertices(&mesh), 4);
        assert_eq!(mesh.indices().len(), 6);
        let n = mesh.attrib_data(Attrib::Normal).unwrap();
        assert_eq!(&n[0..3], &[0.0, 1.0, 0.0]);
    }

    #[test]
    fn subdivisions_grow_the_grid() {
        let plane = Plane::new().with_subdivisions(4, 3);
        assert_eq!(plane.num_vertices(), 20);
        assert_eq!(plane.num_indices(), 72);

        let mut mesh = MeshData::new();
        plane.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        // corners span the full size, centered on the origin
        assert_eq!(&p[0..3], &[-1.0, 0.0, -1.0]);
        assert_eq!(&p[p.len() - 3..], &[1.0, 0.0, 1.0]);
    }

    #[test]
    fn with_normal_derives_orthonormal_axes() {
        let plane = Plane::new().with_normal(Vec3::new(0.0, 0.0, 1.0));
        assert!(plane.normal().dot(&Vec3::z()) > 0.999);
        assert!(plane.u_axis.dot(&plane.v_axis).abs() < 1.0e-5);
    }
}
