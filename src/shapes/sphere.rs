//! UV sphere generator.

use bytemuck::cast_slice;
use std::f32::consts::PI;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::math::{Vec2, Vec3};
use crate::shapes::normal_color;
use crate::source::{calc_indices_required_bytes, Source, Target};

/// Latitude/longitude sphere.
///
/// `subdivisions` sets the segment count around the equator; the ring
/// count follows as half of it.
#[derive(Debug, Clone)]
pub struct Sphere {
    center: Vec3,
    radius: f32,
    subdivisions: usize,
    enabled: AttribSet,
    num_vertices: usize,
    num_indices: usize,
}

impl Sphere {
    pub fn new() -> Self {
        let mut sphere = Self {
            center: Vec3::zeros(),
            radius: 1.0,
            subdivisions: 18,
            enabled: AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
            num_vertices: 0,
            num_indices: 0,
        };
        sphere.update_counts();
        sphere
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.subdivisions = subdivisions.max(4);
        self.update_counts();
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

    fn segments_and_rings(&self) -> (usize, usize) {
        (self.subdivisions + 1, self.subdivisions / 2 + 1)
    }

    fn update_counts(&mut self) {
        let (segments, rings) = self.segments_and_rings();
        self.num_vertices = segments * rings;
        self.num_indices = (segments - 1) * (rings - 1) * 6;
    }
}

impl Default for Sphere {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Sphere {
    fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    fn num_indices(&self) -> usize {
        self.num_indices
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
        let (segments, rings) = self.segments_and_rings();
        let seg_incr = 1.0 / (segments - 1) as f32;
        let ring_incr = 1.0 / (rings - 1) as f32;

        let mut positions = Vec::with_capacity(self.num_vertices);
        let mut normals = Vec::with_capacity(self.num_vertices);
        let mut tex_coords = Vec::with_capacity(self.num_vertices);
        let mut colors = Vec::with_capacity(self.num_vertices);

        for r in 0..rings {
            let v = r as f32 * ring_incr;
            for s in 0..segments {
                let phi = 2.0 * PI * s as f32 * seg_incr;
                let normal = Vec3::new(
                    phi.sin() * (PI * v).sin(),
                    (PI * (v - 0.5)).sin(),
                    phi.cos() * (PI * v).sin(),
                );
                positions.push(self.center + normal * self.radius);
                normals.push(normal);
                tex_coords.push(Vec2::new(1.0 - s as f32 * seg_incr, v));
                colors.push(normal_color(normal));
            }
        }

        let mut indices: Vec<u32> = Vec::with_capacity(self.num_indices);
        for r in 0..rings as u32 - 1 {
            for s in 0..segments as u32 - 1 {
                let i = r * segments as u32 + s;
                let below = i + segments as u32;
                indices.extend_from_slice(&[i, below, below + 1]);
                indices.extend_from_slice(&[i, below + 1, i + 1]);
            }
        }

        let count = positions.len();
        target.copy_attrib(Attrib::Position, 3, 0, cast_slice(&positions), count)?;
        if wanted.contains_attrib(Attrib::Normal) {
            target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(&normals), count)?;
        }
        if wanted.contains_attrib(Attrib::TexCoord0) {
            target.copy_attrib(Attrib::TexCoord0, 2, 0, cast_slice(&tex_coords), count)?;
        }
        if wanted.contains_attrib(Attrib::Color) {
            target.copy_attrib(Attrib::Color, 3, 0, cast_slice(&colors), count)?;
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
    fn counts_match_loaded_data() {
        for sub in [4, 8, 18] {
            let sphere = Sphere::new().with_subdivisions(sub);
            let mut mesh = MeshData::new();
            sphere.load_into(&mut mesh, AttribSet::all()).unwrap();
            assert_eq!(Source::num_vertices(&mesh), sphere.num_vertices());
            assert_eq!(mesh.indices().len(), sphere.num_indices());
        }
    }

    #[test]
    fn positions_lie_on_the_sphere() {
        let sphere = Sphere::new().with_radius(2.0).with_center(Vec3::new(1.0, 0.0, 0.0));
        let mut mesh = MeshData::new();
        sphere.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        for p in mesh.attrib_data(Attrib::Position).unwrap().chunks(3) {
            let d = (Vec3::new(p[0], p[1], p[2]) - Vec3::new(1.0, 0.0, 0.0)).norm();
            assert!((d - 2.0).abs() < 1.0e-4);
        }
    }

    #[test]
    fn normals_are_unit_radial() {
        let sphere = Sphere::new();
        let mut mesh = MeshData::new();
        sphere.load_into(&mut mesh, AttribSet::all()).unwrap();
        let positions = mesh.attrib_data(Attrib::Position).unwrap();
        let normals = mesh.attrib_data(Attrib::Normal).unwrap();
        for (p, n) in positions.chunks(3).zip(normals.chunks(3)) {
            let n = Vec3::new(n[0], n[1], n[2]);
            assert!((n.norm() - 1.0).abs() < 1.0e-4);
            assert!((Vec3::new(p[0], p[1], p[2]) - n).norm() < 1.0e-4);
        }
    }

    #[test]
    fn subdivision_floor_is_four() {
        let sphere = Sphere::new().with_subdivisions(1);
        assert_eq!(sphere.num_vertices(), 5 * 3);
    }
}
