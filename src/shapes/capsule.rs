//! Capsule generator: a cylinder body closed by two hemispherical caps.

use bytemuck::cast_slice;
use std::f32::consts::PI;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::math::{rotation_between, Vec2, Vec3};
use crate::shapes::normal_color;
use crate::source::{calc_indices_required_bytes, Source, Target};

/// Capsule built ring by ring along its axis: lower hemisphere rings,
/// then upper hemisphere rings, with the body spanning the gap between
/// the two equator rings.
#[derive(Debug, Clone)]
pub struct Capsule {
    center: Vec3,
    direction: Vec3,
    length: f32,
    radius: f32,
    subdivisions_axis: usize,
    subdivisions_height: usize,
    enabled: AttribSet,
    num_vertices: usize,
    num_indices: usize,
}

impl Capsule {
    pub fn new() -> Self {
        let mut capsule = Self {
            center: Vec3::zeros(),
            direction: Vec3::y(),
            length: 1.0,
            radius: 0.5,
            subdivisions_axis: 6,
            subdivisions_height: 6,
            enabled: AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
            num_vertices: 0,
            num_indices: 0,
        };
        capsule.update_counts();
        capsule
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = direction.normalize();
        self
    }

    pub fn with_length(mut self, length: f32) -> Self {
        self.length = length.max(0.0);
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    pub fn with_subdivisions_axis(mut self, subdivisions: usize) -> Self {
        self.subdivisions_axis = subdivisions.max(3);
        self.update_counts();
        self
    }

    pub fn with_subdivisions_height(mut self, subdivisions: usize) -> Self {
        self.subdivisions_height = subdivisions.max(2);
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

    fn segments(&self) -> usize {
        self.subdivisions_axis + 1
    }

    fn rings(&self) -> usize {
        // one ring sequence per hemisphere, both including their equator
        (self.subdivisions_height + 1) * 2
    }

    fn update_counts(&mut self) {
        self.num_vertices = self.segments() * self.rings();
        self.num_indices = (self.segments() - 1) * (self.rings() - 1) * 6;
    }
}

impl Default for Capsule {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Capsule {
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
        let segments = self.segments();
        let half = self.subdivisions_height;
        let orient = rotation_between(&Vec3::y(), &self.direction);
        let axial_extent = self.length + 2.0 * self.radius;

        let mut positions = Vec::with_capacity(self.num_vertices);
        let mut normals = Vec::with_capacity(self.num_vertices);
        let mut tex_coords = Vec::with_capacity(self.num_vertices);
        let mut colors = Vec::with_capacity(self.num_vertices);

        let mut emit_ring = |t: f32, dy: f32| {
            // t in [0, 1] walks pole to pole over the two hemispheres
            let ring_radius = (PI * t).sin();
            let y = -(PI * t).cos();
            for s in 0..segments {
                let angle = s as f32 / (segments - 1) as f32 * 2.0 * PI;
                let (x, z) = (angle.cos(), angle.sin());
                let local_normal = Vec3::new(x * ring_radius, y, z * ring_radius);
                let local_pos = Vec3::new(
                    x * ring_radius * self.radius,
                    y * self.radius + dy * self.length,
                    z * ring_radius * self.radius,
                );
                let normal = orient * local_normal;
                positions.push(self.center + orient * local_pos);
                normals.push(normal);
                let axial = (local_pos.y + axial_extent * 0.5) / axial_extent;
                tex_coords.push(Vec2::new(s as f32 / (segments - 1) as f32, 1.0 - axial));
                colors.push(normal_color(normal));
            }
        };

        for r in 0..=half {
            emit_ring(r as f32 / half as f32 * 0.5, -0.5);
        }
        for r in 0..=half {
            emit_ring(0.5 + r as f32 / half as f32 * 0.5, 0.5);
        }

        let rings = self.rings();
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
        let capsule = Capsule::new()
            .with_subdivisions_axis(8)
            .with_subdivisions_height(4);
        let mut mesh = MeshData::new();
        capsule.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert_eq!(Source::num_vertices(&mesh), capsule.num_vertices());
        assert_eq!(mesh.indices().len(), capsule.num_indices());
    }

    #[test]
    fn points_stay_within_capsule_bounds() {
        let capsule = Capsule::new();
        let mut mesh = MeshData::new();
        capsule.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        for p in mesh.attrib_data(Attrib::Position).unwrap().chunks(3) {
            let radial = (p[0] * p[0] + p[2] * p[2]).sqrt();
            assert!(radial <= 0.5 + 1.0e-4);
            assert!(p[1].abs() <= 0.5 + 0.5 + 1.0e-4);
        }
    }

    #[test]
    fn caps_reach_the_poles() {
        let capsule = Capsule::new().with_length(2.0).with_radius(1.0);
        let mut mesh = MeshData::new();
        capsule.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        let min_y = p.chunks(3).map(|v| v[1]).fold(f32::MAX, f32::min);
        let max_y = p.chunks(3).map(|v| v[1]).fold(f32::MIN, f32::max);
        assert!((min_y + 2.0).abs() < 1.0e-4);
        assert!((max_y - 2.0).abs() < 1.0e-4);
    }

    #[test]
    fn direction_reorients_the_axis() {
        let capsule = Capsule::new().with_direction(Vec3::x());
        let mut mesh = MeshData::new();
        capsule.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        let max_x = p.chunks(3).map(|v| v[0]).fold(f32::MIN, f32::max);
        assert!((max_x - 1.0).abs() < 1.0e-4);
    }

    #[test]
    fn normals_are_unit_length() {
        let capsule = Capsule::new();
        let mut mesh = MeshData::new();
        capsule.load_into(&mut mesh, AttribSet::all()).unwrap();
        for n in mesh.attrib_data(Attrib::Normal).unwrap().chunks(3) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1.0e-3);
        }
    }
}
