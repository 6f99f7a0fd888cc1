//! Disc and ring generators, both 2D in the XY plane.

use bytemuck::cast_slice;
use std::f32::consts::PI;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::math::{Vec2, Vec3};
use crate::source::{Source, Target};

/// Filled disc, emitted as a non-indexed triangle fan: center vertex,
/// `subdivisions` ring points and one closing duplicate.
#[derive(Debug, Clone)]
pub struct Circle {
    center: Vec2,
    radius: f32,
    requested_subdivisions: i32,
    subdivisions: usize,
    num_vertices: usize,
    enabled: AttribSet,
}

impl Circle {
    pub fn new() -> Self {
        let mut circle = Self {
            center: Vec2::zeros(),
            radius: 1.0,
            requested_subdivisions: -1,
            subdivisions: 0,
            num_vertices: 0,
            enabled: AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
        };
        circle.update_vertex_counts();
        circle
    }

    pub fn with_center(mut self, center: Vec2) -> Self {
        self.center = center;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self.update_vertex_counts();
        self
    }

    /// Explicit ring-point count; non-positive derives one from the
    /// radius (one point per unit of circumference, at least 3).
    pub fn with_subdivisions(mut self, subdivisions: i32) -> Self {
        self.requested_subdivisions = subdivisions;
        self.update_vertex_counts();
        self
    }

    pub fn without_attrib(mut self, attrib: Attrib) -> Self {
        self.enabled -= attrib.flag();
        self
    }

    fn update_vertex_counts(&mut self) {
        self.subdivisions = if self.requested_subdivisions > 0 {
            self.requested_subdivisions as usize
        } else {
            ((self.radius * 2.0 * PI).floor() as usize).max(3)
        };
        self.num_vertices = self.subdivisions + 2;
    }
}

impl Default for Circle {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Circle {
    fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    fn primitive(&self) -> Primitive {
        Primitive::TriangleFan
    }

    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        if !self.enabled.contains_attrib(attrib) {
            return 0;
        }
        match attrib {
            Attrib::Position | Attrib::TexCoord0 => 2,
            Attrib::Normal => 3,
            _ => 0,
        }
    }

    fn available_attribs(&self) -> AttribSet {
        self.enabled
    }

    fn load_into(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        let wanted = requested & self.enabled;

        let mut positions = Vec::with_capacity(self.num_vertices);
        let mut tex_coords = Vec::with_capacity(self.num_vertices);
        positions.push(self.center);
        tex_coords.push(Vec2::new(0.5, 0.5));
        for s in 0..=self.subdivisions {
            let angle = s as f32 / self.subdivisions as f32 * 2.0 * PI;
            let unit = Vec2::new(angle.cos(), angle.sin());
            positions.push(self.center + unit * self.radius);
            tex_coords.push(unit * 0.5 + Vec2::new(0.5, 0.5));
        }

        let count = positions.len();
        target.copy_attrib(Attrib::Position, 2, 0, cast_slice(&positions), count)?;
        if wanted.contains_attrib(Attrib::TexCoord0) {
            target.copy_attrib(Attrib::TexCoord0, 2, 0, cast_slice(&tex_coords), count)?;
        }
        if wanted.contains_attrib(Attrib::Normal) {
            let normals = vec![Vec3::z(); count];
            target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(&normals), count)?;
        }
        Ok(())
    }
}

/// Annulus emitted as a non-indexed triangle strip alternating outer and
/// inner ring points.
#[derive(Debug, Clone)]
pub struct Ring {
    center: Vec2,
    radius: f32,
    width: f32,
    requested_subdivisions: i32,
    subdivisions: usize,
    num_vertices: usize,
    enabled: AttribSet,
}

impl Ring {
    pub fn new() -> Self {
        let mut ring = Self {
            center: Vec2::zeros(),
            radius: 1.0,
            width: 0.2,
            requested_subdivisions: -1,
            subdivisions: 0,
            num_vertices: 0,
            enabled: AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
        };
        ring.update_vertex_counts();
        ring
    }

    pub fn with_center(mut self, center: Vec2) -> Self {
        self.center = center;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self.update_vertex_counts();
        self
    }

    pub fn with_width(mut self, width: f32) -> Self {
        self.width = width;
        self
    }

    pub fn with_subdivisions(mut self, subdivisions: i32) -> Self {
        self.requested_subdivisions = subdivisions;
        self.update_vertex_counts();
        self
    }

    pub fn without_attrib(mut self, attrib: Attrib) -> Self {
        self.enabled -= attrib.flag();
        self
    }

    fn update_vertex_counts(&mut self) {
        self.subdivisions = if self.requested_subdivisions > 0 {
            self.requested_subdivisions as usize
        } else {
            ((self.radius * 2.0 * PI).floor() as usize).max(3)
        };
        self.num_vertices = (self.subdivisions + 1) * 2;
    }
}

impl Default for Ring {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Ring {
    fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    fn primitive(&self) -> Primitive {
        Primitive::TriangleStrip
    }

    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        if !self.enabled.contains_attrib(attrib) {
            return 0;
        }
        match attrib {
            Attrib::Position | Attrib::TexCoord0 => 2,
            Attrib::Normal => 3,
            _ => 0,
        }
    }

    fn available_attribs(&self) -> AttribSet {
        self.enabled
    }

    fn load_into(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        let wanted = requested & self.enabled;
        let outer = self.radius + self.width * 0.5;
        let inner = (self.radius - self.width * 0.5).max(0.0);

        let mut positions = Vec::with_capacity(self.num_vertices);
        let mut tex_coords = Vec::with_capacity(self.num_vertices);
        for s in 0..=self.subdivisions {
            let angle = s as f32 / self.subdivisions as f32 * 2.0 * PI;
            let unit = Vec2::new(angle.cos(), angle.sin());
            positions.push(self.center + unit * outer);
            positions.push(self.center + unit * inner);
            let u = s as f32 / self.subdivisions as f32;
            tex_coords.push(Vec2::new(u, 1.0));
            tex_coords.push(Vec2::new(u, 0.0));
        }

        let count = positions.len();
        target.copy_attrib(Attrib::Position, 2, 0, cast_slice(&positions), count)?;
        if wanted.contains_attrib(Attrib::TexCoord0) {
            target.copy_attrib(Attrib::TexCoord0, 2, 0, cast_slice(&tex_coords), count)?;
        }
        if wanted.contains_attrib(Attrib::Normal) {
            let normals = vec![Vec3::z(); count];
            target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(&normals), count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::MeshData;

    #[test]
    fn circle_with_eight_subdivisions_has_ten_vertices() {
        let circle = Circle::new().with_subdivisions(8);
        assert_eq!(circle.num_vertices(), 10);
        assert_eq!(circle.num_indices(), 0);
        assert_eq!(Source::primitive(&circle), Primitive::TriangleFan);

        let mut mesh = MeshData::new();
        circle.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert_eq!(Source::num_vertices(&mesh), 10);
        assert!(mesh.indices().is_empty());
    }

    #[test]
    fn circle_auto_subdivisions_follow_radius() {
        // floor(2 * pi * 2) = 12 ring points
        let circle = Circle::new().with_radius(2.0);
        assert_eq!(circle.num_vertices(), 14);
        // tiny radius clamps to 3
        let tiny = Circle::new().with_radius(0.1);
        assert_eq!(tiny.num_vertices(), 5);
    }

    #[test]
    fn circle_closes_on_itself() {
        let circle = Circle::new().with_subdivisions(6);
        let mut mesh = MeshData::new();
        circle.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        let first_ring = &p[2..4];
        let last = &p[p.len() - 2..];
        assert!((first_ring[0] - last[0]).abs() < 1.0e-5);
        assert!((first_ring[1] - last[1]).abs() < 1.0e-5);
    }

    #[test]
    fn ring_counts_match_loaded_data() {
        let ring = Ring::new().with_subdivisions(12);
        assert_eq!(ring.num_vertices(), 26);
        let mut mesh = MeshData::new();
        ring.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert_eq!(Source::num_vertices(&mesh), ring.num_vertices());
    }

    #[test]
    fn ring_radii_alternate_outer_inner() {
        let ring = Ring::new().with_radius(2.0).with_width(1.0).with_subdivisions(8);
        let mut mesh = MeshData::new();
        ring.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        for (i, v) in p.chunks(2).enumerate() {
            let r = (v[0] * v[0] + v[1] * v[1]).sqrt();
            let expected = if i % 2 == 0 { 2.5 } else { 1.5 };
            assert!((r - expected).abs() < 1.0e-4);
        }
    }
}
