//! Wireframe sources. All of these emit `Primitive::Lines` with 3D
//! positions and nothing else.

use bytemuck::cast_slice;
use std::f32::consts::PI;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::math::{rotation_between, Vec2, Vec3};
use crate::shapes::icosahedron::{base_vertex, BASE_INDICES};
use crate::source::{Source, Target};

fn load_lines(target: &mut dyn Target, positions: &[Vec3]) -> Result<()> {
    target.copy_attrib(Attrib::Position, 3, 0, cast_slice(positions), positions.len())
}

macro_rules! wire_source {
    ($ty:ty) => {
        impl Source for $ty {
            fn num_vertices(&self) -> usize {
                self.vertex_count()
            }

            fn primitive(&self) -> Primitive {
                Primitive::Lines
            }

            fn attrib_dims(&self, attrib: Attrib) -> u8 {
                if attrib == Attrib::Position {
                    3
                } else {
                    0
                }
            }

            fn available_attribs(&self) -> AttribSet {
                AttribSet::POSITION
            }

            fn load_into(&self, target: &mut dyn Target, _requested: AttribSet) -> Result<()> {
                load_lines(target, &self.tessellate())
            }
        }
    };
}

/// Rectangle outline in the XY plane.
#[derive(Debug, Clone)]
pub struct WireRect {
    center: Vec2,
    size: Vec2,
}

impl WireRect {
    pub fn new() -> Self {
        Self {
            center: Vec2::zeros(),
            size: Vec2::new(1.0, 1.0),
        }
    }

    pub fn with_center(mut self, center: Vec2) -> Self {
        self.center = center;
        self
    }

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    fn vertex_count(&self) -> usize {
        8
    }

    fn tessellate(&self) -> Vec<Vec3> {
        let half = self.size * 0.5;
        let corner = |x: f32, y: f32| {
            Vec3::new(self.center.x + x * half.x, self.center.y + y * half.y, 0.0)
        };
        vec![
            corner(-1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, -1.0),
            corner(1.0, 1.0),
            corner(1.0, 1.0),
            corner(-1.0, 1.0),
            corner(-1.0, 1.0),
            corner(-1.0, -1.0),
        ]
    }
}

impl Default for WireRect {
    fn default() -> Self {
        Self::new()
    }
}

wire_source!(WireRect);

/// Axis-aligned box edges, each edge split into `subdivisions` segments.
#[derive(Debug, Clone)]
pub struct WireCube {
    center: Vec3,
    size: Vec3,
    subdivisions: usize,
}

impl WireCube {
    pub fn new() -> Self {
        Self {
            center: Vec3::zeros(),
            size: Vec3::new(2.0, 2.0, 2.0),
            subdivisions: 1,
        }
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn with_size(mut self, size: Vec3) -> Self {
        self.size = size;
        self
    }

    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.subdivisions = subdivisions.max(1);
        self
    }

    fn vertex_count(&self) -> usize {
        12 * self.subdivisions * 2
    }

    fn tessellate(&self) -> Vec<Vec3> {
        let half = self.size * 0.5;
        let corner = |x: f32, y: f32, z: f32| {
            self.center + Vec3::new(x * half.x, y * half.y, z * half.z)
        };
        let corners = [
            corner(-1.0, -1.0, -1.0),
            corner(1.0, -1.0, -1.0),
            corner(1.0, 1.0, -1.0),
            corner(-1.0, 1.0, -1.0),
            corner(-1.0, -1.0, 1.0),
            corner(1.0, -1.0, 1.0),
            corner(1.0, 1.0, 1.0),
            corner(-1.0, 1.0, 1.0),
        ];
        const EDGES: [(usize, usize); 12] = [
            (0, 1), (1, 2), (2, 3), (3, 0),
            (4, 5), (5, 6), (6, 7), (7, 4),
            (0, 4), (1, 5), (2, 6), (3, 7),
        ];

        let mut positions = Vec::with_capacity(self.vertex_count());
        for (a, b) in EDGES {
            let (from, to) = (corners[a], corners[b]);
            for s in 0..self.subdivisions {
                let t0 = s as f32 / self.subdivisions as f32;
                let t1 = (s + 1) as f32 / self.subdivisions as f32;
                positions.push(from + (to - from) * t0);
                positions.push(from + (to - from) * t1);
            }
        }
        positions
    }
}

impl Default for WireCube {
    fn default() -> Self {
        Self::new()
    }
}

wire_source!(WireCube);

/// Circle outline in the XY plane. Subdivisions default to a
/// circumference-derived count, like the solid circle.
#[derive(Debug, Clone)]
pub struct WireCircle {
    center: Vec2,
    radius: f32,
    requested_subdivisions: i32,
}

impl WireCircle {
    pub fn new() -> Self {
        Self {
            center: Vec2::zeros(),
            radius: 1.0,
            requested_subdivisions: -1,
        }
    }

    pub fn with_center(mut self, center: Vec2) -> Self {
        self.center = center;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.requested_subdivisions = subdivisions as i32;
        self
    }

    fn subdivisions(&self) -> usize {
        if self.requested_subdivisions > 2 {
            self.requested_subdivisions as usize
        } else {
            ((self.radius * 2.0 * PI).floor() as usize).max(3)
        }
    }

    fn vertex_count(&self) -> usize {
        self.subdivisions() * 2
    }

    fn tessellate(&self) -> Vec<Vec3> {
        let subdivisions = self.subdivisions();
        let point = |s: usize| {
            let angle = (s % subdivisions) as f32 / subdivisions as f32 * 2.0 * PI;
            Vec3::new(
                self.center.x + angle.cos() * self.radius,
                self.center.y + angle.sin() * self.radius,
                0.0,
            )
        };
        let mut positions = Vec::with_capacity(self.vertex_count());
        for s in 0..subdivisions {
            positions.push(point(s));
            positions.push(point(s + 1));
        }
        positions
    }
}

impl Default for WireCircle {
    fn default() -> Self {
        Self::new()
    }
}

wire_source!(WireCircle);

/// Grid of full-span lines across a plane.
#[derive(Debug, Clone)]
pub struct WirePlane {
    origin: Vec3,
    u_axis: Vec3,
    v_axis: Vec3,
    size: Vec2,
    subdivisions: (usize, usize),
}

impl WirePlane {
    pub fn new() -> Self {
        Self {
            origin: Vec3::zeros(),
            u_axis: Vec3::x(),
            v_axis: Vec3::z(),
            size: Vec2::new(2.0, 2.0),
            subdivisions: (1, 1),
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

    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self
    }

    pub fn with_subdivisions(mut self, x: usize, y: usize) -> Self {
        self.subdivisions = (x.max(1), y.max(1));
        self
    }

    fn vertex_count(&self) -> usize {
        ((self.subdivisions.0 + 1) + (self.subdivisions.1 + 1)) * 2
    }

    fn tessellate(&self) -> Vec<Vec3> {
        let (sx, sy) = self.subdivisions;
        let at = |u: f32, v: f32| {
            self.origin
                + self.u_axis * self.size.x * (u - 0.5)
                + self.v_axis * self.size.y * (v - 0.5)
        };
        let mut positions = Vec::with_capacity(self.vertex_count());
        for x in 0..=sx {
            let u = x as f32 / sx as f32;
            positions.push(at(u, 0.0));
            positions.push(at(u, 1.0));
        }
        for y in 0..=sy {
            let v = y as f32 / sy as f32;
            positions.push(at(0.0, v));
            positions.push(at(1.0, v));
        }
        positions
    }
}

impl Default for WirePlane {
    fn default() -> Self {
        Self::new()
    }
}

wire_source!(WirePlane);

/// The 30 unique edges of a unit icosahedron.
#[derive(Debug, Clone)]
pub struct WireIcosahedron {
    radius: f32,
}

impl WireIcosahedron {
    pub fn new() -> Self {
        Self { radius: 1.0 }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    fn vertex_count(&self) -> usize {
        30 * 2
    }

    fn tessellate(&self) -> Vec<Vec3> {
        let mut edges: Vec<(u32, u32)> = Vec::with_capacity(30);
        for tri in BASE_INDICES.chunks(3) {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                let edge = (a.min(b), a.max(b));
                if !edges.contains(&edge) {
                    edges.push(edge);
                }
            }
        }

        let mut positions = Vec::with_capacity(self.vertex_count());
        for (a, b) in edges {
            positions.push(base_vertex(a) * self.radius);
            positions.push(base_vertex(b) * self.radius);
        }
        positions
    }
}

impl Default for WireIcosahedron {
    fn default() -> Self {
        Self::new()
    }
}

wire_source!(WireIcosahedron);

/// Three orthogonal great circles, plus optional extra latitude bands.
#[derive(Debug, Clone)]
pub struct WireSphere {
    center: Vec3,
    radius: f32,
    subdivisions_circle: usize,
    latitude_bands: usize,
}

impl WireSphere {
    pub fn new() -> Self {
        Self {
            center: Vec3::zeros(),
            radius: 1.0,
            subdivisions_circle: 36,
            latitude_bands: 0,
        }
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    pub fn with_subdivisions_circle(mut self, subdivisions: usize) -> Self {
        self.subdivisions_circle = subdivisions.max(3);
        self
    }

    pub fn with_latitude_bands(mut self, bands: usize) -> Self {
        self.latitude_bands = bands;
        self
    }

    fn vertex_count(&self) -> usize {
        (3 + self.latitude_bands) * self.subdivisions_circle * 2
    }

    fn push_circle(&self, positions: &mut Vec<Vec3>, normal: Vec3, offset: f32, radius: f32) {
        let orient = rotation_between(&Vec3::z(), &normal);
        let subdivisions = self.subdivisions_circle;
        let point = |s: usize| {
            let angle = (s % subdivisions) as f32 / subdivisions as f32 * 2.0 * PI;
            let local = Vec3::new(angle.cos() * radius, angle.sin() * radius, offset);
            self.center + orient * local
        };
        for s in 0..subdivisions {
            positions.push(point(s));
            positions.push(point(s + 1));
        }
    }

    fn tessellate(&self) -> Vec<Vec3> {
        let mut positions = Vec::with_capacity(self.vertex_count());
        self.push_circle(&mut positions, Vec3::x(), 0.0, self.radius);
        self.push_circle(&mut positions, Vec3::y(), 0.0, self.radius);
        self.push_circle(&mut positions, Vec3::z(), 0.0, self.radius);
        for band in 0..self.latitude_bands {
            let t = (band + 1) as f32 / (self.latitude_bands + 1) as f32;
            let phi = (t - 0.5) * PI;
            self.push_circle(
                &mut positions,
                Vec3::y(),
                phi.sin() * self.radius,
                phi.cos() * self.radius,
            );
        }
        positions
    }
}

impl Default for WireSphere {
    fn default() -> Self {
        Self::new()
    }
}

wire_source!(WireSphere);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::MeshData;

    fn load(source: &dyn Source) -> Vec<f32> {
        assert_eq!(source.primitive(), Primitive::Lines);
        let mut mesh = MeshData::new();
        source.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert_eq!(Source::num_vertices(&mesh), source.num_vertices());
        mesh.attrib_data(Attrib::Position).unwrap().to_vec()
    }

    #[test]
    fn wire_rect_closes_its_outline() {
        let rect = WireRect::new();
        let p = load(&rect);
        assert_eq!(p.len(), 8 * 3);
        // last segment returns to the first corner
        assert_eq!(&p[p.len() - 3..], &p[0..3]);
    }

    #[test]
    fn wire_cube_subdivides_every_edge() {
        assert_eq!(WireCube::new().num_vertices(), 24);
        assert_eq!(WireCube::new().with_subdivisions(4).num_vertices(), 96);
    }

    #[test]
    fn wire_circle_auto_subdivides_from_radius() {
        let c = WireCircle::new().with_radius(3.0);
        // floor(2*pi*3) = 18 segments
        assert_eq!(c.num_vertices(), 36);
        let p = load(&c);
        for v in p.chunks(3) {
            let r = (v[0] * v[0] + v[1] * v[1]).sqrt();
            assert!((r - 3.0).abs() < 1.0e-4);
        }
    }

    #[test]
    fn wire_plane_emits_full_span_grid_lines() {
        let plane = WirePlane::new().with_subdivisions(4, 2);
        assert_eq!(plane.num_vertices(), (5 + 3) * 2);
    }

    #[test]
    fn wire_icosahedron_has_thirty_edges() {
        let ico = WireIcosahedron::new();
        let p = load(&ico);
        assert_eq!(p.len(), 60 * 3);
        for v in p.chunks(3) {
            let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((r - 1.0).abs() < 1.0e-4);
        }
    }

    #[test]
    fn wire_sphere_bands_add_circles() {
        let plain = WireSphere::new();
        let banded = WireSphere::new().with_latitude_bands(2);
        assert_eq!(plain.num_vertices(), 3 * 36 * 2);
        assert_eq!(banded.num_vertices() - plain.num_vertices(), 2 * 36 * 2);
        let p = load(&banded);
        for v in p.chunks(3) {
            let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!(r <= 1.0 + 1.0e-4);
        }
    }
}
