//! Linear and spline-swept extrusion of closed 2D contours.
//!
//! Contours are pre-flattened polylines. The first contour is the outer
//! boundary of the cross-section; further contours cut holes. Texture
//! coordinates are 3D: u/v span the cross-section bounds, w runs along
//! the extrusion.

use bytemuck::cast_slice;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::math::{first_frame, next_frame, Mat4, Vec2, Vec3, Vec4};
use crate::mesh_data::MeshData;
use crate::source::{calc_indices_required_bytes, Source, Target};
use crate::spline::BSplineCurve;
use crate::triangulate::Triangulator;

fn contour_bounds(contours: &[Vec<Vec2>]) -> (Vec2, Vec2) {
    let mut min = Vec2::repeat(f32::MAX);
    let mut max = Vec2::repeat(f32::MIN);
    for contour in contours {
        for p in contour {
            min = min.inf(p);
            max = max.sup(p);
        }
    }
    if min.x > max.x {
        (Vec2::zeros(), Vec2::new(1.0, 1.0))
    } else {
        (min, max)
    }
}

// closed-polyline tangents by central differences
fn contour_tangents(contour: &[Vec2]) -> Vec<Vec2> {
    let n = contour.len();
    (0..n)
        .map(|i| {
            let prev = contour[(i + n - 1) % n];
            let next = contour[(i + 1) % n];
            let d = next - prev;
            if d.norm_squared() < 1.0e-12 {
                Vec2::new(1.0, 0.0)
            } else {
                d.normalize()
            }
        })
        .collect()
}

fn triangulate_cap(contours: &[Vec<Vec2>]) -> MeshData {
    let mut triangulator = Triangulator::new();
    for contour in contours {
        triangulator.add_polyline(contour);
    }
    triangulator.calc_mesh().unwrap_or_else(|err| {
        log::warn!("cap triangulation failed: {err}");
        MeshData::new()
    })
}

struct ExtrusionArrays {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tex_coords: Vec<Vec3>,
    indices: Vec<u32>,
}

impl ExtrusionArrays {
    fn new() -> Self {
        Self {
            positions: Vec::new(),
            normals: Vec::new(),
            tex_coords: Vec::new(),
            indices: Vec::new(),
        }
    }

    // quads between two consecutive rings of one contour, wrapping around
    fn push_ring_indices(&mut self, base_index: u32, ring_len: u32) {
        let mut j = ring_len - 1;
        for i in 0..ring_len {
            self.indices.extend_from_slice(&[
                base_index + i,
                base_index + j,
                base_index + ring_len + j,
            ]);
            self.indices.extend_from_slice(&[
                base_index + i,
                base_index + ring_len + j,
                base_index + ring_len + i,
            ]);
            j = i;
        }
    }
}

/// Prism from extruding the cross-section along Z, centered on the
/// contour plane. Caps can be dropped individually.
#[derive(Debug, Clone)]
pub struct Extrude {
    contours: Vec<Vec<Vec2>>,
    distance: f32,
    front_cap: bool,
    back_cap: bool,
    subdivisions: usize,
    enabled: AttribSet,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tex_coords: Vec<Vec3>,
    indices: Vec<u32>,
}

impl Extrude {
    pub fn new(contours: Vec<Vec<Vec2>>, distance: f32) -> Self {
        let mut extrude = Self {
            contours,
            distance,
            front_cap: true,
            back_cap: true,
            subdivisions: 1,
            enabled: AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
            positions: Vec::new(),
            normals: Vec::new(),
            tex_coords: Vec::new(),
            indices: Vec::new(),
        };
        extrude.calculate();
        extrude
    }

    pub fn with_caps(mut self, front: bool, back: bool) -> Self {
        self.front_cap = front;
        self.back_cap = back;
        self.calculate();
        self
    }

    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.subdivisions = subdivisions.max(1);
        self.calculate();
        self
    }

    pub fn without_attrib(mut self, attrib: Attrib) -> Self {
        self.enabled -= attrib.flag();
        self
    }

    fn calculate(&mut self) {
        let mut out = ExtrusionArrays::new();
        let (bounds_min, bounds_max) = contour_bounds(&self.contours);
        let extent = bounds_max - bounds_min;
        let uv = |p: Vec2| {
            Vec2::new(
                (p.x - bounds_min.x) / extent.x,
                1.0 - (p.y - bounds_min.y) / extent.y,
            )
        };

        let cap = triangulate_cap(&self.contours);
        let cap_positions = cap.attrib_data(Attrib::Position).unwrap_or(&[]);

        if self.front_cap {
            for p in cap_positions.chunks_exact(2) {
                let p = Vec2::new(p[0], p[1]);
                out.positions.push(Vec3::new(p.x, p.y, self.distance * 0.5));
                out.normals.push(Vec3::z());
                let t = uv(p);
                out.tex_coords.push(Vec3::new(t.x, t.y, 0.0));
            }
            out.indices.extend_from_slice(cap.indices());
        }
        if self.back_cap {
            let base = out.positions.len() as u32;
            for p in cap_positions.chunks_exact(2) {
                let p = Vec2::new(p[0], p[1]);
                out.positions.push(Vec3::new(p.x, p.y, -self.distance * 0.5));
                out.normals.push(-Vec3::z());
                let t = uv(p);
                out.tex_coords.push(Vec3::new(t.x, t.y, 1.0));
            }
            // reversed winding
            for tri in cap.indices().chunks_exact(3) {
                out.indices
                    .extend_from_slice(&[tri[2] + base, tri[1] + base, tri[0] + base]);
            }
        }

        // side walls get their own vertices, the caps' normals are wrong
        for contour in &self.contours {
            let tangents = contour_tangents(contour);
            for sub in 0..=self.subdivisions {
                let t = sub as f32 / self.subdivisions as f32;
                let distance = (0.5 - t) * self.distance;
                let base_index = out.positions.len() as u32;
                for (p, tan) in contour.iter().zip(&tangents) {
                    out.positions.push(Vec3::new(p.x, p.y, distance));
                    out.normals.push(Vec3::new(tan.y, -tan.x, 0.0));
                    let tc = uv(*p);
                    out.tex_coords.push(Vec3::new(tc.x, tc.y, t));
                }
                if sub != self.subdivisions {
                    out.push_ring_indices(base_index, contour.len() as u32);
                }
            }
        }

        self.positions = out.positions;
        self.normals = out.normals;
        self.tex_coords = out.tex_coords;
        self.indices = out.indices;
    }
}

impl Source for Extrude {
    fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    fn num_indices(&self) -> usize {
        self.indices.len()
    }

    fn primitive(&self) -> Primitive {
        Primitive::Triangles
    }

    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        if !self.enabled.contains_attrib(attrib) {
            return 0;
        }
        match attrib {
            Attrib::Position | Attrib::Normal | Attrib::TexCoord0 => 3,
            _ => 0,
        }
    }

    fn available_attribs(&self) -> AttribSet {
        self.enabled
    }

    fn load_into(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        load_extrusion(
            target,
            requested & self.enabled,
            &self.positions,
            &self.normals,
            &self.tex_coords,
            &self.indices,
        )
    }
}

fn load_extrusion(
    target: &mut dyn Target,
    wanted: AttribSet,
    positions: &[Vec3],
    normals: &[Vec3],
    tex_coords: &[Vec3],
    indices: &[u32],
) -> Result<()> {
    let count = positions.len();
    target.copy_attrib(Attrib::Position, 3, 0, cast_slice(positions), count)?;
    if wanted.contains_attrib(Attrib::Normal) {
        target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(normals), count)?;
    }
    if wanted.contains_attrib(Attrib::TexCoord0) {
        target.copy_attrib(Attrib::TexCoord0, 3, 0, cast_slice(tex_coords), count)?;
    }
    target.copy_indices(
        Primitive::Triangles,
        indices,
        calc_indices_required_bytes(indices.len()),
    )
}

/// Extrusion swept along a 3D b-spline with parallel-transport frames,
/// sampled at uniform arc-length steps.
#[derive(Debug, Clone)]
pub struct ExtrudeSpline {
    contours: Vec<Vec<Vec2>>,
    frames: Vec<Mat4>,
    spline_times: Vec<f32>,
    front_cap: bool,
    back_cap: bool,
    subdivisions: usize,
    enabled: AttribSet,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tex_coords: Vec<Vec3>,
    indices: Vec<u32>,
}

impl ExtrudeSpline {
    pub fn new(contours: Vec<Vec<Vec2>>, spline: &BSplineCurve<3>, subdivisions: usize) -> Self {
        let subdivisions = subdivisions.max(1);
        let spline_length = spline.length(0.0, 1.0);
        let mut prev_pos = spline.position(0.0);
        let mut prev_tangent = spline.derivative(0.0);
        let mut frames = vec![first_frame(
            prev_pos,
            spline.position(0.1),
            spline.position(0.2),
        )];
        let mut spline_times = vec![0.0];
        for sub in 1..=subdivisions {
            let t = spline.time(sub as f32 / subdivisions as f32 * spline_length);
            let cur_pos = spline.position(t);
            let cur_tangent = spline.derivative(t).normalize();
            let prev_frame = frames[frames.len() - 1];
            frames.push(next_frame(
                &prev_frame,
                prev_pos,
                cur_pos,
                prev_tangent,
                cur_tangent,
            ));
            spline_times.push(t);
            prev_pos = cur_pos;
            prev_tangent = cur_tangent;
        }

        let mut extrude = Self {
            contours,
            frames,
            spline_times,
            front_cap: true,
            back_cap: true,
            subdivisions,
            enabled: AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
            positions: Vec::new(),
            normals: Vec::new(),
            tex_coords: Vec::new(),
            indices: Vec::new(),
        };
        extrude.calculate();
        extrude
    }

    pub fn with_caps(mut self, front: bool, back: bool) -> Self {
        self.front_cap = front;
        self.back_cap = back;
        self.calculate();
        self
    }

    pub fn without_attrib(mut self, attrib: Attrib) -> Self {
        self.enabled -= attrib.flag();
        self
    }

    fn calculate(&mut self) {
        let mut out = ExtrusionArrays::new();
        let (bounds_min, bounds_max) = contour_bounds(&self.contours);
        let extent = bounds_max - bounds_min;
        let uv = |p: Vec2| {
            Vec2::new(
                (p.x - bounds_min.x) / extent.x,
                1.0 - (p.y - bounds_min.y) / extent.y,
            )
        };

        let cap = triangulate_cap(&self.contours);
        let cap_positions = cap.attrib_data(Attrib::Position).unwrap_or(&[]);
        let first = self.frames[0];
        let last = self.frames[self.frames.len() - 1];

        if self.front_cap {
            let normal = first * Vec4::new(0.0, 0.0, -1.0, 0.0);
            for p in cap_positions.chunks_exact(2) {
                let world = first * Vec4::new(p[0], p[1], 0.0, 1.0);
                out.positions.push(world.xyz());
                out.normals.push(normal.xyz());
                let t = uv(Vec2::new(p[0], p[1]));
                out.tex_coords.push(Vec3::new(t.x, t.y, 0.0));
            }
            out.indices.extend_from_slice(cap.indices());
        }
        if self.back_cap {
            let base = out.positions.len() as u32;
            let normal = last * Vec4::new(0.0, 0.0, 1.0, 0.0);
            for p in cap_positions.chunks_exact(2) {
                let world = last * Vec4::new(p[0], p[1], 0.0, 1.0);
                out.positions.push(world.xyz());
                out.normals.push(normal.xyz());
                let t = uv(Vec2::new(p[0], p[1]));
                out.tex_coords.push(Vec3::new(t.x, t.y, 1.0));
            }
            // reversed winding
            for tri in cap.indices().chunks_exact(3) {
                out.indices
                    .extend_from_slice(&[tri[2] + base, tri[1] + base, tri[0] + base]);
            }
        }

        for contour in &self.contours {
            let tangents = contour_tangents(contour);
            for sub in 0..=self.subdivisions {
                let transform = self.frames[sub];
                let base_index = out.positions.len() as u32;
                for (p, tan) in contour.iter().zip(&tangents) {
                    let world = transform * Vec4::new(p.x, p.y, 0.0, 1.0);
                    let normal = transform * Vec4::new(tan.y, -tan.x, 0.0, 0.0);
                    out.positions.push(world.xyz());
                    out.normals.push(normal.xyz());
                    let tc = uv(*p);
                    out.tex_coords
                        .push(Vec3::new(tc.x, tc.y, self.spline_times[sub]));
                }
                if sub != self.subdivisions {
                    out.push_ring_indices(base_index, contour.len() as u32);
                }
            }
        }

        self.positions = out.positions;
        self.normals = out.normals;
        self.tex_coords = out.tex_coords;
        self.indices = out.indices;
    }
}

impl Source for ExtrudeSpline {
    fn num_vertices(&self) -> usize {
        self.positions.len()
    }

    fn num_indices(&self) -> usize {
        self.indices.len()
    }

    fn primitive(&self) -> Primitive {
        Primitive::Triangles
    }

    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        if !self.enabled.contains_attrib(attrib) {
            return 0;
        }
        match attrib {
            Attrib::Position | Attrib::Normal | Attrib::TexCoord0 => 3,
            _ => 0,
        }
    }

    fn available_attribs(&self) -> AttribSet {
        self.enabled
    }

    fn load_into(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        load_extrusion(
            target,
            requested & self.enabled,
            &self.positions,
            &self.normals,
            &self.tex_coords,
            &self.indices,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Vec2> {
        vec![
            Vec2::new(-1.0, -1.0),
            Vec2::new(1.0, -1.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(-1.0, 1.0),
        ]
    }

    #[test]
    fn square_prism_has_caps_and_walls() {
        let extrude = Extrude::new(vec![square()], 2.0);
        // 4 verts per cap, 4 per wall ring, 2 rings
        assert_eq!(extrude.num_vertices(), 4 + 4 + 8);
        // 2 cap triangles each plus 8 wall triangles
        assert_eq!(extrude.num_indices(), 6 + 6 + 24);

        let mut mesh = MeshData::new();
        extrude.load_into(&mut mesh, AttribSet::all()).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        let max_z = p.chunks(3).map(|v| v[2]).fold(f32::MIN, f32::max);
        let min_z = p.chunks(3).map(|v| v[2]).fold(f32::MAX, f32::min);
        assert!((max_z - 1.0).abs() < 1.0e-5);
        assert!((min_z + 1.0).abs() < 1.0e-5);
    }

    #[test]
    fn dropping_caps_removes_their_geometry() {
        let closed = Extrude::new(vec![square()], 2.0);
        let open = Extrude::new(vec![square()], 2.0).with_caps(false, false);
        assert_eq!(closed.num_vertices() - open.num_vertices(), 8);
        assert_eq!(closed.num_indices() - open.num_indices(), 12);
    }

    #[test]
    fn wall_texcoord_w_spans_the_extrusion() {
        let extrude = Extrude::new(vec![square()], 1.0)
            .with_caps(false, false)
            .with_subdivisions(4);
        let mut mesh = MeshData::new();
        extrude.load_into(&mut mesh, AttribSet::all()).unwrap();
        let tc = mesh.attrib_data(Attrib::TexCoord0).unwrap();
        let max_w = tc.chunks(3).map(|v| v[2]).fold(f32::MIN, f32::max);
        let min_w = tc.chunks(3).map(|v| v[2]).fold(f32::MAX, f32::min);
        assert_eq!(min_w, 0.0);
        assert_eq!(max_w, 1.0);
    }

    #[test]
    fn spline_extrusion_follows_the_path() {
        let spline = BSplineCurve::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
                Vec3::new(0.0, 2.0, 0.0),
                Vec3::new(0.0, 3.0, 0.0),
            ],
            3,
        );
        let extrude = ExtrudeSpline::new(vec![square()], &spline, 8);
        assert_eq!(extrude.num_vertices(), 4 + 4 + 9 * 4);

        let mut mesh = MeshData::new();
        extrude.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        let max_y = p.chunks(3).map(|v| v[1]).fold(f32::MIN, f32::max);
        assert!(max_y > 2.9);
    }
}
