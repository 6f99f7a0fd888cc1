//! Icosahedron and subdivided icosphere generators.

use bytemuck::cast_slice;
use std::collections::HashMap;
use std::f32::consts::PI;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::math::{Vec2, Vec3};
use crate::shapes::normal_color;
use crate::source::{calc_indices_required_bytes, Source, Target};

// Golden-ratio icosahedron base data; positions are normalized on use.
const PHI: f32 = 0.618_034; // 1 / ((1 + sqrt(5)) / 2)

#[rustfmt::skip]
const BASE_POSITIONS: [[f32; 3]; 12] = [
    [-PHI, 1.0, 0.0], [PHI, 1.0, 0.0], [-PHI, -1.0, 0.0], [PHI, -1.0, 0.0],
    [0.0, -PHI, 1.0], [0.0, PHI, 1.0], [0.0, -PHI, -1.0], [0.0, PHI, -1.0],
    [1.0, 0.0, -PHI], [1.0, 0.0, PHI], [-1.0, 0.0, -PHI], [-1.0, 0.0, PHI],
];

#[rustfmt::skip]
pub(super) const BASE_INDICES: [u32; 60] = [
    0, 11, 5,  0, 5, 1,   0, 1, 7,   0, 7, 10,  0, 10, 11,
    5, 11, 4,  1, 5, 9,   7, 1, 8,   10, 7, 6,  11, 10, 2,
    3, 9, 4,   3, 4, 2,   3, 2, 6,   3, 6, 8,   3, 8, 9,
    9, 5, 4,   4, 11, 2,  2, 10, 6,  6, 7, 8,   8, 1, 9,
];

pub(super) fn base_vertex(i: u32) -> Vec3 {
    let p = BASE_POSITIONS[i as usize];
    Vec3::new(p[0], p[1], p[2]).normalize()
}

fn equirect_uv(p: &Vec3) -> Vec2 {
    Vec2::new(
        (p.z.atan2(-p.x) / PI) * 0.5 + 0.5,
        -p.y * 0.5 + 0.5,
    )
}

/// Regular icosahedron with flat per-face shading.
///
/// Every triangle gets its own three vertices so normals and texture
/// coordinates stay per-face; 60 vertices and 60 sequential indices.
#[derive(Debug, Clone)]
pub struct Icosahedron {
    radius: f32,
    enabled: AttribSet,
}

impl Icosahedron {
    pub fn new() -> Self {
        Self {
            radius: 1.0,
            enabled: AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
        }
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    /// Enable debug colors derived from vertex positions.
    pub fn with_colors(mut self) -> Self {
        self.enabled |= AttribSet::COLOR;
        self
    }

    pub fn without_attrib(mut self, attrib: Attrib) -> Self {
        self.enabled -= attrib.flag();
        self
    }
}

impl Default for Icosahedron {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Icosahedron {
    fn num_vertices(&self) -> usize {
        60
    }

    fn num_indices(&self) -> usize {
        60
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

        let mut positions = Vec::with_capacity(60);
        let mut normals = Vec::with_capacity(60);
        let mut tex_coords = Vec::with_capacity(60);
        let mut colors = Vec::with_capacity(60);

        for tri in BASE_INDICES.chunks(3) {
            let corners = [base_vertex(tri[0]), base_vertex(tri[1]), base_vertex(tri[2])];
            let face_normal = ((corners[0] + corners[1] + corners[2]) / 3.0).normalize();
            for corner in corners {
                positions.push(corner * self.radius);
                normals.push(face_normal);
                tex_coords.push(equirect_uv(&corner));
                colors.push(normal_color(corner));
            }
        }
        let indices: Vec<u32> = (0..60).collect();

        target.copy_attrib(Attrib::Position, 3, 0, cast_slice(&positions), 60)?;
        if wanted.contains_attrib(Attrib::Normal) {
            target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(&normals), 60)?;
        }
        if wanted.contains_attrib(Attrib::TexCoord0) {
            target.copy_attrib(Attrib::TexCoord0, 2, 0, cast_slice(&tex_coords), 60)?;
        }
        if wanted.contains_attrib(Attrib::Color) {
            target.copy_attrib(Attrib::Color, 3, 0, cast_slice(&colors), 60)?;
        }
        target.copy_indices(Primitive::Triangles, &indices, 1)?;
        Ok(())
    }
}

/// Sphere built by midpoint-subdividing an icosahedron and projecting onto
/// the unit sphere, with a seam-fixing pass for the wrapped longitude.
#[derive(Debug, Clone)]
pub struct Icosphere {
    radius: f32,
    subdivisions: usize,
    enabled: AttribSet,
    positions: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    indices: Vec<u32>,
}

impl Icosphere {
    pub fn new() -> Self {
        let mut sphere = Self {
            radius: 1.0,
            subdivisions: 3,
            enabled: AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
            positions: Vec::new(),
            tex_coords: Vec::new(),
            indices: Vec::new(),
        };
        sphere.calculate();
        sphere
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        self.subdivisions = subdivisions.min(8);
        self.calculate();
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

    fn calculate(&mut self) {
        self.positions = (0..12).map(|i| base_vertex(i as u32)).collect();
        self.indices = BASE_INDICES.to_vec();

        for _ in 0..self.subdivisions {
            self.subdivide();
        }
        for p in &mut self.positions {
            p.normalize_mut();
        }
        self.tex_coords = self.positions.iter().map(equirect_uv).collect();
        self.fix_seam();
    }

    // One subdivision pass: every triangle splits into four, edge midpoints
    // shared between neighboring triangles.
    fn subdivide(&mut self) {
        let mut midpoints: HashMap<(u32, u32), u32> = HashMap::new();
        let old_indices = std::mem::take(&mut self.indices);
        self.indices.reserve(old_indices.len() * 4);

        let mut midpoint = |a: u32, b: u32, positions: &mut Vec<Vec3>| -> u32 {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let mid = (positions[a as usize] + positions[b as usize]) * 0.5;
                positions.push(mid);
                positions.len() as u32 - 1
            })
        };

        for tri in old_indices.chunks(3) {
            let (a, b, c) = (tri[0], tri[1], tri[2]);
            let ab = midpoint(a, b, &mut self.positions);
            let bc = midpoint(b, c, &mut self.positions);
            let ca = midpoint(c, a, &mut self.positions);
            self.indices.extend_from_slice(&[a, ab, ca]);
            self.indices.extend_from_slice(&[b, bc, ab]);
            self.indices.extend_from_slice(&[c, ca, bc]);
            self.indices.extend_from_slice(&[ab, bc, ca]);
        }
    }

    // Duplicate vertices of triangles that straddle the +-180 degree
    // longitude so their interpolated U no longer wraps. The U deltas of
    // the second and third corner relative to the first decide which
    // corner moves and in which direction.
    fn fix_seam(&mut self) {
        let num_triangles = self.indices.len() / 3;
        for t in 0..num_triangles {
            let uv0 = self.tex_coords[self.indices[t * 3] as usize];
            let uv1 = self.tex_coords[self.indices[t * 3 + 1] as usize];
            let uv2 = self.tex_coords[self.indices[t * 3 + 2] as usize];
            let d1 = uv1.x - uv0.x;
            let d2 = uv2.x - uv0.x;

            if d1.abs() > 0.5 && d2.abs() > 0.5 {
                let shift = if d1 > 0.0 { 1.0 } else { -1.0 };
                self.duplicate_vertex(t * 3, Vec2::new(uv0.x + shift, uv0.y));
            } else if d1.abs() > 0.5 {
                let shift = if d1 < 0.0 { 1.0 } else { -1.0 };
                self.duplicate_vertex(t * 3 + 1, Vec2::new(uv1.x + shift, uv1.y));
            } else if d2.abs() > 0.5 {
                let shift = if d2 < 0.0 { 1.0 } else { -1.0 };
                self.duplicate_vertex(t * 3 + 2, Vec2::new(uv2.x + shift, uv2.y));
            }
        }
    }

    // Give one index slot its own copy of the referenced vertex, with a
    // replacement texture coordinate.
    fn duplicate_vertex(&mut self, slot: usize, uv: Vec2) {
        let index = self.indices[slot] as usize;
        self.indices[slot] = self.positions.len() as u32;
        self.positions.push(self.positions[index]);
        self.tex_coords.push(uv);
    }
}

impl Default for Icosphere {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Icosphere {
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
        let count = self.positions.len();

        let scaled: Vec<Vec3> = self.positions.iter().map(|p| p * self.radius).collect();
        target.copy_attrib(Attrib::Position, 3, 0, cast_slice(&scaled), count)?;
        if wanted.contains_attrib(Attrib::Normal) {
            target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(&self.positions), count)?;
        }
        if wanted.contains_attrib(Attrib::TexCoord0) {
            target.copy_attrib(Attrib::TexCoord0, 2, 0, cast_slice(&self.tex_coords), count)?;
        }
        if wanted.contains_attrib(Attrib::Color) {
            let colors: Vec<Vec3> = self.positions.iter().map(|p| normal_color(*p)).collect();
            target.copy_attrib(Attrib::Color, 3, 0, cast_slice(&colors), count)?;
        }
        target.copy_indices(
            Primitive::Triangles,
            &self.indices,
            calc_indices_required_bytes(self.indices.len()),
        )?;
        Ok(())
    }
}
