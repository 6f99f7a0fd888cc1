//! Torus, helix and torus-knot generators.

use bytemuck::cast_slice;
use std::f32::consts::PI;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::math::{first_frame, next_frame, Vec2, Vec3, Vec4};
use crate::shapes::normal_color;
use crate::source::{calc_indices_required_bytes, Source, Target};

/// Torus around the Y axis. `radius_major` is the outer radius and
/// `radius_minor` the inner one; `twist` rotates the tube cross-section as
/// it sweeps, `coils` and `height` stretch the sweep into a spring.
#[derive(Debug, Clone)]
pub struct Torus {
    center: Vec3,
    radius_major: f32,
    radius_minor: f32,
    coils: f32,
    height: f32,
    subdivisions_axis: usize,
    subdivisions_height: usize,
    twist: u32,
    twist_offset: f32,
    enabled: AttribSet,
}

impl Torus {
    pub fn new() -> Self {
        Self {
            center: Vec3::zeros(),
            radius_major: 1.0,
            radius_minor: 0.75,
            coils: 1.0,
            height: 0.0,
            subdivisions_axis: 18,
            subdivisions_height: 18,
            twist: 0,
            twist_offset: 0.0,
            enabled: AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
        }
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn with_radius(mut self, major: f32, minor: f32) -> Self {
        self.radius_major = major.max(0.0);
        self.radius_minor = minor.clamp(0.0, self.radius_major);
        self
    }

    /// Inner radius as a fraction of the outer radius.
    pub fn with_ratio(mut self, ratio: f32) -> Self {
        self.radius_minor = self.radius_major * ratio.clamp(0.0, 1.0);
        self
    }

    pub fn with_coils(mut self, coils: f32) -> Self {
        self.coils = coils.max(0.0);
        self
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn with_subdivisions_axis(mut self, subdivisions: usize) -> Self {
        self.subdivisions_axis = subdivisions;
        self
    }

    pub fn with_subdivisions_height(mut self, subdivisions: usize) -> Self {
        self.subdivisions_height = subdivisions;
        self
    }

    pub fn with_twist(mut self, twist: u32, offset: f32) -> Self {
        self.twist = twist;
        self.twist_offset = offset;
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

    // Too few requested subdivisions fall back to a circumference-derived
    // count so degenerate setups still produce a surface.
    fn grid(&self) -> (usize, usize) {
        let fallback = ((self.radius_major * 2.0 * PI).floor() as usize).max(12);
        let mut num_axis = (self.subdivisions_axis as f32 * self.coils).ceil() as usize;
        if num_axis < 4 {
            num_axis = fallback;
        }
        let mut num_ring = self.subdivisions_height;
        if num_ring < 3 {
            num_ring = fallback;
        }
        (num_axis + 1, num_ring + 1)
    }

    fn tessellate(&self) -> (Vec<Vec3>, Vec<Vec3>, Vec<Vec2>, Vec<u32>) {
        let (segments, rings) = self.grid();
        let major_incr = 1.0 / (segments - 1) as f32;
        let minor_incr = 1.0 / (rings - 1) as f32;
        let radius_diff = self.radius_major - self.radius_minor;
        let angle = 2.0 * PI * self.coils;
        let twist = angle * self.twist as f32 * minor_incr * major_incr;

        let mut positions = vec![Vec3::zeros(); segments * rings];
        let mut normals = vec![Vec3::zeros(); segments * rings];
        let mut tex_coords = vec![Vec2::zeros(); segments * rings];

        for i in 0..segments {
            let phi = i as f32 * major_incr * angle;
            let cos_phi = -phi.cos();
            let sin_phi = phi.sin();

            for j in 0..rings {
                let theta = j as f32 * minor_incr * 2.0 * PI + i as f32 * twist + self.twist_offset;
                let cos_theta = -theta.cos();
                let sin_theta = theta.sin();

                let r = self.radius_minor + cos_theta * radius_diff;
                let x = r * cos_phi;
                let y = i as f32 * major_incr * self.height + sin_theta * radius_diff;
                let z = r * sin_phi;

                let k = i * rings + j;
                positions[k] = self.center + Vec3::new(x, y, z);
                tex_coords[k] = Vec2::new(i as f32 * major_incr, j as f32 * minor_incr);
                normals[k] = Vec3::new(cos_phi * cos_theta, sin_theta, sin_phi * cos_theta);
            }
        }

        let mut indices = Vec::with_capacity((segments - 1) * (rings - 1) * 6);
        for i in 0..(segments - 1) as u32 {
            for j in 0..(rings - 1) as u32 {
                let rings = rings as u32;
                indices.extend_from_slice(&[
                    i * rings + j,
                    (i + 1) * rings + j + 1,
                    (i + 1) * rings + j,
                ]);
                indices.extend_from_slice(&[
                    i * rings + j,
                    i * rings + j + 1,
                    (i + 1) * rings + j + 1,
                ]);
            }
        }
        (positions, normals, tex_coords, indices)
    }
}

impl Default for Torus {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Torus {
    fn num_vertices(&self) -> usize {
        let (segments, rings) = self.grid();
        segments * rings
    }

    fn num_indices(&self) -> usize {
        let (segments, rings) = self.grid();
        (segments - 1) * (rings - 1) * 6
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
        let (positions, normals, tex_coords, indices) = self.tessellate();
        let count = positions.len();

        target.copy_attrib(Attrib::Position, 3, 0, cast_slice(&positions), count)?;
        if wanted.contains_attrib(Attrib::TexCoord0) {
            target.copy_attrib(Attrib::TexCoord0, 2, 0, cast_slice(&tex_coords), count)?;
        }
        if wanted.contains_attrib(Attrib::Normal) {
            target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(&normals), count)?;
        }
        if wanted.contains_attrib(Attrib::Color) {
            let colors: Vec<Vec3> = normals.iter().map(|n| normal_color(*n)).collect();
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

/// Coiled torus with axial height, a spring shape.
#[derive(Debug, Clone)]
pub struct Helix {
    torus: Torus,
}

impl Helix {
    pub fn new() -> Self {
        Self {
            torus: Torus::new().with_height(2.0).with_coils(3.0).with_ratio(0.25),
        }
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.torus = self.torus.with_center(center);
        self
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.torus = self.torus.with_height(height);
        self
    }

    pub fn with_coils(mut self, coils: f32) -> Self {
        self.torus = self.torus.with_coils(coils);
        self
    }

    pub fn with_ratio(mut self, ratio: f32) -> Self {
        self.torus = self.torus.with_ratio(ratio);
        self
    }

    pub fn with_twist(mut self, twist: u32, offset: f32) -> Self {
        self.torus = self.torus.with_twist(twist, offset);
        self
    }

    pub fn with_subdivisions_axis(mut self, subdivisions: usize) -> Self {
        self.torus = self.torus.with_subdivisions_axis(subdivisions);
        self
    }

    pub fn with_subdivisions_height(mut self, subdivisions: usize) -> Self {
        self.torus = self.torus.with_subdivisions_height(subdivisions);
        self
    }

    pub fn with_colors(mut self) -> Self {
        self.torus = self.torus.with_colors();
        self
    }
}

impl Default for Helix {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Helix {
    fn num_vertices(&self) -> usize {
        self.torus.num_vertices()
    }

    fn num_indices(&self) -> usize {
        self.torus.num_indices()
    }

    fn primitive(&self) -> Primitive {
        Primitive::Triangles
    }

    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        Source::attrib_dims(&self.torus, attrib)
    }

    fn available_attribs(&self) -> AttribSet {
        self.torus.available_attribs()
    }

    fn load_into(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        self.torus.load_into(target, requested)
    }
}

/// Tube swept along a (p, q) torus knot using parallel-transport frames.
#[derive(Debug, Clone)]
pub struct TorusKnot {
    center: Vec3,
    p: i32,
    q: i32,
    radius: f32,
    scale: Vec3,
    subdivisions_axis: usize,
    subdivisions_height: usize,
    enabled: AttribSet,
}

impl TorusKnot {
    pub fn new() -> Self {
        Self {
            center: Vec3::zeros(),
            p: 2,
            q: 5,
            radius: 0.15,
            scale: Vec3::new(1.0, 1.0, 1.0),
            subdivisions_axis: 128,
            subdivisions_height: 12,
            enabled: AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
        }
    }

    pub fn with_center(mut self, center: Vec3) -> Self {
        self.center = center;
        self
    }

    pub fn with_parameters(mut self, p: i32, q: i32) -> Self {
        self.p = p;
        self.q = q;
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_subdivisions_axis(mut self, subdivisions: usize) -> Self {
        self.subdivisions_axis = subdivisions.max(3);
        self
    }

    pub fn with_subdivisions_height(mut self, subdivisions: usize) -> Self {
        self.subdivisions_height = subdivisions.max(3);
        self
    }

    pub fn with_colors(mut self) -> Self {
        self.enabled |= AttribSet::COLOR;
        self
    }

    fn curve_point(&self, t: f32) -> Vec3 {
        let (p, q) = (self.p as f32, self.q as f32);
        let r = 2.0 + (q * t).cos();
        let point = Vec3::new(
            (p * t).cos() * r * 0.5,
            (p * t).sin() * r * 0.5,
            (q * t).sin() * 0.5,
        );
        point.component_mul(&self.scale)
    }

    fn tessellate(&self) -> (Vec<Vec3>, Vec<Vec3>, Vec<Vec2>, Vec<u32>) {
        let axis = self.subdivisions_axis;
        let rings = self.subdivisions_height;

        // closed center curve with wrap-around central-difference tangents
        let mut centers = Vec::with_capacity(axis);
        for i in 0..axis {
            centers.push(self.curve_point(i as f32 * 2.0 * PI / axis as f32));
        }
        let mut tangents = Vec::with_capacity(axis);
        for i in 0..axis {
            let prev = centers[(i + axis - 1) % axis];
            let next = centers[(i + 1) % axis];
            tangents.push((next - prev).normalize());
        }

        let count = (axis + 1) * (rings + 1);
        let mut positions = Vec::with_capacity(count);
        let mut normals = Vec::with_capacity(count);
        let mut tex_coords = Vec::with_capacity(count);

        let mut frame = first_frame(centers[0], centers[1], centers[2]);
        for i in 0..=axis {
            let cur = i % axis;
            if i > 0 {
                let prev = (i - 1) % axis;
                frame = next_frame(
                    &frame,
                    centers[prev],
                    centers[cur],
                    tangents[prev],
                    tangents[cur],
                );
            }
            let u = i as f32 / axis as f32;
            for j in 0..=rings {
                let theta = j as f32 * 2.0 * PI / rings as f32;
                let local = Vec4::new(theta.cos() * self.radius, theta.sin() * self.radius, 0.0, 1.0);
                let dir = Vec4::new(theta.cos(), theta.sin(), 0.0, 0.0);
                let world = frame * local;
                let normal = frame * dir;
                positions.push(self.center + Vec3::new(world.x, world.y, world.z));
                normals.push(Vec3::new(normal.x, normal.y, normal.z).normalize());
                tex_coords.push(Vec2::new(u, j as f32 / rings as f32));
            }
        }

        let mut indices = Vec::with_capacity(axis * rings * 6);
        let row = (rings + 1) as u32;
        for i in 0..axis as u32 {
            for j in 0..rings as u32 {
                let k = i * row + j;
                indices.extend_from_slice(&[k, k + row + 1, k + row]);
                indices.extend_from_slice(&[k, k + 1, k + row + 1]);
            }
        }
        (positions, normals, tex_coords, indices)
    }
}

impl Default for TorusKnot {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for TorusKnot {
    fn num_vertices(&self) -> usize {
        (self.subdivisions_axis + 1) * (self.subdivisions_height + 1)
    }

    fn num_indices(&self) -> usize {
        self.subdivisions_axis * self.subdivisions_height * 6
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
        let (positions, normals, tex_coords, indices) = self.tessellate();
        let count = positions.len();

        target.copy_attrib(Attrib::Position, 3, 0, cast_slice(&positions), count)?;
        if wanted.contains_attrib(Attrib::Normal) {
            target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(&normals), count)?;
        }
        if wanted.contains_attrib(Attrib::TexCoord0) {
            target.copy_attrib(Attrib::TexCoord0, 2, 0, cast_slice(&tex_coords), count)?;
        }
        if wanted.contains_attrib(Attrib::Color) {
            let colors: Vec<Vec3> = normals.iter().map(|n| normal_color(*n)).collect();
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
    fn torus_counts_match_loaded_data() {
        let torus = Torus::new();
        let mut mesh = MeshData::new();
        torus.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert_eq!(Source::num_vertices(&mesh), torus.num_vertices());
        assert_eq!(mesh.indices().len(), torus.num_indices());
        // default 18x18 grid
        assert_eq!(torus.num_vertices(), 19 * 19);
    }

    #[test]
    fn torus_positions_stay_in_the_radius_band() {
        let torus = Torus::new().with_radius(1.0, 0.5);
        let mut mesh = MeshData::new();
        torus.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        for v in p.chunks(3) {
            let radial = (v[0] * v[0] + v[2] * v[2]).sqrt();
            assert!(radial <= 1.0 + 1.0e-4);
            assert!(radial >= 2.0 * 0.5 - 1.0 - 1.0e-4);
        }
    }

    #[test]
    fn degenerate_subdivisions_fall_back() {
        let torus = Torus::new().with_subdivisions_axis(1).with_subdivisions_height(1);
        // both fall back to max(12, floor(2*pi*r)) = 12
        assert_eq!(torus.num_vertices(), 13 * 13);
    }

    #[test]
    fn helix_rises_along_y() {
        let helix = Helix::new();
        let mut mesh = MeshData::new();
        helix.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        let max_y = p.chunks(3).map(|v| v[1]).fold(f32::MIN, f32::max);
        assert!(max_y > 1.5);
    }

    #[test]
    fn torus_knot_tube_radius_is_respected() {
        let knot = TorusKnot::new();
        let mut mesh = MeshData::new();
        knot.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert_eq!(Source::num_vertices(&mesh), knot.num_vertices());
        assert_eq!(mesh.indices().len(), knot.num_indices());

        // every vertex sits within the tube radius of some curve point
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        let samples: Vec<Vec3> = (0..512)
            .map(|i| knot.curve_point(i as f32 * 2.0 * PI / 512.0))
            .collect();
        for v in p.chunks(3).step_by(37) {
            let v = Vec3::new(v[0], v[1], v[2]);
            let dist = samples
                .iter()
                .map(|c| (v - c).norm())
                .fold(f32::MAX, f32::min);
            assert!(dist < 0.15 + 0.05);
        }
    }
}
