//! Cylinder and cone generators.

use bytemuck::cast_slice;
use std::f32::consts::PI;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::math::{lerp, rotation_between, Vec2, Vec3};
use crate::shapes::normal_color;
use crate::source::{calc_indices_required_bytes, Source, Target};

/// Cylinder from a base disc to an apex disc along a direction, with
/// independently configurable base and apex radii. A radius of zero drops
/// the corresponding cap.
#[derive(Debug, Clone)]
pub struct Cylinder {
    origin: Vec3,
    height: f32,
    direction: Vec3,
    radius_base: f32,
    radius_apex: f32,
    subdivisions_axis: usize,
    subdivisions_height: usize,
    enabled: AttribSet,
    num_vertices: usize,
    num_indices: usize,
}

impl Cylinder {
    pub fn new() -> Self {
        let mut cylinder = Self {
            origin: Vec3::zeros(),
            height: 2.0,
            direction: Vec3::y(),
            radius_base: 1.0,
            radius_apex: 1.0,
            subdivisions_axis: 18,
            subdivisions_height: 1,
            enabled: AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
            num_vertices: 0,
            num_indices: 0,
        };
        cylinder.update_counts();
        cylinder
    }

    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.height = height.max(0.0);
        self
    }

    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.direction = direction.normalize();
        self
    }

    pub fn with_radius(mut self, radius: f32) -> Self {
        self.radius_base = radius.max(0.0);
        self.radius_apex = radius.max(0.0);
        self.update_counts();
        self
    }

    pub fn with_radius_base(mut self, radius: f32) -> Self {
        self.radius_base = radius.max(0.0);
        self.update_counts();
        self
    }

    pub fn with_radius_apex(mut self, radius: f32) -> Self {
        self.radius_apex = radius.max(0.0);
        self.update_counts();
        self
    }

    pub fn with_subdivisions_axis(mut self, subdivisions: usize) -> Self {
        self.subdivisions_axis = subdivisions.max(3);
        self.update_counts();
        self
    }

    pub fn with_subdivisions_height(mut self, subdivisions: usize) -> Self {
        self.subdivisions_height = subdivisions.max(1);
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
        self.subdivisions_height + 1
    }

    fn update_counts(&mut self) {
        let (segments, rings) = (self.segments(), self.rings());
        self.num_vertices = segments * rings;
        self.num_indices = (segments - 1) * (rings - 1) * 6;
        if self.radius_base > 0.0 {
            self.num_vertices += segments * 2;
            self.num_indices += 3 * (segments - 1);
        }
        if self.radius_apex > 0.0 {
            self.num_vertices += segments * 2;
            self.num_indices += 3 * (segments - 1);
        }
    }
}

impl Default for Cylinder {
    fn default() -> Self {
        Self::new()
    }
}

struct CylinderArrays {
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    indices: Vec<u32>,
}

impl Cylinder {
    fn tessellate(&self) -> CylinderArrays {
        let segments = self.segments();
        let rings = self.rings();
        let seg_incr = 1.0 / (segments - 1) as f32;
        let ring_incr = 1.0 / (rings - 1) as f32;
        let orient = rotation_between(&Vec3::y(), &self.direction);

        let mut out = CylinderArrays {
            positions: vec![Vec3::zeros(); segments * rings],
            normals: vec![Vec3::zeros(); segments * rings],
            tex_coords: vec![Vec2::zeros(); segments * rings],
            indices: Vec::with_capacity(self.num_indices),
        };

        for j in 0..rings {
            for i in 0..segments {
                let cos_phi = -(i as f32 * seg_incr * 2.0 * PI).cos();
                let sin_phi = (i as f32 * seg_incr * 2.0 * PI).sin();

                let r = lerp(self.radius_base, self.radius_apex, j as f32 * ring_incr);
                let local = Vec3::new(
                    r * cos_phi,
                    self.height * j as f32 * ring_incr,
                    r * sin_phi,
                );
                let n = Vec3::new(
                    self.height * cos_phi,
                    self.radius_base - self.radius_apex,
                    self.height * sin_phi,
                )
                .normalize();

                let k = i * rings + j;
                out.positions[k] = self.origin + orient * local;
                out.normals[k] = orient * n;
                out.tex_coords[k] = Vec2::new(i as f32 * seg_incr, 1.0 - j as f32 * ring_incr);
            }
        }

        for j in 0..rings as u32 - 1 {
            for i in 0..segments as u32 - 1 {
                let rings = rings as u32;
                out.indices.extend_from_slice(&[
                    i * rings + j,
                    (i + 1) * rings + j,
                    (i + 1) * rings + j + 1,
                ]);
                out.indices.extend_from_slice(&[
                    i * rings + j,
                    (i + 1) * rings + j + 1,
                    i * rings + j + 1,
                ]);
            }
        }

        if self.radius_base > 0.0 {
            self.tessellate_cap(&mut out, true, 0.0, self.radius_base, &orient);
        }
        if self.radius_apex > 0.0 {
            self.tessellate_cap(&mut out, false, self.height, self.radius_apex, &orient);
        }
        out
    }

    fn tessellate_cap(
        &self,
        out: &mut CylinderArrays,
        flip: bool,
        height: f32,
        radius: f32,
        orient: &nalgebra::UnitQuaternion<f32>,
    ) {
        let segments = self.segments();
        let base = out.positions.len() as u32;
        let normal = if flip { -self.direction } else { self.direction };
        let seg_incr = 1.0 / (segments - 1) as f32;
        let v = 1.0 - height / self.height.max(f32::EPSILON);

        // interleaved center/edge pairs, matching the side-wall seam count
        for i in 0..segments {
            out.positions.push(self.origin + self.direction * height);
            out.tex_coords.push(Vec2::new(i as f32 * seg_incr, v));
            out.normals.push(normal);

            let cos_phi = -(i as f32 * seg_incr * 2.0 * PI).cos();
            let sin_phi = (i as f32 * seg_incr * 2.0 * PI).sin();
            out.positions
                .push(self.origin + orient * Vec3::new(radius * cos_phi, height, radius * sin_phi));
            out.tex_coords.push(Vec2::new(i as f32 * seg_incr, v));
            out.normals.push(normal);
        }

        for i in 0..segments as u32 - 1 {
            if flip {
                out.indices
                    .extend_from_slice(&[base + i * 2, base + i * 2 + 3, base + i * 2 + 1]);
            } else {
                out.indices
                    .extend_from_slice(&[base + i * 2, base + i * 2 + 1, base + i * 2 + 3]);
            }
        }
    }
}

impl Source for Cylinder {
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
        let arrays = self.tessellate();
        let count = arrays.positions.len();

        target.copy_attrib(Attrib::Position, 3, 0, cast_slice(&arrays.positions), count)?;
        if wanted.contains_attrib(Attrib::Normal) {
            target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(&arrays.normals), count)?;
        }
        if wanted.contains_attrib(Attrib::TexCoord0) {
            target.copy_attrib(Attrib::TexCoord0, 2, 0, cast_slice(&arrays.tex_coords), count)?;
        }
        if wanted.contains_attrib(Attrib::Color) {
            let colors: Vec<Vec3> = arrays.normals.iter().map(|n| normal_color(*n)).collect();
            target.copy_attrib(Attrib::Color, 3, 0, cast_slice(&colors), count)?;
        }
        target.copy_indices(
            Primitive::Triangles,
            &arrays.indices,
            calc_indices_required_bytes(arrays.indices.len()),
        )?;
        Ok(())
    }
}

/// Cone: a cylinder whose apex radius collapses to zero (or to a ratio of
/// the base radius).
#[derive(Debug, Clone)]
pub struct Cone {
    cylinder: Cylinder,
}

impl Cone {
    pub fn new() -> Self {
        Self {
            cylinder: Cylinder::new().with_radius_apex(0.0).with_height(1.0),
        }
    }

    pub fn with_origin(mut self, origin: Vec3) -> Self {
        self.cylinder = self.cylinder.with_origin(origin);
        self
    }

    pub fn with_height(mut self, height: f32) -> Self {
        self.cylinder = self.cylinder.with_height(height);
        self
    }

    pub fn with_direction(mut self, direction: Vec3) -> Self {
        self.cylinder = self.cylinder.with_direction(direction);
        self
    }

    pub fn with_base(mut self, radius: f32) -> Self {
        self.cylinder = self.cylinder.with_radius_base(radius);
        self
    }

    pub fn with_apex(mut self, radius: f32) -> Self {
        self.cylinder = self.cylinder.with_radius_apex(radius);
        self
    }

    /// Apex radius as a fraction of the base radius.
    pub fn with_ratio(mut self, ratio: f32) -> Self {
        let apex = self.cylinder.radius_base * ratio.max(0.0);
        self.cylinder = self.cylinder.with_radius_apex(apex);
        self
    }

    pub fn with_subdivisions_axis(mut self, subdivisions: usize) -> Self {
        self.cylinder = self.cylinder.with_subdivisions_axis(subdivisions);
        self
    }

    pub fn with_subdivisions_height(mut self, subdivisions: usize) -> Self {
        self.cylinder = self.cylinder.with_subdivisions_height(subdivisions);
        self
    }

    pub fn with_colors(mut self) -> Self {
        self.cylinder = self.cylinder.with_colors();
        self
    }
}

impl Default for Cone {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Cone {
    fn num_vertices(&self) -> usize {
        self.cylinder.num_vertices()
    }

    fn num_indices(&self) -> usize {
        self.cylinder.num_indices()
    }

    fn primitive(&self) -> Primitive {
        Primitive::Triangles
    }

    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        Source::attrib_dims(&self.cylinder, attrib)
    }

    fn available_attribs(&self) -> AttribSet {
        self.cylinder.available_attribs()
    }

    fn load_into(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        self.cylinder.load_into(target, requested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::MeshData;

    #[test]
    fn counts_match_loaded_data() {
        let cylinder = Cylinder::new();
        let mut mesh = MeshData::new();
        cylinder.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert_eq!(Source::num_vertices(&mesh), cylinder.num_vertices());
        assert_eq!(mesh.indices().len(), cylinder.num_indices());
    }

    #[test]
    fn zero_radius_apex_drops_a_cap() {
        let open = Cylinder::new().with_radius_apex(0.0);
        let closed = Cylinder::new();
        let segments = 19;
        assert_eq!(closed.num_vertices() - open.num_vertices(), segments * 2);
        assert_eq!(closed.num_indices() - open.num_indices(), 3 * (segments - 1));

        let mut mesh = MeshData::new();
        open.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert_eq!(Source::num_vertices(&mesh), open.num_vertices());
        assert_eq!(mesh.indices().len(), open.num_indices());
    }

    #[test]
    fn wall_radius_interpolates_base_to_apex() {
        let cylinder = Cylinder::new()
            .with_radius_base(2.0)
            .with_radius_apex(1.0)
            .with_subdivisions_height(2);
        let mut mesh = MeshData::new();
        cylinder.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        // wall vertices come first, rings within each segment column
        let rings = 3;
        for column in 0..19 {
            for j in 0..rings {
                let k = (column * rings + j) * 3;
                let radial = (p[k] * p[k] + p[k + 2] * p[k + 2]).sqrt();
                let expected = 2.0 - 0.5 * j as f32;
                assert!((radial - expected).abs() < 1.0e-3);
            }
        }
    }

    #[test]
    fn cone_defaults_have_single_cap() {
        let cone = Cone::new();
        let mut mesh = MeshData::new();
        cone.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert_eq!(Source::num_vertices(&mesh), cone.num_vertices());
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        let max_y = p.chunks(3).map(|v| v[1]).fold(f32::MIN, f32::max);
        assert!((max_y - 1.0).abs() < 1.0e-4);
    }
}
