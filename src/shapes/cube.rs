//! Axis-aligned box generator.

use bytemuck::cast_slice;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::math::{Vec2, Vec3};
use crate::source::{calc_indices_required_bytes, Source, Target};

/// Box centered at the origin, six independently subdivided faces.
///
/// Optional per-face debug colors: +X red, -X cyan, +Y green, -Y magenta,
/// +Z blue, -Z yellow.
#[derive(Debug, Clone)]
pub struct Cube {
    size: Vec3,
    subdivisions: [usize; 3],
    enabled: AttribSet,
    num_vertices: usize,
    num_indices: usize,
}

impl Cube {
    pub fn new() -> Self {
        let mut cube = Self {
            size: Vec3::repeat(1.0),
            subdivisions: [1, 1, 1],
            enabled: AttribSet::POSITION | AttribSet::NORMAL | AttribSet::TEX_COORD_0,
            num_vertices: 0,
            num_indices: 0,
        };
        cube.update_counts();
        cube
    }

    pub fn with_size(mut self, size: Vec3) -> Self {
        self.size = size;
        self
    }

    pub fn with_subdivisions(mut self, subdivisions: usize) -> Self {
        let s = subdivisions.max(1);
        self.subdivisions = [s, s, s];
        self.update_counts();
        self
    }

    pub fn with_subdivisions_xyz(mut self, x: usize, y: usize, z: usize) -> Self {
        self.subdivisions = [x.max(1), y.max(1), z.max(1)];
        self.update_counts();
        self
    }

    /// Enable the per-face debug colors.
    pub fn with_colors(mut self) -> Self {
        self.enabled |= AttribSet::COLOR;
        self
    }

    pub fn without_attrib(mut self, attrib: Attrib) -> Self {
        self.enabled -= attrib.flag();
        self
    }

    fn update_counts(&mut self) {
        let [sx, sy, sz] = self.subdivisions;
        self.num_vertices = 2 * (sx + 1) * (sy + 1) + 2 * (sy + 1) * (sz + 1) + 2 * (sx + 1) * (sz + 1);
        self.num_indices = 12 * (sx * sy + sy * sz + sx * sz);
    }

    fn faces(&self) -> [Face; 6] {
        let h = self.size * 0.5;
        let (sx, sy, sz) = (self.size.x, self.size.y, self.size.z);
        let [dx, dy, dz] = self.subdivisions;
        [
            // +X, -X
            Face {
                center: Vec3::new(h.x, 0.0, 0.0),
                u_axis: Vec3::new(0.0, 0.0, -sz),
                v_axis: Vec3::new(0.0, sy, 0.0),
                sub_u: dz,
                sub_v: dy,
                color: Vec3::new(1.0, 0.0, 0.0),
            },
            Face {
                center: Vec3::new(-h.x, 0.0, 0.0),
                u_axis: Vec3::new(0.0, 0.0, sz),
                v_axis: Vec3::new(0.0, sy, 0.0),
                sub_u: dz,
                sub_v: dy,
                color: Vec3::new(0.0, 1.0, 1.0),
            },
            // +Y, -Y
            Face {
                center: Vec3::new(0.0, h.y, 0.0),
                u_axis: Vec3::new(sx, 0.0, 0.0),
                v_axis: Vec3::new(0.0, 0.0, -sz),
                sub_u: dx,
                sub_v: dz,
                color: Vec3::new(0.0, 1.0, 0.0),
            },
            Face {
                center: Vec3::new(0.0, -h.y, 0.0),
                u_axis: Vec3::new(sx, 0.0, 0.0),
                v_axis: Vec3::new(0.0, 0.0, sz),
                sub_u: dx,
                sub_v: dz,
                color: Vec3::new(1.0, 0.0, 1.0),
            },
            // +Z, -Z
            Face {
                center: Vec3::new(0.0, 0.0, h.z),
                u_axis: Vec3::new(sx, 0.0, 0.0),
                v_axis: Vec3::new(0.0, sy, 0.0),
                sub_u: dx,
                sub_v: dy,
                color: Vec3::new(0.0, 0.0, 1.0),
            },
            Face {
                center: Vec3::new(0.0, 0.0, -h.z),
                u_axis: Vec3::new(-sx, 0.0, 0.0),
                v_axis: Vec3::new(0.0, sy, 0.0),
                sub_u: dx,
                sub_v: dy,
                color: Vec3::new(1.0, 1.0, 0.0),
            },
        ]
    }
}

struct Face {
    center: Vec3,
    u_axis: Vec3,
    v_axis: Vec3,
    sub_u: usize,
    sub_v: usize,
    color: Vec3,
}

impl Default for Cube {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for Cube {
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

        let mut positions = Vec::with_capacity(self.num_vertices);
        let mut normals = Vec::with_capacity(self.num_vertices);
        let mut tex_coords = Vec::with_capacity(self.num_vertices);
        let mut colors = Vec::with_capacity(self.num_vertices);
        let mut indices: Vec<u32> = Vec::with_capacity(self.num_indices);

        for face in self.faces() {
            let base = positions.len() as u32;
            let normal = face.u_axis.cross(&face.v_axis).normalize();
            for u in 0..=face.sub_u {
                let ut = u as f32 / face.sub_u as f32;
                for v in 0..=face.sub_v {
                    let vt = v as f32 / face.sub_v as f32;
                    positions.push(
                        face.center + face.u_axis * (ut - 0.5) + face.v_axis * (vt - 0.5),
                    );
                    normals.push(normal);
                    tex_coords.push(Vec2::new(ut, vt));
                    colors.push(face.color);
                }
            }
            let row = face.sub_v as u32 + 1;
            for u in 0..face.sub_u as u32 {
                for v in 0..face.sub_v as u32 {
                    let i = base + u * row + v;
                    indices.extend_from_slice(&[i, i + row, i + row + 1]);
                    indices.extend_from_slice(&[i, i + row + 1, i + 1]);
                }
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
    fn unit_cube_counts() {
        let cube = Cube::new();
        assert_eq!(cube.num_vertices(), 24);
        assert_eq!(cube.num_indices(), 36);
    }

    #[test]
    fn counts_match_loaded_data() {
        for sub in [1, 2, 3] {
            let cube = Cube::new().with_subdivisions(sub).with_colors();
            let mut mesh = MeshData::new();
            cube.load_into(&mut mesh, AttribSet::all()).unwrap();
            assert_eq!(Source::num_vertices(&mesh), cube.num_vertices());
            assert_eq!(mesh.indices().len(), cube.num_indices());
        }
    }

    #[test]
    fn asymmetric_subdivisions() {
        let cube = Cube::new().with_subdivisions_xyz(1, 2, 3);
        let mut mesh = MeshData::new();
        cube.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert_eq!(Source::num_vertices(&mesh), cube.num_vertices());
        assert_eq!(mesh.indices().len(), cube.num_indices());
    }

    #[test]
    fn positions_stay_on_the_box() {
        let cube = Cube::new().with_size(Vec3::new(2.0, 4.0, 6.0));
        let mut mesh = MeshData::new();
        cube.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        for v in p.chunks(3) {
            let on_face = (v[0].abs() - 1.0).abs() < 1.0e-5
                || (v[1].abs() - 2.0).abs() < 1.0e-5
                || (v[2].abs() - 3.0).abs() < 1.0e-5;
            assert!(on_face);
        }
    }

    #[test]
    fn normals_are_axis_aligned_units() {
        let cube = Cube::new();
        let mut mesh = MeshData::new();
        cube.load_into(&mut mesh, AttribSet::all()).unwrap();
        for n in mesh.attrib_data(Attrib::Normal).unwrap().chunks(3) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1.0e-5);
            assert_eq!(n.iter().filter(|c| c.abs() > 0.5).count(), 1);
        }
    }
}
