//! Utah teapot, evaluated from its classic bicubic Bezier patches.

use bytemuck::cast_slice;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::math::{Mat3, Vec2, Vec3};
use crate::shapes::teapot_data::{CONTROL_POINTS, PATCH_INDICES};
use crate::source::{Source, Target};

type Patch = [[Vec3; 4]; 4];

/// Teapot scaled to fit the unit cube, +Y up. `subdivisions` is the grid
/// resolution per patch; the full surface is 32 patches.
#[derive(Debug, Clone)]
pub struct Teapot {
    subdivisions: usize,
    enabled: AttribSet,
    positions: Vec<Vec3>,
    normals: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    indices: Vec<u32>,
}

impl Teapot {
    pub fn new() -> Self {
        let mut teapot = Self {
            subdivisions: 6,
            enabled: AttribSet::POSITION | AttribSet::TEX_COORD_0 | AttribSet::NORMAL,
            positions: Vec::new(),
            normals: Vec::new(),
            tex_coords: Vec::new(),
            indices: Vec::new(),
        };
        teapot.calculate();
        teapot
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
        let grid = self.subdivisions;
        let num_vertices = 32 * (grid + 1) * (grid + 1);
        let num_indices = 32 * grid * grid * 6;

        self.positions = Vec::with_capacity(num_vertices);
        self.normals = Vec::with_capacity(num_vertices);
        self.tex_coords = Vec::with_capacity(num_vertices);
        self.indices = Vec::with_capacity(num_indices);

        let (basis, deriv) = basis_functions(grid);

        // rim, body, lid and bottom are mirrored across both axes
        for patch_num in 0..6 {
            self.build_patch_reflect(patch_num, &basis, &deriv, true);
        }
        // handle and spout only across Y
        for patch_num in 6..10 {
            self.build_patch_reflect(patch_num, &basis, &deriv, false);
        }
    }

    fn build_patch_reflect(&mut self, patch_num: usize, basis: &[f32], deriv: &[f32], reflect_x: bool) {
        let patch = get_patch(patch_num, false);
        let patch_rev_v = get_patch(patch_num, true);

        self.build_patch(&patch_rev_v, basis, deriv, Mat3::identity(), false);
        if reflect_x {
            let reflect = Mat3::from_diagonal(&Vec3::new(-1.0, 1.0, 1.0));
            self.build_patch(&patch, basis, deriv, reflect, true);
        }
        let reflect = Mat3::from_diagonal(&Vec3::new(1.0, -1.0, 1.0));
        self.build_patch(&patch, basis, deriv, reflect, true);
        if reflect_x {
            let reflect = Mat3::from_diagonal(&Vec3::new(-1.0, -1.0, 1.0));
            self.build_patch(&patch_rev_v, basis, deriv, reflect, false);
        }
    }

    fn build_patch(
        &mut self,
        patch: &Patch,
        basis: &[f32],
        deriv: &[f32],
        reflect: Mat3,
        invert_normal: bool,
    ) {
        let grid = self.subdivisions;
        let start_index = self.positions.len() as u32;
        let tc_factor = 1.0 / grid as f32;

        // keeps the whole surface inside the unit cube
        let scale = 2.0 / 6.42813;

        for i in 0..=grid {
            for j in 0..=grid {
                let pt = reflect * evaluate(i, j, basis, patch);
                let mut norm = reflect * evaluate_normal(i, j, basis, deriv, patch);
                if invert_normal {
                    norm = -norm;
                }
                // the patch parameterization degenerates on the z axis
                if pt.x.abs() < 0.01 && pt.y.abs() < 0.01 {
                    norm = if pt.z < 1.0 { -Vec3::z() } else { Vec3::z() };
                }

                // the control data is z-up; stored vertices are y-up
                self.positions.push(Vec3::new(pt.x, pt.z, pt.y) * scale);
                self.normals.push(Vec3::new(norm.x, norm.z, norm.y));
                self.tex_coords
                    .push(Vec2::new(i as f32 * tc_factor, j as f32 * tc_factor));
            }
        }

        for i in 0..grid as u32 {
            let row = grid as u32 + 1;
            let i_start = i * row + start_index;
            let next_i_start = (i + 1) * row + start_index;
            for j in 0..grid as u32 {
                self.indices
                    .extend_from_slice(&[i_start + j, next_i_start + j + 1, next_i_start + j]);
                self.indices
                    .extend_from_slice(&[i_start + j, i_start + j + 1, next_i_start + j + 1]);
            }
        }
    }
}

impl Default for Teapot {
    fn default() -> Self {
        Self::new()
    }
}

fn get_patch(patch_num: usize, reverse_v: bool) -> Patch {
    let mut patch = [[Vec3::zeros(); 4]; 4];
    for (u, row) in patch.iter_mut().enumerate() {
        for (v, point) in row.iter_mut().enumerate() {
            let v = if reverse_v { 3 - v } else { v };
            let c = CONTROL_POINTS[PATCH_INDICES[patch_num][u * 4 + v] as usize];
            *point = Vec3::new(c[0], c[1], c[2]);
        }
    }
    patch
}

/// Cubic Bernstein polynomials and their derivatives sampled on the grid,
/// four values per sample point.
fn basis_functions(grid: usize) -> (Vec<f32>, Vec<f32>) {
    let mut basis = vec![0.0; 4 * (grid + 1)];
    let mut deriv = vec![0.0; 4 * (grid + 1)];
    let inc = 1.0 / grid as f32;
    for i in 0..=grid {
        let t = i as f32 * inc;
        let t_sqr = t * t;
        let one_minus_t = 1.0 - t;
        let one_minus_t2 = one_minus_t * one_minus_t;

        basis[i * 4] = one_minus_t * one_minus_t2;
        basis[i * 4 + 1] = 3.0 * one_minus_t2 * t;
        basis[i * 4 + 2] = 3.0 * one_minus_t * t_sqr;
        basis[i * 4 + 3] = t * t_sqr;

        deriv[i * 4] = -3.0 * one_minus_t2;
        deriv[i * 4 + 1] = -6.0 * t * one_minus_t + 3.0 * one_minus_t2;
        deriv[i * 4 + 2] = -3.0 * t_sqr + 6.0 * t * one_minus_t;
        deriv[i * 4 + 3] = 3.0 * t_sqr;
    }
    (basis, deriv)
}

fn evaluate(grid_u: usize, grid_v: usize, basis: &[f32], patch: &Patch) -> Vec3 {
    let mut p = Vec3::zeros();
    for i in 0..4 {
        for j in 0..4 {
            p += patch[i][j] * basis[grid_u * 4 + i] * basis[grid_v * 4 + j];
        }
    }
    p
}

fn evaluate_normal(grid_u: usize, grid_v: usize, basis: &[f32], deriv: &[f32], patch: &Patch) -> Vec3 {
    let mut du = Vec3::zeros();
    let mut dv = Vec3::zeros();
    for i in 0..4 {
        for j in 0..4 {
            du += patch[i][j] * deriv[grid_u * 4 + i] * basis[grid_v * 4 + j];
            dv += patch[i][j] * basis[grid_u * 4 + i] * deriv[grid_v * 4 + j];
        }
    }
    du.cross(&dv)
        .try_normalize(1.0e-12)
        .unwrap_or_else(Vec3::z)
}

impl Source for Teapot {
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
            Attrib::Position | Attrib::Normal => 3,
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

        target.copy_attrib(Attrib::Position, 3, 0, cast_slice(&self.positions), count)?;
        if wanted.contains_attrib(Attrib::TexCoord0) {
            target.copy_attrib(Attrib::TexCoord0, 2, 0, cast_slice(&self.tex_coords), count)?;
        }
        if wanted.contains_attrib(Attrib::Normal) {
            target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(&self.normals), count)?;
        }
        target.copy_indices(Primitive::Triangles, &self.indices, 4)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::MeshData;

    #[test]
    fn counts_follow_the_patch_grid() {
        let teapot = Teapot::new();
        assert_eq!(teapot.num_vertices(), 32 * 7 * 7);
        assert_eq!(teapot.num_indices(), 32 * 6 * 6 * 6);

        let coarse = Teapot::new().with_subdivisions(2);
        assert_eq!(coarse.num_vertices(), 32 * 9);
        assert_eq!(coarse.num_indices(), 32 * 4 * 6);
    }

    #[test]
    fn extents_match_the_classic_dataset() {
        let teapot = Teapot::new();
        let mut mesh = MeshData::new();
        teapot.load_into(&mut mesh, AttribSet::all()).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        let mut min = [f32::MAX; 3];
        let mut max = [f32::MIN; 3];
        for v in p.chunks(3) {
            for k in 0..3 {
                min[k] = min[k].min(v[k]);
                max[k] = max[k].max(v[k]);
            }
        }
        // the spout tip pokes past x = 1, the body rests on y = 0
        assert!(max[0] > 1.0 && max[0] < 1.07);
        assert!(min[0] > -1.0);
        assert!(min[1].abs() < 1.0e-3);
        assert!(max[1] < 1.0);
        assert!(min[2] > -0.7 && max[2] < 0.7);
    }

    #[test]
    fn normals_are_unit_length() {
        let teapot = Teapot::new().with_subdivisions(3);
        let mut mesh = MeshData::new();
        teapot.load_into(&mut mesh, AttribSet::all()).unwrap();
        let n = mesh.attrib_data(Attrib::Normal).unwrap();
        for v in n.chunks(3) {
            let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((len - 1.0).abs() < 1.0e-3);
        }
    }
}
