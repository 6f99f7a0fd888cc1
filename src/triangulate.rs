//! Polygon triangulation for cap geometry.
//!
//! Thin wrapper around earcutr. The first contour added is the outer
//! boundary; subsequent contours are treated as holes.

use crate::attrib::{Attrib, Primitive};
use crate::error::Result;
use crate::math::Vec2;
use crate::mesh_data::MeshData;
use crate::source::{calc_indices_required_bytes, Target};

#[derive(Debug, Clone, Default)]
pub struct Triangulator {
    contours: Vec<Vec<Vec2>>,
}

impl Triangulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_polyline(&mut self, points: &[Vec2]) {
        if points.len() >= 3 {
            self.contours.push(points.to_vec());
        }
    }

    /// Total number of contour vertices added so far.
    pub fn num_vertices(&self) -> usize {
        self.contours.iter().map(|c| c.len()).sum()
    }

    /// Triangulate all contours into a 2D triangle mesh.
    ///
    /// On a degenerate input the result is an empty mesh; earcut failures
    /// are logged, not fatal.
    pub fn calc_mesh(&self) -> Result<MeshData> {
        let mut mesh = MeshData::new();
        if self.contours.is_empty() {
            return Ok(mesh);
        }

        let mut flat: Vec<f32> = Vec::with_capacity(self.num_vertices() * 2);
        let mut hole_starts: Vec<usize> = Vec::new();
        for (i, contour) in self.contours.iter().enumerate() {
            if i > 0 {
                hole_starts.push(flat.len() / 2);
            }
            for p in contour {
                flat.push(p.x);
                flat.push(p.y);
            }
        }

        let indices = match earcutr::earcut(&flat, &hole_starts, 2) {
            Ok(indices) => indices,
            Err(err) => {
                log::warn!("polygon triangulation failed: {err:?}");
                return Ok(mesh);
            }
        };

        let count = flat.len() / 2;
        mesh.copy_attrib(Attrib::Position, 2, 0, &flat, count)?;
        let indices: Vec<u32> = indices.into_iter().map(|i| i as u32).collect();
        mesh.copy_indices(
            Primitive::Triangles,
            &indices,
            calc_indices_required_bytes(indices.len()),
        )?;
        Ok(mesh)
    }
}
