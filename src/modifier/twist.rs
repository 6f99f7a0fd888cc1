//! Twist deformation around an axis.

use std::f32::consts::PI;

use log::warn;

use crate::attrib::{Attrib, AttribSet};
use crate::error::Result;
use crate::math::{lerp, Vec3};
use crate::modifier::{Modifier, SourceModsContext};
use nalgebra::{Unit, UnitQuaternion};

/// Rotates vertices around an axis by an angle interpolated along it.
///
/// A vertex is projected onto the axis segment; the projection parameter,
/// clamped to [0, 1], selects the rotation angle between `start_angle` and
/// `end_angle`. Normals rotate with their vertices.
#[derive(Debug, Clone)]
pub struct Twist {
    axis_start: Vec3,
    axis_end: Vec3,
    start_angle: f32,
    end_angle: f32,
}

impl Default for Twist {
    fn default() -> Self {
        Twist {
            axis_start: Vec3::new(0.0, -1.0, 0.0),
            axis_end: Vec3::new(0.0, 1.0, 0.0),
            start_angle: -PI,
            end_angle: PI,
        }
    }
}

impl Twist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_axis(mut self, start: Vec3, end: Vec3) -> Self {
        self.axis_start = start;
        self.axis_end = end;
        self
    }

    pub fn with_start_angle(mut self, angle: f32) -> Self {
        self.start_angle = angle;
        self
    }

    pub fn with_end_angle(mut self, angle: f32) -> Self {
        self.end_angle = angle;
        self
    }
}

impl Modifier for Twist {
    fn process(&self, ctx: &mut SourceModsContext, requested: AttribSet) -> Result<()> {
        ctx.process_upstream(requested | AttribSet::POSITION | AttribSet::NORMAL)?;

        if ctx.attrib_dims(Attrib::Position) != 3 {
            warn!(
                "Twist: unsupported POSITION dims {}",
                ctx.attrib_dims(Attrib::Position)
            );
            return Ok(());
        }
        let axis = self.axis_end - self.axis_start;
        let axis_length = axis.norm();
        if axis_length <= f32::EPSILON {
            warn!("Twist: degenerate axis");
            return Ok(());
        }
        let axis_dir = Unit::new_normalize(axis);
        let inv_axis_length = 1.0 / axis_length;

        let count = ctx.num_vertices();
        let mut rotations = Vec::with_capacity(count);
        if let Some(positions) = ctx.attrib_data_mut(Attrib::Position) {
            for chunk in positions.chunks_exact_mut(3) {
                let p = Vec3::new(chunk[0], chunk[1], chunk[2]);
                let closest_dist = (p - self.axis_start).dot(&axis_dir);
                let t = (closest_dist * inv_axis_length).clamp(0.0, 1.0);
                let angle = lerp(self.start_angle, self.end_angle, t);
                let rotation = UnitQuaternion::from_axis_angle(&axis_dir, angle);
                let point_on_axis = self.axis_start + axis_dir.into_inner() * closest_dist;
                let rotated = rotation * (p - point_on_axis) + point_on_axis;
                chunk.copy_from_slice(&[rotated.x, rotated.y, rotated.z]);
                rotations.push(rotation);
            }
        }
        for attrib in [Attrib::Normal, Attrib::Tangent] {
            if ctx.attrib_dims(attrib) != 3 {
                continue;
            }
            if let Some(data) = ctx.attrib_data_mut(attrib) {
                for (chunk, rotation) in data.chunks_exact_mut(3).zip(&rotations) {
                    let n = rotation * Vec3::new(chunk[0], chunk[1], chunk[2]);
                    chunk.copy_from_slice(&[n.x, n.y, n.z]);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::MeshData;
    use crate::modifier::SourceMods;
    use crate::shapes::Cylinder;
    use crate::source::Source;

    #[test]
    fn rotation_varies_along_axis() {
        let mods = SourceMods::new(Cylinder::new())
            .with(Twist::new().with_axis(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0)));
        let mut mesh = MeshData::new();
        mods.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        // Twisting around the cylinder's own axis keeps radii intact.
        for p in mesh.attrib_data(Attrib::Position).unwrap().chunks(3) {
            let radius = (p[0] * p[0] + p[2] * p[2]).sqrt();
            assert!(radius < 1.0 + 1e-4);
        }
    }

    #[test]
    fn zero_angles_leave_geometry_unchanged() {
        let plain = SourceMods::new(Cylinder::new());
        let twisted = SourceMods::new(Cylinder::new())
            .with(Twist::new().with_start_angle(0.0).with_end_angle(0.0));
        let mut a = MeshData::new();
        let mut b = MeshData::new();
        plain.load_into(&mut a, AttribSet::POSITION).unwrap();
        twisted.load_into(&mut b, AttribSet::POSITION).unwrap();
        let pa = a.attrib_data(Attrib::Position).unwrap();
        let pb = b.attrib_data(Attrib::Position).unwrap();
        for (x, y) in pa.iter().zip(pb) {
            assert!((x - y).abs() < 1e-5);
        }
    }
}
