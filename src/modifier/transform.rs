//! Linear transform of positions and normals.

use log::warn;

use crate::attrib::{Attrib, AttribSet};
use crate::error::Result;
use crate::math::{Mat3, Mat4, Vec3, Vec4};
use crate::modifier::{Modifier, SourceModsContext};
use crate::source::Target;
use nalgebra::Unit;

/// Applies a 4x4 matrix to POSITION, and its inverse-transpose to NORMAL.
///
/// 2D positions are promoted to 3D in the process.
#[derive(Debug, Clone)]
pub struct Transform {
    matrix: Mat4,
}

impl Transform {
    pub fn new(matrix: Mat4) -> Self {
        Transform { matrix }
    }

    pub fn translate(offset: Vec3) -> Self {
        Transform::new(Mat4::new_translation(&offset))
    }

    pub fn scale(factors: Vec3) -> Self {
        Transform::new(Mat4::new_nonuniform_scaling(&factors))
    }

    pub fn uniform_scale(factor: f32) -> Self {
        Transform::new(Mat4::new_scaling(factor))
    }

    pub fn rotate(axis: Vec3, angle: f32) -> Self {
        Transform::new(Mat4::from_axis_angle(&Unit::new_normalize(axis), angle))
    }

    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }
}

impl Modifier for Transform {
    fn attrib_dims(&self, attrib: Attrib, upstream_dims: u8) -> u8 {
        if attrib == Attrib::Position {
            upstream_dims.max(3)
        } else {
            upstream_dims
        }
    }

    fn process(&self, ctx: &mut SourceModsContext, requested: AttribSet) -> Result<()> {
        ctx.process_upstream(requested)?;

        let count = ctx.num_vertices();
        match ctx.attrib_dims(Attrib::Position) {
            2 => {
                let src = match ctx.attrib_data(Attrib::Position) {
                    Some(data) => data.to_vec(),
                    None => return Ok(()),
                };
                let mut promoted = vec![0.0f32; count * 3];
                for i in 0..count {
                    let p = self.matrix * Vec4::new(src[i * 2], src[i * 2 + 1], 0.0, 1.0);
                    promoted[i * 3..i * 3 + 3].copy_from_slice(&[p.x, p.y, p.z]);
                }
                ctx.copy_attrib(Attrib::Position, 3, 0, &promoted, count)?;
            }
            3 => {
                if let Some(data) = ctx.attrib_data_mut(Attrib::Position) {
                    for chunk in data.chunks_exact_mut(3) {
                        let p = self.matrix * Vec4::new(chunk[0], chunk[1], chunk[2], 1.0);
                        chunk.copy_from_slice(&[p.x, p.y, p.z]);
                    }
                }
            }
            4 => {
                if let Some(data) = ctx.attrib_data_mut(Attrib::Position) {
                    for chunk in data.chunks_exact_mut(4) {
                        let p = self.matrix * Vec4::new(chunk[0], chunk[1], chunk[2], chunk[3]);
                        chunk.copy_from_slice(&[p.x, p.y, p.z, p.w]);
                    }
                }
            }
            dims => warn!("Transform: unsupported POSITION dims {}", dims),
        }

        let linear: Mat3 = self.matrix.fixed_view::<3, 3>(0, 0).into_owned();
        let normal_matrix = linear
            .try_inverse()
            .unwrap_or_else(Mat3::identity)
            .transpose();
        for attrib in [Attrib::Normal, Attrib::Tangent] {
            match ctx.attrib_dims(attrib) {
                0 => {}
                3 => {
                    if let Some(data) = ctx.attrib_data_mut(attrib) {
                        for chunk in data.chunks_exact_mut(3) {
                            let n = (normal_matrix * Vec3::new(chunk[0], chunk[1], chunk[2]))
                                .normalize();
                            chunk.copy_from_slice(&[n.x, n.y, n.z]);
                        }
                    }
                }
                dims => warn!("Transform: unsupported {:?} dims {}", attrib, dims),
            }
        }
        Ok(())
    }
}
