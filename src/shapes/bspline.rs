//! Line-strip source sampling a b-spline curve.

use bytemuck::cast_slice;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::math::Vec3;
use crate::source::{Source, Target};
use crate::spline::BSplineCurve;

/// Uniformly sampled b-spline as a `LineStrip`. Positions keep the curve
/// dimension (2 to 4); normals are derived from the curve derivative.
#[derive(Debug, Clone)]
pub struct BSpline {
    position_dims: u8,
    positions: Vec<f32>,
    normals: Vec<Vec3>,
    enabled: AttribSet,
}

impl BSpline {
    pub fn new<const D: usize>(spline: &BSplineCurve<D>, subdivisions: usize) -> Self {
        assert!((2..=4).contains(&D));
        let subdivisions = subdivisions.max(2);
        let t_inc = 1.0 / (subdivisions - 1) as f32;

        let mut positions = Vec::with_capacity(subdivisions * D);
        let mut normals = Vec::with_capacity(subdivisions);
        for i in 0..subdivisions {
            let t = i as f32 * t_inc;
            let pos = spline.position(t);
            let deriv = spline.derivative(t);
            for k in 0..D {
                positions.push(pos[k]);
            }
            let normal = if D == 2 {
                Vec3::new(deriv[1], -deriv[0], 0.0)
            } else {
                Vec3::new(deriv[1], -deriv[0], deriv[2])
            };
            normals.push(normal.try_normalize(1.0e-12).unwrap_or_else(Vec3::y));
        }

        Self {
            position_dims: D as u8,
            positions,
            normals,
            enabled: AttribSet::POSITION | AttribSet::NORMAL,
        }
    }

    pub fn without_attrib(mut self, attrib: Attrib) -> Self {
        self.enabled -= attrib.flag();
        self
    }
}

impl Source for BSpline {
    fn num_vertices(&self) -> usize {
        self.normals.len()
    }

    fn primitive(&self) -> Primitive {
        Primitive::LineStrip
    }

    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        match attrib {
            Attrib::Position => self.position_dims,
            Attrib::Normal if self.enabled.contains_attrib(Attrib::Normal) => 3,
            _ => 0,
        }
    }

    fn available_attribs(&self) -> AttribSet {
        self.enabled
    }

    fn load_into(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        let count = self.num_vertices();
        target.copy_attrib(Attrib::Position, self.position_dims, 0, &self.positions, count)?;
        if (requested & self.enabled).contains_attrib(Attrib::Normal) {
            target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(&self.normals), count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use crate::mesh_data::MeshData;

    #[test]
    fn samples_span_the_curve() {
        let curve = BSplineCurve::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(2.0, 0.0),
                Vec2::new(3.0, 0.0),
            ],
            3,
        );
        let line = BSpline::new(&curve, 10);
        assert_eq!(line.num_vertices(), 10);
        assert_eq!(line.primitive(), Primitive::LineStrip);
        assert_eq!(Source::attrib_dims(&line, Attrib::Position), 2);

        let mut mesh = MeshData::new();
        line.load_into(&mut mesh, AttribSet::all()).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        assert!((p[0]).abs() < 1.0e-5);
        assert!((p[p.len() - 2] - 3.0).abs() < 1.0e-4);
    }

    #[test]
    fn planar_curve_normals_are_perpendicular() {
        let curve = BSplineCurve::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(2.0, 0.0),
                Vec2::new(3.0, 1.0),
            ],
            2,
        );
        let line = BSpline::new(&curve, 8);
        let mut mesh = MeshData::new();
        line.load_into(&mut mesh, AttribSet::all()).unwrap();
        let n = mesh.attrib_data(Attrib::Normal).unwrap();
        for v in n.chunks(3) {
            let len = (v[0] * v[0] + v[1] * v[1]).sqrt();
            assert!((len - 1.0).abs() < 1.0e-4);
            assert_eq!(v[2], 0.0);
        }
    }
}
