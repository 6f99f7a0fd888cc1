//! Clamped B-spline curve evaluation.
//!
//! Supports the queries curve-based generators need: position and
//! derivative at a parameter, arc length over a span, and the inverse
//! mapping from arc length back to parameter. Arc length uses a sampled
//! cumulative-chord table, which is monotone and cheap to invert.

use nalgebra::SVector;

const ARC_SAMPLES: usize = 64;

/// Clamped B-spline over `D`-dimensional control points, parameterized on
/// `[0, 1]`.
#[derive(Debug, Clone)]
pub struct BSplineCurve<const D: usize> {
    points: Vec<SVector<f32, D>>,
    degree: usize,
    knots: Vec<f32>,
    deriv_points: Vec<SVector<f32, D>>,
    deriv_knots: Vec<f32>,
    arc_table: Vec<f32>,
}

impl<const D: usize> BSplineCurve<D> {
    /// Build a clamped uniform B-spline of the given degree.
    ///
    /// The degree is clamped to `points.len() - 1` when too large for the
    /// control polygon.
    pub fn new(points: Vec<SVector<f32, D>>, degree: usize) -> Self {
        assert!(points.len() >= 2, "a curve needs at least two control points");
        let degree = if degree >= points.len() {
            log::warn!(
                "spline degree {degree} too large for {} control points, clamping",
                points.len()
            );
            points.len() - 1
        } else {
            degree.max(1)
        };

        let knots = clamped_knots(points.len(), degree);

        // Control points of the derivative curve (one degree lower).
        let mut deriv_points = Vec::with_capacity(points.len().saturating_sub(1));
        for i in 0..points.len() - 1 {
            let denom = knots[i + degree + 1] - knots[i + 1];
            let scale = if denom.abs() < 1.0e-12 {
                0.0
            } else {
                degree as f32 / denom
            };
            deriv_points.push((points[i + 1] - points[i]) * scale);
        }
        let deriv_knots = knots[1..knots.len() - 1].to_vec();

        let mut curve = Self {
            points,
            degree,
            knots,
            deriv_points,
            deriv_knots,
            arc_table: Vec::new(),
        };
        curve.arc_table = curve.build_arc_table();
        curve
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn position(&self, t: f32) -> SVector<f32, D> {
        de_boor(&self.points, self.degree, &self.knots, t)
    }

    pub fn derivative(&self, t: f32) -> SVector<f32, D> {
        if self.deriv_points.is_empty() {
            return SVector::zeros();
        }
        de_boor(&self.deriv_points, self.degree - 1, &self.deriv_knots, t)
    }

    /// Arc length of the span `[a, b]`.
    pub fn length(&self, a: f32, b: f32) -> f32 {
        self.length_at(b) - self.length_at(a)
    }

    pub fn total_length(&self) -> f32 {
        *self.arc_table.last().unwrap_or(&0.0)
    }

    /// Parameter at which `length` of arc has been traversed from t = 0.
    pub fn time(&self, length: f32) -> f32 {
        let total = self.total_length();
        if total <= 0.0 {
            return 0.0;
        }
        let length = length.clamp(0.0, total);
        let i = self.arc_table.partition_point(|&l| l < length);
        if i == 0 {
            return 0.0;
        }
        let (l0, l1) = (self.arc_table[i - 1], self.arc_table[i]);
        let seg = if l1 - l0 > 0.0 {
            (length - l0) / (l1 - l0)
        } else {
            0.0
        };
        ((i - 1) as f32 + seg) / ARC_SAMPLES as f32
    }

    fn length_at(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0) * ARC_SAMPLES as f32;
        let i = (t.floor() as usize).min(ARC_SAMPLES - 1);
        let frac = t - i as f32;
        self.arc_table[i] + (self.arc_table[i + 1] - self.arc_table[i]) * frac
    }

    fn build_arc_table(&self) -> Vec<f32> {
        let mut table = Vec::with_capacity(ARC_SAMPLES + 1);
        table.push(0.0);
        let mut prev = self.position(0.0);
        let mut total = 0.0;
        for i in 1..=ARC_SAMPLES {
            let cur = self.position(i as f32 / ARC_SAMPLES as f32);
            total += (cur - prev).norm();
            table.push(total);
            prev = cur;
        }
        table
    }
}

fn clamped_knots(num_points: usize, degree: usize) -> Vec<f32> {
    let num_knots = num_points + degree + 1;
    let interior = num_points - degree;
    let mut knots = Vec::with_capacity(num_knots);
    for _ in 0..=degree {
        knots.push(0.0);
    }
    for i in 1..interior {
        knots.push(i as f32 / interior as f32);
    }
    for _ in 0..=degree {
        knots.push(1.0);
    }
    knots
}

fn de_boor<const D: usize>(
    points: &[SVector<f32, D>],
    degree: usize,
    knots: &[f32],
    t: f32,
) -> SVector<f32, D> {
    let n = points.len();
    let t = t.clamp(0.0, 1.0);

    let mut k = degree;
    while k < n - 1 && t >= knots[k + 1] {
        k += 1;
    }

    let mut d: Vec<SVector<f32, D>> = (0..=degree).map(|j| points[j + k - degree]).collect();
    for r in 1..=degree {
        for j in (r..=degree).rev() {
            let i = j + k - degree;
            let denom = knots[i + degree + 1 - r] - knots[i];
            let alpha = if denom.abs() < 1.0e-12 {
                0.0
            } else {
                (t - knots[i]) / denom
            };
            d[j] = d[j - 1] * (1.0 - alpha) + d[j] * alpha;
        }
    }
    d[degree]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Vec2, Vec3};

    fn line_spline() -> BSplineCurve<3> {
        BSplineCurve::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(1.0, 0.0, 0.0),
                Vec3::new(2.0, 0.0, 0.0),
                Vec3::new(3.0, 0.0, 0.0),
            ],
            3,
        )
    }

    #[test]
    fn clamped_spline_interpolates_endpoints() {
        let spline = BSplineCurve::new(
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 2.0),
                Vec2::new(3.0, 2.0),
                Vec2::new(4.0, 0.0),
            ],
            3,
        );
        assert!((spline.position(0.0) - Vec2::new(0.0, 0.0)).norm() < 1.0e-5);
        assert!((spline.position(1.0) - Vec2::new(4.0, 0.0)).norm() < 1.0e-5);
    }

    #[test]
    fn straight_control_polygon_stays_straight() {
        let spline = line_spline();
        for i in 0..=10 {
            let p = spline.position(i as f32 / 10.0);
            assert!(p.y.abs() < 1.0e-5 && p.z.abs() < 1.0e-5);
        }
        assert!((spline.total_length() - 3.0).abs() < 1.0e-2);
    }

    #[test]
    fn derivative_points_along_curve() {
        let spline = line_spline();
        let d = spline.derivative(0.5);
        assert!(d.x > 0.0);
        assert!(d.y.abs() < 1.0e-5);
    }

    #[test]
    fn time_inverts_length() {
        let spline = line_spline();
        let total = spline.total_length();
        let t = spline.time(total * 0.5);
        let walked = spline.length(0.0, t);
        assert!((walked - total * 0.5).abs() < total * 0.02);
    }

    #[test]
    fn over_large_degree_is_clamped() {
        let spline = BSplineCurve::new(vec![Vec2::zeros(), Vec2::new(1.0, 1.0)], 5);
        assert_eq!(spline.degree(), 1);
        assert!((spline.position(0.5) - Vec2::new(0.5, 0.5)).norm() < 1.0e-5);
    }
}
