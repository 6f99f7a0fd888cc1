//! Rectangle generators.

use bytemuck::cast_slice;

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::Result;
use crate::math::{lerp, Vec2, Vec3, Vec4};
use crate::source::{Source, Target};

/// Unit rectangle in the XY plane, emitted as a four-vertex triangle strip
/// in upper-left, upper-right, lower-left, lower-right order.
#[derive(Debug, Clone)]
pub struct Rect {
    positions: [Vec2; 4],
    colors: [Vec4; 4],
    tex_coords: [Vec2; 4],
    enabled: AttribSet,
}

impl Rect {
    /// Default corner colors in upper-left, upper-right, lower-left,
    /// lower-right order.
    pub fn default_colors() -> [Vec4; 4] {
        [
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            Vec4::new(0.0, 1.0, 0.0, 1.0),
            Vec4::new(1.0, 1.0, 0.0, 1.0),
            Vec4::new(0.0, 0.0, 1.0, 1.0),
        ]
    }

    pub fn new() -> Self {
        Self {
            positions: corner_positions(Vec2::new(-0.5, -0.5), Vec2::new(0.5, 0.5)),
            colors: Self::default_colors(),
            tex_coords: [
                Vec2::new(0.0, 1.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
            ],
            enabled: AttribSet::POSITION
                | AttribSet::COLOR
                | AttribSet::TEX_COORD_0
                | AttribSet::NORMAL,
        }
    }

    /// Set the extents from min/max corners.
    pub fn with_rect(mut self, min: Vec2, max: Vec2) -> Self {
        self.positions = corner_positions(min, max);
        self
    }

    /// Per-corner colors in upper-left, upper-right, lower-left,
    /// lower-right order.
    pub fn with_colors(mut self, colors: [Vec4; 4]) -> Self {
        self.colors = colors;
        self.enabled |= AttribSet::COLOR;
        self
    }

    pub fn with_tex_coords(mut self, tex_coords: [Vec2; 4]) -> Self {
        self.tex_coords = tex_coords;
        self.enabled |= AttribSet::TEX_COORD_0;
        self
    }

    pub fn with_attrib(mut self, attrib: Attrib) -> Self {
        self.enabled |= attrib.flag();
        self
    }

    pub fn without_attrib(mut self, attrib: Attrib) -> Self {
        self.enabled -= attrib.flag();
        self
    }
}

impl Default for Rect {
    fn default() -> Self {
        Self::new()
    }
}

fn corner_positions(min: Vec2, max: Vec2) -> [Vec2; 4] {
    [
        Vec2::new(min.x, max.y),
        Vec2::new(max.x, max.y),
        Vec2::new(min.x, min.y),
        Vec2::new(max.x, min.y),
    ]
}

impl Source for Rect {
    fn num_vertices(&self) -> usize {
        4
    }

    fn primitive(&self) -> Primitive {
        Primitive::TriangleStrip
    }

    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        if !self.enabled.contains_attrib(attrib) {
            return 0;
        }
        match attrib {
            Attrib::Position => 2,
            Attrib::Color => 4,
            Attrib::TexCoord0 => 2,
            Attrib::Normal => 3,
            _ => 0,
        }
    }

    fn available_attribs(&self) -> AttribSet {
        self.enabled
    }

    fn load_into(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        let wanted = requested & self.enabled;
        target.copy_attrib(Attrib::Position, 2, 0, cast_slice(&self.positions), 4)?;
        if wanted.contains_attrib(Attrib::Color) {
            target.copy_attrib(Attrib::Color, 4, 0, cast_slice(&self.colors), 4)?;
        }
        if wanted.contains_attrib(Attrib::TexCoord0) {
            target.copy_attrib(Attrib::TexCoord0, 2, 0, cast_slice(&self.tex_coords), 4)?;
        }
        if wanted.contains_attrib(Attrib::Normal) {
            let normals = [Vec3::z(); 4];
            target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(&normals), 4)?;
        }
        Ok(())
    }
}

/// Rectangle with circular corner arcs, emitted as a triangle fan around
/// the center.
#[derive(Debug, Clone)]
pub struct RoundedRect {
    min: Vec2,
    max: Vec2,
    corner_radius: f32,
    corner_subdivisions: usize,
    colors: [Vec4; 4],
    enabled: AttribSet,
    num_vertices: usize,
}

impl RoundedRect {
    pub fn new() -> Self {
        let mut rect = Self {
            min: Vec2::new(-0.5, -0.5),
            max: Vec2::new(0.5, 0.5),
            corner_radius: 0.1,
            corner_subdivisions: 6,
            colors: Rect::default_colors(),
            enabled: AttribSet::POSITION | AttribSet::TEX_COORD_0 | AttribSet::NORMAL,
            num_vertices: 0,
        };
        rect.update_vertex_counts();
        rect
    }

    pub fn with_rect(mut self, min: Vec2, max: Vec2) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn with_corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius.max(0.0);
        self
    }

    pub fn with_corner_subdivisions(mut self, subdivisions: usize) -> Self {
        self.corner_subdivisions = subdivisions.max(1);
        self.update_vertex_counts();
        self
    }

    /// Enable colors, bilinearly interpolated from the four corner colors
    /// in upper-left, upper-right, lower-left, lower-right order.
    pub fn with_colors(mut self, colors: [Vec4; 4]) -> Self {
        self.colors = colors;
        self.enabled |= AttribSet::COLOR;
        self
    }

    fn update_vertex_counts(&mut self) {
        // center + perimeter + closing duplicate
        self.num_vertices = 4 * (self.corner_subdivisions + 1) + 2;
    }

    fn perimeter(&self) -> Vec<Vec2> {
        use std::f32::consts::FRAC_PI_2;
        let r = self
            .corner_radius
            .min((self.max.x - self.min.x) * 0.5)
            .min((self.max.y - self.min.y) * 0.5);
        let centers = [
            Vec2::new(self.max.x - r, self.min.y + r),
            Vec2::new(self.max.x - r, self.max.y - r),
            Vec2::new(self.min.x + r, self.max.y - r),
            Vec2::new(self.min.x + r, self.min.y + r),
        ];
        let mut points = Vec::with_capacity(4 * (self.corner_subdivisions + 1));
        for (corner, center) in centers.iter().enumerate() {
            let start = corner as f32 * FRAC_PI_2 - FRAC_PI_2;
            for i in 0..=self.corner_subdivisions {
                let angle = start + FRAC_PI_2 * i as f32 / self.corner_subdivisions as f32;
                points.push(center + Vec2::new(angle.cos(), angle.sin()) * r);
            }
        }
        points
    }

    fn color_at(&self, uv: Vec2) -> Vec4 {
        let [ul, ur, ll, lr] = self.colors;
        let bottom = ll.lerp(&lr, uv.x);
        let top = ul.lerp(&ur, uv.x);
        bottom.lerp(&top, uv.y)
    }
}

impl Default for RoundedRect {
    fn default() -> Self {
        Self::new()
    }
}

impl Source for RoundedRect {
    fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    fn primitive(&self) -> Primitive {
        Primitive::TriangleFan
    }

    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        if !self.enabled.contains_attrib(attrib) {
            return 0;
        }
        match attrib {
            Attrib::Position => 2,
            Attrib::Color => 4,
            Attrib::TexCoord0 => 2,
            Attrib::Normal => 3,
            _ => 0,
        }
    }

    fn available_attribs(&self) -> AttribSet {
        self.enabled
    }

    fn load_into(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        let wanted = requested & self.enabled;
        let size = self.max - self.min;

        let mut positions = Vec::with_capacity(self.num_vertices);
        positions.push((self.min + self.max) * 0.5);
        let perimeter = self.perimeter();
        positions.extend_from_slice(&perimeter);
        positions.push(perimeter[0]);

        let uvs: Vec<Vec2> = positions
            .iter()
            .map(|p| Vec2::new((p.x - self.min.x) / size.x, (p.y - self.min.y) / size.y))
            .collect();

        let count = positions.len();
        target.copy_attrib(Attrib::Position, 2, 0, cast_slice(&positions), count)?;
        if wanted.contains_attrib(Attrib::TexCoord0) {
            target.copy_attrib(Attrib::TexCoord0, 2, 0, cast_slice(&uvs), count)?;
        }
        if wanted.contains_attrib(Attrib::Normal) {
            let normals = vec![Vec3::z(); count];
            target.copy_attrib(Attrib::Normal, 3, 0, cast_slice(&normals), count)?;
        }
        if wanted.contains_attrib(Attrib::Color) {
            let colors: Vec<Vec4> = uvs.iter().map(|&uv| self.color_at(uv)).collect();
            target.copy_attrib(Attrib::Color, 4, 0, cast_slice(&colors), count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh_data::MeshData;

    #[test]
    fn rect_defaults() {
        let rect = Rect::new();
        assert_eq!(rect.num_vertices(), 4);
        assert_eq!(rect.num_indices(), 0);
        assert_eq!(Source::primitive(&rect), Primitive::TriangleStrip);
        assert_eq!(Source::attrib_dims(&rect, Attrib::Position), 2);
        assert_eq!(Source::attrib_dims(&rect, Attrib::Color), 4);

        let mut mesh = MeshData::new();
        rect.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert_eq!(Source::num_vertices(&mesh), 4);
        assert!(mesh.indices().is_empty());

        let colors = mesh.attrib_data(Attrib::Color).unwrap();
        #[rustfmt::skip]
        let expected = [
            1.0, 0.0, 0.0, 1.0,
            0.0, 1.0, 0.0, 1.0,
            1.0, 1.0, 0.0, 1.0,
            0.0, 0.0, 1.0, 1.0,
        ];
        assert_eq!(colors, &expected);
    }

    #[test]
    fn rect_corner_order_is_ul_ur_ll_lr() {
        let rect = Rect::new();
        let mut mesh = MeshData::new();
        rect.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        assert_eq!(&p[0..2], &[-0.5, 0.5]);
        assert_eq!(&p[2..4], &[0.5, 0.5]);
        assert_eq!(&p[4..6], &[-0.5, -0.5]);
        assert_eq!(&p[6..8], &[0.5, -0.5]);
    }

    #[test]
    fn disabled_color_reports_zero_dims() {
        let rect = Rect::new().without_attrib(Attrib::Color);
        assert_eq!(Source::attrib_dims(&rect, Attrib::Color), 0);

        let mut mesh = MeshData::new();
        rect.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert!(mesh.attrib_data(Attrib::Color).is_none());
    }

    #[test]
    fn rounded_rect_count_matches_load() {
        let rect = RoundedRect::new().with_corner_subdivisions(4);
        assert_eq!(rect.num_vertices(), 4 * 5 + 2);

        let mut mesh = MeshData::new();
        rect.load_into(&mut mesh, AttribSet::all()).unwrap();
        assert_eq!(Source::num_vertices(&mesh), rect.num_vertices());
        assert_eq!(Source::primitive(&rect), Primitive::TriangleFan);
    }

    #[test]
    fn rounded_rect_perimeter_stays_inside_rect() {
        let rect = RoundedRect::new().with_corner_radius(0.2);
        let mut mesh = MeshData::new();
        rect.load_into(&mut mesh, AttribSet::POSITION).unwrap();
        let p = mesh.attrib_data(Attrib::Position).unwrap();
        for pair in p.chunks(2) {
            assert!(pair[0] >= -0.5 - 1.0e-5 && pair[0] <= 0.5 + 1.0e-5);
            assert!(pair[1] >= -0.5 - 1.0e-5 && pair[1] <= 0.5 + 1.0e-5);
        }
    }
}
