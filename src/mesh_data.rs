//! Concrete mesh buffer implementing both [`Source`] and [`Target`].
//!
//! `MeshData` stores planar per-attribute float arrays plus one u32 index
//! list. It is the universal sink for pipeline output and doubles as a
//! replayable source, the role a mesh container plays for cap geometry in
//! the extrusion generators.

use log::warn;

use crate::attrib::{Attrib, AttribSet, DataType, Primitive};
use crate::buffer_layout::BufferLayout;
use crate::error::{GeomError, Result};
use crate::source::{
    calc_indices_required_bytes, check_index_storage, copy_data, Source, Target,
};

#[derive(Debug, Clone)]
struct AttribEntry {
    attrib: Attrib,
    dims: u8,
    data: Vec<f32>,
}

/// Planar geometry storage.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    attribs: Vec<AttribEntry>,
    indices: Vec<u32>,
    primitive: Option<Primitive>,
    num_vertices: usize,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw values of an attribute, `count * dims` floats, tightly packed.
    pub fn attrib_data(&self, attrib: Attrib) -> Option<&[f32]> {
        self.entry(attrib).map(|e| e.data.as_slice())
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Whether any attribute or index data has been written.
    pub fn is_empty(&self) -> bool {
        self.attribs.is_empty() && self.indices.is_empty()
    }

    fn entry(&self, attrib: Attrib) -> Option<&AttribEntry> {
        self.attribs.iter().find(|e| e.attrib == attrib)
    }

    /// Pack the stored channels into a single buffer described by `layout`.
    ///
    /// Every float channel named by the layout is written at its declared
    /// offset and stride, widening or narrowing dimensions the same way
    /// [`copy_data`] does. Offsets and strides must be 4-byte aligned.
    /// Returns [`GeomError::MissingAttribute`] when the layout names a
    /// channel this mesh does not hold.
    pub fn interleave(&self, layout: &BufferLayout) -> Result<Vec<f32>> {
        let bytes = layout.calc_required_storage(self.num_vertices);
        let mut buffer = vec![0.0f32; bytes.div_ceil(4)];
        for info in layout.attrib_infos() {
            if info.data_type() != DataType::Float {
                warn!(
                    "interleave: skipping {:?}, only float channels are packed",
                    info.attrib()
                );
                continue;
            }
            let entry = self
                .entry(info.attrib())
                .ok_or(GeomError::MissingAttribute(info.attrib()))?;
            copy_data(
                entry.dims,
                0,
                &entry.data,
                self.num_vertices,
                info.dims(),
                info.effective_stride(),
                &mut buffer[info.offset() / 4..],
            )?;
        }
        Ok(buffer)
    }
}

impl Target for MeshData {
    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        self.entry(attrib).map_or(0, |e| e.dims)
    }

    fn copy_attrib(
        &mut self,
        attrib: Attrib,
        dims: u8,
        stride_bytes: usize,
        data: &[f32],
        count: usize,
    ) -> Result<()> {
        let mut stored = vec![0.0f32; count * dims as usize];
        copy_data(dims, stride_bytes, data, count, dims, 0, &mut stored)?;
        self.num_vertices = count;
        if let Some(entry) = self.attribs.iter_mut().find(|e| e.attrib == attrib) {
            entry.dims = dims;
            entry.data = stored;
        } else {
            self.attribs.push(AttribEntry {
                attrib,
                dims,
                data: stored,
            });
        }
        Ok(())
    }

    fn copy_indices(
        &mut self,
        primitive: Primitive,
        indices: &[u32],
        required_bytes_per_index: u8,
    ) -> Result<()> {
        check_index_storage(indices, required_bytes_per_index)?;
        self.primitive = Some(primitive);
        self.indices = indices.to_vec();
        Ok(())
    }
}

impl Source for MeshData {
    fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    fn num_indices(&self) -> usize {
        self.indices.len()
    }

    fn primitive(&self) -> Primitive {
        self.primitive.unwrap_or(Primitive::Triangles)
    }

    fn attrib_dims(&self, attrib: Attrib) -> u8 {
        self.entry(attrib).map_or(0, |e| e.dims)
    }

    fn available_attribs(&self) -> AttribSet {
        self.attribs.iter().map(|e| e.attrib).collect()
    }

    fn load_into(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()> {
        for entry in &self.attribs {
            if !requested.contains_attrib(entry.attrib) {
                continue;
            }
            target.copy_attrib(entry.attrib, entry.dims, 0, &entry.data, self.num_vertices)?;
        }
        if !self.indices.is_empty() {
            target.copy_indices(
                self.primitive(),
                &self.indices,
                calc_indices_required_bytes(self.indices.len()),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GeomError;

    #[test]
    fn stores_and_replays_attributes() {
        let mut mesh = MeshData::new();
        let positions = [0.0, 0.0, 1.0, 0.0, 0.0, 1.0];
        Target::copy_attrib(&mut mesh, Attrib::Position, 2, 0, &positions, 3).unwrap();
        mesh.copy_indices(Primitive::Triangles, &[0, 1, 2], 1).unwrap();

        assert_eq!(Source::num_vertices(&mesh), 3);
        assert_eq!(Source::num_indices(&mesh), 3);
        assert_eq!(Source::primitive(&mesh), Primitive::Triangles);
        assert_eq!(Source::attrib_dims(&mesh, Attrib::Position), 2);
        assert_eq!(mesh.attrib_data(Attrib::Position).unwrap(), &positions);

        let mut sink = MeshData::new();
        mesh.load_into(&mut sink, AttribSet::all()).unwrap();
        assert_eq!(sink.attrib_data(Attrib::Position).unwrap(), &positions);
        assert_eq!(sink.indices(), &[0, 1, 2]);
    }

    #[test]
    fn rewriting_an_attrib_replaces_it() {
        let mut mesh = MeshData::new();
        Target::copy_attrib(&mut mesh, Attrib::Position, 3, 0, &[0.0; 6], 2).unwrap();
        Target::copy_attrib(&mut mesh, Attrib::Position, 2, 0, &[1.0; 4], 2).unwrap();
        assert_eq!(Source::attrib_dims(&mesh, Attrib::Position), 2);
        assert_eq!(mesh.attrib_data(Attrib::Position).unwrap(), &[1.0; 4]);
    }

    #[test]
    fn unrequested_attribs_are_skipped_on_replay() {
        let mut mesh = MeshData::new();
        Target::copy_attrib(&mut mesh, Attrib::Position, 2, 0, &[0.0; 4], 2).unwrap();
        Target::copy_attrib(&mut mesh, Attrib::Color, 3, 0, &[1.0; 6], 2).unwrap();

        let mut sink = MeshData::new();
        mesh.load_into(&mut sink, AttribSet::POSITION).unwrap();
        assert!(sink.attrib_data(Attrib::Position).is_some());
        assert!(sink.attrib_data(Attrib::Color).is_none());
    }

    #[test]
    fn narrow_index_storage_is_rejected() {
        let mut mesh = MeshData::new();
        let err = mesh
            .copy_indices(Primitive::Triangles, &[0, 300, 2], 1)
            .unwrap_err();
        assert!(matches!(err, GeomError::InadequateIndexStorage { .. }));
    }

    #[test]
    fn interleave_packs_channels_per_layout() {
        use crate::buffer_layout::AttribInfo;

        let mut mesh = MeshData::new();
        let positions = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let normals = [0.0, 1.0, 0.0, 0.0, 0.0, 1.0];
        Target::copy_attrib(&mut mesh, Attrib::Position, 3, 0, &positions, 2).unwrap();
        Target::copy_attrib(&mut mesh, Attrib::Normal, 3, 0, &normals, 2).unwrap();

        let mut layout = BufferLayout::new();
        layout.append(AttribInfo::new(Attrib::Position, 3, 24, 0));
        layout.append(AttribInfo::new(Attrib::Normal, 3, 24, 12));

        let buffer = mesh.interleave(&layout).unwrap();
        assert_eq!(buffer.len(), layout.calc_required_storage(2) / 4);
        assert_eq!(
            buffer,
            &[0.0, 1.0, 2.0, 0.0, 1.0, 0.0, 3.0, 4.0, 5.0, 0.0, 0.0, 1.0]
        );
    }

    #[test]
    fn interleave_requires_named_channels() {
        use crate::buffer_layout::AttribInfo;

        let mut mesh = MeshData::new();
        Target::copy_attrib(&mut mesh, Attrib::Position, 3, 0, &[0.0; 6], 2).unwrap();

        let mut layout = BufferLayout::new();
        layout.append(AttribInfo::new(Attrib::TexCoord0, 2, 0, 0));
        let err = mesh.interleave(&layout).unwrap_err();
        assert!(matches!(err, GeomError::MissingAttribute(Attrib::TexCoord0)));
    }

    #[test]
    fn generate_indices_builds_sequence() {
        let mut mesh = MeshData::new();
        mesh.generate_indices(Primitive::Triangles, 6).unwrap();
        assert_eq!(mesh.indices(), &[0, 1, 2, 3, 4, 5]);
        assert_eq!(Source::primitive(&mesh), Primitive::Triangles);
    }
}
