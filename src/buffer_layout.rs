//! Vertex attribute descriptions and buffer layouts.
//!
//! An [`AttribInfo`] describes how one semantic channel is stored inside a
//! buffer (dimensionality, numeric type, stride and offset); a
//! [`BufferLayout`] collects the infos for one interleaved or planar buffer.

use crate::attrib::{Attrib, AttribSet, DataType};

/// Storage description for a single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttribInfo {
    attrib: Attrib,
    data_type: DataType,
    dims: u8,
    /// Bytes between consecutive elements; 0 means tightly packed.
    stride: usize,
    /// Byte offset of the first element inside the buffer.
    offset: usize,
    /// 0 for per-vertex data, N to advance once every N instances.
    instance_divisor: u32,
}

impl AttribInfo {
    pub fn new(attrib: Attrib, dims: u8, stride: usize, offset: usize) -> Self {
        Self {
            attrib,
            data_type: DataType::Float,
            dims,
            stride,
            offset,
            instance_divisor: 0,
        }
    }

    pub fn with_data_type(mut self, data_type: DataType) -> Self {
        self.data_type = data_type;
        self
    }

    pub fn with_instance_divisor(mut self, divisor: u32) -> Self {
        self.instance_divisor = divisor;
        self
    }

    pub fn attrib(&self) -> Attrib {
        self.attrib
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    pub fn dims(&self) -> u8 {
        self.dims
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn instance_divisor(&self) -> u32 {
        self.instance_divisor
    }

    /// Size of one element in bytes.
    pub fn byte_size(&self) -> usize {
        self.dims as usize * self.data_type.byte_size()
    }

    /// Declared stride, raw; 0 means tightly packed.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Stride actually used when walking the buffer.
    pub fn effective_stride(&self) -> usize {
        if self.stride == 0 {
            self.byte_size()
        } else {
            self.stride
        }
    }
}

/// Ordered collection of [`AttribInfo`] for one buffer.
///
/// At most one info per semantic channel; appending an info for a channel
/// already present replaces the previous entry in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BufferLayout {
    attribs: Vec<AttribInfo>,
}

impl BufferLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, info: AttribInfo) {
        if let Some(existing) = self.attribs.iter_mut().find(|a| a.attrib() == info.attrib()) {
            *existing = info;
        } else {
            self.attribs.push(info);
        }
    }

    pub fn attrib_infos(&self) -> &[AttribInfo] {
        &self.attribs
    }

    pub fn attrib_info(&self, attrib: Attrib) -> Option<&AttribInfo> {
        self.attribs.iter().find(|a| a.attrib() == attrib)
    }

    pub fn has_attrib(&self, attrib: Attrib) -> bool {
        self.attrib_info(attrib).is_some()
    }

    pub fn attrib_dims(&self, attrib: Attrib) -> u8 {
        self.attrib_info(attrib).map_or(0, |a| a.dims())
    }

    pub fn available_attribs(&self) -> AttribSet {
        self.attribs.iter().map(|a| a.attrib()).collect()
    }

    /// Minimum byte span needed to hold `num_vertices` vertices.
    pub fn calc_required_storage(&self, num_vertices: usize) -> usize {
        if num_vertices == 0 {
            return 0;
        }
        self.attribs
            .iter()
            .map(|a| a.offset() + (num_vertices - 1) * a.effective_stride() + a.byte_size())
            .max()
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tightly_packed_stride_defaults_to_byte_size() {
        let info = AttribInfo::new(Attrib::Position, 3, 0, 0);
        assert_eq!(info.byte_size(), 12);
        assert_eq!(info.effective_stride(), 12);

        let interleaved = AttribInfo::new(Attrib::Position, 3, 32, 0);
        assert_eq!(interleaved.effective_stride(), 32);
    }

    #[test]
    fn double_elements_are_eight_bytes() {
        let info = AttribInfo::new(Attrib::Position, 3, 0, 0).with_data_type(DataType::Double);
        assert_eq!(info.byte_size(), 24);
    }

    #[test]
    fn append_replaces_same_attrib() {
        let mut layout = BufferLayout::new();
        layout.append(AttribInfo::new(Attrib::Position, 3, 0, 0));
        layout.append(AttribInfo::new(Attrib::Position, 2, 0, 0));
        assert_eq!(layout.attrib_infos().len(), 1);
        assert_eq!(layout.attrib_dims(Attrib::Position), 2);
    }

    #[test]
    fn required_storage_planar() {
        let mut layout = BufferLayout::new();
        layout.append(AttribInfo::new(Attrib::Position, 3, 0, 0));
        // 10 tightly packed vec3s
        assert_eq!(layout.calc_required_storage(10), 120);
        assert_eq!(layout.calc_required_storage(0), 0);
    }

    #[test]
    fn required_storage_interleaved() {
        let mut layout = BufferLayout::new();
        // interleaved position + normal, 24-byte stride
        layout.append(AttribInfo::new(Attrib::Position, 3, 24, 0));
        layout.append(AttribInfo::new(Attrib::Normal, 3, 24, 12));
        // 4 vertices: last normal ends at 12 + 3*24 + 12 = 96
        assert_eq!(layout.calc_required_storage(4), 96);
    }

    #[test]
    fn available_attribs_reports_set() {
        let mut layout = BufferLayout::new();
        layout.append(AttribInfo::new(Attrib::Position, 3, 0, 0));
        layout.append(AttribInfo::new(Attrib::TexCoord0, 2, 0, 0));
        let set = layout.available_attribs();
        assert!(set.contains_attrib(Attrib::Position));
        assert!(set.contains_attrib(Attrib::TexCoord0));
        assert!(!set.contains_attrib(Attrib::Normal));
    }
}
