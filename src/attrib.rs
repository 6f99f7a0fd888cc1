//! Semantic vertex channels, channel sets and primitive topologies.

use bitflags::bitflags;

/// Semantic vertex channel identifier.
///
/// The discriminants are contiguous so channels can be iterated and used as
/// array indices (see [`Attrib::index`] and [`Attrib::ALL`]).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Attrib {
    Position = 0,
    Color,
    TexCoord0,
    TexCoord1,
    TexCoord2,
    TexCoord3,
    Normal,
    Tangent,
    Bitangent,
    BoneIndex,
    BoneWeight,
    Custom0,
    Custom1,
    Custom2,
    Custom3,
    Custom4,
    Custom5,
    Custom6,
    Custom7,
    Custom8,
    Custom9,
}

impl Attrib {
    /// Number of distinct channels.
    pub const COUNT: usize = 21;

    /// All channels in discriminant order.
    pub const ALL: [Attrib; Self::COUNT] = [
        Attrib::Position,
        Attrib::Color,
        Attrib::TexCoord0,
        Attrib::TexCoord1,
        Attrib::TexCoord2,
        Attrib::TexCoord3,
        Attrib::Normal,
        Attrib::Tangent,
        Attrib::Bitangent,
        Attrib::BoneIndex,
        Attrib::BoneWeight,
        Attrib::Custom0,
        Attrib::Custom1,
        Attrib::Custom2,
        Attrib::Custom3,
        Attrib::Custom4,
        Attrib::Custom5,
        Attrib::Custom6,
        Attrib::Custom7,
        Attrib::Custom8,
        Attrib::Custom9,
    ];

    /// Stable index of this channel, usable for array storage.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Single-channel set containing only this attrib.
    pub fn flag(self) -> AttribSet {
        AttribSet::from_bits_truncate(1 << self.index())
    }
}

bitflags! {
    /// Set of [`Attrib`] channels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AttribSet: u32 {
        const POSITION = 1 << 0;
        const COLOR = 1 << 1;
        const TEX_COORD_0 = 1 << 2;
        const TEX_COORD_1 = 1 << 3;
        const TEX_COORD_2 = 1 << 4;
        const TEX_COORD_3 = 1 << 5;
        const NORMAL = 1 << 6;
        const TANGENT = 1 << 7;
        const BITANGENT = 1 << 8;
        const BONE_INDEX = 1 << 9;
        const BONE_WEIGHT = 1 << 10;
        const CUSTOM_0 = 1 << 11;
        const CUSTOM_1 = 1 << 12;
        const CUSTOM_2 = 1 << 13;
        const CUSTOM_3 = 1 << 14;
        const CUSTOM_4 = 1 << 15;
        const CUSTOM_5 = 1 << 16;
        const CUSTOM_6 = 1 << 17;
        const CUSTOM_7 = 1 << 18;
        const CUSTOM_8 = 1 << 19;
        const CUSTOM_9 = 1 << 20;
    }
}

impl AttribSet {
    /// Iterate the channels present in this set, in discriminant order.
    pub fn attribs(self) -> impl Iterator<Item = Attrib> {
        Attrib::ALL.into_iter().filter(move |a| self.contains(a.flag()))
    }

    pub fn contains_attrib(self, attrib: Attrib) -> bool {
        self.contains(attrib.flag())
    }
}

impl From<Attrib> for AttribSet {
    fn from(attrib: Attrib) -> Self {
        attrib.flag()
    }
}

impl FromIterator<Attrib> for AttribSet {
    fn from_iter<I: IntoIterator<Item = Attrib>>(iter: I) -> Self {
        iter.into_iter()
            .fold(AttribSet::empty(), |set, a| set | a.flag())
    }
}

/// Primitive topology of an index (or implicit-index) list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Primitive {
    /// Whether this topology folds into the LINES bucket.
    pub fn is_lines_like(self) -> bool {
        matches!(self, Primitive::Lines | Primitive::LineStrip)
    }

    /// Whether this topology folds into the TRIANGLES bucket.
    pub fn is_triangles_like(self) -> bool {
        matches!(
            self,
            Primitive::Triangles | Primitive::TriangleStrip | Primitive::TriangleFan
        )
    }
}

/// Numeric representation of an attribute element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DataType {
    #[default]
    Float,
    Integer,
    Double,
}

impl DataType {
    /// Size of one element in bytes.
    pub fn byte_size(self) -> usize {
        match self {
            DataType::Float | DataType::Integer => 4,
            DataType::Double => 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attrib_indices_are_contiguous() {
        for (i, attrib) in Attrib::ALL.iter().enumerate() {
            assert_eq!(attrib.index(), i);
        }
        assert_eq!(Attrib::ALL.len(), Attrib::COUNT);
    }

    #[test]
    fn flags_match_indices() {
        assert_eq!(Attrib::Position.flag(), AttribSet::POSITION);
        assert_eq!(Attrib::Normal.flag(), AttribSet::NORMAL);
        assert_eq!(Attrib::Custom9.flag(), AttribSet::CUSTOM_9);
    }

    #[test]
    fn set_iteration_follows_discriminant_order() {
        let set = AttribSet::NORMAL | AttribSet::POSITION | AttribSet::CUSTOM_0;
        let attribs: Vec<Attrib> = set.attribs().collect();
        assert_eq!(attribs, vec![Attrib::Position, Attrib::Normal, Attrib::Custom0]);
    }

    #[test]
    fn primitive_buckets() {
        assert!(Primitive::TriangleFan.is_triangles_like());
        assert!(Primitive::TriangleStrip.is_triangles_like());
        assert!(!Primitive::TriangleStrip.is_lines_like());
        assert!(Primitive::LineStrip.is_lines_like());
        assert!(Primitive::Lines.is_lines_like());
    }

    #[test]
    fn data_type_sizes() {
        assert_eq!(DataType::Float.byte_size(), 4);
        assert_eq!(DataType::Integer.byte_size(), 4);
        assert_eq!(DataType::Double.byte_size(), 8);
    }
}
