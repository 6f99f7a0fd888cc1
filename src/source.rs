//! The `Source`/`Target` contract and the raw data conversion helpers.
//!
//! A [`Source`] describes geometry and pushes attribute/index data into a
//! [`Target`] on demand; it owns no vertex data of its own. A [`Target`]
//! accepts data at whatever dimensionality and topology the producer has,
//! converting with [`copy_data`], [`to_triangles`] and [`to_lines`].

use crate::attrib::{Attrib, AttribSet, Primitive};
use crate::error::{GeomError, Result};

/// Polymorphic producer of geometry.
///
/// Count and dimensionality queries are pure and must agree exactly with
/// what [`Source::load_into`] produces. `num_indices() == 0` means the
/// source is non-indexed.
pub trait Source: SourceClone {
    fn num_vertices(&self) -> usize;

    fn num_indices(&self) -> usize {
        0
    }

    fn primitive(&self) -> Primitive;

    /// Dimensionality of `attrib`, 0 when the attribute is absent.
    fn attrib_dims(&self, attrib: Attrib) -> u8;

    fn available_attribs(&self) -> AttribSet;

    /// Push all requested attributes (and indices, if any) into `target`.
    ///
    /// For each supported attribute in `requested`, calls
    /// `target.copy_attrib` exactly once with `count == num_vertices()`.
    fn load_into(&self, target: &mut dyn Target, requested: AttribSet) -> Result<()>;
}

/// Object-safe deep clone for boxed sources.
pub trait SourceClone {
    fn clone_box(&self) -> Box<dyn Source>;
}

impl<T> SourceClone for T
where
    T: Source + Clone + 'static,
{
    fn clone_box(&self) -> Box<dyn Source> {
        Box::new(self.clone())
    }
}

impl Clone for Box<dyn Source> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

/// Polymorphic consumer of geometry.
pub trait Target {
    /// Dimensionality this target wants for `attrib`; 0 means "store at
    /// whatever dimensionality the producer supplies".
    fn attrib_dims(&self, attrib: Attrib) -> u8;

    /// Accept `count` elements of `dims`-dimensional data. A stride of 0
    /// means tightly packed. The target converts to its own dimensionality
    /// via [`copy_data`].
    fn copy_attrib(
        &mut self,
        attrib: Attrib,
        dims: u8,
        stride_bytes: usize,
        data: &[f32],
        count: usize,
    ) -> Result<()>;

    /// Accept an index list in the given topology. `required_bytes_per_index`
    /// is the narrowest width able to represent every index.
    fn copy_indices(
        &mut self,
        primitive: Primitive,
        indices: &[u32],
        required_bytes_per_index: u8,
    ) -> Result<()>;

    /// Synthesize a trivial 0..n index list for a non-indexed source.
    fn generate_indices(&mut self, primitive: Primitive, num_indices: usize) -> Result<()> {
        let indices: Vec<u32> = (0..num_indices as u32).collect();
        self.copy_indices(primitive, &indices, calc_indices_required_bytes(num_indices))
    }
}

/// Convert `count` elements of `src_dims`-dimensional data into
/// `dst_dims`-dimensional slots.
///
/// Defined for all `src_dims`, `dst_dims` in 1..=4 plus the degenerate
/// `src_dims == 0`, which zero-fills the destination. Missing destination
/// components default to 0.0, except component 3 (the homogeneous W slot)
/// which defaults to 1.0. Strides are in bytes; 0 means tightly packed.
pub fn copy_data(
    src_dims: u8,
    src_stride_bytes: usize,
    src: &[f32],
    count: usize,
    dst_dims: u8,
    dst_stride_bytes: usize,
    dst: &mut [f32],
) -> Result<()> {
    if src_dims > 4 {
        return Err(GeomError::IllegalSourceDimensions(src_dims));
    }
    if dst_dims == 0 || dst_dims > 4 {
        return Err(GeomError::IllegalDestDimensions(dst_dims));
    }

    let src_stride = stride_floats(src_stride_bytes, src_dims);
    let dst_stride = stride_floats(dst_stride_bytes, dst_dims);

    if src_dims == 0 {
        for v in 0..count {
            let out = &mut dst[v * dst_stride..v * dst_stride + dst_dims as usize];
            out.fill(0.0);
        }
        return Ok(());
    }

    // Fast path: same shape on both sides, tightly packed.
    if src_dims == dst_dims
        && src_stride == src_dims as usize
        && dst_stride == dst_dims as usize
    {
        let len = count * src_dims as usize;
        dst[..len].copy_from_slice(&src[..len]);
        return Ok(());
    }

    for v in 0..count {
        let input = &src[v * src_stride..];
        let out = &mut dst[v * dst_stride..];
        for d in 0..dst_dims as usize {
            out[d] = if d < src_dims as usize {
                input[d]
            } else if d == 3 {
                1.0
            } else {
                0.0
            };
        }
    }
    Ok(())
}

fn stride_floats(stride_bytes: usize, dims: u8) -> usize {
    if stride_bytes == 0 {
        dims as usize
    } else {
        stride_bytes / std::mem::size_of::<f32>()
    }
}

/// Narrowest per-index byte width able to address `num_indices` vertices.
pub fn calc_indices_required_bytes(num_indices: usize) -> u8 {
    if num_indices < 256 {
        1
    } else if num_indices < 65536 {
        2
    } else {
        4
    }
}

/// Verify that every index fits into `bytes_per_index`-wide storage.
pub fn check_index_storage(indices: &[u32], bytes_per_index: u8) -> Result<()> {
    let limit: u64 = match bytes_per_index {
        1 => 1 << 8,
        2 => 1 << 16,
        4 => 1 << 32,
        _ => {
            return Err(GeomError::InadequateIndexStorage {
                count: indices.len(),
                bytes_per_index,
            })
        }
    };
    if indices.iter().any(|&i| i as u64 >= limit) {
        return Err(GeomError::InadequateIndexStorage {
            count: indices.len(),
            bytes_per_index,
        });
    }
    Ok(())
}

/// Re-express a triangle-like index list as a plain TRIANGLES list.
///
/// Strips alternate winding per triangle: even triangles emit
/// (i, i+1, i+2), odd ones (i+1, i, i+2). Fans share their first index.
pub fn to_triangles(primitive: Primitive, indices: &[u32]) -> Result<Vec<u32>> {
    match primitive {
        Primitive::Triangles => Ok(indices.to_vec()),
        Primitive::TriangleStrip => {
            if indices.len() < 3 {
                return Ok(Vec::new());
            }
            let mut out = Vec::with_capacity((indices.len() - 2) * 3);
            for i in 0..indices.len() - 2 {
                if i % 2 == 0 {
                    out.extend_from_slice(&[indices[i], indices[i + 1], indices[i + 2]]);
                } else {
                    out.extend_from_slice(&[indices[i + 1], indices[i], indices[i + 2]]);
                }
            }
            Ok(out)
        }
        Primitive::TriangleFan => {
            if indices.len() < 3 {
                return Ok(Vec::new());
            }
            let mut out = Vec::with_capacity((indices.len() - 2) * 3);
            for i in 1..indices.len() - 1 {
                out.extend_from_slice(&[indices[0], indices[i], indices[i + 1]]);
            }
            Ok(out)
        }
        Primitive::Lines | Primitive::LineStrip => Err(GeomError::IllegalPrimitive(primitive)),
    }
}

/// Re-express a line-like index list as a plain LINES list.
pub fn to_lines(primitive: Primitive, indices: &[u32]) -> Result<Vec<u32>> {
    match primitive {
        Primitive::Lines => Ok(indices.to_vec()),
        Primitive::LineStrip => {
            if indices.len() < 2 {
                return Ok(Vec::new());
            }
            let mut out = Vec::with_capacity((indices.len() - 1) * 2);
            for i in 0..indices.len() - 1 {
                out.extend_from_slice(&[indices[i], indices[i + 1]]);
            }
            Ok(out)
        }
        _ => Err(GeomError::IllegalPrimitive(primitive)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1, 1)]
    #[case(1, 2)]
    #[case(1, 3)]
    #[case(1, 4)]
    #[case(2, 1)]
    #[case(2, 2)]
    #[case(2, 3)]
    #[case(2, 4)]
    #[case(3, 1)]
    #[case(3, 2)]
    #[case(3, 3)]
    #[case(3, 4)]
    #[case(4, 1)]
    #[case(4, 2)]
    #[case(4, 3)]
    #[case(4, 4)]
    fn dimensional_conversion_grid(#[case] src_dims: u8, #[case] dst_dims: u8) {
        const COUNT: usize = 5;
        let src: Vec<f32> = (0..COUNT * src_dims as usize).map(|i| i as f32 + 0.5).collect();
        let mut dst = vec![f32::NAN; COUNT * dst_dims as usize];
        copy_data(src_dims, 0, &src, COUNT, dst_dims, 0, &mut dst).unwrap();

        let shared = src_dims.min(dst_dims) as usize;
        for v in 0..COUNT {
            for d in 0..dst_dims as usize {
                let got = dst[v * dst_dims as usize + d];
                if d < shared {
                    assert_eq!(got, src[v * src_dims as usize + d]);
                } else if d == 3 {
                    assert_eq!(got, 1.0);
                } else {
                    assert_eq!(got, 0.0);
                }
            }
        }
    }

    #[test]
    fn zero_source_dims_fills_zeros() {
        let mut dst = vec![f32::NAN; 8];
        copy_data(0, 0, &[], 2, 4, 0, &mut dst).unwrap();
        assert!(dst.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn illegal_dims_are_hard_errors() {
        let mut dst = vec![0.0; 4];
        assert_eq!(
            copy_data(5, 0, &[0.0; 20], 4, 1, 0, &mut dst),
            Err(GeomError::IllegalSourceDimensions(5))
        );
        assert_eq!(
            copy_data(3, 0, &[0.0; 12], 4, 0, 0, &mut dst),
            Err(GeomError::IllegalDestDimensions(0))
        );
    }

    #[test]
    fn strided_source_is_deinterleaved() {
        // interleaved (pos2, uv2): extract the uv pairs
        let data = [
            0.0, 0.0, 10.0, 11.0, //
            1.0, 1.0, 20.0, 21.0,
        ];
        let mut dst = vec![0.0f32; 4];
        copy_data(2, 16, &data[2..], 2, 2, 0, &mut dst).unwrap();
        assert_eq!(dst, vec![10.0, 11.0, 20.0, 21.0]);
    }

    #[test]
    fn index_width_thresholds() {
        assert_eq!(calc_indices_required_bytes(0), 1);
        assert_eq!(calc_indices_required_bytes(255), 1);
        assert_eq!(calc_indices_required_bytes(256), 2);
        assert_eq!(calc_indices_required_bytes(65535), 2);
        assert_eq!(calc_indices_required_bytes(65536), 4);
    }

    #[test]
    fn index_storage_overflow_is_detected() {
        assert!(check_index_storage(&[0, 255], 1).is_ok());
        assert!(check_index_storage(&[0, 256], 1).is_err());
        assert!(check_index_storage(&[0, 70000], 2).is_err());
        assert!(check_index_storage(&[0, 70000], 4).is_ok());
    }

    #[test]
    fn strip_to_triangles_alternates_winding() {
        let strip = [0u32, 1, 2, 3, 4];
        let tris = to_triangles(Primitive::TriangleStrip, &strip).unwrap();
        // N-2 triangles
        assert_eq!(tris.len(), 9);
        assert_eq!(&tris[0..3], &[0, 1, 2]);
        assert_eq!(&tris[3..6], &[2, 1, 3]);
        assert_eq!(&tris[6..9], &[2, 3, 4]);
    }

    #[test]
    fn fan_to_triangles_shares_hub() {
        let fan = [7u32, 1, 2, 3, 4];
        let tris = to_triangles(Primitive::TriangleFan, &fan).unwrap();
        assert_eq!(tris.len(), 9);
        for t in tris.chunks(3) {
            assert_eq!(t[0], 7);
        }
        assert_eq!(&tris[3..6], &[7, 2, 3]);
    }

    #[test]
    fn degenerate_strips_produce_no_triangles() {
        assert!(to_triangles(Primitive::TriangleStrip, &[0, 1]).unwrap().is_empty());
        assert!(to_triangles(Primitive::TriangleFan, &[0]).unwrap().is_empty());
    }

    #[test]
    fn line_strip_to_lines() {
        let lines = to_lines(Primitive::LineStrip, &[0, 1, 2, 3]).unwrap();
        assert_eq!(lines, vec![0, 1, 1, 2, 2, 3]);
        assert_eq!(to_lines(Primitive::Lines, &[4, 5]).unwrap(), vec![4, 5]);
        assert!(to_lines(Primitive::Triangles, &[0, 1, 2]).is_err());
    }
}
