//! Error type for the geometry pipeline.
//!
//! Hard failures (dimensional contract violations, index storage overflow)
//! surface as [`GeomError`]; precondition failures inside modifier chains
//! are logged and degrade to a no-op instead, see the modifier module.

use thiserror::Error;

use crate::attrib::{Attrib, Primitive};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GeomError {
    #[error("attribute {0:?} is not available upstream")]
    MissingAttribute(Attrib),

    #[error("illegal source dimensions {0}; expected 0..=4")]
    IllegalSourceDimensions(u8),

    #[error("illegal destination dimensions {0}; expected 1..=4")]
    IllegalDestDimensions(u8),

    #[error("primitive {0:?} is not supported by this operation")]
    IllegalPrimitive(Primitive),

    #[error("operation requires indexed geometry")]
    NoIndices,

    #[error("{count} indices cannot be stored as {bytes_per_index}-byte values")]
    InadequateIndexStorage { count: usize, bytes_per_index: u8 },
}

pub type Result<T> = std::result::Result<T, GeomError>;
