//! Wire codec
//!
//! Moves typed shapes between their Rust form and the JSON wire form:
//! scalar and binary values, table-driven record projection, and
//! single-key variant encoding with forward-compatible unknown tags.

pub mod error;
pub mod projector;
pub mod scalar;
pub mod shape;

pub use error::{CodecError, CodecResult};
pub use projector::{project, unproject, Field, FieldRule, Transform};
pub use scalar::{Blob, Document};
pub use shape::{
    decode_value, encode_value, from_wire, from_wire_slice, list_of, nested, to_wire, Layout,
    Shape, UNKNOWN_TAG,
};
