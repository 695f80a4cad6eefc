//! Record Module
//!
//! Application records and their binary encoding.
//!
//! ## Responsibilities
//! - Dynamically typed field values (`Value`)
//! - Records with a reserved `_id` field carrying their key
//! - Compact, size-bounded encoding used as the stored value
//!
//! Any record built from nested maps, arrays, strings, numbers, booleans,
//! bytes and null decodes back to an equal record.

mod value;
mod codec;

pub use value::{Record, Value, ID_FIELD};
pub use codec::{decode, encode, RecordCodec};
