//! Storage Module
//!
//! Tables over the embedded engine, and the registry that owns them.
//!
//! ## Responsibilities
//! - Open one RocksDB instance per table definition
//! - Key assignment (`_id`, explicit key, or generated ULID)
//! - Atomic batched puts and deletes
//! - Point, multi-key, full and prefix reads
//!
//! ## On-disk Layout
//! ```text
//! {data_dir}/
//!   ├── {table_a}/     (engine files for table_a)
//!   └── {table_b}/     (engine files for table_b)
//! ```
//!
//! Each stored value is the record codec's encoding of the record, whose
//! `_id` field equals the key it is stored under.

mod table;
mod registry;

pub use table::{Table, TableDef, TableOptions};
pub use registry::TableRegistry;

/// A record key: opaque, non-empty, unique within one table
pub type Key = String;
