//! # tablekv
//!
//! A table-oriented key-value server with:
//! - One RocksDB instance per statically defined table
//! - Records with a self-describing `_id`, generated as a ULID when absent
//! - Atomic batched puts and deletes
//! - TCP-based client protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                              │
//! │                  (Multiple Clients)                          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                    Storage API                               │
//! │          (resolve table, then delegate)                      │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Table "a"  │   ...    │  Table "z"  │
//!   │  (RocksDB)  │          │  (RocksDB)  │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          └──────────┬─────────────┘
//!                     ▼
//!             ┌───────────────┐
//!             │ Record Codec  │
//!             │   (bincode)   │
//!             └───────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;
pub mod api;
pub mod protocol;
pub mod network;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{Result, StoreError};
pub use config::Config;
pub use api::StorageApi;
pub use record::{Record, Value};
pub use storage::{Key, Table, TableDef, TableRegistry};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of tablekv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
