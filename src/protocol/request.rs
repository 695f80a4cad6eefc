//! Request definitions
//!
//! Represents remote calls from clients. Every variant except `ListTables`
//! and `Ping` names the table it targets.

use serde::{Deserialize, Serialize};

use crate::record::Record;
use crate::storage::Key;

/// A decoded remote call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Request {
    /// Store a record, resolving its key if none is given
    Put {
        table: String,
        key: Option<Key>,
        record: Record,
    },

    /// Fetch one record
    Get { table: String, key: Key },

    /// Store many records atomically
    PutMany {
        table: String,
        entries: Vec<(Option<Key>, Record)>,
    },

    /// Fetch many records
    GetMany { table: String, keys: Vec<Key> },

    /// Remove one key
    Delete { table: String, key: Key },

    /// Remove many keys atomically
    DeleteMany { table: String, keys: Vec<Key> },

    /// All key/record pairs of a table
    ScanItems { table: String },

    /// All keys of a table
    ScanKeys { table: String },

    /// All records of a table
    ScanValues { table: String },

    /// Key/record pairs under a key prefix
    ScanPrefix { table: String, prefix: String },

    /// Names of the registered tables
    ListTables,

    /// Ping (health check)
    Ping,
}

impl Request {
    /// Short operation name, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Request::Put { .. } => "put",
            Request::Get { .. } => "get",
            Request::PutMany { .. } => "put_many",
            Request::GetMany { .. } => "get_many",
            Request::Delete { .. } => "delete",
            Request::DeleteMany { .. } => "delete_many",
            Request::ScanItems { .. } => "scan_items",
            Request::ScanKeys { .. } => "scan_keys",
            Request::ScanValues { .. } => "scan_values",
            Request::ScanPrefix { .. } => "scan_prefix",
            Request::ListTables => "list_tables",
            Request::Ping => "ping",
        }
    }

    /// The table this request targets, if any
    pub fn table(&self) -> Option<&str> {
        match self {
            Request::Put { table, .. }
            | Request::Get { table, .. }
            | Request::PutMany { table, .. }
            | Request::GetMany { table, .. }
            | Request::Delete { table, .. }
            | Request::DeleteMany { table, .. }
            | Request::ScanItems { table }
            | Request::ScanKeys { table }
            | Request::ScanValues { table }
            | Request::ScanPrefix { table, .. } => Some(table),
            Request::ListTables | Request::Ping => None,
        }
    }
}
