//! Storage API
//!
//! The façade the remote-call layer talks to.
//!
//! ## Responsibilities
//! - Resolve the requested table, failing with `UnknownTable` before any
//!   engine access
//! - Delegate to the table and pass its result or failure through unchanged
//! - Route decoded protocol requests to the matching operation

use std::collections::BTreeMap;
use std::path::Path;

use crate::config::Config;
use crate::error::Result;
use crate::protocol::{Reply, Request};
use crate::record::Record;
use crate::storage::{Key, TableRegistry};

/// Table-addressed storage operations
///
/// Shared across connection workers behind an `Arc`; every method takes
/// `&self` and adds no locking of its own.
#[derive(Debug)]
pub struct StorageApi {
    registry: TableRegistry,
}

impl StorageApi {
    pub fn new(registry: TableRegistry) -> Self {
        Self { registry }
    }

    /// Open the registry described by `config`
    ///
    /// The data directory itself must already exist; per-table directories
    /// are created as needed.
    pub fn open(config: &Config) -> Result<Self> {
        let registry = TableRegistry::open(&config.data_dir, &config.tables, config.codec())?;
        Ok(Self::new(registry))
    }

    /// Execute a request
    ///
    /// Routes requests to the appropriate operation
    pub fn execute(&self, request: Request) -> Result<Reply> {
        match request {
            Request::Put { table, key, record } => self.put(&table, key, record).map(Reply::Key),
            Request::Get { table, key } => self.get(&table, &key).map(Reply::Record),
            Request::PutMany { table, entries } => {
                self.put_many(&table, entries).map(Reply::Keys)
            }
            Request::GetMany { table, keys } => self.get_many(&table, &keys).map(Reply::Records),
            Request::Delete { table, key } => self.delete(&table, &key).map(|()| Reply::Done),
            Request::DeleteMany { table, keys } => {
                self.delete_many(&table, &keys).map(|()| Reply::Done)
            }
            Request::ScanItems { table } => self.scan_items(&table).map(Reply::Items),
            Request::ScanKeys { table } => self.scan_keys(&table).map(Reply::Keys),
            Request::ScanValues { table } => self.scan_values(&table).map(Reply::Values),
            Request::ScanPrefix { table, prefix } => {
                self.scan_prefix(&table, &prefix).map(Reply::Items)
            }
            Request::ListTables => Ok(Reply::Tables(self.list_tables())),
            Request::Ping => Ok(Reply::Pong),
        }
    }

    /// Names of all registered tables
    pub fn list_tables(&self) -> Vec<String> {
        self.registry.names()
    }

    pub fn put(&self, table: &str, key: Option<Key>, record: Record) -> Result<Key> {
        self.registry.resolve(table)?.put(key, record)
    }

    pub fn get(&self, table: &str, key: &str) -> Result<Option<Record>> {
        self.registry.resolve(table)?.get(key)
    }

    pub fn put_many(&self, table: &str, entries: Vec<(Option<Key>, Record)>) -> Result<Vec<Key>> {
        self.registry.resolve(table)?.put_many(entries)
    }

    pub fn get_many(&self, table: &str, keys: &[Key]) -> Result<BTreeMap<Key, Option<Record>>> {
        self.registry.resolve(table)?.get_many(keys)
    }

    pub fn delete(&self, table: &str, key: &str) -> Result<()> {
        self.registry.resolve(table)?.delete(key)
    }

    pub fn delete_many(&self, table: &str, keys: &[Key]) -> Result<()> {
        self.registry.resolve(table)?.delete_many(keys)
    }

    pub fn scan_items(&self, table: &str) -> Result<BTreeMap<Key, Record>> {
        self.registry.resolve(table)?.scan_items()
    }

    pub fn scan_keys(&self, table: &str) -> Result<Vec<Key>> {
        self.registry.resolve(table)?.scan_keys()
    }

    pub fn scan_values(&self, table: &str) -> Result<Vec<Record>> {
        self.registry.resolve(table)?.scan_values()
    }

    pub fn scan_prefix(&self, table: &str, prefix: &str) -> Result<BTreeMap<Key, Record>> {
        self.registry.resolve(table)?.scan_prefix(prefix)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    pub fn registry(&self) -> &TableRegistry {
        &self.registry
    }

    pub fn data_dir(&self) -> &Path {
        self.registry.data_dir()
    }
}
