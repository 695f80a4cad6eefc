//! Configuration for tablekv
//!
//! Centralized configuration with sensible defaults.

use std::path::PathBuf;

use crate::record::RecordCodec;
use crate::storage::TableDef;

/// Main configuration for a tablekv instance
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Root directory for all table data
    /// Internal structure:
    ///   {data_dir}/
    ///     ├── {table_a}/      (RocksDB instance for table_a)
    ///     └── {table_b}/      (RocksDB instance for table_b)
    pub data_dir: PathBuf,

    /// Static table definitions, opened once at startup
    pub tables: Vec<TableDef>,

    /// Largest encoded record accepted by put (in bytes)
    pub max_record_size: u64,

    // -------------------------------------------------------------------------
    // Network Configuration
    // -------------------------------------------------------------------------
    /// TCP listen address
    pub listen_addr: String,

    /// Max accepted connections waiting for a free worker
    pub max_connections: usize,

    /// Number of connection worker threads
    pub worker_threads: usize,

    /// Connection read timeout (milliseconds, 0 disables)
    pub read_timeout_ms: u64,

    /// Connection write timeout (milliseconds, 0 disables)
    pub write_timeout_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./tablekv_data"),
            tables: Vec::new(),
            max_record_size: RecordCodec::DEFAULT_MAX_RECORD_SIZE,
            listen_addr: "127.0.0.1:7070".to_string(),
            max_connections: 1024,
            worker_threads: 8,
            read_timeout_ms: 5000,
            write_timeout_ms: 5000,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// The record codec implied by this config
    pub fn codec(&self) -> RecordCodec {
        RecordCodec::new(self.max_record_size)
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the data directory (root for all tables)
    pub fn data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.data_dir = path.into();
        self
    }

    /// Register one table definition
    pub fn table(mut self, def: TableDef) -> Self {
        self.config.tables.push(def);
        self
    }

    /// Register several table definitions
    pub fn tables(mut self, defs: impl IntoIterator<Item = TableDef>) -> Self {
        self.config.tables.extend(defs);
        self
    }

    /// Set the maximum encoded record size (in bytes)
    pub fn max_record_size(mut self, size: u64) -> Self {
        self.config.max_record_size = size;
        self
    }

    /// Set the TCP listen address
    pub fn listen_addr(mut self, addr: impl Into<String>) -> Self {
        self.config.listen_addr = addr.into();
        self
    }

    /// Set the maximum number of queued connections
    pub fn max_connections(mut self, count: usize) -> Self {
        self.config.max_connections = count;
        self
    }

    /// Set the number of worker threads
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.config.worker_threads = count;
        self
    }

    /// Set the read timeout (in milliseconds)
    pub fn read_timeout_ms(mut self, ms: u64) -> Self {
        self.config.read_timeout_ms = ms;
        self
    }

    /// Set the write timeout (in milliseconds)
    pub fn write_timeout_ms(mut self, ms: u64) -> Self {
        self.config.write_timeout_ms = ms;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
