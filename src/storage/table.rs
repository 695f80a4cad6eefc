//! Table
//!
//! One named keyspace backed by its own RocksDB instance.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rocksdb::{Direction, IteratorMode, ReadOptions, SliceTransform, WriteBatch, DB};
use ulid::Ulid;

use crate::error::{Result, StoreError};
use crate::record::{Record, RecordCodec};
use super::Key;

// =============================================================================
// Table Definitions
// =============================================================================

/// Per-table engine options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableOptions {
    /// Length of the fixed key prefix fed to the engine's prefix extractor
    pub prefix_length: Option<usize>,

    /// Memtable size before the engine flushes it (bytes)
    pub write_buffer_size: Option<usize>,
}

impl TableOptions {
    /// Build the engine options for this table
    ///
    /// Missing on-disk state is always created.
    fn engine_options(&self) -> rocksdb::Options {
        let mut opts = rocksdb::Options::default();
        opts.create_if_missing(true);

        if let Some(len) = self.prefix_length {
            opts.set_prefix_extractor(SliceTransform::create_fixed_prefix(len));
        }
        if let Some(size) = self.write_buffer_size {
            opts.set_write_buffer_size(size);
        }

        opts
    }
}

/// Static description of a table: its name and engine options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDef {
    /// Table identifier, also the directory name under the data root
    pub name: String,

    pub options: TableOptions,
}

impl TableDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: TableOptions::default(),
        }
    }

    pub fn with_prefix_length(mut self, len: usize) -> Self {
        self.options.prefix_length = Some(len);
        self
    }

    pub fn with_write_buffer_size(mut self, size: usize) -> Self {
        self.options.write_buffer_size = Some(size);
        self
    }

    /// Check that the name is usable as a single directory component
    pub fn validate(&self) -> Result<()> {
        let name = self.name.as_str();
        if name.is_empty() || name == "." || name == ".." {
            return Err(StoreError::Config(format!("invalid table name {:?}", name)));
        }
        if name.contains(['/', '\\', '\0']) {
            return Err(StoreError::Config(format!(
                "table name {:?} must not contain path separators",
                name
            )));
        }
        if self.options.prefix_length == Some(0) {
            return Err(StoreError::Config(format!(
                "table {:?}: prefix length must be positive",
                name
            )));
        }
        Ok(())
    }
}

/// Parses `NAME` or `NAME:PREFIX_LEN`
impl FromStr for TableDef {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        let def = match s.split_once(':') {
            Some((name, len)) => {
                let len = len.parse::<usize>().map_err(|e| {
                    StoreError::Config(format!("table {:?}: bad prefix length {:?}: {}", name, len, e))
                })?;
                TableDef::new(name).with_prefix_length(len)
            }
            None => TableDef::new(s),
        };
        def.validate()?;
        Ok(def)
    }
}

// =============================================================================
// Table
// =============================================================================

/// A named keyspace over one engine handle
///
/// The handle stays open for the table's whole lifetime and is closed when
/// the table is dropped. No locking is added on top of the engine: concurrent
/// writers to one key race, and the last write wins. A get followed by a put
/// is not atomic.
pub struct Table {
    name: String,
    path: PathBuf,
    db: DB,
    codec: RecordCodec,
}

impl Table {
    /// Open (or create) the table's engine directory under `data_dir`
    pub fn open(data_dir: &Path, def: &TableDef, codec: RecordCodec) -> Result<Self> {
        def.validate()?;

        let path = data_dir.join(&def.name);
        let db = DB::open(&def.options.engine_options(), &path)?;

        tracing::info!(
            table = %def.name,
            path = %path.display(),
            prefix_length = ?def.options.prefix_length,
            "Opened table"
        );

        Ok(Self {
            name: def.name.clone(),
            path,
            db,
            codec,
        })
    }

    /// Store a record, returning the key it was stored under
    ///
    /// Key resolution order:
    /// 1. `key`, if given and non-empty
    /// 2. the record's own non-empty string `_id`
    /// 3. a freshly generated ULID
    ///
    /// The record's `_id` is set to the resolved key before encoding. An
    /// existing value at that key is overwritten.
    pub fn put(&self, key: Option<Key>, mut record: Record) -> Result<Key> {
        let (key, value) = self.prepare(key, &mut record)?;
        self.db.put(key.as_bytes(), value)?;
        Ok(key)
    }

    /// Fetch the record at `key`, or `None` if absent
    pub fn get(&self, key: &str) -> Result<Option<Record>> {
        match self.db.get(key.as_bytes())? {
            Some(bytes) => Ok(Some(self.codec.decode(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Remove `key`; removing an absent key is a no-op
    pub fn delete(&self, key: &str) -> Result<()> {
        self.db.delete(key.as_bytes())?;
        Ok(())
    }

    /// Store many records in one atomic batch
    ///
    /// Every entry is keyed and encoded before anything is written, so a bad
    /// record aborts the whole call with nothing applied. When two entries
    /// resolve to the same key, the later one wins. Returns the resolved keys
    /// in entry order.
    pub fn put_many(&self, entries: Vec<(Option<Key>, Record)>) -> Result<Vec<Key>> {
        let mut batch = WriteBatch::default();
        let mut keys = Vec::with_capacity(entries.len());

        for (key, mut record) in entries {
            let (key, value) = self.prepare(key, &mut record)?;
            batch.put(key.as_bytes(), value);
            keys.push(key);
        }

        tracing::trace!(table = %self.name, entries = keys.len(), "Writing put batch");
        self.db.write(batch)?;
        Ok(keys)
    }

    /// Remove many keys in one atomic batch; absent keys are skipped
    pub fn delete_many(&self, keys: &[Key]) -> Result<()> {
        let mut batch = WriteBatch::default();
        for key in keys {
            batch.delete(key.as_bytes());
        }

        tracing::trace!(table = %self.name, entries = keys.len(), "Writing delete batch");
        self.db.write(batch)?;
        Ok(())
    }

    /// Look up many keys at once
    ///
    /// Each key maps to its record or `None`. The result is keyed by the
    /// requested keys and does not preserve request order.
    pub fn get_many(&self, keys: &[Key]) -> Result<BTreeMap<Key, Option<Record>>> {
        let values = self.db.multi_get(keys.iter().map(|k| k.as_bytes()));

        keys.iter()
            .zip(values)
            .map(|(key, value)| -> Result<(Key, Option<Record>)> {
                let record = match value? {
                    Some(bytes) => Some(self.codec.decode(&bytes)?),
                    None => None,
                };
                Ok((key.clone(), record))
            })
            .collect()
    }

    /// Every key/record pair in engine key order
    ///
    /// The whole table is materialized in memory. Meant for small tables and
    /// diagnostics, not for streaming large keyspaces.
    pub fn scan_items(&self) -> Result<BTreeMap<Key, Record>> {
        let mut items = BTreeMap::new();
        for item in self.db.full_iterator(IteratorMode::Start) {
            let (key, value) = item?;
            items.insert(decode_key(&key)?, self.codec.decode(&value)?);
        }
        Ok(items)
    }

    /// Every key in engine key order
    pub fn scan_keys(&self) -> Result<Vec<Key>> {
        self.db
            .full_iterator(IteratorMode::Start)
            .map(|item| -> Result<Key> {
                let (key, _) = item?;
                decode_key(&key)
            })
            .collect()
    }

    /// Every record in engine key order
    pub fn scan_values(&self) -> Result<Vec<Record>> {
        self.db
            .full_iterator(IteratorMode::Start)
            .map(|item| -> Result<Record> {
                let (_, value) = item?;
                self.codec.decode(&value)
            })
            .collect()
    }

    /// Every key/record pair whose key starts with `prefix`
    ///
    /// Seeks in total order, so the result does not depend on the table's
    /// prefix extractor or on how `prefix` compares to its length.
    pub fn scan_prefix(&self, prefix: &str) -> Result<BTreeMap<Key, Record>> {
        let mut opts = ReadOptions::default();
        opts.set_total_order_seek(true);

        let mode = IteratorMode::From(prefix.as_bytes(), Direction::Forward);
        let mut items = BTreeMap::new();

        for item in self.db.iterator_opt(mode, opts) {
            let (key, value) = item?;
            if !key.starts_with(prefix.as_bytes()) {
                break;
            }
            items.insert(decode_key(&key)?, self.codec.decode(&value)?);
        }
        Ok(items)
    }

    /// Resolve the key, stamp it into `_id` and encode the record
    fn prepare(&self, key: Option<Key>, record: &mut Record) -> Result<(Key, Vec<u8>)> {
        let key = resolve_key(key, record);
        record.set_id(key.clone());
        let value = self.codec.encode(record)?;
        Ok((key, value))
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Directory holding this table's engine files
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn codec(&self) -> RecordCodec {
        self.codec
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("name", &self.name)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Table: {}>", self.name)
    }
}

fn resolve_key(key: Option<Key>, record: &Record) -> Key {
    key.filter(|k| !k.is_empty())
        .or_else(|| record.id().map(str::to_string))
        .unwrap_or_else(|| Ulid::new().to_string())
}

fn decode_key(bytes: &[u8]) -> Result<Key> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| StoreError::Serialization(format!("stored key is not UTF-8: {}", e)))
}
