//! Table Registry
//!
//! Fixed mapping from table name to open `Table`, built once at startup.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{Result, StoreError};
use crate::record::RecordCodec;
use super::{Table, TableDef};

/// Immutable name → table map
///
/// There is no way to add or drop tables after `open`, so lookups need no
/// locking and every handle lives as long as the registry.
#[derive(Debug)]
pub struct TableRegistry {
    data_dir: PathBuf,
    tables: BTreeMap<String, Table>,
}

impl TableRegistry {
    /// Open every defined table under `data_dir`
    ///
    /// The root directory must already exist. Definitions are validated up
    /// front: an invalid or duplicated name fails before any table is opened.
    pub fn open(data_dir: &Path, defs: &[TableDef], codec: RecordCodec) -> Result<Self> {
        for (i, def) in defs.iter().enumerate() {
            def.validate()?;
            if defs[..i].iter().any(|other| other.name == def.name) {
                return Err(StoreError::Config(format!(
                    "table {:?} is defined more than once",
                    def.name
                )));
            }
        }

        let mut tables = BTreeMap::new();
        for def in defs {
            let table = Table::open(data_dir, def, codec)?;
            tables.insert(def.name.clone(), table);
        }

        tracing::info!(
            data_dir = %data_dir.display(),
            tables = tables.len(),
            "Table registry ready"
        );

        Ok(Self {
            data_dir: data_dir.to_path_buf(),
            tables,
        })
    }

    /// Look up a table by name
    ///
    /// Fails with `UnknownTable` without touching any engine handle.
    pub fn resolve(&self, name: &str) -> Result<&Table> {
        self.tables
            .get(name)
            .ok_or_else(|| StoreError::UnknownTable(name.to_string()))
    }

    /// Registered table names, sorted
    pub fn names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
