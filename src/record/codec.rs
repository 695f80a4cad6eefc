//! Record codec
//!
//! Converts records to and from the bytes stored as engine values.
//!
//! ## Value Format
//! bincode (varint integers, little endian) over the serde form of
//! [`Record`]. Decoding rejects trailing bytes, so a stored value either
//! decodes to exactly one record or fails.

use bincode::Options;

use crate::error::{Result, StoreError};
use super::Record;

/// Stateless record encoder/decoder with a per-record size limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordCodec {
    max_record_size: u64,
}

impl RecordCodec {
    /// Default upper bound on an encoded record (16 MB)
    pub const DEFAULT_MAX_RECORD_SIZE: u64 = 16 * 1024 * 1024;

    /// Create a codec rejecting records larger than `max_record_size` bytes
    pub fn new(max_record_size: u64) -> Self {
        Self { max_record_size }
    }

    pub fn max_record_size(&self) -> u64 {
        self.max_record_size
    }

    fn options(&self) -> impl Options {
        bincode::DefaultOptions::new().with_limit(self.max_record_size)
    }

    /// Encode a record to bytes
    ///
    /// Fails with `Serialization` if the encoding exceeds the size limit.
    pub fn encode(&self, record: &Record) -> Result<Vec<u8>> {
        self.options()
            .serialize(record)
            .map_err(|e| StoreError::Serialization(format!("encode record: {}", e)))
    }

    /// Decode a record from bytes
    pub fn decode(&self, bytes: &[u8]) -> Result<Record> {
        self.options()
            .deserialize(bytes)
            .map_err(|e| StoreError::Serialization(format!("decode record: {}", e)))
    }
}

impl Default for RecordCodec {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_RECORD_SIZE)
    }
}

/// Encode with the default codec
pub fn encode(record: &Record) -> Result<Vec<u8>> {
    RecordCodec::default().encode(record)
}

/// Decode with the default codec
pub fn decode(bytes: &[u8]) -> Result<Record> {
    RecordCodec::default().decode(bytes)
}
