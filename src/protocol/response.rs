//! Response definitions
//!
//! Represents responses to clients.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};
use crate::record::Record;
use crate::storage::Key;

/// Successful result of a request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Reply {
    /// Key resolved by a put
    Key(Key),

    /// Keys resolved by a put_many, or listed by scan_keys
    Keys(Vec<Key>),

    /// Result of a get
    Record(Option<Record>),

    /// Result of a get_many
    Records(BTreeMap<Key, Option<Record>>),

    /// Result of scan_items / scan_prefix
    Items(BTreeMap<Key, Record>),

    /// Result of scan_values
    Values(Vec<Record>),

    /// Result of list_tables
    Tables(Vec<String>),

    /// Write completed with nothing to return
    Done,

    Pong,
}

/// Failure reported back to the client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Failure {
    UnknownTable(String),
    Serialization(String),
    StorageEngine(String),
    Protocol(String),
    Internal(String),
}

/// A response to send to client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    Ok(Reply),
    Err(Failure),
}

impl Response {
    /// Build a response from the outcome of executing a request
    pub fn from_result(result: Result<Reply>) -> Self {
        match result {
            Ok(reply) => Response::Ok(reply),
            Err(e) => Response::Err(Failure::from(e)),
        }
    }

    /// Turn a received response back into a crate result
    pub fn into_result(self) -> Result<Reply> {
        match self {
            Response::Ok(reply) => Ok(reply),
            Response::Err(failure) => Err(failure.into()),
        }
    }
}

impl From<StoreError> for Failure {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UnknownTable(name) => Failure::UnknownTable(name),
            StoreError::Serialization(msg) => Failure::Serialization(msg),
            StoreError::StorageEngine(e) => Failure::StorageEngine(e.into_string()),
            StoreError::Protocol(msg) => Failure::Protocol(msg),
            other => Failure::Internal(other.to_string()),
        }
    }
}

impl From<Failure> for StoreError {
    fn from(failure: Failure) -> Self {
        match failure {
            Failure::UnknownTable(name) => StoreError::UnknownTable(name),
            Failure::Serialization(msg) => StoreError::Serialization(msg),
            Failure::Protocol(msg) => StoreError::Protocol(msg),
            Failure::StorageEngine(msg) | Failure::Internal(msg) => StoreError::Remote(msg),
        }
    }
}
