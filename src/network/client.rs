//! Blocking client
//!
//! One TCP connection to a tablekv server, mirroring the `StorageApi`
//! operations. The connection is guarded by a mutex so a `Client` can be
//! shared between threads; calls on one client are serialized.
//!
//! A call that fails on the socket (a timeout or a bad frame)
//! leaves the stream out of step with the server, so the connection is shut
//! down and every later call fails with `Protocol`. Connect again to recover.

use std::collections::BTreeMap;
use std::io::{BufReader, BufWriter};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::{Result, StoreError};
use crate::protocol::{read_response, write_request, Reply, Request, Response};
use crate::record::Record;
use crate::storage::Key;

struct Stream {
    reader: BufReader<TcpStream>,
    writer: BufWriter<TcpStream>,
    broken: bool,
}

impl Stream {
    fn exchange(&mut self, request: &Request) -> Result<Response> {
        write_request(&mut self.writer, request)?;
        read_response(&mut self.reader)
    }
}

/// Client for a tablekv server
pub struct Client {
    peer_addr: String,
    stream: Mutex<Stream>,
}

impl Client {
    /// Connect to a server
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr)?;
        stream.set_nodelay(true)?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        let read_stream = stream.try_clone()?;

        Ok(Self {
            peer_addr,
            stream: Mutex::new(Stream {
                reader: BufReader::new(read_stream),
                writer: BufWriter::new(stream),
                broken: false,
            }),
        })
    }

    /// Bound how long a single call may wait on the socket
    pub fn set_timeout(&self, timeout: Option<Duration>) -> Result<()> {
        let stream = self.stream.lock();
        stream.reader.get_ref().set_read_timeout(timeout)?;
        stream.writer.get_ref().set_write_timeout(timeout)?;
        Ok(())
    }

    /// Send one request and wait for its reply
    ///
    /// Failures reported by the server come back as the matching
    /// `StoreError` variant (engine failures as `Remote`).
    pub fn call(&self, request: Request) -> Result<Reply> {
        let mut stream = self.stream.lock();
        if stream.broken {
            return Err(StoreError::Protocol(format!(
                "Connection to {} was closed after a failed call",
                self.peer_addr
            )));
        }

        match stream.exchange(&request) {
            Ok(response) => response.into_result(),
            Err(e) => {
                tracing::warn!(
                    "Call {} to {} failed, closing connection: {}",
                    request.name(),
                    self.peer_addr,
                    e
                );
                stream.broken = true;
                let _ = stream.writer.get_ref().shutdown(Shutdown::Both);
                Err(e)
            }
        }
    }

    /// Whether an earlier call failed and closed the connection
    pub fn is_broken(&self) -> bool {
        self.stream.lock().broken
    }

    pub fn ping(&self) -> Result<()> {
        match self.call(Request::Ping)? {
            Reply::Pong => Ok(()),
            other => Err(unexpected("ping", &other)),
        }
    }

    pub fn list_tables(&self) -> Result<Vec<String>> {
        match self.call(Request::ListTables)? {
            Reply::Tables(names) => Ok(names),
            other => Err(unexpected("list_tables", &other)),
        }
    }

    pub fn put(&self, table: &str, key: Option<Key>, record: Record) -> Result<Key> {
        let request = Request::Put {
            table: table.to_string(),
            key,
            record,
        };
        match self.call(request)? {
            Reply::Key(key) => Ok(key),
            other => Err(unexpected("put", &other)),
        }
    }

    pub fn get(&self, table: &str, key: &str) -> Result<Option<Record>> {
        let request = Request::Get {
            table: table.to_string(),
            key: key.to_string(),
        };
        match self.call(request)? {
            Reply::Record(record) => Ok(record),
            other => Err(unexpected("get", &other)),
        }
    }

    pub fn put_many(&self, table: &str, entries: Vec<(Option<Key>, Record)>) -> Result<Vec<Key>> {
        let request = Request::PutMany {
            table: table.to_string(),
            entries,
        };
        match self.call(request)? {
            Reply::Keys(keys) => Ok(keys),
            other => Err(unexpected("put_many", &other)),
        }
    }

    pub fn get_many(&self, table: &str, keys: Vec<Key>) -> Result<BTreeMap<Key, Option<Record>>> {
        let request = Request::GetMany {
            table: table.to_string(),
            keys,
        };
        match self.call(request)? {
            Reply::Records(records) => Ok(records),
            other => Err(unexpected("get_many", &other)),
        }
    }

    pub fn delete(&self, table: &str, key: &str) -> Result<()> {
        let request = Request::Delete {
            table: table.to_string(),
            key: key.to_string(),
        };
        match self.call(request)? {
            Reply::Done => Ok(()),
            other => Err(unexpected("delete", &other)),
        }
    }

    pub fn delete_many(&self, table: &str, keys: Vec<Key>) -> Result<()> {
        let request = Request::DeleteMany {
            table: table.to_string(),
            keys,
        };
        match self.call(request)? {
            Reply::Done => Ok(()),
            other => Err(unexpected("delete_many", &other)),
        }
    }

    pub fn scan_items(&self, table: &str) -> Result<BTreeMap<Key, Record>> {
        match self.call(Request::ScanItems {
            table: table.to_string(),
        })? {
            Reply::Items(items) => Ok(items),
            other => Err(unexpected("scan_items", &other)),
        }
    }

    pub fn scan_keys(&self, table: &str) -> Result<Vec<Key>> {
        match self.call(Request::ScanKeys {
            table: table.to_string(),
        })? {
            Reply::Keys(keys) => Ok(keys),
            other => Err(unexpected("scan_keys", &other)),
        }
    }

    pub fn scan_values(&self, table: &str) -> Result<Vec<Record>> {
        match self.call(Request::ScanValues {
            table: table.to_string(),
        })? {
            Reply::Values(values) => Ok(values),
            other => Err(unexpected("scan_values", &other)),
        }
    }

    pub fn scan_prefix(&self, table: &str, prefix: &str) -> Result<BTreeMap<Key, Record>> {
        let request = Request::ScanPrefix {
            table: table.to_string(),
            prefix: prefix.to_string(),
        };
        match self.call(request)? {
            Reply::Items(items) => Ok(items),
            other => Err(unexpected("scan_prefix", &other)),
        }
    }

    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }
}

fn unexpected(op: &str, reply: &Reply) -> StoreError {
    StoreError::Protocol(format!("unexpected reply to {}: {:?}", op, reply))
}
