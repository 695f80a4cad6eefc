//! TCP Server
//!
//! Accepts connections and dispatches them to worker threads.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TrySendError};

use crate::api::StorageApi;
use crate::config::Config;
use crate::error::Result;
use super::Connection;

/// How long the acceptor sleeps when no connection is pending
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Cloneable handle that asks a running server to stop
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    flag: Arc<AtomicBool>,
}

impl ShutdownHandle {
    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_shutdown(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

/// TCP server for tablekv
pub struct Server {
    config: Config,
    api: Arc<StorageApi>,
    listener: TcpListener,
    shutdown: ShutdownHandle,
}

impl Server {
    /// Bind the listen address from `config`
    ///
    /// Binding happens here rather than in `run`, so a `:0` address can be
    /// inspected through `local_addr` before serving.
    pub fn bind(config: Config, api: Arc<StorageApi>) -> Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr)?;
        listener.set_nonblocking(true)?;

        Ok(Self {
            config,
            api,
            listener,
            shutdown: ShutdownHandle {
                flag: Arc::new(AtomicBool::new(false)),
            },
        })
    }

    /// Address the listener is bound to
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// A handle for stopping the server from another thread
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Signal the server to shutdown gracefully
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Start the server (blocking)
    ///
    /// - One acceptor loop (this thread) polling the listener
    /// - `worker_threads` workers, each serving one connection at a time
    /// - At most `max_connections` accepted connections waiting for a worker;
    ///   beyond that new connections are dropped
    ///
    /// Returns once shutdown is requested and every worker has finished its
    /// current connection.
    pub fn run(&self) -> Result<()> {
        let queue_len = self.config.max_connections.max(1);
        let (sender, receiver) = channel::bounded::<TcpStream>(queue_len);

        let workers: Vec<JoinHandle<()>> = (0..self.config.worker_threads.max(1))
            .map(|id| self.spawn_worker(id, receiver.clone()))
            .collect::<io::Result<_>>()?;
        drop(receiver);

        let addr = self.local_addr()?;
        tracing::info!(
            addr = %addr,
            workers = workers.len(),
            "Server listening"
        );

        while !self.shutdown.is_shutdown() {
            match self.listener.accept() {
                Ok((stream, peer)) => match sender.try_send(stream) {
                    Ok(()) => tracing::trace!("Queued connection from {}", peer),
                    Err(TrySendError::Full(_)) => {
                        tracing::warn!("Connection queue full, dropping {}", peer);
                    }
                    Err(TrySendError::Disconnected(_)) => break,
                },
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => {
                    thread::sleep(ACCEPT_POLL_INTERVAL);
                }
                Err(e) => tracing::warn!("Accept failed: {}", e),
            }
        }

        tracing::info!("Shutting down, waiting for {} workers", workers.len());
        drop(sender);
        for worker in workers {
            if worker.join().is_err() {
                tracing::error!("Worker thread panicked");
            }
        }

        Ok(())
    }

    fn spawn_worker(&self, id: usize, queue: Receiver<TcpStream>) -> io::Result<JoinHandle<()>> {
        let api = Arc::clone(&self.api);
        let read_ms = self.config.read_timeout_ms;
        let write_ms = self.config.write_timeout_ms;

        thread::Builder::new()
            .name(format!("tablekv-worker-{}", id))
            .spawn(move || {
                for stream in queue.iter() {
                    serve(stream, Arc::clone(&api), read_ms, write_ms);
                }
            })
    }
}

/// Serve one connection until it closes
fn serve(stream: TcpStream, api: Arc<StorageApi>, read_ms: u64, write_ms: u64) {
    let mut connection = match Connection::new(stream, api) {
        Ok(connection) => connection,
        Err(e) => {
            tracing::warn!("Failed to set up connection: {}", e);
            return;
        }
    };

    if let Err(e) = connection.set_timeouts(read_ms, write_ms) {
        tracing::warn!("Failed to set timeouts for {}: {}", connection.peer_addr(), e);
        return;
    }

    if let Err(e) = connection.handle() {
        tracing::debug!("Connection {} closed with error: {}", connection.peer_addr(), e);
    }
}
