//! tablekv Server Binary
//!
//! Creates the data directory, opens the configured tables and starts the
//! TCP server.

use std::fs;
use std::sync::Arc;

use clap::Parser;
use tablekv::network::Server;
use tablekv::{Config, StorageApi, TableDef};
use tracing_subscriber::{fmt, EnvFilter};

/// tablekv Server
#[derive(Parser, Debug)]
#[command(name = "tablekv-server")]
#[command(about = "Table-oriented key-value server backed by RocksDB")]
#[command(version)]
struct Args {
    /// Directory path where data is stored
    #[arg(short, long, default_value = "./tablekv_data")]
    data_dir: String,

    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    listen: String,

    /// Table to serve, as NAME or NAME:PREFIX_LEN (repeatable)
    #[arg(short, long = "table", value_name = "NAME[:PREFIX_LEN]")]
    tables: Vec<TableDef>,

    /// Number of connection worker threads
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Maximum queued connections waiting for a worker
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Largest accepted record in KB
    #[arg(long, default_value = "16384")]
    max_record_kb: u64,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tablekv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("tablekv Server v{}", tablekv::VERSION);
    tracing::info!("Data directory: {}", args.data_dir);
    tracing::info!("Listen address: {}", args.listen);

    if args.tables.is_empty() {
        tracing::warn!("No tables defined; every table request will fail");
    }

    let config = Config::builder()
        .data_dir(&args.data_dir)
        .tables(args.tables)
        .listen_addr(&args.listen)
        .worker_threads(args.workers)
        .max_connections(args.max_connections)
        .max_record_size(args.max_record_kb * 1024)
        .build();

    // The root directory is ours to create; table directories are created
    // by the tables themselves
    if let Err(e) = fs::create_dir_all(&config.data_dir) {
        tracing::error!("Failed to create data directory: {}", e);
        std::process::exit(1);
    }

    let api = match StorageApi::open(&config) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            tracing::error!("Failed to open tables: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Tables ready: {:?}", api.list_tables());

    let server = match Server::bind(config, api) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to bind: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
