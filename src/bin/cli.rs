//! tablekv CLI Client
//!
//! Command-line interface for interacting with a tablekv server.

use clap::{Parser, Subcommand};
use tablekv::network::Client;
use tablekv::{Record, Value};

/// tablekv CLI
#[derive(Parser, Debug)]
#[command(name = "tablekv-cli")]
#[command(about = "CLI for the tablekv key-value server")]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:7070")]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the server's tables
    Tables,

    /// Get a record by key
    Get {
        table: String,
        key: String,
    },

    /// Store a record built from FIELD=VALUE pairs
    Put {
        table: String,

        /// Explicit key (defaults to the record's _id, then a generated key)
        #[arg(short, long)]
        key: Option<String>,

        /// Fields as FIELD=VALUE; VALUE is parsed as null, bool, number or string
        #[arg(value_parser = parse_field)]
        fields: Vec<(String, Value)>,
    },

    /// Delete one or more keys
    Del {
        table: String,

        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// List all keys of a table
    Keys {
        table: String,
    },

    /// List all records of a table, optionally under a key prefix
    Items {
        table: String,

        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Ping the server
    Ping,
}

fn parse_field(s: &str) -> Result<(String, Value), String> {
    let (name, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected FIELD=VALUE, got {:?}", s))?;
    Ok((name.to_string(), parse_value(raw)))
}

fn parse_value(raw: &str) -> Value {
    match raw {
        "null" => Value::Null,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(v) = raw.parse::<i64>() {
                Value::Int(v)
            } else if let Ok(v) = raw.parse::<f64>() {
                Value::Float(v)
            } else {
                Value::String(raw.to_string())
            }
        }
    }
}

fn run(args: Args) -> tablekv::Result<()> {
    let client = Client::connect(&args.server)?;

    match args.command {
        Commands::Tables => {
            for name in client.list_tables()? {
                println!("{}", name);
            }
        }
        Commands::Get { table, key } => match client.get(&table, &key)? {
            Some(record) => println!("{}", record),
            None => println!("(absent)"),
        },
        Commands::Put { table, key, fields } => {
            let record: Record = fields.into_iter().collect();
            println!("{}", client.put(&table, key, record)?);
        }
        Commands::Del { table, keys } => {
            if keys.len() == 1 {
                client.delete(&table, &keys[0])?;
            } else {
                client.delete_many(&table, keys)?;
            }
            println!("OK");
        }
        Commands::Keys { table } => {
            for key in client.scan_keys(&table)? {
                println!("{}", key);
            }
        }
        Commands::Items { table, prefix } => {
            let items = match prefix {
                Some(prefix) => client.scan_prefix(&table, &prefix)?,
                None => client.scan_items(&table)?,
            };
            for (key, record) in items {
                println!("{}\t{}", key, record);
            }
        }
        Commands::Ping => {
            client.ping()?;
            println!("PONG");
        }
    }

    Ok(())
}

fn main() {
    let args = Args::parse();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
