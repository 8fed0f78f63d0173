//! ShelfKV CLI
//!
//! Command-line interface for inspecting and editing a ShelfKV data
//! directory. Keys and values use the key literal syntax:
//! `42`, `@1700000000000`, `"text"`, `0x00ff`, `[1,"a"]`.

use clap::{Parser, Subcommand};
use shelfkv::{Config, Direction, Engine, Key, KeyRange, Record, RecordStore, StoreType};
use tracing_subscriber::{fmt, EnvFilter};

/// ShelfKV CLI
#[derive(Parser, Debug)]
#[command(name = "shelfkv-cli")]
#[command(about = "CLI for the ShelfKV ordered record store")]
#[command(version)]
struct Args {
    /// Data directory
    #[arg(short, long, default_value = "./shelfkv_data")]
    data_dir: String,

    /// Key prefix of the store to operate on
    #[arg(short, long, default_value = "default")]
    store: String,

    /// Treat the store as an index (duplicate keys) rather than an object store
    #[arg(short, long)]
    index: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a record
    Add {
        /// The record key
        key: Key,

        /// The record value
        value: Key,
    },

    /// Get the first record with a key
    Get {
        /// The key to look up
        key: Key,
    },

    /// Delete every record with a key
    Delete {
        /// The key to delete
        key: Key,
    },

    /// Delete every record with a value
    DeleteByValue {
        /// The value to delete
        value: Key,
    },

    /// Delete every record in the store
    Clear,

    /// List records in key order
    Scan {
        /// Lower bound
        #[arg(long)]
        lower: Option<Key>,

        /// Upper bound
        #[arg(long)]
        upper: Option<Key>,

        /// Exclude the lower bound itself
        #[arg(long)]
        lower_open: bool,

        /// Exclude the upper bound itself
        #[arg(long)]
        upper_open: bool,

        /// Walk in descending order
        #[arg(short, long)]
        reverse: bool,
    },

    /// Rewrite the log down to its live records
    Compact,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shelfkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> shelfkv::Result<()> {
    let config = Config::builder().data_dir(&args.data_dir).build();
    let engine = Engine::open(config)?;

    let store_type = if args.index {
        StoreType::Index
    } else {
        StoreType::Object
    };
    let mut store = engine.open_store(&args.store, store_type)?;

    match args.command {
        Commands::Add { key, value } => {
            store.add(Record { key, value })?;
        }
        Commands::Get { key } => match store.get(key) {
            Some(record) => println!("{}", record),
            None => println!("(not found)"),
        },
        Commands::Delete { key } => print_removed(&store.delete(key)?),
        Commands::DeleteByValue { value } => print_removed(&store.delete_by_value(value)?),
        Commands::Clear => print_removed(&store.clear()?),
        Commands::Scan {
            lower,
            upper,
            lower_open,
            upper_open,
            reverse,
        } => {
            let range = match (lower, upper) {
                (Some(lower), Some(upper)) => Some(KeyRange::bound(lower, upper, lower_open, upper_open)?),
                (Some(lower), None) => Some(KeyRange::lower_bound(lower, lower_open)),
                (None, Some(upper)) => Some(KeyRange::upper_bound(upper, upper_open)),
                (None, None) => None,
            };
            let direction = if reverse { Direction::Prev } else { Direction::Next };
            scan(&store, range.as_ref(), direction);
        }
        Commands::Compact => engine.compact()?,
    }

    engine.close()
}

fn scan(store: &RecordStore, range: Option<&KeyRange>, direction: Direction) {
    let mut count = 0;
    for record in store.values(range, direction) {
        println!("{}", record);
        count += 1;
    }
    println!("({} records)", count);
}

fn print_removed(removed: &[Record]) {
    for record in removed {
        println!("removed {}", record);
    }
    println!("({} removed)", removed.len());
}
