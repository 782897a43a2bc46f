//! nrstore CLI Client
//!
//! Command-line interface for reading and writing state through the
//! storage adapter.

use clap::{Parser, Subcommand, ValueEnum};
use nrstore::{
    Config, DocumentStore, LibraryReply, ReconnectStrategy, RedisStore, RemoteStore, Storage,
};
use serde_json::Value;
use tracing_subscriber::{fmt, EnvFilter};

/// nrstore CLI
#[derive(Parser, Debug)]
#[command(name = "nrstore-cli")]
#[command(about = "CLI for nrstore documents and library entries")]
#[command(version)]
struct Args {
    /// Store server address
    #[arg(short, long, default_value = "127.0.0.1:6380")]
    server: String,

    /// Use a Redis server at this URL instead of a store server
    #[arg(long, value_name = "URL")]
    redis: Option<String>,

    /// Connection attempts to retry before giving up
    #[arg(long, default_value = "10")]
    retries: u32,

    /// Log every adapter call
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a document as JSON
    Get {
        /// Which document
        document: Document,
    },

    /// Replace a document with the given JSON
    Set {
        /// Which document
        document: Document,

        /// The new JSON value
        json: String,
    },

    /// List a library directory
    Ls {
        /// Library type (e.g. flows, functions)
        entry_type: String,

        /// Directory path, relative to the library root
        #[arg(default_value = "")]
        path: String,

        /// Collapse repeated directory markers
        #[arg(long)]
        dedup: bool,
    },

    /// Print the body of a library entry
    Cat {
        /// Library type
        entry_type: String,

        /// Entry path
        path: String,
    },

    /// Save a library entry
    Put {
        /// Library type
        entry_type: String,

        /// Entry path
        path: String,

        /// Entry body
        body: String,

        /// Entry metadata as JSON
        #[arg(long, default_value = "{}")]
        meta: String,
    },

    /// Ping the server
    Ping,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Document {
    Flows,
    Credentials,
    Settings,
    Sessions,
}

fn main() {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(true).init();

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> nrstore::Result<()> {
    // The library default retries forever; a one-shot command should not hang
    let reconnect = ReconnectStrategy::Linear {
        step_ms: 50,
        max_delay_ms: 500,
        max_retries: Some(args.retries),
    };
    let mut builder = Config::builder()
        .store_addr(&args.server)
        .reconnect(reconnect)
        .debug(args.debug);

    match args.redis {
        Some(url) => {
            builder = builder.redis_url(url);
            let storage = Storage::init_redis(builder.build())?;
            execute(storage, args.command, RedisStore::ping)
        }
        None => {
            let storage = Storage::init(builder.build())?;
            execute(storage, args.command, RemoteStore::ping)
        }
    }
}

fn execute<S: DocumentStore>(
    storage: Storage<S>,
    command: Commands,
    ping: fn(&S) -> nrstore::Result<()>,
) -> nrstore::Result<()> {
    match command {
        Commands::Get { document } => {
            let value = match document {
                Document::Flows => storage.get_flows(),
                Document::Credentials => storage.get_credentials(),
                Document::Settings => storage.get_settings(),
                Document::Sessions => storage.get_sessions(),
            };
            print_json(&value)?;
        }
        Commands::Set { document, json } => {
            let value: Value = serde_json::from_str(&json)?;
            match document {
                Document::Flows => storage.save_flows(&value)?,
                Document::Credentials => storage.save_credentials(&value)?,
                Document::Settings => storage.save_settings(&value)?,
                Document::Sessions => storage.save_sessions(&value)?,
            }
            println!("OK");
        }
        Commands::Ls {
            entry_type,
            path,
            dedup,
        } => {
            let path = format!("/{}", path.trim_start_matches('/'));
            if let LibraryReply::Listing(listing) = storage.get_library_entry(&entry_type, &path)? {
                let listing = if dedup { listing.deduplicated() } else { listing };
                print_json(&listing)?;
            }
        }
        Commands::Cat { entry_type, path } => {
            match storage.fetch_library_body(&entry_type, path.trim_start_matches('/'))? {
                Some(body) => println!("{}", body),
                None => println!("(nil)"),
            }
        }
        Commands::Put {
            entry_type,
            path,
            body,
            meta,
        } => {
            let meta: Value = serde_json::from_str(&meta)?;
            storage.save_library_entry(&entry_type, path.trim_start_matches('/'), meta, body)?;
            println!("OK");
        }
        Commands::Ping => {
            ping(storage.store())?;
            println!("PONG");
        }
    }

    storage.close()
}

fn print_json<T: serde::Serialize>(value: &T) -> nrstore::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
