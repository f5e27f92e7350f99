//! remotelist: CLI tool for querying a cached remote list.

use clap::{Args, Parser, Subcommand};
use remotelist::{ListConfig, RefreshOutcome, RemoteList};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "remotelist")]
#[command(version)]
#[command(about = "Query a locally cached copy of a remote line-delimited list", long_about = None)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct SourceArgs {
    /// YAML or JSON config file (overrides --local/--url/--max-age)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Local cache file
    #[arg(short, long, global = true)]
    local: Option<PathBuf>,

    /// Remote URL of the list
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Maximum cache age in seconds
    #[arg(short, long, global = true, default_value_t = 86400)]
    max_age: u64,

    /// Request timeout in seconds
    #[arg(short, long, global = true)]
    timeout: Option<u64>,

    /// Gunzip gzip-compressed downloads
    #[arg(long, global = true)]
    gzip: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print every record
    List,

    /// Print the number of records
    Count,

    /// Check whether a record matches exactly (case-insensitive)
    Has { term: String },

    /// Check whether any record starts with the term
    Prefix { term: String },

    /// Check whether any record ends with the term
    Suffix { term: String },

    /// Print every record containing the term
    Search { term: String },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let list = match open_list(&cli.source) {
        Ok(list) => list,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    if let RefreshOutcome::Downloaded { bytes } = list.refresh_outcome() {
        log::info!("Refreshed {:?} from {} ({} bytes)", list.local_path(), list.url(), bytes);
    }

    match cli.command {
        Commands::List => {
            for record in list.list() {
                println!("{}", record);
            }
        }
        Commands::Count => println!("{}", list.len()),
        Commands::Has { term } => println!("{}", list.has(&term)),
        Commands::Prefix { term } => println!("{}", list.has_prefix(&term)),
        Commands::Suffix { term } => println!("{}", list.has_suffix(&term)),
        Commands::Search { term } => {
            for record in list.search(&term) {
                println!("{}", record);
            }
        }
    }
}

fn open_list(args: &SourceArgs) -> Result<RemoteList, Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => ListConfig::load(path)?,
        None => {
            let local = args.local.clone().ok_or("--local is required without --config")?;
            let url = args.url.clone().ok_or("--url is required without --config")?;
            let mut config = ListConfig::new(local, url, Duration::from_secs(args.max_age));
            config.timeout = args.timeout.map(Duration::from_secs);
            config.decompress_gzip = args.gzip;
            config
        }
    };

    Ok(RemoteList::from_config(&config)?)
}
