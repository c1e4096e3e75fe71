//! `port-alias` command line tool.
//!
//! Prints port alias maps and index assignments as JSON on stdout. Logs go
//! to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use sonic_mgmt_common::{config::DEFAULT_CONFIG_PATH, MgmtConfig};
use sonic_port_alias::{
    index_ports_for, registered_skus, ConfigDbJsonSource, PortAliasResolver, RedisPortTableSource,
};

/// SONiC port alias resolver
#[derive(Parser, Debug)]
#[command(name = "port-alias")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve alias, ASIC-name and index maps for a hardware SKU
    Resolve {
        /// Hardware SKU identifier
        #[arg(long)]
        hwsku: String,

        /// ASIC namespace (e.g. asic0)
        #[arg(long)]
        asic: Option<String>,

        /// Where to read the PORT table from
        #[arg(long, value_enum, default_value = "json")]
        source: SourceKind,

        /// Directory holding config_db*.json (overrides the configuration)
        #[arg(long)]
        config_db_dir: Option<PathBuf>,
    },

    /// Assign global physical indices to sorted port names
    Index {
        /// Numeric ASIC identifier (e.g. 1)
        #[arg(long)]
        asic: Option<String>,

        /// Port names, already sorted
        #[arg(required = true)]
        ports: Vec<String>,
    },

    /// List SKUs of the built-in catalog
    ListSkus,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SourceKind {
    /// Built-in SKU catalog only
    Catalog,
    /// config_db.json files
    Json,
    /// CONFIG_DB over Redis
    Redis,
}

fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("Failed to encode output")?;
    println!("{}", text);
    Ok(())
}

fn run(args: Args) -> Result<()> {
    let config = MgmtConfig::load_or_default(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    config.validate()?;
    debug!(config = ?config, "Loaded configuration");

    match args.command {
        Command::Resolve {
            hwsku,
            asic,
            source,
            config_db_dir,
        } => {
            let resolver = PortAliasResolver::new();
            let resolver = match source {
                SourceKind::Catalog => resolver,
                SourceKind::Json => {
                    let dir = config_db_dir.unwrap_or_else(|| config.database.config_db_dir.clone());
                    resolver.with_source(ConfigDbJsonSource::new(dir))
                }
                SourceKind::Redis => {
                    resolver.with_source(RedisPortTableSource::new(config.database.clone()))
                }
            };
            let maps = resolver
                .resolve(&hwsku, asic.as_deref())
                .with_context(|| format!("Failed to resolve port aliases for {}", hwsku))?;
            print_json(&maps)
        }
        Command::Index { asic, ports } => {
            let assignment = index_ports_for(asic.as_deref(), &ports)?;
            print_json(&assignment)
        }
        Command::ListSkus => print_json(&registered_skus()),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
