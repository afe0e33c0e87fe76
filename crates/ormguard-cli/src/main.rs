//! ORMGuard Command-Line Inspector
//!
//! Evaluates entity, attribute, row-level and operation permissions of a
//! configured user.

mod commands;
mod error;
mod formatter;

use clap::{Parser, Subcommand};
use commands::Session;
use error::{CliError, CliResult};
use formatter::{OutputFormat, Report};
use ormguard_core::SecurityConfig;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ORMGuard Command-Line Inspector
#[derive(Parser, Debug)]
#[command(name = "ormguard")]
#[command(version, about = "Inspect ORM access permissions")]
pub struct Args {
    /// Security configuration file (JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Sled role store directory
    #[arg(short, long)]
    pub store: Option<PathBuf>,

    /// User to evaluate permissions for
    #[arg(short, long)]
    pub user: Option<String>,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show create/read/update/delete permissions of an entity
    Entity { entity: String },

    /// Show view/modify permissions of an attribute path
    Attribute { entity: String, path: String },

    /// Check a named operation
    Specific { resource: String },

    /// Show the row-level conditions added to a read query
    Query {
        entity: String,
        /// Entity alias used in the query
        #[arg(long, default_value = "e")]
        alias: String,
    },

    /// Show attributes excluded from export and import
    Export { entity: String },

    /// Show the effective roles of the user
    Roles,

    /// Write the configured roles into the role store
    Import,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("ormguard_cli=info")),
        )
        .init();

    let args = Args::parse();
    let format = args.format;

    match run(args) {
        Ok(report) => println!("{}", formatter::render(&report, format)),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn run(args: Args) -> CliResult<Report> {
    let config = SecurityConfig::from_file(&args.config)?;
    let db = args.store.as_ref().map(sled::open).transpose()?;

    let session = || -> CliResult<Session> {
        let user = commands::require_user(args.user.as_deref())?;
        Session::open(&config, db.as_ref(), user)
    };

    match &args.command {
        Command::Entity { entity } => session()?.entity(entity),
        Command::Attribute { entity, path } => session()?.attribute(entity, path),
        Command::Specific { resource } => session()?.specific(resource),
        Command::Query { entity, alias } => session()?.query(entity, alias),
        Command::Export { entity } => session()?.export(entity),
        Command::Roles => Ok(session()?.roles()),
        Command::Import => {
            let db = db.as_ref().ok_or_else(|| {
                CliError::Usage("--store is required for import".to_string())
            })?;
            commands::import(&config, db)
        }
    }
}
