//! Command-line surface.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config;

/// Manage a hosted medication record base from the terminal.
#[derive(Debug, Parser)]
#[command(name = config::APP_NAME, version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import a drug document (JSON) with all its related records.
    Import {
        /// Path to the drug document.
        file: PathBuf,
    },

    /// Add a single medication record.
    #[command(name = "add_drug")]
    AddDrug(AddDrugArgs),

    /// Search medications by name.
    Search {
        /// Name fragment to search for.
        query: String,
        /// Maximum number of results.
        #[arg(long, default_value_t = config::DEFAULT_SEARCH_LIMIT)]
        limit: u32,
    },

    /// Show one medication's details by exact name.
    Get {
        /// Medication name, matched case-insensitively.
        name: String,
    },

    /// Export a medication as a drug document (JSON).
    Export {
        /// Medication name, matched case-insensitively.
        name: String,
        /// Output file; defaults to `<slug>.json` in the working directory.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Run the HTTP resource API.
    Api(ApiArgs),
}

#[derive(Debug, Args)]
pub struct AddDrugArgs {
    /// Medication name.
    pub name: String,

    /// Generic name.
    #[arg(long)]
    pub generic: Option<String>,

    /// Drug class.
    #[arg(long)]
    pub drug_class: Option<String>,

    /// Consumer description.
    #[arg(long)]
    pub description: Option<String>,

    /// Mark as over-the-counter instead of prescription-only.
    #[arg(long)]
    pub otc: bool,
}

#[derive(Debug, Args)]
pub struct ApiArgs {
    /// Address to bind.
    #[arg(long, default_value = config::DEFAULT_API_HOST)]
    pub host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = config::DEFAULT_API_PORT)]
    pub port: u16,

    /// Verbose request logging.
    #[arg(long)]
    pub debug: bool,
}
