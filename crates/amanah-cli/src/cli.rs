//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Amanah - organization records manager
#[derive(Parser)]
#[command(name = "amanah")]
#[command(about = "Contribution ledger and membership roll manager", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "amanah.db", global = true)]
    pub db: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set AMANAH_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and seed the organization
    Init {
        /// Organization name
        #[arg(long)]
        org: String,

        /// Email of the first admin account
        #[arg(long)]
        admin_email: String,

        /// Display name of the first admin account
        #[arg(long, default_value = "Administrator")]
        admin_name: String,
    },

    /// Import records from a multi-sheet workbook
    Import {
        /// Workbook file (.xlsx) to import
        #[arg(short, long)]
        file: PathBuf,

        /// Record kind: financial or membership
        #[arg(short, long)]
        kind: String,

        /// Comma-separated sheet names to process (default: all sheets)
        #[arg(short, long)]
        sheets: Option<String>,

        /// Email of the importing admin (resolves the organization scope)
        #[arg(short, long)]
        admin: String,
    },

    /// Export records to a spreadsheet
    Export {
        /// Record kind: financial or membership
        #[arg(short, long)]
        kind: String,

        /// Output file (.xlsx or .csv, decided by extension)
        #[arg(short, long)]
        out: PathBuf,

        /// Month abbreviation filter, e.g. JAN
        #[arg(long)]
        month: Option<String>,

        /// Year filter, e.g. 2024
        #[arg(long)]
        year: Option<i32>,

        /// Majlis filter (membership exports only)
        #[arg(long)]
        majlis: Option<String>,

        /// Email of the exporting admin (resolves the organization scope)
        #[arg(short, long)]
        admin: String,
    },

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a
        /// network. By default, the server requires identity headers from
        /// the fronting auth proxy.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Show dashboard summary
    Dashboard {
        /// Email of the admin (resolves the organization scope)
        #[arg(short, long)]
        admin: String,
    },

    /// Show database status (encryption, size, etc.)
    Status,

    /// List admin accounts per organization
    Admins,
}
