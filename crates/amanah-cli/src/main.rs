//! Amanah CLI - organization records manager
//!
//! Usage:
//!   amanah init --org "Ilorin Jamaat" --admin-email sec@example.org
//!   amanah import --file ledger.xlsx --kind financial --admin sec@example.org
//!   amanah export --kind membership --out roll.xlsx --admin sec@example.org
//!   amanah serve --port 3000

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    match cli.command {
        Commands::Init {
            org,
            admin_email,
            admin_name,
        } => commands::cmd_init(&cli.db, &org, &admin_email, &admin_name, cli.no_encrypt),
        Commands::Import {
            file,
            kind,
            sheets,
            admin,
        } => commands::cmd_import(
            &cli.db,
            &file,
            &kind,
            sheets.as_deref(),
            &admin,
            cli.no_encrypt,
        ),
        Commands::Export {
            kind,
            out,
            month,
            year,
            majlis,
            admin,
        } => commands::cmd_export(
            &cli.db,
            &kind,
            &out,
            month.as_deref(),
            year,
            majlis.as_deref(),
            &admin,
            cli.no_encrypt,
        ),
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
            )
            .await
        }
        Commands::Dashboard { admin } => commands::cmd_dashboard(&cli.db, &admin, cli.no_encrypt),
        Commands::Status => commands::cmd_status(&cli.db, cli.no_encrypt),
        Commands::Admins => commands::cmd_admins(&cli.db, cli.no_encrypt),
    }
}
