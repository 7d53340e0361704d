//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `cmd_init` - Initialize the database and seed the organization
//! - `cmd_status` / `cmd_dashboard` / `cmd_admins` - Status output

use std::path::Path;

use anyhow::{Context, Result};
use amanah_core::db::Database;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path.to_str().unwrap();
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Resolve an admin email to its account, with a helpful error
pub fn resolve_admin(db: &Database, email: &str) -> Result<amanah_core::models::Admin> {
    db.find_admin_by_email(email)?
        .ok_or_else(|| anyhow::anyhow!("No admin account for '{}'. Run `amanah init` first.", email))
}

pub fn cmd_init(
    db_path: &Path,
    org: &str,
    admin_email: &str,
    admin_name: &str,
    no_encrypt: bool,
) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let db = open_db(db_path, no_encrypt)?;

    let org_id = db
        .upsert_organization(org)
        .context("Failed to create organization")?;
    db.upsert_admin(org_id, admin_email, admin_name, "admin")
        .context("Failed to create admin account")?;
    println!("   Organization: {} (id {})", org, org_id);
    println!("   Admin: {} <{}>", admin_name, admin_email);

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!(
        "  1. Import records: amanah import --file ledger.xlsx --kind financial --admin {}",
        admin_email
    );
    println!("  2. Start web UI: amanah serve");

    Ok(())
}

pub fn cmd_status(db_path: &Path, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    println!("📊 Database status");
    println!("   Path: {}", db.path());
    println!(
        "   Encryption: {}",
        if db.is_encrypted()? {
            "enabled"
        } else {
            "disabled"
        }
    );

    let size = std::fs::metadata(db.path()).map(|m| m.len()).unwrap_or(0);
    println!("   Size: {} KB", size / 1024);

    for org in db.list_organizations()? {
        let members = db.count_membership_records(org.id)?;
        let contributions = db.count_financial_records(org.id)?;
        println!(
            "   {}: {} member(s), {} contribution(s)",
            org.name, members, contributions
        );
    }

    Ok(())
}

pub fn cmd_dashboard(db_path: &Path, admin_email: &str, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;
    let admin = resolve_admin(&db, admin_email)?;
    let org = db.get_organization(admin.organization_id)?;
    let summary = db.get_dashboard_summary(admin.organization_id)?;

    println!("📊 {} dashboard", org.name);
    println!("   Members: {}", summary.member_count);
    println!("   Contributions: {}", summary.contribution_count);
    println!("   Total: ₦{:.2}", summary.total_ngn);
    println!("   This month: ₦{:.2}", summary.total_ngn_this_month);
    println!("   Added in last 30 days: {}", summary.recent_records);

    if !summary.members_by_majlis.is_empty() {
        println!("   By majlis:");
        for entry in &summary.members_by_majlis {
            println!("     {:<12} {}", entry.majlis, entry.count);
        }
    }

    Ok(())
}

pub fn cmd_admins(db_path: &Path, no_encrypt: bool) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    for org in db.list_organizations()? {
        println!("{}", org.name);
        for admin in db.list_admins(org.id)? {
            println!("   {:<30} {} ({})", admin.email, admin.name, admin.role);
        }
    }

    Ok(())
}
