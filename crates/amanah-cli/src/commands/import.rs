//! Import and export command implementations

use std::path::Path;

use anyhow::{Context, Result};
use amanah_core::{
    db::{FinancialFilter, MembershipFilter},
    export::{shape_financial, shape_membership, write_csv, write_workbook},
    import::{import_sheets, SheetStatus},
    models::RecordKind,
    sheet::parse_workbook,
};

use super::core::{open_db, resolve_admin};

pub fn cmd_import(
    db_path: &Path,
    file: &Path,
    kind_str: &str,
    sheets_arg: Option<&str>,
    admin_email: &str,
    no_encrypt: bool,
) -> Result<()> {
    let kind: RecordKind = kind_str
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}. Use 'financial' or 'membership'.", e))?;

    let bytes = std::fs::read(file)
        .with_context(|| format!("Failed to open file: {}", file.display()))?;

    println!("📥 Importing {} records from {}...", kind, file.display());

    let db = open_db(db_path, no_encrypt)?;
    let admin = resolve_admin(&db, admin_email)?;

    let parsed = parse_workbook(&bytes).context("Failed to parse workbook")?;
    println!("   Found {} sheet(s)", parsed.len());

    let selected: Vec<String> = match sheets_arg {
        Some(names) => names
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
        None => parsed.iter().map(|s| s.name.clone()).collect(),
    };

    let report = import_sheets(
        &db,
        admin.organization_id,
        admin.id,
        kind,
        &parsed,
        &selected,
    );

    for outcome in &report.outcomes {
        match outcome.status {
            SheetStatus::Completed => {
                println!("   ✓ {}: {} inserted", outcome.name, outcome.inserted_count)
            }
            SheetStatus::Error => println!(
                "   ✗ {}: {}",
                outcome.name,
                outcome.error_message.as_deref().unwrap_or("failed")
            ),
            SheetStatus::Pending | SheetStatus::Processing => {
                println!("   - {}: skipped", outcome.name)
            }
        }
    }

    println!("{}", report.message());

    db.log_audit(
        &admin.email,
        "import",
        Some(kind.as_str()),
        None,
        Some(&format!(
            "file={}, inserted={}",
            file.display(),
            report.total_inserted
        )),
    )?;

    Ok(())
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_export(
    db_path: &Path,
    kind_str: &str,
    out: &Path,
    month: Option<&str>,
    year: Option<i32>,
    majlis: Option<&str>,
    admin_email: &str,
    no_encrypt: bool,
) -> Result<()> {
    let kind: RecordKind = kind_str
        .parse()
        .map_err(|e: String| anyhow::anyhow!("{}. Use 'financial' or 'membership'.", e))?;

    let db = open_db(db_path, no_encrypt)?;
    let admin = resolve_admin(&db, admin_email)?;

    let sheet = match kind {
        RecordKind::Financial => {
            let filter = FinancialFilter {
                month: month.map(String::from),
                year,
                ..Default::default()
            };
            let records = db.export_financial_records(admin.organization_id, &filter)?;
            println!("📤 Exporting {} contribution(s)...", records.len());
            shape_financial(&records, None)
        }
        RecordKind::Membership => {
            let filter = MembershipFilter {
                majlis: majlis.map(String::from),
                ..Default::default()
            };
            let records = db.export_membership_records(admin.organization_id, &filter)?;
            println!("📤 Exporting {} member(s)...", records.len());
            shape_membership(&records, None)
        }
    };

    let is_csv = out
        .extension()
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);

    if is_csv {
        std::fs::write(out, write_csv(&sheet))
            .with_context(|| format!("Failed to write {}", out.display()))?;
    } else {
        let bytes = write_workbook(&sheet, &format!("{} records", kind))?;
        std::fs::write(out, bytes)
            .with_context(|| format!("Failed to write {}", out.display()))?;
    }

    println!("✅ Wrote {}", out.display());
    Ok(())
}
