//! Contribution ledger operations
//!
//! Bulk import uses `INSERT ... ON CONFLICT DO NOTHING` against the
//! per-organization natural-key hash: rows matching an existing record are
//! skipped, never overwritten, so re-importing a file cannot clobber manual
//! edits. Each sheet's rows are submitted inside one transaction.

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{FinancialRecord, FundBreakdown, NewFinancialRecord};

/// Filters for listing/exporting contributions
#[derive(Debug, Clone, Default)]
pub struct FinancialFilter {
    /// Case-insensitive match against name, chanda number or receipt number
    pub search: Option<String>,
    /// Month abbreviation, e.g. "JAN"
    pub month: Option<String>,
    pub year: Option<i32>,
}

/// Map a month abbreviation to its calendar number
fn month_number(abbr: &str) -> Option<u32> {
    match abbr.trim().to_uppercase().as_str() {
        "JAN" => Some(1),
        "FEB" => Some(2),
        "MAR" => Some(3),
        "APR" => Some(4),
        "MAY" => Some(5),
        "JUN" => Some(6),
        "JUL" => Some(7),
        "AUG" => Some(8),
        "SEP" => Some(9),
        "OCT" => Some(10),
        "NOV" => Some(11),
        "DEC" => Some(12),
        _ => None,
    }
}

const FINANCIAL_COLUMNS: &str = "id, organization_id, admin_id, chanda_no, name, receipt_no, \
     date, month_paid_for, chanda_aam, chanda_wasiyyat, jalsa_salana, tahrik_jadid, waqf_jadid, \
     zakat, fitrana, sadaqat, mosque_donation, mta, maryam_fund, scholarship, welfare, \
     publications, centenary, eid_fund, tabligh, hissa_jaidad, national_liability, \
     miscellaneous, total_ngn, created_at, updated_at";

fn row_to_financial(row: &Row<'_>) -> rusqlite::Result<FinancialRecord> {
    let date: Option<String> = row.get(6)?;
    Ok(FinancialRecord {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        admin_id: row.get(2)?,
        chanda_no: row.get(3)?,
        name: row.get(4)?,
        receipt_no: row.get(5)?,
        date: date.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        month_paid_for: row.get(7)?,
        funds: FundBreakdown {
            chanda_aam: row.get(8)?,
            chanda_wasiyyat: row.get(9)?,
            jalsa_salana: row.get(10)?,
            tahrik_jadid: row.get(11)?,
            waqf_jadid: row.get(12)?,
            zakat: row.get(13)?,
            fitrana: row.get(14)?,
            sadaqat: row.get(15)?,
            mosque_donation: row.get(16)?,
            mta: row.get(17)?,
            maryam_fund: row.get(18)?,
            scholarship: row.get(19)?,
            welfare: row.get(20)?,
            publications: row.get(21)?,
            centenary: row.get(22)?,
            eid_fund: row.get(23)?,
            tabligh: row.get(24)?,
            hissa_jaidad: row.get(25)?,
            national_liability: row.get(26)?,
            miscellaneous: row.get(27)?,
        },
        total_ngn: row.get(28)?,
        created_at: parse_datetime(&row.get::<_, String>(29)?),
        updated_at: parse_datetime(&row.get::<_, String>(30)?),
    })
}

/// Build WHERE clauses + params for a filter; conditions start after the
/// mandatory organization scope.
fn append_filter(
    filter: &FinancialFilter,
    conditions: &mut Vec<String>,
    params: &mut Vec<Box<dyn rusqlite::ToSql>>,
) {
    if let Some(q) = filter.search.as_deref() {
        if !q.trim().is_empty() {
            conditions.push(
                "(name LIKE ? COLLATE NOCASE OR chanda_no LIKE ? COLLATE NOCASE \
                 OR receipt_no LIKE ? COLLATE NOCASE)"
                    .to_string(),
            );
            let pattern = format!("%{}%", q.trim());
            params.push(Box::new(pattern.clone()));
            params.push(Box::new(pattern.clone()));
            params.push(Box::new(pattern));
        }
    }

    match (filter.month.as_deref(), filter.year) {
        (Some(month), Some(year)) => {
            // A combined month+year selects on the months-paid-for token,
            // which is what "month" means in a chanda ledger
            conditions.push("month_paid_for LIKE ?".to_string());
            params.push(Box::new(format!(
                "%{}{}%",
                month.trim().to_uppercase(),
                year
            )));
        }
        (Some(month), None) => {
            if let Some(n) = month_number(month) {
                conditions.push("strftime('%m', date) = ?".to_string());
                params.push(Box::new(format!("{:02}", n)));
            }
        }
        (None, Some(year)) => {
            conditions.push("strftime('%Y', date) = ?".to_string());
            params.push(Box::new(year.to_string()));
        }
        (None, None) => {}
    }
}

impl Database {
    /// Insert a contribution (skips duplicates based on the natural key).
    ///
    /// Returns the new record ID, or None when an existing record matches.
    pub fn insert_financial_record(
        &self,
        organization_id: i64,
        admin_id: i64,
        rec: &NewFinancialRecord,
    ) -> Result<Option<i64>> {
        let conn = self.conn()?;
        let hash = rec.dedup_hash();

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM financial_records WHERE organization_id = ? AND dedup_hash = ?",
                params![organization_id, hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(None); // Duplicate, skip
        }

        conn.execute(
            r#"
            INSERT INTO financial_records (
                organization_id, admin_id, chanda_no, name, receipt_no, date, month_paid_for,
                chanda_aam, chanda_wasiyyat, jalsa_salana, tahrik_jadid, waqf_jadid, zakat,
                fitrana, sadaqat, mosque_donation, mta, maryam_fund, scholarship, welfare,
                publications, centenary, eid_fund, tabligh, hissa_jaidad, national_liability,
                miscellaneous, total_ngn, dedup_hash
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                organization_id,
                admin_id,
                rec.chanda_no,
                rec.name,
                rec.receipt_no,
                rec.date.map(|d| d.to_string()),
                rec.month_paid_for,
                rec.funds.chanda_aam,
                rec.funds.chanda_wasiyyat,
                rec.funds.jalsa_salana,
                rec.funds.tahrik_jadid,
                rec.funds.waqf_jadid,
                rec.funds.zakat,
                rec.funds.fitrana,
                rec.funds.sadaqat,
                rec.funds.mosque_donation,
                rec.funds.mta,
                rec.funds.maryam_fund,
                rec.funds.scholarship,
                rec.funds.welfare,
                rec.funds.publications,
                rec.funds.centenary,
                rec.funds.eid_fund,
                rec.funds.tabligh,
                rec.funds.hissa_jaidad,
                rec.funds.national_liability,
                rec.funds.miscellaneous,
                rec.total_ngn,
                hash,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// Bulk insert-if-absent for one sheet of contributions.
    ///
    /// All rows go through a single transaction; rows whose natural key
    /// matches an existing record become no-ops (`ON CONFLICT DO NOTHING`).
    /// Returns the count of rows actually inserted.
    pub fn bulk_insert_financial(
        &self,
        organization_id: i64,
        admin_id: i64,
        records: &[NewFinancialRecord],
    ) -> Result<u64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut inserted = 0u64;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO financial_records (
                    organization_id, admin_id, chanda_no, name, receipt_no, date, month_paid_for,
                    chanda_aam, chanda_wasiyyat, jalsa_salana, tahrik_jadid, waqf_jadid, zakat,
                    fitrana, sadaqat, mosque_donation, mta, maryam_fund, scholarship, welfare,
                    publications, centenary, eid_fund, tabligh, hissa_jaidad, national_liability,
                    miscellaneous, total_ngn, dedup_hash
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(organization_id, dedup_hash) DO NOTHING
                "#,
            )?;
            for rec in records {
                inserted += stmt.execute(params![
                    organization_id,
                    admin_id,
                    rec.chanda_no,
                    rec.name,
                    rec.receipt_no,
                    rec.date.map(|d| d.to_string()),
                    rec.month_paid_for,
                    rec.funds.chanda_aam,
                    rec.funds.chanda_wasiyyat,
                    rec.funds.jalsa_salana,
                    rec.funds.tahrik_jadid,
                    rec.funds.waqf_jadid,
                    rec.funds.zakat,
                    rec.funds.fitrana,
                    rec.funds.sadaqat,
                    rec.funds.mosque_donation,
                    rec.funds.mta,
                    rec.funds.maryam_fund,
                    rec.funds.scholarship,
                    rec.funds.welfare,
                    rec.funds.publications,
                    rec.funds.centenary,
                    rec.funds.eid_fund,
                    rec.funds.tabligh,
                    rec.funds.hissa_jaidad,
                    rec.funds.national_liability,
                    rec.funds.miscellaneous,
                    rec.total_ngn,
                    rec.dedup_hash(),
                ])? as u64;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn get_financial_record(&self, organization_id: i64, id: i64) -> Result<FinancialRecord> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM financial_records WHERE organization_id = ? AND id = ?",
                FINANCIAL_COLUMNS
            ),
            params![organization_id, id],
            row_to_financial,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Financial record {}", id)))
    }

    /// List contributions with optional filters, newest date first
    pub fn list_financial_records(
        &self,
        organization_id: i64,
        filter: &FinancialFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<FinancialRecord>> {
        let conn = self.conn()?;

        let mut conditions = vec!["organization_id = ?".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(organization_id)];
        append_filter(filter, &mut conditions, &mut params_vec);

        let sql = format!(
            "SELECT {} FROM financial_records WHERE {} \
             ORDER BY COALESCE(date, DATE(created_at)) DESC, id DESC LIMIT ? OFFSET ?",
            FINANCIAL_COLUMNS,
            conditions.join(" AND ")
        );
        params_vec.push(Box::new(limit));
        params_vec.push(Box::new(offset));

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_refs.as_slice(), row_to_financial)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// All contributions matching a filter, oldest date first (for export).
    /// No pagination: exports operate on the full filtered set.
    pub fn export_financial_records(
        &self,
        organization_id: i64,
        filter: &FinancialFilter,
    ) -> Result<Vec<FinancialRecord>> {
        let conn = self.conn()?;

        let mut conditions = vec!["organization_id = ?".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(organization_id)];
        append_filter(filter, &mut conditions, &mut params_vec);

        let sql = format!(
            "SELECT {} FROM financial_records WHERE {} \
             ORDER BY COALESCE(date, DATE(created_at)) ASC, id ASC",
            FINANCIAL_COLUMNS,
            conditions.join(" AND ")
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_refs.as_slice(), row_to_financial)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    pub fn count_financial_records(&self, organization_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT COUNT(*) FROM financial_records WHERE organization_id = ?",
            params![organization_id],
            |row| row.get(0),
        )
        .map_err(Into::into)
    }

    pub fn count_financial_filtered(
        &self,
        organization_id: i64,
        filter: &FinancialFilter,
    ) -> Result<i64> {
        let conn = self.conn()?;

        let mut conditions = vec!["organization_id = ?".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(organization_id)];
        append_filter(filter, &mut conditions, &mut params_vec);

        let sql = format!(
            "SELECT COUNT(*) FROM financial_records WHERE {}",
            conditions.join(" AND ")
        );
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))
            .map_err(Into::into)
    }

    /// Update a contribution via an explicit edit action.
    ///
    /// Recomputes the natural-key hash so future imports dedup against the
    /// edited values.
    pub fn update_financial_record(
        &self,
        organization_id: i64,
        id: i64,
        rec: &NewFinancialRecord,
    ) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            r#"
            UPDATE financial_records SET
                chanda_no = ?, name = ?, receipt_no = ?, date = ?, month_paid_for = ?,
                chanda_aam = ?, chanda_wasiyyat = ?, jalsa_salana = ?, tahrik_jadid = ?,
                waqf_jadid = ?, zakat = ?, fitrana = ?, sadaqat = ?, mosque_donation = ?,
                mta = ?, maryam_fund = ?, scholarship = ?, welfare = ?, publications = ?,
                centenary = ?, eid_fund = ?, tabligh = ?, hissa_jaidad = ?,
                national_liability = ?, miscellaneous = ?, total_ngn = ?, dedup_hash = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE organization_id = ? AND id = ?
            "#,
            params![
                rec.chanda_no,
                rec.name,
                rec.receipt_no,
                rec.date.map(|d| d.to_string()),
                rec.month_paid_for,
                rec.funds.chanda_aam,
                rec.funds.chanda_wasiyyat,
                rec.funds.jalsa_salana,
                rec.funds.tahrik_jadid,
                rec.funds.waqf_jadid,
                rec.funds.zakat,
                rec.funds.fitrana,
                rec.funds.sadaqat,
                rec.funds.mosque_donation,
                rec.funds.mta,
                rec.funds.maryam_fund,
                rec.funds.scholarship,
                rec.funds.welfare,
                rec.funds.publications,
                rec.funds.centenary,
                rec.funds.eid_fund,
                rec.funds.tabligh,
                rec.funds.hissa_jaidad,
                rec.funds.national_liability,
                rec.funds.miscellaneous,
                rec.total_ngn,
                rec.dedup_hash(),
                organization_id,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(Error::NotFound(format!("Financial record {}", id)));
        }
        Ok(())
    }

    /// Delete contributions by explicit ID selection. Returns rows removed.
    pub fn delete_financial_records(&self, organization_id: i64, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = self.conn()?;

        let placeholders: Vec<String> = ids.iter().map(|_| "?".to_string()).collect();
        let sql = format!(
            "DELETE FROM financial_records WHERE organization_id = ? AND id IN ({})",
            placeholders.join(", ")
        );

        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(organization_id)];
        for id in ids {
            params_vec.push(Box::new(*id));
        }
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        Ok(conn.execute(&sql, params_refs.as_slice())?)
    }
}
