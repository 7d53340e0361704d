//! Membership roll operations

use chrono::NaiveDate;
use rusqlite::{params, OptionalExtension, Row};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{MembershipRecord, NewMembershipRecord};

/// Filters for listing/exporting members
#[derive(Debug, Clone, Default)]
pub struct MembershipFilter {
    /// Case-insensitive match against surname, other names or chanda number
    pub search: Option<String>,
    /// Exact majlis (auxiliary body) label
    pub majlis: Option<String>,
}

const MEMBERSHIP_COLUMNS: &str = "id, organization_id, admin_id, sn, surname, other_names, \
     title, majlis, chanda_no, wasiyyat_no, presence, family, election, academic_status, \
     date_of_birth, email, phone, address, created_at, updated_at";

fn row_to_membership(row: &Row<'_>) -> rusqlite::Result<MembershipRecord> {
    let dob: Option<String> = row.get(14)?;
    Ok(MembershipRecord {
        id: row.get(0)?,
        organization_id: row.get(1)?,
        admin_id: row.get(2)?,
        sn: row.get(3)?,
        surname: row.get(4)?,
        other_names: row.get(5)?,
        title: row.get(6)?,
        majlis: row.get(7)?,
        chanda_no: row.get(8)?,
        wasiyyat_no: row.get(9)?,
        presence: row.get(10)?,
        family: row.get(11)?,
        election: row.get(12)?,
        academic_status: row.get(13)?,
        date_of_birth: dob.and_then(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()),
        email: row.get(15)?,
        phone: row.get(16)?,
        address: row.get(17)?,
        created_at: parse_datetime(&row.get::<_, String>(18)?),
        updated_at: parse_datetime(&row.get::<_, String>(19)?),
    })
}

fn append_filter(
    filter: &MembershipFilter,
    conditions: &mut Vec<String>,
    params: &mut Vec<Box<dyn rusqlite::ToSql>>,
) {
    if let Some(q) = filter.search.as_deref() {
        if !q.trim().is_empty() {
            conditions.push(
                "(surname LIKE ? COLLATE NOCASE OR other_names LIKE ? COLLATE NOCASE \
                 OR chanda_no LIKE ? COLLATE NOCASE)"
                    .to_string(),
            );
            let pattern = format!("%{}%", q.trim());
            params.push(Box::new(pattern.clone()));
            params.push(Box::new(pattern.clone()));
            params.push(Box::new(pattern));
        }
    }

    if let Some(majlis) = filter.majlis.as_deref() {
        if !majlis.trim().is_empty() {
            conditions.push("majlis = ? COLLATE NOCASE".to_string());
            params.push(Box::new(majlis.trim().to_string()));
        }
    }
}

impl Database {
    /// Insert a member (skips duplicates based on the natural key).
    ///
    /// Returns the new record ID, or None when an existing record matches.
    pub fn insert_membership_record(
        &self,
        organization_id: i64,
        admin_id: i64,
        rec: &NewMembershipRecord,
    ) -> Result<Option<i64>> {
        let conn = self.conn()?;
        let hash = rec.dedup_hash();

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM membership_records WHERE organization_id = ? AND dedup_hash = ?",
                params![organization_id, hash],
                |row| row.get(0),
            )
            .optional()?;

        if existing.is_some() {
            return Ok(None); // Duplicate, skip
        }

        conn.execute(
            r#"
            INSERT INTO membership_records (
                organization_id, admin_id, sn, surname, other_names, title, majlis,
                chanda_no, wasiyyat_no, presence, family, election, academic_status,
                date_of_birth, email, phone, address, dedup_hash
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                organization_id,
                admin_id,
                rec.sn,
                rec.surname,
                rec.other_names,
                rec.title,
                rec.majlis,
                rec.chanda_no,
                rec.wasiyyat_no,
                rec.presence,
                rec.family,
                rec.election,
                rec.academic_status,
                rec.date_of_birth.map(|d| d.to_string()),
                rec.email,
                rec.phone,
                rec.address,
                hash,
            ],
        )?;

        Ok(Some(conn.last_insert_rowid()))
    }

    /// Bulk insert-if-absent for one sheet of members (single transaction,
    /// duplicates become no-ops). Returns the count actually inserted.
    pub fn bulk_insert_membership(
        &self,
        organization_id: i64,
        admin_id: i64,
        records: &[NewMembershipRecord],
    ) -> Result<u64> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let mut inserted = 0u64;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO membership_records (
                    organization_id, admin_id, sn, surname, other_names, title, majlis,
                    chanda_no, wasiyyat_no, presence, family, election, academic_status,
                    date_of_birth, email, phone, address, dedup_hash
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                ON CONFLICT(organization_id, dedup_hash) DO NOTHING
                "#,
            )?;
            for rec in records {
                inserted += stmt.execute(params![
                    organization_id,
                    admin_id,
                    rec.sn,
                    rec.surname,
                    rec.other_names,
                    rec.title,
                    rec.majlis,
                    rec.chanda_no,
                    rec.wasiyyat_no,
                    rec.presence,
                    rec.family,
                    rec.election,
                    rec.academic_status,
                    rec.date_of_birth.map(|d| d.to_string()),
                    rec.email,
                    rec.phone,
                    rec.address,
                    rec.dedup_hash(),
                ])? as u64;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    pub fn get_membership_record(&self, organization_id: i64, id: i64) -> Result<MembershipRecord> {
        let conn = self.conn()?;
        conn.query_row(
            &format!(
                "SELECT {} FROM membership_records WHERE organization_id = ? AND id = ?",
                MEMBERSHIP_COLUMNS
            ),
            params![organization_id, id],
            row_to_membership,
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Membership record {}", id)))
    }

    /// List members with optional filters, alphabetical by surname
    pub fn list_membership_records(
        &self,
        organization_id: i64,
        filter: &MembershipFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<MembershipRecord>> {
        let conn = self.conn()?;

        let mut conditions = vec!["organization_id = ?".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(organization_id)];
        append_filter(filter, &mut conditions, &mut params_vec);

        let sql = format!(
            "SELECT {} FROM membership_records WHERE {} \
             ORDER BY surname COLLATE NOCASE, other_names COLLATE NOCASE, id LIMIT ? OFFSET ?",
            MEMBERSHIP_COLUMNS,
            conditions.join(" AND ")
        );
        params_vec.push(Box::new(limit));
        params_vec.push(Box::new(offset));

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_refs.as_slice(), row_to_membership)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// All members matching a filter, oldest entry first (for export)
    pub fn export_membership_records(
        &self,
        organization_id: i64,
        filter: &MembershipFilter,
    ) -> Result<Vec<MembershipRecord>> {
        let conn = self.conn()?;

        let mut conditions = vec!["organization_id = ?".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(organization_id)];
        append_filter(filter, &mut conditions, &mut params_vec);

        let sql = format!(
            "SELECT {} FROM membership_records WHERE {} ORDER BY DATE(created_at) ASC, id ASC",
            MEMBERSHIP_COLUMNS,
            conditions.join(" AND ")
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_refs.as_slice(), row_to_membership)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    pub fn count_membership_records(&self, organization_id: i64) -> Result<i64> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT COUNT(*) FROM membership_records WHERE organization_id = ?",
            params![organization_id],
            |row| row.get(0),
        )
        .map_err(Into::into)
    }

    pub fn count_membership_filtered(
        &self,
        organization_id: i64,
        filter: &MembershipFilter,
    ) -> Result<i64> {
        let conn = self.conn()?;

        let mut conditions = vec!["organization_id = ?".to_string()];
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(organization_id)];
        append_filter(filter, &mut conditions, &mut params_vec);

        let sql = format!(
            "SELECT COUNT(*) FROM membership_records WHERE {}",
            conditions.join(" AND ")
        );
        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|p| p.as_ref()).collect();

        conn.query_row(&sql, params_refs.as_slice(), |row| row.get(0))
            .map_err(Into::into)
    }

    /// Update a member via an explicit edit action (recomputes the
    /// natural-key hash)
    pub fn update_membership_record(
        &self,
        organization_id: i64,
        id: i64,
        rec: &NewMembershipRecord,
    ) -> Result<()> {
        let conn = self.conn()?;
        let changed = conn.execute(
            r#"
            UPDATE membership_records SET
                sn = ?, surname = ?, other_names = ?, title = ?, majlis = ?, chanda_no = ?,
                wasiyyat_no = ?, presence = ?, family = ?, election = ?, academic_status = ?,
                date_of_birth = ?, email = ?, phone = ?, address = ?, dedup_hash = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE organization_id = ? AND id = ?
            "#,
            params![
                rec.sn,
                rec.surname,
                rec.other_names,
                rec.title,
                rec.majlis,
                rec.chanda_no,
                rec.wasiyyat_no,
                rec.presence,
                rec.family,
                rec.election,
                rec.academic_status,
                rec.date_of_birth.map(|d| d.to_string()),
                rec.email,
                rec.phone,
                rec.address,
                rec.dedup_hash(),
                organization_id,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(Error::NotFound(format!("Membership record {}", id)));
        }
        Ok(())
    }

    /// Delete members by explicit ID selection. Returns rows removed.
    pub fn delete_membership_records(&self, organization_id: i64, ids: &[i64]) -> Result<usize> {
        if ids.is_empty() {
            return Ok(0);
        }
        let conn = self.conn()?;

        let placeholders: Vec<String> = ids.iter().map(|_| "?".to_string()).collect();
        let sql = format!(
            "DELETE FROM membership_records WHERE organization_id = ? AND id IN ({})",
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
