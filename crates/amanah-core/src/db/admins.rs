//! Organization, admin account and audit log operations

use rusqlite::{params, OptionalExtension};

use super::{parse_datetime, Database};
use crate::error::{Error, Result};
use crate::models::{Admin, Organization};

/// Audit log entry
#[derive(Debug, Clone, serde::Serialize)]
pub struct AuditEntry {
    pub id: i64,
    pub timestamp: String,
    pub admin_email: String,
    pub action: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<i64>,
    pub details: Option<String>,
}

impl Database {
    /// Create an organization, or return the existing ID for the same name
    pub fn upsert_organization(&self, name: &str) -> Result<i64> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM organizations WHERE name = ?",
                params![name],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO organizations (name) VALUES (?)",
            params![name],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn get_organization(&self, id: i64) -> Result<Organization> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, name, created_at FROM organizations WHERE id = ?",
            params![id],
            |row| {
                Ok(Organization {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                })
            },
        )
        .optional()?
        .ok_or_else(|| Error::NotFound(format!("Organization {}", id)))
    }

    pub fn list_organizations(&self) -> Result<Vec<Organization>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT id, name, created_at FROM organizations ORDER BY id")?;

        let rows = stmt.query_map([], |row| {
            Ok(Organization {
                id: row.get(0)?,
                name: row.get(1)?,
                created_at: parse_datetime(&row.get::<_, String>(2)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Create an admin, or return the existing ID for the same email
    pub fn upsert_admin(
        &self,
        organization_id: i64,
        email: &str,
        name: &str,
        role: &str,
    ) -> Result<i64> {
        let conn = self.conn()?;

        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM admins WHERE email = ?",
                params![email],
                |row| row.get(0),
            )
            .optional()?;

        if let Some(id) = existing {
            return Ok(id);
        }

        conn.execute(
            "INSERT INTO admins (organization_id, email, name, role) VALUES (?, ?, ?, ?)",
            params![organization_id, email, name, role],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Resolve the admin behind an authenticated email, if any.
    ///
    /// Identity resolution fails closed: callers reject the request when this
    /// returns None.
    pub fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>> {
        let conn = self.conn()?;
        conn.query_row(
            "SELECT id, organization_id, email, name, role, created_at FROM admins WHERE email = ?",
            params![email],
            |row| {
                Ok(Admin {
                    id: row.get(0)?,
                    organization_id: row.get(1)?,
                    email: row.get(2)?,
                    name: row.get(3)?,
                    role: row.get(4)?,
                    created_at: parse_datetime(&row.get::<_, String>(5)?),
                })
            },
        )
        .optional()
        .map_err(Into::into)
    }

    pub fn list_admins(&self, organization_id: i64) -> Result<Vec<Admin>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, organization_id, email, name, role, created_at FROM admins WHERE organization_id = ? ORDER BY id",
        )?;

        let rows = stmt.query_map(params![organization_id], |row| {
            Ok(Admin {
                id: row.get(0)?,
                organization_id: row.get(1)?,
                email: row.get(2)?,
                name: row.get(3)?,
                role: row.get(4)?,
                created_at: parse_datetime(&row.get::<_, String>(5)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }

    /// Record an API access in the audit log
    pub fn log_audit(
        &self,
        admin_email: &str,
        action: &str,
        entity_type: Option<&str>,
        entity_id: Option<i64>,
        details: Option<&str>,
    ) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO audit_log (admin_email, action, entity_type, entity_id, details) VALUES (?, ?, ?, ?, ?)",
            params![admin_email, action, entity_type, entity_id, details],
        )?;
        Ok(())
    }

    /// List audit log entries, newest first
    pub fn list_audit_log(&self, limit: i64, offset: i64) -> Result<Vec<AuditEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, admin_email, action, entity_type, entity_id, details
             FROM audit_log ORDER BY id DESC LIMIT ? OFFSET ?",
        )?;

        let rows = stmt.query_map(params![limit, offset], |row| {
            Ok(AuditEntry {
                id: row.get(0)?,
                timestamp: row.get(1)?,
                admin_email: row.get(2)?,
                action: row.get(3)?,
                entity_type: row.get(4)?,
                entity_id: row.get(5)?,
                details: row.get(6)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Into::into)
    }
}
