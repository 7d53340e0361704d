//! Dashboard aggregates

use chrono::Utc;
use rusqlite::params;
use serde::Serialize;

use super::Database;
use crate::error::Result;

/// Member count for one majlis (auxiliary body)
#[derive(Debug, Clone, Serialize)]
pub struct MajlisCount {
    pub majlis: String,
    pub count: i64,
}

/// Headline numbers for the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub member_count: i64,
    pub contribution_count: i64,
    /// Sum of all recorded contribution totals
    pub total_ngn: f64,
    /// Sum of contribution totals dated in the current calendar month
    pub total_ngn_this_month: f64,
    /// Records (both kinds) added in the last 30 days
    pub recent_records: i64,
    pub members_by_majlis: Vec<MajlisCount>,
}

impl Database {
    pub fn get_dashboard_summary(&self, organization_id: i64) -> Result<DashboardSummary> {
        let conn = self.conn()?;

        let member_count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM membership_records WHERE organization_id = ?",
            params![organization_id],
            |row| row.get(0),
        )?;

        let (contribution_count, total_ngn): (i64, f64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(total_ngn), 0) FROM financial_records \
             WHERE organization_id = ?",
            params![organization_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let current_month = Utc::now().format("%Y-%m").to_string();
        let total_ngn_this_month: f64 = conn.query_row(
            "SELECT COALESCE(SUM(total_ngn), 0) FROM financial_records \
             WHERE organization_id = ? AND strftime('%Y-%m', date) = ?",
            params![organization_id, current_month],
            |row| row.get(0),
        )?;

        let recent_records: i64 = conn.query_row(
            "SELECT \
               (SELECT COUNT(*) FROM financial_records \
                 WHERE organization_id = ?1 AND created_at >= datetime('now', '-30 days')) + \
               (SELECT COUNT(*) FROM membership_records \
                 WHERE organization_id = ?1 AND created_at >= datetime('now', '-30 days'))",
            params![organization_id],
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(
            "SELECT majlis, COUNT(*) FROM membership_records \
             WHERE organization_id = ? AND majlis != '' \
             GROUP BY majlis ORDER BY COUNT(*) DESC",
        )?;
        let members_by_majlis = stmt
            .query_map(params![organization_id], |row| {
                Ok(MajlisCount {
                    majlis: row.get(0)?,
                    count: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(DashboardSummary {
            member_count,
            contribution_count,
            total_ngn,
            total_ngn_this_month,
            recent_records,
            members_by_majlis,
        })
    }
}
