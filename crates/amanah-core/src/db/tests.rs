//! Database tests

use super::*;
use crate::models::*;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn seeded_db() -> (Database, i64, i64) {
        let db = Database::in_memory().unwrap();
        let org_id = db.upsert_organization("Test Jamaat").unwrap();
        let admin_id = db
            .upsert_admin(org_id, "admin@example.org", "Admin", "admin")
            .unwrap();
        (db, org_id, admin_id)
    }

    fn contribution(receipt: &str, total: f64) -> NewFinancialRecord {
        NewFinancialRecord {
            chanda_no: "CH-104".to_string(),
            name: "Bashir Ahmad".to_string(),
            receipt_no: receipt.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 15),
            month_paid_for: "JAN2024".to_string(),
            funds: FundBreakdown {
                chanda_aam: total,
                ..Default::default()
            },
            total_ngn: total,
        }
    }

    fn member(surname: &str, chanda_no: &str) -> NewMembershipRecord {
        NewMembershipRecord {
            sn: "1".to_string(),
            surname: surname.to_string(),
            other_names: "Amina".to_string(),
            majlis: "Lajna".to_string(),
            chanda_no: chanda_no.to_string(),
            phone: "0801".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_in_memory_db() {
        let db = Database::in_memory().unwrap();
        let orgs = db.list_organizations().unwrap();
        assert!(orgs.is_empty());
    }

    #[test]
    fn test_organization_and_admin_upsert() {
        let db = Database::in_memory().unwrap();

        let org_id = db.upsert_organization("Ilorin Jamaat").unwrap();
        assert!(org_id > 0);
        // Upsert same name returns same ID
        assert_eq!(db.upsert_organization("Ilorin Jamaat").unwrap(), org_id);

        let admin_id = db
            .upsert_admin(org_id, "sec@example.org", "Secretary", "admin")
            .unwrap();
        assert_eq!(
            db.upsert_admin(org_id, "sec@example.org", "Secretary", "admin")
                .unwrap(),
            admin_id
        );

        let admin = db.find_admin_by_email("sec@example.org").unwrap().unwrap();
        assert_eq!(admin.organization_id, org_id);
        assert_eq!(admin.role, "admin");

        assert!(db.find_admin_by_email("nobody@example.org").unwrap().is_none());
    }

    #[test]
    fn test_financial_schema_exists() {
        let db = Database::in_memory().unwrap();
        let conn = db.conn().unwrap();

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('financial_records') WHERE name IN ('organization_id', 'chanda_no', 'receipt_no', 'month_paid_for', 'total_ngn', 'dedup_hash')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 6, "financial_records should have the core columns");

        let result: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('membership_records') WHERE name IN ('surname', 'other_names', 'majlis', 'chanda_no', 'dedup_hash')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(result, 5, "membership_records should have the core columns");
    }

    #[test]
    fn test_insert_financial_skips_duplicates() {
        let (db, org_id, admin_id) = seeded_db();

        let id = db
            .insert_financial_record(org_id, admin_id, &contribution("R-1", 100.0))
            .unwrap();
        assert!(id.is_some());

        // Same receipt, different amount: still the same natural key
        let dup = db
            .insert_financial_record(org_id, admin_id, &contribution("R-1", 999.0))
            .unwrap();
        assert!(dup.is_none());
        assert_eq!(db.count_financial_records(org_id).unwrap(), 1);
    }

    #[test]
    fn test_natural_key_falls_back_to_composite() {
        let (db, org_id, admin_id) = seeded_db();

        let mut a = contribution("", 100.0);
        let mut b = contribution("", 100.0);
        assert!(db
            .insert_financial_record(org_id, admin_id, &a)
            .unwrap()
            .is_some());
        // Identical composite key: duplicate
        assert!(db
            .insert_financial_record(org_id, admin_id, &b)
            .unwrap()
            .is_none());

        // A different total changes the composite key
        b.total_ngn = 200.0;
        b.funds.chanda_aam = 200.0;
        assert!(db
            .insert_financial_record(org_id, admin_id, &b)
            .unwrap()
            .is_some());

        // Adding a receipt number switches to the receipt key
        a.receipt_no = "R-9".to_string();
        assert!(db
            .insert_financial_record(org_id, admin_id, &a)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_bulk_insert_counts_only_new_rows() {
        let (db, org_id, admin_id) = seeded_db();

        let batch = vec![contribution("R-1", 100.0), contribution("R-2", 200.0)];
        assert_eq!(
            db.bulk_insert_financial(org_id, admin_id, &batch).unwrap(),
            2
        );
        // Second import of the same batch inserts nothing
        assert_eq!(
            db.bulk_insert_financial(org_id, admin_id, &batch).unwrap(),
            0
        );
        assert_eq!(db.count_financial_records(org_id).unwrap(), 2);
    }

    #[test]
    fn test_bulk_insert_never_overwrites_existing() {
        let (db, org_id, admin_id) = seeded_db();

        let id = db
            .insert_financial_record(org_id, admin_id, &contribution("R-1", 100.0))
            .unwrap()
            .unwrap();

        // Re-import with a different amount for the same receipt
        db.bulk_insert_financial(org_id, admin_id, &[contribution("R-1", 555.0)])
            .unwrap();

        let stored = db.get_financial_record(org_id, id).unwrap();
        assert_eq!(stored.total_ngn, 100.0);
    }

    #[test]
    fn test_records_are_organization_scoped() {
        let (db, org_id, admin_id) = seeded_db();
        let other_org = db.upsert_organization("Other Jamaat").unwrap();
        let other_admin = db
            .upsert_admin(other_org, "other@example.org", "Other", "admin")
            .unwrap();

        // Same receipt number in two organizations: both insert
        db.insert_financial_record(org_id, admin_id, &contribution("R-1", 100.0))
            .unwrap()
            .unwrap();
        let other_id = db
            .insert_financial_record(other_org, other_admin, &contribution("R-1", 100.0))
            .unwrap()
            .unwrap();

        assert_eq!(db.count_financial_records(org_id).unwrap(), 1);
        assert_eq!(db.count_financial_records(other_org).unwrap(), 1);

        // Lookups and deletes do not cross the boundary
        assert!(db.get_financial_record(org_id, other_id).is_err());
        assert_eq!(
            db.delete_financial_records(org_id, &[other_id]).unwrap(),
            0
        );
    }

    #[test]
    fn test_update_recomputes_natural_key() {
        let (db, org_id, admin_id) = seeded_db();

        let id = db
            .insert_financial_record(org_id, admin_id, &contribution("R-1", 100.0))
            .unwrap()
            .unwrap();

        let edited = contribution("R-EDITED", 100.0);
        db.update_financial_record(org_id, id, &edited).unwrap();

        // An import carrying the edited receipt now dedups against it
        assert_eq!(
            db.bulk_insert_financial(org_id, admin_id, &[contribution("R-EDITED", 100.0)])
                .unwrap(),
            0
        );
        // And the old key no longer blocks a fresh row
        assert_eq!(
            db.bulk_insert_financial(org_id, admin_id, &[contribution("R-1", 100.0)])
                .unwrap(),
            1
        );
    }

    #[test]
    fn test_negative_total_is_rejected() {
        let (db, org_id, admin_id) = seeded_db();

        let mut bad = contribution("R-1", 100.0);
        bad.total_ngn = -5.0;
        assert!(db.insert_financial_record(org_id, admin_id, &bad).is_err());
    }

    #[test]
    fn test_financial_filters() {
        let (db, org_id, admin_id) = seeded_db();

        let mut jan = contribution("R-1", 100.0);
        jan.month_paid_for = "JAN2024".to_string();
        jan.date = NaiveDate::from_ymd_opt(2024, 1, 10);
        let mut feb = contribution("R-2", 200.0);
        feb.month_paid_for = "FEB2024".to_string();
        feb.date = NaiveDate::from_ymd_opt(2024, 2, 10);
        feb.name = "Usman Garba".to_string();
        db.bulk_insert_financial(org_id, admin_id, &[jan, feb])
            .unwrap();

        let filter = FinancialFilter {
            month: Some("JAN".to_string()),
            year: Some(2024),
            ..Default::default()
        };
        let rows = db.list_financial_records(org_id, &filter, 50, 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].receipt_no, "R-1");

        let filter = FinancialFilter {
            search: Some("usman".to_string()),
            ..Default::default()
        };
        assert_eq!(db.count_financial_filtered(org_id, &filter).unwrap(), 1);

        let filter = FinancialFilter {
            year: Some(2024),
            ..Default::default()
        };
        assert_eq!(db.count_financial_filtered(org_id, &filter).unwrap(), 2);
    }

    #[test]
    fn test_membership_crud_and_filters() {
        let (db, org_id, admin_id) = seeded_db();

        let id = db
            .insert_membership_record(org_id, admin_id, &member("Bello", "CH-1"))
            .unwrap()
            .unwrap();
        // Same chanda number: duplicate regardless of name
        assert!(db
            .insert_membership_record(org_id, admin_id, &member("Different", "CH-1"))
            .unwrap()
            .is_none());

        let mut khuddam = member("Suleiman", "CH-2");
        khuddam.majlis = "Khuddam".to_string();
        db.insert_membership_record(org_id, admin_id, &khuddam)
            .unwrap()
            .unwrap();

        let filter = MembershipFilter {
            majlis: Some("khuddam".to_string()),
            ..Default::default()
        };
        let rows = db.list_membership_records(org_id, &filter, 50, 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].surname, "Suleiman");

        let mut edited = member("Bello", "CH-1");
        edited.title = "Alhaja".to_string();
        db.update_membership_record(org_id, id, &edited).unwrap();
        assert_eq!(db.get_membership_record(org_id, id).unwrap().title, "Alhaja");

        assert_eq!(db.delete_membership_records(org_id, &[id]).unwrap(), 1);
        assert_eq!(db.count_membership_records(org_id).unwrap(), 1);
    }

    #[test]
    fn test_membership_composite_key_without_chanda_no() {
        let (db, org_id, admin_id) = seeded_db();

        assert!(db
            .insert_membership_record(org_id, admin_id, &member("Bello", ""))
            .unwrap()
            .is_some());
        assert!(db
            .insert_membership_record(org_id, admin_id, &member("Bello", ""))
            .unwrap()
            .is_none());

        let mut other_phone = member("Bello", "");
        other_phone.phone = "0909".to_string();
        assert!(db
            .insert_membership_record(org_id, admin_id, &other_phone)
            .unwrap()
            .is_some());
    }

    #[test]
    fn test_dashboard_summary() {
        let (db, org_id, admin_id) = seeded_db();

        db.insert_membership_record(org_id, admin_id, &member("Bello", "CH-1"))
            .unwrap();
        let mut khuddam = member("Suleiman", "CH-2");
        khuddam.majlis = "Khuddam".to_string();
        db.insert_membership_record(org_id, admin_id, &khuddam)
            .unwrap();

        db.insert_financial_record(org_id, admin_id, &contribution("R-1", 100.0))
            .unwrap();
        db.insert_financial_record(org_id, admin_id, &contribution("R-2", 250.0))
            .unwrap();

        let summary = db.get_dashboard_summary(org_id).unwrap();
        assert_eq!(summary.member_count, 2);
        assert_eq!(summary.contribution_count, 2);
        assert_eq!(summary.total_ngn, 350.0);
        assert_eq!(summary.recent_records, 4);
        assert_eq!(summary.members_by_majlis.len(), 2);

        // Another organization sees none of it
        let other_org = db.upsert_organization("Other Jamaat").unwrap();
        let empty = db.get_dashboard_summary(other_org).unwrap();
        assert_eq!(empty.member_count, 0);
        assert_eq!(empty.total_ngn, 0.0);
    }

    #[test]
    fn test_audit_log() {
        let db = Database::in_memory().unwrap();

        db.log_audit(
            "admin@example.org",
            "import",
            Some("financial"),
            None,
            Some("sheets=2"),
        )
        .unwrap();
        db.log_audit("admin@example.org", "list", Some("membership"), None, None)
            .unwrap();

        let entries = db.list_audit_log(10, 0).unwrap();
        assert_eq!(entries.len(), 2);
        // Newest first
        assert_eq!(entries[0].action, "list");
        assert_eq!(entries[1].details.as_deref(), Some("sheets=2"));
    }
}
