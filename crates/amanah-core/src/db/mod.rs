//! Database access layer with connection pooling and migrations
//!
//! This module is organized by domain:
//! - `admins` - Organizations, admin accounts, audit log
//! - `financial` - Contribution ledger CRUD and bulk upsert
//! - `membership` - Membership roll CRUD and bulk upsert
//! - `reports` - Dashboard aggregates

use chrono::{DateTime, Utc};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use tracing::info;

use crate::error::{Error, Result};

mod admins;
mod financial;
mod membership;
mod reports;

pub use admins::AuditEntry;
pub use financial::FinancialFilter;
pub use membership::MembershipFilter;
pub use reports::{DashboardSummary, MajlisCount};

pub type DbPool = Pool<SqliteConnectionManager>;
pub type DbConn = PooledConnection<SqliteConnectionManager>;

/// Environment variable for database encryption key
pub const DB_KEY_ENV: &str = "AMANAH_DB_KEY";

/// Derive an encryption key from a passphrase using Argon2
///
/// Uses a fixed application salt so the same passphrase always produces the
/// same key, regardless of database path. This allows moving/renaming/
/// restoring the database freely.
fn derive_key(passphrase: &str) -> Result<String> {
    use argon2::{password_hash::SaltString, Argon2, PasswordHasher};

    // Fixed application salt - changing this would invalidate all existing
    // encrypted databases
    const APP_SALT: &[u8; 16] = b"amanah-salt-v1-x";

    let salt = SaltString::encode_b64(APP_SALT)
        .map_err(|e| Error::Encryption(format!("Failed to create salt: {}", e)))?;

    let argon2 = Argon2::default();
    let hash = argon2
        .hash_password(passphrase.as_bytes(), &salt)
        .map_err(|e| Error::Encryption(format!("Failed to derive key: {}", e)))?;

    // Extract the hash portion for use as SQLCipher key (hex encoded)
    let hash_str = hash
        .hash
        .ok_or_else(|| Error::Encryption("No hash output".to_string()))?;
    Ok(hex::encode(hash_str.as_bytes()))
}

/// Parse a SQLite datetime string into a DateTime<Utc>
pub(crate) fn parse_datetime(s: &str) -> DateTime<Utc> {
    // SQLite stores as "YYYY-MM-DD HH:MM:SS" format
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| Utc::now())
}

/// Database wrapper with connection pooling
#[derive(Clone)]
pub struct Database {
    pool: DbPool,
    /// Path to the database file
    db_path: String,
}

impl Database {
    /// Create a new database connection pool with encryption
    ///
    /// Requires `AMANAH_DB_KEY` environment variable to be set. The database
    /// will be encrypted using SQLCipher with a key derived from the
    /// passphrase via Argon2.
    ///
    /// Returns an error if `AMANAH_DB_KEY` is not set. Use
    /// `new_unencrypted()` for development/testing without encryption.
    pub fn new(path: &str) -> Result<Self> {
        let encryption_key = std::env::var(DB_KEY_ENV).ok();
        match encryption_key {
            Some(key) => Self::new_with_key(path, Some(&key)),
            None => Err(Error::Encryption(format!(
                "Database encryption required. Set {} environment variable with your passphrase, \
                or use --no-encrypt for unencrypted databases (not recommended for production).",
                DB_KEY_ENV
            ))),
        }
    }

    /// Create a new unencrypted database connection pool
    ///
    /// WARNING: This creates an unencrypted database. Only use for
    /// development or testing. For production, use `new()` with
    /// `AMANAH_DB_KEY` set - membership rolls carry personal data.
    pub fn new_unencrypted(path: &str) -> Result<Self> {
        Self::new_with_key(path, None)
    }

    /// Create a new database with an explicit encryption key
    pub fn new_with_key(path: &str, passphrase: Option<&str>) -> Result<Self> {
        let manager = SqliteConnectionManager::file(path);

        let pool = if let Some(pass) = passphrase {
            let key = derive_key(pass)?;
            let key_pragma = format!("PRAGMA key = 'x\"{}\"';", key);

            // Use with_init to set the key on every new connection
            let manager = manager.with_init(move |conn| {
                conn.execute_batch(&key_pragma)?;
                Ok(())
            });

            Pool::builder().max_size(10).build(manager)?
        } else {
            Pool::builder().max_size(10).build(manager)?
        };

        let db = Self {
            pool,
            db_path: path.to_string(),
        };
        db.run_migrations()?;

        Ok(db)
    }

    /// Get the path to the database file
    pub fn path(&self) -> &str {
        &self.db_path
    }

    /// Create an in-memory database (for testing)
    ///
    /// Note: Uses a temporary file rather than `:memory:` because SQLCipher
    /// has issues with in-memory databases in the connection pool.
    pub fn in_memory() -> Result<Self> {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = format!("/tmp/amanah_test_{}.db", id);

        // Remove any existing file
        let _ = std::fs::remove_file(&path);

        Self::new_unencrypted(&path)
    }

    /// Check if the database is encrypted
    pub fn is_encrypted(&self) -> Result<bool> {
        let conn = self.conn()?;
        // SQLCipher sets cipher_version if encryption is active
        let result: rusqlite::Result<String> =
            conn.query_row("PRAGMA cipher_version;", [], |row| row.get(0));
        Ok(result.is_ok() && std::env::var(DB_KEY_ENV).is_ok())
    }

    /// Get a connection from the pool
    pub fn conn(&self) -> Result<DbConn> {
        Ok(self.pool.get()?)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn()?;

        conn.execute_batch(
            r#"
            -- Enable foreign keys
            PRAGMA foreign_keys = ON;

            -- Performance pragmas for local storage
            -- WAL mode: better concurrency, readers don't block writers
            PRAGMA journal_mode = WAL;
            PRAGMA cache_size = 2000;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;

            -- Organizations (jamaats) owning all records
            CREATE TABLE IF NOT EXISTS organizations (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            -- Admin accounts, each scoped to one organization
            CREATE TABLE IF NOT EXISTS admins (
                id INTEGER PRIMARY KEY,
                organization_id INTEGER NOT NULL REFERENCES organizations(id),
                email TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL DEFAULT '',
                role TEXT NOT NULL DEFAULT 'admin',        -- admin, super
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP
            );

            CREATE INDEX IF NOT EXISTS idx_admins_org ON admins(organization_id);

            -- Contribution ledger entries
            CREATE TABLE IF NOT EXISTS financial_records (
                id INTEGER PRIMARY KEY,
                organization_id INTEGER NOT NULL REFERENCES organizations(id),
                admin_id INTEGER REFERENCES admins(id),
                chanda_no TEXT NOT NULL DEFAULT '',
                name TEXT NOT NULL DEFAULT '',
                receipt_no TEXT NOT NULL DEFAULT '',
                date DATE,
                month_paid_for TEXT NOT NULL DEFAULT '',   -- "JAN2024, FEB2024"
                chanda_aam REAL NOT NULL DEFAULT 0,
                chanda_wasiyyat REAL NOT NULL DEFAULT 0,
                jalsa_salana REAL NOT NULL DEFAULT 0,
                tahrik_jadid REAL NOT NULL DEFAULT 0,
                waqf_jadid REAL NOT NULL DEFAULT 0,
                zakat REAL NOT NULL DEFAULT 0,
                fitrana REAL NOT NULL DEFAULT 0,
                sadaqat REAL NOT NULL DEFAULT 0,
                mosque_donation REAL NOT NULL DEFAULT 0,
                mta REAL NOT NULL DEFAULT 0,
                maryam_fund REAL NOT NULL DEFAULT 0,
                scholarship REAL NOT NULL DEFAULT 0,
                welfare REAL NOT NULL DEFAULT 0,
                publications REAL NOT NULL DEFAULT 0,
                centenary REAL NOT NULL DEFAULT 0,
                eid_fund REAL NOT NULL DEFAULT 0,
                tabligh REAL NOT NULL DEFAULT 0,
                hissa_jaidad REAL NOT NULL DEFAULT 0,
                national_liability REAL NOT NULL DEFAULT 0,
                miscellaneous REAL NOT NULL DEFAULT 0,
                total_ngn REAL NOT NULL DEFAULT 0 CHECK (total_ngn >= 0),
                dedup_hash TEXT NOT NULL,                  -- natural-key hash
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(organization_id, dedup_hash)
            );

            CREATE INDEX IF NOT EXISTS idx_financial_org ON financial_records(organization_id);
            CREATE INDEX IF NOT EXISTS idx_financial_date ON financial_records(date);
            CREATE INDEX IF NOT EXISTS idx_financial_chanda_no ON financial_records(chanda_no);

            -- Membership census entries
            CREATE TABLE IF NOT EXISTS membership_records (
                id INTEGER PRIMARY KEY,
                organization_id INTEGER NOT NULL REFERENCES organizations(id),
                admin_id INTEGER REFERENCES admins(id),
                sn TEXT NOT NULL DEFAULT '',
                surname TEXT NOT NULL DEFAULT '',
                other_names TEXT NOT NULL DEFAULT '',
                title TEXT NOT NULL DEFAULT '',
                majlis TEXT NOT NULL DEFAULT '',           -- Atfal, Nasirat, Khuddam, Lajna, Ansarullah
                chanda_no TEXT NOT NULL DEFAULT '',
                wasiyyat_no TEXT NOT NULL DEFAULT '',
                presence TEXT NOT NULL DEFAULT '',
                family TEXT NOT NULL DEFAULT '',
                election TEXT NOT NULL DEFAULT '',
                academic_status TEXT NOT NULL DEFAULT '',
                date_of_birth DATE,
                email TEXT NOT NULL DEFAULT '',
                phone TEXT NOT NULL DEFAULT '',
                address TEXT NOT NULL DEFAULT '',
                dedup_hash TEXT NOT NULL,                  -- natural-key hash
                created_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                UNIQUE(organization_id, dedup_hash)
            );

            CREATE INDEX IF NOT EXISTS idx_membership_org ON membership_records(organization_id);
            CREATE INDEX IF NOT EXISTS idx_membership_majlis ON membership_records(majlis);
            CREATE INDEX IF NOT EXISTS idx_membership_surname ON membership_records(surname);

            -- Audit log (tracks all API access for security)
            CREATE TABLE IF NOT EXISTS audit_log (
                id INTEGER PRIMARY KEY,
                timestamp DATETIME DEFAULT CURRENT_TIMESTAMP,
                admin_email TEXT NOT NULL,
                action TEXT NOT NULL,
                entity_type TEXT,
                entity_id INTEGER,
                details TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_audit_log_admin ON audit_log(admin_email);
            CREATE INDEX IF NOT EXISTS idx_audit_log_timestamp ON audit_log(timestamp);
            CREATE INDEX IF NOT EXISTS idx_audit_log_action ON audit_log(action);
            "#,
        )?;

        info!("Database schema initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests;
