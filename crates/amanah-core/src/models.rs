//! Domain models for Amanah

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A jamaat (organization) that owns records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// An administrator account scoped to one organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Admin {
    pub id: i64,
    pub organization_id: i64,
    pub email: String,
    pub name: String,
    /// "admin" or "super" (super admins are managed out of band)
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// The two record kinds handled by bulk import/export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Financial,
    Membership,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Membership => "membership",
        }
    }
}

impl std::str::FromStr for RecordKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "financial" => Ok(Self::Financial),
            "membership" => Ok(Self::Membership),
            _ => Err(format!("Unknown record kind: {}", s)),
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fixed vocabulary of organizational sub-units (auxiliary bodies)
pub const MAJLIS_UNITS: [&str; 5] = ["Atfal", "Nasirat", "Khuddam", "Lajna", "Ansarullah"];

/// Normalize a majlis label to its canonical casing, or pass it through
/// unchanged if it is not one of the known units.
pub fn normalize_majlis(value: &str) -> String {
    let trimmed = value.trim();
    for unit in MAJLIS_UNITS {
        if unit.eq_ignore_ascii_case(trimmed) {
            return unit.to_string();
        }
    }
    trimmed.to_string()
}

/// Per-fund contribution breakdown (amounts in NGN, zero when absent)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FundBreakdown {
    pub chanda_aam: f64,
    pub chanda_wasiyyat: f64,
    pub jalsa_salana: f64,
    pub tahrik_jadid: f64,
    pub waqf_jadid: f64,
    pub zakat: f64,
    pub fitrana: f64,
    pub sadaqat: f64,
    pub mosque_donation: f64,
    pub mta: f64,
    pub maryam_fund: f64,
    pub scholarship: f64,
    pub welfare: f64,
    pub publications: f64,
    pub centenary: f64,
    pub eid_fund: f64,
    pub tabligh: f64,
    pub hissa_jaidad: f64,
    pub national_liability: f64,
    pub miscellaneous: f64,
}

impl FundBreakdown {
    /// Funds paired with their canonical display labels, in ledger column order
    pub fn labelled(&self) -> [(&'static str, f64); 20] {
        [
            ("CHANDA AAM", self.chanda_aam),
            ("CHANDA WASIYYAT", self.chanda_wasiyyat),
            ("JALSA SALANA", self.jalsa_salana),
            ("TAHRIK JADID", self.tahrik_jadid),
            ("WAQF JADID", self.waqf_jadid),
            ("ZAKAT", self.zakat),
            ("FITRANA", self.fitrana),
            ("SADAQAT", self.sadaqat),
            ("MOSQUE DONATION", self.mosque_donation),
            ("MTA", self.mta),
            ("MARYAM FUND", self.maryam_fund),
            ("SCHOLARSHIP", self.scholarship),
            ("WELFARE", self.welfare),
            ("PUBLICATIONS", self.publications),
            ("CENTENARY", self.centenary),
            ("EID FUND", self.eid_fund),
            ("TABLIGH", self.tabligh),
            ("HISSA JAIDAD", self.hissa_jaidad),
            ("NATIONAL LIABILITY", self.national_liability),
            ("MISCELLANEOUS", self.miscellaneous),
        ]
    }
}

/// A stored contribution ledger entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: i64,
    pub organization_id: i64,
    /// Admin who submitted the record (manual entry or import)
    pub admin_id: Option<i64>,
    /// Contributor external ID
    pub chanda_no: String,
    pub name: String,
    /// May be empty; when present it is the natural key
    pub receipt_no: String,
    pub date: Option<NaiveDate>,
    /// Comma-joined ordered MONABBR+YEAR tokens, e.g. "JAN2024, FEB2024"
    pub month_paid_for: String,
    #[serde(flatten)]
    pub funds: FundBreakdown,
    /// Caller-supplied total; the core does not re-derive it from the funds
    pub total_ngn: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A contribution entry before insertion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewFinancialRecord {
    pub chanda_no: String,
    pub name: String,
    pub receipt_no: String,
    pub date: Option<NaiveDate>,
    pub month_paid_for: String,
    #[serde(flatten)]
    pub funds: FundBreakdown,
    pub total_ngn: f64,
}

impl NewFinancialRecord {
    /// Natural-key hash used for idempotent upserts.
    ///
    /// Keyed by receipt number when present; otherwise a composite of
    /// contributor ID, months paid, date and total. Two same-day payments of
    /// the same amount with no receipt number therefore collapse into one
    /// record - a known limitation of the composite key.
    pub fn dedup_hash(&self) -> String {
        let mut hasher = Sha256::new();
        let receipt = self.receipt_no.trim();
        if !receipt.is_empty() {
            hasher.update(b"receipt\0");
            hasher.update(receipt.as_bytes());
        } else {
            hasher.update(b"composite\0");
            hasher.update(self.chanda_no.trim().as_bytes());
            hasher.update(b"\0");
            hasher.update(self.month_paid_for.trim().as_bytes());
            hasher.update(b"\0");
            if let Some(date) = self.date {
                hasher.update(date.to_string().as_bytes());
            }
            hasher.update(self.total_ngn.to_be_bytes());
        }
        hex::encode(hasher.finalize())
    }
}

/// A stored membership census entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub id: i64,
    pub organization_id: i64,
    pub admin_id: Option<i64>,
    /// Serial label from the source roll (free text, e.g. "12" or "12b")
    pub sn: String,
    pub surname: String,
    pub other_names: String,
    pub title: String,
    pub majlis: String,
    pub chanda_no: String,
    pub wasiyyat_no: String,
    pub presence: String,
    pub family: String,
    pub election: String,
    pub academic_status: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A membership entry before insertion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewMembershipRecord {
    pub sn: String,
    pub surname: String,
    pub other_names: String,
    pub title: String,
    pub majlis: String,
    pub chanda_no: String,
    pub wasiyyat_no: String,
    pub presence: String,
    pub family: String,
    pub election: String,
    pub academic_status: String,
    pub date_of_birth: Option<NaiveDate>,
    pub email: String,
    pub phone: String,
    pub address: String,
}

impl NewMembershipRecord {
    /// Natural-key hash: chanda number when present, else name + phone.
    pub fn dedup_hash(&self) -> String {
        let mut hasher = Sha256::new();
        let chanda = self.chanda_no.trim();
        if !chanda.is_empty() {
            hasher.update(b"chanda\0");
            hasher.update(chanda.as_bytes());
        } else {
            hasher.update(b"name\0");
            hasher.update(self.surname.trim().as_bytes());
            hasher.update(b"\0");
            hasher.update(self.other_names.trim().as_bytes());
            hasher.update(b"\0");
            hasher.update(self.phone.trim().as_bytes());
        }
        hex::encode(hasher.finalize())
    }
}
