//! HTTP handlers for the Amanah API

mod audit;
mod auth;
mod dashboard;
mod export;
mod financial;
mod import;
mod membership;

pub use audit::list_audit_log;
pub use auth::get_me;
pub use dashboard::get_dashboard;
pub use export::export_records;
pub use financial::{
    create_financial, delete_financial, get_financial, list_financial, update_financial,
};
pub use import::{import_workbook, inspect_workbook};
pub use membership::{
    create_membership, delete_membership, get_membership, list_membership, update_membership,
};
