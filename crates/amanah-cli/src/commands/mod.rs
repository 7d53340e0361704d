//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `core` - Init, status, dashboard, admins and shared utilities (open_db)
//! - `import` - Workbook import and record export commands
//! - `serve` - Web server command

pub mod core;
pub mod import;
pub mod serve;

// Re-export command functions for main.rs
pub use core::*;
pub use import::*;
pub use serve::*;
