//! Records domain - the tabular store people authenticate against
//!
//! Responsibilities:
//! - Loading the record table (workbook or JSON) and normalizing its headers
//! - Detecting which columns hold the roll number and phone numbers
//! - Looking rows up by roll number

pub mod columns;
pub mod models;
pub mod spreadsheet;
pub mod table;

pub use columns::{normalize_column, ColumnResolver, ColumnRole};
pub use models::Record;
pub use table::{RecordSourceError, RecordTable};
