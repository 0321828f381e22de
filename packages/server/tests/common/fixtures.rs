//! Test fixtures for building record tables.

use indexmap::IndexMap;
use rollcall_core::domains::records::RecordTable;
use serde_json::{json, Value};

pub const ROLL: &str = "A101";
pub const STORED_MOBILE: &str = "9876543210";
pub const CLAIMED_MOBILE: &str = "+91 98765-43210";

/// Class roster with a free-form header layout.
pub fn roster_rows() -> Value {
    json!([
        {
            "University Roll No.": "A101",
            "Name": "Asha Verma",
            "Mobile No": STORED_MOBILE,
            "Parent Phone": "",
            "CGPA": 8.7
        },
        {
            "University Roll No.": "B202",
            "Name": "Ravi Kumar",
            "Mobile No": 919123456789u64,
            "Parent Phone": "+91 99887 76655",
            "CGPA": 7.9
        },
        {
            "University Roll No.": "C303",
            "Name": "Meera Nair",
            "Mobile No": null,
            "Parent Phone": null,
            "CGPA": 9.1
        }
    ])
}

/// Roster table used by most tests
pub fn roster_table() -> RecordTable {
    table_from(roster_rows())
}

/// Table that has a roll number column but no phone-like column
pub fn table_without_phone_column() -> RecordTable {
    table_from(json!([
        { "Roll No": "A101", "Name": "Asha Verma" }
    ]))
}

pub fn table_from(value: Value) -> RecordTable {
    let rows: Vec<IndexMap<String, Value>> =
        serde_json::from_value(value).expect("fixture rows are valid");
    RecordTable::from_rows(rows)
}
