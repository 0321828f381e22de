//! Column detection for uploaded record tables.
//!
//! Table headers are free-form ("University Roll No.", "Mobile No", "WhatsApp"),
//! so roles are resolved by pattern with a substring fallback.

use std::fmt;

use lazy_static::lazy_static;
use regex::Regex;

/// Semantic role a column can play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnRole {
    Identifier,
    Phone,
}

impl fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRole::Identifier => f.write_str("roll number"),
            ColumnRole::Phone => f.write_str("mobile/phone"),
        }
    }
}

lazy_static! {
    static ref IDENTIFIER_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)^(university\s*)?roll\s*no\.?$").unwrap(),
        Regex::new(r"(?i)^(roll\s*no\.?|roll\s*number)$").unwrap(),
        Regex::new(r"(?i)^\s*university\s*roll\s*no\.?\s*$").unwrap(),
        Regex::new(r"(?i)^\s*enrollment\s*no\.?\s*$").unwrap(),
    ];
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

const PHONE_KEYWORDS: [&str; 4] = ["mobile", "phone", "contact", "whatsapp"];

/// Collapse runs of whitespace and trim a header name.
pub fn normalize_column(name: &str) -> String {
    WHITESPACE.replace_all(name, " ").trim().to_string()
}

/// Maps column roles to the header names of one table.
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    identifier: Option<String>,
    phones: Vec<String>,
}

impl ColumnResolver {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        Self {
            identifier: find_identifier_column(columns),
            phones: find_phone_columns(columns),
        }
    }

    /// First column playing `role`, if any.
    pub fn resolve(&self, role: ColumnRole) -> Option<&str> {
        match role {
            ColumnRole::Identifier => self.identifier.as_deref(),
            ColumnRole::Phone => self.phones.first().map(String::as_str),
        }
    }

    /// Every column playing `role`, in table order.
    pub fn resolve_all(&self, role: ColumnRole) -> Vec<&str> {
        match role {
            ColumnRole::Identifier => self.identifier.as_deref().into_iter().collect(),
            ColumnRole::Phone => self.phones.iter().map(String::as_str).collect(),
        }
    }
}

fn find_identifier_column<S: AsRef<str>>(columns: &[S]) -> Option<String> {
    columns
        .iter()
        .map(AsRef::as_ref)
        .find(|c| IDENTIFIER_PATTERNS.iter().any(|p| p.is_match(c)))
        .or_else(|| {
            columns
                .iter()
                .map(AsRef::as_ref)
                .find(|c| c.to_lowercase().contains("roll"))
        })
        .map(str::to_string)
}

fn find_phone_columns<S: AsRef<str>>(columns: &[S]) -> Vec<String> {
    columns
        .iter()
        .map(AsRef::as_ref)
        .filter(|c| {
            let lower = c.to_lowercase();
            PHONE_KEYWORDS.iter().any(|k| lower.contains(k))
        })
        .map(str::to_string)
        .collect()
}
