use std::fmt;

use super::phone::{digits_only, last_digits};

const SEPARATOR: &str = "::";

/// Lookup key binding an identifier to the trailing digits of a phone number.
///
/// Identical `(identifier, phone)` pairs that differ only in case, surrounding
/// whitespace, phone punctuation or a country-code prefix map to the same key
/// as long as their trailing digits agree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationKey(String);

impl CorrelationKey {
    pub fn derive(identifier: &str, phone: &str) -> Self {
        let digits = digits_only(phone);
        let window = if digits.len() >= 10 { 10 } else { 8 };
        Self(format!(
            "{}{}{}",
            identifier.trim().to_lowercase(),
            SEPARATOR,
            last_digits(&digits, window)
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
