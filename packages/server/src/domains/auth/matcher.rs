use super::models::digits_only;
use crate::domains::records::Record;

/// Suffix lengths compared, longest first
const SUFFIX_WINDOWS: [usize; 3] = [10, 9, 8];

/// Whether `claimed_phone` plausibly belongs to `record`.
///
/// Stored numbers may carry a country code or trunk prefix, so only trailing
/// digits are compared. A match in any phone field is enough.
pub fn phone_matches<S: AsRef<str>>(
    record: &Record,
    claimed_phone: &str,
    phone_fields: &[S],
) -> bool {
    let claimed = digits_only(claimed_phone);

    phone_fields.iter().any(|field| {
        let stored = digits_only(&record.text(field.as_ref()));
        if stored.is_empty() {
            return false;
        }
        SUFFIX_WINDOWS.iter().any(|&n| {
            claimed.len() >= n
                && stored.len() >= n
                && claimed[claimed.len() - n..] == stored[stored.len() - n..]
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Record {
        vec![
            ("Roll No".to_string(), json!("A101")),
            ("Mobile".to_string(), json!("9876543210")),
            ("Parent Phone".to_string(), json!(null)),
            ("WhatsApp".to_string(), json!(919812345678.0)),
        ]
        .into_iter()
        .collect()
    }

    const FIELDS: [&str; 3] = ["Mobile", "Parent Phone", "WhatsApp"];

    #[test]
    fn test_exact_match() {
        assert!(phone_matches(&record(), "9876543210", &FIELDS));
    }

    #[test]
    fn test_country_code_and_punctuation() {
        assert!(phone_matches(&record(), "+91 98765-43210", &FIELDS));
        assert!(phone_matches(&record(), "0 98765 43210", &FIELDS));
    }

    #[test]
    fn test_any_field_matches() {
        assert!(phone_matches(&record(), "98123 45678", &FIELDS));
    }

    #[test]
    fn test_eight_digit_suffix() {
        // Only the last eight digits are available on the claim
        assert!(phone_matches(&record(), "76543210", &FIELDS));
    }

    #[test]
    fn test_mismatch() {
        assert!(!phone_matches(&record(), "9876543211", &FIELDS));
        assert!(!phone_matches(&record(), "1234567890", &FIELDS));
    }

    #[test]
    fn test_short_claim_never_matches() {
        assert!(!phone_matches(&record(), "3210", &FIELDS));
        assert!(!phone_matches(&record(), "", &FIELDS));
    }

    #[test]
    fn test_empty_and_missing_fields_skipped() {
        assert!(!phone_matches(&record(), "9876543210", &["Parent Phone", "Unknown"]));
        let no_fields: [&str; 0] = [];
        assert!(!phone_matches(&record(), "9876543210", &no_fields));
    }
}
