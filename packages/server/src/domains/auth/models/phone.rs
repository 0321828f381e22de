/// Fewest digits a value needs before it is treated as a phone number
pub const MIN_PHONE_DIGITS: usize = 8;

/// Strip everything except ASCII digits.
pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Last `n` characters of an ASCII digit string (or the whole string if shorter).
pub fn last_digits(digits: &str, n: usize) -> &str {
    &digits[digits.len().saturating_sub(n)..]
}

/// Mask a phone number for logs, keeping only the last four digits.
pub fn mask_phone(phone: &str) -> String {
    let digits = digits_only(phone);
    let visible = last_digits(&digits, 4);
    format!("{}{}", "*".repeat(digits.len() - visible.len()), visible)
}

/// Build an SMS destination from a user-supplied number.
///
/// Numbers already written in international form (`+...`) are kept, anything
/// else gets `country_code` prepended.
pub fn format_destination(country_code: &str, phone: &str) -> String {
    let digits = digits_only(phone);
    if phone.trim_start().starts_with('+') {
        return format!("+{}", digits);
    }
    let prefix = digits_only(country_code);
    if prefix.is_empty() {
        digits
    } else {
        format!("+{}{}", prefix, digits)
    }
}
