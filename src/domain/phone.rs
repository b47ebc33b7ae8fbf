//! Phone number canonicalization.

/// Strip every non-digit character from a phone number.
///
/// Conversations are matched against contacts by comparing the normalized
/// form of both numbers, so `+34 600-123-456` and `34600123456` are equal.
///
/// # Example
///
/// ```
/// use crm_outreach::domain::phone::normalize;
///
/// assert_eq!(normalize("+34 600-123-456"), "34600123456");
/// ```
pub fn normalize(number: &str) -> String {
    number.chars().filter(|c| c.is_ascii_digit()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_formatting() {
        assert_eq!(normalize("+34 600-123-456"), "34600123456");
        assert_eq!(normalize("(555) 123.4567"), "5551234567");
        assert_eq!(normalize("34600123456"), "34600123456");
    }

    #[test]
    fn test_normalize_empty_and_no_digits() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("n/a"), "");
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in ["+34 600-123-456", "", "abc", "+1 (555) 123-4567", "٣4"] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once);
        }
    }

    #[test]
    fn test_normalize_ignores_non_ascii_digits() {
        // Arabic-indic digits are not part of dialable numbers here
        assert_eq!(normalize("٣4"), "4");
    }
}
