/// Normalize scraped counter text into an integer.
///
/// Every non-digit character is dropped and the remaining digits are read in
/// order, so `"170,000"`, `"170 000"` and `"170.000 accounts"` all yield
/// `170000`. No digits, or more digits than fit in a `u64`, yields `None`.
pub fn parse_count(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_count_localized_separators() {
        assert_eq!(parse_count("170,000"), Some(170_000));
        assert_eq!(parse_count("170.000"), Some(170_000));
        assert_eq!(parse_count("170 000"), Some(170_000));
        assert_eq!(parse_count("  42  "), Some(42));
    }

    #[test]
    fn test_parse_count_concatenates_digits_in_order() {
        assert_eq!(parse_count("a1b2c3"), Some(123));
        assert_eq!(parse_count("-7"), Some(7));
        assert_eq!(parse_count("0"), Some(0));
        assert_eq!(parse_count("007"), Some(7));
    }

    #[test]
    fn test_parse_count_no_digits() {
        assert_eq!(parse_count(""), None);
        assert_eq!(parse_count("n/a"), None);
        assert_eq!(parse_count("—"), None);
    }

    #[test]
    fn test_parse_count_ignores_non_ascii_digits() {
        // Arabic-Indic digits are not ASCII and are stripped like any letter.
        assert_eq!(parse_count("١٢٣"), None);
    }

    #[test]
    fn test_parse_count_overflow_is_absent() {
        assert_eq!(parse_count("99999999999999999999999"), None);
    }
}
