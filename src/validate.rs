// Pure format checks for the two constrained input fields.
// Syntactic only: "2099-13-99" is a well-formed date string here.

use once_cell::sync::Lazy;
use regex::Regex;

static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());
static AMOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(\.\d{1,2})?$").unwrap());

/// True iff the whole string is `YYYY-MM-DD` shaped.
pub fn is_valid_date(s: &str) -> bool {
    DATE_PATTERN.is_match(s)
}

/// True iff the whole string is a non-negative decimal with at most two
/// fraction digits. No sign, no exponent, no grouping.
pub fn is_valid_amount(s: &str) -> bool {
    AMOUNT_PATTERN.is_match(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_dates() {
        assert!(is_valid_date("2024-01-05"));
        assert!(is_valid_date("1999-12-31"));
        // Syntactic check only: calendar nonsense still passes
        assert!(is_valid_date("2099-13-99"));
    }

    #[test]
    fn test_invalid_dates() {
        assert!(!is_valid_date(""));
        assert!(!is_valid_date("24-1-5"));
        assert!(!is_valid_date("2024/01/05"));
        assert!(!is_valid_date("2024-01-05 "));
        assert!(!is_valid_date("x2024-01-05"));
        assert!(!is_valid_date("January 5, 2024"));
    }

    #[test]
    fn test_valid_amounts() {
        assert!(is_valid_amount("12"));
        assert!(is_valid_amount("12.5"));
        assert!(is_valid_amount("12.50"));
        assert!(is_valid_amount("0"));
        assert!(is_valid_amount("0.99"));
    }

    #[test]
    fn test_invalid_amounts() {
        assert!(!is_valid_amount(""));
        assert!(!is_valid_amount("12.555"));
        assert!(!is_valid_amount("-5"));
        assert!(!is_valid_amount("+5"));
        assert!(!is_valid_amount("abc"));
        assert!(!is_valid_amount("12."));
        assert!(!is_valid_amount(".50"));
        assert!(!is_valid_amount("1e3"));
        assert!(!is_valid_amount("1,200"));
    }
}
