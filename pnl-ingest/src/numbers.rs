//! Monetary text lexing shared by every extractor. Statement exports write
//! negatives three ways (leading minus, trailing minus, parentheses) and mix
//! in thousands separators and currency symbols.

/// Parse amount text into a signed value. Returns `None` for text that is
/// empty or not numeric after cleaning.
pub(crate) fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw
        .trim()
        .replace('₪', "")
        .replace('$', "")
        .replace(',', "");
    let mut s = cleaned.trim();
    if s.is_empty() {
        return None;
    }

    let mut negative = false;
    if s.starts_with('(') && s.ends_with(')') {
        negative = true;
        s = &s[1..s.len() - 1];
    } else if let Some(rest) = s.strip_suffix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('-') {
        negative = true;
        s = rest;
    } else if let Some(rest) = s.strip_prefix('+') {
        s = rest;
    }

    let value: f64 = s.trim().parse().ok()?;
    Some(if negative { -value } else { value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_and_thousands() {
        assert_eq!(parse_amount("120.50"), Some(120.50));
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("12,345,678.90"), Some(12_345_678.90));
    }

    #[test]
    fn test_negative_conventions() {
        assert_eq!(parse_amount("-1,234.56"), Some(-1234.56));
        assert_eq!(parse_amount("1,234.56-"), Some(-1234.56));
        assert_eq!(parse_amount("(1,234.56)"), Some(-1234.56));
        assert_eq!(parse_amount("+50.00"), Some(50.0));
    }

    #[test]
    fn test_currency_symbols() {
        assert_eq!(parse_amount("₪ 1,200.00"), Some(1200.0));
        assert_eq!(parse_amount("$15"), Some(15.0));
    }

    #[test]
    fn test_rejects_non_numeric() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("   "), None);
        assert_eq!(parse_amount("יתרה"), None);
        assert_eq!(parse_amount("12.3.4"), None);
    }
}
