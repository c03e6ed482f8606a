//! Visual-order Hebrew reconstruction.
//!
//! Text extracted from the bank's PDFs stores right-to-left runs in visual
//! order, so Hebrew words arrive character-reversed. Reversing the whole
//! line restores Hebrew reading order but flips any embedded Latin or
//! numeric token, so those runs are flipped back afterwards.

fn is_hebrew(c: char) -> bool {
    ('\u{0590}'..='\u{05FF}').contains(&c)
}

pub(crate) fn contains_hebrew(s: &str) -> bool {
    s.chars().any(is_hebrew)
}

// Characters that belong to an embedded forward-reading token
fn is_ltr_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.'
}

/// Restore logical reading order for a visually-stored line. Strings with no
/// Hebrew characters pass through untouched.
pub(crate) fn restore_visual_order(s: &str) -> String {
    if !contains_hebrew(s) {
        return s.to_string();
    }

    let mut out = String::with_capacity(s.len());
    let mut ltr_run: Vec<char> = Vec::new();
    for c in s.chars().rev() {
        if is_ltr_token_char(c) {
            ltr_run.push(c);
        } else {
            out.extend(ltr_run.drain(..).rev());
            out.push(c);
        }
    }
    out.extend(ltr_run.drain(..).rev());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverses_hebrew_words() {
        // "העברת משכורת" stored visually comes out character-reversed
        assert_eq!(restore_visual_order("תרוכשמ תרבעה"), "העברת משכורת");
        assert_eq!(restore_visual_order("תוינק רפוס"), "סופר קניות");
    }

    #[test]
    fn test_latin_only_untouched() {
        assert_eq!(restore_visual_order("PAYPAL *STEAM 42"), "PAYPAL *STEAM 42");
    }

    #[test]
    fn test_embedded_latin_token_stays_forward() {
        // Visual line with a trailing Latin/numeric token
        assert_eq!(restore_visual_order("טנרטניא VISA42"), "VISA42 אינטרנט");
    }

    #[test]
    fn test_embedded_decimal_number_stays_forward() {
        assert_eq!(restore_visual_order("הלמע 12.50"), "12.50 עמלה");
    }

    #[test]
    fn test_hebrew_detection() {
        assert!(contains_hebrew("לאומי"));
        assert!(!contains_hebrew("Leumi"));
    }
}
