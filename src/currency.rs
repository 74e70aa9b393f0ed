//! Currency codec for pt-BR formatted amounts
//!
//! Parses locale strings like `"1.234,56"` (period as thousands
//! separator, comma as decimal separator) into canonical `f64` values and
//! formats canonical values back. Parsing never panics; anything that is
//! not a finite number comes back as `None`.

/// Parse a pt-BR formatted amount.
///
/// Strips all characters except digits, comma, period and minus, drops
/// the periods, converts the first comma to a decimal point and parses
/// the remainder. Empty strings, pure separators and garbage yield
/// `None`.
pub fn parse_brl(value: &str) -> Option<f64> {
    let kept: String = value
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();
    let normalized = kept.replace('.', "").replacen(',', ".", 1);
    match normalized.parse::<f64>() {
        Ok(n) if n.is_finite() => Some(n),
        _ => None,
    }
}

/// Format a canonical value with exactly two decimals, comma decimal
/// separator and period grouping every three integer digits:
/// `1234.5` → `"1.234,50"`.
pub fn format_brl(value: f64) -> String {
    let fixed = format!("{:.2}", value);
    let (int_part, dec_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };

    let bytes = digits.as_bytes();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, b) in bytes.iter().enumerate() {
        if i > 0 && (bytes.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*b as char);
    }

    format!("{sign}{grouped},{dec_part}")
}

/// Parse-then-format convenience for amounts carried as text. Returns an
/// empty string when the input does not parse.
pub fn format_brl_text(value: &str) -> String {
    match parse_brl(value) {
        Some(n) => format_brl(n),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_and_grouped_amounts() {
        assert_eq!(parse_brl("1500,00"), Some(1500.0));
        assert_eq!(parse_brl("1.234,56"), Some(1234.56));
        assert_eq!(parse_brl("R$ 1.500,00"), Some(1500.0));
        assert_eq!(parse_brl("0,10"), Some(0.1));
        assert_eq!(parse_brl("42"), Some(42.0));
    }

    #[test]
    fn garbage_yields_none_without_panicking() {
        assert_eq!(parse_brl(""), None);
        assert_eq!(parse_brl("abc"), None);
        assert_eq!(parse_brl("R$"), None);
        assert_eq!(parse_brl(",,"), None);
        assert_eq!(parse_brl("-"), None);
    }

    #[test]
    fn formats_with_grouping_and_two_decimals() {
        assert_eq!(format_brl(1234.5), "1.234,50");
        assert_eq!(format_brl(0.0), "0,00");
        assert_eq!(format_brl(930.0), "930,00");
        assert_eq!(format_brl(1_000_000.0), "1.000.000,00");
        assert_eq!(format_brl(70.0), "70,00");
    }

    #[test]
    fn format_text_round_trips_canonical_values() {
        assert_eq!(format_brl_text("1500,5"), "1.500,50");
        assert_eq!(format_brl_text("1.234,56"), "1.234,56");
        assert_eq!(format_brl_text("not a number"), "");
    }

    #[test]
    fn round_trip_normalizes() {
        for s in ["1.500,00", "1500", "0,99", "12.345,67"] {
            let n = parse_brl(s).unwrap();
            let formatted = format_brl(n);
            assert_eq!(parse_brl(&formatted), Some(n));
        }
    }
}
