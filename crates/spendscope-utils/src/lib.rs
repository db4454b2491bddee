//! Formatting and helper functions

use rust_decimal::Decimal;
use std::sync::atomic::{AtomicU64, Ordering};

/// Format a number with thousands separators
///
/// Handles a leading sign and keeps any fractional part untouched.
pub fn format_number<T: ToString>(n: T) -> String {
    let s = n.to_string();
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s.as_str()),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (unsigned, None),
    };

    let mut grouped = String::new();
    for (count, c) in int_part.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let int_grouped: String = grouped.chars().rev().collect();

    match frac_part {
        Some(frac) => format!("{}{}.{}", sign, int_grouped, frac),
        None => format!("{}{}", sign, int_grouped),
    }
}

/// Display symbol for a currency code
pub fn currency_symbol(code: &str) -> &str {
    match code {
        "EUR" => "€",
        "USD" => "$",
        "GBP" => "£",
        "JPY" => "¥",
        "CHF" => "CHF",
        other => other,
    }
}

/// Format a money amount, e.g. `€1,234.50` or `1,234.50 €`
pub fn format_amount(amount: Decimal, decimal_places: u32, currency: &str, symbol_before: bool) -> String {
    let rounded = amount.round_dp(decimal_places);
    let number = format_number(format!("{:.*}", decimal_places as usize, rounded));
    let symbol = currency_symbol(currency);
    if symbol_before {
        match number.strip_prefix('-') {
            Some(unsigned) => format!("-{}{}", symbol, unsigned),
            None => format!("{}{}", symbol, number),
        }
    } else {
        format!("{} {}", number, symbol)
    }
}

/// Escape text for inclusion in HTML responses
pub fn escape_html(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

static ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique ID with the given prefix
pub fn generate_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let seq = ID_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}-{}", prefix, now, seq)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
        assert_eq!(format_number(-1234), "-1,234");
        assert_eq!(format_number("1234.50"), "1,234.50");
    }

    #[test]
    fn test_format_amount() {
        let amount = Decimal::from_str("1234.5").unwrap();
        assert_eq!(format_amount(amount, 2, "EUR", true), "€1,234.50");
        assert_eq!(format_amount(amount, 2, "EUR", false), "1,234.50 €");
        assert_eq!(format_amount(-amount, 0, "USD", true), "-$1,234");
        assert_eq!(format_amount(Decimal::ZERO, 2, "SEK", false), "0.00 SEK");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<script>alert("x & y")</script>"#),
            "&lt;script&gt;alert(&quot;x &amp; y&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("Café"), "Café");
    }

    #[test]
    fn test_generate_id_is_unique() {
        let a = generate_id("tx");
        let b = generate_id("tx");
        assert!(a.starts_with("tx-"));
        assert_ne!(a, b);
    }
}
