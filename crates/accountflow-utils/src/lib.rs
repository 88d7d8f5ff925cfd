//! Utility functions and helpers

use rust_decimal::{Decimal, RoundingStrategy};

/// Format an amount with grouping and decimal separators,
/// e.g. `1234.5` -> `1.234,50` with `"."` and `","`.
pub fn format_amount(value: Decimal, decimals: u32, thousands_sep: &str, decimal_sep: &str) -> String {
    let rounded = value.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.*}", decimals as usize, rounded.abs());
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i.to_string(), f.to_string()),
        None => (text.clone(), String::new()),
    };

    let mut grouped = String::new();
    for (count, c) in int_part.chars().rev().enumerate() {
        if count > 0 && count % 3 == 0 {
            grouped.push_str(&thousands_sep.chars().rev().collect::<String>());
        }
        grouped.push(c);
    }
    let mut result: String = grouped.chars().rev().collect();
    if !frac_part.is_empty() {
        result.push_str(decimal_sep);
        result.push_str(&frac_part);
    }
    if negative {
        result.insert(0, '-');
    }
    result
}

/// Escape text for interpolation into HTML fragments
pub fn escape_html(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Generate a unique record identifier
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Account and plan names are stored trimmed and uppercased
pub fn normalize_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// Case-insensitive substring match used by list searches
pub fn matches_search(haystack: &str, query: &str) -> bool {
    query.is_empty() || haystack.to_lowercase().contains(&query.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_format_amount_brl() {
        let v = Decimal::from_str("1234567.891").unwrap();
        assert_eq!(format_amount(v, 2, ".", ","), "1.234.567,89");
    }

    #[test]
    fn test_format_amount_negative_and_small() {
        assert_eq!(format_amount(Decimal::from_str("-5.5").unwrap(), 2, ".", ","), "-5,50");
        assert_eq!(format_amount(Decimal::ZERO, 2, ",", "."), "0.00");
        assert_eq!(format_amount(Decimal::from_str("999").unwrap(), 0, ",", "."), "999");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("<b>A & B</b>"), "&lt;b&gt;A &amp; B&lt;/b&gt;");
        assert_eq!(escape_html("it's"), "it&#39;s");
    }

    #[test]
    fn test_generate_id_is_unique() {
        assert_ne!(generate_id(), generate_id());
        assert_eq!(generate_id().len(), 36);
    }

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  ativo circulante "), "ATIVO CIRCULANTE");
    }

    #[test]
    fn test_matches_search() {
        assert!(matches_search("Receitas Operacionais", "operac"));
        assert!(matches_search("anything", ""));
        assert!(!matches_search("Despesas", "receita"));
    }
}
