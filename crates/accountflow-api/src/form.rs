//! Parsing of `application/x-www-form-urlencoded` bodies posted by HTMX forms

use std::collections::HashMap;
use std::str::FromStr;

use crate::error::ApiError;

/// Decoded form fields. Blank values are kept and treated as absent by the
/// `opt*` accessors.
#[derive(Debug, Clone, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
}

fn decode(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    urlencoding::decode(&raw)
        .map(|s| s.into_owned())
        .unwrap_or(raw)
}

impl FormData {
    pub fn parse(body: &str) -> Self {
        let mut fields = HashMap::new();
        for pair in body.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            fields.insert(decode(key), decode(value));
        }
        Self { fields }
    }

    pub fn get(&self, key: &str) -> &str {
        self.fields.get(key).map(|s| s.as_str()).unwrap_or("")
    }

    /// Trimmed value, `None` when missing or blank
    pub fn opt(&self, key: &str) -> Option<String> {
        let value = self.get(key).trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// Checkboxes only submit when ticked
    pub fn checked(&self, key: &str) -> bool {
        matches!(self.get(key).trim(), "on" | "true" | "1")
    }

    pub fn parse_opt<T: FromStr>(&self, key: &str, label: &str) -> Result<Option<T>, ApiError> {
        match self.opt(key) {
            None => Ok(None),
            Some(value) => value
                .parse::<T>()
                .map(Some)
                .map_err(|_| ApiError::bad_request(format!("Invalid {}: {}", label, value))),
        }
    }

    pub fn parse_required<T: FromStr>(&self, key: &str, label: &str) -> Result<T, ApiError> {
        self.parse_opt(key, label)?
            .ok_or_else(|| ApiError::bad_request(format!("{} is required", label)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_parse_decodes_fields() {
        let form = FormData::parse("name=Receitas+de+Servi%C3%A7os&parent_id=&amount=12.50");
        assert_eq!(form.get("name"), "Receitas de Serviços");
        assert_eq!(form.opt("parent_id"), None);
        assert_eq!(form.get("missing"), "");
        let amount: Decimal = form.parse_required("amount", "Amount").unwrap();
        assert_eq!(amount, Decimal::new(1250, 2));
    }

    #[test]
    fn test_parse_reports_bad_values() {
        let form = FormData::parse("amount=abc&active=on");
        assert!(form.parse_required::<Decimal>("amount", "Amount").is_err());
        assert!(form.parse_required::<Decimal>("other", "Other").is_err());
        assert!(form.checked("active"));
        assert!(!form.checked("recurrence"));
    }
}
