use super::types::FactValue;

/// Normalizes numeric presentation text: thousands separators dropped and
/// accountant's parentheses turned into a leading minus. Idempotent.
pub fn normalize(text: &str) -> String {
    let stripped = text.trim().replace(',', "");
    let stripped = stripped.trim();
    if stripped.len() >= 2 && stripped.starts_with('(') && stripped.ends_with(')') {
        format!("-{}", stripped[1..stripped.len() - 1].trim())
    } else {
        stripped.to_string()
    }
}

/// Numeric conversion of presentation text. Text that fails conversion is
/// retained trimmed, not discarded — legitimately narrative concepts exist.
pub fn parse_value(text: &str) -> FactValue {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return FactValue::Missing;
    }
    match normalize(trimmed).parse::<f64>() {
        Ok(n) => FactValue::Numeric(n),
        Err(_) => FactValue::Text(trimmed.to_string()),
    }
}
