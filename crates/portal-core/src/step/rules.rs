//! Evaluador de reglas por campo.
//!
//! Las reglas se evalúan en orden y gana el primer fallo. Todas las reglas
//! salvo `Required` ignoran campos sin valor (null, ausente o string en
//! blanco), de modo que un campo opcional vacío nunca produce error.
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::MSG_REQUIRED;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FieldRule {
    Required,
    MinLength(usize),
    MaxLength(usize),
    OneOf(Vec<String>),
    /// Número (o string numérico).
    Numeric,
    /// Número dentro de `[min, max]`.
    Range { min: f64, max: f64 },
}

impl FieldRule {
    pub fn one_of<I, S>(values: I) -> Self
        where I: IntoIterator<Item = S>,
              S: Into<String>
    {
        Self::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Evalúa la regla; `Some(mensaje)` si falla.
    pub fn check(&self, value: Option<&Value>) -> Option<String> {
        if is_unset(value) {
            return match self {
                Self::Required => Some(MSG_REQUIRED.to_string()),
                _ => None,
            };
        }
        let value = value?;
        match self {
            Self::Required => None,
            Self::MinLength(n) => {
                let len = text_len(value)?;
                (len < *n).then(|| format!("must be at least {n} characters"))
            }
            Self::MaxLength(n) => {
                let len = text_len(value)?;
                (len > *n).then(|| format!("must be at most {n} characters"))
            }
            Self::OneOf(allowed) => {
                let ok = value.as_str().map(|s| allowed.iter().any(|a| a == s)).unwrap_or(false);
                (!ok).then(|| format!("must be one of: {}", allowed.join(", ")))
            }
            Self::Numeric => as_number(value).is_none().then(|| "must be a number".to_string()),
            Self::Range { min, max } => match as_number(value) {
                Some(n) if n >= *min && n <= *max => None,
                _ => Some(format!("must be between {min} and {max}")),
            },
        }
    }
}

/// Primer fallo de una lista de reglas.
pub fn first_failure(rules: &[FieldRule], value: Option<&Value>) -> Option<String> {
    rules.iter().find_map(|r| r.check(value))
}

pub fn is_unset(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// Interpreta números y strings numéricos ("49.90").
pub fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}

fn text_len(value: &Value) -> Option<usize> {
    value.as_str().map(|s| s.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn required_treats_blank_as_unset() {
        assert_eq!(FieldRule::Required.check(None).as_deref(), Some("required"));
        assert_eq!(FieldRule::Required.check(Some(&json!("  "))).as_deref(), Some("required"));
        assert_eq!(FieldRule::Required.check(Some(&Value::Null)).as_deref(), Some("required"));
        assert!(FieldRule::Required.check(Some(&json!(false))).is_none());
    }

    #[test]
    fn optional_rules_skip_unset_values() {
        assert!(FieldRule::MinLength(3).check(None).is_none());
        assert!(FieldRule::Range { min: 1.0, max: 2.0 }.check(Some(&json!(""))).is_none());
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        let rule = FieldRule::MaxLength(4);
        assert!(rule.check(Some(&json!("ñañá"))).is_none());
        assert_eq!(rule.check(Some(&json!("ñañás"))).as_deref(), Some("must be at most 4 characters"));
    }

    #[test]
    fn range_accepts_numeric_strings() {
        let rule = FieldRule::Range { min: 1.0, max: 10.0 };
        assert!(rule.check(Some(&json!("3"))).is_none());
        assert!(rule.check(Some(&json!(11))).is_some());
        assert!(rule.check(Some(&json!("many"))).is_some());
        assert_eq!(FieldRule::Numeric.check(Some(&json!("abc"))).as_deref(), Some("must be a number"));
    }

    #[test]
    fn first_failure_wins() {
        let rules = [FieldRule::Required, FieldRule::one_of(["low", "high"])];
        assert_eq!(first_failure(&rules, None).as_deref(), Some("required"));
        assert_eq!(first_failure(&rules, Some(&json!("urgent"))).as_deref(), Some("must be one of: low, high"));
        assert!(first_failure(&rules, Some(&json!("low"))).is_none());
    }
}
