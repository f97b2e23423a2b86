// 🔤 Feature Field - one typed column of a feature view's schema

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::datasets::ValueType;

// ============================================================================
// VALIDATION RULES
// ============================================================================

/// Value constraint attached to a field, checked against generated data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum ValidationRule {
    /// Inclusive bounds
    Range { min: f64, max: f64 },
    NonNegative,
    Positive,
    OneOf { values: Vec<String> },
}

impl ValidationRule {
    pub fn range(min: f64, max: f64) -> Self {
        ValidationRule::Range { min, max }
    }

    pub fn one_of(values: &[&str]) -> Self {
        ValidationRule::OneOf {
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Short identifier used in reports and tags
    pub fn name(&self) -> &'static str {
        match self {
            ValidationRule::Range { .. } => "range",
            ValidationRule::NonNegative => "non_negative",
            ValidationRule::Positive => "positive",
            ValidationRule::OneOf { .. } => "one_of",
        }
    }

    pub fn applies_to(&self, dtype: ValueType) -> bool {
        match self {
            ValidationRule::OneOf { .. } => dtype == ValueType::String,
            _ => dtype.is_numeric(),
        }
    }

    pub fn check_number(&self, value: f64) -> bool {
        match self {
            ValidationRule::Range { min, max } => value >= *min && value <= *max,
            ValidationRule::NonNegative => value >= 0.0,
            ValidationRule::Positive => value > 0.0,
            ValidationRule::OneOf { .. } => true,
        }
    }

    pub fn check_str(&self, value: &str) -> bool {
        match self {
            ValidationRule::OneOf { values } => values.iter().any(|v| v == value),
            _ => true,
        }
    }
}

impl fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationRule::Range { min, max } => write!(f, "between {} and {}", min, max),
            ValidationRule::NonNegative => write!(f, ">= 0"),
            ValidationRule::Positive => write!(f, "> 0"),
            ValidationRule::OneOf { values } => write!(f, "one of [{}]", values.join(", ")),
        }
    }
}

// ============================================================================
// FIELD
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub dtype: ValueType,
    pub description: String,
    pub pii: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub validation_rules: Vec<ValidationRule>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub tags: BTreeMap<String, String>,
}

impl Field {
    pub fn new(name: impl Into<String>, dtype: ValueType) -> Self {
        Field {
            name: name.into(),
            dtype,
            description: String::new(),
            pii: false,
            validation_rules: Vec::new(),
            tags: BTreeMap::new(),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_pii(mut self, pii: bool) -> Self {
        self.pii = pii;
        self
    }

    pub fn with_rule(mut self, rule: ValidationRule) -> Self {
        self.validation_rules.push(rule);
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_inclusive() {
        let rule = ValidationRule::range(300.0, 850.0);
        assert!(rule.check_number(300.0));
        assert!(rule.check_number(850.0));
        assert!(!rule.check_number(851.0));
        assert_eq!(rule.to_string(), "between 300 and 850");
    }

    #[test]
    fn test_rule_applicability_by_type() {
        assert!(ValidationRule::NonNegative.applies_to(ValueType::Float64));
        assert!(!ValidationRule::NonNegative.applies_to(ValueType::String));
        assert!(ValidationRule::one_of(&["LOW"]).applies_to(ValueType::String));
        assert!(!ValidationRule::one_of(&["LOW"]).applies_to(ValueType::Int64));
    }

    #[test]
    fn test_one_of_membership() {
        let rule = ValidationRule::one_of(&["LOW", "MEDIUM", "HIGH"]);
        assert!(rule.check_str("MEDIUM"));
        assert!(!rule.check_str("medium"));
        assert!(!ValidationRule::Positive.check_number(0.0));
    }
}
