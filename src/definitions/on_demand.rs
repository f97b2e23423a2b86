// ⚡ On-Demand Feature View - features computed at request time from other views

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::field::Field;
use super::tags::Governance;

// ============================================================================
// FEATURE VALUES
// ============================================================================

/// A single feature value as seen by a transformation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Null,
    Bool(bool),
    Int64(i64),
    Float64(f64),
    String(String),
}

impl FeatureValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FeatureValue::Int64(v) => Some(*v as f64),
            FeatureValue::Float64(v) if v.is_finite() => Some(*v),
            _ => None,
        }
    }
}

/// Feature name → value for one entity row
pub type FeatureRow = BTreeMap<String, FeatureValue>;

// ============================================================================
// TRANSFORMATIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transformation {
    /// `output = input / ceiling * 100`; a missing or null input counts as 0
    ScoreAsPercentage {
        input: String,
        ceiling: f64,
        output: String,
    },
}

impl Transformation {
    pub fn credit_score_risk() -> Self {
        Transformation::ScoreAsPercentage {
            input: "credit_score".to_string(),
            ceiling: 850.0,
            output: "risk_score".to_string(),
        }
    }

    /// Feature names read from the source views
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Transformation::ScoreAsPercentage { input, .. } => vec![input.as_str()],
        }
    }

    /// Feature names produced
    pub fn outputs(&self) -> Vec<&str> {
        match self {
            Transformation::ScoreAsPercentage { output, .. } => vec![output.as_str()],
        }
    }

    pub fn apply(&self, row: &FeatureRow) -> FeatureRow {
        let mut out = FeatureRow::new();
        match self {
            Transformation::ScoreAsPercentage { input, ceiling, output } => {
                let value = row.get(input).and_then(FeatureValue::as_f64).unwrap_or(0.0);
                out.insert(output.clone(), FeatureValue::Float64(value / ceiling * 100.0));
            }
        }
        out
    }
}

// ============================================================================
// ON-DEMAND FEATURE VIEW
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OnDemandFeatureView {
    pub name: String,
    /// Feature view names whose features feed the transformation
    pub sources: Vec<String>,
    pub schema: Vec<Field>,
    pub transformation: Transformation,
    pub description: String,
    pub governance: Governance,
}

impl OnDemandFeatureView {
    pub fn new(name: impl Into<String>, transformation: Transformation) -> Self {
        OnDemandFeatureView {
            name: name.into(),
            sources: Vec::new(),
            schema: Vec::new(),
            transformation,
            description: String::new(),
            governance: Governance::default(),
        }
    }

    pub fn with_sources(mut self, sources: &[&str]) -> Self {
        self.sources = sources.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_schema(mut self, fields: Vec<Field>) -> Self {
        self.schema = fields;
        self
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_governance(mut self, governance: Governance) -> Self {
        self.governance = governance;
        self
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.schema.iter().map(|f| f.name.as_str())
    }

    pub fn evaluate(&self, row: &FeatureRow) -> FeatureRow {
        self.transformation.apply(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(credit_score: FeatureValue) -> FeatureRow {
        let mut row = FeatureRow::new();
        row.insert("credit_score".to_string(), credit_score);
        row
    }

    fn risk(out: &FeatureRow) -> f64 {
        out["risk_score"].as_f64().unwrap()
    }

    #[test]
    fn test_risk_score_is_credit_score_percentage() {
        let t = Transformation::credit_score_risk();
        assert_eq!(risk(&t.apply(&row(FeatureValue::Int64(850)))), 100.0);
        assert!((risk(&t.apply(&row(FeatureValue::Int64(680)))) - 80.0).abs() < 1e-9);
        assert!((risk(&t.apply(&row(FeatureValue::Float64(425.0)))) - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_credit_score_counts_as_zero() {
        let t = Transformation::credit_score_risk();
        assert_eq!(risk(&t.apply(&FeatureRow::new())), 0.0);
        assert_eq!(risk(&t.apply(&row(FeatureValue::Null))), 0.0);
        assert_eq!(risk(&t.apply(&row(FeatureValue::Float64(f64::NAN)))), 0.0);
    }

    #[test]
    fn test_inputs_and_outputs() {
        let t = Transformation::credit_score_risk();
        assert_eq!(t.inputs(), vec!["credit_score"]);
        assert_eq!(t.outputs(), vec!["risk_score"]);
    }
}
