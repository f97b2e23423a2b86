// 📊 Feature View - a named group of features over one source, keyed by entities

use chrono::Duration;
use serde::{Deserialize, Serialize};

use super::field::Field;
use super::tags::Governance;

const SECONDS_PER_DAY: u64 = 86_400;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureView {
    pub name: String,
    /// Entity names, not join keys
    pub entities: Vec<String>,
    pub ttl_seconds: u64,
    pub schema: Vec<Field>,
    /// Data source name
    pub source: String,
    pub online: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregation_window: Option<String>,
    pub description: String,
    pub governance: Governance,
}

impl FeatureView {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        FeatureView {
            name: name.into(),
            entities: Vec::new(),
            ttl_seconds: 0,
            schema: Vec::new(),
            source: source.into(),
            online: true,
            aggregation_window: None,
            description: String::new(),
            governance: Governance::default(),
        }
    }

    pub fn with_entities(mut self, entities: &[&str]) -> Self {
        self.entities = entities.iter().map(|e| e.to_string()).collect();
        self
    }

    pub fn with_ttl_days(mut self, days: u64) -> Self {
        self.ttl_seconds = days * SECONDS_PER_DAY;
        self
    }

    pub fn with_schema(mut self, fields: Vec<Field>) -> Self {
        self.schema = fields;
        self
    }

    /// Window the features summarize, e.g. `7d`
    pub fn with_window_days(mut self, days: u64) -> Self {
        self.aggregation_window = Some(format!("{}d", days));
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

    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_seconds as i64)
    }

    pub fn ttl_days(&self) -> u64 {
        self.ttl_seconds / SECONDS_PER_DAY
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.schema.iter().find(|f| f.name == name)
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.schema.iter().map(|f| f.name.as_str())
    }

    /// Any field flagged as PII, or the view as a whole
    pub fn contains_pii(&self) -> bool {
        self.governance.pii || self.schema.iter().any(|f| f.pii)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::ValueType;

    #[test]
    fn test_builder_sets_ttl_and_window() {
        let view = FeatureView::new("transaction_7d_aggregations", "transaction_data_source")
            .with_entities(&["customer"])
            .with_ttl_days(7)
            .with_window_days(7)
            .with_schema(vec![Field::new("amount", ValueType::Float64)]);

        assert_eq!(view.ttl_seconds, 604_800);
        assert_eq!(view.ttl_days(), 7);
        assert_eq!(view.ttl(), Duration::days(7));
        assert_eq!(view.aggregation_window.as_deref(), Some("7d"));
        assert!(view.field("amount").is_some());
        assert!(view.online);
    }

    #[test]
    fn test_field_level_pii_marks_view() {
        let view = FeatureView::new("v", "s")
            .with_schema(vec![Field::new("income", ValueType::Int64).with_pii(true)]);
        assert!(!view.governance.pii);
        assert!(view.contains_pii());
    }
}
