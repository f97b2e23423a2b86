// 🧩 Feature Service - the set of views a model consumes

use serde::{Deserialize, Serialize};

use super::tags::{Governance, Sla};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureService {
    pub name: String,
    /// Feature view or on-demand feature view names
    pub features: Vec<String>,
    pub sla: Sla,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_case: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    pub description: String,
    pub governance: Governance,
}

impl FeatureService {
    pub fn new(name: impl Into<String>, sla: Sla) -> Self {
        FeatureService {
            name: name.into(),
            features: Vec::new(),
            sla,
            use_case: None,
            model_type: None,
            target: None,
            description: String::new(),
            governance: Governance::default(),
        }
    }

    pub fn with_features(mut self, views: &[&str]) -> Self {
        self.features = views.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn with_use_case(mut self, use_case: impl Into<String>) -> Self {
        self.use_case = Some(use_case.into());
        self
    }

    pub fn with_model(mut self, model_type: impl Into<String>, target: impl Into<String>) -> Self {
        self.model_type = Some(model_type.into());
        self.target = Some(target.into());
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

    pub fn references(&self, view: &str) -> bool {
        self.features.iter().any(|f| f == view)
    }
}
