// 🏷️ Governance Tags - ownership, sensitivity, and business metadata
// Typed on our side, flattened to string tags for the feature-store framework

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// ENUMS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DataClassification {
    Public,
    #[default]
    Internal,
    Confidential,
    Restricted,
}

impl DataClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataClassification::Public => "public",
            DataClassification::Internal => "internal",
            DataClassification::Confidential => "confidential",
            DataClassification::Restricted => "restricted",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BusinessImpact {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl BusinessImpact {
    pub fn as_str(&self) -> &'static str {
        match self {
            BusinessImpact::Low => "low",
            BusinessImpact::Medium => "medium",
            BusinessImpact::High => "high",
            BusinessImpact::Critical => "critical",
        }
    }
}

/// Serving latency promise of a feature service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sla {
    RealTime,
    NearRealTime,
    Batch,
}

impl Sla {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sla::RealTime => "real_time",
            Sla::NearRealTime => "near_real_time",
            Sla::Batch => "batch",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

display_as_str!(DataClassification, BusinessImpact, Sla);

// ============================================================================
// GOVERNANCE
// ============================================================================

/// Ownership and sensitivity metadata carried by every definition
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Governance {
    pub team: String,
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    pub classification: DataClassification,
    pub pii: bool,
    pub business_impact: BusinessImpact,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub use_cases: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_frequency: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compliance: Option<String>,
    /// Free-form tags that have no typed slot
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub extra: BTreeMap<String, String>,
}

impl Governance {
    pub fn new(team: impl Into<String>, owner: impl Into<String>) -> Self {
        Governance {
            team: team.into(),
            owner: owner.into(),
            ..Governance::default()
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    pub fn with_classification(mut self, classification: DataClassification) -> Self {
        self.classification = classification;
        self
    }

    pub fn with_pii(mut self, pii: bool) -> Self {
        self.pii = pii;
        self
    }

    pub fn with_impact(mut self, impact: BusinessImpact) -> Self {
        self.business_impact = impact;
        self
    }

    pub fn with_use_cases(mut self, use_cases: &[&str]) -> Self {
        self.use_cases = use_cases.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_refresh(mut self, frequency: impl Into<String>) -> Self {
        self.refresh_frequency = Some(frequency.into());
        self
    }

    pub fn with_compliance(mut self, compliance: impl Into<String>) -> Self {
        self.compliance = Some(compliance.into());
        self
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Flatten into the `tags` map the feature-store framework stores
    pub fn to_tags(&self) -> BTreeMap<String, String> {
        let mut tags = self.extra.clone();
        tags.insert("team".to_string(), self.team.clone());
        tags.insert("owner".to_string(), self.owner.clone());
        tags.insert("data_classification".to_string(), self.classification.to_string());
        tags.insert("pii".to_string(), self.pii.to_string());
        tags.insert("business_impact".to_string(), self.business_impact.to_string());
        if let Some(domain) = &self.domain {
            tags.insert("domain".to_string(), domain.clone());
        }
        if !self.use_cases.is_empty() {
            tags.insert("use_cases".to_string(), self.use_cases.join(","));
        }
        if let Some(refresh) = &self.refresh_frequency {
            tags.insert("refresh_frequency".to_string(), refresh.clone());
        }
        if let Some(compliance) = &self.compliance {
            tags.insert("compliance".to_string(), compliance.clone());
        }
        tags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_flatten_typed_fields() {
        let gov = Governance::new("risk_fraud", "risk-team@bank.com")
            .with_classification(DataClassification::Confidential)
            .with_pii(true)
            .with_impact(BusinessImpact::Critical)
            .with_compliance("pci_dss_aml_compliant")
            .with_tag("model_usage", "fraud_detection");

        let tags = gov.to_tags();
        assert_eq!(tags["team"], "risk_fraud");
        assert_eq!(tags["data_classification"], "confidential");
        assert_eq!(tags["pii"], "true");
        assert_eq!(tags["business_impact"], "critical");
        assert_eq!(tags["compliance"], "pci_dss_aml_compliant");
        assert_eq!(tags["model_usage"], "fraud_detection");
        assert!(!tags.contains_key("domain"));
    }

    #[test]
    fn test_enum_ordering_tracks_sensitivity() {
        assert!(DataClassification::Restricted > DataClassification::Confidential);
        assert!(BusinessImpact::Critical > BusinessImpact::High);
        assert_eq!(Sla::NearRealTime.to_string(), "near_real_time");
    }
}
