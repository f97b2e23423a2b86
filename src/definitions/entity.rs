// 🔑 Entity - a join key that feature views are keyed by

use serde::{Deserialize, Serialize};

use super::tags::Governance;
use crate::datasets::ValueType;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    pub join_keys: Vec<String>,
    pub value_type: ValueType,
    pub description: String,
    pub governance: Governance,
}

impl Entity {
    /// Single-key string entity, the only shape the banking repo uses
    pub fn new(name: impl Into<String>, join_key: impl Into<String>) -> Self {
        Entity {
            name: name.into(),
            join_keys: vec![join_key.into()],
            value_type: ValueType::String,
            description: String::new(),
            governance: Governance::default(),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_governance(mut self, governance: Governance) -> Self {
        self.governance = governance;
        self
    }
}
