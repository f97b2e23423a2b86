// 🔐 Permissions - group-based access policies over registry objects
// Describes who may do what; enforcement belongs to the serving framework

use anyhow::anyhow;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

// ============================================================================
// RESOURCE KINDS & ACTIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Project,
    Entity,
    DataSource,
    FeatureView,
    OnDemandFeatureView,
    FeatureService,
    Permission,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 7] = [
        ResourceKind::Project,
        ResourceKind::Entity,
        ResourceKind::DataSource,
        ResourceKind::FeatureView,
        ResourceKind::OnDemandFeatureView,
        ResourceKind::FeatureService,
        ResourceKind::Permission,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Project => "project",
            ResourceKind::Entity => "entity",
            ResourceKind::DataSource => "data_source",
            ResourceKind::FeatureView => "feature_view",
            ResourceKind::OnDemandFeatureView => "on_demand_feature_view",
            ResourceKind::FeatureService => "feature_service",
            ResourceKind::Permission => "permission",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        ResourceKind::ALL
            .into_iter()
            .find(|k| k.as_str() == normalized || format!("{}s", k.as_str()) == normalized)
            .ok_or_else(|| anyhow!("Unknown resource kind: {}", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Create,
    Describe,
    Update,
    Delete,
    ReadOnline,
    ReadOffline,
    WriteOnline,
    WriteOffline,
}

impl Action {
    pub const READ: [Action; 2] = [Action::ReadOnline, Action::ReadOffline];
    pub const WRITE: [Action; 2] = [Action::WriteOnline, Action::WriteOffline];
    pub const CRUD: [Action; 4] = [Action::Create, Action::Describe, Action::Update, Action::Delete];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "CREATE",
            Action::Describe => "DESCRIBE",
            Action::Update => "UPDATE",
            Action::Delete => "DELETE",
            Action::ReadOnline => "READ_ONLINE",
            Action::ReadOffline => "READ_OFFLINE",
            Action::WriteOnline => "WRITE_ONLINE",
            Action::WriteOffline => "WRITE_OFFLINE",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// PERMISSION
// ============================================================================

/// Grants `actions` on resources of `types` whose names match `name_patterns`
/// (all names when empty) to members of any of `groups`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Permission {
    pub name: String,
    pub types: Vec<ResourceKind>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub name_patterns: Vec<String>,
    pub groups: Vec<String>,
    pub actions: Vec<Action>,
}

impl Permission {
    pub fn new(name: impl Into<String>) -> Self {
        Permission {
            name: name.into(),
            types: Vec::new(),
            name_patterns: Vec::new(),
            groups: Vec::new(),
            actions: Vec::new(),
        }
    }

    pub fn on(mut self, types: &[ResourceKind]) -> Self {
        self.types = types.to_vec();
        self
    }

    pub fn matching(mut self, patterns: &[&str]) -> Self {
        self.name_patterns = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn for_groups(mut self, groups: &[&str]) -> Self {
        self.groups = groups.iter().map(|g| g.to_string()).collect();
        self
    }

    /// Adds to the granted actions; call repeatedly to combine action sets
    pub fn allow(mut self, actions: &[Action]) -> Self {
        for action in actions {
            if !self.actions.contains(action) {
                self.actions.push(*action);
            }
        }
        self
    }

    /// Compile one name pattern as a full-match regular expression
    pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
        Regex::new(&format!("^(?:{})$", pattern))
    }
}

// ============================================================================
// PERMISSION SET
// ============================================================================

struct CompiledPermission {
    permission: Permission,
    patterns: Vec<Regex>,
}

impl CompiledPermission {
    fn covers(&self, kind: ResourceKind, name: &str) -> bool {
        if !self.permission.types.contains(&kind) {
            return false;
        }
        if self.permission.name_patterns.is_empty() {
            return true;
        }
        self.patterns.iter().any(|re| re.is_match(name))
    }
}

/// Effective access for a list of permissions
pub struct PermissionSet {
    compiled: Vec<CompiledPermission>,
}

/// One row of an access listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessEntry {
    pub kind: ResourceKind,
    pub name: String,
    pub actions: BTreeSet<Action>,
    /// Permissions that contributed
    pub granted_by: Vec<String>,
}

impl PermissionSet {
    /// Invalid patterns are dropped with a warning; the validator reports them as errors
    pub fn new(permissions: &[Permission]) -> Self {
        let compiled = permissions
            .iter()
            .map(|p| {
                let patterns = p
                    .name_patterns
                    .iter()
                    .filter_map(|pattern| match Permission::compile_pattern(pattern) {
                        Ok(re) => Some(re),
                        Err(e) => {
                            warn!(permission = %p.name, pattern = %pattern, error = %e, "skipping invalid name pattern");
                            None
                        }
                    })
                    .collect();
                CompiledPermission {
                    permission: p.clone(),
                    patterns,
                }
            })
            .collect();

        PermissionSet { compiled }
    }

    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    /// All groups mentioned by any permission
    pub fn groups(&self) -> BTreeSet<String> {
        self.compiled
            .iter()
            .flat_map(|c| c.permission.groups.iter().cloned())
            .collect()
    }

    fn grants<'a>(
        &'a self,
        group: &'a str,
        kind: ResourceKind,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Permission> + 'a {
        self.compiled
            .iter()
            .filter(move |c| c.permission.groups.iter().any(|g| g == group) && c.covers(kind, name))
            .map(|c| &c.permission)
    }

    pub fn allowed_actions(&self, group: &str, kind: ResourceKind, name: &str) -> BTreeSet<Action> {
        self.grants(group, kind, name)
            .flat_map(|p| p.actions.iter().copied())
            .collect()
    }

    pub fn is_allowed(&self, group: &str, kind: ResourceKind, name: &str, action: Action) -> bool {
        self.grants(group, kind, name).any(|p| p.actions.contains(&action))
    }

    /// Resources the group can do anything with, in input order
    pub fn access_for_group<'a>(
        &self,
        group: &str,
        resources: impl IntoIterator<Item = (ResourceKind, &'a str)>,
    ) -> Vec<AccessEntry> {
        resources
            .into_iter()
            .filter_map(|(kind, name)| {
                let granted_by: Vec<String> =
                    self.grants(group, kind, name).map(|p| p.name.clone()).collect();
                if granted_by.is_empty() {
                    return None;
                }
                Some(AccessEntry {
                    kind,
                    name: name.to_string(),
                    actions: self.allowed_actions(group, kind, name),
                    granted_by,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn readers() -> Vec<Permission> {
        vec![
            Permission::new("analysts-transactions")
                .on(&[ResourceKind::FeatureView])
                .matching(&["transaction_.*", "customer_demographics_fv"])
                .for_groups(&["analysts"])
                .allow(&[Action::Describe])
                .allow(&Action::READ),
            Permission::new("everyone-describes-project")
                .on(&[ResourceKind::Project])
                .for_groups(&["analysts", "engineers"])
                .allow(&[Action::Describe]),
        ]
    }

    #[test]
    fn test_pattern_grants_read_on_matching_views() {
        let set = PermissionSet::new(&readers());

        let actions = set.allowed_actions("analysts", ResourceKind::FeatureView, "transaction_7d_aggregations");
        assert_eq!(
            actions,
            BTreeSet::from([Action::Describe, Action::ReadOnline, Action::ReadOffline])
        );
        assert!(set.is_allowed("analysts", ResourceKind::FeatureView, "customer_demographics_fv", Action::ReadOnline));
    }

    #[test]
    fn test_patterns_are_full_match() {
        let set = PermissionSet::new(&readers());
        // "customer_demographics_fv" must not match a longer name
        assert!(set
            .allowed_actions("analysts", ResourceKind::FeatureView, "customer_demographics_fv_v2")
            .is_empty());
        assert!(set
            .allowed_actions("analysts", ResourceKind::FeatureView, "atm_transaction_stats")
            .is_empty());
    }

    #[test]
    fn test_kind_and_group_must_both_match() {
        let set = PermissionSet::new(&readers());
        assert!(!set.is_allowed("analysts", ResourceKind::FeatureService, "transaction_details", Action::Describe));
        assert!(!set.is_allowed("engineers", ResourceKind::FeatureView, "transaction_details", Action::Describe));
        assert!(set.is_allowed("engineers", ResourceKind::Project, "banking_feature_store", Action::Describe));
        assert!(!set.is_allowed("engineers", ResourceKind::Project, "banking_feature_store", Action::Delete));
    }

    #[test]
    fn test_invalid_pattern_is_skipped() {
        let broken = Permission::new("broken")
            .on(&[ResourceKind::Entity])
            .matching(&["(unclosed"])
            .for_groups(&["g"])
            .allow(&[Action::Describe]);
        let set = PermissionSet::new(&[broken]);
        assert!(set.allowed_actions("g", ResourceKind::Entity, "(unclosed").is_empty());
    }

    #[test]
    fn test_allow_deduplicates_actions() {
        let p = Permission::new("p").allow(&Action::CRUD).allow(&[Action::Describe]);
        assert_eq!(p.actions.len(), 4);
    }

    #[test]
    fn test_access_listing_skips_unreachable_resources() {
        let set = PermissionSet::new(&readers());
        let entries = set.access_for_group(
            "analysts",
            vec![
                (ResourceKind::FeatureView, "transaction_details"),
                (ResourceKind::FeatureView, "atm_usage_30d"),
                (ResourceKind::Project, "banking_feature_store"),
            ],
        );
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].granted_by, vec!["analysts-transactions".to_string()]);
    }

    #[test]
    fn test_resource_kind_parsing() {
        assert_eq!("feature-views".parse::<ResourceKind>().unwrap(), ResourceKind::FeatureView);
        assert_eq!("entity".parse::<ResourceKind>().unwrap(), ResourceKind::Entity);
        assert!("tables".parse::<ResourceKind>().is_err());
    }
}
