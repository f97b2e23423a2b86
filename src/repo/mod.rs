// 🏦 Feature Repository - every definition of the banking feature store
// Lookup, listing, and JSON export over plain definition lists

mod access;
mod columns;
mod entities;
mod services;
mod views;

use anyhow::{anyhow, Result};
use serde::Serialize;
use serde_json::{json, Value};

use crate::definitions::{DataSource, Entity, FeatureService, FeatureView, OnDemandFeatureView};
use crate::permissions::{Permission, PermissionSet, ResourceKind};

pub use access::{ANALYTICS_TEAM, CUSTOMER_ENGAGEMENT, DATA_ENGINEERS, DATA_SCIENTISTS};
pub use views::RISK_SCORE_VIEW;

pub const DEFAULT_PROJECT: &str = "banking_feature_store";

// ============================================================================
// REPO
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRepo {
    pub project: String,
    pub entities: Vec<Entity>,
    pub data_sources: Vec<DataSource>,
    pub feature_views: Vec<FeatureView>,
    pub on_demand_feature_views: Vec<OnDemandFeatureView>,
    pub feature_services: Vec<FeatureService>,
    pub permissions: Vec<Permission>,
}

/// One named definition, serialized for export or the catalog
#[derive(Debug, Clone, PartialEq)]
pub struct RepoObject {
    pub kind: ResourceKind,
    pub name: String,
    pub spec: Value,
}

/// A service with its feature references resolved
#[derive(Debug)]
pub struct ResolvedService<'a> {
    pub service: &'a FeatureService,
    pub feature_views: Vec<&'a FeatureView>,
    pub on_demand_feature_views: Vec<&'a OnDemandFeatureView>,
}

impl ResolvedService<'_> {
    /// Qualified `view:feature` names the service exposes
    pub fn feature_refs(&self) -> Vec<String> {
        let plain = self
            .feature_views
            .iter()
            .flat_map(|v| v.feature_names().map(move |f| format!("{}:{}", v.name, f)));
        let derived = self
            .on_demand_feature_views
            .iter()
            .flat_map(|v| v.feature_names().map(move |f| format!("{}:{}", v.name, f)));
        plain.chain(derived).collect()
    }
}

impl FeatureRepo {
    pub fn new(project: impl Into<String>) -> Self {
        FeatureRepo {
            project: project.into(),
            entities: Vec::new(),
            data_sources: Vec::new(),
            feature_views: Vec::new(),
            on_demand_feature_views: Vec::new(),
            feature_services: Vec::new(),
            permissions: Vec::new(),
        }
    }

    /// The full banking feature store
    pub fn banking() -> Self {
        FeatureRepo {
            project: DEFAULT_PROJECT.to_string(),
            entities: entities::entities(),
            data_sources: entities::data_sources(),
            feature_views: views::feature_views(),
            on_demand_feature_views: views::on_demand_views(),
            feature_services: services::feature_services(),
            permissions: access::permissions(),
        }
    }

    pub fn with_project(mut self, project: impl Into<String>) -> Self {
        self.project = project.into();
        self
    }

    // ------------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------------

    pub fn register_entity(&mut self, entity: Entity) {
        self.entities.push(entity);
    }

    pub fn register_data_source(&mut self, source: DataSource) {
        self.data_sources.push(source);
    }

    pub fn register_feature_view(&mut self, view: FeatureView) {
        self.feature_views.push(view);
    }

    pub fn register_on_demand_feature_view(&mut self, view: OnDemandFeatureView) {
        self.on_demand_feature_views.push(view);
    }

    pub fn register_feature_service(&mut self, service: FeatureService) {
        self.feature_services.push(service);
    }

    pub fn register_permission(&mut self, permission: Permission) {
        self.permissions.push(permission);
    }

    // ------------------------------------------------------------------------
    // Lookup
    // ------------------------------------------------------------------------

    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn data_source(&self, name: &str) -> Option<&DataSource> {
        self.data_sources.iter().find(|s| s.name == name)
    }

    pub fn feature_view(&self, name: &str) -> Option<&FeatureView> {
        self.feature_views.iter().find(|v| v.name == name)
    }

    pub fn on_demand_feature_view(&self, name: &str) -> Option<&OnDemandFeatureView> {
        self.on_demand_feature_views.iter().find(|v| v.name == name)
    }

    pub fn feature_service(&self, name: &str) -> Option<&FeatureService> {
        self.feature_services.iter().find(|s| s.name == name)
    }

    pub fn permission(&self, name: &str) -> Option<&Permission> {
        self.permissions.iter().find(|p| p.name == name)
    }

    /// Source behind a feature view, if both exist
    pub fn source_of(&self, view: &FeatureView) -> Option<&DataSource> {
        self.data_source(&view.source)
    }

    /// Feature views reading from the given source
    pub fn views_on_source<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a FeatureView> + 'a {
        self.feature_views.iter().filter(move |v| v.source == source)
    }

    pub fn resolve_service(&self, name: &str) -> Result<ResolvedService<'_>> {
        let service = self
            .feature_service(name)
            .ok_or_else(|| anyhow!("Feature service not found: {}", name))?;

        let mut feature_views = Vec::new();
        let mut on_demand_feature_views = Vec::new();
        for reference in &service.features {
            if let Some(view) = self.feature_view(reference) {
                feature_views.push(view);
            } else if let Some(view) = self.on_demand_feature_view(reference) {
                on_demand_feature_views.push(view);
            } else {
                return Err(anyhow!(
                    "Feature service {} references unknown view {}",
                    name,
                    reference
                ));
            }
        }

        Ok(ResolvedService {
            service,
            feature_views,
            on_demand_feature_views,
        })
    }

    // ------------------------------------------------------------------------
    // Listing
    // ------------------------------------------------------------------------

    pub fn count(&self, kind: ResourceKind) -> usize {
        match kind {
            ResourceKind::Project => 1,
            ResourceKind::Entity => self.entities.len(),
            ResourceKind::DataSource => self.data_sources.len(),
            ResourceKind::FeatureView => self.feature_views.len(),
            ResourceKind::OnDemandFeatureView => self.on_demand_feature_views.len(),
            ResourceKind::FeatureService => self.feature_services.len(),
            ResourceKind::Permission => self.permissions.len(),
        }
    }

    pub fn names(&self, kind: ResourceKind) -> Vec<&str> {
        match kind {
            ResourceKind::Project => vec![self.project.as_str()],
            ResourceKind::Entity => self.entities.iter().map(|e| e.name.as_str()).collect(),
            ResourceKind::DataSource => self.data_sources.iter().map(|s| s.name.as_str()).collect(),
            ResourceKind::FeatureView => self.feature_views.iter().map(|v| v.name.as_str()).collect(),
            ResourceKind::OnDemandFeatureView => self
                .on_demand_feature_views
                .iter()
                .map(|v| v.name.as_str())
                .collect(),
            ResourceKind::FeatureService => self.feature_services.iter().map(|s| s.name.as_str()).collect(),
            ResourceKind::Permission => self.permissions.iter().map(|p| p.name.as_str()).collect(),
        }
    }

    /// Every (kind, name) pair, project first
    pub fn resources(&self) -> Vec<(ResourceKind, &str)> {
        ResourceKind::ALL
            .into_iter()
            .flat_map(|kind| self.names(kind).into_iter().map(move |name| (kind, name)))
            .collect()
    }

    pub fn permission_set(&self) -> PermissionSet {
        PermissionSet::new(&self.permissions)
    }

    // ------------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------------

    fn project_spec(&self) -> Value {
        json!({
            "name": self.project,
            "entities": self.entities.len(),
            "data_sources": self.data_sources.len(),
            "feature_views": self.feature_views.len(),
            "on_demand_feature_views": self.on_demand_feature_views.len(),
            "feature_services": self.feature_services.len(),
            "permissions": self.permissions.len(),
        })
    }

    /// Every definition as a JSON object, in `resources()` order
    pub fn objects(&self) -> Result<Vec<RepoObject>> {
        fn collect<T: Serialize>(
            kind: ResourceKind,
            items: &[T],
            name: impl Fn(&T) -> &str,
            out: &mut Vec<RepoObject>,
        ) -> Result<()> {
            for item in items {
                out.push(RepoObject {
                    kind,
                    name: name(item).to_string(),
                    spec: serde_json::to_value(item)?,
                });
            }
            Ok(())
        }

        let mut out = vec![RepoObject {
            kind: ResourceKind::Project,
            name: self.project.clone(),
            spec: self.project_spec(),
        }];
        collect(ResourceKind::Entity, &self.entities, |e| &e.name, &mut out)?;
        collect(ResourceKind::DataSource, &self.data_sources, |s| &s.name, &mut out)?;
        collect(ResourceKind::FeatureView, &self.feature_views, |v| &v.name, &mut out)?;
        collect(
            ResourceKind::OnDemandFeatureView,
            &self.on_demand_feature_views,
            |v| &v.name,
            &mut out,
        )?;
        collect(ResourceKind::FeatureService, &self.feature_services, |s| &s.name, &mut out)?;
        collect(ResourceKind::Permission, &self.permissions, |p| &p.name, &mut out)?;
        Ok(out)
    }

    /// JSON export: one object by name, all objects of a kind, or the whole repo
    /// grouped by kind
    pub fn describe(&self, kind: Option<ResourceKind>, name: Option<&str>) -> Result<Value> {
        let objects = self.objects()?;

        if let Some(name) = name {
            let found: Vec<&RepoObject> = objects
                .iter()
                .filter(|o| o.name == name && kind.map_or(true, |k| o.kind == k))
                .collect();
            return match found.as_slice() {
                [] => Err(anyhow!("No definition named {}", name)),
                [one] => Ok(json!({ "kind": one.kind, "name": one.name, "spec": one.spec })),
                many => Ok(Value::Array(
                    many.iter()
                        .map(|o| json!({ "kind": o.kind, "name": o.name, "spec": o.spec }))
                        .collect(),
                )),
            };
        }

        if let Some(kind) = kind {
            let specs: Vec<Value> = objects
                .into_iter()
                .filter(|o| o.kind == kind)
                .map(|o| o.spec)
                .collect();
            return Ok(Value::Array(specs));
        }

        let mut grouped = serde_json::Map::new();
        for object in objects {
            let entry = grouped
                .entry(object.kind.as_str().to_string())
                .or_insert_with(|| Value::Array(Vec::new()));
            if let Value::Array(items) = entry {
                items.push(object.spec);
            }
        }
        Ok(Value::Object(grouped))
    }
}

impl Default for FeatureRepo {
    fn default() -> Self {
        FeatureRepo::banking()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::FeatureValue;
    use crate::permissions::Action;

    #[test]
    fn test_banking_repo_counts() {
        let repo = FeatureRepo::banking();
        assert_eq!(repo.entities.len(), 4);
        assert_eq!(repo.data_sources.len(), 5);
        assert_eq!(repo.feature_views.len(), 17);
        assert_eq!(repo.on_demand_feature_views.len(), 1);
        assert_eq!(repo.feature_services.len(), 9);
        assert_eq!(repo.permissions.len(), 21);
        assert_eq!(repo.resources().len(), 1 + 4 + 5 + 17 + 1 + 9 + 21);
    }

    #[test]
    fn test_lookup_by_name() {
        let repo = FeatureRepo::banking();
        let view = repo.feature_view("transaction_30d_aggregations").unwrap();
        assert_eq!(view.ttl_days(), 30);
        assert_eq!(repo.source_of(view).unwrap().name, "transaction_data_source");
        assert_eq!(repo.entity("atm_location").unwrap().join_keys, vec!["atm_id".to_string()]);
        assert!(repo.feature_view("missing").is_none());
        assert_eq!(repo.views_on_source("call_center_data_source").count(), 2);
    }

    #[test]
    fn test_comprehensive_service_covers_every_view() {
        let repo = FeatureRepo::banking();
        let resolved = repo.resolve_service("comprehensive_banking_service").unwrap();
        assert_eq!(resolved.feature_views.len(), repo.feature_views.len());
        assert!(resolved.on_demand_feature_views.is_empty());
    }

    #[test]
    fn test_on_demand_service_resolves_transformation() {
        let repo = FeatureRepo::banking();
        let resolved = repo.resolve_service("simple_ondemand_risk_service").unwrap();
        assert_eq!(resolved.on_demand_feature_views.len(), 1);
        assert!(resolved
            .feature_refs()
            .contains(&"calculate_simple_risk_score:risk_score".to_string()));

        let odfv = resolved.on_demand_feature_views[0];
        let row = [("credit_score".to_string(), FeatureValue::Int64(425))].into_iter().collect();
        let out = odfv.evaluate(&row);
        assert_eq!(out["risk_score"], FeatureValue::Float64(50.0));
    }

    #[test]
    fn test_resolve_unknown_service_fails() {
        let repo = FeatureRepo::banking();
        assert!(repo.resolve_service("nope").is_err());

        let mut broken = FeatureRepo::new("test");
        broken.register_feature_service(
            FeatureService::new("svc", crate::definitions::Sla::Batch).with_features(&["ghost"]),
        );
        assert!(broken.resolve_service("svc").is_err());
    }

    #[test]
    fn test_describe_by_kind_and_name() {
        let repo = FeatureRepo::banking();

        let views = repo.describe(Some(ResourceKind::FeatureView), None).unwrap();
        assert_eq!(views.as_array().unwrap().len(), 17);

        let one = repo.describe(None, Some("customer_charter_service")).unwrap();
        assert_eq!(one["kind"], "feature_service");
        assert_eq!(one["spec"]["governance"]["compliance"], "gdpr_ccpa_compliant");

        let all = repo.describe(None, None).unwrap();
        assert_eq!(all["permission"].as_array().unwrap().len(), 21);
        assert_eq!(all["project"][0]["name"], DEFAULT_PROJECT);

        assert!(repo.describe(None, Some("nothing_here")).is_err());
    }

    #[test]
    fn test_banking_permissions_by_group() {
        let repo = FeatureRepo::banking();
        let set = repo.permission_set();

        assert!(set.is_allowed(DATA_SCIENTISTS, ResourceKind::FeatureView, "atm_usage_30d", Action::ReadOnline));
        assert!(!set.is_allowed(DATA_SCIENTISTS, ResourceKind::DataSource, "customer_data_source", Action::Describe));
        assert!(set.is_allowed(DATA_ENGINEERS, ResourceKind::DataSource, "customer_data_source", Action::Delete));
        assert!(set.is_allowed(ANALYTICS_TEAM, ResourceKind::FeatureView, "transaction_details", Action::ReadOffline));
        assert!(!set.is_allowed(ANALYTICS_TEAM, ResourceKind::FeatureView, "atm_usage_30d", Action::Describe));
        assert!(set.is_allowed(CUSTOMER_ENGAGEMENT, ResourceKind::Entity, "branch", Action::Describe));
        assert!(!set.is_allowed(CUSTOMER_ENGAGEMENT, ResourceKind::Entity, "transaction", Action::Describe));

        let access = set.access_for_group(CUSTOMER_ENGAGEMENT, repo.resources());
        assert!(access.iter().any(|a| a.name == "call_prediction_service"));
        assert!(access.iter().all(|a| a.name != "risk_compliance_service"));
    }
}
