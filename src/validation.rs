// ✅ Definition Validator - structural checks over the whole feature repo
// Reports every problem it finds instead of stopping at the first

use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use thiserror::Error;
use tracing::debug;

use crate::datasets::{Dataset, ValueType};
use crate::definitions::{FeatureService, FeatureView, OnDemandFeatureView};
use crate::permissions::{Permission, ResourceKind};
use crate::repo::FeatureRepo;

// ============================================================================
// ISSUES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueLevel {
    Error,
    Warning,
    Info,
}

impl fmt::Display for IssueLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueLevel::Error => write!(f, "ERROR"),
            IssueLevel::Warning => write!(f, "WARNING"),
            IssueLevel::Info => write!(f, "INFO"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("duplicate {kind} name '{name}'")]
    DuplicateName { kind: ResourceKind, name: String },

    #[error("feature view '{view}' references unknown entity '{entity}'")]
    UnknownEntity { view: String, entity: String },

    #[error("feature view '{view}' reads from unknown data source '{source_name}'")]
    UnknownSource { view: String, source_name: String },

    #[error("join key '{key}' of feature view '{view}' is not a column of {dataset}")]
    MissingJoinKey { view: String, key: String, dataset: Dataset },

    #[error("feature '{column}' of view '{view}' is not a column of {dataset}")]
    MissingColumn { view: String, column: String, dataset: Dataset },

    #[error("feature '{column}' of view '{view}' is declared {declared} but {dataset} stores {actual}")]
    TypeMismatch {
        view: String,
        column: String,
        dataset: Dataset,
        declared: ValueType,
        actual: ValueType,
    },

    #[error("rule '{rule}' on '{view}.{column}' cannot apply to {dtype} values")]
    RuleNotApplicable {
        view: String,
        column: String,
        rule: &'static str,
        dtype: ValueType,
    },

    #[error("feature view '{view}' declares no features")]
    EmptySchema { view: String },

    #[error("feature view '{view}' has a zero TTL")]
    ZeroTtl { view: String },

    #[error("timestamp field '{field}' of source '{source_name}' is not a column of {dataset}")]
    MissingTimestamp {
        source_name: String,
        field: String,
        dataset: Dataset,
    },

    #[error("feature service '{service}' references unknown view '{reference}'")]
    UnknownFeatureReference { service: String, reference: String },

    #[error("feature service '{service}' has no features")]
    EmptyService { service: String },

    #[error("on-demand view '{view}' depends on unknown view '{source_view}'")]
    UnknownOnDemandSource { view: String, source_view: String },

    #[error("on-demand view '{view}' reads '{input}', which none of its sources provide")]
    MissingTransformationInput { view: String, input: String },

    #[error("on-demand view '{view}' produces '{output}' but its schema does not declare it")]
    UndeclaredTransformationOutput { view: String, output: String },

    #[error("permission '{permission}' has invalid name pattern '{pattern}': {reason}")]
    InvalidPattern {
        permission: String,
        pattern: String,
        reason: String,
    },

    #[error("permission '{permission}' pattern '{pattern}' matches no registered object")]
    UnmatchedPattern { permission: String, pattern: String },

    #[error("permission '{permission}' grants nothing (missing {missing})")]
    EmptyPermission { permission: String, missing: &'static str },

    #[error("{kind} '{name}' holds PII but has no owner")]
    MissingOwner { kind: ResourceKind, name: String },

    #[error("feature service '{service}' serves PII features but is not tagged pii")]
    UntaggedPiiService { service: String },
}

impl DefinitionError {
    pub fn level(&self) -> IssueLevel {
        match self {
            DefinitionError::ZeroTtl { .. }
            | DefinitionError::UnmatchedPattern { .. }
            | DefinitionError::MissingOwner { .. } => IssueLevel::Warning,
            DefinitionError::UntaggedPiiService { .. } => IssueLevel::Info,
            _ => IssueLevel::Error,
        }
    }
}

/// One finding, attached to the object it was found on
#[derive(Debug, Clone, PartialEq)]
pub struct DefinitionIssue {
    pub level: IssueLevel,
    pub kind: ResourceKind,
    pub object: String,
    pub error: DefinitionError,
}

impl fmt::Display for DefinitionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} {}: {}", self.level, self.kind, self.object, self.error)
    }
}

// ============================================================================
// REPORT
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub issues: Vec<DefinitionIssue>,
    pub objects_checked: usize,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        !self.issues.iter().any(|i| i.level == IssueLevel::Error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &DefinitionIssue> {
        self.at_level(IssueLevel::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &DefinitionIssue> {
        self.at_level(IssueLevel::Warning)
    }

    pub fn notes(&self) -> impl Iterator<Item = &DefinitionIssue> {
        self.at_level(IssueLevel::Info)
    }

    fn at_level(&self, level: IssueLevel) -> impl Iterator<Item = &DefinitionIssue> {
        self.issues.iter().filter(move |i| i.level == level)
    }

    pub fn summary(&self) -> String {
        format!(
            "Checked {} objects: {} errors, {} warnings, {} notes",
            self.objects_checked,
            self.errors().count(),
            self.warnings().count(),
            self.notes().count()
        )
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

pub struct DefinitionValidator<'a> {
    repo: &'a FeatureRepo,
    issues: Vec<DefinitionIssue>,
}

impl<'a> DefinitionValidator<'a> {
    pub fn new(repo: &'a FeatureRepo) -> Self {
        DefinitionValidator {
            repo,
            issues: Vec::new(),
        }
    }

    /// Run every check and return the collected findings
    pub fn validate(mut self) -> ValidationReport {
        let repo = self.repo;

        self.check_duplicates();
        self.check_sources();
        for view in &repo.feature_views {
            self.check_feature_view(view);
        }
        for view in &repo.on_demand_feature_views {
            self.check_on_demand_view(view);
        }
        for service in &repo.feature_services {
            self.check_service(service);
        }
        for permission in &repo.permissions {
            self.check_permission(permission);
        }

        debug!(issues = self.issues.len(), "definition validation finished");
        ValidationReport {
            issues: self.issues,
            objects_checked: repo.resources().len(),
        }
    }

    fn report(&mut self, kind: ResourceKind, object: &str, error: DefinitionError) {
        self.issues.push(DefinitionIssue {
            level: error.level(),
            kind,
            object: object.to_string(),
            error,
        });
    }

    fn check_duplicates(&mut self) {
        let repo = self.repo;
        for kind in ResourceKind::ALL {
            let mut seen = HashSet::new();
            let duplicates: BTreeSet<String> = repo
                .names(kind)
                .into_iter()
                .filter(|name| !seen.insert(*name))
                .map(str::to_string)
                .collect();
            for name in duplicates {
                self.report(kind, &name, DefinitionError::DuplicateName { kind, name: name.clone() });
            }
        }
    }

    fn check_sources(&mut self) {
        let repo = self.repo;
        for source in &repo.data_sources {
            if source.dataset.column(&source.timestamp_field).is_none() {
                self.report(
                    ResourceKind::DataSource,
                    &source.name,
                    DefinitionError::MissingTimestamp {
                        source_name: source.name.clone(),
                        field: source.timestamp_field.clone(),
                        dataset: source.dataset,
                    },
                );
            }
            if source.governance.pii && source.governance.owner.is_empty() {
                self.report(
                    ResourceKind::DataSource,
                    &source.name,
                    DefinitionError::MissingOwner {
                        kind: ResourceKind::DataSource,
                        name: source.name.clone(),
                    },
                );
            }
        }
    }

    fn check_feature_view(&mut self, view: &FeatureView) {
        let repo = self.repo;
        let kind = ResourceKind::FeatureView;

        if view.schema.is_empty() {
            self.report(kind, &view.name, DefinitionError::EmptySchema { view: view.name.clone() });
        }
        if view.ttl_seconds == 0 {
            self.report(kind, &view.name, DefinitionError::ZeroTtl { view: view.name.clone() });
        }
        if (view.governance.pii || view.contains_pii()) && view.governance.owner.is_empty() {
            self.report(
                kind,
                &view.name,
                DefinitionError::MissingOwner {
                    kind,
                    name: view.name.clone(),
                },
            );
        }

        let dataset = match repo.source_of(view) {
            Some(source) => Some(source.dataset),
            None => {
                self.report(
                    kind,
                    &view.name,
                    DefinitionError::UnknownSource {
                        view: view.name.clone(),
                        source_name: view.source.clone(),
                    },
                );
                None
            }
        };

        for entity_name in &view.entities {
            let Some(entity) = repo.entity(entity_name) else {
                self.report(
                    kind,
                    &view.name,
                    DefinitionError::UnknownEntity {
                        view: view.name.clone(),
                        entity: entity_name.clone(),
                    },
                );
                continue;
            };
            let Some(dataset) = dataset else { continue };
            for key in &entity.join_keys {
                if dataset.column(key).is_none() {
                    self.report(
                        kind,
                        &view.name,
                        DefinitionError::MissingJoinKey {
                            view: view.name.clone(),
                            key: key.clone(),
                            dataset,
                        },
                    );
                }
            }
        }

        for field in &view.schema {
            for rule in &field.validation_rules {
                if !rule.applies_to(field.dtype) {
                    self.report(
                        kind,
                        &view.name,
                        DefinitionError::RuleNotApplicable {
                            view: view.name.clone(),
                            column: field.name.clone(),
                            rule: rule.name(),
                            dtype: field.dtype,
                        },
                    );
                }
            }

            let Some(dataset) = dataset else { continue };
            match dataset.column(&field.name) {
                None => self.report(
                    kind,
                    &view.name,
                    DefinitionError::MissingColumn {
                        view: view.name.clone(),
                        column: field.name.clone(),
                        dataset,
                    },
                ),
                Some(column) if column.value_type != field.dtype => self.report(
                    kind,
                    &view.name,
                    DefinitionError::TypeMismatch {
                        view: view.name.clone(),
                        column: field.name.clone(),
                        dataset,
                        declared: field.dtype,
                        actual: column.value_type,
                    },
                ),
                Some(_) => {}
            }
        }
    }

    fn check_on_demand_view(&mut self, view: &OnDemandFeatureView) {
        let repo = self.repo;
        let kind = ResourceKind::OnDemandFeatureView;
        let mut provided: HashSet<&str> = HashSet::new();

        for source_name in &view.sources {
            match repo.feature_view(source_name) {
                Some(source) => provided.extend(source.feature_names()),
                None => self.report(
                    kind,
                    &view.name,
                    DefinitionError::UnknownOnDemandSource {
                        view: view.name.clone(),
                        source_view: source_name.clone(),
                    },
                ),
            }
        }

        for input in view.transformation.inputs() {
            if !provided.contains(input) {
                self.report(
                    kind,
                    &view.name,
                    DefinitionError::MissingTransformationInput {
                        view: view.name.clone(),
                        input: input.to_string(),
                    },
                );
            }
        }

        let declared: HashSet<&str> = view.feature_names().collect();
        for output in view.transformation.outputs() {
            if !declared.contains(output) {
                self.report(
                    kind,
                    &view.name,
                    DefinitionError::UndeclaredTransformationOutput {
                        view: view.name.clone(),
                        output: output.to_string(),
                    },
                );
            }
        }
    }

    fn check_service(&mut self, service: &FeatureService) {
        let repo = self.repo;
        let kind = ResourceKind::FeatureService;

        if service.features.is_empty() {
            self.report(kind, &service.name, DefinitionError::EmptyService { service: service.name.clone() });
        }

        let mut serves_pii = false;
        for reference in &service.features {
            if let Some(view) = repo.feature_view(reference) {
                serves_pii |= view.governance.pii || view.contains_pii();
            } else if repo.on_demand_feature_view(reference).is_none() {
                self.report(
                    kind,
                    &service.name,
                    DefinitionError::UnknownFeatureReference {
                        service: service.name.clone(),
                        reference: reference.clone(),
                    },
                );
            }
        }

        if serves_pii && !service.governance.pii {
            self.report(
                kind,
                &service.name,
                DefinitionError::UntaggedPiiService { service: service.name.clone() },
            );
        }
    }

    fn check_permission(&mut self, permission: &Permission) {
        let repo = self.repo;
        let kind = ResourceKind::Permission;
        let missing = if permission.types.is_empty() {
            Some("resource types")
        } else if permission.groups.is_empty() {
            Some("groups")
        } else if permission.actions.is_empty() {
            Some("actions")
        } else {
            None
        };
        if let Some(missing) = missing {
            self.report(
                kind,
                &permission.name,
                DefinitionError::EmptyPermission {
                    permission: permission.name.clone(),
                    missing,
                },
            );
        }

        let candidates: Vec<&str> = permission
            .types
            .iter()
            .flat_map(|t| repo.names(*t))
            .collect();

        for pattern in &permission.name_patterns {
            match Permission::compile_pattern(pattern) {
                Err(e) => self.report(
                    kind,
                    &permission.name,
                    DefinitionError::InvalidPattern {
                        permission: permission.name.clone(),
                        pattern: pattern.clone(),
                        reason: e.to_string(),
                    },
                ),
                Ok(re) if !candidates.iter().any(|name| re.is_match(name)) => self.report(
                    kind,
                    &permission.name,
                    DefinitionError::UnmatchedPattern {
                        permission: permission.name.clone(),
                        pattern: pattern.clone(),
                    },
                ),
                Ok(_) => {}
            }
        }
    }
}

/// Validate a repo in one call
pub fn validate_repo(repo: &FeatureRepo) -> ValidationReport {
    DefinitionValidator::new(repo).validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::{Field, Sla, ValidationRule};
    use crate::permissions::Action;

    #[test]
    fn test_banking_repo_is_valid() {
        let repo = FeatureRepo::banking();
        let report = validate_repo(&repo);

        let errors: Vec<String> = report.errors().map(|i| i.to_string()).collect();
        assert!(report.is_valid(), "unexpected errors: {:#?}", errors);
        assert_eq!(report.objects_checked, repo.resources().len());
    }

    #[test]
    fn test_banking_unmatched_patterns_are_warnings() {
        let report = validate_repo(&FeatureRepo::banking());
        assert!(report.warnings().any(|i| matches!(
            &i.error,
            DefinitionError::UnmatchedPattern { pattern, .. } if pattern == "customer_profile_.*"
        )));
    }

    #[test]
    fn test_untagged_pii_services_are_noted() {
        let report = validate_repo(&FeatureRepo::banking());
        let noted: Vec<&str> = report.notes().map(|i| i.object.as_str()).collect();
        assert!(noted.contains(&"customer_behavior_service"));
        assert!(!noted.contains(&"customer_charter_service"));
    }

    #[test]
    fn test_missing_column_and_type_mismatch() {
        let mut repo = FeatureRepo::banking();
        repo.register_feature_view(
            FeatureView::new("bad_customer_view", "customer_data_source")
                .with_entities(&["customer"])
                .with_ttl_days(30)
                .with_schema(vec![
                    Field::new("shoe_size", ValueType::Int64),
                    Field::new("age", ValueType::String),
                ]),
        );

        let report = validate_repo(&repo);
        assert!(!report.is_valid());
        let bad: Vec<&DefinitionError> = report
            .errors()
            .filter(|i| i.object == "bad_customer_view")
            .map(|i| &i.error)
            .collect();
        assert!(bad.iter().any(|e| matches!(e, DefinitionError::MissingColumn { column, .. } if column == "shoe_size")));
        assert!(bad.iter().any(|e| matches!(e, DefinitionError::TypeMismatch { column, .. } if column == "age")));
    }

    #[test]
    fn test_join_key_must_exist_in_source() {
        let mut repo = FeatureRepo::banking();
        // customers carry no atm_id
        repo.register_feature_view(
            FeatureView::new("atm_on_customers", "customer_data_source")
                .with_entities(&["atm_location"])
                .with_ttl_days(30)
                .with_schema(vec![Field::new("age", ValueType::Int64)]),
        );

        let report = validate_repo(&repo);
        assert!(report.errors().any(|i| matches!(
            &i.error,
            DefinitionError::MissingJoinKey { key, dataset: Dataset::Customers, .. } if key == "atm_id"
        )));
    }

    #[test]
    fn test_unknown_references() {
        let mut repo = FeatureRepo::banking();
        repo.register_feature_view(
            FeatureView::new("orphan", "no_such_source")
                .with_entities(&["merchant"])
                .with_ttl_days(1)
                .with_schema(vec![Field::new("amount", ValueType::Float64)]),
        );
        repo.register_feature_service(FeatureService::new("ghost_service", Sla::Batch).with_features(&["ghost_view"]));

        let report = validate_repo(&repo);
        let errors: Vec<&DefinitionError> = report.errors().map(|i| &i.error).collect();
        assert!(errors.iter().any(|e| matches!(e, DefinitionError::UnknownSource { .. })));
        assert!(errors.iter().any(|e| matches!(e, DefinitionError::UnknownEntity { entity, .. } if entity == "merchant")));
        assert!(errors.iter().any(|e| matches!(e, DefinitionError::UnknownFeatureReference { reference, .. } if reference == "ghost_view")));
    }

    #[test]
    fn test_duplicate_names_are_errors() {
        let mut repo = FeatureRepo::banking();
        let copy = repo.feature_view("atm_usage_30d").cloned().unwrap();
        repo.register_feature_view(copy);

        let report = validate_repo(&repo);
        let duplicates: Vec<&DefinitionIssue> = report
            .errors()
            .filter(|i| matches!(i.error, DefinitionError::DuplicateName { .. }))
            .collect();
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].object, "atm_usage_30d");
    }

    #[test]
    fn test_rule_must_fit_dtype() {
        let mut repo = FeatureRepo::new("test");
        repo.entities = FeatureRepo::banking().entities;
        repo.data_sources = FeatureRepo::banking().data_sources;
        repo.register_feature_view(
            FeatureView::new("segments", "customer_data_source")
                .with_entities(&["customer"])
                .with_ttl_days(30)
                .with_schema(vec![
                    Field::new("customer_segment", ValueType::String).with_rule(ValidationRule::Positive),
                ]),
        );

        let report = validate_repo(&repo);
        assert!(report.errors().any(|i| matches!(
            i.error,
            DefinitionError::RuleNotApplicable { rule: "positive", .. }
        )));
    }

    #[test]
    fn test_invalid_pattern_and_empty_permission() {
        let mut repo = FeatureRepo::banking();
        repo.register_permission(
            Permission::new("broken-pattern")
                .on(&[ResourceKind::FeatureView])
                .matching(&["customer_(demographics"])
                .for_groups(&["g"])
                .allow(&[Action::Describe]),
        );
        repo.register_permission(Permission::new("no-groups").on(&[ResourceKind::Entity]).allow(&Action::CRUD));

        let report = validate_repo(&repo);
        assert!(report.errors().any(|i| matches!(i.error, DefinitionError::InvalidPattern { .. })));
        assert!(report.errors().any(|i| matches!(
            i.error,
            DefinitionError::EmptyPermission { missing: "groups", .. }
        )));
    }

    #[test]
    fn test_on_demand_inputs_must_come_from_sources() {
        let mut repo = FeatureRepo::banking();
        repo.on_demand_feature_views[0].sources = vec!["atm_usage_30d".to_string()];

        let report = validate_repo(&repo);
        assert!(report.errors().any(|i| matches!(
            &i.error,
            DefinitionError::MissingTransformationInput { input, .. } if input == "credit_score"
        )));
    }

    #[test]
    fn test_pii_view_without_owner_warns() {
        let mut repo = FeatureRepo::banking();
        repo.feature_views[0].governance.owner.clear();

        let report = validate_repo(&repo);
        assert!(report.is_valid());
        assert!(report.warnings().any(|i| matches!(i.error, DefinitionError::MissingOwner { .. })));
    }
}
