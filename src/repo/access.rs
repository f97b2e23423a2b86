// Group-based access policies for the banking project

use crate::permissions::{Action, Permission, ResourceKind};

pub const DATA_SCIENTISTS: &str = "data-scientists-group";
pub const DATA_ENGINEERS: &str = "data-engineers-group";
pub const ANALYTICS_TEAM: &str = "analytics-team-group";
pub const CUSTOMER_ENGAGEMENT: &str = "customer-engagement-team-group";

const VIEWS: [ResourceKind; 2] = [ResourceKind::FeatureView, ResourceKind::OnDemandFeatureView];

fn reader(name: &str, group: &str, types: &[ResourceKind], patterns: &[&str]) -> Permission {
    Permission::new(name)
        .on(types)
        .matching(patterns)
        .for_groups(&[group])
        .allow(&[Action::Describe])
        .allow(&Action::READ)
}

fn describer(name: &str, group: &str, patterns: &[&str]) -> Permission {
    Permission::new(name)
        .on(&[ResourceKind::Entity])
        .matching(patterns)
        .for_groups(&[group])
        .allow(&[Action::Describe])
}

pub fn permissions() -> Vec<Permission> {
    let mut all = vec![Permission::new("project-access-all-users")
        .on(&[ResourceKind::Project])
        .for_groups(&[
            "system:authenticated",
            "authenticated-users",
            DATA_SCIENTISTS,
            DATA_ENGINEERS,
            ANALYTICS_TEAM,
            CUSTOMER_ENGAGEMENT,
        ])
        .allow(&[Action::Describe])];

    all.extend(data_scientist_permissions());
    all.extend(data_engineer_permissions());
    all.extend(analytics_permissions());
    all.extend(customer_engagement_permissions());
    all
}

/// Read everything model-facing; no access to raw sources
fn data_scientist_permissions() -> Vec<Permission> {
    vec![
        reader("data-scientists-group-feature-views-reader", DATA_SCIENTISTS, &VIEWS, &[]),
        reader(
            "data-scientists-group-feature-services-reader",
            DATA_SCIENTISTS,
            &[ResourceKind::FeatureService],
            &[],
        ),
        describer("data-scientists-group-entities-reader", DATA_SCIENTISTS, &[]),
    ]
}

/// Manage every object except permissions
fn data_engineer_permissions() -> Vec<Permission> {
    vec![
        Permission::new("data-engineers-group-feature-views-manager")
            .on(&VIEWS)
            .for_groups(&[DATA_ENGINEERS])
            .allow(&Action::CRUD)
            .allow(&Action::READ)
            .allow(&Action::WRITE),
        Permission::new("data-engineers-group-feature-services-manager")
            .on(&[ResourceKind::FeatureService])
            .for_groups(&[DATA_ENGINEERS])
            .allow(&Action::CRUD)
            .allow(&Action::READ),
        Permission::new("data-engineers-group-entities-manager")
            .on(&[ResourceKind::Entity])
            .for_groups(&[DATA_ENGINEERS])
            .allow(&Action::CRUD),
        Permission::new("data-engineers-group-data-sources-manager")
            .on(&[ResourceKind::DataSource])
            .for_groups(&[DATA_ENGINEERS])
            .allow(&Action::CRUD)
            .allow(&Action::READ)
            .allow(&Action::WRITE),
    ]
}

/// Customer and transaction features and services
fn analytics_permissions() -> Vec<Permission> {
    vec![
        reader(
            "analytics-team-group-customer-features-reader",
            ANALYTICS_TEAM,
            &VIEWS,
            &[
                "customer_demographics_fv",
                "customer_behavioral_profile",
                "customer_transaction_interaction",
                "customer_profile_.*",
            ],
        ),
        reader(
            "analytics-team-group-transaction-features-reader",
            ANALYTICS_TEAM,
            &[ResourceKind::FeatureView],
            &[
                "transaction_7d_aggregations",
                "transaction_30d_aggregations",
                "transaction_90d_patterns",
                "transaction_details",
                "transaction_.*",
            ],
        ),
        reader(
            "analytics-team-group-customer-services-reader",
            ANALYTICS_TEAM,
            &[ResourceKind::FeatureService],
            &["customer_charter_service", "customer_behavior_service"],
        ),
        reader(
            "analytics-team-group-transaction-services-reader",
            ANALYTICS_TEAM,
            &[ResourceKind::FeatureService],
            &[
                "transaction_prediction_service",
                "risk_compliance_service",
                "simple_ondemand_risk_service",
            ],
        ),
        describer("analytics-team-group-customer-entity-reader", ANALYTICS_TEAM, &["customer"]),
        describer("analytics-team-group-transaction-entity-reader", ANALYTICS_TEAM, &["transaction"]),
    ]
}

/// Branch, ATM, and call center features and services
fn customer_engagement_permissions() -> Vec<Permission> {
    let views = [ResourceKind::FeatureView];
    let services = [ResourceKind::FeatureService];

    vec![
        reader(
            "customer-engagement-team-group-branch-features-reader",
            CUSTOMER_ENGAGEMENT,
            &views,
            &[
                "branch_visits_90d",
                "branch_service_preferences",
                "branch_performance",
                "customer_branch_interaction",
                "branch_.*",
            ],
        ),
        reader(
            "customer-engagement-team-group-atm-features-reader",
            CUSTOMER_ENGAGEMENT,
            &views,
            &[
                "atm_usage_30d",
                "atm_time_patterns",
                "atm_location_performance",
                "customer_atm_interaction",
                "atm_.*",
            ],
        ),
        reader(
            "customer-engagement-team-group-call-center-features-reader",
            CUSTOMER_ENGAGEMENT,
            &views,
            &["call_center_90d", "call_center_predictive", "call_.*"],
        ),
        reader(
            "customer-engagement-team-group-branch-services-reader",
            CUSTOMER_ENGAGEMENT,
            &services,
            &["branch_optimization_service"],
        ),
        reader(
            "customer-engagement-team-group-atm-services-reader",
            CUSTOMER_ENGAGEMENT,
            &services,
            &["atm_optimization_service"],
        ),
        reader(
            "customer-engagement-team-group-call-center-services-reader",
            CUSTOMER_ENGAGEMENT,
            &services,
            &["call_prediction_service"],
        ),
        describer(
            "customer-engagement-team-group-entities-reader",
            CUSTOMER_ENGAGEMENT,
            &["branch", "atm_location", "customer"],
        ),
    ]
}
