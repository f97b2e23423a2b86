// Banking feature views, grouped by source, plus the on-demand risk score

use super::columns;
use super::entities::{
    ATM_LOCATION, ATM_SOURCE, BRANCH, BRANCH_SOURCE, CALL_CENTER_SOURCE, CUSTOMER,
    CUSTOMER_SOURCE, CX_OWNER, DATA_PLATFORM_OWNER, OPERATIONS_OWNER, RISK_FRAUD_OWNER,
    RISK_MANAGEMENT_OWNER, TRANSACTION, TRANSACTION_SOURCE,
};
use crate::datasets::ValueType;
use crate::definitions::{
    BusinessImpact, DataClassification, FeatureView, Field, Governance, OnDemandFeatureView,
    Transformation, ValidationRule,
};

pub const RISK_SCORE_VIEW: &str = "calculate_simple_risk_score";

fn view(name: &str, entities: &[&str], ttl_days: u64, source: &str, fields: &[&str]) -> FeatureView {
    FeatureView::new(name, source)
        .with_entities(entities)
        .with_ttl_days(ttl_days)
        .with_schema(columns::fields(fields))
}

fn governance(
    team: &str,
    owner: &str,
    domain: &str,
    classification: DataClassification,
    impact: BusinessImpact,
) -> Governance {
    Governance::new(team, owner)
        .with_domain(domain)
        .with_classification(classification)
        .with_impact(impact)
}

pub fn feature_views() -> Vec<FeatureView> {
    let mut views = Vec::new();
    views.extend(customer_views());
    views.extend(transaction_views());
    views.extend(atm_views());
    views.extend(branch_views());
    views.extend(call_center_views());
    views
}

// ============================================================================
// CUSTOMER
// ============================================================================

fn customer_views() -> Vec<FeatureView> {
    vec![
        view("customer_demographics_fv", &[CUSTOMER], 365, CUSTOMER_SOURCE, columns::CUSTOMER_DEMOGRAPHICS)
            .with_description("Age, income, and credit score for segmentation and credit assessment")
            .with_governance(
                governance("shared", DATA_PLATFORM_OWNER, "customer", DataClassification::Confidential, BusinessImpact::High)
                    .with_pii(true)
                    .with_use_cases(&["customer_charter", "risk_assessment", "product_recommendation"])
                    .with_refresh("monthly")
                    .with_compliance("gdpr_ccpa_fcra_compliant")
                    .with_tag("model_usage", "customer_segmentation,credit_assessment,demographic_analysis"),
            ),
        view("customer_behavioral_profile", &[CUSTOMER], 180, CUSTOMER_SOURCE, columns::CUSTOMER_PROFILE)
            .with_description("Demographics plus tenure, risk tier, and segment for behavior models")
            .with_governance(
                governance("customer_experience", CX_OWNER, "customer", DataClassification::Confidential, BusinessImpact::High)
                    .with_pii(true)
                    .with_refresh("weekly")
                    .with_compliance("gdpr_ccpa_compliant")
                    .with_tag("model_usage", "behavior_prediction,customer_charter,marketing_targeting"),
            ),
    ]
}

// ============================================================================
// TRANSACTIONS
// ============================================================================

fn transaction_views() -> Vec<FeatureView> {
    vec![
        view("transaction_7d_aggregations", &[CUSTOMER], 7, TRANSACTION_SOURCE, columns::TRANSACTION)
            .with_window_days(7)
            .with_description("Last week of transactions per customer for real-time fraud scoring")
            .with_governance(
                governance("risk_fraud", RISK_FRAUD_OWNER, "transaction", DataClassification::Confidential, BusinessImpact::Critical)
                    .with_use_cases(&["fraud_detection"])
                    .with_refresh("real_time")
                    .with_compliance("pci_dss_aml_compliant")
                    .with_tag("model_usage", "real_time_fraud_detection,transaction_monitoring"),
            ),
        view("transaction_30d_aggregations", &[CUSTOMER], 30, TRANSACTION_SOURCE, columns::TRANSACTION)
            .with_window_days(30)
            .with_description("Last month of transactions per customer for spending behavior")
            .with_governance(
                governance("customer_experience", CX_OWNER, "transaction", DataClassification::Confidential, BusinessImpact::High)
                    .with_use_cases(&["behavior_prediction"])
                    .with_refresh("daily")
                    .with_compliance("pci_dss_compliant")
                    .with_tag("model_usage", "customer_segmentation,behavior_prediction,personalization"),
            ),
        view("transaction_90d_patterns", &[CUSTOMER], 90, TRANSACTION_SOURCE, columns::TRANSACTION)
            .with_window_days(90)
            .with_description("Quarter of transactions per customer for AML and compliance monitoring")
            .with_governance(
                governance("risk_fraud", RISK_FRAUD_OWNER, "transaction", DataClassification::Confidential, BusinessImpact::High)
                    .with_use_cases(&["compliance_monitoring"])
                    .with_refresh("weekly")
                    .with_compliance("aml_bsa_compliant")
                    .with_tag("model_usage", "aml_monitoring,compliance_reporting,risk_assessment"),
            ),
        view("transaction_details", &[TRANSACTION], 7, TRANSACTION_SOURCE, columns::TRANSACTION)
            .with_description("Per-transaction attributes for approval-time fraud checks")
            .with_governance(
                governance("risk_fraud", RISK_FRAUD_OWNER, "transaction", DataClassification::Confidential, BusinessImpact::Critical)
                    .with_use_cases(&["fraud_detection"])
                    .with_refresh("real_time")
                    .with_compliance("pci_dss_aml_compliant")
                    .with_tag("model_usage", "real_time_fraud_detection,transaction_monitoring,risk_assessment"),
            ),
        view("customer_transaction_interaction", &[CUSTOMER, TRANSACTION], 30, TRANSACTION_SOURCE, columns::TRANSACTION)
            .with_description("Transactions keyed by customer and transaction for behavior analysis")
            .with_governance(
                governance("risk_fraud", RISK_FRAUD_OWNER, "customer_transaction", DataClassification::Confidential, BusinessImpact::High)
                    .with_use_cases(&["behavior_analysis"])
                    .with_refresh("daily")
                    .with_compliance("pci_dss_compliant")
                    .with_tag("model_usage", "behavior_analysis,risk_assessment,customer_segmentation"),
            ),
    ]
}

// ============================================================================
// ATM
// ============================================================================

fn atm_views() -> Vec<FeatureView> {
    let ops = |domain: &str| {
        governance("operations", OPERATIONS_OWNER, domain, DataClassification::Internal, BusinessImpact::Medium)
            .with_compliance("operational_data")
    };

    vec![
        view("atm_usage_30d", &[CUSTOMER], 30, ATM_SOURCE, columns::ATM_USAGE)
            .with_window_days(30)
            .with_description("Last month of ATM withdrawals per customer")
            .with_governance(
                ops("atm")
                    .with_use_cases(&["atm_optimization"])
                    .with_refresh("daily")
                    .with_tag("model_usage", "atm_placement,usage_prediction,network_optimization"),
            ),
        view("atm_time_patterns", &[CUSTOMER], 60, ATM_SOURCE, columns::ATM_USAGE)
            .with_window_days(60)
            .with_description("Two months of ATM timing habits per customer")
            .with_governance(
                ops("atm")
                    .with_use_cases(&["behavior_prediction"])
                    .with_refresh("weekly")
                    .with_tag("model_usage", "customer_segmentation,behavior_prediction,service_optimization"),
            ),
        view("atm_location_performance", &[ATM_LOCATION], 30, ATM_SOURCE, columns::ATM_USAGE)
            .with_description("Withdrawal volume and timing per ATM site")
            .with_governance(
                ops("infrastructure")
                    .with_use_cases(&["atm_optimization"])
                    .with_refresh("daily")
                    .with_tag("model_usage", "atm_placement,network_optimization,infrastructure_planning"),
            ),
        view("customer_atm_interaction", &[CUSTOMER, ATM_LOCATION], 60, ATM_SOURCE, columns::ATM_USAGE)
            .with_description("Which customers use which ATMs, and when")
            .with_governance(
                ops("customer_infrastructure")
                    .with_use_cases(&["location_optimization"])
                    .with_refresh("weekly")
                    .with_tag("model_usage", "personalized_service,location_optimization,customer_behavior_analysis"),
            ),
    ]
}

// ============================================================================
// BRANCH
// ============================================================================

fn branch_views() -> Vec<FeatureView> {
    let ops = |domain: &str| {
        governance("operations", OPERATIONS_OWNER, domain, DataClassification::Internal, BusinessImpact::High)
            .with_compliance("operational_data")
    };

    vec![
        view("branch_visits_90d", &[CUSTOMER], 90, BRANCH_SOURCE, columns::BRANCH_VISIT)
            .with_window_days(90)
            .with_description("Quarter of branch visits per customer")
            .with_governance(
                ops("branch")
                    .with_use_cases(&["customer_charter"])
                    .with_refresh("daily")
                    .with_tag("model_usage", "customer_charter_model,service_optimization,branch_analytics"),
            ),
        view("branch_service_preferences", &[CUSTOMER], 180, BRANCH_SOURCE, columns::BRANCH_VISIT)
            .with_window_days(180)
            .with_description("Half a year of branch service choices per customer")
            .with_governance(
                ops("branch")
                    .with_use_cases(&["service_optimization"])
                    .with_refresh("weekly")
                    .with_tag("model_usage", "service_optimization,customer_experience_analytics,digital_transformation"),
            ),
        view("branch_performance", &[BRANCH], 30, BRANCH_SOURCE, columns::BRANCH_VISIT)
            .with_description("Wait times, service times, and satisfaction per branch")
            .with_governance(
                ops("infrastructure")
                    .with_use_cases(&["branch_optimization"])
                    .with_refresh("daily")
                    .with_tag("model_usage", "branch_analytics,operational_optimization,performance_monitoring"),
            ),
        view("customer_branch_interaction", &[CUSTOMER, BRANCH], 90, BRANCH_SOURCE, columns::BRANCH_VISIT)
            .with_description("Which customers visit which branches, and how it went")
            .with_governance(
                ops("customer_infrastructure")
                    .with_use_cases(&["customer_experience"])
                    .with_refresh("weekly")
                    .with_tag("model_usage", "customer_experience_analytics,personalized_service,branch_optimization"),
            ),
    ]
}

// ============================================================================
// CALL CENTER
// ============================================================================

fn call_center_views() -> Vec<FeatureView> {
    let cx = || {
        governance("customer_experience", CX_OWNER, "call_center", DataClassification::Confidential, BusinessImpact::High)
            .with_compliance("operational_data")
    };

    vec![
        view("call_center_90d", &[CUSTOMER], 90, CALL_CENTER_SOURCE, columns::CALL_CENTER)
            .with_window_days(90)
            .with_description("Quarter of call center contacts per customer")
            .with_governance(
                cx().with_use_cases(&["call_prediction"])
                    .with_refresh("daily")
                    .with_tag("model_usage", "call_prediction,customer_service_optimization,resource_planning"),
            ),
        view("call_center_predictive", &[CUSTOMER], 180, CALL_CENTER_SOURCE, columns::CALL_CENTER)
            .with_window_days(180)
            .with_description("Half a year of contacts for proactive outreach models")
            .with_governance(
                cx().with_use_cases(&["proactive_service"])
                    .with_refresh("weekly")
                    .with_tag("model_usage", "proactive_outreach,customer_retention,service_optimization"),
            ),
    ]
}

// ============================================================================
// ON-DEMAND
// ============================================================================

pub fn on_demand_views() -> Vec<OnDemandFeatureView> {
    vec![OnDemandFeatureView::new(RISK_SCORE_VIEW, Transformation::credit_score_risk())
        .with_sources(&["customer_demographics_fv"])
        .with_schema(vec![Field::new("risk_score", ValueType::Float64)
            .with_description("Credit score as a percentage of 850")
            .with_rule(ValidationRule::range(0.0, 100.0))])
        .with_description("Simple risk score calculation based on credit score")
        .with_governance(
            Governance::new("risk_management", RISK_MANAGEMENT_OWNER)
                .with_impact(BusinessImpact::Medium)
                .with_use_cases(&["simple_risk_scoring"])
                .with_tag("sla", "real_time")
                .with_tag("model_type", "regression")
                .with_tag("transformation_type", "on_demand"),
        )]
}
