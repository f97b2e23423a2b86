// Banking feature services, one per consuming model

use super::entities::{CX_OWNER, DATA_PLATFORM_OWNER, OPERATIONS_OWNER, RISK_FRAUD_OWNER, RISK_MANAGEMENT_OWNER};
use super::views::RISK_SCORE_VIEW;
use crate::definitions::{BusinessImpact, DataClassification, FeatureService, Governance, Sla};

fn service(
    name: &str,
    sla: Sla,
    team: &str,
    owner: &str,
    impact: BusinessImpact,
    features: &[&str],
) -> FeatureService {
    FeatureService::new(name, sla)
        .with_features(features)
        .with_governance(Governance::new(team, owner).with_impact(impact))
}

pub fn feature_services() -> Vec<FeatureService> {
    let customer_charter = service(
        "customer_charter_service",
        Sla::RealTime,
        "customer_experience",
        CX_OWNER,
        BusinessImpact::High,
        &[
            "customer_demographics_fv",
            "customer_behavioral_profile",
            "branch_visits_90d",
            "branch_service_preferences",
            "customer_branch_interaction",
            "call_center_90d",
            "call_center_predictive",
            "transaction_30d_aggregations",
            "customer_transaction_interaction",
        ],
    )
    .with_use_case("customer_charter")
    .with_model("classification", "customer_satisfaction")
    .with_description("Features for the customer charter model predicting satisfaction and loyalty");

    let customer_behavior = service(
        "customer_behavior_service",
        Sla::NearRealTime,
        "customer_experience",
        CX_OWNER,
        BusinessImpact::High,
        &[
            "customer_demographics_fv",
            "customer_behavioral_profile",
            "transaction_7d_aggregations",
            "transaction_30d_aggregations",
            "transaction_90d_patterns",
            "customer_transaction_interaction",
            "atm_usage_30d",
            "atm_time_patterns",
            "customer_atm_interaction",
            "branch_visits_90d",
            "customer_branch_interaction",
        ],
    )
    .with_use_case("behavior_prediction")
    .with_model("regression", "spending_patterns")
    .with_description("Features for the customer behavior prediction model");

    let call_prediction = service(
        "call_prediction_service",
        Sla::RealTime,
        "customer_experience",
        CX_OWNER,
        BusinessImpact::High,
        &[
            "customer_demographics_fv",
            "customer_behavioral_profile",
            "call_center_90d",
            "call_center_predictive",
            "branch_visits_90d",
            "customer_branch_interaction",
            "transaction_30d_aggregations",
            "customer_transaction_interaction",
            "atm_usage_30d",
            "customer_atm_interaction",
        ],
    )
    .with_use_case("call_prediction")
    .with_model("classification", "call_probability")
    .with_description("Features for predicting inbound calls to enable proactive service");

    let transaction_prediction = service(
        "transaction_prediction_service",
        Sla::RealTime,
        "risk_fraud",
        RISK_FRAUD_OWNER,
        BusinessImpact::Critical,
        &[
            "customer_demographics_fv",
            "customer_behavioral_profile",
            "transaction_7d_aggregations",
            "transaction_30d_aggregations",
            "transaction_90d_patterns",
            "customer_transaction_interaction",
            "transaction_details",
            "atm_usage_30d",
            "customer_atm_interaction",
        ],
    )
    .with_use_case("transaction_prediction,fraud_detection")
    .with_model("classification", "transaction_type")
    .with_description("Features for transaction type prediction and fraud detection");

    let atm_optimization = service(
        "atm_optimization_service",
        Sla::Batch,
        "operations",
        OPERATIONS_OWNER,
        BusinessImpact::Medium,
        &[
            "atm_location_performance",
            "atm_usage_30d",
            "atm_time_patterns",
            "customer_atm_interaction",
            "customer_demographics_fv",
            "customer_behavioral_profile",
            "transaction_30d_aggregations",
            "customer_transaction_interaction",
        ],
    )
    .with_use_case("atm_optimization")
    .with_model("regression", "atm_utilization")
    .with_description("Features for ATM placement and cash planning");

    let branch_optimization = service(
        "branch_optimization_service",
        Sla::Batch,
        "operations",
        OPERATIONS_OWNER,
        BusinessImpact::High,
        &[
            "branch_performance",
            "branch_visits_90d",
            "branch_service_preferences",
            "customer_branch_interaction",
            "customer_demographics_fv",
            "customer_behavioral_profile",
            "call_center_90d",
            "call_center_predictive",
        ],
    )
    .with_use_case("branch_optimization")
    .with_model("regression", "branch_efficiency")
    .with_description("Features for branch staffing and service improvement");

    let comprehensive = service(
        "comprehensive_banking_service",
        Sla::Batch,
        "shared",
        DATA_PLATFORM_OWNER,
        BusinessImpact::High,
        &[
            "customer_demographics_fv",
            "customer_behavioral_profile",
            "transaction_7d_aggregations",
            "transaction_30d_aggregations",
            "transaction_90d_patterns",
            "transaction_details",
            "customer_transaction_interaction",
            "atm_usage_30d",
            "atm_time_patterns",
            "atm_location_performance",
            "customer_atm_interaction",
            "branch_visits_90d",
            "branch_service_preferences",
            "branch_performance",
            "customer_branch_interaction",
            "call_center_90d",
            "call_center_predictive",
        ],
    )
    .with_use_case("comprehensive_analytics")
    .with_model("multi_purpose", "multiple")
    .with_description("Every feature view, for exploratory and multi-purpose analytics");

    let risk_compliance = service(
        "risk_compliance_service",
        Sla::RealTime,
        "risk_fraud",
        RISK_FRAUD_OWNER,
        BusinessImpact::Critical,
        &[
            "customer_demographics_fv",
            "customer_behavioral_profile",
            "transaction_7d_aggregations",
            "transaction_30d_aggregations",
            "transaction_90d_patterns",
            "transaction_details",
            "customer_transaction_interaction",
            "call_center_90d",
            "call_center_predictive",
            "branch_visits_90d",
            "customer_branch_interaction",
        ],
    )
    .with_use_case("risk_compliance")
    .with_model("classification", "risk_score")
    .with_description("Features for risk assessment and regulatory compliance monitoring");

    let simple_risk = service(
        "simple_ondemand_risk_service",
        Sla::RealTime,
        "risk_management",
        RISK_MANAGEMENT_OWNER,
        BusinessImpact::Medium,
        &[RISK_SCORE_VIEW, "customer_demographics_fv"],
    )
    .with_use_case("simple_risk_scoring")
    .with_model("regression", "risk_score")
    .with_description("Real-time risk scoring through an on-demand transformation");

    // services that expose customer PII carry it in their own tags
    let customer_charter = with_sensitive_tags(customer_charter, "gdpr_ccpa_compliant");
    let transaction_prediction = with_sensitive_tags(transaction_prediction, "pci_dss_aml_compliant");

    vec![
        customer_charter,
        customer_behavior,
        call_prediction,
        transaction_prediction,
        atm_optimization,
        branch_optimization,
        comprehensive,
        risk_compliance,
        simple_risk,
    ]
}

fn with_sensitive_tags(mut service: FeatureService, compliance: &str) -> FeatureService {
    service.governance = service
        .governance
        .with_classification(DataClassification::Confidential)
        .with_pii(true)
        .with_compliance(compliance)
        .with_refresh("real_time");
    service
}
