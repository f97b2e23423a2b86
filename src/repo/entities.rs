// Banking entities and the file sources behind them

use crate::datasets::Dataset;
use crate::definitions::{BusinessImpact, DataClassification, DataSource, Entity, Governance};

pub const CUSTOMER: &str = "customer";
pub const ATM_LOCATION: &str = "atm_location";
pub const BRANCH: &str = "branch";
pub const TRANSACTION: &str = "transaction";

pub const CUSTOMER_SOURCE: &str = "customer_data_source";
pub const TRANSACTION_SOURCE: &str = "transaction_data_source";
pub const ATM_SOURCE: &str = "atm_usage_data_source";
pub const BRANCH_SOURCE: &str = "branch_details_data_source";
pub const CALL_CENTER_SOURCE: &str = "call_center_data_source";

pub const DATA_PLATFORM_OWNER: &str = "data_platform_team@bank.com";
pub const RISK_FRAUD_OWNER: &str = "risk_fraud_team@bank.com";
pub const OPERATIONS_OWNER: &str = "operations_team@bank.com";
pub const CX_OWNER: &str = "customer_experience_team@bank.com";
pub const RISK_MANAGEMENT_OWNER: &str = "risk_management_team@bank.com";

pub fn entities() -> Vec<Entity> {
    vec![
        Entity::new(CUSTOMER, "customer_id")
            .with_description("Individual bank customer; the primary key of most features")
            .with_governance(
                Governance::new("shared", DATA_PLATFORM_OWNER)
                    .with_domain("customer")
                    .with_classification(DataClassification::Confidential)
                    .with_pii(true)
                    .with_impact(BusinessImpact::Critical)
                    .with_use_cases(&[
                        "customer_charter",
                        "behavior_prediction",
                        "fraud_detection",
                        "call_prediction",
                    ])
                    .with_refresh("real_time")
                    .with_compliance("gdpr_ccpa_compliant"),
            ),
        Entity::new(ATM_LOCATION, "atm_id")
            .with_description("ATM site, for placement and usage analytics")
            .with_governance(
                Governance::new("operations", OPERATIONS_OWNER)
                    .with_domain("infrastructure")
                    .with_classification(DataClassification::Internal)
                    .with_impact(BusinessImpact::Medium)
                    .with_use_cases(&["atm_optimization", "infrastructure_planning", "location_analytics"])
                    .with_refresh("daily")
                    .with_compliance("operational_data"),
            ),
        Entity::new(BRANCH, "branch_id")
            .with_description("Bank branch, for service and staffing analytics")
            .with_governance(
                Governance::new("operations", OPERATIONS_OWNER)
                    .with_domain("infrastructure")
                    .with_classification(DataClassification::Internal)
                    .with_impact(BusinessImpact::High)
                    .with_use_cases(&["branch_optimization", "service_improvement", "customer_experience"])
                    .with_refresh("daily")
                    .with_compliance("operational_data"),
            ),
        Entity::new(TRANSACTION, "transaction_id")
            .with_description("Single card, cash, or transfer transaction")
            .with_governance(
                Governance::new("risk_fraud", RISK_FRAUD_OWNER)
                    .with_domain("transaction")
                    .with_classification(DataClassification::Confidential)
                    .with_pii(true)
                    .with_impact(BusinessImpact::Critical)
                    .with_use_cases(&[
                        "fraud_detection",
                        "aml_compliance",
                        "transaction_analytics",
                        "risk_assessment",
                    ])
                    .with_refresh("real_time")
                    .with_compliance("pci_dss_aml_compliant"),
            ),
    ]
}

fn source_governance(team: &str, owner: &str, domain: &str) -> Governance {
    // every source holds customer-level rows
    Governance::new(team, owner)
        .with_domain(domain)
        .with_classification(DataClassification::Confidential)
        .with_pii(true)
}

pub fn data_sources() -> Vec<DataSource> {
    vec![
        DataSource::file(CUSTOMER_SOURCE, Dataset::Customers)
            .with_description("Customer demographics, tenure, risk profile, and segment")
            .with_source_system("core_banking_system")
            .with_governance(
                source_governance("shared", DATA_PLATFORM_OWNER, "customer")
                    .with_impact(BusinessImpact::Critical)
                    .with_refresh("daily")
                    .with_compliance("gdpr_ccpa_compliant"),
            ),
        DataSource::file(TRANSACTION_SOURCE, Dataset::Transactions)
            .with_description("Card, cash, and transfer transactions with fraud labels")
            .with_source_system("transaction_processing_system")
            .with_governance(
                source_governance("risk_fraud", RISK_FRAUD_OWNER, "transaction")
                    .with_impact(BusinessImpact::Critical)
                    .with_refresh("real_time")
                    .with_compliance("pci_dss_aml_compliant"),
            ),
        DataSource::file(ATM_SOURCE, Dataset::AtmUsage)
            .with_description("ATM withdrawals with time-of-day and site zone")
            .with_source_system("atm_network_system")
            .with_governance(
                source_governance("operations", OPERATIONS_OWNER, "atm")
                    .with_impact(BusinessImpact::Medium)
                    .with_refresh("hourly")
                    .with_compliance("operational_data"),
            ),
        DataSource::file(BRANCH_SOURCE, Dataset::BranchVisits)
            .with_description("Branch visits with wait times and satisfaction scores")
            .with_source_system("branch_management_system")
            .with_governance(
                source_governance("operations", OPERATIONS_OWNER, "branch")
                    .with_impact(BusinessImpact::High)
                    .with_refresh("daily")
                    .with_compliance("operational_data"),
            ),
        DataSource::file(CALL_CENTER_SOURCE, Dataset::CallCenter)
            .with_description("Call center contacts with resolution and escalation outcomes")
            .with_source_system("call_center_system")
            .with_governance(
                source_governance("customer_experience", CX_OWNER, "call_center")
                    .with_impact(BusinessImpact::High)
                    .with_refresh("real_time")
                    .with_compliance("operational_data"),
            ),
    ]
}
