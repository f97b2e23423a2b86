// Canonical feature fields for every dataset column a view can expose.
// Views pick columns by name so descriptions and rules stay consistent.

use crate::datasets::{
    ValueType, ATM_ZONES, BRANCH_SERVICE_TYPES, CALL_TYPES, CUSTOMER_SEGMENTS,
    MERCHANT_CATEGORIES, RISK_PROFILES, TRANSACTION_LOCATIONS, TRANSACTION_TYPES,
};
use crate::definitions::{Field, ValidationRule};

pub const CUSTOMER_DEMOGRAPHICS: &[&str] = &["age", "income", "credit_score"];
pub const CUSTOMER_PROFILE: &[&str] = &[
    "age",
    "income",
    "credit_score",
    "account_tenure_days",
    "risk_profile",
    "customer_segment",
];
pub const TRANSACTION: &[&str] = &[
    "amount",
    "transaction_type",
    "merchant_category",
    "is_fraud",
    "location",
];
pub const ATM_USAGE: &[&str] = &[
    "withdrawal_amount",
    "time_of_day",
    "day_of_week",
    "is_weekend",
    "atm_zone",
];
pub const BRANCH_VISIT: &[&str] = &[
    "service_type",
    "wait_time_minutes",
    "service_duration_minutes",
    "employee_satisfaction_score",
    "customer_satisfaction_score",
];
pub const CALL_CENTER: &[&str] = &[
    "call_type",
    "call_duration_minutes",
    "resolution_time_hours",
    "is_resolved",
    "customer_satisfaction_score",
    "escalation_level",
];

pub fn fields(names: &[&str]) -> Vec<Field> {
    names.iter().map(|name| field(name)).collect()
}

fn satisfaction(name: &str, who: &str) -> Field {
    Field::new(name, ValueType::Float64)
        .with_description(format!("{} satisfaction score on a 1-5 scale", who))
        .with_rule(ValidationRule::range(1.0, 5.0))
}

/// Unknown names fall through as untyped strings for the validator to catch
pub fn field(name: &str) -> Field {
    match name {
        // customers
        "age" => Field::new(name, ValueType::Int64)
            .with_description("Customer age in years")
            .with_pii(true)
            .with_rule(ValidationRule::range(18.0, 100.0)),
        "income" => Field::new(name, ValueType::Int64)
            .with_description("Annual income in USD")
            .with_pii(true)
            .with_rule(ValidationRule::Positive),
        "credit_score" => Field::new(name, ValueType::Int64)
            .with_description("FICO-style credit score")
            .with_pii(true)
            .with_rule(ValidationRule::range(300.0, 850.0)),
        "account_tenure_days" => Field::new(name, ValueType::Int64)
            .with_description("Days since the account was opened")
            .with_rule(ValidationRule::Positive),
        "risk_profile" => Field::new(name, ValueType::String)
            .with_description("Assigned risk tier")
            .with_rule(ValidationRule::one_of(&RISK_PROFILES)),
        "customer_segment" => Field::new(name, ValueType::String)
            .with_description("Marketing segment")
            .with_rule(ValidationRule::one_of(&CUSTOMER_SEGMENTS)),

        // transactions
        "amount" => Field::new(name, ValueType::Float64)
            .with_description("Transaction amount in USD")
            .with_rule(ValidationRule::NonNegative),
        "transaction_type" => Field::new(name, ValueType::String)
            .with_description("Payment channel of the transaction")
            .with_rule(ValidationRule::one_of(&TRANSACTION_TYPES)),
        "merchant_category" => Field::new(name, ValueType::String)
            .with_description("Merchant category of the counterparty")
            .with_rule(ValidationRule::one_of(&MERCHANT_CATEGORIES)),
        "is_fraud" => Field::new(name, ValueType::Bool)
            .with_description("Confirmed fraud label"),
        "location" => Field::new(name, ValueType::String)
            .with_description("Geographic reach relative to the customer's home")
            .with_rule(ValidationRule::one_of(&TRANSACTION_LOCATIONS)),

        // atm usage
        "withdrawal_amount" => Field::new(name, ValueType::Float64)
            .with_description("Cash withdrawn in USD")
            .with_rule(ValidationRule::NonNegative),
        "time_of_day" => Field::new(name, ValueType::Int64)
            .with_description("Hour of the withdrawal, 0-23")
            .with_rule(ValidationRule::range(0.0, 23.0)),
        "day_of_week" => Field::new(name, ValueType::Int64)
            .with_description("Day of the withdrawal, 0 = Monday")
            .with_rule(ValidationRule::range(0.0, 6.0)),
        "is_weekend" => Field::new(name, ValueType::Bool)
            .with_description("Withdrawal happened on a weekend"),
        "atm_zone" => Field::new(name, ValueType::String)
            .with_description("Area type of the ATM site")
            .with_rule(ValidationRule::one_of(&ATM_ZONES)),

        // branch visits
        "service_type" => Field::new(name, ValueType::String)
            .with_description("Reason for the branch visit")
            .with_rule(ValidationRule::one_of(&BRANCH_SERVICE_TYPES)),
        "wait_time_minutes" => Field::new(name, ValueType::Float64)
            .with_description("Minutes waited before service")
            .with_rule(ValidationRule::NonNegative),
        "service_duration_minutes" => Field::new(name, ValueType::Float64)
            .with_description("Minutes spent being served")
            .with_rule(ValidationRule::NonNegative),
        "employee_satisfaction_score" => satisfaction(name, "Employee"),
        "customer_satisfaction_score" => satisfaction(name, "Customer"),

        // call center
        "call_type" => Field::new(name, ValueType::String)
            .with_description("Reason for the call")
            .with_rule(ValidationRule::one_of(&CALL_TYPES)),
        "call_duration_minutes" => Field::new(name, ValueType::Float64)
            .with_description("Call length in minutes")
            .with_rule(ValidationRule::NonNegative),
        "resolution_time_hours" => Field::new(name, ValueType::Float64)
            .with_description("Hours until the issue was resolved")
            .with_rule(ValidationRule::NonNegative),
        "is_resolved" => Field::new(name, ValueType::Bool)
            .with_description("Issue resolved by the call"),
        "escalation_level" => Field::new(name, ValueType::Int64)
            .with_description("Support tier the call reached")
            .with_rule(ValidationRule::range(1.0, 5.0)),

        _ => Field::new(name, ValueType::String),
    }
}
