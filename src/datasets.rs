// 📦 Dataset Catalog - the five synthetic source tables
// Column layout, value types, and Arrow schemas shared by generator, writers, and validators

use arrow::datatypes::{DataType, Field as ArrowField, Schema, TimeUnit};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::datafiles::OutputFormat;

// ============================================================================
// VALUE TYPES
// ============================================================================

/// Value type of a dataset column or feature field.
///
/// Names follow the feature-store framework's value type enumeration so the
/// definitions can be handed over without translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    String,
    Int64,
    Float64,
    Bool,
    UnixTimestamp,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::String => "STRING",
            ValueType::Int64 => "INT64",
            ValueType::Float64 => "FLOAT64",
            ValueType::Bool => "BOOL",
            ValueType::UnixTimestamp => "UNIX_TIMESTAMP",
        }
    }

    /// Arrow type used when the column is written to Parquet
    pub fn arrow_type(&self) -> DataType {
        match self {
            ValueType::String => DataType::Utf8,
            ValueType::Int64 => DataType::Int64,
            ValueType::Float64 => DataType::Float64,
            ValueType::Bool => DataType::Boolean,
            ValueType::UnixTimestamp => DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ValueType::Int64 | ValueType::Float64)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// CATEGORICAL VOCABULARIES
// ============================================================================

pub const RISK_PROFILES: [&str; 3] = ["LOW", "MEDIUM", "HIGH"];
pub const CUSTOMER_SEGMENTS: [&str; 3] = ["PREMIUM", "STANDARD", "BASIC"];
pub const CITIES: [&str; 5] = ["New York", "Los Angeles", "Chicago", "Houston", "Phoenix"];
pub const STATES: [&str; 5] = ["NY", "CA", "IL", "TX", "AZ"];

pub const TRANSACTION_TYPES: [&str; 5] = [
    "ATM_WITHDRAWAL",
    "DEBIT_CARD",
    "ONLINE_TRANSFER",
    "CHECK",
    "CASH_DEPOSIT",
];
pub const MERCHANT_CATEGORIES: [&str; 6] = [
    "GROCERY",
    "GAS",
    "RESTAURANT",
    "RETAIL",
    "UTILITIES",
    "HEALTHCARE",
];
pub const TRANSACTION_LOCATIONS: [&str; 4] = ["LOCAL", "REGIONAL", "NATIONAL", "INTERNATIONAL"];

pub const ATM_ZONES: [&str; 4] = ["DOWNTOWN", "SUBURBAN", "AIRPORT", "MALL"];
pub const ATM_COUNT: usize = 50;

pub const BRANCH_SERVICE_TYPES: [&str; 5] = [
    "ACCOUNT_OPENING",
    "LOAN_APPLICATION",
    "INQUIRY",
    "TRANSACTION",
    "COMPLAINT",
];
pub const BRANCH_COUNT: usize = 20;

pub const CALL_TYPES: [&str; 5] = [
    "INQUIRY",
    "COMPLAINT",
    "TECHNICAL_SUPPORT",
    "ACCOUNT_ISSUE",
    "PRODUCT_INFO",
];
pub const ESCALATION_LEVELS: [i64; 3] = [1, 2, 3];

// ============================================================================
// COLUMN SPEC
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub value_type: ValueType,
}

const fn col(name: &'static str, value_type: ValueType) -> ColumnSpec {
    ColumnSpec { name, value_type }
}

const CUSTOMER_COLUMNS: &[ColumnSpec] = &[
    col("customer_id", ValueType::String),
    col("age", ValueType::Int64),
    col("income", ValueType::Int64),
    col("credit_score", ValueType::Int64),
    col("account_tenure_days", ValueType::Int64),
    col("risk_profile", ValueType::String),
    col("customer_segment", ValueType::String),
    col("city", ValueType::String),
    col("state", ValueType::String),
    col("created_timestamp", ValueType::UnixTimestamp),
];

const TRANSACTION_COLUMNS: &[ColumnSpec] = &[
    col("customer_id", ValueType::String),
    col("transaction_id", ValueType::String),
    col("amount", ValueType::Float64),
    col("transaction_type", ValueType::String),
    col("merchant_category", ValueType::String),
    col("is_fraud", ValueType::Bool),
    col("location", ValueType::String),
    col("event_timestamp", ValueType::UnixTimestamp),
];

const ATM_USAGE_COLUMNS: &[ColumnSpec] = &[
    col("customer_id", ValueType::String),
    col("atm_id", ValueType::String),
    col("withdrawal_amount", ValueType::Float64),
    col("time_of_day", ValueType::Int64),
    col("day_of_week", ValueType::Int64),
    col("is_weekend", ValueType::Bool),
    col("atm_zone", ValueType::String),
    col("event_timestamp", ValueType::UnixTimestamp),
];

const BRANCH_VISIT_COLUMNS: &[ColumnSpec] = &[
    col("customer_id", ValueType::String),
    col("branch_id", ValueType::String),
    col("service_type", ValueType::String),
    col("wait_time_minutes", ValueType::Float64),
    col("service_duration_minutes", ValueType::Float64),
    col("employee_satisfaction_score", ValueType::Float64),
    col("customer_satisfaction_score", ValueType::Float64),
    col("event_timestamp", ValueType::UnixTimestamp),
];

const CALL_CENTER_COLUMNS: &[ColumnSpec] = &[
    col("customer_id", ValueType::String),
    col("call_id", ValueType::String),
    col("call_type", ValueType::String),
    col("call_duration_minutes", ValueType::Float64),
    col("resolution_time_hours", ValueType::Float64),
    col("is_resolved", ValueType::Bool),
    col("customer_satisfaction_score", ValueType::Float64),
    col("escalation_level", ValueType::Int64),
    col("event_timestamp", ValueType::UnixTimestamp),
];

// ============================================================================
// DATASET
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dataset {
    Customers,
    Transactions,
    AtmUsage,
    BranchVisits,
    CallCenter,
}

impl Dataset {
    /// All datasets in generation order (customers first, dependents after)
    pub const ALL: [Dataset; 5] = [
        Dataset::Customers,
        Dataset::Transactions,
        Dataset::AtmUsage,
        Dataset::BranchVisits,
        Dataset::CallCenter,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Customers => "customers",
            Dataset::Transactions => "transactions",
            Dataset::AtmUsage => "atm_usage",
            Dataset::BranchVisits => "branch_visits",
            Dataset::CallCenter => "call_center",
        }
    }

    pub fn from_name(name: &str) -> Option<Dataset> {
        Dataset::ALL.into_iter().find(|d| d.name() == name)
    }

    pub fn file_name(&self, format: OutputFormat) -> String {
        format!("{}.{}", self.name(), format.extension())
    }

    /// Column holding the event (or creation) time of each row
    pub fn timestamp_field(&self) -> &'static str {
        match self {
            Dataset::Customers => "created_timestamp",
            _ => "event_timestamp",
        }
    }

    pub fn columns(&self) -> &'static [ColumnSpec] {
        match self {
            Dataset::Customers => CUSTOMER_COLUMNS,
            Dataset::Transactions => TRANSACTION_COLUMNS,
            Dataset::AtmUsage => ATM_USAGE_COLUMNS,
            Dataset::BranchVisits => BRANCH_VISIT_COLUMNS,
            Dataset::CallCenter => CALL_CENTER_COLUMNS,
        }
    }

    pub fn column(&self, name: &str) -> Option<&'static ColumnSpec> {
        self.columns().iter().find(|c| c.name == name)
    }

    /// Whether rows carry a `customer_id` that must point at a generated customer
    pub fn references_customers(&self) -> bool {
        !matches!(self, Dataset::Customers)
    }

    /// Column whose values must be unique across the table, if any
    pub fn unique_key(&self) -> Option<&'static str> {
        match self {
            Dataset::Customers => Some("customer_id"),
            Dataset::Transactions => Some("transaction_id"),
            Dataset::CallCenter => Some("call_id"),
            Dataset::AtmUsage | Dataset::BranchVisits => None,
        }
    }

    pub fn arrow_schema(&self) -> Schema {
        let fields: Vec<ArrowField> = self
            .columns()
            .iter()
            .map(|c| ArrowField::new(c.name, c.value_type.arrow_type(), false))
            .collect();
        Schema::new(fields)
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_dataset_has_its_timestamp_column() {
        for dataset in Dataset::ALL {
            let ts = dataset.column(dataset.timestamp_field());
            assert!(ts.is_some(), "{} is missing {}", dataset, dataset.timestamp_field());
            assert_eq!(ts.unwrap().value_type, ValueType::UnixTimestamp);
        }
    }

    #[test]
    fn test_dependent_datasets_carry_customer_id() {
        for dataset in Dataset::ALL.iter().filter(|d| d.references_customers()) {
            assert!(dataset.column("customer_id").is_some());
        }
    }

    #[test]
    fn test_dataset_name_round_trip() {
        assert_eq!(Dataset::from_name("atm_usage"), Some(Dataset::AtmUsage));
        assert_eq!(Dataset::from_name("branches"), None);
        assert_eq!(Dataset::CallCenter.file_name(OutputFormat::Parquet), "call_center.parquet");
        assert_eq!(Dataset::Customers.file_name(OutputFormat::Csv), "customers.csv");
    }

    #[test]
    fn test_arrow_schema_matches_columns() {
        let schema = Dataset::Transactions.arrow_schema();
        assert_eq!(schema.fields().len(), Dataset::Transactions.columns().len());
        assert_eq!(schema.field(5).name(), "is_fraud");
        assert_eq!(schema.field(5).data_type(), &DataType::Boolean);
    }
}
