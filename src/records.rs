// 🧾 Sample Records - one struct per generated table
// Row-oriented for generation and CSV, converted to Arrow batches for Parquet

use anyhow::{Context, Result};
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampMicrosecondArray,
};
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::datasets::Dataset;

// ============================================================================
// RECORD TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub customer_id: String,
    pub age: i64,
    pub income: i64,
    pub credit_score: i64,
    pub account_tenure_days: i64,
    pub risk_profile: String,
    pub customer_segment: String,
    pub city: String,
    pub state: String,
    pub created_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub customer_id: String,
    pub transaction_id: String,
    pub amount: f64,
    pub transaction_type: String,
    pub merchant_category: String,
    pub is_fraud: bool,
    pub location: String,
    pub event_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtmUsageRecord {
    pub customer_id: String,
    pub atm_id: String,
    pub withdrawal_amount: f64,
    /// Hour of day, 0-23
    pub time_of_day: i64,
    /// 0 = Monday
    pub day_of_week: i64,
    pub is_weekend: bool,
    pub atm_zone: String,
    pub event_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BranchVisitRecord {
    pub customer_id: String,
    pub branch_id: String,
    pub service_type: String,
    pub wait_time_minutes: f64,
    pub service_duration_minutes: f64,
    pub employee_satisfaction_score: f64,
    pub customer_satisfaction_score: f64,
    pub event_timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallCenterRecord {
    pub customer_id: String,
    pub call_id: String,
    pub call_type: String,
    pub call_duration_minutes: f64,
    pub resolution_time_hours: f64,
    pub is_resolved: bool,
    pub customer_satisfaction_score: f64,
    pub escalation_level: i64,
    pub event_timestamp: DateTime<Utc>,
}

// ============================================================================
// ARROW CONVERSION
// ============================================================================

/// A row type that belongs to one dataset and can be laid out column-wise.
///
/// `columns` must return arrays in the order of `Self::DATASET.columns()`.
pub trait DatasetRecord: Serialize + for<'de> Deserialize<'de> {
    const DATASET: Dataset;

    fn columns(rows: &[Self]) -> Vec<ArrayRef>
    where
        Self: Sized;
}

/// Build a single record batch for a slice of rows
pub fn to_record_batch<R: DatasetRecord>(rows: &[R]) -> Result<RecordBatch> {
    let schema = Arc::new(R::DATASET.arrow_schema());
    RecordBatch::try_new(schema, R::columns(rows))
        .with_context(|| format!("Failed to build record batch for {}", R::DATASET))
}

fn strings<'a>(values: impl Iterator<Item = &'a str>) -> ArrayRef {
    Arc::new(StringArray::from_iter_values(values))
}

fn ints(values: impl Iterator<Item = i64>) -> ArrayRef {
    Arc::new(Int64Array::from_iter_values(values))
}

fn floats(values: impl Iterator<Item = f64>) -> ArrayRef {
    Arc::new(Float64Array::from_iter_values(values))
}

fn bools(values: impl Iterator<Item = bool>) -> ArrayRef {
    Arc::new(BooleanArray::from(values.collect::<Vec<bool>>()))
}

fn timestamps<'a>(values: impl Iterator<Item = &'a DateTime<Utc>>) -> ArrayRef {
    Arc::new(
        TimestampMicrosecondArray::from_iter_values(values.map(|ts| ts.timestamp_micros()))
            .with_timezone("UTC"),
    )
}

impl DatasetRecord for CustomerRecord {
    const DATASET: Dataset = Dataset::Customers;

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            strings(rows.iter().map(|r| r.customer_id.as_str())),
            ints(rows.iter().map(|r| r.age)),
            ints(rows.iter().map(|r| r.income)),
            ints(rows.iter().map(|r| r.credit_score)),
            ints(rows.iter().map(|r| r.account_tenure_days)),
            strings(rows.iter().map(|r| r.risk_profile.as_str())),
            strings(rows.iter().map(|r| r.customer_segment.as_str())),
            strings(rows.iter().map(|r| r.city.as_str())),
            strings(rows.iter().map(|r| r.state.as_str())),
            timestamps(rows.iter().map(|r| &r.created_timestamp)),
        ]
    }
}

impl DatasetRecord for TransactionRecord {
    const DATASET: Dataset = Dataset::Transactions;

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            strings(rows.iter().map(|r| r.customer_id.as_str())),
            strings(rows.iter().map(|r| r.transaction_id.as_str())),
            floats(rows.iter().map(|r| r.amount)),
            strings(rows.iter().map(|r| r.transaction_type.as_str())),
            strings(rows.iter().map(|r| r.merchant_category.as_str())),
            bools(rows.iter().map(|r| r.is_fraud)),
            strings(rows.iter().map(|r| r.location.as_str())),
            timestamps(rows.iter().map(|r| &r.event_timestamp)),
        ]
    }
}

impl DatasetRecord for AtmUsageRecord {
    const DATASET: Dataset = Dataset::AtmUsage;

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            strings(rows.iter().map(|r| r.customer_id.as_str())),
            strings(rows.iter().map(|r| r.atm_id.as_str())),
            floats(rows.iter().map(|r| r.withdrawal_amount)),
            ints(rows.iter().map(|r| r.time_of_day)),
            ints(rows.iter().map(|r| r.day_of_week)),
            bools(rows.iter().map(|r| r.is_weekend)),
            strings(rows.iter().map(|r| r.atm_zone.as_str())),
            timestamps(rows.iter().map(|r| &r.event_timestamp)),
        ]
    }
}

impl DatasetRecord for BranchVisitRecord {
    const DATASET: Dataset = Dataset::BranchVisits;

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            strings(rows.iter().map(|r| r.customer_id.as_str())),
            strings(rows.iter().map(|r| r.branch_id.as_str())),
            strings(rows.iter().map(|r| r.service_type.as_str())),
            floats(rows.iter().map(|r| r.wait_time_minutes)),
            floats(rows.iter().map(|r| r.service_duration_minutes)),
            floats(rows.iter().map(|r| r.employee_satisfaction_score)),
            floats(rows.iter().map(|r| r.customer_satisfaction_score)),
            timestamps(rows.iter().map(|r| &r.event_timestamp)),
        ]
    }
}

impl DatasetRecord for CallCenterRecord {
    const DATASET: Dataset = Dataset::CallCenter;

    fn columns(rows: &[Self]) -> Vec<ArrayRef> {
        vec![
            strings(rows.iter().map(|r| r.customer_id.as_str())),
            strings(rows.iter().map(|r| r.call_id.as_str())),
            strings(rows.iter().map(|r| r.call_type.as_str())),
            floats(rows.iter().map(|r| r.call_duration_minutes)),
            floats(rows.iter().map(|r| r.resolution_time_hours)),
            bools(rows.iter().map(|r| r.is_resolved)),
            floats(rows.iter().map(|r| r.customer_satisfaction_score)),
            ints(rows.iter().map(|r| r.escalation_level)),
            timestamps(rows.iter().map(|r| &r.event_timestamp)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_record_batch_follows_dataset_schema() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let rows = vec![
            TransactionRecord {
                customer_id: "CUST_000001".to_string(),
                transaction_id: "TXN_00000001".to_string(),
                amount: 12.5,
                transaction_type: "DEBIT_CARD".to_string(),
                merchant_category: "GAS".to_string(),
                is_fraud: false,
                location: "LOCAL".to_string(),
                event_timestamp: ts,
            },
            TransactionRecord {
                customer_id: "CUST_000002".to_string(),
                transaction_id: "TXN_00000002".to_string(),
                amount: 99.0,
                transaction_type: "CHECK".to_string(),
                merchant_category: "RETAIL".to_string(),
                is_fraud: true,
                location: "NATIONAL".to_string(),
                event_timestamp: ts,
            },
        ];

        let batch = to_record_batch(&rows).unwrap();

        assert_eq!(batch.num_rows(), 2);
        assert_eq!(batch.num_columns(), Dataset::Transactions.columns().len());
        assert_eq!(batch.schema().as_ref(), &Dataset::Transactions.arrow_schema());
    }

    #[test]
    fn test_empty_rows_give_empty_batch() {
        let batch = to_record_batch::<CustomerRecord>(&[]).unwrap();
        assert_eq!(batch.num_rows(), 0);
    }
}
