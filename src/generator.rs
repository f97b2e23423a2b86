// 🎲 Sample Data Generator - synthetic banking datasets
// Seeded RNG + fixed distributions → schema-consistent, referentially consistent tables

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, NaiveTime, TimeZone, Utc};
use rand::distributions::{Distribution, Uniform, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Exp, LogNormal, Normal};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::config::{check_window, GeneratorConfig};
use crate::datasets::{
    Dataset, ATM_COUNT, ATM_ZONES, BRANCH_COUNT, BRANCH_SERVICE_TYPES, CALL_TYPES, CITIES,
    CUSTOMER_SEGMENTS, ESCALATION_LEVELS, MERCHANT_CATEGORIES, RISK_PROFILES, STATES,
    TRANSACTION_LOCATIONS, TRANSACTION_TYPES,
};
use crate::records::{
    AtmUsageRecord, BranchVisitRecord, CallCenterRecord, CustomerRecord, TransactionRecord,
};

// ============================================================================
// DOCUMENTED RANGES
// ============================================================================

pub const AGE_RANGE: (i64, i64) = (18, 80);
pub const CREDIT_SCORE_RANGE: (i64, i64) = (300, 850);
pub const TENURE_RANGE: (i64, i64) = (30, 3650);
pub const SATISFACTION_RANGE: (f64, f64) = (1.0, 5.0);

const RISK_PROFILE_WEIGHTS: [f64; 3] = [0.6, 0.3, 0.1];
const SEGMENT_WEIGHTS: [f64; 3] = [0.2, 0.6, 0.2];
const TRANSACTION_TYPE_WEIGHTS: [f64; 5] = [0.3, 0.4, 0.15, 0.1, 0.05];
const LOCATION_WEIGHTS: [f64; 4] = [0.6, 0.25, 0.1, 0.05];
const SERVICE_TYPE_WEIGHTS: [f64; 5] = [0.1, 0.2, 0.3, 0.3, 0.1];
const CALL_TYPE_WEIGHTS: [f64; 5] = [0.3, 0.2, 0.2, 0.2, 0.1];
const ESCALATION_WEIGHTS: [f64; 3] = [0.7, 0.25, 0.05];

const FRAUD_RATE: f64 = 0.05;
const WEEKEND_RATE: f64 = 0.3;
const RESOLVED_RATE: f64 = 0.85;

// ============================================================================
// SAMPLE DATA
// ============================================================================

/// All five generated tables
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampleData {
    pub customers: Vec<CustomerRecord>,
    pub transactions: Vec<TransactionRecord>,
    pub atm_usage: Vec<AtmUsageRecord>,
    pub branch_visits: Vec<BranchVisitRecord>,
    pub call_center: Vec<CallCenterRecord>,
}

impl SampleData {
    pub fn row_count(&self, dataset: Dataset) -> usize {
        match dataset {
            Dataset::Customers => self.customers.len(),
            Dataset::Transactions => self.transactions.len(),
            Dataset::AtmUsage => self.atm_usage.len(),
            Dataset::BranchVisits => self.branch_visits.len(),
            Dataset::CallCenter => self.call_center.len(),
        }
    }

    pub fn row_counts(&self) -> BTreeMap<Dataset, usize> {
        Dataset::ALL
            .into_iter()
            .map(|d| (d, self.row_count(d)))
            .collect()
    }
}

// ============================================================================
// CATEGORICAL SAMPLER
// ============================================================================

/// Weighted choice over a fixed vocabulary
struct Categorical<T: Copy + 'static> {
    values: &'static [T],
    index: WeightedIndex<f64>,
}

impl<T: Copy + 'static> Categorical<T> {
    fn weighted(values: &'static [T], weights: &[f64]) -> Result<Self> {
        let index = WeightedIndex::new(weights).context("Invalid category weights")?;
        Ok(Categorical { values, index })
    }

    fn uniform(values: &'static [T]) -> Result<Self> {
        Self::weighted(values, &vec![1.0; values.len()])
    }

    fn sample(&self, rng: &mut StdRng) -> T {
        self.values[self.index.sample(rng)]
    }
}

// ============================================================================
// GENERATOR
// ============================================================================

pub struct SampleDataGenerator {
    config: GeneratorConfig,
    rng: StdRng,
    /// Anchor for all event windows
    now: DateTime<Utc>,
}

impl SampleDataGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let now = config.anchor.unwrap_or_else(Utc::now);
        SampleDataGenerator { config, rng, now }
    }

    /// Fix the anchor time so event timestamps are reproducible
    pub fn with_anchor(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn anchor(&self) -> DateTime<Utc> {
        self.now
    }

    fn event_times(&self, window_days: i64, n: usize) -> Result<Vec<DateTime<Utc>>> {
        check_window(window_days)?;
        Ok(spread_timestamps(self.now, window_days, n))
    }

    /// Generate every table, customers first
    pub fn generate_all(&mut self) -> Result<SampleData> {
        self.config.validate()?;
        info!(
            customers = self.config.customers,
            dependent_records = self.config.dependent_records(),
            seed = ?self.config.seed,
            "generating sample data"
        );

        let customers = self.generate_customers()?;
        let transactions = self.generate_transactions(&customers)?;
        let atm_usage = self.generate_atm_usage(&customers)?;
        let branch_visits = self.generate_branch_visits(&customers)?;
        let call_center = self.generate_call_center(&customers)?;

        Ok(SampleData {
            customers,
            transactions,
            atm_usage,
            branch_visits,
            call_center,
        })
    }

    pub fn generate_customers(&mut self) -> Result<Vec<CustomerRecord>> {
        let n = self.config.customers;

        let income_dist = LogNormal::new(10.0, 0.5).context("Invalid income distribution")?;
        let credit_dist = Normal::new(650.0, 100.0).context("Invalid credit score distribution")?;
        let age_dist = Uniform::new(AGE_RANGE.0, AGE_RANGE.1);
        let tenure_dist = Uniform::new(TENURE_RANGE.0, TENURE_RANGE.1);
        let risk = Categorical::weighted(&RISK_PROFILES, &RISK_PROFILE_WEIGHTS)?;
        let segment = Categorical::weighted(&CUSTOMER_SEGMENTS, &SEGMENT_WEIGHTS)?;
        let city = Categorical::uniform(&CITIES)?;
        let state = Categorical::uniform(&STATES)?;

        let epoch = Utc.from_utc_datetime(&self.config.customer_epoch.and_time(NaiveTime::default()));

        let rng = &mut self.rng;
        let mut customers = Vec::with_capacity(n);

        for i in 0..n {
            let income = (income_dist.sample(rng) as i64).max(1);
            let credit_score = (credit_dist.sample(rng) as i64)
                .clamp(CREDIT_SCORE_RANGE.0, CREDIT_SCORE_RANGE.1);

            customers.push(CustomerRecord {
                customer_id: format!("CUST_{:06}", i + 1),
                age: age_dist.sample(rng),
                income,
                credit_score,
                account_tenure_days: tenure_dist.sample(rng),
                risk_profile: risk.sample(rng).to_string(),
                customer_segment: segment.sample(rng).to_string(),
                city: city.sample(rng).to_string(),
                state: state.sample(rng).to_string(),
                created_timestamp: epoch + Duration::days(i as i64),
            });
        }

        debug!(count = customers.len(), "customers generated");
        Ok(customers)
    }

    pub fn generate_transactions(
        &mut self,
        customers: &[CustomerRecord],
    ) -> Result<Vec<TransactionRecord>> {
        let n = self.config.transactions;
        let picker = CustomerPicker::new(customers, Dataset::Transactions, n)?;

        let amount_dist = LogNormal::new(5.0, 1.5).context("Invalid amount distribution")?;
        let txn_type = Categorical::weighted(&TRANSACTION_TYPES, &TRANSACTION_TYPE_WEIGHTS)?;
        let merchant = Categorical::uniform(&MERCHANT_CATEGORIES)?;
        let location = Categorical::weighted(&TRANSACTION_LOCATIONS, &LOCATION_WEIGHTS)?;
        let times = self.event_times(self.config.transaction_window_days, n)?;

        let rng = &mut self.rng;
        let mut records = Vec::with_capacity(n);

        for (i, event_timestamp) in times.into_iter().enumerate() {
            records.push(TransactionRecord {
                customer_id: picker.pick(rng),
                transaction_id: format!("TXN_{:08}", i + 1),
                amount: round_to(amount_dist.sample(rng), 2),
                transaction_type: txn_type.sample(rng).to_string(),
                merchant_category: merchant.sample(rng).to_string(),
                is_fraud: rng.gen_bool(FRAUD_RATE),
                location: location.sample(rng).to_string(),
                event_timestamp,
            });
        }

        debug!(count = records.len(), "transactions generated");
        Ok(records)
    }

    pub fn generate_atm_usage(&mut self, customers: &[CustomerRecord]) -> Result<Vec<AtmUsageRecord>> {
        let n = self.config.atm_usage;
        let picker = CustomerPicker::new(customers, Dataset::AtmUsage, n)?;

        let amount_dist = LogNormal::new(4.0, 1.0).context("Invalid withdrawal distribution")?;
        let atm_dist = Uniform::new_inclusive(1, ATM_COUNT);
        let hour_dist = Uniform::new(0i64, 24);
        let weekday_dist = Uniform::new(0i64, 7);
        let zone = Categorical::uniform(&ATM_ZONES)?;
        let times = self.event_times(self.config.atm_window_days, n)?;

        let rng = &mut self.rng;
        let mut records = Vec::with_capacity(n);

        for event_timestamp in times {
            records.push(AtmUsageRecord {
                customer_id: picker.pick(rng),
                atm_id: format!("ATM_{:03}", atm_dist.sample(rng)),
                withdrawal_amount: round_to(amount_dist.sample(rng), 2),
                time_of_day: hour_dist.sample(rng),
                day_of_week: weekday_dist.sample(rng),
                is_weekend: rng.gen_bool(WEEKEND_RATE),
                atm_zone: zone.sample(rng).to_string(),
                event_timestamp,
            });
        }

        debug!(count = records.len(), "atm usage generated");
        Ok(records)
    }

    pub fn generate_branch_visits(
        &mut self,
        customers: &[CustomerRecord],
    ) -> Result<Vec<BranchVisitRecord>> {
        let n = self.config.branch_visits;
        let picker = CustomerPicker::new(customers, Dataset::BranchVisits, n)?;

        let branch_dist = Uniform::new_inclusive(1, BRANCH_COUNT);
        let service = Categorical::weighted(&BRANCH_SERVICE_TYPES, &SERVICE_TYPE_WEIGHTS)?;
        let wait_dist = Exp::new(1.0 / 15.0).context("Invalid wait time distribution")?;
        let duration_dist = Exp::new(1.0 / 20.0).context("Invalid service duration distribution")?;
        let times = self.event_times(self.config.branch_window_days, n)?;

        let rng = &mut self.rng;
        let mut records = Vec::with_capacity(n);

        for event_timestamp in times {
            records.push(BranchVisitRecord {
                customer_id: picker.pick(rng),
                branch_id: format!("BRANCH_{:03}", branch_dist.sample(rng)),
                service_type: service.sample(rng).to_string(),
                wait_time_minutes: round_to(wait_dist.sample(rng), 1),
                service_duration_minutes: round_to(duration_dist.sample(rng), 1),
                employee_satisfaction_score: satisfaction_score(rng),
                customer_satisfaction_score: satisfaction_score(rng),
                event_timestamp,
            });
        }

        debug!(count = records.len(), "branch visits generated");
        Ok(records)
    }

    pub fn generate_call_center(
        &mut self,
        customers: &[CustomerRecord],
    ) -> Result<Vec<CallCenterRecord>> {
        let n = self.config.call_center;
        let picker = CustomerPicker::new(customers, Dataset::CallCenter, n)?;

        let call_type = Categorical::weighted(&CALL_TYPES, &CALL_TYPE_WEIGHTS)?;
        let duration_dist = Exp::new(1.0 / 8.0).context("Invalid call duration distribution")?;
        let resolution_dist = Exp::new(1.0 / 24.0).context("Invalid resolution time distribution")?;
        let escalation = Categorical::weighted(&ESCALATION_LEVELS, &ESCALATION_WEIGHTS)?;
        let times = self.event_times(self.config.call_window_days, n)?;

        let rng = &mut self.rng;
        let mut records = Vec::with_capacity(n);

        for (i, event_timestamp) in times.into_iter().enumerate() {
            records.push(CallCenterRecord {
                customer_id: picker.pick(rng),
                call_id: format!("CALL_{:08}", i + 1),
                call_type: call_type.sample(rng).to_string(),
                call_duration_minutes: round_to(duration_dist.sample(rng), 1),
                resolution_time_hours: round_to(resolution_dist.sample(rng), 1),
                is_resolved: rng.gen_bool(RESOLVED_RATE),
                customer_satisfaction_score: satisfaction_score(rng),
                escalation_level: escalation.sample(rng),
                event_timestamp,
            });
        }

        debug!(count = records.len(), "call center records generated");
        Ok(records)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// Uniform choice among generated customer ids
struct CustomerPicker<'a> {
    customers: &'a [CustomerRecord],
    index: Uniform<usize>,
}

impl<'a> CustomerPicker<'a> {
    fn new(customers: &'a [CustomerRecord], dataset: Dataset, requested: usize) -> Result<Self> {
        if customers.is_empty() {
            if requested > 0 {
                bail!(
                    "Cannot generate {} {} records without any customers",
                    requested,
                    dataset
                );
            }
            // Nothing will be picked; any non-empty range keeps Uniform valid
            return Ok(CustomerPicker {
                customers,
                index: Uniform::new(0, 1),
            });
        }

        Ok(CustomerPicker {
            customers,
            index: Uniform::new(0, customers.len()),
        })
    }

    fn pick(&self, rng: &mut StdRng) -> String {
        self.customers[self.index.sample(rng)].customer_id.clone()
    }
}

/// `n` timestamps evenly spaced over `[now - window_days, now]`
pub fn spread_timestamps(now: DateTime<Utc>, window_days: i64, n: usize) -> Vec<DateTime<Utc>> {
    let start = now - Duration::days(window_days);
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let span = (now - start).num_microseconds().unwrap_or(0) as i128;
            let steps = (n - 1) as i128;
            // span * i exceeds i64 for long windows with ~1M rows
            (0..n as i128)
                .map(|i| start + Duration::microseconds((span * i / steps) as i64))
                .collect()
        }
    }
}

fn satisfaction_score(rng: &mut StdRng) -> f64 {
    round_to(rng.gen_range(SATISFACTION_RANGE.0..SATISFACTION_RANGE.1), 1)
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn anchor() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap()
    }

    fn small_data(seed: u64) -> SampleData {
        SampleDataGenerator::new(GeneratorConfig::small().with_seed(seed))
            .with_anchor(anchor())
            .generate_all()
            .unwrap()
    }

    #[test]
    fn test_customer_ids_are_unique_and_formatted() {
        let data = small_data(42);
        let ids: HashSet<&str> = data.customers.iter().map(|c| c.customer_id.as_str()).collect();

        assert_eq!(ids.len(), data.customers.len());
        assert_eq!(data.customers[0].customer_id, "CUST_000001");
        assert_eq!(data.customers[49].customer_id, "CUST_000050");
    }

    #[test]
    fn test_dependent_records_reference_generated_customers() {
        let data = small_data(42);
        let ids: HashSet<&str> = data.customers.iter().map(|c| c.customer_id.as_str()).collect();

        assert!(data.transactions.iter().all(|r| ids.contains(r.customer_id.as_str())));
        assert!(data.atm_usage.iter().all(|r| ids.contains(r.customer_id.as_str())));
        assert!(data.branch_visits.iter().all(|r| ids.contains(r.customer_id.as_str())));
        assert!(data.call_center.iter().all(|r| ids.contains(r.customer_id.as_str())));
    }

    #[test]
    fn test_numeric_fields_stay_in_documented_ranges() {
        let data = small_data(7);

        for c in &data.customers {
            assert!((AGE_RANGE.0..AGE_RANGE.1).contains(&c.age), "age {}", c.age);
            assert!(c.income >= 1);
            assert!((CREDIT_SCORE_RANGE.0..=CREDIT_SCORE_RANGE.1).contains(&c.credit_score));
            assert!((TENURE_RANGE.0..TENURE_RANGE.1).contains(&c.account_tenure_days));
        }
        for t in &data.transactions {
            assert!(t.amount >= 0.0);
        }
        for a in &data.atm_usage {
            assert!((0..24).contains(&a.time_of_day));
            assert!((0..7).contains(&a.day_of_week));
            assert!(a.withdrawal_amount >= 0.0);
        }
        for b in &data.branch_visits {
            assert!(b.wait_time_minutes >= 0.0);
            assert!(b.service_duration_minutes >= 0.0);
            assert!((1.0..=5.0).contains(&b.employee_satisfaction_score));
            assert!((1.0..=5.0).contains(&b.customer_satisfaction_score));
        }
        for c in &data.call_center {
            assert!(c.call_duration_minutes >= 0.0);
            assert!(c.resolution_time_hours >= 0.0);
            assert!((1.0..=5.0).contains(&c.customer_satisfaction_score));
            assert!(ESCALATION_LEVELS.contains(&c.escalation_level));
        }
    }

    #[test]
    fn test_same_seed_and_anchor_reproduce_identical_data() {
        let first = small_data(42);
        let second = small_data(42);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unseeded_runs_keep_record_counts() {
        let mut config = GeneratorConfig::small();
        config.seed = None;

        let a = SampleDataGenerator::new(config.clone()).generate_all().unwrap();
        let b = SampleDataGenerator::new(config).generate_all().unwrap();

        assert_eq!(a.row_counts(), b.row_counts());
        assert_eq!(a.row_count(Dataset::Transactions), 500);
    }

    #[test]
    fn test_dependent_records_without_customers_fail() {
        let mut config = GeneratorConfig::small();
        config.customers = 0;

        let result = SampleDataGenerator::new(config).generate_all();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_counts_everywhere_is_fine() {
        let config = GeneratorConfig {
            customers: 0,
            transactions: 0,
            atm_usage: 0,
            branch_visits: 0,
            call_center: 0,
            ..GeneratorConfig::default()
        };

        let data = SampleDataGenerator::new(config).generate_all().unwrap();
        assert!(data.row_counts().values().all(|&n| n == 0));
    }

    #[test]
    fn test_timestamps_span_the_window() {
        let now = anchor();
        let times = spread_timestamps(now, 90, 10);

        assert_eq!(times.len(), 10);
        assert_eq!(times[0], now - Duration::days(90));
        assert_eq!(times[9], now);
        assert!(times.windows(2).all(|w| w[0] <= w[1]));

        assert_eq!(spread_timestamps(now, 90, 1), vec![now - Duration::days(90)]);
        assert!(spread_timestamps(now, 90, 0).is_empty());
    }

    #[test]
    fn test_long_window_with_a_million_rows_stays_in_range() {
        let now = anchor();
        let start = now - Duration::days(120);
        let times = spread_timestamps(now, 120, 1_000_000);

        assert_eq!(times.len(), 1_000_000);
        assert_eq!(times[0], start);
        assert_eq!(times[999_999], now);
        assert!(times.iter().all(|t| *t >= start && *t <= now));
        assert!(times.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_each_dataset_uses_its_own_window() {
        let now = anchor();
        let data = small_data(3);
        let config = GeneratorConfig::small();

        let series: [(Dataset, Vec<DateTime<Utc>>); 4] = [
            (
                Dataset::Transactions,
                data.transactions.iter().map(|r| r.event_timestamp).collect(),
            ),
            (
                Dataset::AtmUsage,
                data.atm_usage.iter().map(|r| r.event_timestamp).collect(),
            ),
            (
                Dataset::BranchVisits,
                data.branch_visits.iter().map(|r| r.event_timestamp).collect(),
            ),
            (
                Dataset::CallCenter,
                data.call_center.iter().map(|r| r.event_timestamp).collect(),
            ),
        ];

        for ((dataset, times), (window_dataset, days)) in series.iter().zip(config.windows()) {
            assert_eq!(*dataset, window_dataset);
            assert_eq!(times.first(), Some(&(now - Duration::days(days))), "{}", dataset);
            assert_eq!(times.last(), Some(&now), "{}", dataset);
            assert!(times.windows(2).all(|w| w[0] <= w[1]), "{}", dataset);
        }
        assert_eq!(
            config.windows().map(|(_, days)| days),
            [90, 60, 120, 90]
        );
    }

    #[test]
    fn test_invalid_window_fails_generation() {
        let mut config = GeneratorConfig::small();
        config.transaction_window_days = -5;
        assert!(SampleDataGenerator::new(config.clone()).generate_all().is_err());

        config.transaction_window_days = i64::MAX;
        let customers = small_data(1).customers;
        let mut generator = SampleDataGenerator::new(config);
        assert!(generator.generate_transactions(&customers).is_err());
    }

    #[test]
    fn test_configured_anchor_ends_every_window() {
        let config = GeneratorConfig {
            anchor: Some(anchor()),
            ..GeneratorConfig::small()
        };
        let data = SampleDataGenerator::new(config).generate_all().unwrap();
        assert_eq!(data.atm_usage.last().map(|r| r.event_timestamp), Some(anchor()));
    }

    #[test]
    fn test_customers_created_one_day_apart() {
        let data = small_data(1);
        let first = data.customers[0].created_timestamp;
        let second = data.customers[1].created_timestamp;

        assert_eq!(first, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(second - first, Duration::days(1));
    }
}
