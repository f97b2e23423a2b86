// ✅ Data Quality Engine - checks generated datasets against the registry
// Uniqueness, referential integrity, row counts, and every field rule
// declared on a feature view, evaluated over read-back tables

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use tracing::{debug, info};

use crate::datafiles::{ColumnData, Table};
use crate::datasets::Dataset;
use crate::definitions::ValidationRule;
use crate::repo::FeatureRepo;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub rule_name: String,
    /// `dataset.column`, or the dataset alone for table-level checks
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationResult {
    pub fn pass(rule_name: &str, field: &str, message: &str) -> Self {
        ValidationResult {
            passed: true,
            rule_name: rule_name.to_string(),
            field: field.to_string(),
            message: message.to_string(),
            severity: Severity::Info,
        }
    }

    pub fn fail(rule_name: &str, field: &str, message: &str, severity: Severity) -> Self {
        ValidationResult {
            passed: false,
            rule_name: rule_name.to_string(),
            field: field.to_string(),
            message: message.to_string(),
            severity,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // Violates an invariant features depend on
    Warning,  // Questionable but usable
    Info,
}

// ============================================================================
// QUALITY REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub field: String,
    pub issue: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub row_counts: BTreeMap<Dataset, usize>,
    pub validations: Vec<ValidationResult>,
    pub issues: Vec<QualityIssue>,
    pub passed_count: usize,
    pub failed_count: usize,
    /// Share of checks that passed
    pub overall_quality: f64,
}

impl QualityReport {
    fn from_validations(row_counts: BTreeMap<Dataset, usize>, validations: Vec<ValidationResult>) -> Self {
        let issues: Vec<QualityIssue> = validations
            .iter()
            .filter(|v| !v.passed)
            .map(|v| QualityIssue {
                severity: v.severity,
                field: v.field.clone(),
                issue: v.message.clone(),
                recommendation: recommendation(&v.rule_name).to_string(),
            })
            .collect();

        let failed_count = issues.len();
        let passed_count = validations.len() - failed_count;
        let overall_quality = if validations.is_empty() {
            1.0
        } else {
            passed_count as f64 / validations.len() as f64
        };

        QualityReport {
            row_counts,
            validations,
            issues,
            passed_count,
            failed_count,
            overall_quality,
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "Quality: {:.1}% ({} passed, {} failed), Issues: {} ({} critical)",
            self.overall_quality * 100.0,
            self.passed_count,
            self.failed_count,
            self.issues.len(),
            self.issues
                .iter()
                .filter(|i| i.severity == Severity::Critical)
                .count()
        )
    }

    pub fn has_critical_issues(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Failed checks for one dataset
    pub fn issues_for(&self, dataset: Dataset) -> impl Iterator<Item = &QualityIssue> {
        let prefix = dataset.name();
        self.issues
            .iter()
            .filter(move |i| i.field == prefix || i.field.starts_with(&format!("{}.", prefix)))
    }
}

fn recommendation(rule_name: &str) -> &'static str {
    match rule_name {
        "row_count" => "Regenerate with the configured counts",
        "table_present" => "Run generate before checking",
        "unique_key" => "Identifiers must be assigned sequentially per table",
        "customer_reference" => "Dependent rows must sample ids from the generated customers",
        "column_present" => "Regenerate the file with the current dataset schema",
        _ => "Fix the generator or relax the rule on the feature view",
    }
}

// ============================================================================
// DATA QUALITY ENGINE
// ============================================================================

/// A field rule bound to the dataset column it reads
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRule {
    pub dataset: Dataset,
    pub column: String,
    pub rule: ValidationRule,
    /// Feature views declaring this rule
    pub declared_by: BTreeSet<String>,
}

pub struct DataQualityEngine {
    rules: Vec<ColumnRule>,
    expected_counts: BTreeMap<Dataset, usize>,
}

impl DataQualityEngine {
    /// Collect field rules from every feature view, once per (dataset, column, rule)
    pub fn from_repo(repo: &FeatureRepo) -> Self {
        let mut rules: Vec<ColumnRule> = Vec::new();

        for view in &repo.feature_views {
            let Some(source) = repo.source_of(view) else { continue };
            for field in &view.schema {
                for rule in &field.validation_rules {
                    let existing = rules
                        .iter_mut()
                        .find(|r| r.dataset == source.dataset && r.column == field.name && &r.rule == rule);
                    match existing {
                        Some(r) => {
                            r.declared_by.insert(view.name.clone());
                        }
                        None => rules.push(ColumnRule {
                            dataset: source.dataset,
                            column: field.name.clone(),
                            rule: rule.clone(),
                            declared_by: BTreeSet::from([view.name.clone()]),
                        }),
                    }
                }
            }
        }

        debug!(rules = rules.len(), "column rules collected");
        DataQualityEngine {
            rules,
            expected_counts: BTreeMap::new(),
        }
    }

    /// Row counts the tables should have, usually from the generator config
    pub fn with_expected_counts(mut self, counts: BTreeMap<Dataset, usize>) -> Self {
        self.expected_counts = counts;
        self
    }

    pub fn rules(&self) -> &[ColumnRule] {
        &self.rules
    }

    pub fn validate(&self, tables: &BTreeMap<Dataset, Table>) -> QualityReport {
        let mut validations = Vec::new();

        for dataset in Dataset::ALL {
            match tables.get(&dataset) {
                Some(table) => {
                    validations.push(self.validate_row_count(table));
                    if let Some(key) = dataset.unique_key() {
                        validations.push(validate_unique(table, key));
                    }
                }
                None => validations.push(ValidationResult::fail(
                    "table_present",
                    dataset.name(),
                    &format!("No {} data found", dataset),
                    Severity::Critical,
                )),
            }
        }

        let customer_ids = tables
            .get(&Dataset::Customers)
            .map(|t| t.distinct_strings("customer_id"));
        for (dataset, table) in tables.iter().filter(|(d, _)| d.references_customers()) {
            validations.push(validate_references(*dataset, table, customer_ids.as_ref()));
        }

        for column_rule in &self.rules {
            if let Some(table) = tables.get(&column_rule.dataset) {
                validations.push(validate_rule(table, column_rule));
            }
        }

        let row_counts = tables.iter().map(|(d, t)| (*d, t.row_count)).collect();
        let report = QualityReport::from_validations(row_counts, validations);
        info!(
            passed = report.passed_count,
            failed = report.failed_count,
            "data quality check finished"
        );
        report
    }

    fn validate_row_count(&self, table: &Table) -> ValidationResult {
        let field = table.dataset.name();
        match self.expected_counts.get(&table.dataset) {
            Some(&expected) if expected != table.row_count => ValidationResult::fail(
                "row_count",
                field,
                &format!("Expected {} rows, found {}", expected, table.row_count),
                Severity::Warning,
            ),
            None if table.row_count == 0 => ValidationResult::fail(
                "row_count",
                field,
                "Table is empty",
                Severity::Warning,
            ),
            _ => ValidationResult::pass("row_count", field, &format!("{} rows", table.row_count)),
        }
    }
}

fn qualified(dataset: Dataset, column: &str) -> String {
    format!("{}.{}", dataset, column)
}

fn validate_unique(table: &Table, key: &str) -> ValidationResult {
    let field = qualified(table.dataset, key);
    let Some(values) = table.column(key).and_then(ColumnData::as_strings) else {
        return missing_column(&field);
    };

    let mut seen = HashSet::with_capacity(values.len());
    let duplicates: BTreeSet<&str> = values
        .iter()
        .map(String::as_str)
        .filter(|v| !seen.insert(*v))
        .collect();

    if duplicates.is_empty() {
        ValidationResult::pass("unique_key", &field, &format!("{} distinct values", values.len()))
    } else {
        let sample: Vec<&str> = duplicates.iter().take(3).copied().collect();
        ValidationResult::fail(
            "unique_key",
            &field,
            &format!("{} duplicated values, e.g. {}", duplicates.len(), sample.join(", ")),
            Severity::Critical,
        )
    }
}

fn validate_references(
    dataset: Dataset,
    table: &Table,
    customer_ids: Option<&HashSet<&str>>,
) -> ValidationResult {
    let field = qualified(dataset, "customer_id");
    let Some(customer_ids) = customer_ids else {
        return ValidationResult::fail(
            "customer_reference",
            &field,
            "Customers table missing; references cannot be resolved",
            Severity::Critical,
        );
    };
    let Some(values) = table.column("customer_id").and_then(ColumnData::as_strings) else {
        return missing_column(&field);
    };

    let dangling: BTreeSet<&str> = values
        .iter()
        .map(String::as_str)
        .filter(|id| !customer_ids.contains(id))
        .collect();

    if dangling.is_empty() {
        ValidationResult::pass("customer_reference", &field, "All customer ids resolve")
    } else {
        let sample: Vec<&str> = dangling.iter().take(3).copied().collect();
        ValidationResult::fail(
            "customer_reference",
            &field,
            &format!("{} unknown customer ids, e.g. {}", dangling.len(), sample.join(", ")),
            Severity::Critical,
        )
    }
}

fn validate_rule(table: &Table, column_rule: &ColumnRule) -> ValidationResult {
    let field = qualified(column_rule.dataset, &column_rule.column);
    let rule = &column_rule.rule;
    let Some(column) = table.column(&column_rule.column) else {
        return missing_column(&field);
    };

    let (violations, example) = match (rule, column) {
        (ValidationRule::OneOf { .. }, ColumnData::String(values)) => {
            let bad: Vec<&String> = values.iter().filter(|v| !rule.check_str(v)).collect();
            (bad.len(), bad.first().map(|v| v.to_string()))
        }
        (ValidationRule::OneOf { .. }, _) => (0, None),
        _ => match column.as_f64() {
            Some(values) => {
                let bad: Vec<f64> = values.into_iter().filter(|v| !rule.check_number(*v)).collect();
                (bad.len(), bad.first().map(|v| v.to_string()))
            }
            None => (0, None),
        },
    };

    match example {
        Some(example) if violations > 0 => ValidationResult::fail(
            rule.name(),
            &field,
            &format!("{} values not {} (e.g. {})", violations, rule, example),
            Severity::Critical,
        ),
        _ => ValidationResult::pass(rule.name(), &field, &format!("All values {}", rule)),
    }
}

fn missing_column(field: &str) -> ValidationResult {
    ValidationResult::fail(
        "column_present",
        field,
        "Column missing from table",
        Severity::Critical,
    )
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::datafiles::sample_data_tables;
    use crate::generator::{SampleData, SampleDataGenerator};
    use chrono::{TimeZone, Utc};

    fn sample() -> SampleData {
        SampleDataGenerator::new(GeneratorConfig::small())
            .with_anchor(Utc.with_ymd_and_hms(2024, 6, 30, 0, 0, 0).unwrap())
            .generate_all()
            .unwrap()
    }

    fn engine() -> DataQualityEngine {
        DataQualityEngine::from_repo(&FeatureRepo::banking())
    }

    #[test]
    fn test_generated_data_is_clean() {
        let data = sample();
        let tables = sample_data_tables(&data).unwrap();
        let report = engine().with_expected_counts(data.row_counts()).validate(&tables);

        println!("Report: {}", report.summary());
        for issue in &report.issues {
            println!("  {} {}", issue.field, issue.issue);
        }

        assert!(report.is_clean());
        assert!(!report.has_critical_issues());
        assert_eq!(report.overall_quality, 1.0);
        assert_eq!(report.row_counts[&Dataset::Customers], GeneratorConfig::small().customers);
    }

    #[test]
    fn test_rules_are_deduplicated_across_views() {
        let engine = engine();
        let amount_rules: Vec<&ColumnRule> = engine
            .rules()
            .iter()
            .filter(|r| r.dataset == Dataset::Transactions && r.column == "amount")
            .collect();

        // five transaction views share the same non-negative rule
        assert_eq!(amount_rules.len(), 1);
        assert_eq!(amount_rules[0].declared_by.len(), 5);
    }

    #[test]
    fn test_duplicate_customer_id_is_critical() {
        let mut data = sample();
        let first = data.customers[0].customer_id.clone();
        data.customers[1].customer_id = first;

        let report = engine().validate(&sample_data_tables(&data).unwrap());
        assert!(report.has_critical_issues());
        assert!(report
            .issues
            .iter()
            .any(|i| i.field == "customers.customer_id" && i.issue.contains("duplicated")));
    }

    #[test]
    fn test_dangling_reference_is_critical() {
        let mut data = sample();
        data.call_center[0].customer_id = "CUST_999999".to_string();

        let report = engine().validate(&sample_data_tables(&data).unwrap());
        let issues: Vec<&QualityIssue> = report.issues_for(Dataset::CallCenter).collect();
        assert_eq!(issues.len(), 1);
        assert!(issues[0].issue.contains("CUST_999999"));
    }

    #[test]
    fn test_out_of_range_values_are_flagged() {
        let mut data = sample();
        data.customers[0].credit_score = 900;
        data.atm_usage[0].time_of_day = 24;
        data.transactions[0].transaction_type = "CHEQUE".to_string();

        let report = engine().validate(&sample_data_tables(&data).unwrap());
        let fields: Vec<&str> = report.issues.iter().map(|i| i.field.as_str()).collect();
        assert!(fields.contains(&"customers.credit_score"));
        assert!(fields.contains(&"atm_usage.time_of_day"));
        assert!(fields.contains(&"transactions.transaction_type"));
    }

    #[test]
    fn test_missing_tables_and_count_mismatch() {
        let data = sample();
        let mut tables = sample_data_tables(&data).unwrap();
        tables.remove(&Dataset::Customers);

        let mut expected = data.row_counts();
        expected.insert(Dataset::Transactions, 1);

        let report = engine().with_expected_counts(expected).validate(&tables);
        assert!(report.issues.iter().any(|i| i.field == "customers" && i.severity == Severity::Critical));
        assert!(report
            .issues
            .iter()
            .any(|i| i.field == "transactions" && i.severity == Severity::Warning));
        // every dependent table loses its reference check
        assert_eq!(
            report
                .issues
                .iter()
                .filter(|i| i.field.ends_with(".customer_id") && i.issue.contains("cannot be resolved"))
                .count(),
            4
        );
    }

    #[test]
    fn test_empty_table_matching_configured_count_passes() {
        let mut data = sample();
        data.call_center.clear();
        let tables = sample_data_tables(&data).unwrap();

        let report = engine().with_expected_counts(data.row_counts()).validate(&tables);
        assert_eq!(report.issues_for(Dataset::CallCenter).count(), 0);
        assert!(report.is_clean());

        // with no configured count an empty table is still suspicious
        let report = engine().validate(&tables);
        assert!(report
            .issues
            .iter()
            .any(|i| i.field == "call_center" && i.severity == Severity::Warning));
    }
}
