// 🗂️ Data Source - a file-backed table feature views read from

use serde::{Deserialize, Serialize};

use super::tags::Governance;
use crate::datafiles::OutputFormat;
use crate::datasets::Dataset;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,
    pub dataset: Dataset,
    /// Path relative to the repository root, as the framework resolves it
    pub path: String,
    pub timestamp_field: String,
    pub description: String,
    pub source_system: String,
    pub governance: Governance,
}

impl DataSource {
    /// Parquet file source for one of the generated datasets
    pub fn file(name: impl Into<String>, dataset: Dataset) -> Self {
        DataSource {
            name: name.into(),
            dataset,
            path: format!("data/{}", dataset.file_name(OutputFormat::Parquet)),
            timestamp_field: dataset.timestamp_field().to_string(),
            description: String::new(),
            source_system: String::new(),
            governance: Governance::default(),
        }
    }

    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    pub fn with_source_system(mut self, system: impl Into<String>) -> Self {
        self.source_system = system.into();
        self
    }

    pub fn with_governance(mut self, governance: Governance) -> Self {
        self.governance = governance;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_source_takes_path_and_timestamp_from_dataset() {
        let source = DataSource::file("customer_data_source", Dataset::Customers);
        assert_eq!(source.path, "data/customers.parquet");
        assert_eq!(source.timestamp_field, "created_timestamp");

        let calls = DataSource::file("call_center_data_source", Dataset::CallCenter);
        assert_eq!(calls.timestamp_field, "event_timestamp");
    }
}
