// Banking Feature Repository - Core Library
// Exposes all modules for use in the CLI, the catalog server, and tests

pub mod catalog;      // SQLite snapshot of applied definitions
pub mod config;       // Layered repo + generator configuration
pub mod data_quality; // Checks generated data against field rules
pub mod datafiles;    // Parquet / CSV writers and read-back tables
pub mod datasets;     // Dataset schemas and vocabularies
pub mod definitions;  // Entities, sources, views, services
pub mod generator;    // Synthetic banking data
pub mod permissions;  // Group-based access policies
pub mod records;      // Row types and Arrow conversion
pub mod repo;         // The banking feature store itself
pub mod validation;   // Structural checks over definitions

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export commonly used types
pub use catalog::{apply_repo, open_catalog, ApplySummary, CatalogObject, Event};
pub use config::{GeneratorConfig, RepoConfig, ServerConfig};
pub use data_quality::{DataQualityEngine, QualityIssue, QualityReport, Severity};
pub use datafiles::{read_sample_data, write_sample_data, OutputFormat, Table, WrittenFile};
pub use datasets::{Dataset, ValueType};
pub use definitions::{
    DataSource, Entity, FeatureService, FeatureView, Field, Governance, OnDemandFeatureView,
    ValidationRule,
};
pub use generator::{SampleData, SampleDataGenerator};
pub use permissions::{Action, Permission, PermissionSet, ResourceKind};
pub use repo::FeatureRepo;
pub use validation::{validate_repo, DefinitionError, DefinitionValidator, ValidationReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the tracing subscriber; `RUST_LOG` overrides the default filter
pub fn init_tracing(default_filter: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
