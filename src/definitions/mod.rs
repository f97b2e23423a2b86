// Declarative feature-store definitions
// Plain data with builders; nothing here touches files or the catalog

pub mod entity;
pub mod feature_view;
pub mod field;
pub mod on_demand;
pub mod service;
pub mod source;
pub mod tags;

pub use entity::Entity;
pub use feature_view::FeatureView;
pub use field::{Field, ValidationRule};
pub use on_demand::{FeatureRow, FeatureValue, OnDemandFeatureView, Transformation};
pub use service::FeatureService;
pub use source::DataSource;
pub use tags::{BusinessImpact, DataClassification, Governance, Sla};
