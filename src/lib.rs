pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::cli::CliConfig;

pub use crate::adapters::{http::router, storage::LocalArtifactStore};
pub use crate::config::ServerConfig;
pub use crate::core::{loader::ModelLoader, pipeline::PipelineModel, service::PredictionService};
pub use crate::domain::model::{ClinicalObservation, Diagnosis, NEGATIVE_FINDING, POSITIVE_FINDING};
pub use crate::utils::error::{PredictorError, Result};
