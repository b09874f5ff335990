pub mod artifact;
pub mod loader;
pub mod pipeline;
pub mod service;

pub use crate::domain::model::{ClinicalObservation, Diagnosis, FeatureRow, ModelInfo};
pub use crate::domain::ports::{ArtifactStore, Classifier, ServiceSettings};
pub use crate::utils::error::Result;
