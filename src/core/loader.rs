use crate::core::artifact::ModelArtifact;
use crate::core::pipeline::PipelineModel;
use crate::core::ArtifactStore;
use crate::utils::error::{PredictorError, Result};

pub struct ModelLoader<S: ArtifactStore> {
    store: S,
}

impl<S: ArtifactStore> ModelLoader<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// 讀取並驗證模型檔；只在程序啟動時呼叫一次
    pub async fn load(&self, path: &str) -> Result<PipelineModel> {
        tracing::info!("📦 Loading model artifact from {}", path);

        let bytes = self
            .store
            .read_artifact(path)
            .await
            .map_err(|e| PredictorError::ModelLoadError {
                path: path.to_string(),
                message: e.to_string(),
            })?;

        let artifact = ModelArtifact::from_json_slice(&bytes).map_err(|e| match e {
            PredictorError::ArtifactError { .. } => e,
            other => PredictorError::ModelLoadError {
                path: path.to_string(),
                message: other.to_string(),
            },
        })?;

        let model = PipelineModel::new(artifact)?;
        tracing::info!(
            "✅ Model '{}' v{} loaded ({} input features, {} preprocessing steps)",
            model.artifact().name,
            model.artifact().version,
            model.artifact().feature_names.len(),
            model.artifact().preprocessor.len()
        );
        Ok(model)
    }
}
