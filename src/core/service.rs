use crate::core::{Classifier, ClinicalObservation, Diagnosis, FeatureRow, ModelInfo};
use crate::utils::error::{PredictorError, Result};

/// 請求處理入口：持有啟動時載入的模型，供所有請求共用（唯讀）
pub struct PredictionService<M: Classifier> {
    model: M,
}

impl<M: Classifier> PredictionService<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub fn model_info(&self) -> ModelInfo {
        self.model.describe()
    }

    /// 依模型宣告的欄位順序組出單列資料
    pub fn build_row(&self, observation: &ClinicalObservation) -> Result<FeatureRow> {
        let names = self.model.feature_names().to_vec();
        let values = names
            .iter()
            .map(|name| {
                observation
                    .feature(name)
                    .ok_or_else(|| PredictorError::InferenceError {
                        message: format!("model expects unknown feature '{}'", name),
                    })
            })
            .collect::<Result<Vec<f64>>>()?;
        Ok(FeatureRow::new(names, values))
    }

    pub fn predict(&self, observation: &ClinicalObservation) -> Result<Diagnosis> {
        tracing::debug!("Received input: {:?}", observation);

        let row = self.build_row(observation)?;
        let label = self.model.predict(&row)?;
        tracing::info!("Raw prediction result: {}", label);

        Ok(Diagnosis::from_label(label))
    }
}
