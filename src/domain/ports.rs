use crate::domain::model::{FeatureRow, ModelInfo};
use crate::utils::error::Result;

pub trait ArtifactStore: Send + Sync {
    fn read_artifact(
        &self,
        path: &str,
    ) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

pub trait ServiceSettings: Send + Sync {
    fn host(&self) -> &str;
    fn port(&self) -> u16;
    fn model_path(&self) -> &str;
}

/// 已載入、不可變的分類模型
pub trait Classifier: Send + Sync {
    /// 模型期望的輸入欄位與順序
    fn feature_names(&self) -> &[String];
    fn predict(&self, row: &FeatureRow) -> Result<i64>;
    fn describe(&self) -> ModelInfo;
}
