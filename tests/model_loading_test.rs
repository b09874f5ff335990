use anyhow::Result;
use heart_predictor::core::Classifier;
use heart_predictor::utils::error::ErrorSeverity;
use heart_predictor::{ClinicalObservation, LocalArtifactStore, ModelLoader, PredictorError};
use tempfile::TempDir;

const BUNDLED_MODEL: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/models/heart_disease_model.json");

#[tokio::test]
async fn test_bundled_model_covers_all_fields() -> Result<()> {
    let loader = ModelLoader::new(LocalArtifactStore::current_dir());
    let model = loader.load(BUNDLED_MODEL).await?;

    let names = model.feature_names();
    assert_eq!(names.len(), ClinicalObservation::FIELD_NAMES.len());
    for field in ClinicalObservation::FIELD_NAMES {
        assert!(names.iter().any(|n| n == field), "model does not use {}", field);
    }
    Ok(())
}

#[tokio::test]
async fn test_startup_faults_are_critical() -> Result<()> {
    let temp_dir = TempDir::new()?;
    tokio::fs::write(temp_dir.path().join("truncated.json"), b"{\"name\": \"x\", ").await?;
    tokio::fs::write(
        temp_dir.path().join("mismatch.json"),
        br#"{
            "name": "mismatch",
            "feature_names": ["age", "chol"],
            "classifier": {
                "kind": "logistic_regression", "classes": [0, 1],
                "coefficients": [0.1], "intercept": 0.0
            }
        }"#,
    )
    .await?;

    let loader = ModelLoader::new(LocalArtifactStore::new(temp_dir.path()));

    for path in ["absent.json", "truncated.json", "mismatch.json"] {
        let err = loader.load(path).await.unwrap_err();
        assert_eq!(err.severity(), ErrorSeverity::Critical, "{}: {}", path, err);
    }

    let err = loader.load("mismatch.json").await.unwrap_err();
    assert!(matches!(err, PredictorError::ArtifactError { .. }));
    Ok(())
}

#[tokio::test]
async fn test_artifact_order_drives_row_layout() -> Result<()> {
    let temp_dir = TempDir::new()?;
    tokio::fs::write(
        temp_dir.path().join("reordered.json"),
        br#"{
            "name": "reordered",
            "feature_names": ["thal", "age"],
            "classifier": {
                "kind": "logistic_regression", "classes": [0, 1],
                "coefficients": [10.0, 0.0], "intercept": -15.0
            }
        }"#,
    )
    .await?;

    let loader = ModelLoader::new(LocalArtifactStore::new(temp_dir.path()));
    let service = heart_predictor::PredictionService::new(loader.load("reordered.json").await?);

    let mut observation: ClinicalObservation = serde_json::from_value(serde_json::json!({
        "age": 63, "sex": 1, "cp": 3, "trestbps": 145, "chol": 233, "fbs": 1,
        "restecg": 0, "thalach": 150, "exang": 0, "oldpeak": 2.3, "slope": 0,
        "ca": 0, "thal": 1
    }))?;

    let row = service.build_row(&observation)?;
    assert_eq!(row.values(), &[1.0, 63.0]);
    // 10 * 1 - 15 < 0
    assert_eq!(service.predict(&observation)?, heart_predictor::Diagnosis::Negative);

    observation.thal = 2;
    // 10 * 2 - 15 > 0
    assert_eq!(service.predict(&observation)?, heart_predictor::Diagnosis::Positive);
    Ok(())
}
