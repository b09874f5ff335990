use serde::{Deserialize, Serialize};

pub const NEGATIVE_FINDING: &str = "The patient does NOT have symptoms of a heart attack.";
pub const POSITIVE_FINDING: &str = "The patient is having symptoms of a heart attack.";

/// 單一病患的 13 項臨床量測值，只存在於一次請求之中
///
/// 整數欄位以 `i64` 宣告，因此 `1.5` 之類的小數會在反序列化時被拒絕。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicalObservation {
    pub age: f64,
    pub sex: i64,
    pub cp: i64,
    pub trestbps: f64,
    pub chol: f64,
    pub fbs: i64,
    pub restecg: i64,
    pub thalach: f64,
    pub exang: i64,
    pub oldpeak: f64,
    pub slope: i64,
    pub ca: i64,
    pub thal: i64,
}

impl ClinicalObservation {
    pub const FIELD_NAMES: [&'static str; 13] = [
        "age", "sex", "cp", "trestbps", "chol", "fbs", "restecg", "thalach", "exang", "oldpeak",
        "slope", "ca", "thal",
    ];

    pub fn is_known_field(name: &str) -> bool {
        Self::FIELD_NAMES.contains(&name)
    }

    /// 以欄位名稱取值，名稱不存在時回傳 None
    pub fn feature(&self, name: &str) -> Option<f64> {
        let value = match name {
            "age" => self.age,
            "sex" => self.sex as f64,
            "cp" => self.cp as f64,
            "trestbps" => self.trestbps,
            "chol" => self.chol,
            "fbs" => self.fbs as f64,
            "restecg" => self.restecg as f64,
            "thalach" => self.thalach,
            "exang" => self.exang as f64,
            "oldpeak" => self.oldpeak,
            "slope" => self.slope as f64,
            "ca" => self.ca as f64,
            "thal" => self.thal as f64,
            _ => return None,
        };
        Some(value)
    }
}

/// 依模型期望的欄位順序排列好的單列表格資料
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRow {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureRow {
    pub fn new(names: Vec<String>, values: Vec<f64>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|idx| self.values[idx])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Diagnosis {
    Negative,
    Positive,
}

impl Diagnosis {
    /// label 0 為陰性，其餘皆視為陽性
    pub fn from_label(label: i64) -> Self {
        if label == 0 {
            Diagnosis::Negative
        } else {
            Diagnosis::Positive
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Diagnosis::Negative => NEGATIVE_FINDING,
            Diagnosis::Positive => POSITIVE_FINDING,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub prediction: String,
}

impl From<Diagnosis> for PredictionResponse {
    fn from(diagnosis: Diagnosis) -> Self {
        Self {
            prediction: diagnosis.message().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelInfo {
    pub name: String,
    pub version: String,
    pub features: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClinicalObservation {
        serde_json::from_value(serde_json::json!({
            "age": 63, "sex": 1, "cp": 3, "trestbps": 145, "chol": 233, "fbs": 1,
            "restecg": 0, "thalach": 150, "exang": 0, "oldpeak": 2.3, "slope": 0,
            "ca": 0, "thal": 1
        }))
        .unwrap()
    }

    #[test]
    fn test_integer_literals_accepted_for_number_fields() {
        let obs = sample();
        assert_eq!(obs.age, 63.0);
        assert_eq!(obs.feature("oldpeak"), Some(2.3));
        assert_eq!(obs.feature("cp"), Some(3.0));
        assert_eq!(obs.feature("weight"), None);
    }

    #[test]
    fn test_fractional_value_rejected_for_integer_field() {
        let result: Result<ClinicalObservation, _> = serde_json::from_value(serde_json::json!({
            "age": 63, "sex": 1.5, "cp": 3, "trestbps": 145, "chol": 233, "fbs": 1,
            "restecg": 0, "thalach": 150, "exang": 0, "oldpeak": 2.3, "slope": 0,
            "ca": 0, "thal": 1
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_every_field_name_resolves() {
        let obs = sample();
        for name in ClinicalObservation::FIELD_NAMES {
            assert!(obs.feature(name).is_some(), "missing accessor for {}", name);
        }
    }

    #[test]
    fn test_finding_strings_are_exact() {
        assert_eq!(
            Diagnosis::Negative.message(),
            "The patient does NOT have symptoms of a heart attack."
        );
        assert_eq!(
            Diagnosis::Positive.message(),
            "The patient is having symptoms of a heart attack."
        );
        let body = serde_json::to_value(PredictionResponse::from(Diagnosis::Positive)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "prediction": "The patient is having symptoms of a heart attack." })
        );
    }

    #[test]
    fn test_label_mapping() {
        assert_eq!(Diagnosis::from_label(0).message(), NEGATIVE_FINDING);
        assert_eq!(Diagnosis::from_label(1).message(), POSITIVE_FINDING);
        assert_eq!(Diagnosis::from_label(2), Diagnosis::Positive);
    }
}
