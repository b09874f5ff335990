use thiserror::Error;

#[derive(Error, Debug)]
pub enum PredictorError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Failed to load model artifact '{path}': {message}")]
    ModelLoadError { path: String, message: String },

    #[error("Malformed model artifact: {message}")]
    ArtifactError { message: String },

    #[error("Inference failed: {message}")]
    InferenceError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Model,
    Inference,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl PredictorError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            PredictorError::ConfigError { .. }
            | PredictorError::ConfigValidationError { .. }
            | PredictorError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            PredictorError::ModelLoadError { .. } | PredictorError::ArtifactError { .. } => {
                ErrorCategory::Model
            }
            PredictorError::InferenceError { .. } => ErrorCategory::Inference,
            PredictorError::IoError(_) | PredictorError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Inference => ErrorSeverity::Medium,
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Model | ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    /// 依嚴重程度決定程序結束碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    /// 給終端使用者看的簡短訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            PredictorError::ModelLoadError { path, .. } => {
                format!("Could not load the model artifact at '{}'", path)
            }
            PredictorError::ArtifactError { .. } => {
                "The model artifact is not a valid pipeline".to_string()
            }
            PredictorError::InferenceError { .. } => {
                "The model failed to produce a prediction".to_string()
            }
            PredictorError::ConfigError { .. }
            | PredictorError::ConfigValidationError { .. }
            | PredictorError::InvalidConfigValueError { .. } => {
                format!("Invalid configuration: {}", self)
            }
            PredictorError::IoError(_) | PredictorError::SerializationError(_) => self.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the command line flags and the TOML configuration file"
            }
            ErrorCategory::Model => {
                "Make sure --model-path points to a JSON pipeline artifact exported for this service"
            }
            ErrorCategory::Inference => "Inspect the model artifact; the input row could not be scored",
            ErrorCategory::System => "Check file permissions and available disk space",
        }
    }
}

pub type Result<T> = std::result::Result<T, PredictorError>;
