use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssessmentError {
    #[error("No data provided")]
    EmptyInput,

    #[error("Invalid entry format (expected {expected}): {entry}")]
    MalformedEntry {
        entry: String,
        expected: String,
        found: usize,
    },

    #[error("Unknown question ID: {id}")]
    UnknownQuestion { id: String },

    #[error("Invalid answer for {id} (must be Yes, No, or Unknown): {answer}")]
    InvalidAnswer { id: String, answer: String },

    #[error("Invalid weight for {id}: {weight} ({reason})")]
    InvalidWeight {
        id: String,
        weight: String,
        reason: String,
    },

    #[error("Input schema mismatch: expected columns {expected}, found {found}")]
    SchemaMismatch { expected: String, found: String },

    #[error("Catalog configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid configuration value for '{field}': {value} ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("Chart rendering failed: {message}")]
    Render { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Rendering,
    Io,
    Serialization,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl AssessmentError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::EmptyInput
            | Self::MalformedEntry { .. }
            | Self::UnknownQuestion { .. }
            | Self::InvalidAnswer { .. }
            | Self::InvalidWeight { .. }
            | Self::SchemaMismatch { .. } => ErrorCategory::Input,
            Self::Configuration { .. }
            | Self::InvalidConfigValue { .. }
            | Self::MissingConfig { .. } => ErrorCategory::Configuration,
            Self::Render { .. } => ErrorCategory::Rendering,
            Self::IoError(_) | Self::ZipError(_) => ErrorCategory::Io,
            Self::CsvError(_) | Self::SerializationError(_) => ErrorCategory::Serialization,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Rendering => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Serialization => ErrorSeverity::High,
            ErrorCategory::Configuration | ErrorCategory::Io => ErrorSeverity::Critical,
        }
    }

    /// 根據錯誤嚴重程度決定退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,   // 圖表錯誤
            ErrorSeverity::High => 1,     // 輸入錯誤
            ErrorSeverity::Critical => 3, // 配置或系統錯誤
        }
    }

    /// 使用者可直接閱讀的錯誤訊息
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::EmptyInput => "No data provided. Paste your question answers first.".to_string(),
            Self::Render { message } => format!("Error generating figure: {}", message),
            Self::IoError(e) => format!("Could not read or write a file: {}", e),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::EmptyInput => "Provide entries like: Q1,Yes,1;Q2,No,0.5",
            Self::MalformedEntry { .. } => {
                "Each entry needs exactly three comma-separated fields: Question,Answer,Weight"
            }
            Self::UnknownQuestion { .. } => {
                "Use question IDs from the catalog (run with --print-template to list them)"
            }
            Self::InvalidAnswer { .. } => "Answers must be Yes, No or Unknown",
            Self::InvalidWeight { .. } => "Weights must be decimal numbers between 0 and 1",
            Self::SchemaMismatch { .. } => "The CSV header must be: Question,Answer,Weight",
            Self::Configuration { .. } => {
                "Check the catalog ranges: each must look like Q1-Q4 and none may overlap"
            }
            Self::InvalidConfigValue { .. } | Self::MissingConfig { .. } => {
                "Review the command line arguments or the TOML configuration file"
            }
            Self::Render { .. } => "Scores were still computed; check the report for details",
            Self::IoError(_) | Self::ZipError(_) => {
                "Check that the paths exist and are writable"
            }
            Self::CsvError(_) | Self::SerializationError(_) => {
                "Check that the input and summary files are well-formed"
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, AssessmentError>;
