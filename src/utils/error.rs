use thiserror::Error;

/// 單筆樣本被剔除的原因
#[derive(Error, Debug, Clone, PartialEq, serde::Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("sample id is empty")]
    EmptySampleId,

    #[error("{field} is not numeric: {value:?}")]
    NonNumeric { field: String, value: String },

    #[error("{field} must be {constraint}, got {value}")]
    OutOfRange {
        field: String,
        value: f64,
        constraint: String,
    },

    #[error("plasticity index is negative (PI = {pi}); PL exceeds LL")]
    NegativePlasticityIndex { pi: f64 },

    #[error("row exceeds the limit of {limit} rows")]
    RowLimitExceeded { limit: usize },
}

#[derive(Error, Debug)]
pub enum ChartError {
    #[error("Missing required column(s): {}", missing.join(", "))]
    MissingColumns { missing: Vec<String> },

    #[error("Column(s) given more than once: {}", columns.join(", "))]
    DuplicateColumns { columns: Vec<String> },

    #[error("No valid samples to plot")]
    EmptyDataset,

    #[error("Invalid sample at row {row} ({sample:?}): {reason}")]
    InvalidSample {
        row: usize,
        sample: String,
        reason: RejectReason,
    },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Data,
    Configuration,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ChartError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            ChartError::MissingColumns { .. }
            | ChartError::DuplicateColumns { .. }
            | ChartError::CsvError(_) => ErrorCategory::Input,
            ChartError::EmptyDataset
            | ChartError::InvalidSample { .. }
            | ChartError::ProcessingError { .. } => ErrorCategory::Data,
            ChartError::ConfigError { .. }
            | ChartError::ConfigValidationError { .. }
            | ChartError::InvalidConfigValueError { .. }
            | ChartError::MissingConfigError { .. } => ErrorCategory::Configuration,
            ChartError::ZipError(_) | ChartError::IoError(_) | ChartError::SerializationError(_) => {
                ErrorCategory::System
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單筆錯誤只會跳過該列
            ChartError::InvalidSample { .. } => ErrorSeverity::Low,
            ChartError::EmptyDataset
            | ChartError::MissingColumns { .. }
            | ChartError::DuplicateColumns { .. } => ErrorSeverity::High,
            ChartError::CsvError(_) | ChartError::ProcessingError { .. } => ErrorSeverity::High,
            ChartError::ConfigError { .. }
            | ChartError::ConfigValidationError { .. }
            | ChartError::InvalidConfigValueError { .. }
            | ChartError::MissingConfigError { .. } => ErrorSeverity::High,
            ChartError::IoError(_) => ErrorSeverity::Medium,
            ChartError::ZipError(_) | ChartError::SerializationError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            ChartError::MissingColumns { .. } => {
                "Make sure the table has Sample, LL and PL columns (or 'Boring Name', 'LL (Liquid Limit)', 'PL (Plastic Limit)')".to_string()
            }
            ChartError::DuplicateColumns { .. } => {
                "Keep a single column per field; 'Boring Name' and 'Sample' name the same column".to_string()
            }
            ChartError::EmptyDataset => {
                "Enter at least one row with a sample name and numeric LL and PL".to_string()
            }
            ChartError::InvalidSample { .. } => {
                "Check that LL and PL are numbers and that PL does not exceed LL".to_string()
            }
            ChartError::CsvError(_) => "Check that the file is valid CSV or TSV".to_string(),
            ChartError::IoError(_) => {
                "Check that the path exists and is readable/writable".to_string()
            }
            ChartError::ZipError(_) | ChartError::SerializationError(_) => {
                "Retry; if the problem persists, disable bundling and report the issue".to_string()
            }
            ChartError::ConfigError { .. }
            | ChartError::ConfigValidationError { .. }
            | ChartError::InvalidConfigValueError { .. }
            | ChartError::MissingConfigError { .. } => {
                "Review the configuration file or command line arguments".to_string()
            }
            ChartError::ProcessingError { .. } => "Re-run with --verbose for details".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            ChartError::MissingColumns { missing } => {
                format!("Invalid file: missing required column(s) {}", missing.join(", "))
            }
            ChartError::DuplicateColumns { columns } => {
                format!("Invalid file: column(s) {} appear more than once", columns.join(", "))
            }
            ChartError::EmptyDataset => "No data found to plot".to_string(),
            ChartError::InvalidSample { row, reason, .. } => {
                format!("Row {} was skipped: {}", row, reason)
            }
            ChartError::IoError(e) => format!("Could not access file: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ChartError>;
