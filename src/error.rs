use thiserror::Error;

#[derive(Error, Debug)]
pub enum PeriodEngineError {
    #[error("Invalid frequency '{0}': expected Monthly, Quarterly or Annual")]
    InvalidFrequency(String),

    #[error("Invalid granularity '{0}': expected Daily, Weekly, Monthly or Annual")]
    InvalidGranularity(String),

    #[error("Invalid amount {amount} on record {id}: {details}")]
    InvalidAmount {
        id: String,
        amount: f64,
        details: String,
    },

    #[error("Unknown month label: {0}")]
    InvalidMonthLabel(String),

    #[error("Validation error for record {record}: {details}")]
    ValidationError { record: String, details: String },

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PeriodEngineError>;
