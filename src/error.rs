use thiserror::Error;

#[derive(Error, Debug)]
pub enum TallyError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Malformed date on row {row}: {value:?}")]
    MalformedDate { row: usize, value: String },

    #[error("Malformed amount on row {row}: {value:?}")]
    MalformedAmount { row: usize, value: String },

    #[error("No transactions to summarize")]
    EmptyTable,

    #[error("Unknown {kind}: {value:?}")]
    InvalidSelection { kind: &'static str, value: String },

    #[error("Settings error: {0}")]
    Settings(String),
}

impl TallyError {
    pub fn invalid_selection(kind: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidSelection {
            kind,
            value: value.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TallyError>;
