use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    #[error("Authentication failed")]
    Authentication,

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Server rejected request ({code}): {message}")]
    Server { code: i64, message: String },

    #[error("Invalid field {field}: {message}")]
    Validation { field: &'static str, message: String },
}

pub type ApiResult<T> = Result<T, ApiError>;
