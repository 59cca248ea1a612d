#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("cannot connect to API server at {0}")]
    Connect(String),
    #[error("request timed out")]
    Timeout,
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("http error: {0}")]
    Request(String),
}

impl ApiError {
    pub fn from_reqwest(err: reqwest::Error, base_url: &str) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Connect(base_url.to_string())
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Request(err.to_string())
        }
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, ApiError::Connect(_))
    }

    /// Configuration 视图错误横幅的文案
    pub fn banner_message(&self) -> String {
        match self {
            ApiError::Connect(base) => format!(
                "Cannot connect to API server at {}. Please ensure the backend server is running.",
                base
            ),
            other => format!("Failed to fetch data: {}", other),
        }
    }
}
