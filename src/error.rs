use reqwest::StatusCode;

/// Failure talking to the dashboard API.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("{endpoint} failed: {status} {body}")]
    Status {
        endpoint: &'static str,
        status: StatusCode,
        body: String,
    },

    #[error("could not decode {endpoint} response: {source}")]
    Decode {
        endpoint: &'static str,
        #[source]
        source: reqwest::Error,
    },
}

/// Form input rejected before any network call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditorError {
    #[error("every condition needs a parameter and an operator")]
    IncompleteConditions,

    #[error("condition {0} has a non-numeric threshold")]
    InvalidThreshold(usize),

    #[error("no device location has been resolved")]
    MissingLocation,

    #[error("no condition at index {0}")]
    NoSuchCondition(usize),

    #[error("unknown {field} value '{value}'")]
    UnknownValue { field: &'static str, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("location permission denied")]
    Denied,

    #[error("geolocation is not supported on this device")]
    Unsupported,
}

#[derive(Debug, thiserror::Error)]
pub enum AlertError {
    #[error(transparent)]
    Validation(#[from] EditorError),

    #[error("failed to save alert: {0}")]
    SaveFailed(#[source] ApiError),
}
