use std::fmt;

/// Failure to retrieve or decode a payload from the market-data API.
#[derive(Debug)]
pub enum FetchError {
    Request(String),
    Status { status: u16, preview: String },
    NonJsonResponse(String),
    Parse(String),
    Exhausted { url: String, attempts: usize, last: Box<FetchError> },
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            FetchError::Request(msg) => write!(f, "Request error: {}", msg),
            FetchError::Status { status, preview } => write!(f, "HTTP {}: {}", status, preview),
            FetchError::NonJsonResponse(preview) => write!(f, "Non-JSON response: {}", preview),
            FetchError::Parse(msg) => write!(f, "Parse error: {}", msg),
            FetchError::Exhausted { url, attempts, last } => {
                write!(f, "Failed to fetch {} after {} attempts ({})", url, attempts, last)
            }
        }
    }
}

impl std::error::Error for FetchError {}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Request(err.to_string())
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}

/// Reasons a filter run stops before producing a report.
#[derive(Debug)]
pub enum PipelineError {
    Fetch(FetchError),
    NoSectorData,
    NoConstituentData { sector: String },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PipelineError::Fetch(err) => write!(f, "{}", err),
            PipelineError::NoSectorData => write!(f, "Could not fetch sector data. Try again."),
            PipelineError::NoConstituentData { sector } => {
                write!(f, "Could not fetch constituents for the selected sector ({}).", sector)
            }
        }
    }
}

impl std::error::Error for PipelineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PipelineError::Fetch(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FetchError> for PipelineError {
    fn from(err: FetchError) -> Self {
        PipelineError::Fetch(err)
    }
}
