use thiserror::Error;

pub const LOGIN_FAILED_MESSAGE: &str = "Failed to log in. Please try again.";
pub const LOGOUT_FAILED_MESSAGE: &str = "Failed to log out. Please try again.";
pub const SUBMIT_FAILED_MESSAGE: &str =
    "An error occurred while fetching enriched data. Please try again.";
pub const REJECTED_FALLBACK_MESSAGE: &str = "Failed to fetch enriched data";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("sign-in was cancelled by the user")]
    Cancelled,
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("enrichment request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("enrichment transport failure: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("malformed enrichment response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("enrichment task ended before reporting an outcome")]
    Interrupted,
}

impl EnrichError {
    /// Text shown inline under the form for this failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            Self::Transport(_) | Self::Decode(_) | Self::Interrupted => {
                SUBMIT_FAILED_MESSAGE.to_string()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("view controller has shut down")]
    Closed,
}
