use thiserror::Error;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("notification transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("notification rejected by transport: {status} - {body}")]
    Rejected { status: u16, body: String },

    #[error("dispatcher not configured: {0}")]
    NotConfigured(String),
}
