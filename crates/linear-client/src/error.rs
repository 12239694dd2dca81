use cadence_core::CadenceError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LinearError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Linear API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("GraphQL errors: {0}")]
    GraphQl(String),

    #[error("no data in GraphQL response")]
    MissingData,

    #[error("invalid API key: {0}")]
    InvalidToken(String),
}

pub type Result<T> = std::result::Result<T, LinearError>;

impl From<LinearError> for CadenceError {
    fn from(e: LinearError) -> Self {
        CadenceError::Remote(e.to_string())
    }
}
