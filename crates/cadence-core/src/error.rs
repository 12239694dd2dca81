use thiserror::Error;

#[derive(Debug, Error)]
pub enum CadenceError {
    #[error("config not found: {0} (run 'cadence init')")]
    ConfigNotFound(String),

    #[error("unknown workflow state: {0}")]
    UnknownState(String),

    #[error("unknown team: {0}")]
    UnknownTeam(String),

    #[error("unknown project: {0}")]
    UnknownProject(String),

    #[error("unknown label: {0}")]
    UnknownLabel(String),

    #[error("no team for '{0}': set `team` on the item or `defaults.team`")]
    MissingTeam(String),

    #[error("remote operation failed: {0}")]
    Remote(String),

    #[error("invalid duration '{0}': expected e.g. 2d, 36h, 1w, 1d12h")]
    InvalidDuration(String),

    #[error("invalid schedule: {0}")]
    InvalidSchedule(String),

    #[error("invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CadenceError>;
