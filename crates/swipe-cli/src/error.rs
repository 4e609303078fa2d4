use swipe_core::OutcomeStatus;
use thiserror::Error;

/// CLI-level failures outside a request outcome, mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] swipe_core::ValidationError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Serialization(_) => 1,
        }
    }
}

/// Exit code for a completed request.
pub const fn status_exit_code(status: OutcomeStatus) -> u8 {
    match status {
        OutcomeStatus::Ok => 0,
        OutcomeStatus::Internal => 1,
        OutcomeStatus::InvalidInput => 2,
        OutcomeStatus::UpstreamUnavailable => 3,
        OutcomeStatus::NotFound => 4,
    }
}
