use elevator::ElevatorError;
use thiserror::Error;

/// Errors that end a simulation run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("invalid simulation configuration: {0}")]
    Config(#[from] elevator_config::ConfigError),

    #[error("scheduler error: {0}")]
    Scheduler(#[from] ElevatorError),

    #[error("invariant '{invariant}' violated at step {step}: {message}")]
    InvariantViolation {
        invariant: &'static str,
        message: String,
        step: u64,
    },
}
