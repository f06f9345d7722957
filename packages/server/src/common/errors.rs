use thiserror::Error;

/// Error taxonomy for the registration core.
///
/// Partial fan-out failure is deliberately NOT an error variant: a submission
/// whose proof did not reach every group member is still a successful
/// submission, and the affected ids travel on the result
/// (`SubmissionResult::link_failures`).
#[derive(Error, Debug)]
pub enum CoreError {
    /// Bad input shape, missing proof, attendee count over bound. Never
    /// retried; surfaced straight to the caller.
    #[error("validation failed: {0}")]
    Validation(String),

    /// The timing/honeypot signal flagged an automated submission. No
    /// storage or row mutation has happened when this is raised.
    #[error("submission rejected: automated submission suspected")]
    AbuseSuspected,

    /// Blob upload/copy transport failure.
    #[error("storage error: {0}")]
    Storage(String),

    /// Referenced row missing; for a dangling parent reference this is a
    /// data-integrity violation reported to an operator, never auto-repaired.
    #[error("not found: {0}")]
    NotFound(String),

    /// Actor's role does not permit the transition.
    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        CoreError::NotFound(msg.into())
    }
}
