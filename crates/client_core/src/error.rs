use thiserror::Error;

/// Failure taxonomy for marketplace client operations. Every failure is
/// terminal for that single user action; the client never retries.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not complete at the transport level.
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// Signin refused by the backend. The display string is deliberately
    /// generic so the UI never reveals which credential field was wrong.
    #[error("Failed to log in. Please check your email and password.")]
    AuthRejected,

    /// Backend-reported rejection (signup conflicts, listing validation).
    /// The backend `message` field is surfaced verbatim.
    #[error("{0}")]
    Validation(String),

    /// A persisted token could not be resolved into a user profile. Logged
    /// and degraded to the logged-out state, never shown to the user.
    #[error("stored session resolution failed: {0}")]
    AuthResolutionFailed(String),

    /// Client-side refusal of an action that requires an active session.
    #[error("not signed in")]
    NotAuthenticated,
}
