/// Errors that can occur while persisting credentials or pushing metrics.
///
/// # Examples
///
/// ```rust
/// use nimbus_push::error::PushError;
///
/// let err = PushError::TokenIssuance { status: 500, body: "boom".to_string() };
/// assert!(err.to_string().contains("500"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The per-user credential directory cannot be resolved or created.
    #[error("Push: credential directory unavailable: {0}")]
    StorageUnavailable(std::io::Error),

    /// Writing the credential file failed.
    #[error("Push: failed to write credential file: {0}")]
    WriteFailure(std::io::Error),

    /// No credential has been saved yet.
    #[error("Push: no cached credential")]
    CredentialMissing,

    /// The credential file exists but cannot be read.
    #[error("Push: failed to read credential file: {0}")]
    ReadFailure(std::io::Error),

    /// The remote rejected the credential twice on the same logical call;
    /// the push cycle gives up rather than loop on refreshes.
    #[error("Push: credential rejected after refresh")]
    AuthorizationRejected,

    /// The token authority returned a non-success response.
    #[error("Push: token issuance failed: status={status}, body={body}")]
    TokenIssuance { status: u16, body: String },

    /// An underlying HTTP transport error from `reqwest`.
    #[error("Push: network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The push gateway rejected the metrics payload.
    #[error("Push: gateway returned status {0}")]
    GatewayStatus(u16),
}

/// Convenience `Result` alias for push operations.
pub type Result<T> = std::result::Result<T, PushError>;
