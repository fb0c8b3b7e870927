/// Errors surfaced by the session and control APIs.
///
/// Precondition failures are reported before the client is touched. Anything
/// the client itself fails with is passed through unchanged as [`SessionError::Sdk`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("There is already an active session")]
    AlreadyActive,
    #[error("Token is required")]
    TokenRequired,
    #[error("Avatar is not initialized")]
    NotInitialized,
    #[error(transparent)]
    Sdk(#[from] anyhow::Error),
}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;
