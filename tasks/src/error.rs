use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("no accounts configured")]
    NoAccountsConfigured,

    #[error("artifact not found: {0}")]
    ArtifactNotFound(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("missing argument: {0}")]
    MissingArgument(String),

    #[error("deployment rejected: {0}")]
    DeploymentRejected(String),

    #[error("confirmation timeout: transaction {0} not included")]
    ConfirmationTimeout(String),

    #[error("deployment reverted: {0}")]
    DeploymentReverted(String),

    #[error("mint rejected: {0}")]
    MintRejected(String),

    #[error("remote call error: {0}")]
    RemoteCallError(String),

    #[error("output: {0}")]
    Output(#[from] std::io::Error),
}

pub type Result<T, E = ChainError> = std::result::Result<T, E>;
