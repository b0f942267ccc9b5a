use pk_core::PkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation setup error: {0}")]
    Setup(String),

    #[error(transparent)]
    Core(#[from] PkError),
}

pub type SimResult<T> = Result<T, SimError>;
