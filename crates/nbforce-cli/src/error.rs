use nbforce::core::io::system_file::SystemFileError;
use nbforce::engine::error::KernelError;
use nbforce::workflows::evaluate::EvaluateError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Evaluate(#[from] EvaluateError),

    #[error(transparent)]
    System(#[from] SystemFileError),

    #[error(transparent)]
    Kernel(#[from] KernelError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
