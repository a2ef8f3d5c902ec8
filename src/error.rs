use thiserror::Error;

use crate::actions::BuildError;
use crate::diagnostics::SyntaxError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Read error: {0}")]
    Read(#[from] std::io::Error),
    #[error("Syntax error: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("Build error: {0}")]
    Build(#[from] BuildError),
    #[error("Config error: {0}")]
    Config(String),
}

pub type RiftResult<T> = Result<T, Error>;

impl Error {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// The syntax error, if parsing failed on the grammar.
    pub fn as_syntax(&self) -> Option<&SyntaxError> {
        match self {
            Error::Syntax(error) => Some(error),
            _ => None,
        }
    }
}
