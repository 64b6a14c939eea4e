use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("User Not Found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
