use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid field: {0}")]
    InvalidField(String),

    #[error("column {column} of view {view} is derived and cannot be written")]
    ReadOnlyColumn { view: &'static str, column: &'static str },

    #[error("malformed embedded image: {0}")]
    DecodeFailure(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
