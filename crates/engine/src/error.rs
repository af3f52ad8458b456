use serde::Serialize;
use shopfloor_core::CoreError;
use shopfloor_storage::StorageError;
use thiserror::Error;

/// Machine-readable category of an [`EngineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    InvalidAddress,
    InvalidField,
    ReadOnlyColumn,
    StorageFailure,
    DecodeFailure,
    InvalidInput,
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("unknown metadata field: {0}")]
    InvalidField(String),

    #[error("column {column} of view {view} is derived and cannot be written")]
    ReadOnlyColumn { view: &'static str, column: &'static str },

    /// Carries only the attempted operation; the cause is logged, not returned.
    #[error("storage failure while trying to {0}")]
    StorageFailure(&'static str),

    #[error("malformed embedded image: {0}")]
    DecodeFailure(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidAddress(_) => ErrorKind::InvalidAddress,
            Self::InvalidField(_) => ErrorKind::InvalidField,
            Self::ReadOnlyColumn { .. } => ErrorKind::ReadOnlyColumn,
            Self::StorageFailure(_) => ErrorKind::StorageFailure,
            Self::DecodeFailure(_) => ErrorKind::DecodeFailure,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
        }
    }

    pub(crate) fn from_storage(op: &'static str, err: StorageError) -> Self {
        match err {
            StorageError::NotFound(what) => Self::NotFound(what),
            other => {
                tracing::error!(error = %other, op, "storage failure");
                Self::StorageFailure(op)
            }
        }
    }
}

impl From<CoreError> for EngineError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidAddress(msg) => Self::InvalidAddress(msg),
            CoreError::InvalidField(name) => Self::InvalidField(name),
            CoreError::ReadOnlyColumn { view, column } => Self::ReadOnlyColumn { view, column },
            CoreError::DecodeFailure(msg) => Self::DecodeFailure(msg),
            CoreError::InvalidData(msg) => Self::InvalidInput(msg),
        }
    }
}

/// Attaches the attempted operation to storage results.
pub(crate) trait StorageContext<T> {
    fn during(self, op: &'static str) -> Result<T, EngineError>;
}

impl<T> StorageContext<T> for Result<T, StorageError> {
    fn during(self, op: &'static str) -> Result<T, EngineError> {
        self.map_err(|e| EngineError::from_storage(op, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_failures_hide_the_cause() {
        let raw = StorageError::Serialization("invalid sheet_id length".into());
        let err = EngineError::from_storage("load sheet", raw);
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        let message = err.to_string();
        assert!(message.contains("load sheet"));
        assert!(!message.contains("sheet_id length"));
    }

    #[test]
    fn storage_not_found_stays_not_found() {
        let err = EngineError::from_storage("write cell", StorageError::NotFound("sheet x".into()));
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn core_errors_map_onto_the_taxonomy() {
        let err = EngineError::from(CoreError::ReadOnlyColumn {
            view: "quotation",
            column: "totalPrice",
        });
        assert_eq!(err.kind(), ErrorKind::ReadOnlyColumn);
        assert_eq!(
            EngineError::from(CoreError::InvalidField("foo".into())).kind(),
            ErrorKind::InvalidField
        );
        assert_eq!(
            EngineError::from(CoreError::DecodeFailure("bad".into())).kind(),
            ErrorKind::DecodeFailure
        );
    }

    #[test]
    fn kinds_serialize_as_codes() {
        assert_eq!(
            serde_json::to_string(&ErrorKind::ReadOnlyColumn).unwrap(),
            "\"READ_ONLY_COLUMN\""
        );
    }
}
