use sqlx::Error as SqlxError;
use std::time::Duration;
use thiserror::Error as ThisError;

/// Coarse classification of a failure, independent of the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Pool exhausted, database unreachable, or the connection broke.
    Connection,
    /// Malformed statement, constraint violation, or a row that did not decode.
    Query,
    Unexpected,
}

#[derive(Debug, ThisError)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(#[source] SqlxError),

    #[error("Query error: {0}")]
    Query(#[source] SqlxError),

    #[error("Statement did not finish within {0:?}")]
    StatementTimeout(Duration),

    #[error("Schema bootstrap failed for: {}", .0.join(", "))]
    Schema(Vec<String>),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Connection(_) => ErrorKind::Connection,
            StoreError::Query(_) | StoreError::StatementTimeout(_) | StoreError::Schema(_) => {
                ErrorKind::Query
            }
            StoreError::Config(_) | StoreError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

impl From<SqlxError> for StoreError {
    fn from(e: SqlxError) -> Self {
        match e {
            SqlxError::PoolTimedOut
            | SqlxError::PoolClosed
            | SqlxError::Io(_)
            | SqlxError::Tls(_)
            | SqlxError::Protocol(_)
            | SqlxError::WorkerCrashed => StoreError::Connection(e),
            SqlxError::Database(_)
            | SqlxError::RowNotFound
            | SqlxError::TypeNotFound { .. }
            | SqlxError::ColumnIndexOutOfBounds { .. }
            | SqlxError::ColumnNotFound(_)
            | SqlxError::ColumnDecode { .. }
            | SqlxError::Encode(_)
            | SqlxError::Decode(_) => StoreError::Query(e),
            other => StoreError::Unexpected(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_failures_are_connection_errors() {
        assert_eq!(StoreError::from(SqlxError::PoolTimedOut).kind(), ErrorKind::Connection);
        assert_eq!(StoreError::from(SqlxError::PoolClosed).kind(), ErrorKind::Connection);
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(StoreError::from(SqlxError::Io(io)).kind(), ErrorKind::Connection);
    }

    #[test]
    fn statement_failures_are_query_errors() {
        let err = StoreError::from(SqlxError::ColumnNotFound("UID".into()));
        assert_eq!(err.kind(), ErrorKind::Query);
        assert_eq!(err.to_string(), "Query error: no column found for name: UID");
    }

    #[test]
    fn slow_statements_are_not_connection_errors() {
        let err = StoreError::StatementTimeout(Duration::from_millis(50));
        assert_eq!(err.kind(), ErrorKind::Query);
        assert_eq!(err.to_string(), "Statement did not finish within 50ms");
    }

    #[test]
    fn configuration_errors_are_unexpected() {
        let err = StoreError::from(SqlxError::Configuration("bad url".into()));
        assert_eq!(err.kind(), ErrorKind::Unexpected);
    }

    #[test]
    fn schema_error_lists_tables() {
        let err = StoreError::Schema(vec!["Users".into(), "FeedbackMessages".into()]);
        assert_eq!(
            err.to_string(),
            "Schema bootstrap failed for: Users, FeedbackMessages"
        );
    }
}
