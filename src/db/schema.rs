//! SQL DDL for the three tables. Plain `VARCHAR`/`TEXT` columns so the same
//! statements run on MySQL and SQLite.

pub const USERS: &str = r#"
CREATE TABLE IF NOT EXISTS Users (
    UID VARCHAR(255) PRIMARY KEY,
    EMAIL VARCHAR(255) NOT NULL,
    PASSWORD VARCHAR(255) NOT NULL
)"#;

/// No uniqueness: one owner collects many records.
pub const TRAPPED_RECORDS: &str = r#"
CREATE TABLE IF NOT EXISTS TrappedRecords (
    OWNER VARCHAR(255) NOT NULL,
    APP VARCHAR(255) NOT NULL,
    UID VARCHAR(255) NOT NULL,
    PASSWORD VARCHAR(255) NOT NULL
)"#;

pub const FEEDBACK_MESSAGES: &str = r#"
CREATE TABLE IF NOT EXISTS FeedbackMessages (
    UID VARCHAR(255) NOT NULL,
    NAME VARCHAR(255) NOT NULL,
    EMAIL VARCHAR(255) NOT NULL,
    MSG TEXT NOT NULL
)"#;

/// Bootstrap order, keyed by table name for error reporting.
pub const TABLES: [(&str, &str); 3] = [
    ("Users", USERS),
    ("TrappedRecords", TRAPPED_RECORDS),
    ("FeedbackMessages", FEEDBACK_MESSAGES),
];
