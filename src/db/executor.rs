use std::{future::Future, time::Duration};

use sqlx::any::{AnyArguments, AnyRow};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::{Any, AnyConnection, AnyPool, Connection};
use tracing::error;

use crate::error::StoreError;

/// How many result rows a statement should hand back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    None,
    One,
    All,
}

/// A bind parameter. Statements use `?` placeholders, bound in order.
///
/// The table helpers only bind text; `Int` is for callers issuing their own
/// statements through [`QueryExecutor::execute`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Param<'a> {
    Text(&'a str),
    Int(i64),
}

impl<'a> From<&'a str> for Param<'a> {
    fn from(s: &'a str) -> Self {
        Param::Text(s)
    }
}

impl<'a> From<&'a String> for Param<'a> {
    fn from(s: &'a String) -> Self {
        Param::Text(s.as_str())
    }
}

impl From<i64> for Param<'_> {
    fn from(n: i64) -> Self {
        Param::Int(n)
    }
}

/// Result of one statement, shaped by its [`FetchMode`].
pub enum Fetched {
    Nothing,
    Row(Option<AnyRow>),
    Rows(Vec<AnyRow>),
}

impl Fetched {
    /// The first row, if any.
    pub fn into_row(self) -> Option<AnyRow> {
        match self {
            Fetched::Nothing => None,
            Fetched::Row(row) => row,
            Fetched::Rows(rows) => rows.into_iter().next(),
        }
    }

    pub fn into_rows(self) -> Vec<AnyRow> {
        match self {
            Fetched::Nothing => Vec::new(),
            Fetched::Row(row) => row.into_iter().collect(),
            Fetched::Rows(rows) => rows,
        }
    }
}

/// Runs parameterized statements against the pool.
///
/// Every call acquires its own connection and returns it to the pool when the
/// call finishes, on success and on failure alike. Failures are logged here
/// once and then returned to the caller; an empty result is never used to
/// signal an error.
#[derive(Clone)]
pub struct QueryExecutor {
    pool: AnyPool,
    statement_timeout: Duration,
}

impl QueryExecutor {
    pub fn new(pool: AnyPool, statement_timeout: Duration) -> Self {
        Self {
            pool,
            statement_timeout,
        }
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    /// Execute a single statement.
    ///
    /// The statement runs in its own transaction. With `commit` set the
    /// transaction is committed; otherwise it is rolled back, so writes issued
    /// without `commit` never persist.
    pub async fn execute<'q>(
        &self,
        sql: &'q str,
        params: &[Param<'q>],
        mode: FetchMode,
        commit: bool,
    ) -> Result<Fetched, StoreError> {
        let mut fetched = self.transact(&[(sql, mode)], params, commit).await?;
        Ok(fetched.pop().unwrap_or(Fetched::Nothing))
    }

    /// Run several read statements with the same parameters inside one
    /// transaction, returning one [`Fetched`] per statement in order.
    pub async fn snapshot<'q>(
        &self,
        statements: &[(&'q str, FetchMode)],
        params: &[Param<'q>],
    ) -> Result<Vec<Fetched>, StoreError> {
        self.transact(statements, params, false).await
    }

    async fn transact<'q>(
        &self,
        statements: &[(&'q str, FetchMode)],
        params: &[Param<'q>],
        commit: bool,
    ) -> Result<Vec<Fetched>, StoreError> {
        let mut conn = self.acquire().await?;
        let result = self.run(&mut conn, statements, params, commit).await;
        if let Err(e) = &result {
            error!(error = %e, kind = ?e.kind(), "Database error occurred");
        }
        result
    }

    async fn acquire(&self) -> Result<PoolConnection<Any>, StoreError> {
        self.pool.acquire().await.map_err(|e| {
            let err = StoreError::from(e);
            error!(error = %err, "Failed to get a connection from the pool");
            err
        })
    }

    async fn run<'q>(
        &self,
        conn: &mut AnyConnection,
        statements: &[(&'q str, FetchMode)],
        params: &[Param<'q>],
        commit: bool,
    ) -> Result<Vec<Fetched>, StoreError> {
        let mut tx = self.bounded(conn.begin()).await?;

        let mut fetched = Vec::with_capacity(statements.len());
        for &(sql, mode) in statements {
            fetched.push(self.bounded(fetch(&mut tx, sql, params, mode)).await?);
        }

        if commit {
            self.bounded(tx.commit()).await?;
        } else {
            self.bounded(tx.rollback()).await?;
        }
        Ok(fetched)
    }

    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, sqlx::Error>>,
    ) -> Result<T, StoreError> {
        tokio::time::timeout(self.statement_timeout, fut)
            .await
            .map_err(|_| StoreError::StatementTimeout(self.statement_timeout))?
            .map_err(StoreError::from)
    }
}

async fn fetch<'q>(
    conn: &mut AnyConnection,
    sql: &'q str,
    params: &[Param<'q>],
    mode: FetchMode,
) -> Result<Fetched, sqlx::Error> {
    let query = bind_all(sqlx::query(sql), params);
    Ok(match mode {
        FetchMode::None => {
            query.execute(&mut *conn).await?;
            Fetched::Nothing
        }
        FetchMode::One => Fetched::Row(query.fetch_optional(&mut *conn).await?),
        FetchMode::All => Fetched::Rows(query.fetch_all(&mut *conn).await?),
    })
}

fn bind_all<'q>(
    mut query: Query<'q, Any, AnyArguments<'q>>,
    params: &[Param<'q>],
) -> Query<'q, Any, AnyArguments<'q>> {
    for param in params {
        query = match *param {
            Param::Text(s) => query.bind(s),
            Param::Int(n) => query.bind(n),
        };
    }
    query
}
