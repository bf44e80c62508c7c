#![forbid(unsafe_code)]

use async_trait::async_trait;
use log::debug;
use sqlx::sqlite::SqliteRow;
use sqlx::{Column, Pool, Row, Sqlite};

use crate::utils::errors::DbError;
use crate::utils::extractor::{RowCursor, SqliteRowCursor};

// ***************************************************************************
//                                  Traits
// ***************************************************************************
/// The database client handed to every handler.  Implementations must be safe
/// to share across concurrently running requests.
#[async_trait]
pub trait DataAccess: Send + Sync {
    /// Run a statement that returns no rows and report the rows affected.
    async fn execute(&self, sql: &str) -> Result<u64, DbError>;

    /// Run a query that yields a single integer in the first column.
    async fn query_i32(&self, sql: &str) -> Result<i32, DbError>;

    /// Run a query that yields a single string in the first column.
    async fn query_string(&self, sql: &str) -> Result<String, DbError>;

    /// Run a query and return a cursor over its complete result set.
    async fn query_rows(&self, sql: &str) -> Result<Box<dyn RowCursor + Send>, DbError>;
}

// ***************************************************************************
//                               SQLite Client
// ***************************************************************************
/// DataAccess implementation backed by a sqlx SQLite connection pool.
#[derive(Debug, Clone)]
pub struct SqliteDb {
    pool: Pool<Sqlite>,
}

impl SqliteDb {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    // Fetch the one row a scalar query must produce.  Zero rows and more
    // than one row are both errors.
    async fn fetch_scalar_row(&self, sql: &str) -> Result<SqliteRow, DbError> {
        debug!("scalar query: {}", sql);
        let mut rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        match rows.len() {
            0 => Err(DbError::NotFound),
            1 => Ok(rows.remove(0)),
            n => Err(DbError::TooManyRows(n)),
        }
    }
}

#[async_trait]
impl DataAccess for SqliteDb {
    async fn execute(&self, sql: &str) -> Result<u64, DbError> {
        debug!("execute: {}", sql);
        let result = sqlx::query(sql).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn query_i32(&self, sql: &str) -> Result<i32, DbError> {
        let row = self.fetch_scalar_row(sql).await?;
        let column = first_column_name(&row);
        row.try_get::<Option<i32>, _>(0usize)
            .map_err(|e| DbError::from_column(&column, e))?
            .ok_or_else(|| DbError::null_column(&column))
    }

    async fn query_string(&self, sql: &str) -> Result<String, DbError> {
        let row = self.fetch_scalar_row(sql).await?;
        let column = first_column_name(&row);
        row.try_get::<Option<String>, _>(0usize)
            .map_err(|e| DbError::from_column(&column, e))?
            .ok_or_else(|| DbError::null_column(&column))
    }

    async fn query_rows(&self, sql: &str) -> Result<Box<dyn RowCursor + Send>, DbError> {
        debug!("row query: {}", sql);
        let rows = sqlx::query(sql).fetch_all(&self.pool).await?;
        Ok(Box::new(SqliteRowCursor::new(rows)))
    }
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
fn first_column_name(row: &SqliteRow) -> String {
    row.columns()
        .first()
        .map(|c| c.name().to_string())
        .unwrap_or_default()
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use super::{DataAccess, SqliteDb};
    use crate::utils::db_init::memory_pool;
    use crate::utils::db_types::Snack;
    use crate::utils::errors::DbError;
    use crate::utils::extractor::extract_snacks;

    async fn snack_db() -> SqliteDb {
        let db = SqliteDb::new(memory_pool().await.unwrap());
        db.execute("CREATE TABLE Snack (snacknr INT, snacknaam TEXT, calorieen INT)").await.unwrap();
        db
    }

    #[tokio::test]
    async fn scalar_queries() {
        let db = snack_db().await;
        db.execute("INSERT INTO Snack VALUES (1, 'Chips', 150)").await.unwrap();
        assert_eq!(db.query_i32("SELECT calorieen FROM Snack WHERE snacknr = 1").await.unwrap(), 150);
        assert_eq!(db.query_string("SELECT snacknaam FROM Snack WHERE snacknr = 1").await.unwrap(), "Chips");
    }

    #[tokio::test]
    async fn scalar_query_without_rows_is_not_found() {
        let db = snack_db().await;
        let e = db.query_string("SELECT snacknaam FROM Snack WHERE snacknr = 1").await.unwrap_err();
        assert!(matches!(e, DbError::NotFound));
    }

    #[tokio::test]
    async fn scalar_query_with_two_rows_fails() {
        let db = snack_db().await;
        db.execute("INSERT INTO Snack VALUES (1, 'Chips', 150)").await.unwrap();
        db.execute("INSERT INTO Snack VALUES (1, 'Nuts', 300)").await.unwrap();
        let e = db.query_string("SELECT snacknaam FROM Snack WHERE snacknr = 1").await.unwrap_err();
        assert!(matches!(e, DbError::TooManyRows(2)));
    }

    #[tokio::test]
    async fn null_integer_column_reads_as_zero() {
        let db = snack_db().await;
        db.execute("INSERT INTO Snack VALUES (1, 'Chips', NULL)").await.unwrap();
        let mut cursor = db.query_rows("SELECT snacknr, snacknaam, calorieen FROM Snack").await.unwrap();
        let snacks = extract_snacks(cursor.as_mut()).unwrap();
        assert_eq!(snacks, vec![Snack::new(1, "Chips".to_string(), 0)]);
    }

    #[tokio::test]
    async fn null_text_column_fails() {
        let db = snack_db().await;
        db.execute("INSERT INTO Snack VALUES (1, NULL, 150)").await.unwrap();
        let mut cursor = db.query_rows("SELECT snacknr, snacknaam, calorieen FROM Snack").await.unwrap();
        assert!(matches!(extract_snacks(cursor.as_mut()), Err(DbError::ColumnType { .. })));
    }

    #[tokio::test]
    async fn null_scalar_is_a_type_error() {
        let db = snack_db().await;
        let e = db.query_i32("SELECT MIN(snacknr) FROM Snack").await.unwrap_err();
        assert!(matches!(e, DbError::ColumnType { .. }));
    }

    #[tokio::test]
    async fn row_cursor_feeds_the_extractor() {
        let db = snack_db().await;
        db.execute("INSERT INTO Snack VALUES (2, 'Nuts', 300)").await.unwrap();
        db.execute("INSERT INTO Snack VALUES (1, 'Chips', 150)").await.unwrap();
        let mut cursor = db.query_rows("SELECT snacknr, snacknaam, calorieen FROM Snack ORDER BY snacknr").await.unwrap();
        let snacks = extract_snacks(cursor.as_mut()).unwrap();
        assert_eq!(snacks, vec![
            Snack::new(1, "Chips".to_string(), 150),
            Snack::new(2, "Nuts".to_string(), 300),
        ]);
    }

    #[tokio::test]
    async fn missing_column_surfaces_from_sqlite() {
        let db = snack_db().await;
        db.execute("INSERT INTO Snack VALUES (1, 'Chips', 150)").await.unwrap();
        let mut cursor = db.query_rows("SELECT snacknr, snacknaam FROM Snack").await.unwrap();
        match extract_snacks(cursor.as_mut()) {
            Err(DbError::ColumnNotFound(c)) => assert_eq!(c, "calorieen"),
            other => panic!("expected missing column error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn statement_errors_propagate() {
        let db = snack_db().await;
        let e = db.execute("CREATE TABLE Snack (id INT)").await.unwrap_err();
        assert!(matches!(e, DbError::Sqlx(_)));
    }
}
