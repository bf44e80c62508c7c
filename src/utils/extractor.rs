// This file contains the row cursor abstraction and the snack row extractor.
#![forbid(unsafe_code)]

use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use crate::utils::db_statements::{COL_CALORIEEN, COL_SNACKNAAM, COL_SNACKNR};
use crate::utils::db_types::Snack;
use crate::utils::errors::DbError;

// ***************************************************************************
//                                  Traits
// ***************************************************************************
/// A forward-only view over a tabular query result.  A freshly created cursor
/// sits before the first row; `advance` must be called before reading columns.
pub trait RowCursor {
    /// Move to the next row, returning false once the rows are exhausted.
    fn advance(&mut self) -> Result<bool, DbError>;

    /// Read an integer column of the current row by name.  SQL NULL reads as 0.
    fn get_i32(&self, column: &str) -> Result<i32, DbError>;

    /// Read a text column of the current row by name.
    fn get_string(&self, column: &str) -> Result<String, DbError>;
}

// ***************************************************************************
//                             Public Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// extract_snacks:
// ---------------------------------------------------------------------------
/** Convert every remaining row of the cursor into a Snack, preserving cursor
 * order.  The first missing or mistyped column aborts the extraction and no
 * records are returned.
 */
pub fn extract_snacks<C: RowCursor + ?Sized>(cursor: &mut C) -> Result<Vec<Snack>, DbError> {
    let mut snacks = Vec::new();
    while cursor.advance()? {
        snacks.push(Snack::new(
            cursor.get_i32(COL_SNACKNR)?,
            cursor.get_string(COL_SNACKNAAM)?,
            cursor.get_i32(COL_CALORIEEN)?,
        ));
    }
    Ok(snacks)
}

// ***************************************************************************
//                            SQLite Row Cursor
// ***************************************************************************
/// Cursor over a fully fetched SQLite result set.
pub struct SqliteRowCursor {
    rows: std::vec::IntoIter<SqliteRow>,
    current: Option<SqliteRow>,
}

impl SqliteRowCursor {
    pub fn new(rows: Vec<SqliteRow>) -> Self {
        Self { rows: rows.into_iter(), current: None }
    }

    fn current_row(&self) -> Result<&SqliteRow, DbError> {
        self.current.as_ref().ok_or(DbError::NotFound)
    }
}

impl RowCursor for SqliteRowCursor {
    fn advance(&mut self) -> Result<bool, DbError> {
        self.current = self.rows.next();
        Ok(self.current.is_some())
    }

    // NULL integers read as 0.
    fn get_i32(&self, column: &str) -> Result<i32, DbError> {
        Ok(self.current_row()?
            .try_get::<Option<i32>, _>(column)
            .map_err(|e| DbError::from_column(column, e))?
            .unwrap_or(0))
    }

    fn get_string(&self, column: &str) -> Result<String, DbError> {
        self.current_row()?
            .try_get::<Option<String>, _>(column)
            .map_err(|e| DbError::from_column(column, e))?
            .ok_or_else(|| DbError::null_column(column))
    }
}
