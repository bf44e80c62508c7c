#![forbid(unsafe_code)]

use poem_openapi::Object;
use thiserror::Error;

/// Error enumerates the errors returned by this application.
#[derive(Error, Debug)]
pub enum Errors {
    /// Input parameter logging.
    #[error("snack_server input parameters:\n{}", .0)]
    InputParms(String),

    /// Inaccessible logger configuration file.
    #[error("Unable to access the Log4rs configuration file: {}", .0)]
    Log4rsInitialization(String),

    #[error("Reading application configuration file: {}", .0)]
    ReadingConfigFile(String),

    #[error("Unable to parse TOML file: {}", .0)]
    TOMLParseError(String),

    #[error("Snack Server Error: {}", .0)]
    SnackError(String),
}

/// DbError covers every failure that originates in the database layer:
/// connectivity, statement errors, missing rows and column mismatches.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("NOT_FOUND: query returned no rows")]
    NotFound,

    #[error("query expected one row but returned {0}")]
    TooManyRows(usize),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("column {column} has an incompatible type: {message}")]
    ColumnType { column: String, message: String },
}

impl DbError {
    /// Translate a per-column sqlx failure into the matching data-access error.
    pub fn from_column(column: &str, e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::ColumnNotFound(c) => DbError::ColumnNotFound(c),
            sqlx::Error::ColumnDecode { source, .. } => DbError::ColumnType {
                column: column.to_string(),
                message: source.to_string(),
            },
            sqlx::Error::Decode(source) => DbError::ColumnType {
                column: column.to_string(),
                message: source.to_string(),
            },
            other => DbError::Sqlx(other),
        }
    }

    /// SQL NULL where a value is required.
    pub fn null_column(column: &str) -> Self {
        DbError::ColumnType {
            column: column.to_string(),
            message: "unexpected NULL".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// HttpResult:
// ---------------------------------------------------------------------------
/// The body returned with every non-200 response.
#[derive(Object, Debug)]
pub struct HttpResult {
    pub result_code: String,
    pub result_msg: String,
}

impl HttpResult {
    pub fn new(result_code: String, result_msg: String) -> Self {
        Self { result_code, result_msg }
    }
}
