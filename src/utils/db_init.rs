#![forbid(unsafe_code)]

use anyhow::{anyhow, Result};
use sqlx::{migrate::MigrateDatabase, Sqlite, Pool};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;

use log::{info, error};
use crate::utils::errors::Errors;
use crate::utils::config::SNACK_DIRS;

// Database constants.
const SQLITE_PROTOCOL: &str = "sqlite://";
const DB_URL: &str = "/snack.db";
#[cfg(test)]
const MEMORY_DB_URL: &str = "sqlite::memory:";

// ---------------------------------------------------------------------------
// default_db_url:
// ---------------------------------------------------------------------------
/** The database used when the configuration doesn't name one.  It should look
 * like this: "sqlite:///home/someone/.snack/database/snack.db"
 */
pub fn default_db_url() -> String {
    SQLITE_PROTOCOL.to_string() + SNACK_DIRS.database_dir.as_str() + DB_URL
}

// ---------------------------------------------------------------------------
// init_db:
// ---------------------------------------------------------------------------
/** Create the database file if necessary and open a connection pool on it.
 * No schema is created here: the Snack table must already exist, and the box
 * table is created on demand by the /testdb endpoint.
 */
pub async fn init_db(url: &str) -> Result<Pool<Sqlite>> {
    if !Sqlite::database_exists(url).await.unwrap_or(false) {
        info!("Creating database {}", url);
        match Sqlite::create_database(url).await {
            Ok(_) => info!("Create db success"),
            Err(error) => {
                let msg = Errors::SnackError(format!("database {} create error: {}", url, error));
                error!("{}", msg);
                return Err(anyhow!(msg));
            }
        }
    } else {
        info!("Database already exists");
    }

    // Pool sizing and timeouts are left at sqlx defaults.
    let options = SqliteConnectOptions::from_str(url)?;
    let db = SqlitePoolOptions::new()
        .connect_with(options)
        .await?;

    info!("Connected to database {}", url);
    Ok(db)
}

// ---------------------------------------------------------------------------
// memory_pool:
// ---------------------------------------------------------------------------
/** Open a private in-memory database.  Every SQLite memory connection is its
 * own database, so the pool is pinned to a single connection that is never
 * recycled.
 */
#[cfg(test)]
pub async fn memory_pool() -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(MEMORY_DB_URL)?;
    let db = SqlitePoolOptions::new()
        .min_connections(1)
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    Ok(db)
}
