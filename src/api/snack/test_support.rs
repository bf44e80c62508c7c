// Shared fixtures for the endpoint tests.
#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::test::TestClient;
use poem::Route;

use crate::utils::db::{DataAccess, SqliteDb};
use crate::utils::db_init::memory_pool;

const TEST_SERVER_URL: &str = "http://localhost:3000";

/// A private in-memory database with no tables.
pub(crate) async fn empty_db() -> Arc<dyn DataAccess> {
    Arc::new(SqliteDb::new(memory_pool().await.unwrap()))
}

/// A private in-memory database holding an empty Snack table.
pub(crate) async fn snack_db() -> Arc<dyn DataAccess> {
    let db = empty_db().await;
    db.execute("CREATE TABLE Snack (snacknr INT NOT NULL, snacknaam TEXT NOT NULL, calorieen INT)")
        .await
        .unwrap();
    db
}

/// The full application routed over the given database.
pub(crate) fn test_client(db: Arc<dyn DataAccess>) -> TestClient<Route> {
    TestClient::new(crate::build_app(db, TEST_SERVER_URL))
}
