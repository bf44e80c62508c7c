#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{ OpenApi, payload::{Json, PlainText}, ApiResponse };
use log::{error, info};

use crate::utils::db::DataAccess;
use crate::utils::db_statements::{CREATE_BOX_TABLE, INSERT_BOX_1, INSERT_BOX_2, GET_BOX_MIN_ID};
use crate::utils::errors::{DbError, HttpResult};
use crate::utils::snack_utils;

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct TestDbApi {
    db: Arc<dyn DataAccess>,
}

impl TestDbApi {
    pub fn new(db: Arc<dyn DataAccess>) -> Self {
        Self { db }
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum SnackResponse {
    #[oai(status = 200)]
    Http200(PlainText<String>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_200(min_id: i32) -> SnackResponse {
    SnackResponse::Http200(PlainText(min_id.to_string()))
}
fn make_http_500(msg: String) -> SnackResponse {
    SnackResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl TestDbApi {
    /// Create and fill the box table, then return its smallest id.
    ///
    /// The table is created on every call, so a second call against the same
    /// database fails.
    #[oai(path = "/testdb", method = "get")]
    async fn test_db_api(&self, http_req: &Request) -> SnackResponse {
        snack_utils::debug_request(http_req);

        match process(self.db.as_ref()).await {
            Ok(min_id) => make_http_200(min_id),
            Err(e) => {
                let msg = "ERROR: ".to_owned() + e.to_string().as_str();
                error!("{}", msg);
                make_http_500(msg)
            }
        }
    }
}

// ***************************************************************************
//                          Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// process:
// ---------------------------------------------------------------------------
/** Each statement runs on its own; the first failure ends the sequence and
 * whatever the earlier statements changed stays in the database.
 */
async fn process(db: &dyn DataAccess) -> Result<i32, DbError> {
    db.execute(CREATE_BOX_TABLE).await?;
    db.execute(INSERT_BOX_1).await?;
    db.execute(INSERT_BOX_2).await?;
    let min_id = db.query_i32(GET_BOX_MIN_ID).await?;
    info!("box table created, minimum id is {}", min_id);
    Ok(min_id)
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use poem::http::StatusCode;

    use crate::api::snack::test_support::{empty_db, test_client};
    use crate::utils::db_statements::GET_BOX_MIN_ID;

    #[tokio::test]
    async fn fresh_database_returns_one() {
        let cli = test_client(empty_db().await);
        let resp = cli.get("/testdb").send().await;
        resp.assert_status_is_ok();
        resp.assert_text("1").await;
    }

    #[tokio::test]
    async fn second_call_fails_because_box_exists() {
        let db = empty_db().await;
        let cli = test_client(db.clone());
        cli.get("/testdb").send().await.assert_status_is_ok();

        let resp = cli.get("/testdb").send().await;
        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

        // The failed call aborted before inserting anything new.
        assert_eq!(db.query_i32("SELECT COUNT(*) FROM box").await.unwrap(), 2);
        assert_eq!(db.query_i32(GET_BOX_MIN_ID).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn error_body_carries_the_message() {
        let db = empty_db().await;
        db.execute("CREATE TABLE box (id INT NOT NULL)").await.unwrap();
        let cli = test_client(db);

        let resp = cli.get("/testdb").send().await;
        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let json = resp.json().await;
        let body = json.value().object();
        body.get("result_code").assert_string("500");
        assert!(body.get("result_msg").string().starts_with("ERROR: "));
    }
}
