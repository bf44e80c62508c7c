#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{ OpenApi, payload::Json, ApiResponse };
use log::{debug, error};

use crate::utils::db::DataAccess;
use crate::utils::db_statements::LIST_SNACKS;
use crate::utils::db_types::Snack;
use crate::utils::errors::{DbError, HttpResult};
use crate::utils::extractor::extract_snacks;
use crate::utils::snack_utils;

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct ListSnacksApi {
    db: Arc<dyn DataAccess>,
}

impl ListSnacksApi {
    pub fn new(db: Arc<dyn DataAccess>) -> Self {
        Self { db }
    }
}

// ------------------- HTTP Status Codes -------------------
#[derive(Debug, ApiResponse)]
enum SnackResponse {
    #[oai(status = 200)]
    Http200(Json<Vec<Snack>>),
    #[oai(status = 500)]
    Http500(Json<HttpResult>),
}

fn make_http_500(msg: String) -> SnackResponse {
    SnackResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl ListSnacksApi {
    /// List every snack in the order the database returns them.
    #[oai(path = "/snacks", method = "get")]
    async fn list_snacks_api(&self, http_req: &Request) -> SnackResponse {
        snack_utils::debug_request(http_req);

        match process(self.db.as_ref()).await {
            Ok(snacks) => SnackResponse::Http200(Json(snacks)),
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
async fn process(db: &dyn DataAccess) -> Result<Vec<Snack>, DbError> {
    let mut cursor = db.query_rows(LIST_SNACKS).await?;
    let snacks = extract_snacks(cursor.as_mut())?;
    debug!("listed {} snacks", snacks.len());
    Ok(snacks)
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use poem::http::StatusCode;

    use crate::api::snack::test_support::{empty_db, snack_db, test_client};
    use crate::utils::db_types::Snack;

    #[tokio::test]
    async fn lists_snacks_in_table_order() {
        let db = snack_db().await;
        db.execute("INSERT INTO Snack VALUES (1, 'Chips', 150)").await.unwrap();
        db.execute("INSERT INTO Snack VALUES (2, 'Nuts', 300)").await.unwrap();

        let resp = test_client(db).get("/snacks").send().await;
        resp.assert_status_is_ok();
        let body = resp.0.into_body().into_string().await.unwrap();
        let snacks: Vec<Snack> = serde_json::from_str(&body).unwrap();
        assert_eq!(snacks, vec![
            Snack::new(1, "Chips".to_string(), 150),
            Snack::new(2, "Nuts".to_string(), 300),
        ]);
    }

    #[tokio::test]
    async fn empty_table_gives_empty_list() {
        let resp = test_client(snack_db().await).get("/snacks").send().await;
        resp.assert_status_is_ok();
        resp.assert_text("[]").await;
    }

    #[tokio::test]
    async fn null_calories_are_listed_as_zero() {
        let db = snack_db().await;
        db.execute("INSERT INTO Snack (snacknr, snacknaam) VALUES (1, 'Chips')").await.unwrap();
        let resp = test_client(db).get("/snacks").send().await;
        resp.assert_status_is_ok();
        let body = resp.0.into_body().into_string().await.unwrap();
        let snacks: Vec<Snack> = serde_json::from_str(&body).unwrap();
        assert_eq!(snacks, vec![Snack::new(1, "Chips".to_string(), 0)]);
    }

    #[tokio::test]
    async fn missing_table_is_a_server_error() {
        let resp = test_client(empty_db().await).get("/snacks").send().await;
        resp.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }
}
