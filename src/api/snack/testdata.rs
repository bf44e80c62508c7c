#![forbid(unsafe_code)]

use std::sync::Arc;

use poem::Request;
use poem_openapi::{ OpenApi, payload::{Json, PlainText}, ApiResponse };
use log::error;

use crate::utils::db::DataAccess;
use crate::utils::db_statements::GET_SNACK_NAME_1;
use crate::utils::errors::HttpResult;
use crate::utils::snack_utils;

// ***************************************************************************
//                          Request/Response Definiions
// ***************************************************************************
pub struct TestDataApi {
    db: Arc<dyn DataAccess>,
}

impl TestDataApi {
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

fn make_http_500(msg: String) -> SnackResponse {
    SnackResponse::Http500(Json(HttpResult::new(500.to_string(), msg)))
}

// ***************************************************************************
//                             OpenAPI Endpoint
// ***************************************************************************
#[OpenApi]
impl TestDataApi {
    /// Return the name of snack number 1.
    #[oai(path = "/testdata", method = "get")]
    async fn test_data_api(&self, http_req: &Request) -> SnackResponse {
        snack_utils::debug_request(http_req);

        // A missing row is reported like any other data-access error.
        match self.db.query_string(GET_SNACK_NAME_1).await {
            Ok(name) => SnackResponse::Http200(PlainText(name)),
            Err(e) => {
                let msg = "ERROR: ".to_owned() + e.to_string().as_str();
                error!("{}", msg);
                make_http_500(msg)
            }
        }
    }
}
