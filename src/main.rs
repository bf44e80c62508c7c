#![forbid(unsafe_code)]

use std::sync::Arc;

use log::{error, info};
use poem::{listener::TcpListener, Route};
use poem_openapi::OpenApiService;

// Snack Utilities
use crate::api::snack::snacks_list::ListSnacksApi;
use crate::api::snack::testdata::TestDataApi;
use crate::api::snack::testdb::TestDbApi;
use crate::api::snack::version::VersionApi;
use crate::utils::config::{init_log, init_runtime_context, SNACK_ARGS, SNACK_DIRS};
use crate::utils::db::DataAccess;
use crate::utils::errors::Errors;

// Modules
mod api;
mod utils;

// ***************************************************************************
//                                Constants
// ***************************************************************************
const SERVER_NAME : &str = "SnackServer"; // for poem logging
const API_TITLE   : &str = "Snack Server";

// ---------------------------------------------------------------------------
// main:
// ---------------------------------------------------------------------------
#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    // --------------- Initialize Server --------------
    // Announce ourselves.
    println!("Starting snack_server!");

    // Directory creation happens as a side effect of touching SNACK_DIRS.
    if SNACK_ARGS.create_dirs_only {
        println!("Data directories are rooted at {}", SNACK_DIRS.root_dir);
        return Ok(());
    }

    // Configure our log.
    init_log();

    // Read the parameters and open the database.  The resulting context
    // owns the database client that every endpoint shares.
    let runtime_ctx = match init_runtime_context().await {
        Ok(ctx) => ctx,
        Err(e) => {
            let msg = Errors::SnackError(format!("Startup failed: {}", e));
            error!("{}", msg);
            return Err(std::io::Error::other(msg.to_string()));
        }
    };
    info!("{}", Errors::InputParms(format!("{:#?}", runtime_ctx)));

    // Log build info.
    print_version_info();

    // --------------- Main Loop Set Up ---------------
    let config = &runtime_ctx.parms.config;
    let server_url = format!("{}:{}", config.http_addr, config.http_port);
    let app = build_app(runtime_ctx.db.clone(), &server_url);
    let addr = format!("{}{}", "0.0.0.0:", config.http_port);

    // ------------------ Main Loop -------------------
    poem::Server::new(TcpListener::bind(addr))
        .name(SERVER_NAME)
        .run(app)
        .await
}

// ***************************************************************************
//                             Private Functions
// ***************************************************************************
// ---------------------------------------------------------------------------
// build_app:
// ---------------------------------------------------------------------------
/** Assemble the endpoints, each holding its own handle on the shared database
 * client, along with the generated openapi documents and swagger ui.
 */
fn build_app(db: Arc<dyn DataAccess>, server_url: &str) -> Route {
    let endpoints = (
        TestDbApi::new(db.clone()),
        TestDataApi::new(db.clone()),
        ListSnacksApi::new(db),
        VersionApi,
    );
    let api_service =
        OpenApiService::new(endpoints, API_TITLE, env!("CARGO_PKG_VERSION")).server(server_url);

    // Allow the generated openapi specs to be retrieved from the server.
    let spec = api_service.spec_endpoint();
    let spec_yaml = api_service.spec_endpoint_yaml();
    let ui = api_service.swagger_ui();

    Route::new()
        .nest("/docs", ui)
        .at("/spec", spec)
        .at("/spec_yaml", spec_yaml)
        .nest("/", api_service)
}

// ---------------------------------------------------------------------------
// print_version_info:
// ---------------------------------------------------------------------------
fn print_version_info() {
    info!("\n*** Running SNACK={}, BRANCH={}, COMMIT={}, DIRTY={}, SRC_TS={}, RUSTC={}.",
          option_env!("CARGO_PKG_VERSION").unwrap_or("unknown"),
          env!("GIT_BRANCH"),
          env!("GIT_COMMIT_SHORT"),
          env!("GIT_DIRTY"),
          env!("SOURCE_TIMESTAMP"),
          env!("RUSTC_VERSION"));
}

// ***************************************************************************
//                                  Tests
// ***************************************************************************
#[cfg(test)]
mod tests {
    use poem::http::StatusCode;

    use crate::api::snack::test_support::{empty_db, test_client};

    #[tokio::test]
    async fn openapi_document_lists_the_routes() {
        let resp = test_client(empty_db().await).get("/spec").send().await;
        resp.assert_status_is_ok();
        let body = resp.0.into_body().into_string().await.unwrap();
        for path in ["/testdb", "/testdata", "/snacks", "/version"] {
            assert!(body.contains(path), "missing {} in openapi document", path);
        }
    }

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let resp = test_client(empty_db().await).get("/nope").send().await;
        resp.assert_status(StatusCode::NOT_FOUND);
    }
}
