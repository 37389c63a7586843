//! Application router configuration.

use axum::{
    Json, Router,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use serde_json::json;

use crate::{
    AppState, dashboard::get_dashboard_page, endpoints, logging_middleware,
    provider::BankDataProvider,
};

/// Return a router with all the app's routes.
pub fn build_router<P: BankDataProvider>(state: AppState<P>) -> Router {
    Router::new()
        .route(endpoints::ROOT, get(get_index_page))
        .route(endpoints::DASHBOARD_VIEW, get(get_dashboard_page::<P>))
        .fallback(get_404_not_found)
        .layer(middleware::from_fn(logging_middleware))
        .with_state(state)
}

/// The root path '/' redirects to the dashboard.
async fn get_index_page() -> Redirect {
    Redirect::to(endpoints::DASHBOARD_VIEW)
}

async fn get_404_not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "error": "Not found" }))).into_response()
}


#[cfg(test)]
mod router_tests {
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::Value;

    use crate::{
        AppState, Error, endpoints,
        pagination::PaginationConfig,
        provider::{AccountDetail, Accounts, BankDataProvider, Lookup, LoggedInUser},
    };

    use super::build_router;

    struct EmptyProvider;

    impl BankDataProvider for EmptyProvider {
        async fn get_logged_in_user(&self) -> Result<Lookup<LoggedInUser>, Error> {
            Ok(Lookup::Absent)
        }

        async fn get_accounts(&self, _user_id: &str) -> Result<Lookup<Accounts>, Error> {
            Ok(Lookup::Absent)
        }

        async fn get_account(&self, _item_id: &str) -> Result<Lookup<AccountDetail>, Error> {
            Ok(Lookup::Absent)
        }
    }

    fn get_test_server(timezone: &str) -> TestServer {
        let state = AppState::new(EmptyProvider, timezone, PaginationConfig::default());

        TestServer::try_new(build_router(state)).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn dashboard_route_is_mounted() {
        let server = get_test_server("Etc/UTC");

        server
            .get(endpoints::DASHBOARD_VIEW)
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn unknown_route_is_json_not_found() {
        let server = get_test_server("Etc/UTC");

        let response = server.get("/nope").await;

        response.assert_status_not_found();
        let body: Value = response.json();
        assert_eq!(body["error"], "Not found");
    }

    #[tokio::test]
    async fn invalid_timezone_is_internal_error() {
        let server = get_test_server("Mars/Olympus_Mons");

        server
            .get(endpoints::DASHBOARD_VIEW)
            .await
            .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn repeated_query_field_is_bad_request() {
        let server = get_test_server("Etc/UTC");

        server
            .get("/dashboard?id=item_1&id=item_2")
            .await
            .assert_status_bad_request();
    }
}
