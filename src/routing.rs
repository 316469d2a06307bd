//! Application router configuration.

use axum::{Router, routing::get};

use crate::{
    AppState, api::api_routes, dashboard::dashboard_routes, endpoints,
    internal_server_error::get_internal_server_error_page, not_found::get_404_not_found,
};

/// Return a router with all the app's routes.
pub fn build_router(state: AppState) -> Router {
    api_routes()
        .merge(dashboard_routes())
        .route(
            endpoints::INTERNAL_ERROR_VIEW,
            get(get_internal_server_error_page),
        )
        .fallback(get_404_not_found)
        .with_state(state)
}
