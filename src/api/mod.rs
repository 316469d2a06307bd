//! The JSON REST API for mock payment transactions.
//!
//! These routes are what [crate::HttpBackend] calls, so a dashboard can be
//! pointed at another server running this API.

use axum::{
    Router,
    extract::FromRef,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;

use crate::{app_state::ApiState, endpoints};

mod error;
mod handlers;

pub use error::ApiError;
pub use handlers::{
    clear_transactions_endpoint, export_transactions_endpoint, generate_transactions_endpoint,
    get_api_info, get_stats_endpoint, list_transactions_endpoint,
};

/// The API routes with permissive CORS, for any state that provides an [ApiState].
pub fn api_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    Router::new()
        .route(endpoints::API_ROOT, get(get_api_info))
        .route(endpoints::API_ROOT_SLASH, get(get_api_info))
        .route(
            endpoints::TRANSACTIONS_API,
            get(list_transactions_endpoint).delete(clear_transactions_endpoint),
        )
        .route(endpoints::TRANSACTION_STATS_API, get(get_stats_endpoint))
        .route(
            endpoints::GENERATE_TRANSACTIONS_API,
            post(generate_transactions_endpoint),
        )
        .route(
            endpoints::EXPORT_TRANSACTIONS_API,
            post(export_transactions_endpoint),
        )
        .layer(CorsLayer::permissive())
}
