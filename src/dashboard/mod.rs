//! Dashboard module
//!
//! Provides the HTML page for generating, browsing, exporting and clearing
//! transactions. The panels are refreshed in place with htmx.

use axum::{
    Router,
    extract::FromRef,
    routing::{delete, get, post},
};

use crate::{app_state::DashboardState, endpoints};

mod form;
mod handlers;
mod view;

pub use handlers::{
    clear_transactions_button_endpoint, export_transactions_form_endpoint,
    generate_transactions_form_endpoint, get_dashboard_page,
};

/// The dashboard routes, for any state that provides a [DashboardState].
pub fn dashboard_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    DashboardState: FromRef<S>,
{
    Router::new()
        .route(endpoints::ROOT, get(get_dashboard_page))
        .route(
            endpoints::DASHBOARD_GENERATE,
            post(generate_transactions_form_endpoint),
        )
        .route(
            endpoints::DASHBOARD_EXPORT,
            post(export_transactions_form_endpoint),
        )
        .route(
            endpoints::DASHBOARD_TRANSACTIONS,
            delete(clear_transactions_button_endpoint),
        )
}
