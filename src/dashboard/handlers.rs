//! Dashboard route handlers.
//!
//! Every handler goes through the [crate::TransactionBackend] in
//! [DashboardState], so the dashboard works the same against the local
//! database or a remote API.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Response},
};
use maud::html;
use time::UtcOffset;

use crate::{
    alert::Alert,
    app_state::DashboardState,
    dashboard::{
        form::{ExportForm, GenerateForm},
        view::{dashboard_view, stats_panel, transactions_panel},
    },
    timezone::get_local_offset,
    transaction::{TransactionQuery, TransactionStats},
};

fn local_offset(local_timezone: &str) -> UtcOffset {
    get_local_offset(local_timezone).unwrap_or_else(|| {
        tracing::warn!("Invalid timezone {local_timezone}, showing times in UTC");
        UtcOffset::UTC
    })
}

/// Fetch the stats, logging and discarding any error so that the tiles are hidden.
async fn fetch_stats(state: &DashboardState) -> Option<TransactionStats> {
    state
        .backend
        .stats()
        .await
        .inspect_err(|error| tracing::error!("Could not fetch transaction stats: {error}"))
        .ok()
}

/// Display the dashboard with the newest transactions and the stats.
pub async fn get_dashboard_page(State(state): State<DashboardState>) -> Response {
    let local_offset = local_offset(&state.local_timezone);

    let (transactions, alert) = match state
        .backend
        .list_transactions(&TransactionQuery::default())
        .await
    {
        Ok(transactions) => (transactions, None),
        Err(error) => {
            tracing::error!("Could not fetch transactions: {error}");
            let alert = Alert::Error {
                message: "Error fetching transactions".to_owned(),
                details: String::new(),
            };
            (Vec::new(), Some(alert))
        }
    };

    let stats = fetch_stats(&state).await;

    dashboard_view(&transactions, stats.as_ref(), local_offset, alert).into_response()
}

/// Re-fetch the list and then the stats, and render both panels with `alert`.
///
/// The list replaces the request target, the stats and alert are swapped out of band.
async fn render_refreshed_panels(state: &DashboardState, alert: Alert) -> Response {
    let transactions = match state
        .backend
        .list_transactions(&TransactionQuery::default())
        .await
    {
        Ok(transactions) => transactions,
        Err(error) => {
            tracing::error!("Could not fetch transactions: {error}");
            return error.into_alert_response("Error fetching transactions");
        }
    };

    let stats = fetch_stats(state).await;
    let local_offset = local_offset(&state.local_timezone);

    html! {
        (transactions_panel(&transactions, local_offset))
        (stats_panel(stats.as_ref(), true))
        (alert.into_oob_html())
    }
    .into_response()
}

/// Generate transactions from the dashboard form and refresh the panels.
pub async fn generate_transactions_form_endpoint(
    State(state): State<DashboardState>,
    Form(form): Form<GenerateForm>,
) -> Response {
    const ERROR_MESSAGE: &str = "Error generating transactions";

    let request = match form.into_request() {
        Ok(request) => request,
        Err(error) => return error.into_alert_response(ERROR_MESSAGE),
    };

    let generated = match state.backend.generate(&request).await {
        Ok(generated) => generated,
        Err(error) => {
            tracing::error!("Could not generate transactions: {error}");
            return error.into_alert_response(ERROR_MESSAGE);
        }
    };

    let alert = Alert::Success {
        message: format!("Generated {} transactions successfully!", generated.len()),
    };

    render_refreshed_panels(&state, alert).await
}

/// Export every transaction in the format chosen on the dashboard.
///
/// The page script turns the response into a download.
pub async fn export_transactions_form_endpoint(
    State(state): State<DashboardState>,
    Form(form): Form<ExportForm>,
) -> Response {
    const ERROR_MESSAGE: &str = "Error exporting transactions";

    let request = match form.into_request() {
        Ok(request) => request,
        Err(error) => return error.into_alert_response(ERROR_MESSAGE),
    };

    match state.backend.export(&request).await {
        Ok(file) => file.into_response(),
        Err(error) => {
            tracing::error!("Could not export transactions: {error}");
            error.into_alert_response(ERROR_MESSAGE)
        }
    }
}

/// Delete every transaction and refresh the panels.
pub async fn clear_transactions_button_endpoint(State(state): State<DashboardState>) -> Response {
    match state.backend.clear().await {
        Ok(response) => {
            tracing::info!("{}", response.message);
            let alert = Alert::Success {
                message: "All transactions cleared successfully!".to_owned(),
            };
            render_refreshed_panels(&state, alert).await
        }
        Err(error) => {
            tracing::error!("Could not clear transactions: {error}");
            error.into_alert_response("Error clearing transactions")
        }
    }
}
