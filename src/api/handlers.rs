use axum::{
    Json,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    api::ApiError,
    app_state::ApiState,
    db::lock_connection,
    endpoints,
    transaction::{
        ClearResponse, ExportRequest, GenerateRequest, Transaction, TransactionQuery,
        TransactionStats, delete_all_transactions, export_transactions, generate_batch,
        get_transaction_stats, query_transactions, save_transactions,
    },
};

/// The response body for the API root.
#[derive(Debug, Serialize)]
pub struct ApiInfo {
    message: &'static str,
    version: &'static str,
    endpoints: [&'static str; 4],
}

/// Describe the API and list its endpoints.
pub async fn get_api_info() -> Json<ApiInfo> {
    Json(ApiInfo {
        message: "Mock Payment Transaction API",
        version: env!("CARGO_PKG_VERSION"),
        endpoints: endpoints::API_ENDPOINTS,
    })
}

/// List stored transactions, newest first.
pub async fn list_transactions_endpoint(
    State(state): State<ApiState>,
    query: Result<Query<TransactionQuery>, QueryRejection>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let Query(query) = query?;
    query.validate()?;

    let connection = lock_connection(&state.db_connection)?;
    let transactions = query_transactions(&query.filter(), query.limit, query.skip, &connection)
        .inspect_err(|error| tracing::error!("Could not list transactions: {error}"))?;

    Ok(Json(transactions))
}

/// Summarize the stored transactions.
pub async fn get_stats_endpoint(
    State(state): State<ApiState>,
) -> Result<Json<TransactionStats>, ApiError> {
    let connection = lock_connection(&state.db_connection)?;
    let stats = get_transaction_stats(OffsetDateTime::now_utc(), &connection)
        .inspect_err(|error| tracing::error!("Could not get transaction stats: {error}"))?;

    Ok(Json(stats))
}

/// Generate and store transactions, responding with the new transactions.
pub async fn generate_transactions_endpoint(
    State(state): State<ApiState>,
    request: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<Vec<Transaction>>, ApiError> {
    let Json(request) = request?;

    let transactions =
        generate_batch(&request, OffsetDateTime::now_utc(), &mut rand::thread_rng())?;

    let mut connection = lock_connection(&state.db_connection)?;
    save_transactions(&transactions, &mut connection)
        .inspect_err(|error| tracing::error!("Could not save generated transactions: {error}"))?;

    tracing::info!("Generated {} transactions", transactions.len());

    Ok(Json(transactions))
}

/// Respond with the matching transactions as a file attachment.
pub async fn export_transactions_endpoint(
    State(state): State<ApiState>,
    request: Result<Json<ExportRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(request) = request?;

    let connection = lock_connection(&state.db_connection)?;
    let file = export_transactions(&request, &connection)
        .inspect_err(|error| tracing::error!("Could not export transactions: {error}"))?;

    Ok(file.into_response())
}

/// Delete every stored transaction.
pub async fn clear_transactions_endpoint(
    State(state): State<ApiState>,
) -> Result<Json<ClearResponse>, ApiError> {
    let connection = lock_connection(&state.db_connection)?;
    let deleted = delete_all_transactions(&connection)
        .inspect_err(|error| tracing::error!("Could not clear transactions: {error}"))?;

    tracing::info!("Cleared {deleted} transactions");

    Ok(Json(ClearResponse::from_count(deleted)))
}
