//! The endpoint URIs served by the app.
//!
//! The `/api` routes speak JSON and make up the contract that
//! [crate::HttpBackend] calls. The other routes serve the dashboard HTML.

/// The dashboard page.
pub const ROOT: &str = "/";
/// The dashboard form for generating transactions.
pub const DASHBOARD_GENERATE: &str = "/dashboard/generate";
/// The dashboard form for exporting transactions.
pub const DASHBOARD_EXPORT: &str = "/dashboard/export";
/// The dashboard button for clearing all transactions.
pub const DASHBOARD_TRANSACTIONS: &str = "/dashboard/transactions";
/// The page to display when an internal server error occurs.
pub const INTERNAL_ERROR_VIEW: &str = "/error";

/// Describes the API and lists its endpoints.
pub const API_ROOT: &str = "/api";
/// [API_ROOT] with a trailing slash, served the same.
pub const API_ROOT_SLASH: &str = "/api/";
/// List (GET) or clear (DELETE) the stored transactions.
pub const TRANSACTIONS_API: &str = "/api/transactions";
/// Summary counts over the stored transactions.
pub const TRANSACTION_STATS_API: &str = "/api/transactions/stats";
/// Generate and store new transactions.
pub const GENERATE_TRANSACTIONS_API: &str = "/api/transactions/generate";
/// Download the stored transactions as a file.
pub const EXPORT_TRANSACTIONS_API: &str = "/api/transactions/export";

/// The API endpoints advertised by [API_ROOT].
pub const API_ENDPOINTS: [&str; 4] = [
    GENERATE_TRANSACTIONS_API,
    TRANSACTIONS_API,
    EXPORT_TRANSACTIONS_API,
    TRANSACTION_STATS_API,
];
