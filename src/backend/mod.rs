//! The transaction service the dashboard talks to.
//!
//! The dashboard only needs the five operations in [TransactionBackend]. They
//! are served either straight from the local database ([LocalBackend]) or by
//! calling another instance's JSON API ([HttpBackend]).

use std::fmt::Debug;

use async_trait::async_trait;

use crate::{
    Error,
    transaction::{
        ClearResponse, ExportFile, ExportRequest, GenerateRequest, Transaction, TransactionQuery,
        TransactionStats,
    },
};

mod http;
mod local;

pub use http::HttpBackend;
pub use local::LocalBackend;

/// The operations the dashboard performs on stored transactions.
#[async_trait]
pub trait TransactionBackend: Send + Sync + Debug {
    /// Get a page of transactions, newest first.
    async fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error>;

    /// Summarize the stored transactions.
    async fn stats(&self) -> Result<TransactionStats, Error>;

    /// Generate and store transactions, returning the new transactions.
    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<Transaction>, Error>;

    /// Export the matching transactions as a file.
    async fn export(&self, request: &ExportRequest) -> Result<ExportFile, Error>;

    /// Delete every stored transaction.
    async fn clear(&self) -> Result<ClearResponse, Error>;
}
