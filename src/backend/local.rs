use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::Connection;
use time::OffsetDateTime;

use crate::{
    Error,
    backend::TransactionBackend,
    db::lock_connection,
    transaction::{
        ClearResponse, ExportFile, ExportRequest, GenerateRequest, Transaction, TransactionQuery,
        TransactionStats, delete_all_transactions, export_transactions, generate_batch,
        get_transaction_stats, query_transactions, save_transactions,
    },
};

/// Serves transactions from the app's own database.
#[derive(Debug, Clone)]
pub struct LocalBackend {
    db_connection: Arc<Mutex<Connection>>,
}

impl LocalBackend {
    /// Create a backend sharing `db_connection` with the rest of the app.
    pub fn new(db_connection: Arc<Mutex<Connection>>) -> Self {
        Self { db_connection }
    }
}

// None of these hold the lock across an await point.
#[async_trait]
impl TransactionBackend for LocalBackend {
    async fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        query.validate()?;
        let connection = lock_connection(&self.db_connection)?;

        query_transactions(&query.filter(), query.limit, query.skip, &connection)
    }

    async fn stats(&self) -> Result<TransactionStats, Error> {
        let connection = lock_connection(&self.db_connection)?;

        get_transaction_stats(OffsetDateTime::now_utc(), &connection)
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<Transaction>, Error> {
        let transactions =
            generate_batch(request, OffsetDateTime::now_utc(), &mut rand::thread_rng())?;

        let mut connection = lock_connection(&self.db_connection)?;
        save_transactions(&transactions, &mut connection)?;

        Ok(transactions)
    }

    async fn export(&self, request: &ExportRequest) -> Result<ExportFile, Error> {
        let connection = lock_connection(&self.db_connection)?;

        export_transactions(request, &connection)
    }

    async fn clear(&self) -> Result<ClearResponse, Error> {
        let connection = lock_connection(&self.db_connection)?;
        let deleted = delete_all_transactions(&connection)?;

        tracing::info!("Cleared {deleted} transactions");

        Ok(ClearResponse::from_count(deleted))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use crate::{
        Error,
        backend::TransactionBackend,
        transaction::{
            ExportFormat, ExportRequest, GenerateRequest, TransactionQuery, TransactionType,
            test_utils::get_test_connection,
        },
    };

    use super::LocalBackend;

    fn get_backend() -> LocalBackend {
        LocalBackend::new(Arc::new(Mutex::new(get_test_connection())))
    }

    #[tokio::test]
    async fn generated_transactions_are_listed_and_counted() {
        let backend = get_backend();

        let generated = backend
            .generate(&GenerateRequest {
                count: 5,
                transaction_type: Some(TransactionType::Subscription),
                days_back: 1,
                ..Default::default()
            })
            .await
            .unwrap();
        let listed = backend
            .list_transactions(&TransactionQuery::default())
            .await
            .unwrap();
        let stats = backend.stats().await.unwrap();

        assert_eq!(generated.len(), 5);
        assert_eq!(listed.len(), 5);
        assert_eq!(stats.total_transactions, 5);
        assert_eq!(stats.recent_transactions, 5);
        assert_eq!(stats.type_count(TransactionType::Subscription), 5);
    }

    #[tokio::test]
    async fn huge_amount_is_rejected_and_database_stays_usable() {
        let backend = get_backend();

        let result = backend
            .generate(&GenerateRequest {
                count: 1,
                max_amount: f64::MAX,
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(Error::InvalidRequest(_))));
        assert_eq!(backend.stats().await.unwrap().total_transactions, 0);
        backend
            .generate(&GenerateRequest::default())
            .await
            .expect("Could not generate after a rejected request");
    }

    #[tokio::test]
    async fn list_rejects_invalid_limit() {
        let backend = get_backend();

        let result = backend
            .list_transactions(&TransactionQuery {
                limit: 0,
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(Error::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn clear_reports_deleted_count() {
        let backend = get_backend();
        backend
            .generate(&GenerateRequest {
                count: 3,
                ..Default::default()
            })
            .await
            .unwrap();

        let response = backend.clear().await.unwrap();

        assert_eq!(response.message, "Cleared 3 transactions");
        assert_eq!(backend.stats().await.unwrap().total_transactions, 0);
    }

    #[tokio::test]
    async fn export_uses_requested_format() {
        let backend = get_backend();

        let file = backend
            .export(&ExportRequest {
                format: ExportFormat::Csv,
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(file.content_type, "text/csv");
        assert_eq!(file.filename, "transactions.csv");
    }
}
