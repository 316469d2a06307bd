use rusqlite::Connection;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    Error, initialize_db,
    transaction::{Transaction, TransactionStatus, TransactionType},
};

pub fn get_test_connection() -> Connection {
    let connection =
        Connection::open_in_memory().expect("Could not open in-memory SQLite database");
    initialize_db(&connection).expect("Could not initialize database");
    connection
}

/// A completed payment at `timestamp` with a random ID.
pub fn transaction_at(timestamp: OffsetDateTime) -> Transaction {
    Transaction {
        id: Uuid::from_u128(rand::random()),
        transaction_id: "TXN123456789".to_owned(),
        transaction_type: TransactionType::Payment,
        status: TransactionStatus::Completed,
        amount: 100.0,
        currency: "USD".to_owned(),
        fee: 3.2,
        net_amount: 96.8,
        payer_email: "john.smith@email.com".to_owned(),
        payer_name: "John Smith".to_owned(),
        recipient_email: "sarah.j@gmail.com".to_owned(),
        recipient_name: "Sarah Johnson".to_owned(),
        merchant_id: "MERCHANT123456".to_owned(),
        description: "Online Purchase - Electronics".to_owned(),
        invoice_id: None,
        timestamp,
        created_at: timestamp,
    }
}

/// Count all stored transactions.
pub fn count_transactions(connection: &Connection) -> Result<u64, Error> {
    let count: i64 =
        connection.query_row("SELECT COUNT(*) FROM payment_transaction", [], |row| {
            row.get(0)
        })?;

    Ok(u64::try_from(count).unwrap_or_default())
}
