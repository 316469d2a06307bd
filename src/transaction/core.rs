//! Defines the core data models and database queries for mock payment transactions.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row, named_params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, Type, ValueRef},
};
use serde::{Deserialize, Deserializer, Serialize, de::Error as _};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{Error, transaction::timestamp};

// ============================================================================
// MODELS
// ============================================================================

/// What kind of money movement a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// A payer paid a recipient.
    Payment,
    /// Money returned to the payer. Refunds carry negative amounts and fees.
    Refund,
    /// A recurring payment.
    Subscription,
    /// A payment the payer has contested.
    Dispute,
    /// A payment reversed by the payer's bank.
    Chargeback,
}

impl TransactionType {
    /// Every transaction type, in display order.
    pub const ALL: [TransactionType; 5] = [
        TransactionType::Payment,
        TransactionType::Refund,
        TransactionType::Subscription,
        TransactionType::Dispute,
        TransactionType::Chargeback,
    ];

    /// The wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Payment => "payment",
            TransactionType::Refund => "refund",
            TransactionType::Subscription => "subscription",
            TransactionType::Dispute => "dispute",
            TransactionType::Chargeback => "chargeback",
        }
    }

    /// The capitalised name for display.
    pub fn label(self) -> &'static str {
        match self {
            TransactionType::Payment => "Payment",
            TransactionType::Refund => "Refund",
            TransactionType::Subscription => "Subscription",
            TransactionType::Dispute => "Dispute",
            TransactionType::Chargeback => "Chargeback",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionType::ALL
            .into_iter()
            .find(|transaction_type| transaction_type.as_str() == s)
            .ok_or_else(|| Error::InvalidTransactionType(s.to_owned()))
    }
}

/// Where a transaction is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// The money has moved.
    Completed,
    /// Waiting on the processor.
    Pending,
    /// The processor declined the transaction.
    Failed,
    /// Cancelled before it completed.
    Cancelled,
    /// Completed and then returned.
    Refunded,
    /// Under dispute with the payer.
    Disputed,
}

impl TransactionStatus {
    /// Every transaction status, in display order.
    pub const ALL: [TransactionStatus; 6] = [
        TransactionStatus::Completed,
        TransactionStatus::Pending,
        TransactionStatus::Failed,
        TransactionStatus::Cancelled,
        TransactionStatus::Refunded,
        TransactionStatus::Disputed,
    ];

    /// The wire and storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionStatus::Completed => "completed",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Cancelled => "cancelled",
            TransactionStatus::Refunded => "refunded",
            TransactionStatus::Disputed => "disputed",
        }
    }

    /// The capitalised name for display.
    pub fn label(self) -> &'static str {
        match self {
            TransactionStatus::Completed => "Completed",
            TransactionStatus::Pending => "Pending",
            TransactionStatus::Failed => "Failed",
            TransactionStatus::Cancelled => "Cancelled",
            TransactionStatus::Refunded => "Refunded",
            TransactionStatus::Disputed => "Disputed",
        }
    }
}

impl Display for TransactionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransactionStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| Error::InvalidTransactionStatus(s.to_owned()))
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

impl ToSql for TransactionStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error: Error| FromSqlError::Other(Box::new(error)))
    }
}

/// A mock payment transaction between a payer and a recipient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The unique ID of the record.
    pub id: Uuid,
    /// The processor-style reference shown to users, e.g. "TXN123456789".
    pub transaction_id: String,
    /// What kind of money movement this is.
    pub transaction_type: TransactionType,
    /// Where the transaction is in its lifecycle.
    pub status: TransactionStatus,
    /// The gross amount. Negative for refunds.
    pub amount: f64,
    /// The ISO 4217 currency code, e.g. "USD".
    pub currency: String,
    /// The processing fee. Negative for refunds.
    pub fee: f64,
    /// The amount minus the fee.
    pub net_amount: f64,
    /// The email of the person paying.
    pub payer_email: String,
    /// The name of the person paying.
    pub payer_name: String,
    /// The email of the person paid.
    pub recipient_email: String,
    /// The name of the person paid.
    pub recipient_name: String,
    /// The merchant reference, e.g. "MERCHANT123456".
    pub merchant_id: String,
    /// A text description of what the transaction was for.
    pub description: String,
    /// The invoice reference, if the transaction was invoiced.
    pub invoice_id: Option<String>,
    /// When the transaction happened.
    #[serde(with = "timestamp")]
    pub timestamp: OffsetDateTime,
    /// When the record was created.
    #[serde(with = "timestamp")]
    pub created_at: OffsetDateTime,
}

/// The query parameters for listing transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionQuery {
    /// The maximum number of transactions to return.
    #[serde(default = "default_limit")]
    pub limit: u32,
    /// How many of the newest transactions to skip.
    #[serde(default)]
    pub skip: u32,
    /// Only return transactions of this type.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub transaction_type: Option<TransactionType>,
    /// Only return transactions with this status.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<TransactionStatus>,
}

/// Deserialize an optional filter, where an empty string means no filter.
pub(crate) fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr<Err = Error>,
{
    match Option::<String>::deserialize(deserializer)?.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse().map(Some).map_err(D::Error::custom),
    }
}

/// The largest page of transactions that can be requested at once.
pub const MAX_LIST_LIMIT: u32 = 1000;

const DEFAULT_LIST_LIMIT: u32 = 50;

fn default_limit() -> u32 {
    DEFAULT_LIST_LIMIT
}

impl Default for TransactionQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIST_LIMIT,
            skip: 0,
            transaction_type: None,
            status: None,
        }
    }
}

impl TransactionQuery {
    /// Check that the limit is within `1..=MAX_LIST_LIMIT`.
    ///
    /// # Errors
    /// Returns [Error::InvalidRequest] if the limit is out of range.
    pub fn validate(&self) -> Result<(), Error> {
        if (1..=MAX_LIST_LIMIT).contains(&self.limit) {
            Ok(())
        } else {
            Err(Error::InvalidRequest(format!(
                "limit must be between 1 and {MAX_LIST_LIMIT}, got {}",
                self.limit
            )))
        }
    }

    pub(crate) fn filter(&self) -> TransactionFilter {
        TransactionFilter {
            transaction_type: self.transaction_type,
            status: self.status,
            ..Default::default()
        }
    }
}

/// The response to clearing all transactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClearResponse {
    /// A human readable summary, e.g. "Cleared 12 transactions".
    pub message: String,
}

impl ClearResponse {
    pub(crate) fn from_count(count: usize) -> Self {
        Self {
            message: format!("Cleared {count} transactions"),
        }
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Filters shared by listing and exporting transactions.
///
/// `start` and `end` are inclusive bounds on the transaction timestamp.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct TransactionFilter {
    pub transaction_type: Option<TransactionType>,
    pub status: Option<TransactionStatus>,
    pub start: Option<OffsetDateTime>,
    pub end: Option<OffsetDateTime>,
}

const TRANSACTION_COLUMNS: &str = "id, transaction_id, transaction_type, status, amount, \
    currency, fee, net_amount, payer_email, payer_name, recipient_email, recipient_name, \
    merchant_id, description, invoice_id, timestamp, created_at";

pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS payment_transaction (
            id TEXT PRIMARY KEY,
            transaction_id TEXT NOT NULL,
            transaction_type TEXT NOT NULL,
            status TEXT NOT NULL,
            amount REAL NOT NULL,
            currency TEXT NOT NULL,
            fee REAL NOT NULL,
            net_amount REAL NOT NULL,
            payer_email TEXT NOT NULL,
            payer_name TEXT NOT NULL,
            recipient_email TEXT NOT NULL,
            recipient_name TEXT NOT NULL,
            merchant_id TEXT NOT NULL,
            description TEXT NOT NULL,
            invoice_id TEXT,
            timestamp INTEGER NOT NULL,
            created_at INTEGER NOT NULL
        )",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_payment_transaction_timestamp
            ON payment_transaction(timestamp)",
        (),
    )?;

    Ok(())
}

/// Save `transaction` to the database.
///
/// Timestamps are stored as Unix seconds; sub-second precision is dropped.
///
/// # Errors
/// Returns [Error::SqlError] if the insert fails, e.g. on a duplicate ID.
pub fn insert_transaction(transaction: &Transaction, connection: &Connection) -> Result<(), Error> {
    connection.execute(
        "INSERT INTO payment_transaction (
            id, transaction_id, transaction_type, status, amount, currency, fee, net_amount,
            payer_email, payer_name, recipient_email, recipient_name, merchant_id, description,
            invoice_id, timestamp, created_at
        ) VALUES (
            :id, :transaction_id, :transaction_type, :status, :amount, :currency, :fee,
            :net_amount, :payer_email, :payer_name, :recipient_email, :recipient_name,
            :merchant_id, :description, :invoice_id, :timestamp, :created_at
        )",
        named_params! {
            ":id": transaction.id.to_string(),
            ":transaction_id": transaction.transaction_id,
            ":transaction_type": transaction.transaction_type,
            ":status": transaction.status,
            ":amount": transaction.amount,
            ":currency": transaction.currency,
            ":fee": transaction.fee,
            ":net_amount": transaction.net_amount,
            ":payer_email": transaction.payer_email,
            ":payer_name": transaction.payer_name,
            ":recipient_email": transaction.recipient_email,
            ":recipient_name": transaction.recipient_name,
            ":merchant_id": transaction.merchant_id,
            ":description": transaction.description,
            ":invoice_id": transaction.invoice_id,
            ":timestamp": transaction.timestamp.unix_timestamp(),
            ":created_at": transaction.created_at.unix_timestamp(),
        },
    )?;

    Ok(())
}

/// Map a row selected with [TRANSACTION_COLUMNS] to a [Transaction].
pub fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id)
        .map_err(|error| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(error)))?;

    Ok(Transaction {
        id,
        transaction_id: row.get(1)?,
        transaction_type: row.get(2)?,
        status: row.get(3)?,
        amount: row.get(4)?,
        currency: row.get(5)?,
        fee: row.get(6)?,
        net_amount: row.get(7)?,
        payer_email: row.get(8)?,
        payer_name: row.get(9)?,
        recipient_email: row.get(10)?,
        recipient_name: row.get(11)?,
        merchant_id: row.get(12)?,
        description: row.get(13)?,
        invoice_id: row.get(14)?,
        timestamp: get_unix_timestamp(row, 15)?,
        created_at: get_unix_timestamp(row, 16)?,
    })
}

fn get_unix_timestamp(row: &Row, index: usize) -> Result<OffsetDateTime, rusqlite::Error> {
    let seconds: i64 = row.get(index)?;

    OffsetDateTime::from_unix_timestamp(seconds).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(index, Type::Integer, Box::new(error))
    })
}

/// Get the transactions matching `filter`, newest first.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails.
pub(crate) fn query_transactions(
    filter: &TransactionFilter,
    limit: u32,
    skip: u32,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(&format!(
            "SELECT {TRANSACTION_COLUMNS} FROM payment_transaction
            WHERE (:transaction_type IS NULL OR transaction_type = :transaction_type)
                AND (:status IS NULL OR status = :status)
                AND (:start IS NULL OR timestamp >= :start)
                AND (:end IS NULL OR timestamp <= :end)
            ORDER BY timestamp DESC, rowid DESC
            LIMIT :limit OFFSET :skip"
        ))?
        .query_map(
            named_params! {
                ":transaction_type": filter.transaction_type,
                ":status": filter.status,
                ":start": filter.start.map(OffsetDateTime::unix_timestamp),
                ":end": filter.end.map(OffsetDateTime::unix_timestamp),
                ":limit": limit,
                ":skip": skip,
            },
            map_transaction_row,
        )?
        .collect::<Result<Vec<_>, _>>()
        .map_err(Error::from)
}

type RowsAffected = usize;

/// Delete every stored transaction, returning how many were deleted.
pub fn delete_all_transactions(connection: &Connection) -> Result<RowsAffected, Error> {
    connection
        .execute("DELETE FROM payment_transaction", ())
        .map_err(Error::from)
}
