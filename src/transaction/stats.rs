//! Aggregate counts over the stored transactions.

use std::collections::BTreeMap;

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::{
    Error,
    transaction::core::{TransactionStatus, TransactionType},
};

/// Transactions at or after `now - RECENT_WINDOW` count as recent.
pub const RECENT_WINDOW: Duration = Duration::days(7);

/// The count and summed gross amount for one transaction type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeBreakdown {
    /// The number of transactions of this type.
    pub count: u64,
    /// The sum of the gross amounts of this type, rounded to cents.
    pub total_amount: f64,
}

/// A summary of every stored transaction.
///
/// Types and statuses with no transactions are left out of the breakdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransactionStats {
    /// The number of stored transactions.
    pub total_transactions: u64,
    /// The number of transactions in the last seven days.
    pub recent_transactions: u64,
    /// Counts and totals per transaction type.
    pub by_type: BTreeMap<TransactionType, TypeBreakdown>,
    /// Counts per transaction status.
    pub by_status: BTreeMap<TransactionStatus, u64>,
}

impl TransactionStats {
    /// The number of transactions of `transaction_type`, zero if there are none.
    pub fn type_count(&self, transaction_type: TransactionType) -> u64 {
        self.by_type
            .get(&transaction_type)
            .map(|breakdown| breakdown.count)
            .unwrap_or_default()
    }

    /// The number of transactions with `status`, zero if there are none.
    pub fn status_count(&self, status: TransactionStatus) -> u64 {
        self.by_status.get(&status).copied().unwrap_or_default()
    }
}

fn to_count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

/// Summarize the stored transactions as of `now`.
///
/// # Errors
/// Returns [Error::SqlError] if any of the queries fail.
pub fn get_transaction_stats(
    now: OffsetDateTime,
    connection: &Connection,
) -> Result<TransactionStats, Error> {
    let recent_cutoff = (now - RECENT_WINDOW).unix_timestamp();

    let (total_transactions, recent_transactions): (i64, i64) = connection.query_row(
        "SELECT COUNT(*), COALESCE(SUM(timestamp >= ?1), 0) FROM payment_transaction",
        [recent_cutoff],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let by_type = connection
        .prepare(
            "SELECT transaction_type, COUNT(*), SUM(amount) FROM payment_transaction
            GROUP BY transaction_type",
        )?
        .query_map([], |row| {
            let transaction_type: TransactionType = row.get(0)?;
            let count: i64 = row.get(1)?;
            let total_amount: f64 = row.get(2)?;

            Ok((
                transaction_type,
                TypeBreakdown {
                    count: to_count(count),
                    total_amount: (total_amount * 100.0).round() / 100.0,
                },
            ))
        })?
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    let by_status = connection
        .prepare("SELECT status, COUNT(*) FROM payment_transaction GROUP BY status")?
        .query_map([], |row| {
            let status: TransactionStatus = row.get(0)?;
            let count: i64 = row.get(1)?;

            Ok((status, to_count(count)))
        })?
        .collect::<Result<BTreeMap<_, _>, _>>()?;

    Ok(TransactionStats {
        total_transactions: to_count(total_transactions),
        recent_transactions: to_count(recent_transactions),
        by_type,
        by_status,
    })
}
