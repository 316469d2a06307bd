//! Mock payment transactions.
//!
//! This module contains everything that works directly on stored transactions:
//! - The `Transaction` model and the enums describing it
//! - Generating realistic looking transactions
//! - Listing, summarizing, exporting and clearing stored transactions

mod core;
mod export;
mod generator;
mod stats;
mod timestamp;

#[cfg(test)]
pub mod test_utils;

pub use core::{
    ClearResponse, Transaction, TransactionQuery, TransactionStatus, TransactionType,
    create_transaction_table, delete_all_transactions,
};
pub use export::{ExportFile, ExportFormat, ExportRequest, export_transactions};
pub use generator::{GenerateRequest, MAX_GENERATE_COUNT, generate_batch, generate_transactions, save_transactions};
pub use stats::{TransactionStats, TypeBreakdown, get_transaction_stats};

pub(crate) use core::query_transactions;

#[cfg(test)]
pub(crate) use core::insert_transaction;
