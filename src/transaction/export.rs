//! Exporting stored transactions as a downloadable JSON or CSV file.

use std::str::FromStr;

use axum::{
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::{
    Error,
    transaction::{
        core::{
            Transaction, TransactionFilter, TransactionStatus, TransactionType, empty_as_none,
            query_transactions,
        },
        timestamp,
    },
};

/// The most transactions that are written to one export file.
pub const EXPORT_LIMIT: u32 = 10_000;

/// The file formats transactions can be exported as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// A pretty printed JSON array of transactions.
    #[default]
    Json,
    /// One header row followed by one row per transaction.
    Csv,
}

impl ExportFormat {
    /// The file extension, which is also the wire representation.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// The MIME type of an exported file.
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
        }
    }

    /// The upper case name for display.
    pub fn label(self) -> &'static str {
        match self {
            ExportFormat::Json => "JSON",
            ExportFormat::Csv => "CSV",
        }
    }

    /// The download file name, e.g. "transactions.csv".
    pub fn filename(self) -> String {
        format!("transactions.{}", self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            other => Err(Error::InvalidExportFormat(other.to_owned())),
        }
    }
}

/// Which transactions to export and how.
///
/// The date bounds are inclusive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportRequest {
    /// The file format to write.
    #[serde(default)]
    pub format: ExportFormat,
    /// Only export transactions at or after this time.
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<OffsetDateTime>,
    /// Only export transactions at or before this time.
    #[serde(
        default,
        with = "timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<OffsetDateTime>,
    /// Only export transactions of this type.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub transaction_type: Option<TransactionType>,
    /// Only export transactions with this status.
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<TransactionStatus>,
}

/// An exported file, ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportFile {
    /// The MIME type of `body`.
    pub content_type: String,
    /// The suggested download file name.
    pub filename: String,
    /// The file contents.
    pub body: Vec<u8>,
}

impl IntoResponse for ExportFile {
    fn into_response(self) -> Response {
        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or(HeaderValue::from_static("application/octet-stream"));
        let disposition =
            HeaderValue::from_str(&format!("attachment; filename={}", self.filename))
                .unwrap_or(HeaderValue::from_static("attachment"));

        (
            [
                (header::CONTENT_TYPE, content_type),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            self.body,
        )
            .into_response()
    }
}

/// Write the transactions matching `request` to a file, newest first.
///
/// At most [EXPORT_LIMIT] transactions are written. A CSV export with no
/// matching transactions is an empty file without a header row.
///
/// # Errors
/// Returns [Error::SqlError] if the query fails, or
/// [Error::JSONSerializationError]/[Error::CsvError] if encoding fails.
pub fn export_transactions(
    request: &ExportRequest,
    connection: &Connection,
) -> Result<ExportFile, Error> {
    let filter = TransactionFilter {
        transaction_type: request.transaction_type,
        status: request.status,
        start: request.start_date,
        end: request.end_date,
    };
    let transactions = query_transactions(&filter, EXPORT_LIMIT, 0, connection)?;

    let body = match request.format {
        ExportFormat::Json => serde_json::to_vec_pretty(&transactions)
            .map_err(|error| Error::JSONSerializationError(error.to_string()))?,
        ExportFormat::Csv => write_csv(&transactions)?,
    };

    Ok(ExportFile {
        content_type: request.format.content_type().to_owned(),
        filename: request.format.filename(),
        body,
    })
}

fn write_csv(transactions: &[Transaction]) -> Result<Vec<u8>, Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    for transaction in transactions {
        writer
            .serialize(transaction)
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    writer
        .into_inner()
        .map_err(|error| Error::CsvError(error.to_string()))
}
