use async_trait::async_trait;
use reqwest::{Client, Response, header};

use crate::{
    Error,
    backend::TransactionBackend,
    endpoints,
    transaction::{
        ClearResponse, ExportFile, ExportRequest, GenerateRequest, Transaction, TransactionQuery,
        TransactionStats,
    },
};

/// Calls the JSON API of another Paymock server.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    client: Client,
}

impl HttpBackend {
    /// Create a backend for the server at `base_url`, e.g. "http://localhost:3000".
    ///
    /// The API paths, e.g. "/api/transactions", are appended to `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }
}

/// Turn a non-2xx response into [Error::BackendStatus].
///
/// The detail is taken from a JSON `{"detail": ...}` body when there is one,
/// otherwise the raw body text is used.
async fn check_status(response: Response) -> Result<Response, Error> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<serde_json::Value>(&body) {
        Ok(serde_json::Value::Object(mut object)) => match object.remove("detail") {
            Some(serde_json::Value::String(detail)) => detail,
            Some(detail) => detail.to_string(),
            None => body,
        },
        _ => body,
    };

    tracing::warn!(
        "Transaction service responded with status {}: {}",
        status.as_u16(),
        detail
    );

    Err(Error::BackendStatus {
        status: status.as_u16(),
        detail,
    })
}

/// Get the file name from a header like `attachment; filename=transactions.csv`.
fn parse_filename(content_disposition: &str) -> Option<String> {
    content_disposition
        .split(';')
        .filter_map(|part| part.trim().strip_prefix("filename="))
        .map(|name| name.trim_matches('"').to_owned())
        .find(|name| !name.is_empty())
}

#[async_trait]
impl TransactionBackend for HttpBackend {
    async fn list_transactions(&self, query: &TransactionQuery) -> Result<Vec<Transaction>, Error> {
        let response = self
            .client
            .get(self.url(endpoints::TRANSACTIONS_API))
            .query(query)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn stats(&self) -> Result<TransactionStats, Error> {
        let response = self
            .client
            .get(self.url(endpoints::TRANSACTION_STATS_API))
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<Vec<Transaction>, Error> {
        let response = self
            .client
            .post(self.url(endpoints::GENERATE_TRANSACTIONS_API))
            .json(request)
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }

    async fn export(&self, request: &ExportRequest) -> Result<ExportFile, Error> {
        let response = self
            .client
            .post(self.url(endpoints::EXPORT_TRANSACTIONS_API))
            .json(request)
            .send()
            .await?;
        let response = check_status(response).await?;

        let header_text = |name: header::HeaderName| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::to_owned)
        };
        let content_type = header_text(header::CONTENT_TYPE)
            .unwrap_or_else(|| request.format.content_type().to_owned());
        let filename = header_text(header::CONTENT_DISPOSITION)
            .as_deref()
            .and_then(parse_filename)
            .unwrap_or_else(|| request.format.filename());

        let body = response.bytes().await?.to_vec();

        Ok(ExportFile {
            content_type,
            filename,
            body,
        })
    }

    async fn clear(&self) -> Result<ClearResponse, Error> {
        let response = self
            .client
            .delete(self.url(endpoints::TRANSACTIONS_API))
            .send()
            .await?;

        Ok(check_status(response).await?.json().await?)
    }
}

#[cfg(test)]
mod parse_filename_tests {
    use super::parse_filename;

    #[test]
    fn reads_plain_and_quoted_names() {
        assert_eq!(
            parse_filename("attachment; filename=transactions.csv"),
            Some("transactions.csv".to_owned())
        );
        assert_eq!(
            parse_filename("attachment; filename=\"report.json\""),
            Some("report.json".to_owned())
        );
    }

    #[test]
    fn missing_name_is_none() {
        assert_eq!(parse_filename("attachment"), None);
        assert_eq!(parse_filename("attachment; filename="), None);
    }
}
