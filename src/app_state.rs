//! Implements a struct that holds the state of the REST server.

use std::sync::{Arc, Mutex};

use axum::extract::FromRef;
use rusqlite::Connection;

use crate::{
    Error,
    backend::{HttpBackend, LocalBackend, TransactionBackend},
    db::initialize,
    timezone::get_local_offset,
};

/// The state of the REST server.
#[derive(Debug, Clone)]
pub struct AppState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,

    /// The transaction service used by the dashboard.
    pub backend: Arc<dyn TransactionBackend>,

    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl AppState {
    /// Create a new [AppState] with a SQLite database connection.
    ///
    /// This function will initialize the database by adding the tables for the domain models.
    /// `local_timezone` should be a valid, canonical timezone name, e.g. "Pacific/Auckland".
    ///
    /// The dashboard calls the JSON API at `backend_url` if one is given,
    /// otherwise it uses the local database directly.
    ///
    /// # Errors
    /// Returns an error if the database cannot be initialized or the timezone is not known.
    pub fn new(
        db_connection: Connection,
        local_timezone: &str,
        backend_url: Option<&str>,
    ) -> Result<Self, Error> {
        initialize(&db_connection)?;

        if get_local_offset(local_timezone).is_none() {
            return Err(Error::InvalidTimezoneError(local_timezone.to_owned()));
        }

        let connection = Arc::new(Mutex::new(db_connection));

        let backend: Arc<dyn TransactionBackend> = match backend_url {
            Some(url) => {
                tracing::info!("Dashboard will use the transaction API at {url}");
                Arc::new(HttpBackend::new(url))
            }
            None => Arc::new(LocalBackend::new(connection.clone())),
        };

        Ok(Self {
            db_connection: connection,
            backend,
            local_timezone: local_timezone.to_owned(),
        })
    }
}

/// The state needed by the JSON API.
#[derive(Debug, Clone)]
pub struct ApiState {
    /// The database connection
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for ApiState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The state needed by the dashboard pages.
#[derive(Debug, Clone)]
pub struct DashboardState {
    /// The transaction service to call.
    pub backend: Arc<dyn TransactionBackend>,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for DashboardState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            backend: state.backend.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}
