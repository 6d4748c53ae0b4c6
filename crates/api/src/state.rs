use std::sync::Arc;

use crate::config::ServerConfig;
use crate::email::Mailer;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: gatehouse_db::DbPool,
    /// Server configuration (token secrets, bind address, CORS).
    pub config: Arc<ServerConfig>,
    /// Outbound mailer; `None` when SMTP is not configured (delivery is
    /// skipped and logged instead).
    pub mailer: Option<Arc<Mailer>>,
}
