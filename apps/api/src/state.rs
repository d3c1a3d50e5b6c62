use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::jwt::JwtKeys;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::storage::FileStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Object store holding uploaded CV files.
    pub files: FileStore,
    pub llm: LlmClient,
    pub jwt: JwtKeys,
    pub config: Arc<Config>,
}
