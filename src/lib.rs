pub mod api;
pub mod auth;
pub mod cli;
pub mod config;
pub mod qr;
pub mod validation;
pub mod wizard;

use std::sync::Arc;
use std::time::Duration;

use api::{ApiClient, ApiResult};
use auth::AuthContext;
use config::Config;

/// Shared handles for one client session.
///
/// The API client (and its cookie store) is the single owner of the session
/// credential; the auth context is the single consumer of the verification
/// endpoint. Everything else borrows from here.
pub struct AppContext {
    pub config: Config,
    pub api: Arc<ApiClient>,
    pub auth: AuthContext,
}

impl AppContext {
    pub fn new(config: Config) -> ApiResult<Self> {
        let api = Arc::new(ApiClient::new(
            &config.api.base_url,
            Duration::from_secs(config.api.timeout_secs),
        )?);
        let auth = AuthContext::new(api.clone());

        Ok(Self { config, api, auth })
    }
}
