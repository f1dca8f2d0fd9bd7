use std::sync::Arc;

use crate::config::Config;
use crate::resolver::CredentialResolver;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub resolver: Arc<CredentialResolver>,
}

impl AppState {
    pub fn new(config: Config, resolver: CredentialResolver) -> Self {
        Self {
            config: Arc::new(config),
            resolver: Arc::new(resolver),
        }
    }

    pub fn from_config(config: Config) -> crate::Result<Self> {
        let resolver = CredentialResolver::from_config(&config)?;
        Ok(Self::new(config, resolver))
    }
}
