//! Application Context
//!
//! Owns everything a command invocation needs: configuration, the command
//! table, and the authenticated Google client, which is built on first use so
//! commands that fail validation never fetch a token.

use tokio::sync::OnceCell;
use tracing::debug;

use crate::auth::TokenSource;
use crate::commands::CommandRegistry;
use crate::common::AppResult;
use crate::config::Config;
use crate::google::GoogleClient;

pub struct AppContext {
    config: Config,
    registry: CommandRegistry,
    access_token: Option<String>,
    client: OnceCell<GoogleClient>,
}

impl AppContext {
    pub fn new(config: Config, registry: CommandRegistry, access_token: Option<String>) -> Self {
        Self {
            config,
            registry,
            access_token,
            client: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    /// Get or build the authenticated client
    pub async fn google(&self) -> AppResult<GoogleClient> {
        self.client
            .get_or_try_init(|| async {
                let source = TokenSource::select(self.access_token.as_deref(), &self.config)?;
                debug!("Using token source: {}", source.describe());
                let token = source.fetch().await?;
                GoogleClient::new(token, &self.config)
            })
            .await
            .cloned()
    }
}
