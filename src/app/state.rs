//! Application state built once at startup

use std::sync::Arc;

use tracing::warn;

use crate::config::Config;
use crate::game::Session;
use crate::remote::{ClientError, SimClient};
use crate::storage::SessionStorage;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: SimClient,
    pub storage: SessionStorage,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let config = Arc::new(config);

        let client = SimClient::new(&config)?;

        // A name from the environment skips the name prompt
        let storage = SessionStorage::new();
        if let Some(name) = &config.player_name {
            if let Err(e) = storage.store_player_name(name) {
                warn!(name = %name, error = %e, "Ignoring PLAYER_NAME");
            }
        }

        Ok(Self {
            config,
            client,
            storage,
        })
    }

    /// Fresh session seeded from configuration
    pub fn session(&self) -> Session {
        Session::new(
            self.storage.clone(),
            self.config.human_role,
            self.config.input_method,
        )
        .with_remote_render(self.config.render_output.is_some())
    }
}
