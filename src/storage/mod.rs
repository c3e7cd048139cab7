//! Process-lifetime key/value storage and the player identity kept in it

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Key the player name is stored under
pub const PLAYER_NAME_KEY: &str = "playerName";
/// Longest accepted display name, in characters
pub const MAX_NAME_CHARS: usize = 10;

/// In-memory storage that lives as long as the process
#[derive(Clone, Default)]
pub struct SessionStorage {
    entries: Arc<RwLock<HashMap<String, String>>>,
}

impl SessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.read().get(key).cloned()
    }

    pub fn set(&self, key: &str, value: &str) {
        self.entries.write().insert(key.to_string(), value.to_string());
    }

    pub fn player_name(&self) -> Option<String> {
        self.get(PLAYER_NAME_KEY)
    }

    /// Validate and store a display name, returning the stored form
    pub fn store_player_name(&self, raw: &str) -> Result<String, NameError> {
        let name = validate_name(raw)?;
        self.set(PLAYER_NAME_KEY, &name);
        Ok(name)
    }
}

/// Trim and check a display name (1 to 10 characters)
pub fn validate_name(raw: &str) -> Result<String, NameError> {
    let name = raw.trim();
    let chars = name.chars().count();
    if chars == 0 {
        return Err(NameError::Empty);
    }
    if chars > MAX_NAME_CHARS {
        return Err(NameError::TooLong(chars));
    }
    Ok(name.to_string())
}

/// Display name validation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NameError {
    #[error("Name must be 1–10 characters.")]
    Empty,

    #[error("Name must be 1–10 characters.")]
    TooLong(usize),
}
