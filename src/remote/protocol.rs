//! Wire types for the `/reset`, `/play` and `/render` endpoints

use serde::{Deserialize, Serialize};

use crate::game::{GameState, InputMethod, Role};

/// Body of a `/play` request
#[derive(Debug, Clone, Serialize)]
pub struct PlayRequest {
    pub human_role: Role,
    /// Action angle in radians
    pub human_action: f64,
    pub state: GameState,
    pub player_id: String,
    /// Seconds since the human started the episode
    pub real_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_method: Option<InputMethod>,
}

/// Raw `/reset` response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ResetBody {
    #[serde(default)]
    pub state: Option<Vec<f64>>,
}

/// Raw `/play` response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PlayBody {
    #[serde(default)]
    pub state: Option<Vec<f64>>,
    #[serde(default)]
    pub terminated: bool,
    #[serde(default)]
    pub rewards: Vec<f64>,
}

/// Validated `/play` response
#[derive(Debug, Clone, PartialEq)]
pub struct PlayResponse {
    pub state: GameState,
    pub terminated: bool,
    pub rewards: Vec<f64>,
}

/// Body of a `/render` request
#[derive(Debug, Clone, Serialize)]
pub(crate) struct RenderRequest<'a> {
    pub state: &'a GameState,
}

/// Raw `/render` response, image is base64 PNG
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RenderBody {
    pub image: String,
}

/// Decoded server-rendered frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedFrame {
    pub png: Vec<u8>,
}
