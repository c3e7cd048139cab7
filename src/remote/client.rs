//! Simulation service client: reset, play and legacy render

use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::game::GameState;

use super::protocol::{
    PlayBody, PlayRequest, PlayResponse, RenderBody, RenderRequest, RenderedFrame, ResetBody,
};

/// Thin request/response wrapper around the simulation endpoints
#[derive(Clone)]
pub struct SimClient {
    client: Client,
    base_url: String,
}

impl SimClient {
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build().map_err(ClientError::Request)?,
            base_url: config.api_url.clone(),
        })
    }

    /// Get the full URL for an endpoint
    fn endpoint_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// POST a JSON body (or none) and decode the JSON response
    async fn post<T: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&T>,
    ) -> Result<R, ClientError> {
        let url = self.endpoint_url(path);

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", "application/json");
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ClientError::Request)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response.json().await.map_err(ClientError::Parse)
    }

    /// Start a new episode
    pub async fn reset(&self) -> Result<GameState, ClientError> {
        let body: ResetBody = self.post::<(), _>("reset", None).await?;
        let state = validate_state(body.state)?;
        debug!(state = ?state.as_array(), "Reset accepted");
        Ok(state)
    }

    /// Advance the simulation by one step with the human's action
    pub async fn play(&self, request: &PlayRequest) -> Result<PlayResponse, ClientError> {
        let body: PlayBody = self.post("play", Some(request)).await?;
        Ok(PlayResponse {
            state: validate_state(body.state)?,
            terminated: body.terminated,
            rewards: body.rewards,
        })
    }

    /// Ask the server to rasterize a state
    pub async fn render(&self, state: &GameState) -> Result<RenderedFrame, ClientError> {
        let body: RenderBody = self.post("render", Some(&RenderRequest { state })).await?;
        let png = STANDARD
            .decode(body.image.trim())
            .map_err(ClientError::Image)?;
        Ok(RenderedFrame { png })
    }
}

fn validate_state(state: Option<Vec<f64>>) -> Result<GameState, ClientError> {
    let values = state.ok_or(ClientError::MissingState)?;
    GameState::try_from(values).map_err(ClientError::MalformedState)
}

/// Simulation client errors
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Failed to parse response: {0}")]
    Parse(#[source] reqwest::Error),

    #[error("Response has no state")]
    MissingState,

    #[error("Invalid state: expected {} values, got {0}", GameState::LEN)]
    MalformedState(usize),

    #[error("Invalid image encoding: {0}")]
    Image(#[from] base64::DecodeError),
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::game::{InputMethod, Role};
    use axum::{extract::State, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tokio::net::TcpListener;
    use tokio_test::{assert_err, assert_ok};

    /// Canned responses for the mock simulation service
    #[derive(Clone)]
    pub(crate) struct MockSim {
        pub reset: Value,
        pub play: Value,
        pub render: Value,
        pub seen_play: Arc<parking_lot::Mutex<Vec<Value>>>,
        pub reset_calls: Arc<std::sync::atomic::AtomicUsize>,
    }

    impl MockSim {
        pub(crate) fn new(reset: Value, play: Value) -> Self {
            Self {
                reset,
                play,
                render: json!({ "image": "iVBORw0KGgo=" }),
                seen_play: Arc::default(),
                reset_calls: Arc::default(),
            }
        }

        pub(crate) fn reset_count(&self) -> usize {
            self.reset_calls.load(std::sync::atomic::Ordering::SeqCst)
        }
    }

    /// Serve the mock on an ephemeral port and return its base URL
    pub(crate) async fn serve_mock(mock: MockSim) -> String {
        async fn reset(State(mock): State<MockSim>) -> Json<Value> {
            mock.reset_calls
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            Json(mock.reset.clone())
        }
        async fn play(State(mock): State<MockSim>, Json(body): Json<Value>) -> Json<Value> {
            mock.seen_play.lock().push(body);
            Json(mock.play.clone())
        }
        async fn render(State(mock): State<MockSim>) -> Json<Value> {
            Json(mock.render.clone())
        }

        let router = Router::new()
            .route("/reset", post(reset))
            .route("/play", post(play))
            .route("/render", post(render))
            .with_state(mock);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    pub(crate) fn test_config(api_url: &str) -> Config {
        Config::from_lookup(|key| match key {
            "API_URL" => Some(api_url.to_string()),
            _ => None,
        })
        .unwrap()
    }

    fn sample_request() -> PlayRequest {
        PlayRequest {
            human_role: Role::Predator,
            human_action: 1.0,
            state: GameState::new([0.0, 0.1, 0.2, 0.3, 0.4]),
            player_id: "tester".to_string(),
            real_time: 0.25,
            input_method: Some(InputMethod::Joystick),
        }
    }

    #[tokio::test]
    async fn reset_returns_state() {
        let mock = MockSim::new(json!({ "state": [0, 0.1, 0.2, 0.3, 0.4] }), json!({}));
        let url = serve_mock(mock.clone()).await;
        let client = SimClient::new(&test_config(&url)).unwrap();

        let state = assert_ok!(client.reset().await);
        assert_eq!(state.prey(), (0.1, 0.2));
        assert_eq!(mock.reset_count(), 1);
    }

    #[tokio::test]
    async fn reset_rejects_missing_or_short_state() {
        let url = serve_mock(MockSim::new(json!({ "status": "ok" }), json!({}))).await;
        let client = SimClient::new(&test_config(&url)).unwrap();
        assert!(matches!(client.reset().await, Err(ClientError::MissingState)));

        let url = serve_mock(MockSim::new(json!({ "state": [0, 1] }), json!({}))).await;
        let client = SimClient::new(&test_config(&url)).unwrap();
        assert!(matches!(
            client.reset().await,
            Err(ClientError::MalformedState(2))
        ));

        let url = serve_mock(MockSim::new(json!({ "state": "nope" }), json!({}))).await;
        let client = SimClient::new(&test_config(&url)).unwrap();
        assert!(matches!(client.reset().await, Err(ClientError::Parse(_))));
    }

    #[tokio::test]
    async fn play_sends_full_payload() {
        let mock = MockSim::new(
            json!({}),
            json!({ "state": [0.1, 0.2, 0.2, 0.5, 0.5], "terminated": true, "rewards": [1, -1] }),
        );
        let url = serve_mock(mock.clone()).await;
        let client = SimClient::new(&test_config(&url)).unwrap();

        let response = assert_ok!(client.play(&sample_request()).await);
        assert!(response.terminated);
        assert_eq!(response.rewards, vec![1.0, -1.0]);

        let seen = mock.seen_play.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0]["human_role"], "predator");
        assert_eq!(seen[0]["player_id"], "tester");
        assert_eq!(seen[0]["input_method"], "joystick");
    }

    #[tokio::test]
    async fn render_decodes_base64() {
        let url = serve_mock(MockSim::new(json!({}), json!({}))).await;
        let client = SimClient::new(&test_config(&url)).unwrap();

        let frame = assert_ok!(client.render(&GameState::new([0.0; 5])).await);
        assert_eq!(&frame.png[1..4], b"PNG");
    }

    #[tokio::test]
    async fn unreachable_server_is_a_request_error() {
        let client = SimClient::new(&test_config("http://127.0.0.1:1")).unwrap();
        let err = assert_err!(client.reset().await);
        assert!(matches!(err, ClientError::Request(_)));
    }
}
