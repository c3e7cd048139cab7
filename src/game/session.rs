//! Session controller: owns every piece of mutable client state
//!
//! The session is driven entirely by method calls (input, frame ticks,
//! network completions, countdown deadlines) and answers with [`Command`]s
//! for the driver to execute. It never touches the network or the clock
//! itself, so it runs on a single task without locks.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::input::{ActionAngle, ArrowKey, Joystick, KeyboardState, KnobOffset};
use crate::remote::{ClientError, PlayRequest, PlayResponse};
use crate::render::{draw_scene, Surface};
use crate::storage::SessionStorage;
use crate::util::time::{send_interval, COUNTDOWN_STEP};

use super::hud::{CountdownStep, Hud, NameModal};
use super::{GameState, InputMethod, Outcome, Role, Trail};

/// Joystick widget radius in host units
pub const JOYSTICK_RADIUS: f64 = 50.0;

const START_PROMPT: &str = "Use the arrow keys or the joystick to start the game!";

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Splash screen, nothing requested yet
    Splash,
    /// Waiting for a valid player name
    NamePrompt,
    /// `/reset` in flight
    Resetting,
    /// Countdown before input may start the episode
    Countdown,
    /// Valid state, waiting for the first input
    Ready,
    /// Frame loop running
    Active,
    /// Last reset failed; a new reset is needed
    Idle,
}

/// Side effects requested by the session
#[derive(Debug, Clone)]
pub enum Command {
    Reset {
        generation: u64,
    },
    Play {
        generation: u64,
        seq: u64,
        request: PlayRequest,
    },
    /// Ask the server for a rendered image of `state`
    Render { state: GameState },
}

/// Client-side game session
pub struct Session {
    storage: SessionStorage,
    remote_render: bool,

    phase: Phase,
    role: Role,
    input_method: InputMethod,
    player_name: Option<String>,

    state: Option<GameState>,
    action: ActionAngle,
    prey_trail: Trail,
    predator_trail: Trail,

    keyboard: KeyboardState,
    joystick: Joystick,
    has_sent_first_action: bool,
    start_requested: Option<InputMethod>,

    /// Bumped on every reset; completions from older generations are dropped
    generation: u64,
    next_seq: u64,
    last_applied_seq: u64,

    game_started_at: Option<Instant>,
    /// When the next play request is due on the fixed send schedule
    next_send: Option<Instant>,
    countdown_deadline: Option<Instant>,
    countdown_step: Duration,

    hud: Hud,
}

impl Session {
    pub fn new(storage: SessionStorage, role: Role, input_method: InputMethod) -> Self {
        Self {
            storage,
            remote_render: false,
            phase: Phase::Splash,
            role,
            input_method,
            player_name: None,
            state: None,
            action: 0.0,
            prey_trail: Trail::new(),
            predator_trail: Trail::new(),
            keyboard: KeyboardState::new(),
            joystick: Joystick::new(JOYSTICK_RADIUS),
            has_sent_first_action: false,
            start_requested: None,
            generation: 0,
            next_seq: 1,
            last_applied_seq: 0,
            game_started_at: None,
            next_send: None,
            countdown_deadline: None,
            countdown_step: COUNTDOWN_STEP,
            hud: Hud::new(role, input_method),
        }
    }

    /// Also fetch a server-rendered image for every applied state
    pub fn with_remote_render(mut self, enabled: bool) -> Self {
        self.remote_render = enabled;
        self
    }

    /// Override the time each countdown step stays on screen
    pub fn with_countdown_step(mut self, step: Duration) -> Self {
        self.countdown_step = step;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn hud(&self) -> &Hud {
        &self.hud
    }

    /// When the driver should call [`Session::on_countdown_deadline`]
    pub fn countdown_deadline(&self) -> Option<Instant> {
        self.countdown_deadline
    }

    /// Draw the latest state; draws nothing before the first reset
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S) {
        if let Some(state) = &self.state {
            draw_scene(surface, state, &self.prey_trail, &self.predator_trail);
        }
    }

    // ------------------------------------------------------------------
    // UI controls
    // ------------------------------------------------------------------

    /// Leave the splash screen: reset straight away when a name is stored
    pub fn begin(&mut self) -> Vec<Command> {
        if self.phase != Phase::Splash {
            return Vec::new();
        }
        self.hud.splash = false;

        match self.storage.player_name() {
            Some(name) => {
                self.set_player(name);
                self.request_reset()
            }
            None => {
                self.phase = Phase::NamePrompt;
                self.hud.name_modal = Some(NameModal::default());
                Vec::new()
            }
        }
    }

    /// Edit the text in the name modal
    pub fn edit_name(&mut self, input: impl Into<String>) {
        if let Some(modal) = self.hud.name_modal.as_mut() {
            modal.input = input.into();
        }
    }

    /// Submit the name modal; invalid names keep the modal open
    pub fn submit_name(&mut self, raw: &str) -> Vec<Command> {
        if self.phase != Phase::NamePrompt {
            return Vec::new();
        }

        match self.storage.store_player_name(raw) {
            Ok(name) => {
                self.hud.name_modal = None;
                self.set_player(name);
                self.request_reset()
            }
            Err(e) => {
                debug!(error = %e, "Rejected player name");
                if let Some(modal) = self.hud.name_modal.as_mut() {
                    modal.alert = Some(e.to_string());
                }
                Vec::new()
            }
        }
    }

    pub fn switch_role(&mut self, now: Instant) -> Vec<Command> {
        self.role = self.role.toggled();
        self.hud.role = self.role;
        self.hud.toast("Role switched!", now);
        info!(role = ?self.role, "Role switched");
        self.reset()
    }

    /// Reset control; ignored until a player name exists
    pub fn reset(&mut self) -> Vec<Command> {
        if self.player_name.is_none() {
            return Vec::new();
        }
        self.request_reset()
    }

    pub fn select_input(&mut self, method: InputMethod) {
        self.input_method = method;
        self.hud.input_method = method;
    }

    // ------------------------------------------------------------------
    // Input capture
    // ------------------------------------------------------------------

    pub fn key_down(&mut self, key: ArrowKey, now: Instant) {
        self.keyboard.press(key);
        self.request_start(InputMethod::Keyboard, now);
    }

    /// Key press on a host that never reports releases
    pub fn key_down_exclusive(&mut self, key: ArrowKey, now: Instant) {
        self.keyboard.press_exclusive(key);
        self.request_start(InputMethod::Keyboard, now);
    }

    pub fn key_up(&mut self, key: ArrowKey) {
        self.keyboard.release(key);
    }

    pub fn pointer_down(&mut self, offset: KnobOffset, now: Instant) {
        let angle = self.joystick.press(offset);
        self.apply_joystick(angle);
        self.request_start(InputMethod::Joystick, now);
    }

    pub fn pointer_move(&mut self, offset: KnobOffset) {
        if let Some(angle) = self.joystick.drag(offset) {
            self.apply_joystick(angle);
        }
    }

    /// Release the stick; the stored action is kept
    pub fn pointer_up(&mut self) {
        self.joystick.release();
        self.hud.knob = self.joystick.knob();
    }

    fn apply_joystick(&mut self, angle: ActionAngle) {
        self.hud.knob = self.joystick.knob();
        if self.is_active() && self.input_method != InputMethod::Joystick {
            return;
        }
        self.action = angle;
        self.has_sent_first_action = true;
    }

    /// Start now when ready, defer until "GO!" during the countdown, else ignore
    fn request_start(&mut self, method: InputMethod, now: Instant) {
        match self.phase {
            Phase::Ready => self.start_game(method, now),
            Phase::Countdown => {
                if self.start_requested.is_none() {
                    debug!(?method, "Start deferred until countdown ends");
                }
                self.start_requested = Some(method);
            }
            _ => {}
        }
    }

    fn start_game(&mut self, method: InputMethod, now: Instant) {
        self.select_input(method);
        self.phase = Phase::Active;
        self.game_started_at = Some(now);
        self.next_send = None;
        self.hud.set_status("Game started!");
        self.hud.toast("Game started!", now);
        info!(generation = self.generation, input = %method, "Game started");
    }

    // ------------------------------------------------------------------
    // Game loop
    // ------------------------------------------------------------------

    /// One animation frame. Sends at most one play request per send interval.
    pub fn on_frame(&mut self, now: Instant) -> Vec<Command> {
        if !self.is_active() {
            return Vec::new();
        }

        match self.input_method {
            InputMethod::Keyboard => {
                if self.keyboard.direction().is_some() {
                    self.has_sent_first_action = true;
                }
                self.action = self.keyboard.compute_direction(self.action);
            }
            InputMethod::Joystick => {
                if self.joystick.is_captured() {
                    self.has_sent_first_action = true;
                }
            }
        }

        let deadline = self.next_send.unwrap_or(now);
        if now < deadline || !self.has_sent_first_action {
            return Vec::new();
        }

        let Some(state) = self.state else {
            return Vec::new();
        };

        let real_time = self
            .game_started_at
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(Duration::ZERO)
            .as_secs_f64();

        let seq = self.next_seq;
        self.next_seq += 1;
        // whole intervals; restart from now once more than one behind
        let mut next = deadline + send_interval();
        if next <= now {
            next = now + send_interval();
        }
        self.next_send = Some(next);

        vec![Command::Play {
            generation: self.generation,
            seq,
            request: PlayRequest {
                human_role: self.role,
                human_action: self.action,
                state,
                player_id: self.player_name.clone().unwrap_or_default(),
                real_time,
                input_method: Some(self.input_method),
            },
        }]
    }

    pub fn expire_toasts(&mut self, now: Instant) {
        self.hud.expire_toasts(now);
    }

    // ------------------------------------------------------------------
    // Reset cycle
    // ------------------------------------------------------------------

    fn request_reset(&mut self) -> Vec<Command> {
        self.generation += 1;
        self.phase = Phase::Resetting;
        self.keyboard.clear();
        self.start_requested = None;
        self.countdown_deadline = None;
        self.hud.countdown = None;
        debug!(generation = self.generation, "Requesting reset");
        vec![Command::Reset {
            generation: self.generation,
        }]
    }

    pub fn on_reset_complete(
        &mut self,
        generation: u64,
        result: Result<GameState, ClientError>,
        now: Instant,
    ) -> Vec<Command> {
        if generation != self.generation || self.phase != Phase::Resetting {
            debug!(generation, current = self.generation, "Dropping stale reset response");
            return Vec::new();
        }

        let state = match result {
            Ok(state) => state,
            Err(e) => {
                warn!(generation, error = %e, "Reset failed");
                self.hud.set_status(format!("Error resetting game: {e}"));
                self.phase = Phase::Idle;
                return Vec::new();
            }
        };

        self.state = Some(state);
        self.prey_trail.clear();
        self.predator_trail.clear();
        self.has_sent_first_action = false;
        self.joystick.recenter();
        self.hud.knob = self.joystick.knob();
        self.hud.update_timer(state.elapsed());
        self.hud.set_status(START_PROMPT);
        self.hud.toast("Game reset!", now);

        self.phase = Phase::Countdown;
        self.hud.countdown = Some(CountdownStep::FIRST);
        self.countdown_deadline = Some(now + self.countdown_step);
        info!(generation, "Episode reset");

        self.render_command(state)
    }

    /// Advance the countdown; honors a deferred start after "GO!"
    pub fn on_countdown_deadline(&mut self, now: Instant) {
        if self.phase != Phase::Countdown {
            self.countdown_deadline = None;
            return;
        }
        let Some(step) = self.hud.countdown else {
            return;
        };

        match step.next() {
            Some(next) => {
                self.hud.countdown = Some(next);
                self.countdown_deadline = Some(now + self.countdown_step);
            }
            None => {
                self.hud.countdown = None;
                self.countdown_deadline = None;
                self.phase = Phase::Ready;
                if let Some(method) = self.start_requested.take() {
                    self.start_game(method, now);
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Play responses
    // ------------------------------------------------------------------

    pub fn on_play_complete(
        &mut self,
        generation: u64,
        seq: u64,
        result: Result<PlayResponse, ClientError>,
        now: Instant,
    ) -> Vec<Command> {
        if generation != self.generation || !self.is_active() {
            debug!(generation, seq, "Dropping play response for an inactive episode");
            return Vec::new();
        }

        if seq <= self.last_applied_seq {
            debug!(seq, last = self.last_applied_seq, "Dropping out-of-order play response");
            return Vec::new();
        }

        let response = match result {
            Ok(response) => response,
            Err(e) => {
                warn!(generation, seq, error = %e, "Play request failed");
                self.hud.set_status(format!("Error during play: {e}"));
                return Vec::new();
            }
        };
        self.last_applied_seq = seq;

        let state = response.state;
        self.state = Some(state);
        self.prey_trail.push(state.prey());
        self.predator_trail.push(state.predator());
        self.hud.set_status(self.role.objective());
        self.hud.update_timer(state.elapsed());

        let mut commands = self.render_command(state);

        if response.terminated {
            let outcome = Outcome::from_rewards(self.role, &response.rewards);
            info!(generation, ?outcome, rewards = ?response.rewards, "Episode terminated");
            self.hud.set_status("Game terminated. Resetting...");
            self.hud.toast(outcome.message(), now);
            commands.extend(self.request_reset());
        }

        commands
    }

    fn render_command(&self, state: GameState) -> Vec<Command> {
        if self.remote_render {
            vec![Command::Render { state }]
        } else {
            Vec::new()
        }
    }

    fn set_player(&mut self, name: String) {
        info!(player = %name, "Player identified");
        self.hud.player_name = Some(name.clone());
        self.player_name = Some(name);
    }
}

#[cfg(test)]
impl Session {
    pub fn is_resetting(&self) -> bool {
        self.phase == Phase::Resetting
    }

    pub fn has_sent_first_action(&self) -> bool {
        self.has_sent_first_action
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn input_method(&self) -> InputMethod {
        self.input_method
    }

    pub fn action(&self) -> ActionAngle {
        self.action
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn prey_trail(&self) -> &Trail {
        &self.prey_trail
    }

    pub fn predator_trail(&self) -> &Trail {
        &self.predator_trail
    }
}
