//! Game session modules

pub mod driver;
pub mod hud;
pub mod session;
pub mod trail;

pub use driver::{spawn_driver, DriverHandle, SessionEvent, View};
pub use hud::Hud;
pub use session::{Command, Phase, Session};
pub use trail::Trail;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which agent the human controls this episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Predator,
    Prey,
}

impl Role {
    pub fn toggled(self) -> Self {
        match self {
            Role::Predator => Role::Prey,
            Role::Prey => Role::Predator,
        }
    }

    /// Index of this role's entry in the `rewards` array
    pub fn reward_index(self) -> usize {
        match self {
            Role::Prey => 0,
            Role::Predator => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Predator => "Predator",
            Role::Prey => "Prey",
        }
    }

    /// Status line shown while an episode is running
    pub fn objective(self) -> &'static str {
        match self {
            Role::Prey => "Avoid the predator until the time runs out!",
            Role::Predator => "Catch the prey before the time runs out!",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "predator" => Ok(Role::Predator),
            "prey" => Ok(Role::Prey),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// Active input source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputMethod {
    #[default]
    Keyboard,
    Joystick,
}

impl FromStr for InputMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "keyboard" => Ok(InputMethod::Keyboard),
            "joystick" => Ok(InputMethod::Joystick),
            other => Err(format!("unknown input method: {other}")),
        }
    }
}

impl fmt::Display for InputMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMethod::Keyboard => f.write_str("keyboard"),
            InputMethod::Joystick => f.write_str("joystick"),
        }
    }
}

/// `[elapsed_time, prey_x, prey_y, predator_x, predator_y]`, positions in [0, 1].
///
/// Replaced wholesale on every applied response, never edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct GameState([f64; 5]);

impl GameState {
    pub const LEN: usize = 5;

    pub fn new(values: [f64; 5]) -> Self {
        Self(values)
    }

    pub fn elapsed(&self) -> f64 {
        self.0[0]
    }

    pub fn prey(&self) -> (f64, f64) {
        (self.0[1], self.0[2])
    }

    pub fn predator(&self) -> (f64, f64) {
        (self.0[3], self.0[4])
    }

    pub fn as_array(&self) -> [f64; 5] {
        self.0
    }
}

impl TryFrom<Vec<f64>> for GameState {
    type Error = usize;

    /// Fails with the offending length when the vector is not exactly 5 long
    fn try_from(values: Vec<f64>) -> Result<Self, Self::Error> {
        let len = values.len();
        <[f64; 5]>::try_from(values).map(Self).map_err(|_| len)
    }
}

/// Result of a finished episode from the human's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won,
    Lost,
}

impl Outcome {
    /// Reads the human's reward; a positive reward is a win
    pub fn from_rewards(role: Role, rewards: &[f64]) -> Self {
        match rewards.get(role.reward_index()) {
            Some(reward) if *reward > 0.0 => Outcome::Won,
            _ => Outcome::Lost,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Outcome::Won => "You won!",
            Outcome::Lost => "You lost...",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_requires_five_values() {
        assert!(GameState::try_from(vec![0.0, 0.1, 0.2, 0.3, 0.4]).is_ok());
        assert_eq!(GameState::try_from(vec![0.0, 0.1]), Err(2));
        assert_eq!(GameState::try_from(vec![0.0; 6]), Err(6));
    }

    #[test]
    fn state_serializes_as_array() {
        let state = GameState::new([0.5, 0.1, 0.2, 0.3, 0.4]);
        assert_eq!(
            serde_json::to_string(&state).unwrap(),
            "[0.5,0.1,0.2,0.3,0.4]"
        );
    }

    #[test]
    fn outcome_follows_role_reward() {
        assert_eq!(Outcome::from_rewards(Role::Prey, &[1.0, -1.0]), Outcome::Won);
        assert_eq!(Outcome::from_rewards(Role::Predator, &[1.0, -1.0]), Outcome::Lost);
        assert_eq!(Outcome::from_rewards(Role::Predator, &[-1.0, 1.0]), Outcome::Won);
        assert_eq!(Outcome::from_rewards(Role::Prey, &[-1.0, 1.0]), Outcome::Lost);
        assert_eq!(Outcome::from_rewards(Role::Predator, &[1.0]), Outcome::Lost);
    }

    #[test]
    fn role_parsing_and_toggle() {
        assert_eq!("Prey".parse::<Role>(), Ok(Role::Prey));
        assert_eq!(Role::Prey.toggled(), Role::Predator);
        assert_eq!(serde_json::to_string(&Role::Predator).unwrap(), "\"predator\"");
        assert_eq!(serde_json::to_string(&InputMethod::Joystick).unwrap(), "\"joystick\"");
    }
}
