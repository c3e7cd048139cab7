//! Input capture: keyboard arrows and the virtual joystick
//!
//! Neither source talks to the network. They only turn raw events into an
//! action angle that the session picks up.

pub mod joystick;
pub mod keyboard;

pub use joystick::{Joystick, KnobOffset};
pub use keyboard::{ArrowKey, KeyboardState};

/// Human-commanded direction in radians, in (-π, π]
pub type ActionAngle = f64;
