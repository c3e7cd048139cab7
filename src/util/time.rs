//! Time utilities for the client loop

use std::time::Duration;

/// Display refresh the frame loop targets
pub const FRAME_RATE: u32 = 60;
/// Simulation step rate; play requests never exceed this
pub const ACTION_SEND_HZ: u32 = 30;

/// Seconds per countdown step
pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);
/// How long a toast stays on screen
pub const TOAST_DURATION: Duration = Duration::from_millis(3000);

/// Episode length shown on the timer, in seconds
pub const EPISODE_SECS: f64 = 20.0;
/// Real seconds per simulation time unit
pub const SIM_TIME_SCALE: f64 = 10.0;
/// Timer turns urgent at or below this many seconds
pub const URGENT_SECS: f64 = 5.0;

const NANOS_PER_SEC: u64 = 1_000_000_000;

/// Interval between animation frames, rounded up so that two frames always
/// cover one send interval
pub fn frame_interval() -> Duration {
    Duration::from_nanos(NANOS_PER_SEC.div_ceil(FRAME_RATE as u64))
}

/// Spacing of the play request schedule
pub fn send_interval() -> Duration {
    Duration::from_nanos(NANOS_PER_SEC / ACTION_SEND_HZ as u64)
}

/// Seconds left in the episode for a simulation timestamp
pub fn remaining_secs(sim_time: f64) -> f64 {
    (EPISODE_SECS - sim_time * SIM_TIME_SCALE).max(0.0)
}
