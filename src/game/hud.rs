//! Heads-up display model: status line, timer, toasts, countdown, name modal

use tokio::time::Instant;

use crate::input::KnobOffset;
use crate::util::time::{remaining_secs, TOAST_DURATION, URGENT_SECS};

use super::{InputMethod, Role};

/// Episode timer readout
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerDisplay {
    pub remaining_secs: f64,
    /// Shown in red
    pub urgent: bool,
}

impl TimerDisplay {
    pub fn from_sim_time(sim_time: f64) -> Self {
        let remaining_secs = remaining_secs(sim_time);
        Self {
            remaining_secs,
            urgent: remaining_secs <= URGENT_SECS,
        }
    }

    pub fn text(&self) -> String {
        format!("Time left: {:.0}s", self.remaining_secs)
    }
}

/// One step of the pre-episode countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    Count(u8),
    Go,
}

impl CountdownStep {
    pub const FIRST: CountdownStep = CountdownStep::Count(3);

    /// Following step, `None` once "GO!" has been shown
    pub fn next(self) -> Option<Self> {
        match self {
            CountdownStep::Count(n) if n > 1 => Some(CountdownStep::Count(n - 1)),
            CountdownStep::Count(_) => Some(CountdownStep::Go),
            CountdownStep::Go => None,
        }
    }

    pub fn label(self) -> String {
        match self {
            CountdownStep::Count(n) => n.to_string(),
            CountdownStep::Go => "GO!".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub message: String,
    pub expires_at: Instant,
}

/// Name entry dialog
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NameModal {
    pub input: String,
    /// Validation message from the last rejected submit
    pub alert: Option<String>,
}

/// Everything the host shows around the canvas
#[derive(Debug, Clone)]
pub struct Hud {
    pub role: Role,
    pub input_method: InputMethod,
    pub player_name: Option<String>,
    pub status: String,
    pub timer: Option<TimerDisplay>,
    pub toasts: Vec<Toast>,
    pub countdown: Option<CountdownStep>,
    pub name_modal: Option<NameModal>,
    pub splash: bool,
    pub knob: KnobOffset,
}

impl Hud {
    pub fn new(role: Role, input_method: InputMethod) -> Self {
        Self {
            role,
            input_method,
            player_name: None,
            status: String::new(),
            timer: None,
            toasts: Vec::new(),
            countdown: None,
            name_modal: None,
            splash: true,
            knob: KnobOffset::default(),
        }
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = message.into();
    }

    pub fn toast(&mut self, message: impl Into<String>, now: Instant) {
        self.toasts.push(Toast {
            message: message.into(),
            expires_at: now + TOAST_DURATION,
        });
    }

    /// Drop toasts whose display time is over
    pub fn expire_toasts(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires_at > now);
    }

    pub fn update_timer(&mut self, sim_time: f64) {
        self.timer = Some(TimerDisplay::from_sim_time(sim_time));
    }

    pub fn title(&self) -> String {
        match &self.player_name {
            Some(name) => format!("Prey-Predator Game - {name}"),
            None => "Prey-Predator Game".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn countdown_runs_three_to_go() {
        let mut steps = vec![CountdownStep::FIRST];
        while let Some(next) = steps.last().and_then(|s| s.next()) {
            steps.push(next);
        }
        let labels: Vec<String> = steps.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["3", "2", "1", "GO!"]);
    }

    #[test]
    fn timer_turns_urgent() {
        let timer = TimerDisplay::from_sim_time(0.0);
        assert_eq!(timer.text(), "Time left: 20s");
        assert!(!timer.urgent);

        let timer = TimerDisplay::from_sim_time(1.6);
        assert!(timer.urgent);
        assert_eq!(timer.text(), "Time left: 4s");
    }

    #[test]
    fn toasts_expire_after_three_seconds() {
        let now = Instant::now();
        let mut hud = Hud::new(Role::Prey, InputMethod::Keyboard);
        hud.toast("Game reset!", now);
        hud.expire_toasts(now + Duration::from_millis(2999));
        assert_eq!(hud.toasts.len(), 1);
        hud.expire_toasts(now + Duration::from_millis(3000));
        assert!(hud.toasts.is_empty());
    }
}
