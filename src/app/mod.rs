//! Process-wide wiring

mod state;

pub use state::AppState;
