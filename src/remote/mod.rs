//! HTTP client for the simulation service

pub mod client;
pub mod protocol;

pub use client::{ClientError, SimClient};
pub use protocol::{PlayRequest, PlayResponse, RenderedFrame};
