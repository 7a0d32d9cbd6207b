//! Tick-driven simulation loop.
//!
//! [`SimulationEngine`] owns the physical models and advances a
//! [`GameState`](crate::state::GameState) one hand sample at a time.
//! [`SimulationSession`] wraps it with rule rate limiting, the coaching
//! log and reset handling.

mod engine;
mod session;

pub use engine::{SimulationEngine, TickInput, TickReport, TICK_RATE_HZ};
pub use session::{CoachingMessage, MessageSource, SessionTick, SimulationSession};
