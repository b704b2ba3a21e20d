//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - No rendering or platform dependencies
//! - Events out, never side effects (audio is the host's job)

pub mod rect;
pub mod state;
pub mod tick;

pub use rect::Rect;
pub use state::{Droplet, GameEvent, GameState};
pub use tick::{TickInput, tick};
