//! Rain Bucket - catch falling raindrops before they hit the ground
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bucket, droplets, spawning, collision)
//! - `renderer`: WebGPU sprite rendering
//! - `assets`: Embedded sprite images
//! - `audio`: Web Audio sound effects and looping rain ambience
//! - `settings`: Volume/mute preferences

pub mod assets;
#[cfg(target_arch = "wasm32")]
pub mod audio;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Droplet fall speed in world units (pixels) per second
    pub const FALL_SPEED: f32 = 200.0;
    /// Seconds between automatic droplet spawns
    pub const SPAWN_INTERVAL: f32 = 1.0;
    /// Distance from the bottom screen edge to the bucket's bottom edge
    pub const BUCKET_BOTTOM_OFFSET: f32 = 20.0;
    /// Frame delta clamp, protects against tab-switch time jumps
    pub const MAX_FRAME_DT: f32 = 0.1;
}
