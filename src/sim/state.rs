//! Game state and core simulation types

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::rect::Rect;
use crate::consts::*;

/// Events produced by a tick for the host to act on (fire-and-forget)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A droplet landed in the bucket; play the catch sound
    DropletCaught,
}

/// A falling raindrop
#[derive(Debug, Clone, Copy)]
pub struct Droplet {
    pub id: u32,
    pub rect: Rect,
}

/// Complete game state for one session
///
/// Owned by exactly one host loop; everything here is created at setup and
/// dropped together at teardown.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Screen size in world units
    pub screen: Vec2,
    /// Droplet sprite size, derived from the loaded image
    pub droplet_size: Vec2,
    /// The player's bucket; only x moves after setup
    pub bucket: Rect,
    /// Active droplets, insertion order
    pub droplets: Vec<Droplet>,
    /// Seconds since the last droplet spawn
    pub since_spawn: f32,
    /// Pending events, drained by the host each frame
    pub events: Vec<GameEvent>,
    rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a session: bucket centered near the bottom, one droplet spawned
    pub fn new(screen: Vec2, bucket_size: Vec2, droplet_size: Vec2, seed: u64) -> Self {
        let bucket = Rect::sized(
            screen.x / 2.0 - bucket_size.x / 2.0,
            BUCKET_BOTTOM_OFFSET,
            bucket_size,
        );

        let mut state = Self {
            seed,
            screen,
            droplet_size,
            bucket,
            droplets: Vec::new(),
            since_spawn: 0.0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };

        state.spawn_droplet();
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Append one droplet at a random x along the top edge and reset the
    /// spawn timer
    pub fn spawn_droplet(&mut self) {
        let max_x = (self.screen.x - self.droplet_size.x).max(0.0);
        let x = self.rng.random_range(0.0..=max_x);
        let id = self.next_entity_id();
        self.droplets.push(Droplet {
            id,
            rect: Rect::sized(x, self.screen.y, self.droplet_size),
        });
        self.since_spawn = 0.0;
    }

    /// Drain pending events for the host
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state(seed: u64) -> GameState {
        GameState::new(
            Vec2::new(480.0, 320.0),
            Vec2::new(64.0, 64.0),
            Vec2::new(32.0, 32.0),
            seed,
        )
    }

    #[test]
    fn test_setup_centers_bucket() {
        let state = test_state(1);
        assert_eq!(state.bucket.x, 208.0);
        assert_eq!(state.bucket.y, BUCKET_BOTTOM_OFFSET);
    }

    #[test]
    fn test_setup_spawns_one_droplet() {
        let state = test_state(1);
        assert_eq!(state.droplets.len(), 1);
        assert_eq!(state.droplets[0].rect.y, 320.0);
    }

    #[test]
    fn test_spawned_droplets_stay_within_screen() {
        let mut state = test_state(42);
        for _ in 0..200 {
            state.spawn_droplet();
        }
        let max_x = state.screen.x - state.droplet_size.x;
        for droplet in &state.droplets {
            assert!(droplet.rect.x >= 0.0 && droplet.rect.x <= max_x);
        }
    }

    #[test]
    fn test_same_seed_same_spawns() {
        let mut a = test_state(99999);
        let mut b = test_state(99999);
        for _ in 0..20 {
            a.spawn_droplet();
            b.spawn_droplet();
        }
        for (da, db) in a.droplets.iter().zip(&b.droplets) {
            assert_eq!(da.rect.x, db.rect.x);
        }
    }
}
