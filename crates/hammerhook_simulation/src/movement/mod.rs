//! Movement domain - Movement Controller персонажа
//!
//! Содержит:
//! - MovementState / CharacterInput / SpawnPoint (components)
//! - режимы Ground / Air / WallRun (modes, чистые функции)
//! - probes: ground, wall, look surface, attack raycast
//! - tick_movement (FixedUpdate, `SimulationSet::Movement`)
//! - PlayerDied / GrappleReleaseRequested (events)
//!
//! Силы от экипировки и interactables копятся в `MovementState::pending_force`
//! и видны движению только со следующего тика.

use std::marker::PhantomData;

use bevy::prelude::*;

use crate::collision::CollisionBackend;
use crate::SimulationSet;

pub mod components;
pub mod events;
pub mod modes;
pub mod probes;
pub mod systems;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod systems_tests;

pub use components::*;
pub use events::*;
pub use probes::{attackable_raycast, ground_check, look_surface, wall_probe};
pub use systems::{step_character, tick_movement, TickOutcome};

/// Movement plugin
pub struct MovementPlugin<B: CollisionBackend> {
    _backend: PhantomData<B>,
}

impl<B: CollisionBackend> Default for MovementPlugin<B> {
    fn default() -> Self {
        Self {
            _backend: PhantomData,
        }
    }
}

impl<B: CollisionBackend> Plugin for MovementPlugin<B> {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerDied>()
            .add_event::<GrappleReleaseRequested>()
            .register_type::<MovementState>()
            .register_type::<CharacterInput>()
            .register_type::<SpawnPoint>()
            .add_systems(
                FixedUpdate,
                tick_movement::<B>.in_set(SimulationSet::Movement),
            );
    }
}
