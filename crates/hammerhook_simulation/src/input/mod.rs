//! Input domain - edge events + continuous vectors от хоста
//!
//! Raw device binding вне симуляции: хост переводит клавиши/мышь в `PlayerInput`.

use bevy::prelude::*;

use crate::SimulationSet;

pub mod events;
pub mod systems;

pub use events::*;
pub use systems::{apply_look, process_player_input, MAX_PITCH_DEGREES};

/// Input plugin
pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<PlayerInput>()
            .add_event::<NewGameRequested>()
            .add_systems(
                FixedUpdate,
                process_player_input.in_set(SimulationSet::Input),
            );
    }
}
