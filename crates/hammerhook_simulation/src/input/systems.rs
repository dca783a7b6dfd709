//! Input systems - PlayerInput → состояние персонажа + triggers экипировки

use bevy::prelude::*;

use super::{InputAction, NewGameRequested, PlayerInput};
use crate::config::SimulationConfig;
use crate::equipment::{ChargeTrigger, GrappleTrigger};
use crate::movement::{wish_direction, CharacterInput, MovementState, SpawnPoint};

/// Ограничение наклона камеры (градусы)
pub const MAX_PITCH_DEGREES: f32 = 85.0;

/// Применяет look delta: yaw влево/вправо, pitch с clamp ±85°
pub fn apply_look(state: &mut MovementState, delta: Vec2, sensitivity: Vec2) {
    let max_pitch = MAX_PITCH_DEGREES.to_radians();

    state.yaw -= delta.x * sensitivity.x;
    state.pitch = (state.pitch + delta.y * sensitivity.y).clamp(-max_pitch, max_pitch);
}

/// System: разбор input событий
///
/// Move/Look обновляют wish direction сразу, прыжок взводит latch,
/// Attack/Grapple уходят в экипировку, Restart/NewGame - в респавн.
pub fn process_player_input(
    mut input_events: EventReader<PlayerInput>,
    config: Res<SimulationConfig>,
    mut characters: Query<(
        &mut Transform,
        &mut MovementState,
        &mut CharacterInput,
        &mut SpawnPoint,
    )>,
    mut charge_triggers: EventWriter<ChargeTrigger>,
    mut grapple_triggers: EventWriter<GrappleTrigger>,
    mut new_game_events: EventWriter<NewGameRequested>,
) {
    for event in input_events.read() {
        let Ok((mut transform, mut state, mut input, mut spawn)) = characters.get_mut(event.entity) else {
            crate::logger::log_warning(&format!(
                "⚠️ PlayerInput for missing character {:?}",
                event.entity
            ));
            continue;
        };

        match event.action {
            InputAction::Move(axis) => {
                input.move_axis = axis;
                state.wish_dir = wish_direction(axis, state.yaw);
            }
            InputAction::Look(delta) => {
                apply_look(&mut state, delta, config.gameplay.look_sensitivity);
                state.wish_dir = wish_direction(input.move_axis, state.yaw);
                transform.rotation = state.rotation();
            }
            InputAction::Jump { pressed } => {
                input.jump_held = pressed;
                if pressed {
                    input.jumped_this_input = false;
                }
            }
            InputAction::Attack { pressed } => {
                charge_triggers.write(ChargeTrigger {
                    entity: event.entity,
                    pressed,
                });
            }
            InputAction::Grapple { pressed } => {
                grapple_triggers.write(GrappleTrigger {
                    entity: event.entity,
                    pressed,
                });
            }
            InputAction::Restart => {
                state.respawn_requested = true;
            }
            InputAction::NewGame => {
                spawn.reset_to_initial();
                state.respawn_requested = true;
                new_game_events.write(NewGameRequested {
                    entity: event.entity,
                });

                crate::logger::log_info(&format!("🔄 New game requested by {:?}", event.entity));
            }
        }
    }
}
