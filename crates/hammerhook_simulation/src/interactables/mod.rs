//! Interactables - объекты мира, реагирующие на экипировку
//!
//! Две независимые capability (закрытые enum'ы, dispatch через match):
//! - `Attackable`: Breakable, LaunchPad - реакция на удар молотом
//! - `Hookable`: Mover, SwingCharger - реакция на якорь grapple
//!
//! Системы работают в `SimulationSet::Interactions`, после экипировки.
//! Силы отсюда тоже идут через `apply_force` (видны со следующего тика).

use bevy::prelude::*;

use crate::SimulationSet;

pub mod attackable;
pub mod hookable;

pub use attackable::{
    Attackable, Breakable, LaunchPad, BREAK_NUDGE, LAUNCH_PAD_GRAVITY_DISABLE_TIME,
};
pub use hookable::{HookMover, Hookable, SwingCharger, SWING_UPWARD_BIAS};

/// Interactables plugin
pub struct InteractablesPlugin;

impl Plugin for InteractablesPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<Attackable>()
            .register_type::<Hookable>()
            .add_systems(
                FixedUpdate,
                (
                    attackable::resolve_hammer_strikes,
                    attackable::restore_breakables_on_death,
                    hookable::resolve_grapple_hooks,
                    hookable::resolve_grapple_releases,
                    hookable::charge_swing_chargers,
                    hookable::advance_hook_movers,
                )
                    .chain()
                    .in_set(SimulationSet::Interactions),
            );
    }
}
