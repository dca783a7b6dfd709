//! Equipment module - hammer (charge weapon) + rod (grapple)
//!
//! # Architecture
//!
//! **Events → Systems flow:**
//! - Input пишет `ChargeTrigger` / `GrappleTrigger`
//! - Equipment системы меняют `ChargeWeapon` / `Grapple` на персонаже
//! - Реакция мира уходит событиями в `SimulationSet::Interactions`
//!
//! **Hammer lifecycle:**
//! - Press → заряд (если cooldown истёк)
//! - Tick → stage по таблице порогов
//! - Release → `HammerStrike` (если поверхность в досягаемости) + cooldown
//! - Каждый тик → подсветка attackable в радиусе атаки
//!
//! **Rod lifecycle:**
//! - Press → якорь летит по взгляду
//! - Попадание → Attached, `GrappleHooked` для hookable
//! - Attached → сила троса каждый тик
//! - Release / смерть / wall-run → Retract, `GrappleReleased` для hookable
//!
//! Все силы идут через `MovementState::apply_force` и видны движению
//! со следующего тика.

use std::marker::PhantomData;

use bevy::prelude::*;

use crate::collision::CollisionBackend;
use crate::SimulationSet;

pub mod events;
pub mod grapple;
pub mod hammer;

// Re-exports
pub use events::*;
pub use grapple::{grapple_pull, AnchorParent, Grapple, GrappleAnchor, GrappleMode};
pub use hammer::{charge_stage_index, strike_force, ChargePhase, ChargeWeapon};

/// Equipment plugin (hammer + rod)
pub struct EquipmentPlugin<B: CollisionBackend> {
    _backend: PhantomData<B>,
}

impl<B: CollisionBackend> Default for EquipmentPlugin<B> {
    fn default() -> Self {
        Self {
            _backend: PhantomData,
        }
    }
}

impl<B: CollisionBackend> Plugin for EquipmentPlugin<B> {
    fn build(&self, app: &mut App) {
        app
            // Events
            .add_event::<ChargeTrigger>()
            .add_event::<GrappleTrigger>()
            .add_event::<HammerStrike>()
            .add_event::<ChargeStageChanged>()
            .add_event::<AttackHighlightChanged>()
            .add_event::<GrappleHooked>()
            .add_event::<GrappleReleased>()
            .register_type::<ChargeWeapon>()
            .register_type::<Grapple>()
            // Systems (порядок внутри тика фиксирован)
            .add_systems(
                FixedUpdate,
                (
                    hammer::clear_charge_on_death,
                    hammer::process_charge_triggers::<B>,
                    hammer::tick_charge,
                    hammer::track_attack_highlight::<B>,
                    grapple::process_grapple_triggers,
                    grapple::tick_grapple::<B>,
                )
                    .chain()
                    .in_set(SimulationSet::Equipment),
            );
    }
}
