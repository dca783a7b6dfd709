//! Hookable - реакция объекта на якорь grapple
//!
//! - `on_hooked` - side effects (mover едет, charger начинает копить заряд)
//! - `on_released` - launch сила (ноль = без толчка)

use bevy::prelude::*;

use crate::collision::Presence;
use crate::equipment::{Grapple, GrappleAnchor, GrappleHooked, GrappleReleased};
use crate::movement::MovementState;

/// Вертикальная добавка к направлению броска swing charger'а
pub const SWING_UPWARD_BIAS: f32 = 0.25;

/// Пока за него держатся, едет к `start + hooked_offset`, потом обратно
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct HookMover {
    pub start_position: Vec3,
    pub hooked_offset: Vec3,
    /// m/s
    pub speed: f32,
    pub target: Vec3,
}

impl HookMover {
    pub fn hooked_position(&self) -> Vec3 {
        self.start_position + self.hooked_offset
    }

    /// Следующая позиция: не дальше `speed·dt` к цели
    pub fn advance(&self, position: Vec3, dt: f32) -> Vec3 {
        let to_target = self.target - position;
        let max_step = self.speed * dt;
        let distance = to_target.length();

        if distance <= max_step || distance <= f32::EPSILON {
            self.target
        } else {
            position + to_target / distance * max_step
        }
    }
}

/// Копит заряд от раскачки, на release бросает персонажа
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct SwingCharger {
    pub power: f32,
    pub max_charge: f32,
    pub charge: f32,
    pub hooked_by: Option<Entity>,
}

impl SwingCharger {
    /// Заряд растёт, когда персонаж движется/жмёт от якоря
    pub fn accumulate(&mut self, own_position: Vec3, character_position: Vec3, velocity: Vec3, wish: Vec3) {
        let outward = (character_position - own_position).normalize_or_zero();
        let delta = outward.dot(velocity + wish);
        self.charge = (self.charge + delta).clamp(0.0, self.max_charge);
    }

    pub fn launch(&mut self, character_position: Vec3, anchor: Vec3) -> Vec3 {
        let away = (character_position - anchor).normalize_or_zero();
        let force = self.power * self.charge * (away + Vec3::Y * SWING_UPWARD_BIAS);
        self.charge = 0.0;
        force
    }
}

/// Hookable capability (закрытый набор вариантов)
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
#[require(Transform, Presence)]
pub enum Hookable {
    Mover(HookMover),
    SwingCharger(SwingCharger),
}

impl Hookable {
    pub fn mover(start_position: Vec3, hooked_offset: Vec3, speed: f32) -> Self {
        Self::Mover(HookMover {
            start_position,
            hooked_offset,
            speed,
            target: start_position,
        })
    }

    pub fn swing_charger(power: f32, max_charge: f32) -> Self {
        Self::SwingCharger(SwingCharger {
            power,
            max_charge,
            charge: 0.0,
            hooked_by: None,
        })
    }

    /// OnHooked: mover забирает якорь себе и едет к hooked позиции
    pub fn on_hooked(
        &mut self,
        owner: Entity,
        own_position: Vec3,
        character: Entity,
        anchor: &mut GrappleAnchor,
    ) {
        match self {
            Hookable::Mover(mover) => {
                mover.target = mover.hooked_position();
                anchor.attach_to(owner, own_position);
            }
            Hookable::SwingCharger(charger) => {
                charger.hooked_by = Some(character);
                charger.charge = 0.0;
            }
        }
    }

    /// OnReleased: launch сила (ноль - без толчка)
    pub fn on_released(&mut self, character_position: Vec3, anchor: Vec3) -> Vec3 {
        match self {
            Hookable::Mover(mover) => {
                mover.target = mover.start_position;
                Vec3::ZERO
            }
            Hookable::SwingCharger(charger) => {
                charger.hooked_by = None;
                charger.launch(character_position, anchor)
            }
        }
    }
}

// ============================================================================
// Systems
// ============================================================================

/// System: OnHooked notifications
pub fn resolve_grapple_hooks(
    mut hooked_events: EventReader<GrappleHooked>,
    mut grapples: Query<&mut Grapple>,
    mut hookables: Query<(&Transform, &mut Hookable)>,
) {
    for event in hooked_events.read() {
        let Ok(mut grapple) = grapples.get_mut(event.character) else {
            continue;
        };
        if grapple.hooked != Some(event.target) {
            continue;
        }

        let Ok((transform, mut hookable)) = hookables.get_mut(event.target) else {
            crate::logger::log_warning(&format!("⚠️ Hooked entity {:?} missing", event.target));
            continue;
        };

        hookable.on_hooked(event.target, transform.translation, event.character, &mut grapple.anchor);
        crate::logger::log(&format!("🪝 Hooked: {:?} → {:?}", event.character, event.target));
    }
}

/// System: OnReleased notifications + launch сила
pub fn resolve_grapple_releases(
    mut released_events: EventReader<GrappleReleased>,
    mut characters: Query<(&Transform, &mut MovementState)>,
    mut hookables: Query<&mut Hookable>,
) {
    for event in released_events.read() {
        let Ok(mut hookable) = hookables.get_mut(event.target) else {
            crate::logger::log_warning(&format!("⚠️ Released entity {:?} missing", event.target));
            continue;
        };
        let Ok((transform, mut state)) = characters.get_mut(event.character) else {
            continue;
        };

        let force = hookable.on_released(transform.translation, event.anchor);
        if event.launch && force != Vec3::ZERO {
            state.apply_force(force, false);
        }

        crate::logger::log(&format!(
            "🪝 Released: {:?} from {:?} launch={:?}",
            event.character, event.target, force
        ));
    }
}

/// System: swing charger копит заряд, пока за него держатся
pub fn charge_swing_chargers(
    characters: Query<(&Transform, &MovementState)>,
    mut hookables: Query<(&Transform, &mut Hookable), Without<MovementState>>,
) {
    for (transform, mut hookable) in hookables.iter_mut() {
        let Hookable::SwingCharger(charger) = &mut *hookable else {
            continue;
        };
        let Some(character) = charger.hooked_by else {
            continue;
        };
        let Ok((character_transform, state)) = characters.get(character) else {
            continue;
        };

        charger.accumulate(
            transform.translation,
            character_transform.translation,
            state.velocity(),
            state.wish_dir(),
        );
    }
}

/// System: hook movers едут к своей цели
pub fn advance_hook_movers(
    fixed: Res<Time<Fixed>>,
    mut movers: Query<(&mut Transform, &Hookable), Without<MovementState>>,
) {
    let dt = fixed.timestep().as_secs_f32();

    for (mut transform, hookable) in movers.iter_mut() {
        let Hookable::Mover(mover) = hookable else {
            continue;
        };

        let next = mover.advance(transform.translation, dt);
        if next != transform.translation {
            transform.translation = next;
        }
    }
}
