//! Attackable - реакция объекта на удар молотом
//!
//! `on_attacked` может вернуть ненулевую силу, которая заменяет default
//! launch молота. Ноль - "использовать default".

use bevy::prelude::*;

use crate::collision::Presence;
use crate::config::ConfigError;
use crate::equipment::HammerStrike;
use crate::movement::{MovementState, PlayerDied};

/// Толчок вверх при разрушении breakable
pub const BREAK_NUDGE: Vec3 = Vec3::Y;

/// Сколько launch pad держит гравитацию выключенной (секунды)
pub const LAUNCH_PAD_GRAVITY_DISABLE_TIME: f32 = 0.25;

/// Ломается от удара не слабее `required_level`, восстанавливается при смерти персонажа
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct Breakable {
    pub required_level: usize,
    pub home_position: Vec3,
    pub broken: bool,
}

/// Запускает персонажа по взгляду с силой stage'а
#[derive(Debug, Clone, PartialEq, Reflect)]
pub struct LaunchPad {
    /// Сила по stage'ам (stage за пределами таблицы → последняя)
    pub stage_power: Vec<f32>,
    pub gravity_disable_time: f32,
}

impl LaunchPad {
    pub fn new(stage_power: Vec<f32>) -> Result<Self, ConfigError> {
        if stage_power.is_empty() {
            return Err(ConfigError::EmptyPowerTable);
        }

        Ok(Self {
            stage_power,
            gravity_disable_time: LAUNCH_PAD_GRAVITY_DISABLE_TIME,
        })
    }

    pub fn with_gravity_disable_time(mut self, seconds: f32) -> Self {
        self.gravity_disable_time = seconds;
        self
    }

    pub fn power(&self, stage: usize) -> f32 {
        let last = self.stage_power.len().saturating_sub(1);
        self.stage_power.get(stage.min(last)).copied().unwrap_or(0.0)
    }
}

/// Attackable capability (закрытый набор вариантов)
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
#[require(Transform, Presence)]
pub enum Attackable {
    Breakable(Breakable),
    LaunchPad(LaunchPad),
}

impl Attackable {
    pub fn breakable(required_level: usize, home_position: Vec3) -> Self {
        Self::Breakable(Breakable {
            required_level,
            home_position,
            broken: false,
        })
    }

    pub fn launch_pad(stage_power: Vec<f32>) -> Result<Self, ConfigError> {
        LaunchPad::new(stage_power).map(Self::LaunchPad)
    }

    /// OnAttacked: ненулевой результат переопределяет силу молота
    pub fn on_attacked(
        &mut self,
        character: &mut MovementState,
        presence: &mut Presence,
        stage: usize,
    ) -> Vec3 {
        match self {
            Attackable::Breakable(breakable) => {
                if stage < breakable.required_level {
                    return Vec3::ZERO;
                }

                breakable.broken = true;
                presence.disable();
                BREAK_NUDGE
            }
            Attackable::LaunchPad(pad) => {
                character.disable_gravity_for_seconds(pad.gravity_disable_time);
                character.look_vector() * pad.power(stage)
            }
        }
    }
}

impl Breakable {
    /// Возврат на место: позиция, коллизия, видимость
    pub fn restore(&mut self, presence: &mut Presence, transform: &mut Transform) {
        self.broken = false;
        presence.enable();
        transform.translation = self.home_position;
    }
}

// ============================================================================
// Systems
// ============================================================================

/// System: удар молота → override или default сила
pub fn resolve_hammer_strikes(
    mut strikes: EventReader<HammerStrike>,
    mut characters: Query<&mut MovementState>,
    mut attackables: Query<(&mut Attackable, &mut Presence)>,
) {
    for strike in strikes.read() {
        let Ok(mut state) = characters.get_mut(strike.character) else {
            continue;
        };

        let mut force_override = Vec3::ZERO;
        if let Some(target) = strike.target {
            match attackables.get_mut(target) {
                Ok((mut attackable, mut presence)) => {
                    force_override = attackable.on_attacked(&mut state, &mut presence, strike.stage);
                }
                Err(_) => {
                    crate::logger::log_warning(&format!(
                        "⚠️ HammerStrike target {:?} is not attackable anymore",
                        target
                    ));
                }
            }
        }

        let force = if force_override != Vec3::ZERO {
            force_override
        } else {
            strike.default_force
        };

        state.apply_force(force, true);
        state.force_wall_run_cooldown();

        crate::logger::log(&format!(
            "💥 Strike resolved: {:?} force={:?} overridden={}",
            strike.character,
            force,
            force_override != Vec3::ZERO
        ));
    }
}

/// System: смерть персонажа восстанавливает все breakable
pub fn restore_breakables_on_death(
    mut died_events: EventReader<PlayerDied>,
    mut attackables: Query<(Entity, &mut Attackable, &mut Presence, &mut Transform)>,
) {
    if died_events.read().count() == 0 {
        return;
    }

    for (entity, mut attackable, mut presence, mut transform) in attackables.iter_mut() {
        let Attackable::Breakable(breakable) = &mut *attackable else {
            continue;
        };

        if breakable.broken {
            crate::logger::log(&format!("🧩 Breakable restored: {:?}", entity));
        }
        breakable.restore(&mut presence, &mut transform);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breakable_respects_required_level() {
        let mut character = MovementState::new(1, 0.0);
        let mut presence = Presence::default();
        let mut attackable = Attackable::breakable(2, Vec3::new(1.0, 2.0, 3.0));

        let force = attackable.on_attacked(&mut character, &mut presence, 1);
        assert_eq!(force, Vec3::ZERO);
        assert!(presence.is_enabled());

        let force = attackable.on_attacked(&mut character, &mut presence, 2);
        assert_eq!(force, Vec3::new(0.0, 1.0, 0.0));
        assert!(!presence.collidable);
        assert!(!presence.visible);
    }

    #[test]
    fn test_breakable_restore_returns_home() {
        let mut presence = Presence::default();
        let mut transform = Transform::from_xyz(9.0, 9.0, 9.0);
        let mut breakable = Breakable {
            required_level: 0,
            home_position: Vec3::new(1.0, 0.0, 1.0),
            broken: true,
        };
        presence.disable();

        breakable.restore(&mut presence, &mut transform);

        assert!(!breakable.broken);
        assert!(presence.is_enabled());
        assert_eq!(transform.translation, Vec3::new(1.0, 0.0, 1.0));
    }

    #[test]
    fn test_launch_pad_uses_look_and_clamps_stage() {
        let mut character = MovementState::new(1, 0.0);
        let mut presence = Presence::default();
        let mut pad = Attackable::launch_pad(vec![10.0, 20.0]).expect("non-empty table");

        let force = pad.on_attacked(&mut character, &mut presence, 0);
        assert!((force - Vec3::NEG_Z * 10.0).length() < 1e-5);
        assert!(character.is_gravity_disabled());
        assert!((character.gravity_disable_timer - LAUNCH_PAD_GRAVITY_DISABLE_TIME).abs() < 1e-6);

        let force = pad.on_attacked(&mut character, &mut presence, 5);
        assert!((force.length() - 20.0).abs() < 1e-4);
        assert!(presence.is_enabled());
    }

    #[test]
    fn test_launch_pad_rejects_empty_table() {
        assert!(matches!(
            Attackable::launch_pad(Vec::new()),
            Err(ConfigError::EmptyPowerTable)
        ));
    }
}
