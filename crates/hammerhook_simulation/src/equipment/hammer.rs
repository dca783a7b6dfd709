//! Hammer - charge weapon
//!
//! Press начинает заряд (если cooldown истёк), каждый тик заряд растёт и
//! пересчитывается stage по таблице `(threshold, force)`. Release бьёт по
//! поверхности под прицелом: attackable может переопределить силу, иначе
//! персонажа отбрасывает от поверхности с силой stage'а.
//!
//! Отдельно каждый тик ищем attackable в радиусе атаки (подсветка для HUD).

use bevy::ecs::system::StaticSystemParam;
use bevy::prelude::*;

use super::{AttackHighlightChanged, ChargeStageChanged, ChargeTrigger, HammerStrike};
use crate::collision::CollisionBackend;
use crate::config::{ChargeStage, HammerConfig, SimulationConfig};
use crate::interactables::Attackable;
use crate::movement::{attackable_raycast, look_surface, MovementState, PlayerDied};

/// Фаза молота (производная от `ChargeWeapon`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargePhase {
    Idle,
    Charging { stage: usize },
    Cooldown,
}

/// Charge weapon на персонаже
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct ChargeWeapon {
    /// Сколько держим заряд (секунды)
    pub charge_time: f32,
    pub stage: usize,
    /// > 0 - нельзя начать новый заряд
    pub cooldown: f32,
    pub charging: bool,
    /// Attackable в радиусе атаки (None - нечего подсвечивать)
    pub highlighted: Option<Entity>,
}

impl ChargeWeapon {
    pub fn phase(&self) -> ChargePhase {
        if self.charging {
            ChargePhase::Charging { stage: self.stage }
        } else if self.cooldown > 0.0 {
            ChargePhase::Cooldown
        } else {
            ChargePhase::Idle
        }
    }

    /// StartCharge. Возвращает false, если cooldown ещё идёт.
    pub fn start_charge(&mut self) -> bool {
        if self.cooldown > 0.0 {
            return false;
        }

        self.charge_time = 0.0;
        self.stage = 0;
        self.charging = true;
        true
    }

    /// ReleaseCharge: stage на момент отпускания (None - не заряжали).
    /// Cooldown стартует независимо от того, попали или нет.
    pub fn release(&mut self, cooldown_time: f32) -> Option<usize> {
        if !self.charging {
            return None;
        }

        let stage = self.stage;
        self.charging = false;
        self.stage = 0;
        self.cooldown = cooldown_time;
        Some(stage)
    }

    /// Один тик. Возвращает true, если stage изменился.
    pub fn advance(&mut self, dt: f32, stages: &[ChargeStage]) -> bool {
        let mut changed = false;

        if self.charging {
            self.charge_time += dt;
            let stage = charge_stage_index(stages, self.charge_time);
            changed = stage != self.stage;
            self.stage = stage;
        }

        self.cooldown -= dt;
        changed
    }

    /// Сброс при смерти персонажа (cooldown не трогаем)
    pub fn clear(&mut self) {
        self.charge_time = 0.0;
        self.stage = 0;
        self.charging = false;
    }
}

/// Старший stage, чей threshold ≤ elapsed (нет такого → 0)
pub fn charge_stage_index(stages: &[ChargeStage], elapsed: f32) -> usize {
    stages
        .iter()
        .rposition(|stage| elapsed >= stage.threshold)
        .unwrap_or(0)
}

/// Default launch сила удара, если поверхность в досягаемости
///
/// Досягаемость учитывает сближение: `distance − max(dot(look, velocity), 0) ≤ max_distance`.
pub fn strike_force(
    look: Vec3,
    velocity: Vec3,
    hit_distance: f32,
    stage: usize,
    config: &HammerConfig,
) -> Option<Vec3> {
    let closing = look.dot(velocity).max(0.0);
    if hit_distance - closing > config.max_distance {
        return None;
    }

    let multiplier = config
        .charge_stages
        .get(stage)
        .or(config.charge_stages.last())
        .map_or(0.0, |s| s.force);

    Some((-look + config.launch_bias).normalize_or_zero() * multiplier)
}

// ============================================================================
// Systems
// ============================================================================

/// System: смерть персонажа сбрасывает заряд
pub fn clear_charge_on_death(
    mut died_events: EventReader<PlayerDied>,
    mut weapons: Query<&mut ChargeWeapon>,
    mut stage_events: EventWriter<ChargeStageChanged>,
) {
    for event in died_events.read() {
        let Ok(mut weapon) = weapons.get_mut(event.entity) else {
            continue;
        };

        weapon.clear();
        stage_events.write(ChargeStageChanged {
            entity: event.entity,
            charging: false,
            stage: 0,
        });
    }
}

/// System: press/release молота
pub fn process_charge_triggers<B: CollisionBackend>(
    collision: StaticSystemParam<B::Param>,
    config: Res<SimulationConfig>,
    mut triggers: EventReader<ChargeTrigger>,
    mut weapons: Query<(&Transform, &MovementState, &mut ChargeWeapon)>,
    attackables: Query<(), With<Attackable>>,
    mut strikes: EventWriter<HammerStrike>,
    mut stage_events: EventWriter<ChargeStageChanged>,
) {
    let triggers: Vec<ChargeTrigger> = triggers.read().copied().collect();
    if triggers.is_empty() {
        return;
    }

    B::with_world(&*collision, |world| {
        for trigger in triggers {
            let Ok((transform, state, mut weapon)) = weapons.get_mut(trigger.entity) else {
                continue;
            };

            if trigger.pressed {
                if weapon.start_charge() {
                    stage_events.write(ChargeStageChanged {
                        entity: trigger.entity,
                        charging: true,
                        stage: 0,
                    });
                }
                continue;
            }

            let Some(stage) = weapon.release(config.hammer.cooldown_time) else {
                continue;
            };
            stage_events.write(ChargeStageChanged {
                entity: trigger.entity,
                charging: false,
                stage: 0,
            });

            let Some(hit) = look_surface(
                world,
                &config.gameplay.character,
                transform.translation,
                state,
                config.masks.attackable,
                trigger.entity,
            ) else {
                continue;
            };

            let Some(default_force) =
                strike_force(state.look_vector(), state.velocity(), hit.distance, stage, &config.hammer)
            else {
                continue;
            };

            let target = attackables.contains(hit.entity).then_some(hit.entity);
            strikes.write(HammerStrike {
                character: trigger.entity,
                target,
                stage,
                default_force,
            });

            crate::logger::log(&format!(
                "🔨 Hammer strike: {:?} stage={} target={:?} dist={:.2}",
                trigger.entity, stage, target, hit.distance
            ));
        }
    });
}

/// System: заряд + cooldown
pub fn tick_charge(
    config: Res<SimulationConfig>,
    fixed: Res<Time<Fixed>>,
    mut weapons: Query<(Entity, &mut ChargeWeapon)>,
    mut stage_events: EventWriter<ChargeStageChanged>,
) {
    let dt = fixed.timestep().as_secs_f32();

    for (entity, mut weapon) in weapons.iter_mut() {
        if weapon.advance(dt, &config.hammer.charge_stages) {
            stage_events.write(ChargeStageChanged {
                entity,
                charging: weapon.charging,
                stage: weapon.stage,
            });
        }
    }
}

/// System: подсветка attackable в радиусе атаки
///
/// Луч `attack_range + |velocity|·dt` по взгляду (+ обратный от дальнего конца).
/// Событие только при смене цели.
pub fn track_attack_highlight<B: CollisionBackend>(
    collision: StaticSystemParam<B::Param>,
    config: Res<SimulationConfig>,
    fixed: Res<Time<Fixed>>,
    mut weapons: Query<(Entity, &Transform, &MovementState, &mut ChargeWeapon)>,
    attackables: Query<(), With<Attackable>>,
    mut highlight_events: EventWriter<AttackHighlightChanged>,
) {
    let dt = fixed.timestep().as_secs_f32();

    B::with_world(&*collision, |world| {
        for (entity, transform, state, mut weapon) in weapons.iter_mut() {
            let target = attackable_raycast(
                world,
                &config.gameplay.character,
                transform.translation,
                state,
                config.movement.attack_range,
                dt,
                config.masks.attackable,
                entity,
            )
            .map(|hit| hit.entity)
            .filter(|hit| attackables.contains(*hit));

            if weapon.highlighted != target {
                weapon.highlighted = target;
                highlight_events.write(AttackHighlightChanged { entity, target });
            }
        }
    });
}
