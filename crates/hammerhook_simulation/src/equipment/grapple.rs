//! Grapple (rod) - якорь на тросе
//!
//! State machine: Retracted → Traveling (Use) → Attached (попали) → Retracted (Retract).
//! Traveling → Retracted, если якорь улетел дальше `max_distance` без попадания.
//!
//! Пока Attached, каждый тик тянем персонажа к якорю через `apply_force`
//! (без vertical override). Hookable объекты получают hooked/released
//! notifications через `GrappleHooked` / `GrappleReleased`.

use bevy::ecs::system::StaticSystemParam;
use bevy::prelude::*;

use super::{GrappleHooked, GrappleReleased, GrappleTrigger};
use crate::collision::CollisionBackend;
use crate::config::{GrappleConfig, SimulationConfig};
use crate::interactables::Hookable;
use crate::movement::modes::lateral;
use crate::movement::{GrappleReleaseRequested, MovementState, PlayerDied};

/// Попадание ниже этой глубины под персонажем выключает гравитацию (метры)
pub const LOW_HOOK_HEIGHT: f32 = 1.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum GrappleMode {
    #[default]
    Retracted,
    Traveling,
    Attached,
}

/// Привязка якоря к движущемуся объекту (hook mover)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct AnchorParent {
    pub entity: Entity,
    pub offset: Vec3,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Reflect)]
pub struct GrappleAnchor {
    pub position: Vec3,
    /// Some - якорь едет вместе с объектом
    pub parent: Option<AnchorParent>,
}

impl GrappleAnchor {
    pub fn attach_to(&mut self, entity: Entity, parent_position: Vec3) {
        self.parent = Some(AnchorParent {
            entity,
            offset: self.position - parent_position,
        });
    }

    pub fn detach(&mut self) {
        self.parent = None;
    }
}

/// Grapple на персонаже
///
/// `hooked` - слабая ссылка: entity может исчезнуть, тогда notifications пропускаются.
#[derive(Component, Debug, Clone, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Grapple {
    pub mode: GrappleMode,
    pub direction: Vec3,
    pub anchor: GrappleAnchor,
    pub hooked: Option<Entity>,
}

impl Grapple {
    pub fn is_retracted(&self) -> bool {
        self.mode == GrappleMode::Retracted
    }

    /// Use: бросок из глаз по взгляду. Уже брошенный - no-op.
    pub fn use_grapple(&mut self, eye: Vec3, look: Vec3) -> bool {
        if !self.is_retracted() {
            return false;
        }

        self.mode = GrappleMode::Traveling;
        self.direction = look.normalize_or_zero();
        self.anchor.position = eye;
        self.anchor.detach();
        true
    }

    pub fn attach(&mut self, point: Vec3, hooked: Option<Entity>) {
        self.mode = GrappleMode::Attached;
        self.anchor.position = point;
        self.hooked = hooked;
    }

    /// Retract (idempotent). Возвращает hooked объект, если был.
    pub fn retract(&mut self) -> Option<Entity> {
        self.mode = GrappleMode::Retracted;
        self.anchor.detach();
        self.hooked.take()
    }
}

/// Сила троса за тик
///
/// `(anchor − position)·pull_strength` (или нормализованная при `linear_force`).
/// Горизонталь ослабляется, если input против троса:
/// `reduction = (1 + dot)/2·(1 − min) + min`. Вертикаль × `vertical_boost`.
pub fn grapple_pull(anchor: Vec3, position: Vec3, wish: Vec3, config: &GrappleConfig) -> Vec3 {
    let mut pull = (anchor - position) * config.pull_strength;
    if config.linear_force {
        pull = pull.normalize_or_zero() * config.pull_strength;
    }

    let alignment = lateral(pull).normalize_or_zero().dot(wish);
    let minimum = config.input_reduction_strength;
    let reduction = (1.0 + alignment) / 2.0 * (1.0 - minimum) + minimum;

    Vec3::new(
        pull.x * reduction,
        pull.y * config.vertical_boost,
        pull.z * reduction,
    )
}

fn retract_grapple(
    character: Entity,
    grapple: &mut Grapple,
    state: &mut MovementState,
    launch: bool,
    released_events: &mut EventWriter<GrappleReleased>,
) {
    if grapple.is_retracted() {
        return;
    }

    let anchor = grapple.anchor.position;
    state.disable_gravity_for_seconds(0.0);

    if let Some(target) = grapple.retract() {
        released_events.write(GrappleReleased {
            character,
            target,
            anchor,
            launch,
        });
    }

    crate::logger::log(&format!("🪝 Grapple retract: {:?} launch={}", character, launch));
}

// ============================================================================
// Systems
// ============================================================================

/// System: Use/Retract из input, retract при смерти и старте wall-run
///
/// Смерть отпускает без launch силы, остальные - с ней.
pub fn process_grapple_triggers(
    config: Res<SimulationConfig>,
    mut died_events: EventReader<PlayerDied>,
    mut release_requests: EventReader<GrappleReleaseRequested>,
    mut triggers: EventReader<GrappleTrigger>,
    mut characters: Query<(&Transform, &mut MovementState, &mut Grapple)>,
    mut released_events: EventWriter<GrappleReleased>,
) {
    for event in died_events.read() {
        if let Ok((_, mut state, mut grapple)) = characters.get_mut(event.entity) {
            retract_grapple(event.entity, &mut grapple, &mut state, false, &mut released_events);
        }
    }

    for event in release_requests.read() {
        if let Ok((_, mut state, mut grapple)) = characters.get_mut(event.entity) {
            retract_grapple(event.entity, &mut grapple, &mut state, true, &mut released_events);
        }
    }

    for trigger in triggers.read() {
        let Ok((transform, mut state, mut grapple)) = characters.get_mut(trigger.entity) else {
            continue;
        };

        if trigger.pressed {
            let eye = config.gameplay.character.center(transform.translation);
            if grapple.use_grapple(eye, state.look_vector()) {
                crate::logger::log(&format!("🪝 Grapple thrown: {:?}", trigger.entity));
            }
        } else {
            retract_grapple(trigger.entity, &mut grapple, &mut state, true, &mut released_events);
        }
    }
}

/// System: полёт якоря, притяжение, следование за глазами/родителем
pub fn tick_grapple<B: CollisionBackend>(
    collision: StaticSystemParam<B::Param>,
    config: Res<SimulationConfig>,
    fixed: Res<Time<Fixed>>,
    mut characters: Query<(Entity, &Transform, &mut MovementState, &mut Grapple)>,
    parents: Query<&Transform, Without<MovementState>>,
    hookables: Query<(), With<Hookable>>,
    mut hooked_events: EventWriter<GrappleHooked>,
) {
    let dt = fixed.timestep().as_secs_f32();
    let tuning = &config.grapple;
    let shape = &config.gameplay.character;

    B::with_world(&*collision, |world| {
        for (entity, transform, mut state, mut grapple) in characters.iter_mut() {
            let position = transform.translation;

            match grapple.mode {
                GrappleMode::Retracted => {
                    grapple.anchor.position = shape.center(position);
                }
                GrappleMode::Traveling => {
                    let step = tuning.travel_speed * dt;
                    let direction = grapple.direction;
                    let hit = world.raycast(
                        grapple.anchor.position,
                        direction,
                        step,
                        config.masks.grapple,
                        Some(entity),
                    );

                    if let Some(hit) = hit {
                        if position.y - hit.point.y < LOW_HOOK_HEIGHT {
                            state.disable_gravity_for_seconds(tuning.disable_gravity_time);
                        }
                        state.force_wall_run_cooldown();

                        let target = hookables.contains(hit.entity).then_some(hit.entity);
                        grapple.attach(hit.point, target);

                        if let Some(target) = target {
                            hooked_events.write(GrappleHooked {
                                character: entity,
                                target,
                                point: hit.point,
                            });
                        }

                        crate::logger::log(&format!(
                            "🪝 Grapple attached: {:?} → {:?} at {:?}",
                            entity, hit.entity, hit.point
                        ));
                    } else {
                        grapple.anchor.position += direction * step;

                        if grapple.anchor.position.distance(position) > tuning.max_distance {
                            // Без hooked объекта: released notification не нужна
                            grapple.retract();
                            state.disable_gravity_for_seconds(0.0);
                        }
                    }
                }
                GrappleMode::Attached => {
                    if let Some(parent) = grapple.anchor.parent {
                        if let Ok(parent_transform) = parents.get(parent.entity) {
                            grapple.anchor.position = parent_transform.translation + parent.offset;
                        }
                    }

                    let pull = grapple_pull(grapple.anchor.position, position, state.wish_dir(), tuning);
                    state.apply_force(pull, false);
                }
            }
        }
    });
}
