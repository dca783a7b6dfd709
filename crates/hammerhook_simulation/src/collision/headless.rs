//! Headless backend - мир из axis-aligned boxes
//!
//! Без rapier: `SolidVolume` + `Transform.translation` = AABB.
//! Raycast - slab method, sweep - покоординатно (Y, X, Z) с маленьким skin.
//! Полностью детерминирован, используется тестами и демо-бинарём.

use bevy::ecs::system::SystemParamItem;
use bevy::prelude::*;

use super::{
    CharacterShape, CollisionBackend, CollisionQuery, Presence, SurfaceHit, GROUND_CONTACT_DISTANCE,
};
use crate::movement::MovementState;

/// Зазор, который sweep оставляет до поверхности
const SKIN: f32 = 0.001;

/// Допуск "уже касаемся" при sweep
const CONTACT_TOLERANCE: f32 = 0.01;

/// Касание гранями по перпендикулярной оси не блокирует движение
const OVERLAP_TOLERANCE: f32 = 1e-4;

/// Твёрдый box в headless мире (center = `Transform.translation`, без вращения)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(Transform, Presence)]
pub struct SolidVolume {
    pub half_extents: Vec3,
    pub layers: u32,
}

impl SolidVolume {
    pub fn new(half_extents: Vec3, layers: u32) -> Self {
        Self { half_extents, layers }
    }
}

/// Снимок одного box'а на время запроса
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxVolume {
    pub entity: Entity,
    pub min: Vec3,
    pub max: Vec3,
    pub layers: u32,
}

impl BoxVolume {
    pub fn new(entity: Entity, center: Vec3, half_extents: Vec3, layers: u32) -> Self {
        Self {
            entity,
            min: center - half_extents,
            max: center + half_extents,
            layers,
        }
    }

    /// Пересечение луча с box'ом: (distance, normal входной грани).
    /// Луч, стартующий внутри box'а, не считается попаданием.
    fn ray_intersection(&self, origin: Vec3, direction: Vec3) -> Option<(f32, Vec3)> {
        let mut t_enter = f32::NEG_INFINITY;
        let mut t_exit = f32::INFINITY;
        let mut normal = Vec3::ZERO;

        for axis in 0..3 {
            let o = origin[axis];
            let d = direction[axis];

            if d.abs() < 1e-8 {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (self.min[axis] - o) * inv;
            let mut t1 = (self.max[axis] - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }

            if t0 > t_enter {
                t_enter = t0;
                normal = Vec3::ZERO;
                normal[axis] = -d.signum();
            }
            t_exit = t_exit.min(t1);

            if t_enter > t_exit {
                return None;
            }
        }

        if t_enter < 0.0 {
            return None;
        }

        Some((t_enter, normal))
    }

    fn overlaps_across(&self, center: Vec3, half: Vec3, axis: usize) -> bool {
        (0..3).filter(|a| *a != axis).all(|a| {
            center[a] - half[a] < self.max[a] - OVERLAP_TOLERANCE
                && center[a] + half[a] > self.min[a] + OVERLAP_TOLERANCE
        })
    }
}

/// Набор box'ов, собранный на один вызов `with_world`
#[derive(Debug, Clone, Default)]
pub struct VolumeWorld {
    boxes: Vec<BoxVolume>,
}

impl VolumeWorld {
    pub fn new(boxes: Vec<BoxVolume>) -> Self {
        Self { boxes }
    }
}

impl CollisionQuery for VolumeWorld {
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: u32,
        exclude: Option<Entity>,
    ) -> Option<SurfaceHit> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        self.boxes
            .iter()
            .filter(|b| b.layers & mask != 0 && Some(b.entity) != exclude)
            .filter_map(|b| {
                let (distance, normal) = b.ray_intersection(origin, direction)?;
                (distance <= max_distance).then(|| SurfaceHit {
                    entity: b.entity,
                    point: origin + direction * distance,
                    normal,
                    distance,
                })
            })
            .min_by(|a, b| a.distance.total_cmp(&b.distance))
    }

    fn sweep(
        &self,
        position: Vec3,
        shape: &CharacterShape,
        displacement: Vec3,
        exclude: Option<Entity>,
    ) -> Vec3 {
        let half = shape.half_extents();
        let start = shape.center(position);
        let mut center = start;

        // Y первым: приземление не должно цеплять стены
        for axis in [1usize, 0, 2] {
            let step = displacement[axis];
            if step == 0.0 {
                continue;
            }

            let mut allowed = step;
            for b in self.boxes.iter().filter(|b| Some(b.entity) != exclude) {
                if !b.overlaps_across(center, half, axis) {
                    continue;
                }

                if step > 0.0 {
                    let gap = b.min[axis] - (center[axis] + half[axis]);
                    if gap >= -CONTACT_TOLERANCE {
                        allowed = allowed.min((gap - SKIN).max(0.0));
                    }
                } else {
                    let gap = (center[axis] - half[axis]) - b.max[axis];
                    if gap >= -CONTACT_TOLERANCE {
                        allowed = allowed.max(-(gap - SKIN).max(0.0));
                    }
                }
            }

            center[axis] += allowed;
        }

        center - start
    }

    fn overlaps_ground(
        &self,
        position: Vec3,
        shape: &CharacterShape,
        mask: u32,
        exclude: Option<Entity>,
    ) -> bool {
        let half = shape.half_extents();
        let center = shape.center(position);
        let bottom = center.y - half.y - GROUND_CONTACT_DISTANCE;

        self.boxes
            .iter()
            .filter(|b| b.layers & mask != 0 && Some(b.entity) != exclude)
            .any(|b| {
                b.max.y > bottom
                    && b.min.y < center.y
                    && b.overlaps_across(center, half, 1)
            })
    }
}

/// Backend без физического движка
pub struct HeadlessBackend;

/// Регистрирует reflect-типы headless мира
pub struct HeadlessCollisionPlugin;

impl Plugin for HeadlessCollisionPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SolidVolume>()
            .register_type::<Presence>();
    }
}

impl CollisionBackend for HeadlessBackend {
    type Param = Query<
        'static,
        'static,
        (Entity, &'static Transform, &'static SolidVolume, &'static Presence),
        Without<MovementState>,
    >;

    fn plugin() -> impl Plugin {
        HeadlessCollisionPlugin
    }

    fn with_world<R>(
        volumes: &SystemParamItem<'_, '_, Self::Param>,
        f: impl FnOnce(&dyn CollisionQuery) -> R,
    ) -> R {
        let world = VolumeWorld::new(
            volumes
                .iter()
                .filter(|(_, _, _, presence)| presence.collidable)
                .map(|(entity, transform, volume, _)| {
                    BoxVolume::new(entity, transform.translation, volume.half_extents, volume.layers)
                })
                .collect(),
        );

        f(&world)
    }
}
