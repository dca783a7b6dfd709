//! Rapier backend - запросы через bevy_rapier3d
//!
//! Raycast: `cast_ray_and_get_normal` с фильтром по CollisionGroups.
//! Sweep: collide-and-slide капсулой через `cast_shape` (до `MAX_SLIDES` плоскостей).
//! Ground overlap: `intersect_shape` капсулой, опущенной на `GROUND_CONTACT_DISTANCE`.
//! `Presence.collidable` зеркалится в `ColliderDisabled`.
//!
//! Сам `RapierPhysicsPlugin` добавляет хост (см. `create_rapier_app`).

use bevy::ecs::system::SystemParamItem;
use bevy::prelude::*;
use bevy_rapier3d::geometry::Group;
use bevy_rapier3d::parry::shape::Capsule;
use bevy_rapier3d::prelude::*;

use super::{
    CharacterShape, CollisionBackend, CollisionQuery, EmptyWorld, Presence, SurfaceHit,
    GROUND_CONTACT_DISTANCE,
};

/// Сколько раз sweep может перенаправить движение вдоль поверхности
const MAX_SLIDES: usize = 4;

/// Зазор до поверхности после sweep
const SKIN: f32 = 0.01;

pub struct RapierBackend;

impl CollisionBackend for RapierBackend {
    type Param = ReadRapierContext<'static, 'static>;

    fn plugin() -> impl Plugin {
        RapierCollisionPlugin
    }

    fn with_world<R>(
        rapier_context: &SystemParamItem<'_, '_, Self::Param>,
        f: impl FnOnce(&dyn CollisionQuery) -> R,
    ) -> R {
        let Ok(context) = rapier_context.single() else {
            crate::logger::log_warning("⚠️ Rapier context missing, collision queries disabled this tick");
            return f(&EmptyWorld);
        };

        f(&RapierWorld { context: &context })
    }
}

/// Plugin: синхронизация Presence → ColliderDisabled
pub struct RapierCollisionPlugin;

impl Plugin for RapierCollisionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            sync_presence_to_colliders.in_set(crate::SimulationSet::Interactions),
        );
    }
}

/// System: выключенные (broken) объекты не участвуют в коллизиях rapier
pub fn sync_presence_to_colliders(
    mut commands: Commands,
    changed: Query<(Entity, &Presence), Changed<Presence>>,
) {
    for (entity, presence) in changed.iter() {
        if presence.collidable {
            commands.entity(entity).remove::<ColliderDisabled>();
        } else {
            commands.entity(entity).insert(ColliderDisabled);
        }
    }
}

/// Адаптер RapierContext → CollisionQuery
struct RapierWorld<'a> {
    context: &'a RapierContext<'a>,
}

fn query_filter(mask: u32, exclude: Option<Entity>) -> QueryFilter<'static> {
    let mut filter = QueryFilter::default()
        .exclude_sensors()
        .groups(CollisionGroups::new(Group::ALL, Group::from_bits_truncate(mask)));

    if let Some(entity) = exclude {
        filter = filter.exclude_collider(entity);
    }

    filter
}

impl CollisionQuery for RapierWorld<'_> {
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

        self.context
            .cast_ray_and_get_normal(origin, direction, max_distance, true, query_filter(mask, exclude))
            .map(|(entity, hit)| SurfaceHit {
                entity,
                point: hit.point,
                normal: hit.normal,
                distance: hit.time_of_impact,
            })
    }

    fn sweep(
        &self,
        position: Vec3,
        shape: &CharacterShape,
        displacement: Vec3,
        exclude: Option<Entity>,
    ) -> Vec3 {
        let capsule = Capsule::new_y(shape.segment_half_height(), shape.radius);
        let filter = query_filter(u32::MAX, exclude);
        let start = shape.center(position);
        let mut center = start;
        let mut remaining = displacement;

        for _ in 0..MAX_SLIDES {
            let distance = remaining.length();
            if distance <= f32::EPSILON {
                break;
            }
            let direction = remaining / distance;

            let hit = self.context.cast_shape(
                center,
                Quat::IDENTITY,
                direction,
                &capsule,
                ShapeCastOptions {
                    max_time_of_impact: distance,
                    stop_at_penetration: false,
                    ..default()
                },
                filter,
            );

            let Some((_, hit)) = hit else {
                center += remaining;
                break;
            };

            let travel = (hit.time_of_impact - SKIN).max(0.0);
            center += direction * travel;

            let Some(details) = hit.details else {
                break;
            };

            // Нормаль поверхности должна смотреть против движения
            let mut normal = details.normal1;
            if normal.dot(direction) > 0.0 {
                normal = -normal;
            }

            remaining = direction * (distance - travel);
            remaining -= normal * remaining.dot(normal);
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
        let capsule = Capsule::new_y(shape.segment_half_height(), shape.radius);
        let lowered = shape.center(position) - Vec3::Y * GROUND_CONTACT_DISTANCE;
        let mut found = false;

        self.context.intersect_shape(
            lowered,
            Quat::IDENTITY,
            &capsule,
            query_filter(mask, exclude),
            |_| {
                found = true;
                false
            },
        );

        found
    }
}
