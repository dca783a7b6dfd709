//! Collision domain - raycast + swept move для Movement Controller и экипировки
//!
//! Симуляция не знает, какой физический движок под ней. Системы получают
//! `&dyn CollisionQuery` через `CollisionBackend::with_world` на время тика.
//!
//! Backends:
//! - `HeadlessBackend` - детерминированный мир из AABB (`SolidVolume`), тесты/демо
//! - `RapierBackend` - bevy_rapier3d (ray cast + capsule collide-and-slide)

use bevy::ecs::system::{ReadOnlySystemParam, SystemParamItem};
use bevy::prelude::*;
use bevy_rapier3d::geometry::{Collider, CollisionGroups, Group};
use serde::{Deserialize, Serialize};

pub mod headless;
pub mod rapier;

pub use headless::{BoxVolume, HeadlessBackend, SolidVolume, VolumeWorld};
pub use rapier::RapierBackend;

// ============================================================================
// Layer битовые маски (на каком слое объект находится)
// ============================================================================

/// Статичная геометрия: пол, стены, платформы
pub const LAYER_ENVIRONMENT: u32 = 0b10; // 2

/// Интерактивные объекты (breakable, launch pad, hook targets)
pub const LAYER_INTERACTABLE: u32 = 0b100; // 4

/// Сам персонаж (в запросах не участвует)
pub const LAYER_CHARACTER: u32 = 0b1000; // 8

// ============================================================================
// Mask битовые маски (что видят запросы)
// ============================================================================

/// Ground probe + wall-run check
pub const MASK_GROUND: u32 = LAYER_ENVIRONMENT | LAYER_INTERACTABLE;

/// Look surface / attack raycast
pub const MASK_ATTACKABLE: u32 = LAYER_ENVIRONMENT | LAYER_INTERACTABLE;

/// Полёт якоря grapple
pub const MASK_GRAPPLE: u32 = LAYER_ENVIRONMENT | LAYER_INTERACTABLE;

/// Насколько ниже подошвы капсулы ground ещё считается касанием
pub const GROUND_CONTACT_DISTANCE: f32 = 0.02;

/// "Бесконечная" дальность raycast'а
pub const INFINITE_RANGE: f32 = f32::MAX;

/// Результат raycast'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    pub entity: Entity,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// Капсула персонажа (pivot = `Transform.translation`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct CharacterShape {
    pub radius: f32,
    pub height: f32,
    /// Смещение центра капсулы (и точки обзора) от pivot
    pub center_offset: Vec3,
}

impl Default for CharacterShape {
    fn default() -> Self {
        Self {
            radius: 0.5,
            height: 2.0,
            center_offset: Vec3::ZERO,
        }
    }
}

impl CharacterShape {
    /// Центр капсулы в мире
    pub fn center(&self, position: Vec3) -> Vec3 {
        position + self.center_offset
    }

    /// AABB полуразмеры (для headless sweep)
    pub fn half_extents(&self) -> Vec3 {
        Vec3::new(self.radius, self.height * 0.5, self.radius)
    }

    /// Половина цилиндрической части капсулы
    pub fn segment_half_height(&self) -> f32 {
        (self.height * 0.5 - self.radius).max(0.0)
    }
}

/// Включён ли объект в мир (коллизия + видимость)
///
/// Breakable выключает себя при ударе и восстанавливает при смерти персонажа.
/// Backends игнорируют объекты с `collidable == false`.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct Presence {
    pub collidable: bool,
    pub visible: bool,
}

impl Default for Presence {
    fn default() -> Self {
        Self {
            collidable: true,
            visible: true,
        }
    }
}

impl Presence {
    pub fn enable(&mut self) {
        self.collidable = true;
        self.visible = true;
    }

    pub fn disable(&mut self) {
        self.collidable = false;
        self.visible = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.collidable && self.visible
    }
}

/// Запросы к миру коллизий
pub trait CollisionQuery {
    /// Ближайшее пересечение луча с объектами из `mask`.
    /// `direction` не обязан быть нормализован; нулевой - всегда `None`.
    fn raycast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        mask: u32,
        exclude: Option<Entity>,
    ) -> Option<SurfaceHit>;

    /// Swept move капсулы: возвращает фактическое перемещение после коллизий
    fn sweep(
        &self,
        position: Vec3,
        shape: &CharacterShape,
        displacement: Vec3,
        exclude: Option<Entity>,
    ) -> Vec3;

    /// Касается ли нижняя половина капсулы объектов из `mask`
    /// (зазор до `GROUND_CONTACT_DISTANCE` тоже считается касанием)
    fn overlaps_ground(
        &self,
        position: Vec3,
        shape: &CharacterShape,
        mask: u32,
        exclude: Option<Entity>,
    ) -> bool;
}

/// Мир без геометрии (нет rapier context и т.п.)
pub struct EmptyWorld;

impl CollisionQuery for EmptyWorld {
    fn raycast(&self, _: Vec3, _: Vec3, _: f32, _: u32, _: Option<Entity>) -> Option<SurfaceHit> {
        None
    }

    fn sweep(&self, _: Vec3, _: &CharacterShape, displacement: Vec3, _: Option<Entity>) -> Vec3 {
        displacement
    }

    fn overlaps_ground(&self, _: Vec3, _: &CharacterShape, _: u32, _: Option<Entity>) -> bool {
        false
    }
}

/// Спавнит статичный box: `SolidVolume` для headless мира + cuboid collider для rapier
pub fn spawn_solid(world: &mut World, center: Vec3, half_extents: Vec3, layers: u32) -> Entity {
    world
        .spawn((
            SolidVolume::new(half_extents, layers),
            Transform::from_translation(center),
            Collider::cuboid(half_extents.x, half_extents.y, half_extents.z),
            CollisionGroups::new(Group::from_bits_truncate(layers), Group::ALL),
        ))
        .id()
}

/// Физический backend симуляции
///
/// `Param` - read-only system param, из которого backend собирает
/// `CollisionQuery` (rapier context, query по SolidVolume).
pub trait CollisionBackend: Send + Sync + 'static {
    type Param: ReadOnlySystemParam + 'static;

    /// Backend-specific системы (sync Presence → collider и т.п.)
    fn plugin() -> impl Plugin;

    fn with_world<R>(
        param: &SystemParamItem<'_, '_, Self::Param>,
        f: impl FnOnce(&dyn CollisionQuery) -> R,
    ) -> R;
}
