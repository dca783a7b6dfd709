//! HAMMERHOOK Simulation Core
//!
//! Kinetic movement для first-person персонажа на Bevy 0.16 (ECS, FixedUpdate).
//!
//! Домены:
//! - movement - Movement Controller (Ground / Air / WallRun), force queue
//! - equipment - hammer (charge weapon) + rod (grapple)
//! - interactables - attackable / hookable объекты мира
//! - collision - raycast + swept move через pluggable backend (headless AABB или rapier)
//! - input - PlayerInput от хоста
//!
//! Порядок внутри тика: `Input → Movement → Equipment → Interactions`.
//! Силы, добавленные в Equipment/Interactions, движение видит на следующем тике.

use std::marker::PhantomData;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::{NoUserData, RapierPhysicsPlugin};

// Публичные модули
pub mod collision;
pub mod config;
pub mod equipment;
pub mod input;
pub mod interactables;
pub mod logger;
pub mod movement;
pub mod player;

// Re-export основных типов для удобства
pub use collision::{
    CollisionBackend, CollisionQuery, HeadlessBackend, Presence, RapierBackend, SolidVolume,
    SurfaceHit,
};
pub use config::{ConfigError, SimulationConfig};
pub use equipment::{ChargeWeapon, EquipmentPlugin, Grapple, GrappleMode};
pub use input::{InputAction, InputPlugin, NewGameRequested, PlayerInput};
pub use interactables::{Attackable, Hookable, InteractablesPlugin};
pub use logger::{init_logger, log, log_error, log_info, log_warning};
pub use movement::{MovementMode, MovementPlugin, MovementState, PlayerDied, SpawnPoint};
pub use player::{player_bundle, spawn_player, Player};

/// Фазы fixed тика (выполняются строго по порядку)
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    /// PlayerInput → состояние персонажа, triggers экипировки
    Input,
    /// Movement Controller: потребляет силы прошлого тика, swept move
    Movement,
    /// Hammer + rod
    Equipment,
    /// Attackable / hookable реакции
    Interactions,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin<B: CollisionBackend = HeadlessBackend> {
    config: SimulationConfig,
    _backend: PhantomData<B>,
}

impl<B: CollisionBackend> SimulationPlugin<B> {
    /// Конфиг валидируется здесь, до старта симуляции
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            _backend: PhantomData,
        })
    }
}

impl<B: CollisionBackend> Default for SimulationPlugin<B> {
    fn default() -> Self {
        Self {
            config: SimulationConfig::default(),
            _backend: PhantomData,
        }
    }
}

impl<B: CollisionBackend> Plugin for SimulationPlugin<B> {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep для simulation tick (50Hz по умолчанию)
            .insert_resource(Time::<Fixed>::from_hz(self.config.gameplay.tick_hz))
            .insert_resource(self.config.clone())
            .configure_sets(
                FixedUpdate,
                (
                    SimulationSet::Input,
                    SimulationSet::Movement,
                    SimulationSet::Equipment,
                    SimulationSet::Interactions,
                )
                    .chain(),
            )
            // Подсистемы
            .add_plugins((
                B::plugin(),
                InputPlugin,
                MovementPlugin::<B>::default(),
                EquipmentPlugin::<B>::default(),
                InteractablesPlugin,
            ));
    }
}

/// Создаёт minimal Bevy App для headless симуляции (AABB мир, без рендера)
pub fn create_headless_app(config: SimulationConfig) -> Result<App, ConfigError> {
    let plugin = SimulationPlugin::<HeadlessBackend>::new(config)?;

    init_logger();
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(plugin);
    app.finish();
    app.cleanup();

    Ok(app)
}

/// Тот же мир, но коллизии через rapier (collider'ы от `spawn_solid`)
pub fn create_rapier_app(config: SimulationConfig) -> Result<App, ConfigError> {
    let plugin = SimulationPlugin::<RapierBackend>::new(config)?;

    init_logger();
    let mut app = App::new();
    app.add_plugins(MinimalPlugins)
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        .add_plugins(plugin);
    app.finish();
    app.cleanup();

    Ok(app)
}

/// Ровно один fixed тик через полный `App::update`
///
/// Часы двигаются вручную на один timestep, поэтому FixedUpdate отрабатывает
/// ровно один раз, а `First` чистит очереди событий как в обычном кадре.
pub fn step_fixed(app: &mut App) {
    let Some(timestep) = app
        .world()
        .get_resource::<Time<Fixed>>()
        .map(|fixed| fixed.timestep())
    else {
        log_error("step_fixed: Time<Fixed> missing, SimulationPlugin not added?");
        return;
    };
    app.insert_resource(TimeUpdateStrategy::ManualDuration(timestep));

    // Первый кадр только заводит часы (delta = 0)
    let clock_started = app
        .world()
        .get_resource::<Time<Real>>()
        .is_some_and(|real| real.first_update().is_some());
    if !clock_started {
        app.update();
    }

    app.update();
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
