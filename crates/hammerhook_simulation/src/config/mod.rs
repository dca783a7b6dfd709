//! Config domain - параметры симуляции
//!
//! Все числа грузятся один раз из RON (`SimulationConfig::from_ron_str` / `load`),
//! валидируются до старта и дальше не меняются (Resource, read-only для систем).
//!
//! Единицы:
//! - скорости - m/s
//! - `*_acceleration` - добавляется как `acceleration·dt` к перемещению за тик
//! - `gravity` - физическое ускорение m/s² (`delta.y += gravity·dt²`)
//! - таймеры - секунды

use std::path::Path;

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::collision::{CharacterShape, MASK_ATTACKABLE, MASK_GRAPPLE, MASK_GROUND};


/// Ошибки конфигурации (ловятся до старта симуляции)
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse RON config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("charge stage table is empty")]
    EmptyChargeStages,

    #[error("charge stage {index} threshold {threshold} is not above the previous one")]
    UnorderedChargeStages { index: usize, threshold: f32 },

    #[error("launch pad power table is empty")]
    EmptyPowerTable,

    #[error("{field} must be positive (got {value})")]
    NonPositive { field: &'static str, value: f32 },

    #[error("{field} must not be negative (got {value})")]
    Negative { field: &'static str, value: f32 },
}

/// Полный набор параметров сессии
#[derive(Resource, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub gameplay: GameplayConfig,
    pub movement: MovementParameters,
    pub hammer: HammerConfig,
    pub grapple: GrappleConfig,
    pub masks: CollisionMasks,
}

impl SimulationConfig {
    /// Парсит RON и сразу валидирует
    pub fn from_ron_str(text: &str) -> Result<Self, ConfigError> {
        let config: SimulationConfig = ron::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_ron_str(&text)
    }

    /// Длительность одного fixed тика (секунды)
    pub fn tick_seconds(&self) -> f32 {
        (1.0 / self.gameplay.tick_hz) as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("gameplay.tick_hz", self.gameplay.tick_hz as f32)?;
        positive("gameplay.character.radius", self.gameplay.character.radius)?;
        positive("gameplay.character.height", self.gameplay.character.height)?;

        let m = &self.movement;
        positive("movement.ground_max_velocity", m.ground_max_velocity)?;
        positive("movement.air_max_velocity", m.air_max_velocity)?;
        non_negative("movement.ground_acceleration", m.ground_acceleration)?;
        non_negative("movement.air_acceleration", m.air_acceleration)?;
        non_negative("movement.friction", m.friction)?;
        non_negative("movement.max_fall_speed", m.max_fall_speed)?;
        non_negative("movement.wall_run_duration", m.wall_run_duration)?;
        non_negative("movement.wall_run_recovery_time", m.wall_run_recovery_time)?;
        non_negative("movement.attack_range", m.attack_range)?;

        self.hammer.validate()?;

        let g = &self.grapple;
        positive("grapple.max_distance", g.max_distance)?;
        positive("grapple.travel_speed", g.travel_speed)?;
        non_negative("grapple.disable_gravity_time", g.disable_gravity_time)?;

        Ok(())
    }
}

pub(crate) fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

pub(crate) fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Negative { field, value })
    }
}

// ============================================================================
// Gameplay
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplayConfig {
    /// Частота fixed тика (Hz)
    pub tick_hz: f64,
    /// Ниже этой высоты персонаж респавнится
    pub death_plane_y: f32,
    /// Радианы поворота на единицу look delta (x = yaw, y = pitch)
    pub look_sensitivity: Vec2,
    pub character: CharacterShape,
}

impl Default for GameplayConfig {
    fn default() -> Self {
        Self {
            tick_hz: 50.0,
            death_plane_y: -50.0,
            look_sensitivity: Vec2::splat(0.0025),
            character: CharacterShape::default(),
        }
    }
}

// ============================================================================
// Movement
// ============================================================================

/// Параметры Movement Controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementParameters {
    pub ground_acceleration: f32,
    pub air_acceleration: f32,
    pub ground_max_velocity: f32,
    pub air_max_velocity: f32,
    pub friction: f32,
    /// Модуль максимальной скорости падения (m/s)
    pub max_fall_speed: f32,
    pub gravity: f32,
    pub jump_velocity: f32,
    pub air_control: f32,
    pub wall_run_duration: f32,
    pub wall_run_speed: f32,
    pub wall_run_recovery_time: f32,
    pub wall_jump_lateral_velocity: f32,
    pub air_jumps: u32,
    pub attack_range: f32,
}

impl Default for MovementParameters {
    fn default() -> Self {
        Self {
            ground_acceleration: 4.0,
            air_acceleration: 1.0,
            ground_max_velocity: 10.0,
            air_max_velocity: 4.0,
            friction: 6.0,
            max_fall_speed: 40.0,
            gravity: -30.0,
            jump_velocity: 9.0,
            air_control: 4.0,
            wall_run_duration: 1.2,
            wall_run_speed: 14.0,
            wall_run_recovery_time: 0.4,
            wall_jump_lateral_velocity: 8.0,
            air_jumps: 1,
            attack_range: 3.0,
        }
    }
}

// ============================================================================
// Hammer
// ============================================================================

/// Одна ступень заряда: после `threshold` секунд удержания - сила `force`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChargeStage {
    pub threshold: f32,
    pub force: f32,
}

impl ChargeStage {
    pub const fn new(threshold: f32, force: f32) -> Self {
        Self { threshold, force }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HammerConfig {
    pub cooldown_time: f32,
    pub max_distance: f32,
    pub launch_bias: Vec3,
    /// Отсортирована по возрастанию threshold, не пустая
    pub charge_stages: Vec<ChargeStage>,
}

impl Default for HammerConfig {
    fn default() -> Self {
        Self {
            cooldown_time: 0.5,
            max_distance: 3.0,
            launch_bias: Vec3::new(0.0, 0.3, 0.0),
            charge_stages: vec![
                ChargeStage::new(0.0, 12.0),
                ChargeStage::new(0.4, 20.0),
                ChargeStage::new(1.0, 30.0),
            ],
        }
    }
}

impl HammerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.charge_stages.is_empty() {
            return Err(ConfigError::EmptyChargeStages);
        }

        for (index, pair) in self.charge_stages.windows(2).enumerate() {
            if pair[1].threshold <= pair[0].threshold {
                return Err(ConfigError::UnorderedChargeStages {
                    index: index + 1,
                    threshold: pair[1].threshold,
                });
            }
        }

        non_negative("hammer.cooldown_time", self.cooldown_time)?;
        non_negative("hammer.max_distance", self.max_distance)
    }
}

// ============================================================================
// Grapple
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GrappleConfig {
    pub max_distance: f32,
    pub pull_strength: f32,
    /// Нижняя граница множителя lateral pull при input против тяги
    pub input_reduction_strength: f32,
    pub vertical_boost: f32,
    /// Скорость полёта якоря (m/s)
    pub travel_speed: f32,
    /// true - тяга постоянной величины (normalize · pull_strength)
    pub linear_force: bool,
    pub disable_gravity_time: f32,
}

impl Default for GrappleConfig {
    fn default() -> Self {
        Self {
            max_distance: 40.0,
            pull_strength: 0.25,
            input_reduction_strength: 0.3,
            vertical_boost: 1.5,
            travel_speed: 80.0,
            linear_force: false,
            disable_gravity_time: 0.3,
        }
    }
}

// ============================================================================
// Collision masks
// ============================================================================

/// Маски raycast'ов (см. `collision::LAYER_*`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionMasks {
    pub ground: u32,
    pub attackable: u32,
    pub grapple: u32,
}

impl Default for CollisionMasks {
    fn default() -> Self {
        Self {
            ground: MASK_GROUND,
            attackable: MASK_ATTACKABLE,
            grapple: MASK_GRAPPLE,
        }
    }
}
