//! Equipment events
//!
//! # Architecture
//!
//! **Triggers (Input → Equipment):**
//! - `ChargeTrigger` → hammer StartCharge / ReleaseCharge
//! - `GrappleTrigger` → rod Use / Retract
//!
//! **Outcomes (Equipment → Interactions):**
//! - `HammerStrike` → attackable override или default launch сила
//! - `GrappleHooked` / `GrappleReleased` → hookable notifications
//!
//! **HUD hooks:**
//! - `ChargeStageChanged` (charging flag или stage изменились)
//! - `AttackHighlightChanged` (attackable в радиусе атаки сменился)

use bevy::prelude::*;

// ============================================================================
// Triggers
// ============================================================================

/// Attack кнопка: press = начать заряд, release = удар
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeTrigger {
    pub entity: Entity,
    pub pressed: bool,
}

/// Grapple кнопка: press = бросок, release = retract
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrappleTrigger {
    pub entity: Entity,
    pub pressed: bool,
}

// ============================================================================
// Outcomes
// ============================================================================

/// Удар молотом по поверхности в пределах досягаемости
///
/// # Flow
/// 1. Если `target` - attackable, его `on_attacked(stage)` может вернуть override
/// 2. Ненулевой override заменяет `default_force`
/// 3. Сила → `apply_force(.., true)` + wall-run cooldown
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HammerStrike {
    pub character: Entity,
    /// Attackable под прицелом (None - обычная поверхность)
    pub target: Option<Entity>,
    pub stage: usize,
    pub default_force: Vec3,
}

/// Заряд молота изменился (для HUD)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChargeStageChanged {
    pub entity: Entity,
    pub charging: bool,
    pub stage: usize,
}

/// Подсвеченная цель молота сменилась (None - подсветку снять)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttackHighlightChanged {
    pub entity: Entity,
    pub target: Option<Entity>,
}

/// Якорь зацепился за hookable объект
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct GrappleHooked {
    pub character: Entity,
    pub target: Entity,
    pub point: Vec3,
}

/// Якорь отпущен с hookable объекта
///
/// `launch == false` при смерти: release notification всё равно приходит,
/// но launch сила не применяется.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct GrappleReleased {
    pub character: Entity,
    pub target: Entity,
    pub anchor: Vec3,
    pub launch: bool,
}
