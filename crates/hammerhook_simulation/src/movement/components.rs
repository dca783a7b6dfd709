//! Movement components - состояние Movement Controller персонажа

use bevy::prelude::*;

/// Активный режим движения (ровно один за тик)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum MovementMode {
    Ground,
    #[default]
    Air,
    WallRun,
}

/// Состояние Movement Controller
///
/// Позиция - `Transform.translation`. Всё остальное, что переживает тик, здесь.
///
/// Таймеры:
/// - `wall_run_timer` > 0 - wall-run активен, < 0 - cooldown (новый run только при `<= -recovery`)
/// - `gravity_disable_timer` > 0 - гравитация выключена
///
/// Внешние силы (`apply_force`) копятся в `pending_force` и потребляются
/// ровно один раз в начале следующего тика движения.
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
#[require(Transform, CharacterInput)]
pub struct MovementState {
    /// Скорость по факту (resolved displacement / dt)
    pub velocity: Vec3,
    /// Поворот камеры вокруг Y (радианы)
    pub yaw: f32,
    /// Наклон камеры (радианы, + вверх)
    pub pitch: f32,
    /// Camera-relative направление input'а (горизонтальное, unit или zero)
    pub wish_dir: Vec3,

    pub mode: MovementMode,
    pub grounded: bool,
    pub grounded_last_tick: bool,
    pub air_jumps_remaining: u32,

    pub wall_run_timer: f32,
    pub wall_run_direction: Vec3,
    pub wall_normal: Vec3,
    /// Куда смотрит wall probe во время активного run'а
    pub wall_run_cast: Vec3,
    /// Косметический наклон камеры (градусы), камерой не управляем
    pub camera_tilt_target: f32,

    pub gravity_disable_timer: f32,

    pub pending_force: Vec3,
    pub override_vertical: bool,

    /// Restart input: респавн в ближайшем тике движения
    pub respawn_requested: bool,
    /// Перемещение, закоммиченное последним тиком
    pub last_displacement: Vec3,
}

impl Default for MovementState {
    fn default() -> Self {
        Self::new(0, 0.0)
    }
}

impl MovementState {
    pub fn new(air_jumps: u32, yaw: f32) -> Self {
        Self {
            velocity: Vec3::ZERO,
            yaw,
            pitch: 0.0,
            wish_dir: Vec3::ZERO,
            mode: MovementMode::Air,
            grounded: false,
            grounded_last_tick: false,
            air_jumps_remaining: air_jumps,
            wall_run_timer: 0.0,
            wall_run_direction: Vec3::ZERO,
            wall_normal: Vec3::ZERO,
            wall_run_cast: Vec3::ZERO,
            camera_tilt_target: 0.0,
            gravity_disable_timer: 0.0,
            pending_force: Vec3::ZERO,
            override_vertical: false,
            respawn_requested: false,
            last_displacement: Vec3::ZERO,
        }
    }

    // ------------------------------------------------------------------------
    // Force / timer API (экипировка + interactables)
    // ------------------------------------------------------------------------

    /// Копит силу до следующего тика. `reset_vertical_velocity` взводит флаг
    /// "не дать земле съесть вертикальный импульс" (только взводит, не сбрасывает).
    pub fn apply_force(&mut self, force: Vec3, reset_vertical_velocity: bool) {
        self.pending_force += force;
        self.override_vertical |= reset_vertical_velocity;
    }

    /// Обрывает wall-run и запускает окно cooldown с нуля
    pub fn force_wall_run_cooldown(&mut self) {
        self.wall_run_timer = 0.0;
    }

    pub fn disable_gravity_for_seconds(&mut self, seconds: f32) {
        self.gravity_disable_timer = seconds;
    }

    pub fn is_wall_running(&self) -> bool {
        self.wall_run_timer > 0.0
    }

    pub fn is_gravity_disabled(&self) -> bool {
        self.gravity_disable_timer > 0.0
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn wish_dir(&self) -> Vec3 {
        self.wish_dir
    }

    /// Поворот тела (только yaw)
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn facing(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn right(&self) -> Vec3 {
        self.rotation() * Vec3::X
    }

    /// Направление взгляда камеры (yaw + pitch)
    pub fn look_vector(&self) -> Vec3 {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0) * Vec3::NEG_Z
    }
}

/// Сырой input персонажа (заполняется input системой)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct CharacterInput {
    /// x = strafe (+ вправо), y = forward (+ вперёд)
    pub move_axis: Vec2,
    pub jump_held: bool,
    /// Один прыжок в воздухе на одно нажатие
    pub jumped_this_input: bool,
}

/// Точка респавна (чекпоинты меняют `position`/`yaw`, new game - возвращает initial)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct SpawnPoint {
    pub position: Vec3,
    pub yaw: f32,
    pub initial_position: Vec3,
    pub initial_yaw: f32,
}

impl SpawnPoint {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            yaw,
            initial_position: position,
            initial_yaw: yaw,
        }
    }

    pub fn set_spawn(&mut self, position: Vec3, yaw: f32) {
        self.position = position;
        self.yaw = yaw;
    }

    pub fn reset_to_initial(&mut self) {
        self.position = self.initial_position;
        self.yaw = self.initial_yaw;
    }
}

/// Camera-relative wish direction из сырого move axis
pub fn wish_direction(move_axis: Vec2, yaw: f32) -> Vec3 {
    let local = Vec3::new(move_axis.x, 0.0, -move_axis.y).normalize_or_zero();
    Quat::from_rotation_y(yaw) * local
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_force_accumulates_and_only_arms_override() {
        let mut state = MovementState::new(1, 0.0);

        state.apply_force(Vec3::X, true);
        state.apply_force(Vec3::Y * 2.0, false);

        assert_eq!(state.pending_force, Vec3::new(1.0, 2.0, 0.0));
        assert!(state.override_vertical, "later call must not disarm the flag");
    }

    #[test]
    fn test_force_wall_run_cooldown_ends_run() {
        let mut state = MovementState::new(1, 0.0);
        state.wall_run_timer = 0.8;

        state.force_wall_run_cooldown();

        assert!(!state.is_wall_running());
        assert_eq!(state.wall_run_timer, 0.0);
    }

    #[test]
    fn test_facing_and_look_follow_yaw() {
        let mut state = MovementState::new(0, 0.0);
        assert!((state.facing() - Vec3::NEG_Z).length() < 1e-5);
        assert!((state.right() - Vec3::X).length() < 1e-5);

        state.yaw = std::f32::consts::PI;
        assert!((state.facing() - Vec3::Z).length() < 1e-5);

        state.yaw = 0.0;
        state.pitch = std::f32::consts::FRAC_PI_2;
        assert!((state.look_vector() - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_wish_direction_rotates_by_yaw() {
        assert!((wish_direction(Vec2::Y, 0.0) - Vec3::NEG_Z).length() < 1e-5);
        assert!((wish_direction(Vec2::Y, std::f32::consts::PI) - Vec3::Z).length() < 1e-5);
        assert!((wish_direction(Vec2::new(1.0, 1.0), 0.0).length() - 1.0).abs() < 1e-5);
        assert_eq!(wish_direction(Vec2::ZERO, 1.0), Vec3::ZERO);
    }

    #[test]
    fn test_spawn_point_reset() {
        let mut spawn = SpawnPoint::new(Vec3::ONE, 0.5);
        spawn.set_spawn(Vec3::new(10.0, 2.0, 0.0), 1.0);
        assert_eq!(spawn.position, Vec3::new(10.0, 2.0, 0.0));

        spawn.reset_to_initial();
        assert_eq!(spawn.position, Vec3::ONE);
        assert_eq!(spawn.yaw, 0.5);
    }
}
