//! Режимы движения - чистые функции над перемещением за тик
//!
//! Все функции возвращают *перемещение* (velocity·dt), не скорость.
//! Гравитация, прыжок и clamp падения добавляются снаружи в `tick_movement`.

use bevy::prelude::*;

use crate::config::MovementParameters;

/// Горизонтальная часть вектора
pub fn lateral(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Ускорение к `input_dir` с ограничением проекции скорости на `max_velocity`
///
/// Проекция текущего перемещения на направление input'а + `acceleration·dt`
/// не превышает `max_velocity·dt` (излишек срезается, может стать отрицательным).
pub fn add_acceleration(
    input_dir: Vec3,
    current_velocity: Vec3,
    acceleration: f32,
    max_velocity: f32,
    dt: f32,
) -> Vec3 {
    let projected = (current_velocity * dt).dot(input_dir);
    let max_step = max_velocity * dt;
    let mut accel_step = acceleration * dt;

    if projected + accel_step > max_step {
        accel_step = max_step - projected;
    }

    current_velocity * dt + input_dir * accel_step
}

/// Трение: горизонтальная скорость теряет `speed·friction·dt`, не меньше нуля
pub fn apply_friction(velocity: Vec3, friction: f32, dt: f32) -> Vec3 {
    let horizontal = lateral(velocity);
    let speed = horizontal.length();
    if speed <= f32::EPSILON {
        return Vec3::new(0.0, velocity.y, 0.0);
    }

    let reduced = (speed - speed * friction * dt).max(0.0);
    let scaled = horizontal * (reduced / speed);
    Vec3::new(scaled.x, velocity.y, scaled.z)
}

pub fn ground_move(input_dir: Vec3, velocity: Vec3, params: &MovementParameters, dt: f32) -> Vec3 {
    let velocity = apply_friction(velocity, params.friction, dt);
    add_acceleration(
        input_dir,
        velocity,
        params.ground_acceleration,
        params.ground_max_velocity,
        dt,
    )
}

/// Air control: горизонтальное направление доворачивается к input'у
/// пропорционально `control·dot²·dt`, модуль горизонтальной скорости сохраняется.
pub fn air_move(input_dir: Vec3, velocity: Vec3, params: &MovementParameters, dt: f32) -> Vec3 {
    let vertical = velocity.y;
    let horizontal = lateral(velocity);
    let speed = horizontal.length();
    let mut direction = horizontal.normalize_or_zero();

    let alignment = direction.dot(input_dir);
    if alignment != 0.0 {
        let k = params.air_control * alignment * alignment * dt;
        direction = (direction + input_dir * k).normalize_or_zero();
    }

    let steered = Vec3::new(direction.x * speed, vertical, direction.z * speed);
    add_acceleration(
        input_dir,
        steered,
        params.air_acceleration,
        params.air_max_velocity,
        dt,
    )
}

/// Wall-run: вдоль стены не медленнее `wall_run_speed`, вертикаль как была
pub fn wall_run_move(velocity: Vec3, direction: Vec3, wall_run_speed: f32, dt: f32) -> Vec3 {
    let speed = lateral(velocity).length().max(wall_run_speed);
    direction * speed * dt + Vec3::Y * velocity.y * dt
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 0.02;

    #[test]
    fn test_friction_shrinks_magnitude_preserving_direction() {
        let velocity = Vec3::new(3.0, -1.0, 4.0); // |lateral| = 5
        let result = apply_friction(velocity, 6.0, DT);

        let expected = (5.0 - 5.0 * 6.0 * DT).max(0.0);
        assert!((lateral(result).length() - expected).abs() < 1e-5);
        assert!((lateral(result).normalize() - lateral(velocity).normalize()).length() < 1e-5);
        assert_eq!(result.y, -1.0);
    }

    #[test]
    fn test_friction_clamps_at_zero() {
        let result = apply_friction(Vec3::new(2.0, 0.0, 0.0), 100.0, DT);
        assert_eq!(lateral(result), Vec3::ZERO);
    }

    #[test]
    fn test_add_acceleration_caps_projected_speed() {
        let input = Vec3::Z;

        // Далеко от max: полное ускорение
        let step = add_acceleration(input, Vec3::ZERO, 4.0, 10.0, DT);
        assert!((step.z - 4.0 * DT).abs() < 1e-5);

        // У max: добавка срезается до max·dt
        let step = add_acceleration(input, Vec3::Z * 9.0, 4.0, 10.0, DT);
        assert!((step.z - 10.0 * DT).abs() < 1e-5);

        // Поперёк input'а скорость не режется
        let step = add_acceleration(input, Vec3::X * 20.0, 4.0, 10.0, DT);
        assert!((step.x - 20.0 * DT).abs() < 1e-5);
        assert!((step.z - 4.0 * DT).abs() < 1e-5);
    }

    #[test]
    fn test_air_move_preserves_vertical_and_steers() {
        let params = MovementParameters::default();
        let velocity = Vec3::new(1.0, 3.0, 1.0); // ниже air max
        let input = Vec3::new(0.0, 0.0, 1.0);

        let step = air_move(input, velocity, &params, DT);

        assert!((step.y - 3.0 * DT).abs() < 1e-5);
        // Направление повернулось к +Z
        let before = lateral(velocity).normalize();
        let after = lateral(step).normalize();
        assert!(after.dot(input) > before.dot(input));
    }

    #[test]
    fn test_air_move_without_horizontal_speed_only_accelerates() {
        let params = MovementParameters::default();
        let step = air_move(Vec3::X, Vec3::new(0.0, -2.0, 0.0), &params, DT);

        assert!((step.x - params.air_acceleration * DT).abs() < 1e-5);
        assert!((step.y + 2.0 * DT).abs() < 1e-5);
    }

    #[test]
    fn test_wall_run_move_enforces_minimum_speed() {
        let slow = wall_run_move(Vec3::new(1.0, 0.5, 0.0), Vec3::Z, 14.0, DT);
        assert!((slow.z - 14.0 * DT).abs() < 1e-5);
        assert!((slow.y - 0.5 * DT).abs() < 1e-5);

        let fast = wall_run_move(Vec3::new(20.0, 0.0, 0.0), Vec3::Z, 14.0, DT);
        assert!((fast.z - 20.0 * DT).abs() < 1e-5);
    }
}
