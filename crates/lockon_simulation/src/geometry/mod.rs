//! Geometry utilities: чистые функции для targeting
//!
//! Координаты Bevy: Y вверх, forward = -Z, right = +X.
//! Углы в градусах. Yaw: поворот вокруг +Y, положительный pitch смотрит вверх.
//!
//! Все функции детерминированы и не возвращают NaN на вырожденных входах
//! (совпадающие точки, нулевые векторы): вместо этого 0 / ControlRotation::ZERO.

use bevy::prelude::*;

use crate::components::LockOnView;


/// Порог вырожденности (квадрат длины вектора)
const DEGENERATE_EPSILON: f32 = 1.0e-8;

/// Control rotation персонажа/камеры (yaw/pitch, roll всегда 0)
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct ControlRotation {
    pub yaw: f32,
    pub pitch: f32,
}

impl ControlRotation {
    pub const ZERO: Self = Self { yaw: 0.0, pitch: 0.0 };

    pub fn new(yaw: f32, pitch: f32) -> Self {
        Self { yaw, pitch }
    }

    pub fn to_quat(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw.to_radians(), self.pitch.to_radians(), 0.0)
    }

    /// Направление взгляда (unit vector)
    pub fn forward(&self) -> Vec3 {
        self.to_quat() * Vec3::NEG_Z
    }

    /// Оба угла приведены к (-180, 180]
    pub fn normalized(&self) -> Self {
        Self {
            yaw: normalize_axis(self.yaw),
            pitch: normalize_axis(self.pitch),
        }
    }
}

/// Евклидово расстояние между двумя world позициями
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// Yaw/pitch, при котором forward в `from` смотрит на `to` (roll = 0)
pub fn look_at_rotation(from: Vec3, to: Vec3) -> ControlRotation {
    let dir = to - from;
    if dir.length_squared() <= DEGENERATE_EPSILON {
        return ControlRotation::ZERO;
    }

    let horizontal = Vec2::new(dir.x, dir.z).length();
    let yaw = if horizontal <= DEGENERATE_EPSILON {
        0.0 // Строго вверх/вниз: yaw не определён
    } else {
        (-dir.x).atan2(-dir.z).to_degrees()
    };
    let pitch = dir.y.atan2(horizontal).to_degrees();

    ControlRotation { yaw, pitch }
}

/// Знаковый угол (градусы) между `forward` и направлением на кандидата
///
/// Считается в горизонтальной плоскости (XZ). Знак: left (-) / right (+).
/// Модуль в [0, 180].
pub fn angle_between(forward: Vec3, to_target: Vec3) -> f32 {
    let f = Vec2::new(forward.x, forward.z);
    let t = Vec2::new(to_target.x, to_target.z);
    if f.length_squared() <= DEGENERATE_EPSILON || t.length_squared() <= DEGENERATE_EPSILON {
        return 0.0;
    }

    let dot = f.dot(t);
    // -(f × t).y: положительно когда target справа (+X при forward = -Z)
    let side = f.x * t.y - f.y * t.x;
    side.atan2(dot).to_degrees()
}

/// Проекция `world_point` через view: true если точка перед камерой и внутри viewport
pub fn is_within_viewport(view: &LockOnView, world_point: Vec3) -> bool {
    let local = view.transform.rotation.inverse() * (world_point - view.transform.translation);

    // Камера смотрит в -Z: depth > 0 значит точка перед камерой
    let depth = -local.z;
    if !depth.is_finite() || depth < view.near.max(f32::EPSILON) {
        return false;
    }

    let tan_half_fov = (view.fov_y * 0.5).tan();
    if tan_half_fov <= 0.0 || view.aspect_ratio <= 0.0 {
        return false;
    }

    let ndc_y = local.y / (depth * tan_half_fov);
    let ndc_x = local.x / (depth * tan_half_fov * view.aspect_ratio);

    (-1.0..=1.0).contains(&ndc_x) && (-1.0..=1.0).contains(&ndc_y)
}

/// Приводит угол к (-180, 180]
pub fn normalize_axis(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let wrapped = angle.rem_euclid(360.0);
    if wrapped > 180.0 {
        wrapped - 360.0
    } else {
        wrapped
    }
}

/// Плавная интерполяция rotation по кратчайшему пути
///
/// Доля шага = clamp(delta_time × speed, 0, 1). `speed <= 0` → сразу `desired`.
pub fn interpolate_rotation(
    current: ControlRotation,
    desired: ControlRotation,
    delta_time: f32,
    speed: f32,
) -> ControlRotation {
    if speed <= 0.0 {
        return desired.normalized();
    }

    let delta_yaw = normalize_axis(desired.yaw - current.yaw);
    let delta_pitch = normalize_axis(desired.pitch - current.pitch);
    if delta_yaw.abs() < 1.0e-4 && delta_pitch.abs() < 1.0e-4 {
        return desired.normalized();
    }

    let alpha = (delta_time * speed).clamp(0.0, 1.0);
    ControlRotation {
        yaw: current.yaw + delta_yaw * alpha,
        pitch: current.pitch + delta_pitch * alpha,
    }
    .normalized()
}
