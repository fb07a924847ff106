//! View pose component
//!
//! Хост (client camera system / headless сценарий) обновляет LockOnView каждый tick.
//! Lock-on использует его для viewport проверок и для RotationBasis::Camera.

use bevy::prelude::*;

/// Активная камера персонажа (pose + perspective параметры)
///
/// Вешается на entity с LockSession. Если компонента нет: viewport
/// фильтр не применяется (headless персонаж без камеры).
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct LockOnView {
    /// World transform камеры (forward = -Z)
    pub transform: Transform,
    /// Вертикальный FOV (радианы)
    pub fov_y: f32,
    /// width / height
    pub aspect_ratio: f32,
    /// Near plane (всё ближе: не на экране)
    pub near: f32,
}

impl Default for LockOnView {
    fn default() -> Self {
        Self {
            transform: Transform::IDENTITY,
            fov_y: std::f32::consts::FRAC_PI_3, // 60°
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
        }
    }
}

impl LockOnView {
    pub fn new(transform: Transform) -> Self {
        Self {
            transform,
            ..default()
        }
    }

    pub fn looking_at(eye: Vec3, target: Vec3) -> Self {
        Self::new(Transform::from_translation(eye).looking_at(target, Vec3::Y))
    }
}
