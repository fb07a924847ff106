use bevy::input::mouse::{MouseMotion, MouseWheel};
use bevy::prelude::*;
use lockon_simulation::{ControlRotation, LockOnConfig, LockOnView, LockSession, Player};

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (follow_camera_controls, update_camera_transform, publish_lock_on_view).chain(),
        );
    }
}

/// Third-person камера за игроком (направление = ControlRotation игрока)
#[derive(Component)]
pub struct FollowCamera {
    pub distance: f32,
    pub height: f32,
    pub sensitivity: f32,
    pub zoom_speed: f32,
}

impl Default for FollowCamera {
    fn default() -> Self {
        Self {
            distance: 6.0,
            height: 1.0,
            sensitivity: 0.15, // градусов на пиксель
            zoom_speed: 0.5,
        }
    }
}

/// Mouse look пока нет lock (когда залочены, ControlRotation крутит lock-on)
fn follow_camera_controls(
    mut cameras: Query<&mut FollowCamera>,
    mut players: Query<(&mut ControlRotation, &LockSession), With<Player>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut mouse_wheel: EventReader<MouseWheel>,
) {
    let Ok(mut camera) = cameras.single_mut() else {
        return;
    };

    if let Ok((mut control, session)) = players.single_mut() {
        if !session.is_locked() {
            for motion in mouse_motion.read() {
                control.yaw -= motion.delta.x * camera.sensitivity;
                control.pitch = (control.pitch - motion.delta.y * camera.sensitivity).clamp(-80.0, 80.0);
            }
        }
    }

    // Mouse wheel: zoom
    for wheel in mouse_wheel.read() {
        camera.distance = (camera.distance - wheel.y * camera.zoom_speed).clamp(2.0, 20.0);
    }
}

/// Камера за спиной игрока по направлению ControlRotation
fn update_camera_transform(
    players: Query<(&Transform, &ControlRotation, &LockOnConfig), With<Player>>,
    mut cameras: Query<(&FollowCamera, &mut Transform), Without<Player>>,
) {
    let Ok((player_transform, control, config)) = players.single() else {
        return;
    };

    let eye = player_transform.translation + Vec3::Y * config.eye_height;
    for (camera, mut transform) in cameras.iter_mut() {
        let position = eye - control.forward() * camera.distance + Vec3::Y * camera.height;
        *transform = Transform::from_translation(position).with_rotation(control.to_quat());
    }
}

/// Пишет pose и perspective камеры в LockOnView игрока (viewport фильтр кандидатов)
fn publish_lock_on_view(
    cameras: Query<(&Transform, &Projection), With<FollowCamera>>,
    mut players: Query<&mut LockOnView, With<Player>>,
) {
    let Ok((transform, projection)) = cameras.single() else {
        return;
    };

    for mut view in players.iter_mut() {
        view.transform = *transform;
        if let Projection::Perspective(perspective) = projection {
            view.fov_y = perspective.fov;
            view.aspect_ratio = perspective.aspect_ratio;
            view.near = perspective.near;
        }
    }
}
