use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use lockon_simulation::{CharacterOrientation, ControlRotation, LockOnRequest, LockSession, Player};

pub struct PlayerInputPlugin;

impl Plugin for PlayerInputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<InputSettings>()
            .add_systems(Update, (lock_on_input, switch_target_input, move_player).chain());
    }
}

#[derive(Resource)]
pub struct InputSettings {
    /// Пикселей mouse motion за кадр на axis = 1.0
    pub switch_pixels_per_unit: f32,
    pub move_speed: f32,
    /// Градусов в секунду (orient rotation to movement)
    pub turn_speed: f32,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            switch_pixels_per_unit: 40.0,
            move_speed: 4.0,
            turn_speed: 540.0,
        }
    }
}

/// Tab: toggle lock, Escape: unlock
fn lock_on_input(
    keys: Res<ButtonInput<KeyCode>>,
    players: Query<Entity, With<Player>>,
    mut requests: EventWriter<LockOnRequest>,
) {
    for player in players.iter() {
        if keys.just_pressed(KeyCode::Tab) {
            requests.write(LockOnRequest::toggle(player));
        }
        if keys.just_pressed(KeyCode::Escape) {
            requests.write(LockOnRequest::unlock(player));
        }
    }
}

/// Q/E и горизонтальный mouse motion (пока залочены) → axis switch
fn switch_target_input(
    keys: Res<ButtonInput<KeyCode>>,
    settings: Res<InputSettings>,
    players: Query<(Entity, &LockSession), With<Player>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut requests: EventWriter<LockOnRequest>,
) {
    let motion_x: f32 = mouse_motion.read().map(|motion| motion.delta.x).sum();

    for (player, session) in players.iter() {
        if !session.is_locked() {
            continue;
        }

        if keys.just_pressed(KeyCode::KeyQ) {
            requests.write(LockOnRequest::axis(player, -1.0));
        } else if keys.just_pressed(KeyCode::KeyE) {
            requests.write(LockOnRequest::axis(player, 1.0));
        } else if motion_x != 0.0 {
            // Порог решает lock-on (start_rotating_threshold)
            let axis = (motion_x / settings.switch_pixels_per_unit).clamp(-1.0, 1.0);
            requests.write(LockOnRequest::axis(player, axis));
        }
    }
}

/// WASD относительно yaw ControlRotation
///
/// orient_rotation_to_movement → тело разворачивается по направлению движения.
/// В strafe режиме тело крутит lock-on (sync_character_orientation).
fn move_player(
    keys: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
    settings: Res<InputSettings>,
    mut players: Query<(&mut Transform, &ControlRotation, &CharacterOrientation), With<Player>>,
) {
    let mut input = Vec2::ZERO;
    if keys.pressed(KeyCode::KeyW) {
        input.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        input.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        input.x += 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        input.x -= 1.0;
    }
    if input == Vec2::ZERO {
        return;
    }

    for (mut transform, control, orientation) in players.iter_mut() {
        let yaw = Quat::from_rotation_y(control.yaw.to_radians());
        let forward = yaw * Vec3::NEG_Z;
        let right = yaw * Vec3::X;
        let direction = (forward * input.y + right * input.x).normalize_or_zero();

        transform.translation += direction * settings.move_speed * time.delta_secs();

        if orientation.orient_rotation_to_movement && direction != Vec3::ZERO {
            let target = Transform::default().looking_to(direction, Vec3::Y).rotation;
            let max_step = (settings.turn_speed * time.delta_secs()).to_radians();
            let angle = transform.rotation.angle_between(target);
            let t = if angle <= max_step { 1.0 } else { max_step / angle };
            transform.rotation = transform.rotation.slerp(target, t);
        }
    }
}
