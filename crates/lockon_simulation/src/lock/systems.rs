//! Lock-on ECS systems
//!
//! Порядок внутри FixedUpdate (chain):
//! 1. drive_lock_sessions_*: запросы этого tick → per-tick evaluation → rotation
//! 2. sync_character_orientation: yaw тела следует за ControlRotation (strafe)
//! 3. presentation::update_lock_indicators
//!
//! Два варианта driver системы отличаются только VisibilityProbe бэкендом.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::events::{
    LockOnRequest, LockRequestKind, TargetLockChanged, TargetLockedOff, TargetLockedOn, TargetSetRotation,
};
use super::machine::{
    apply_orientation, request_axis_switch, request_lock, request_toggle, request_unlock, tick, LockContext,
    LockEvent,
};
use super::rotation::{desired_rotation, resolve_rotation, rotation_origin, RotationHandler, RotationRequest, RotationCommand};
use super::scene::EcsScene;
use super::state::LockSession;
use crate::components::{CharacterOrientation, LockOnView};
use crate::config::LockOnConfig;
use crate::geometry::ControlRotation;
use crate::targeting::Viewer;
use crate::visibility::{OccluderLineOfSight, RapierLineOfSight, VisibilityProbe};

/// Персонаж с lock-on (всё, что трогает driver)
pub type SessionData = (
    Entity,
    &'static Transform,
    &'static LockOnConfig,
    &'static mut LockSession,
    Option<&'static mut CharacterOrientation>,
    Option<&'static mut ControlRotation>,
    Option<&'static RotationHandler>,
    Option<&'static LockOnView>,
);

/// Writers для уведомлений state machine
#[derive(SystemParam)]
pub struct LockEventWriters<'w> {
    locked_on: EventWriter<'w, TargetLockedOn>,
    locked_off: EventWriter<'w, TargetLockedOff>,
    changed: EventWriter<'w, TargetLockChanged>,
    set_rotation: EventWriter<'w, TargetSetRotation>,
}

impl LockEventWriters<'_> {
    /// Переносит накопленные LockEvent в Bevy events
    ///
    /// Порядок между on и off сохраняется только в TargetLockChanged.
    fn forward(&mut self, owner: Entity, events: &mut Vec<LockEvent>) {
        for event in events.drain(..) {
            match event {
                LockEvent::LockedOn(target) => {
                    self.locked_on.write(TargetLockedOn { owner, target });
                    self.changed.write(TargetLockChanged {
                        owner,
                        target,
                        locked: true,
                    });
                }
                LockEvent::LockedOff(target) => {
                    self.locked_off.write(TargetLockedOff { owner, target });
                    self.changed.write(TargetLockChanged {
                        owner,
                        target,
                        locked: false,
                    });
                }
            }
        }
    }
}

fn viewer_of(entity: Entity, transform: &Transform, config: &LockOnConfig, view: Option<&LockOnView>) -> Viewer {
    let viewer = Viewer::new(entity, transform.translation, config.eye_height);
    match view {
        Some(view) => viewer.with_view(*view),
        None => viewer,
    }
}

/// Общий driver: сначала запросы, затем tick каждой сессии
fn drive_lock_sessions(
    scene: &EcsScene,
    probe: &impl VisibilityProbe,
    requests: &mut EventReader<LockOnRequest>,
    sessions: &mut Query<SessionData>,
    delta: f32,
    writers: &mut LockEventWriters,
) {
    let mut events = Vec::new();

    for request in requests.read() {
        let Ok((entity, transform, config, mut session, orientation, _, _, view)) = sessions.get_mut(request.owner)
        else {
            crate::log_warning(&format!(
                "⚠️ LockOn: {:?} request for {:?} without LockSession/LockOnConfig, dropped",
                request.kind, request.owner
            ));
            continue;
        };

        let ctx = LockContext {
            config,
            viewer: viewer_of(entity, transform, config, view),
            scene,
            probe,
        };

        match request.kind {
            LockRequestKind::Lock => {
                request_lock(&ctx, &mut session, &mut events);
            }
            LockRequestKind::Unlock => {
                request_unlock(&mut session, &mut events);
            }
            LockRequestKind::Toggle => {
                request_toggle(&ctx, &mut session, &mut events);
            }
            LockRequestKind::AxisSwitch { axis_value, delta } => {
                request_axis_switch(&ctx, &mut session, axis_value, delta, &mut events);
            }
        }

        if let Some(mut orientation) = orientation {
            apply_orientation(&mut session, config, &mut orientation);
        }
        writers.forward(entity, &mut events);
    }

    for (entity, transform, config, mut session, orientation, control, handler, view) in sessions.iter_mut() {
        if !session.is_locked() && session.saved_orientation.is_none() {
            continue;
        }

        let viewer = viewer_of(entity, transform, config, view);
        let ctx = LockContext {
            config,
            viewer,
            scene,
            probe,
        };

        let locked = tick(&ctx, &mut session, delta, &mut events);
        if let Some(mut orientation) = orientation {
            apply_orientation(&mut session, config, &mut orientation);
        }
        writers.forward(entity, &mut events);

        // (3) Rotation: только для валидной цели, пережившей validity/visibility
        let Some(locked) = locked else {
            continue;
        };
        if !config.enable_rotation_control {
            continue;
        }

        let viewer_origin = rotation_origin(&viewer, config);
        let request = RotationRequest {
            owner: entity,
            target: locked.target,
            current: control.as_deref().copied().unwrap_or_default(),
            desired: desired_rotation(viewer_origin, locked.traced_point, locked.distance, config),
            viewer_origin,
            target_point: locked.traced_point,
            delta,
        };

        let command = resolve_rotation(handler, &request, config);
        if let (RotationCommand::Apply(rotation), Some(mut control)) = (command, control) {
            *control = rotation;
        }
        writers.set_rotation.write(TargetSetRotation {
            owner: entity,
            target: locked.target,
            rotation: command.rotation(),
        });
    }
}

/// Driver с Occluder volumes (headless default)
pub fn drive_lock_sessions_with_occluders(
    scene: EcsScene,
    probe: OccluderLineOfSight,
    mut requests: EventReader<LockOnRequest>,
    mut sessions: Query<SessionData>,
    time: Res<Time<Fixed>>,
    mut writers: LockEventWriters,
) {
    drive_lock_sessions(
        &scene,
        &probe,
        &mut requests,
        &mut sessions,
        time.delta_secs(),
        &mut writers,
    );
}

/// Driver с Rapier raycast
pub fn drive_lock_sessions_with_rapier(
    scene: EcsScene,
    probe: RapierLineOfSight,
    mut requests: EventReader<LockOnRequest>,
    mut sessions: Query<SessionData>,
    time: Res<Time<Fixed>>,
    mut writers: LockEventWriters,
) {
    drive_lock_sessions(
        &scene,
        &probe,
        &mut requests,
        &mut sessions,
        time.delta_secs(),
        &mut writers,
    );
}

/// Strafe: тело персонажа поворачивается по yaw ControlRotation
pub fn sync_character_orientation(
    mut characters: Query<(&CharacterOrientation, &ControlRotation, &mut Transform), With<LockOnConfig>>,
) {
    for (orientation, control, mut transform) in characters.iter_mut() {
        if orientation.use_controller_rotation_yaw {
            transform.rotation = Quat::from_rotation_y(control.yaw.to_radians());
        }
    }
}
