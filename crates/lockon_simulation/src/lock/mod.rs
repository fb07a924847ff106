//! Lock-on: state machine, rotation controller, ECS обвязка
//!
//! Архитектура:
//! - state: LockSession (sum type, таймеры внутри фаз)
//! - machine: чистые операции (request_lock/unlock/toggle/axis_switch, tick)
//! - rotation: desired rotation + RotationHandler
//! - scene/systems: ECS SceneQuery и FixedUpdate driver
//! - presentation: LockedOnIndicator на текущей цели

use bevy::prelude::*;

pub mod events;
pub mod machine;
pub mod presentation;
pub mod rotation;
pub mod scene;
pub mod state;
pub mod systems;


pub use events::*;
pub use machine::{LockContext, LockEvent, LockedTarget, UnlockReason};
pub use presentation::LockedOnIndicator;
pub use rotation::{RotationCommand, RotationHandler, RotationRequest, RotationStrategy};
pub use scene::EcsScene;
pub use state::{LockPhase, LockSession, LockState};

/// Чем проверяется line of sight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineOfSightBackend {
    /// Occluder volumes (без физики, headless)
    #[default]
    Occluders,
    /// bevy_rapier3d raycast (нужен RapierPhysicsPlugin)
    Rapier,
}

/// Все lock-on системы FixedUpdate (для ordering снаружи: движение целей `.before`)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockOnSystems;

/// Lock-on plugin
///
/// Регистрирует events и FixedUpdate chain:
/// driver → sync_character_orientation → update_lock_indicators.
#[derive(Debug, Clone, Copy, Default)]
pub struct LockOnPlugin {
    pub line_of_sight: LineOfSightBackend,
}

impl Plugin for LockOnPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<LockOnRequest>()
            .add_event::<TargetLockedOn>()
            .add_event::<TargetLockedOff>()
            .add_event::<TargetLockChanged>()
            .add_event::<TargetSetRotation>();

        match self.line_of_sight {
            LineOfSightBackend::Occluders => {
                app.add_systems(
                    FixedUpdate,
                    (
                        systems::drive_lock_sessions_with_occluders,
                        systems::sync_character_orientation,
                        presentation::update_lock_indicators,
                    )
                        .chain()
                        .in_set(LockOnSystems),
                );
            }
            LineOfSightBackend::Rapier => {
                app.add_systems(
                    FixedUpdate,
                    (
                        systems::drive_lock_sessions_with_rapier,
                        systems::sync_character_orientation,
                        presentation::update_lock_indicators,
                    )
                        .chain()
                        .in_set(LockOnSystems),
                );
            }
        }

        crate::log(&format!("🎯 LockOnPlugin: line of sight via {:?}", self.line_of_sight));
    }
}
