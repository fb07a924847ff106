//! Presentation adapter: LockedOnIndicator на текущей цели
//!
//! Индикатор: просто компонент на target entity. Client рисует его
//! (gizmo/UI), headless сценарий только проверяет наличие.
//!
//! TargetLockChanged читается в порядке возникновения, и каждое решение
//! сверяется с текущим LockSession: unlock + lock в одном tick не оставляет
//! висящих индикаторов.

use bevy::prelude::*;

use super::events::TargetLockChanged;
use super::state::LockSession;
use crate::config::LockOnConfig;

/// Lock-on индикатор на target
#[derive(Component, Debug, Clone, PartialEq, Reflect)]
#[reflect(Component)]
pub struct LockedOnIndicator {
    /// Кто залочен на этот target
    pub owner: Entity,
    /// Смещение относительно target
    pub relative_location: Vec3,
    pub draw_size: f32,
    /// Сокет для attach (None → root)
    pub parent_socket: Option<String>,
}

impl LockedOnIndicator {
    pub fn from_config(owner: Entity, config: &LockOnConfig) -> Self {
        Self {
            owner,
            relative_location: Vec3::from_array(config.indicator.relative_location),
            draw_size: config.indicator.draw_size,
            parent_socket: config.indicator.parent_socket.clone(),
        }
    }

    /// World позиция индикатора для target с данным Transform
    pub fn world_position(&self, target: &Transform) -> Vec3 {
        target.translation + self.relative_location
    }
}

/// System: attach/detach LockedOnIndicator по TargetLockChanged
pub fn update_lock_indicators(
    mut commands: Commands,
    mut changes: EventReader<TargetLockChanged>,
    sessions: Query<(&LockSession, &LockOnConfig)>,
    indicators: Query<&LockedOnIndicator>,
) {
    for event in changes.read() {
        let Ok(mut target) = commands.get_entity(event.target) else {
            continue;
        };
        let session = sessions.get(event.owner).ok();
        let still_locked = session.is_some_and(|(session, _)| session.target() == Some(event.target));

        if !event.locked {
            let owned = indicators
                .get(event.target)
                .is_ok_and(|indicator| indicator.owner == event.owner);
            if owned && !still_locked {
                target.try_remove::<LockedOnIndicator>();
            }
            continue;
        }

        let Some((_, config)) = session else {
            continue;
        };
        if config.draw_indicator && still_locked {
            target.try_insert(LockedOnIndicator::from_config(event.owner, config));
            crate::log(&format!(
                "🔶 LockOn: indicator on {:?} (owner {:?})",
                event.target, event.owner
            ));
        }
    }
}
