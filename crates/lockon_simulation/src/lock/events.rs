//! Lock-on события: входные запросы и уведомления наружу
//!
//! Input/AI пишут LockOnRequest, lock система обрабатывает их в FixedUpdate
//! до per-tick evaluation. Хост читает TargetLocked*/TargetSetRotation, presentation и trace: TargetLockChanged.

use bevy::prelude::*;

use crate::geometry::ControlRotation;

/// Что хочет owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LockRequestKind {
    /// Acquisition (no-op если уже залочены на валидную видимую цель)
    Lock,
    Unlock,
    /// Lock если Unlocked, иначе Unlock
    Toggle,
    /// Switch по знаку `axis_value × delta` (порог start_rotating_threshold)
    AxisSwitch { axis_value: f32, delta: f32 },
}

/// Запрос к LockSession персонажа `owner`
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct LockOnRequest {
    pub owner: Entity,
    pub kind: LockRequestKind,
}

impl LockOnRequest {
    pub fn lock(owner: Entity) -> Self {
        Self {
            owner,
            kind: LockRequestKind::Lock,
        }
    }

    pub fn unlock(owner: Entity) -> Self {
        Self {
            owner,
            kind: LockRequestKind::Unlock,
        }
    }

    pub fn toggle(owner: Entity) -> Self {
        Self {
            owner,
            kind: LockRequestKind::Toggle,
        }
    }

    /// Axis switch с delta = 1 (input уже нормализован)
    pub fn axis(owner: Entity, axis_value: f32) -> Self {
        Self::axis_with_delta(owner, axis_value, 1.0)
    }

    pub fn axis_with_delta(owner: Entity, axis_value: f32, delta: f32) -> Self {
        Self {
            owner,
            kind: LockRequestKind::AxisSwitch { axis_value, delta },
        }
    }
}

/// Owner залочился на target (acquisition или вторая половина switch)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLockedOn {
    pub owner: Entity,
    pub target: Entity,
}

/// Owner отпустил target (unlock, потеря цели или первая половина switch)
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLockedOff {
    pub owner: Entity,
    pub target: Entity,
}

/// Смена lock в порядке возникновения (on/off одного канала)
///
/// При switch: сначала `locked: false` старой цели, затем `locked: true` новой.
/// Consumers, которым важен порядок (presentation, trace), читают этот event.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetLockChanged {
    pub owner: Entity,
    pub target: Entity,
    pub locked: bool,
}

/// Desired rotation к target для хоста (RotationHandler::Delegate)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct TargetSetRotation {
    pub owner: Entity,
    pub target: Entity,
    pub rotation: ControlRotation,
}
