//! Rotation controller: control rotation к залоченной цели
//!
//! Desired rotation = look-at от basis origin (глаза персонажа или камера)
//! к traced point цели. Опционально pitch компенсация по дистанции
//! (дальние цели → взгляд ниже, ограничено [pitch_min, pitch_max]).
//!
//! Как применять rotation решает RotationHandler на персонаже:
//! - LookAt (default): интерполяция ControlRotation к desired
//! - Delegate: только TargetSetRotation event, хост крутит сам
//! - Custom: своя стратегия (RotationStrategy)

use std::fmt;
use std::sync::Arc;

use bevy::prelude::*;

use crate::config::{LockOnConfig, RotationBasis};
use crate::geometry::{interpolate_rotation, look_at_rotation, ControlRotation};
use crate::targeting::Viewer;

/// Pitch компенсация: `clamp((d × coefficient + offset) × -1, pitch_min, pitch_max)`
pub fn pitch_compensation(distance_to_target: f32, config: &LockOnConfig) -> f32 {
    let raw = (distance_to_target * config.pitch_distance_coefficient + config.pitch_distance_offset) * -1.0;
    raw.clamp(config.pitch_min, config.pitch_max)
}

/// Точка, от которой считается look-at (зависит от RotationBasis)
///
/// Camera basis без LockOnView → глаза персонажа.
pub fn rotation_origin(viewer: &Viewer, config: &LockOnConfig) -> Vec3 {
    match config.rotation_basis {
        RotationBasis::Character => viewer.eye,
        RotationBasis::Camera => viewer
            .view
            .map(|view| view.transform.translation)
            .unwrap_or(viewer.eye),
    }
}

/// Rotation, при которой взгляд из `viewer_origin` направлен на `target_point`
///
/// `character_distance`: дистанция персонаж → target (не от камеры), только для pitch компенсации.
pub fn desired_rotation(
    viewer_origin: Vec3,
    target_point: Vec3,
    character_distance: f32,
    config: &LockOnConfig,
) -> ControlRotation {
    let mut rotation = look_at_rotation(viewer_origin, target_point);

    if config.adjust_pitch_based_on_distance {
        rotation.pitch = pitch_compensation(character_distance, config);
    }

    rotation
}

/// Вход для стратегии поворота (один tick одной сессии)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationRequest {
    pub owner: Entity,
    pub target: Entity,
    /// Текущий ControlRotation персонажа
    pub current: ControlRotation,
    /// Look-at (с pitch компенсацией если включена)
    pub desired: ControlRotation,
    pub viewer_origin: Vec3,
    pub target_point: Vec3,
    pub delta: f32,
}

/// Пользовательская стратегия поворота (dash камеры, aim assist и т.п.)
pub trait RotationStrategy: Send + Sync + 'static {
    fn control_rotation(&self, request: &RotationRequest) -> ControlRotation;
}

/// Как персонаж применяет rotation к цели
#[derive(Component, Clone, Default)]
pub enum RotationHandler {
    /// Встроенная интерполяция ControlRotation
    #[default]
    LookAt,
    /// Ничего не трогаем, только TargetSetRotation event
    Delegate,
    Custom(Arc<dyn RotationStrategy>),
}

impl fmt::Debug for RotationHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationHandler::LookAt => write!(f, "LookAt"),
            RotationHandler::Delegate => write!(f, "Delegate"),
            RotationHandler::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

impl RotationHandler {
    pub fn custom(strategy: impl RotationStrategy) -> Self {
        Self::Custom(Arc::new(strategy))
    }
}

/// Решение rotation шага
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RotationCommand {
    /// Записать в ControlRotation
    Apply(ControlRotation),
    /// Отдать хосту через TargetSetRotation
    Delegate(ControlRotation),
}

impl RotationCommand {
    pub fn rotation(&self) -> ControlRotation {
        match self {
            RotationCommand::Apply(rotation) | RotationCommand::Delegate(rotation) => *rotation,
        }
    }
}

/// Разрешение RotationHandler (нет компонента = LookAt)
pub fn resolve_rotation(
    handler: Option<&RotationHandler>,
    request: &RotationRequest,
    config: &LockOnConfig,
) -> RotationCommand {
    match handler {
        None | Some(RotationHandler::LookAt) => RotationCommand::Apply(interpolate_rotation(
            request.current,
            request.desired,
            request.delta,
            config.rotation_interp_speed,
        )),
        Some(RotationHandler::Delegate) => RotationCommand::Delegate(request.desired),
        Some(RotationHandler::Custom(strategy)) => RotationCommand::Apply(strategy.control_rotation(request)),
    }
}
