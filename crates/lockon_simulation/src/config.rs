//! LockOnConfig: параметры target lock-on системы
//!
//! Задаётся один раз при спавне персонажа, read-only во время сессии.
//! Может грузиться из JSON (все поля опциональны, пропуски → Default).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::components::CharacterOrientation;
use crate::geometry::ControlRotation;
use crate::lock::LockSession;

/// Фильтр классов акторов, на которые можно залочиться
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, Reflect)]
#[serde(rename_all = "snake_case")]
pub enum TargetClassFilter {
    /// Любой актор с `Targetable`
    #[default]
    Any,
    /// Только перечисленные классы (TargetClass.0)
    OneOf(Vec<String>),
}

impl TargetClassFilter {
    pub fn only(class: impl Into<String>) -> Self {
        Self::OneOf(vec![class.into()])
    }

    pub fn matches(&self, class: &str) -> bool {
        match self {
            TargetClassFilter::Any => true,
            TargetClassFilter::OneOf(classes) => classes.iter().any(|c| c == class),
        }
    }
}

/// Откуда считаем look-at rotation: от глаз персонажа или от камеры
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Reflect)]
#[serde(rename_all = "snake_case")]
pub enum RotationBasis {
    #[default]
    Character,
    Camera,
}

/// Параметры lock-on индикатора (presentation adapter)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[serde(default)]
pub struct IndicatorConfig {
    /// Смещение индикатора относительно target (world units)
    pub relative_location: [f32; 3],
    /// Размер индикатора на экране
    pub draw_size: f32,
    /// Кость/сокет для attach (None → root target'а)
    pub parent_socket: Option<String>,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            relative_location: [0.0, 1.2, 0.0],
            draw_size: 32.0,
            parent_socket: None,
        }
    }
}

/// Параметры lock-on (per character)
///
/// Два разных порога:
/// - `start_rotating_threshold`: порог |axis_value × delta| для switch input
/// - `switch_angle_threshold`: минимальное отклонение кандидата (градусы) для switch
///
/// Вешается на персонажа: Required Components добавят LockSession,
/// ControlRotation и CharacterOrientation.
#[derive(Component, Debug, Clone, PartialEq, Serialize, Deserialize, Reflect)]
#[reflect(Component)]
#[require(LockSession, ControlRotation, CharacterOrientation, Transform)]
#[serde(default)]
pub struct LockOnConfig {
    /// Минимальная дистанция для lock (включительно)
    pub minimum_distance_to_enable: f32,
    /// Максимальная дистанция engage; дальше: lock off
    pub maximum_distance: f32,
    /// Какие классы акторов можно таргетить
    pub targetable_classes: TargetClassFilter,
    /// Минимальный угол кандидата (градусы) при switch
    pub switch_angle_threshold: f32,
    /// Порог axis input для switch (чем ниже: тем легче переключить)
    pub start_rotating_threshold: f32,
    /// Сколько секунд target может быть за препятствием до lock off
    pub line_of_sight_break_delay: f32,
    /// Блокировка повторного switch (секунды)
    pub switch_lockout_delay: f32,
    /// Высота глаз персонажа над Transform.translation
    pub eye_height: f32,

    /// Pitch compensation: (distance × coefficient + offset) × -1, clamp [pitch_min, pitch_max]
    pub adjust_pitch_based_on_distance: bool,
    pub pitch_distance_coefficient: f32,
    pub pitch_distance_offset: f32,
    pub pitch_min: f32,
    pub pitch_max: f32,

    /// Поворачивать control rotation к target каждый tick
    pub enable_rotation_control: bool,
    /// Strafe режим: orient-to-controller ON, orient-to-movement OFF пока locked
    pub should_control_rotation: bool,
    pub rotation_basis: RotationBasis,
    /// Скорость интерполяции control rotation (<= 0 → snap)
    pub rotation_interp_speed: f32,

    /// Автоматически вешать LockedOnIndicator на target
    pub draw_indicator: bool,
    pub indicator: IndicatorConfig,
}

impl Default for LockOnConfig {
    fn default() -> Self {
        Self {
            minimum_distance_to_enable: 0.0,
            maximum_distance: 12.0,
            targetable_classes: TargetClassFilter::Any,
            switch_angle_threshold: 5.0,
            start_rotating_threshold: 0.85,
            line_of_sight_break_delay: 2.0,
            switch_lockout_delay: 0.5,
            eye_height: 0.8,
            adjust_pitch_based_on_distance: false,
            pitch_distance_coefficient: -0.2,
            pitch_distance_offset: 90.0,
            pitch_min: -50.0,
            pitch_max: -20.0,
            enable_rotation_control: true,
            should_control_rotation: false,
            rotation_basis: RotationBasis::Character,
            rotation_interp_speed: 9.0,
            draw_indicator: true,
            indicator: IndicatorConfig::default(),
        }
    }
}

/// Ошибки загрузки/валидации LockOnConfig
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse lock-on config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid engage range: minimum {min} > maximum {max}")]
    InvalidRange { min: f32, max: f32 },

    #[error("`{field}` must be >= 0, got {value}")]
    NegativeDelay { field: &'static str, value: f32 },

    #[error("invalid pitch clamp: pitch_min {min} > pitch_max {max}")]
    InvalidPitchClamp { min: f32, max: f32 },

    #[error("`{field}` must be a finite value >= 0, got {value}")]
    InvalidThreshold { field: &'static str, value: f32 },
}

impl LockOnConfig {
    /// Парсинг + валидация из JSON
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: LockOnConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_string(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.minimum_distance_to_enable <= self.maximum_distance) {
            return Err(ConfigError::InvalidRange {
                min: self.minimum_distance_to_enable,
                max: self.maximum_distance,
            });
        }

        for (field, value) in [
            ("line_of_sight_break_delay", self.line_of_sight_break_delay),
            ("switch_lockout_delay", self.switch_lockout_delay),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::NegativeDelay { field, value });
            }
        }

        for (field, value) in [
            ("switch_angle_threshold", self.switch_angle_threshold),
            ("start_rotating_threshold", self.start_rotating_threshold),
            ("minimum_distance_to_enable", self.minimum_distance_to_enable),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidThreshold { field, value });
            }
        }

        if !(self.pitch_min <= self.pitch_max) {
            return Err(ConfigError::InvalidPitchClamp {
                min: self.pitch_min,
                max: self.pitch_max,
            });
        }

        Ok(())
    }
}
