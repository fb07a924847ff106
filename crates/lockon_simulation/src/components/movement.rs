//! Movement компоненты: ориентация персонажа относительно controller/движения

use bevy::prelude::*;

/// Флаги ориентации персонажа
///
/// - `orient_rotation_to_movement`: тело поворачивается по направлению движения
/// - `use_controller_rotation_yaw`: тело повторяет yaw ControlRotation (strafe вокруг target)
///
/// Lock-on (при `should_control_rotation`) переключает оба флага на время lock
/// и восстанавливает прежние значения при unlock.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct CharacterOrientation {
    pub orient_rotation_to_movement: bool,
    pub use_controller_rotation_yaw: bool,
}

impl Default for CharacterOrientation {
    fn default() -> Self {
        Self {
            orient_rotation_to_movement: true,
            use_controller_rotation_yaw: false,
        }
    }
}

impl CharacterOrientation {
    /// Strafe режим: тело смотрит туда же, куда controller
    pub const STRAFE: Self = Self {
        orient_rotation_to_movement: false,
        use_controller_rotation_yaw: true,
    };
}
