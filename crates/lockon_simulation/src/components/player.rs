//! Player control marker component

use bevy::prelude::Component;

/// Marker component для player-controlled entity
///
/// Input системы клиента адресуют LockOnRequest только entity с этим маркером.
/// В single-player режиме обычно только один entity имеет этот компонент.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;
