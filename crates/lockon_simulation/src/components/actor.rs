//! Компоненты таргетируемых акторов: TargetClass, Targetable, Health, PendingDestroy

use bevy::prelude::*;

/// Класс актора (тег для TargetClassFilter)
///
/// Пример: "enemy", "boss", "training_dummy".
#[derive(Component, Debug, Clone, PartialEq, Eq, Reflect)]
#[reflect(Component)]
pub struct TargetClass(pub String);

impl TargetClass {
    pub fn new(class: impl Into<String>) -> Self {
        Self(class.into())
    }
}

/// Capability: на актора можно залочиться
///
/// `trace_offset`: смещение traced point (куда стреляет LOS raycast и куда смотрит камера)
/// относительно Transform.translation. Обычно уровень груди/головы.
///
/// Автоматически добавляет Health через Required Components.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
#[require(Health)]
pub struct Targetable {
    pub trace_offset: Vec3,
}

impl Default for Targetable {
    fn default() -> Self {
        Self {
            trace_offset: Vec3::new(0.0, 0.8, 0.0), // Eye/chest level
        }
    }
}

/// Здоровье актора (liveness predicate для targeting)
///
/// Инвариант: 0 ≤ current ≤ max
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

impl Default for Health {
    fn default() -> Self {
        Self::new(100)
    }
}

impl Health {
    pub fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0
    }

    pub fn take_damage(&mut self, amount: u32) {
        self.current = self.current.saturating_sub(amount);
    }
}

/// Маркер: entity запланирован на despawn (больше не валидная цель)
///
/// Lock-on отпускает такого target на ближайшем tick, до LOS проверки.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct PendingDestroy;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_damage() {
        let mut health = Health::new(100);
        assert!(health.is_alive());

        health.take_damage(30);
        assert_eq!(health.current, 70);

        health.take_damage(100); // Saturating sub
        assert_eq!(health.current, 0);
        assert!(!health.is_alive());
    }

    #[test]
    fn test_targetable_default_offset() {
        let targetable = Targetable::default();
        assert_eq!(targetable.trace_offset, Vec3::new(0.0, 0.8, 0.0));
    }
}
