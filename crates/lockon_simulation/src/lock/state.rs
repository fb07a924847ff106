//! Lock session state (sum type вместо независимых флагов)
//!
//! Switching и BreakingLineOfSight: взаимоисключающие sub-states Locked.
//! Debounce таймеры живут внутри этих вариантов, поэтому "оба активны"
//! не представимо.

use bevy::prelude::*;

use crate::components::CharacterOrientation;

/// Sub-state залоченной сессии
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum LockPhase {
    /// Обычный lock
    Steady,
    /// Только что переключились: повторный switch заблокирован до истечения lockout
    Switching { lockout_remaining: f32 },
    /// Target за препятствием: lock off если не появится до истечения таймера
    BreakingLineOfSight { remaining: f32 },
}

/// FSM состояние lock-on
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum LockState {
    /// Начальное состояние после спавна
    #[default]
    Unlocked,

    /// Залочены на target (non-owning handle, ревалидируется каждый tick)
    Locked { target: Entity, phase: LockPhase },
}

/// Lock session персонажа (ровно одна на controlled character)
///
/// Мутируется только lock state machine (crate::lock::machine).
#[derive(Component, Debug, Clone, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct LockSession {
    pub state: LockState,
    /// Дистанция до target в момент lock (0 когда unlocked)
    pub distance_at_lock: f32,
    /// Флаги ориентации до lock (восстанавливаются при unlock)
    pub saved_orientation: Option<CharacterOrientation>,
}

impl LockSession {
    pub fn is_locked(&self) -> bool {
        matches!(self.state, LockState::Locked { .. })
    }

    pub fn target(&self) -> Option<Entity> {
        match self.state {
            LockState::Locked { target, .. } => Some(target),
            LockState::Unlocked => None,
        }
    }

    pub fn phase(&self) -> Option<LockPhase> {
        match self.state {
            LockState::Locked { phase, .. } => Some(phase),
            LockState::Unlocked => None,
        }
    }

    pub fn is_switching(&self) -> bool {
        matches!(self.phase(), Some(LockPhase::Switching { .. }))
    }

    pub fn is_breaking_line_of_sight(&self) -> bool {
        matches!(self.phase(), Some(LockPhase::BreakingLineOfSight { .. }))
    }

    /// Оставшееся время switch lockout (None если таймер не активен)
    pub fn switch_lockout_remaining(&self) -> Option<f32> {
        match self.phase() {
            Some(LockPhase::Switching { lockout_remaining }) => Some(lockout_remaining),
            _ => None,
        }
    }

    /// Оставшееся время до break line of sight (None если таймер не активен)
    pub fn line_of_sight_break_remaining(&self) -> Option<f32> {
        match self.phase() {
            Some(LockPhase::BreakingLineOfSight { remaining }) => Some(remaining),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lock_session_default_unlocked() {
        let session = LockSession::default();
        assert_eq!(session.state, LockState::Unlocked);
        assert!(!session.is_locked());
        assert!(session.target().is_none());
        assert!(session.phase().is_none());
        assert!(session.saved_orientation.is_none());
    }

    #[test]
    fn test_phase_accessors() {
        let target = Entity::from_raw(3);
        let session = LockSession {
            state: LockState::Locked {
                target,
                phase: LockPhase::BreakingLineOfSight { remaining: 1.5 },
            },
            ..default()
        };

        assert!(session.is_locked());
        assert_eq!(session.target(), Some(target));
        assert!(session.is_breaking_line_of_sight());
        assert!(!session.is_switching());
        assert_eq!(session.line_of_sight_break_remaining(), Some(1.5));
        assert_eq!(session.switch_lockout_remaining(), None);
    }
}
