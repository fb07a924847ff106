//! Lock state machine: операции над LockSession
//!
//! Чистые функции (без ECS): scene и probe приходят через LockContext.
//! Все переходы синхронные и завершаются внутри одного вызова.
//!
//! Переходы:
//! - Unlocked → Locked: request_lock (nearest кандидат)
//! - Locked → Locked(Switching): request_axis_switch (best_by_angle от текущей цели)
//! - Locked → Locked(BreakingLineOfSight): tick без LOS
//! - Locked → Unlocked: request_unlock / невалидная цель / истёк break таймер
//!
//! Порядок tick: (1) validity → (2) visibility → (3) rotation (вне этого модуля).
//! Невалидная цель не пробуется на LOS и к ней не поворачиваемся.

use bevy::prelude::*;

use super::state::{LockPhase, LockSession, LockState};
use crate::components::CharacterOrientation;
use crate::config::LockOnConfig;
use crate::geometry::distance;
use crate::targeting::{
    best_by_angle, gather_candidates, nearest, targetable, ActorInfo, SceneQuery, SwitchDirection, Viewer,
};
use crate::visibility::{has_line_of_sight, VisibilityProbe};

/// Всё, что нужно state machine на один вызов
pub struct LockContext<'a, S, P> {
    pub config: &'a LockOnConfig,
    pub viewer: Viewer,
    pub scene: &'a S,
    pub probe: &'a P,
}

/// Уведомления для presentation adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockEvent {
    LockedOn(Entity),
    LockedOff(Entity),
}

/// Результат tick для rotation шага
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LockedTarget {
    pub target: Entity,
    pub traced_point: Vec3,
    pub distance: f32,
}

/// Почему сессия отпустила цель
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnlockReason {
    Requested,
    TargetInvalid,
    LineOfSightLost,
}

impl UnlockReason {
    fn as_str(&self) -> &'static str {
        match self {
            UnlockReason::Requested => "requested",
            UnlockReason::TargetInvalid => "target invalid",
            UnlockReason::LineOfSightLost => "line of sight lost",
        }
    }
}

/// Acquisition: lock на ближайшего видимого кандидата
///
/// Идемпотентно: если текущая цель валидна и видима: ничего не меняется.
/// Возвращает цель после запроса (None → остались Unlocked).
pub fn request_lock<S: SceneQuery, P: VisibilityProbe>(
    ctx: &LockContext<'_, S, P>,
    session: &mut LockSession,
    events: &mut Vec<LockEvent>,
) -> Option<Entity> {
    if let LockState::Locked { target, .. } = session.state {
        if current_target_holds(ctx, target) {
            return Some(target);
        }
    }

    let candidates = gather_candidates(ctx.config, &ctx.viewer, ctx.scene, ctx.probe, None);
    let Some(best) = nearest(&candidates, ctx.viewer.position) else {
        // Нет кандидатов: Unlocked остаётся Unlocked, Locked: ждёт решения tick
        return session.target();
    };

    match session.state {
        LockState::Locked { target, .. } if target == best.entity => Some(target),
        LockState::Locked { target, .. } => {
            events.push(LockEvent::LockedOff(target));
            engage(ctx, session, best, events);
            Some(best.entity)
        }
        LockState::Unlocked => {
            engage(ctx, session, best, events);
            Some(best.entity)
        }
    }
}

/// Явный unlock: всегда успешен, отменяет все таймеры
///
/// Возвращает отпущенную цель (None если и так Unlocked).
pub fn request_unlock(session: &mut LockSession, events: &mut Vec<LockEvent>) -> Option<Entity> {
    release(session, events, UnlockReason::Requested)
}

/// Toggle: Locked → unlock, Unlocked → acquisition
pub fn request_toggle<S: SceneQuery, P: VisibilityProbe>(
    ctx: &LockContext<'_, S, P>,
    session: &mut LockSession,
    events: &mut Vec<LockEvent>,
) -> Option<Entity> {
    if session.is_locked() {
        request_unlock(session, events);
        None
    } else {
        request_lock(ctx, session, events)
    }
}

/// Switch по axis input: следующая цель в направлении знака `axis_value × delta`
///
/// Сравнивается только мгновенное значение (без накопления между ticks).
/// Возвращает новую цель, None если switch не произошёл.
pub fn request_axis_switch<S: SceneQuery, P: VisibilityProbe>(
    ctx: &LockContext<'_, S, P>,
    session: &mut LockSession,
    axis_value: f32,
    delta: f32,
    events: &mut Vec<LockEvent>,
) -> Option<Entity> {
    let LockState::Locked { target: current, phase } = session.state else {
        return None;
    };

    // Switch lockout активен
    if matches!(phase, LockPhase::Switching { .. }) {
        return None;
    }

    let magnitude = axis_value * delta;
    if !(magnitude.abs() >= ctx.config.start_rotating_threshold) {
        return None;
    }
    let direction = SwitchDirection::from_axis(magnitude)?;

    // Невалидную текущую цель отпустит tick
    let current_info = ctx.scene.actor(current)?;
    let reference_forward = current_info.position - ctx.viewer.position;

    let candidates = gather_candidates(ctx.config, &ctx.viewer, ctx.scene, ctx.probe, Some(current));
    let next = best_by_angle(
        &candidates,
        reference_forward,
        ctx.viewer.position,
        direction,
        ctx.config.switch_angle_threshold,
    )?;

    // Атомарная замена: locked-off старой, locked-on новой, без промежуточного Unlocked
    events.push(LockEvent::LockedOff(current));
    events.push(LockEvent::LockedOn(next.entity));

    let phase = if ctx.config.switch_lockout_delay > 0.0 {
        LockPhase::Switching {
            lockout_remaining: ctx.config.switch_lockout_delay,
        }
    } else {
        LockPhase::Steady
    };
    session.state = LockState::Locked {
        target: next.entity,
        phase,
    };
    session.distance_at_lock = distance(ctx.viewer.position, next.position);

    crate::log(&format!(
        "🔄 LockOn: {:?} switched {:?} → {:?} ({:?}, {:.1}m)",
        ctx.viewer.entity, current, next.entity, direction, session.distance_at_lock
    ));

    Some(next.entity)
}

/// Per-tick evaluation залоченной сессии
///
/// Возвращает цель для rotation шага, None если Unlocked (или только что отпустили).
pub fn tick<S: SceneQuery, P: VisibilityProbe>(
    ctx: &LockContext<'_, S, P>,
    session: &mut LockSession,
    delta: f32,
    events: &mut Vec<LockEvent>,
) -> Option<LockedTarget> {
    let LockState::Locked { target, phase } = session.state else {
        return None;
    };

    // (1) Validity: существует, targetable, в пределах engage дистанции
    let Some(info) = valid_target(ctx, target) else {
        release(session, events, UnlockReason::TargetInvalid);
        return None;
    };

    // (2) Visibility
    let visible = has_line_of_sight(ctx.probe, ctx.viewer.entity, ctx.viewer.eye, &info);

    let next_phase = match phase {
        LockPhase::BreakingLineOfSight { remaining } => {
            if visible {
                crate::log(&format!(
                    "👁️ LockOn: {:?} regained sight of {:?} ({:.2}s left)",
                    ctx.viewer.entity, target, remaining
                ));
                LockPhase::Steady
            } else {
                let remaining = remaining - delta;
                if remaining <= 0.0 {
                    release(session, events, UnlockReason::LineOfSightLost);
                    return None;
                }
                LockPhase::BreakingLineOfSight { remaining }
            }
        }
        LockPhase::Steady | LockPhase::Switching { .. } if !visible => {
            if ctx.config.line_of_sight_break_delay <= 0.0 {
                release(session, events, UnlockReason::LineOfSightLost);
                return None;
            }
            crate::log(&format!(
                "👻 LockOn: {:?} lost sight of {:?}, break in {:.2}s",
                ctx.viewer.entity, target, ctx.config.line_of_sight_break_delay
            ));
            LockPhase::BreakingLineOfSight {
                remaining: ctx.config.line_of_sight_break_delay,
            }
        }
        LockPhase::Switching { lockout_remaining } => {
            let lockout_remaining = lockout_remaining - delta;
            if lockout_remaining <= 0.0 {
                LockPhase::Steady
            } else {
                LockPhase::Switching { lockout_remaining }
            }
        }
        LockPhase::Steady => LockPhase::Steady,
    };

    session.state = LockState::Locked {
        target,
        phase: next_phase,
    };

    Some(LockedTarget {
        target,
        traced_point: info.traced_point,
        distance: distance(ctx.viewer.position, info.position),
    })
}

/// Rotation-lock side effect: strafe флаги пока locked, восстановление при unlock
///
/// Идемпотентно: вызывается после каждой операции над сессией.
pub fn apply_orientation(
    session: &mut LockSession,
    config: &LockOnConfig,
    orientation: &mut CharacterOrientation,
) {
    if session.is_locked() && config.should_control_rotation {
        if session.saved_orientation.is_none() {
            session.saved_orientation = Some(*orientation);
            *orientation = CharacterOrientation::STRAFE;
        }
    } else if let Some(saved) = session.saved_orientation.take() {
        *orientation = saved;
    }
}

fn engage<S: SceneQuery, P: VisibilityProbe>(
    ctx: &LockContext<'_, S, P>,
    session: &mut LockSession,
    target: &ActorInfo,
    events: &mut Vec<LockEvent>,
) {
    session.state = LockState::Locked {
        target: target.entity,
        phase: LockPhase::Steady,
    };
    session.distance_at_lock = distance(ctx.viewer.position, target.position);
    events.push(LockEvent::LockedOn(target.entity));

    crate::log_info(&format!(
        "🎯 LockOn: {:?} locked on {:?} at {:.1}m",
        ctx.viewer.entity, target.entity, session.distance_at_lock
    ));
}

fn release(session: &mut LockSession, events: &mut Vec<LockEvent>, reason: UnlockReason) -> Option<Entity> {
    let target = session.target()?;

    session.state = LockState::Unlocked;
    session.distance_at_lock = 0.0;
    events.push(LockEvent::LockedOff(target));

    crate::log_info(&format!("❌ LockOn: released {:?} ({})", target, reason.as_str()));

    Some(target)
}

fn valid_target<S: SceneQuery, P>(ctx: &LockContext<'_, S, P>, target: Entity) -> Option<ActorInfo> {
    let info = ctx.scene.actor(target)?;
    let in_reach = distance(ctx.viewer.position, info.position) <= ctx.config.maximum_distance;
    (targetable(&info, &ctx.config.targetable_classes) && in_reach).then_some(info)
}

fn current_target_holds<S: SceneQuery, P: VisibilityProbe>(ctx: &LockContext<'_, S, P>, target: Entity) -> bool {
    valid_target(ctx, target)
        .is_some_and(|info| has_line_of_sight(ctx.probe, ctx.viewer.entity, ctx.viewer.eye, &info))
}
