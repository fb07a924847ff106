//! Candidate selector: фильтрация и ранжирование целей
//!
//! - Acquisition: ближайший по дистанции (нет reference направления)
//! - Switching: наименьшее отклонение по углу в запрошенную сторону
//!   ("следующая цель в эту сторону", а не физически ближайшая)

use bevy::prelude::*;

use super::{ActorInfo, SceneQuery, Viewer};
use crate::config::{LockOnConfig, TargetClassFilter};
use crate::geometry::{angle_between, distance};
use crate::visibility::{has_line_of_sight, VisibilityProbe};

/// Направление switch (знак axis input)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwitchDirection {
    Left,
    Right,
}

impl SwitchDirection {
    /// Отрицательный axis → Left, положительный → Right, 0/NaN → None
    pub fn from_axis(value: f32) -> Option<Self> {
        if value < 0.0 {
            Some(Self::Left)
        } else if value > 0.0 {
            Some(Self::Right)
        } else {
            None
        }
    }

    fn matches(&self, signed_angle: f32) -> bool {
        match self {
            SwitchDirection::Left => signed_angle < 0.0,
            SwitchDirection::Right => signed_angle > 0.0,
        }
    }
}

/// Актор проходит class filter и liveness/validity predicate
pub fn targetable(actor: &ActorInfo, filter: &TargetClassFilter) -> bool {
    let class_ok = match (&actor.class, filter) {
        (_, TargetClassFilter::Any) => true,
        (Some(class), filter) => filter.matches(class),
        (None, TargetClassFilter::OneOf(_)) => false,
    };

    class_ok && actor.targetable && actor.alive && !actor.pending_destroy
}

/// Акторы с дистанцией до viewer в [min_range, max_range] (порядок сохраняется)
pub fn filter_in_range(
    actors: &[ActorInfo],
    min_range: f32,
    max_range: f32,
    viewer_origin: Vec3,
) -> Vec<ActorInfo> {
    actors
        .iter()
        .filter(|actor| {
            let d = distance(viewer_origin, actor.position);
            d >= min_range && d <= max_range
        })
        .cloned()
        .collect()
}

/// Ближайший актор; при равенстве: первый по порядку
pub fn nearest(actors: &[ActorInfo], viewer_origin: Vec3) -> Option<&ActorInfo> {
    let mut best: Option<(&ActorInfo, f32)> = None;

    for actor in actors {
        let d = distance(viewer_origin, actor.position);
        match best {
            Some((_, best_distance)) if d >= best_distance => {}
            _ => best = Some((actor, d)),
        }
    }

    best.map(|(actor, _)| actor)
}

/// Лучший кандидат для switch по углу
///
/// Кандидат подходит если знак угла совпадает с `direction` и |угол| > `threshold`.
/// Побеждает наименьший |угол|; при равенстве: первый по порядку.
pub fn best_by_angle(
    actors: &[ActorInfo],
    reference_forward: Vec3,
    viewer_origin: Vec3,
    direction: SwitchDirection,
    threshold: f32,
) -> Option<&ActorInfo> {
    let mut best: Option<(&ActorInfo, f32)> = None;

    for actor in actors {
        let angle = angle_between(reference_forward, actor.position - viewer_origin);
        if !direction.matches(angle) || angle.abs() <= threshold {
            continue;
        }

        match best {
            Some((_, best_angle)) if angle.abs() >= best_angle => {}
            _ => best = Some((actor, angle.abs())),
        }
    }

    best.map(|(actor, _)| actor)
}

/// Свежий Candidate Set для acquisition/switch
///
/// scene query → без viewer'а и `exclude` → targetable → в дистанции engage
/// → с прямой видимостью → на экране.
pub fn gather_candidates(
    config: &LockOnConfig,
    viewer: &Viewer,
    scene: &impl SceneQuery,
    probe: &impl VisibilityProbe,
    exclude: Option<Entity>,
) -> Vec<ActorInfo> {
    let actors: Vec<ActorInfo> = scene
        .actors_of_class(&config.targetable_classes)
        .into_iter()
        .filter(|&entity| entity != viewer.entity && Some(entity) != exclude)
        .filter_map(|entity| scene.actor(entity))
        .filter(|actor| targetable(actor, &config.targetable_classes))
        .collect();

    filter_in_range(
        &actors,
        config.minimum_distance_to_enable,
        config.maximum_distance,
        viewer.position,
    )
    .into_iter()
    .filter(|actor| has_line_of_sight(probe, viewer.entity, viewer.eye, actor))
    .filter(|actor| scene.is_on_screen(viewer, actor.traced_point))
    .collect()
}
