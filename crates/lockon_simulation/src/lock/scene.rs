//! ECS реализация SceneQuery
//!
//! Снимок атрибутов строится из компонентов в момент запроса;
//! entity без Targetable в перечисление не попадает.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::components::{Health, PendingDestroy, TargetClass, Targetable};
use crate::config::TargetClassFilter;
use crate::targeting::{ActorInfo, SceneQuery};

type ActorData = (
    Entity,
    &'static Transform,
    Option<&'static TargetClass>,
    Option<&'static Targetable>,
    Option<&'static Health>,
    Has<PendingDestroy>,
);

/// SceneQuery поверх World (read-only)
#[derive(SystemParam)]
pub struct EcsScene<'w, 's> {
    actors: Query<'w, 's, ActorData>,
}

fn actor_info(
    (entity, transform, class, targetable, health, pending_destroy): (
        Entity,
        &Transform,
        Option<&TargetClass>,
        Option<&Targetable>,
        Option<&Health>,
        bool,
    ),
) -> ActorInfo {
    let position = transform.translation;
    let trace_offset = targetable.map(|t| t.trace_offset).unwrap_or(Vec3::ZERO);

    ActorInfo {
        entity,
        position,
        traced_point: position + trace_offset,
        class: class.map(|c| c.0.clone()),
        targetable: targetable.is_some(),
        // Без Health актор считается живым (training dummy, props)
        alive: health.is_none_or(Health::is_alive),
        pending_destroy,
    }
}

impl SceneQuery for EcsScene<'_, '_> {
    fn actors_of_class(&self, filter: &TargetClassFilter) -> Vec<Entity> {
        self.actors
            .iter()
            .filter(|(_, _, class, targetable, _, _)| {
                targetable.is_some()
                    && match (filter, class) {
                        (TargetClassFilter::Any, _) => true,
                        (filter, Some(class)) => filter.matches(&class.0),
                        (TargetClassFilter::OneOf(_), None) => false,
                    }
            })
            .map(|(entity, ..)| entity)
            .collect()
    }

    fn actor(&self, entity: Entity) -> Option<ActorInfo> {
        self.actors.get(entity).ok().map(actor_info)
    }
}
