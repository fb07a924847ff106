//! In-memory scene для unit тестов core (без Bevy App).

use std::collections::HashSet;

use bevy::prelude::*;

use super::{ActorInfo, SceneQuery};
use crate::config::TargetClassFilter;
use crate::visibility::VisibilityProbe;

/// Акторы + набор "спрятанных" (LOS до них заблокирован)
#[derive(Debug, Default)]
pub struct TestScene {
    pub actors: Vec<ActorInfo>,
    pub hidden: HashSet<Entity>,
    pub off_screen: HashSet<Entity>,
    next_index: u32,
}

impl TestScene {
    pub fn new() -> Self {
        Self {
            next_index: 100,
            ..Default::default()
        }
    }

    /// Спавн targetable актора класса "enemy"
    pub fn spawn(&mut self, position: Vec3) -> Entity {
        self.spawn_class(position, "enemy")
    }

    pub fn spawn_class(&mut self, position: Vec3, class: &str) -> Entity {
        let entity = Entity::from_raw(self.next_index);
        self.next_index += 1;
        self.actors.push(ActorInfo {
            entity,
            position,
            traced_point: position,
            class: Some(class.to_string()),
            targetable: true,
            alive: true,
            pending_destroy: false,
        });
        entity
    }

    pub fn get_mut(&mut self, entity: Entity) -> &mut ActorInfo {
        self.actors
            .iter_mut()
            .find(|a| a.entity == entity)
            .expect("actor spawned in test scene")
    }

    pub fn despawn(&mut self, entity: Entity) {
        self.actors.retain(|a| a.entity != entity);
    }

    pub fn set_hidden(&mut self, entity: Entity, hidden: bool) {
        if hidden {
            self.hidden.insert(entity);
        } else {
            self.hidden.remove(&entity);
        }
    }

    pub fn infos(&self) -> Vec<ActorInfo> {
        self.actors.clone()
    }
}

impl SceneQuery for TestScene {
    fn actors_of_class(&self, filter: &TargetClassFilter) -> Vec<Entity> {
        self.actors
            .iter()
            .filter(|a| a.class.as_deref().is_some_and(|c| filter.matches(c)))
            .map(|a| a.entity)
            .collect()
    }

    fn actor(&self, entity: Entity) -> Option<ActorInfo> {
        self.actors.iter().find(|a| a.entity == entity).cloned()
    }

    fn is_on_screen(&self, _viewer: &super::Viewer, point: Vec3) -> bool {
        !self
            .actors
            .iter()
            .any(|a| a.traced_point == point && self.off_screen.contains(&a.entity))
    }
}

impl VisibilityProbe for TestScene {
    // Target передаётся в ignore set вместе с viewer
    fn probe_visibility(&self, _from: Vec3, _to: Vec3, ignore: &[Entity]) -> bool {
        !ignore.iter().any(|e| self.hidden.contains(e))
    }
}
