//! Targeting: scene collaborator contract + candidate selector
//!
//! Core не владеет акторами: получает их через SceneQuery каждый запрос
//! (Candidate Set никогда не кэшируется между ticks: цели двигаются и деспавнятся).

use bevy::prelude::*;

use crate::components::LockOnView;
use crate::config::TargetClassFilter;
use crate::geometry;

pub mod candidates;

#[cfg(test)]
pub(crate) mod test_scene;

pub use candidates::*;

/// Снимок актора на момент запроса (non-owning: только Entity + атрибуты)
#[derive(Debug, Clone, PartialEq)]
pub struct ActorInfo {
    pub entity: Entity,
    /// World позиция (root)
    pub position: Vec3,
    /// Точка для LOS raycast / look-at (position + Targetable::trace_offset)
    pub traced_point: Vec3,
    /// Класс (TargetClass), None если тега нет
    pub class: Option<String>,
    /// Есть capability Targetable
    pub targetable: bool,
    /// Liveness (Health > 0)
    pub alive: bool,
    /// Запланирован despawn
    pub pending_destroy: bool,
}

/// Персонаж, который таргетит (viewer)
#[derive(Debug, Clone, Copy)]
pub struct Viewer {
    pub entity: Entity,
    /// Root позиция персонажа (для дистанций и углов)
    pub position: Vec3,
    /// Точка глаз (для LOS и look-at)
    pub eye: Vec3,
    /// Активная камера (None → viewport фильтр не применяется)
    pub view: Option<LockOnView>,
}

impl Viewer {
    pub fn new(entity: Entity, position: Vec3, eye_height: f32) -> Self {
        Self {
            entity,
            position,
            eye: position + Vec3::Y * eye_height,
            view: None,
        }
    }

    pub fn with_view(mut self, view: LockOnView) -> Self {
        self.view = Some(view);
        self
    }
}

/// Scene query service (collaborator): перечисление акторов + атрибуты
pub trait SceneQuery {
    /// Все акторы, чей класс проходит фильтр (порядок стабилен в пределах tick)
    fn actors_of_class(&self, filter: &TargetClassFilter) -> Vec<Entity>;

    /// Атрибуты актора; None если entity больше не существует
    fn actor(&self, entity: Entity) -> Option<ActorInfo>;

    /// Точка на экране viewer'а (перед камерой, внутри viewport)
    fn is_on_screen(&self, viewer: &Viewer, point: Vec3) -> bool {
        match &viewer.view {
            Some(view) => geometry::is_within_viewport(view, point),
            None => true,
        }
    }
}

impl<S: SceneQuery + ?Sized> SceneQuery for &S {
    fn actors_of_class(&self, filter: &TargetClassFilter) -> Vec<Entity> {
        (**self).actors_of_class(filter)
    }

    fn actor(&self, entity: Entity) -> Option<ActorInfo> {
        (**self).actor(entity)
    }

    fn is_on_screen(&self, viewer: &Viewer, point: Vec3) -> bool {
        (**self).is_on_screen(viewer, point)
    }
}
