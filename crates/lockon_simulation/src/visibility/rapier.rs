//! Rapier LOS backend: raycast через bevy_rapier3d
//!
//! Collision mask не настраиваем: любой solid collider (кроме sensors и ignore set)
//! между viewer и target считается препятствием.
//!
//! ВАЖНО: collider актора должен висеть на самом actor entity,
//! иначе ignore set не отфильтрует его (child collider = препятствие).

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::VisibilityProbe;

/// SystemParam: LOS через Rapier query pipeline
#[derive(SystemParam)]
pub struct RapierLineOfSight<'w, 's> {
    context: ReadRapierContext<'w, 's>,
}

impl VisibilityProbe for RapierLineOfSight<'_, '_> {
    fn probe_visibility(&self, from: Vec3, to: Vec3, ignore: &[Entity]) -> bool {
        // Нет physics world → считаем что LOS нет (fail-safe)
        let Ok(context) = self.context.single() else {
            crate::log_warning("RapierLineOfSight: RapierContext не найден, LOS = false");
            return false;
        };

        let offset = to - from;
        let length = offset.length();
        if length <= f32::EPSILON {
            return true;
        }

        let not_ignored = |entity: Entity| !ignore.contains(&entity);
        let filter = QueryFilter::default()
            .exclude_sensors()
            .predicate(&not_ignored);

        context
            .cast_ray(from, offset / length, length, true, filter)
            .is_none()
    }
}
