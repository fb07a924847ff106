//! Visibility prober: line-of-sight между viewer и target
//!
//! Единственный источник истины для "вижу ли я свою цель".
//! Бэкенды (VisibilityProbe):
//! - occluder: segment vs axis-aligned Occluder volumes (детерминированно, headless default)
//! - rapier: raycast через bevy_rapier3d query pipeline
//!
//! Ошибка бэкенда (нет physics context и т.п.) = нет LOS (fail-safe: лучше отпустить target).

use bevy::prelude::*;

use crate::targeting::ActorInfo;

pub mod occluder;
pub mod rapier;

pub use occluder::{segment_hits_aabb, Occluder, OccluderLineOfSight, OccluderVolume};
pub use rapier::RapierLineOfSight;

/// Occlusion probe: true если отрезок `from → to` ничем не перекрыт
///
/// `ignore`: entities, которые не считаются препятствием (обычно viewer и сам target).
pub trait VisibilityProbe {
    fn probe_visibility(&self, from: Vec3, to: Vec3, ignore: &[Entity]) -> bool;
}

impl<P: VisibilityProbe + ?Sized> VisibilityProbe for &P {
    fn probe_visibility(&self, from: Vec3, to: Vec3, ignore: &[Entity]) -> bool {
        (**self).probe_visibility(from, to, ignore)
    }
}

/// Есть ли прямая видимость от `viewer_origin` до traced point target'а
///
/// Viewer и сам target не являются препятствиями.
pub fn has_line_of_sight(
    probe: &impl VisibilityProbe,
    viewer: Entity,
    viewer_origin: Vec3,
    target: &ActorInfo,
) -> bool {
    probe.probe_visibility(viewer_origin, target.traced_point, &[viewer, target.entity])
}
