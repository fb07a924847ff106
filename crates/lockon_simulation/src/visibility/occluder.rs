//! Occluder LOS backend: segment vs axis-aligned box
//!
//! Без физики: стены/колонны помечаются компонентом Occluder,
//! LOS = отрезок не пересекает ни один чужой Occluder.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::VisibilityProbe;

/// Блокирующая геометрия (AABB вокруг Transform.translation)
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Occluder {
    pub half_extents: Vec3,
}

impl Occluder {
    pub fn cuboid(half_x: f32, half_y: f32, half_z: f32) -> Self {
        Self {
            half_extents: Vec3::new(half_x, half_y, half_z),
        }
    }
}

/// Occluder вне ECS (для чистых тестов и сценариев без App)
#[derive(Debug, Clone, Copy)]
pub struct OccluderVolume {
    pub entity: Option<Entity>,
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl VisibilityProbe for [OccluderVolume] {
    fn probe_visibility(&self, from: Vec3, to: Vec3, ignore: &[Entity]) -> bool {
        !self.iter().any(|volume| {
            let ignored = volume.entity.is_some_and(|e| ignore.contains(&e));
            !ignored && segment_hits_aabb(from, to, volume.center, volume.half_extents)
        })
    }
}

impl VisibilityProbe for Vec<OccluderVolume> {
    fn probe_visibility(&self, from: Vec3, to: Vec3, ignore: &[Entity]) -> bool {
        self.as_slice().probe_visibility(from, to, ignore)
    }
}

/// SystemParam: LOS по всем Occluder entities в мире
#[derive(SystemParam)]
pub struct OccluderLineOfSight<'w, 's> {
    occluders: Query<'w, 's, (Entity, &'static Transform, &'static Occluder)>,
}

impl VisibilityProbe for OccluderLineOfSight<'_, '_> {
    fn probe_visibility(&self, from: Vec3, to: Vec3, ignore: &[Entity]) -> bool {
        !self.occluders.iter().any(|(entity, transform, occluder)| {
            !ignore.contains(&entity)
                && segment_hits_aabb(from, to, transform.translation, occluder.half_extents)
        })
    }
}

/// Slab test: пересекает ли отрезок `from → to` AABB
pub fn segment_hits_aabb(from: Vec3, to: Vec3, center: Vec3, half_extents: Vec3) -> bool {
    let min = center - half_extents;
    let max = center + half_extents;
    let dir = to - from;

    let mut t_enter = 0.0_f32;
    let mut t_exit = 1.0_f32;

    for axis in 0..3 {
        let origin = from[axis];
        let d = dir[axis];

        if d.abs() < 1.0e-6 {
            // Отрезок параллелен slab'у: либо внутри, либо мимо
            if origin < min[axis] || origin > max[axis] {
                return false;
            }
            continue;
        }

        let inv = 1.0 / d;
        let t1 = (min[axis] - origin) * inv;
        let t2 = (max[axis] - origin) * inv;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));

        if t_enter > t_exit {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_through_box() {
        assert!(segment_hits_aabb(
            Vec3::new(-5.0, 0.0, 0.0),
            Vec3::new(5.0, 0.0, 0.0),
            Vec3::ZERO,
            Vec3::ONE,
        ));
    }

    #[test]
    fn test_segment_misses_box() {
        assert!(!segment_hits_aabb(
            Vec3::new(-5.0, 3.0, 0.0),
            Vec3::new(5.0, 3.0, 0.0),
            Vec3::ZERO,
            Vec3::ONE,
        ));
    }

    #[test]
    fn test_segment_stops_before_box() {
        assert!(!segment_hits_aabb(
            Vec3::new(-5.0, 0.0, 0.0),
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::ZERO,
            Vec3::ONE,
        ));
    }

    #[test]
    fn test_volume_probe_respects_ignore() {
        let wall = Entity::from_raw(7);
        let volumes = vec![OccluderVolume {
            entity: Some(wall),
            center: Vec3::new(0.0, 0.0, -5.0),
            half_extents: Vec3::new(2.0, 2.0, 0.5),
        }];

        let from = Vec3::ZERO;
        let to = Vec3::new(0.0, 0.0, -10.0);
        assert!(!volumes.probe_visibility(from, to, &[]));
        assert!(volumes.probe_visibility(from, to, &[wall]));
    }
}
