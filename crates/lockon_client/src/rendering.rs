use bevy::prelude::*;
use lockon_simulation::{LockedOnIndicator, Occluder, Player, TargetClass, Targetable};

use crate::camera::FollowCamera;

pub struct RenderingSyncPlugin;

impl Plugin for RenderingSyncPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (
                spawn_actor_visuals,
                spawn_occluder_visuals,
                sync_transforms,
                draw_lock_indicators,
                despawn_orphan_visuals,
            )
                .chain(),
        );
    }
}

/// Link: visual entity → simulation entity
#[derive(Component)]
pub struct VisualOf(pub Entity);

/// Link: simulation entity → visual entity
#[derive(Component)]
pub struct HasVisual(pub Entity);

/// Capsule для игрока и таргетируемых акторов
fn spawn_actor_visuals(
    mut commands: Commands,
    query: Query<
        (Entity, &Transform, Option<&TargetClass>, Has<Player>),
        (Or<(With<Targetable>, With<Player>)>, Without<HasVisual>),
    >,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (sim_entity, sim_transform, class, is_player) in query.iter() {
        let color = if is_player {
            Color::srgb(0.9, 0.9, 0.9)
        } else {
            class_color(class.map(|c| c.0.as_str()))
        };

        // Capsule стоит на земле: центр на половине высоты
        let visual_entity = commands
            .spawn((
                Mesh3d(meshes.add(Capsule3d::new(0.4, 1.0))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: color,
                    ..default()
                })),
                visual_transform(sim_transform),
                VisualOf(sim_entity),
            ))
            .id();

        commands.entity(sim_entity).insert(HasVisual(visual_entity));
    }
}

/// Cuboid по half_extents Occluder'а
fn spawn_occluder_visuals(
    mut commands: Commands,
    query: Query<(Entity, &Transform, &Occluder), Without<HasVisual>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    for (sim_entity, sim_transform, occluder) in query.iter() {
        let size = occluder.half_extents * 2.0;
        let visual_entity = commands
            .spawn((
                Mesh3d(meshes.add(Cuboid::new(size.x, size.y, size.z))),
                MeshMaterial3d(materials.add(Color::srgb(0.45, 0.45, 0.5))),
                *sim_transform,
                VisualOf(sim_entity),
            ))
            .id();

        commands.entity(sim_entity).insert(HasVisual(visual_entity));
    }
}

fn visual_transform(sim_transform: &Transform) -> Transform {
    sim_transform.with_translation(sim_transform.translation + Vec3::Y * 0.9)
}

/// Sync simulation transforms → visual transforms (актёры; occluders статичны)
fn sync_transforms(
    sim_query: Query<(&Transform, &HasVisual), (Changed<Transform>, Without<Occluder>)>,
    mut visual_query: Query<&mut Transform, (With<VisualOf>, Without<HasVisual>)>,
) {
    for (sim_transform, has_visual) in sim_query.iter() {
        if let Ok(mut visual) = visual_query.get_mut(has_visual.0) {
            *visual = visual_transform(sim_transform);
        }
    }
}

/// LockedOnIndicator → кольцо, повёрнутое к камере
fn draw_lock_indicators(
    indicators: Query<(&LockedOnIndicator, &Transform)>,
    cameras: Query<&Transform, With<FollowCamera>>,
    mut gizmos: Gizmos,
) {
    let camera_rotation = cameras.single().map(|t| t.rotation).unwrap_or(Quat::IDENTITY);

    for (indicator, transform) in indicators.iter() {
        let position = indicator.world_position(transform);
        // draw_size в пикселях → примерный world радиус
        let radius = indicator.draw_size * 0.01;
        gizmos.circle(
            bevy::math::Isometry3d::new(position, camera_rotation),
            radius,
            Color::srgb(1.0, 0.6, 0.1),
        );
        gizmos.sphere(
            bevy::math::Isometry3d::from_translation(position),
            radius * 0.2,
            Color::srgb(1.0, 0.3, 0.1),
        );
    }
}

/// Visual без живой simulation entity (despawn после смерти) удаляется
fn despawn_orphan_visuals(
    mut commands: Commands,
    visuals: Query<(Entity, &VisualOf)>,
    sims: Query<(), With<HasVisual>>,
) {
    for (visual_entity, visual_of) in visuals.iter() {
        if sims.get(visual_of.0).is_err() {
            commands.entity(visual_entity).despawn();
        }
    }
}

/// Цвет по классу цели (простая палитра)
fn class_color(class: Option<&str>) -> Color {
    match class {
        Some("enemy") => Color::srgb(0.8, 0.2, 0.2), // Red
        Some("ally") => Color::srgb(0.2, 0.2, 0.8),  // Blue
        Some(_) => Color::srgb(0.8, 0.8, 0.2),       // Yellow
        None => Color::srgb(0.8, 0.2, 0.8),          // Magenta
    }
}
