use bevy::prelude::*;
use bevy_rapier3d::prelude::{NoUserData, RapierPhysicsPlugin};
use lockon_simulation::lock::LineOfSightBackend;
use lockon_simulation::scenario::{spawn_arena, ArenaLayout, ScenarioPlugin};
use lockon_simulation::{LockOnView, RotationBasis, SimulationPlugin};

mod camera;
mod input;
mod rendering;

use camera::CameraPlugin;
use input::PlayerInputPlugin;
use rendering::RenderingSyncPlugin;

fn main() {
    App::new()
        // Bevy defaults (rendering, input, time, etc.)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Lock-On Demo".to_string(),
                resolution: (1280., 720.).into(),
                ..default()
            }),
            ..default()
        }))
        // Fixed timestep 60Hz для simulation tick
        .insert_resource(Time::<Fixed>::from_hz(60.0))
        // Rapier: только collider'ы и query pipeline (line-of-sight raycasts)
        .add_plugins(RapierPhysicsPlugin::<NoUserData>::default())
        // Simulation (headless ECS logic)
        .add_plugins(SimulationPlugin {
            line_of_sight: LineOfSightBackend::Rapier,
        })
        .add_plugins(ScenarioPlugin::default())
        // Rendering sync (simulation → visuals)
        .add_plugins(RenderingSyncPlugin)
        // Camera + player input
        .add_plugins((CameraPlugin, PlayerInputPlugin))
        // Setup scene
        .add_systems(Startup, (setup_scene, setup_arena))
        .run();
}

/// Ground plane, lights, follow camera
fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Ground plane (30x30m)
    commands.spawn((
        Mesh3d(meshes.add(Plane3d::new(Vec3::Y, Vec2::splat(15.0)))),
        MeshMaterial3d(materials.add(Color::srgb(0.3, 0.5, 0.3))),
        Transform::from_xyz(0.0, 0.0, 0.0),
    ));

    // Directional light (sun)
    commands.spawn((
        DirectionalLight {
            illuminance: 10000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_rotation_x(-std::f32::consts::FRAC_PI_4)),
    ));

    // Ambient light
    commands.insert_resource(AmbientLight {
        color: Color::WHITE,
        brightness: 0.3,
        affects_lightmapped_meshes: false,
    });

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 3.0, 6.0).looking_at(Vec3::ZERO, Vec3::Y),
        camera::FollowCamera::default(),
    ));
}

/// Demo арена; игрок получает LockOnView (камера есть → viewport фильтр)
fn setup_arena(world: &mut World) {
    let mut layout = ArenaLayout::default();
    layout.config.rotation_basis = RotationBasis::Camera;
    layout.config.maximum_distance = 14.0;
    layout.with_colliders = true;

    let player = spawn_arena(world, &layout);
    world.entity_mut(player).insert(LockOnView::default());

    println!("Controls: WASD move, mouse look, Tab lock/unlock, Q/E or mouse switch, Esc unlock");
}
