//! Integration тесты lock-on через headless App
//!
//! Время ручное: 100ms на update, fixed timestep 100ms → один FixedUpdate на update.

use std::time::Duration;

use bevy::ecs::system::RunSystemOnce;
use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use bevy_rapier3d::prelude::{Collider, NoUserData, RapierPhysicsPlugin};
use lockon_simulation::scenario::{LockTrace, ScenarioPlugin};
use lockon_simulation::visibility::RapierLineOfSight;
use lockon_simulation::*;

const STEP: Duration = Duration::from_millis(100);

/// Всё, что lock-on отправил наружу
#[derive(Resource, Default)]
struct Collected {
    locked_on: Vec<TargetLockedOn>,
    locked_off: Vec<TargetLockedOff>,
    changes: Vec<TargetLockChanged>,
    rotations: Vec<TargetSetRotation>,
}

fn collect_events(
    mut collected: ResMut<Collected>,
    mut locked_on: EventReader<TargetLockedOn>,
    mut locked_off: EventReader<TargetLockedOff>,
    mut changes: EventReader<TargetLockChanged>,
    mut rotations: EventReader<TargetSetRotation>,
) {
    collected.locked_off.extend(locked_off.read().copied());
    collected.locked_on.extend(locked_on.read().copied());
    collected.changes.extend(changes.read().copied());
    collected.rotations.extend(rotations.read().copied());
}

fn test_app() -> App {
    app_with(LineOfSightBackend::Occluders, |_| {})
}

/// Headless App: `extra` добавляет plugins до первого update
fn app_with(line_of_sight: LineOfSightBackend, extra: impl FnOnce(&mut App)) -> App {
    let mut app = create_headless_app(7);
    app.insert_resource(TimeUpdateStrategy::ManualDuration(STEP))
        .insert_resource(Time::<Fixed>::from_duration(STEP))
        .add_plugins(SimulationPlugin { line_of_sight })
        .init_resource::<Collected>()
        .add_systems(FixedUpdate, collect_events.after(LockOnSystems));
    extra(&mut app);

    // Первый update с нулевым delta
    app.update();
    app
}

/// Rapier query pipeline вместо Occluder volumes
fn rapier_app() -> App {
    app_with(LineOfSightBackend::Rapier, |app| {
        app.add_plugins((
            bevy::transform::TransformPlugin,
            RapierPhysicsPlugin::<NoUserData>::default(),
        ));
    })
}

fn spawn_player(app: &mut App, config: LockOnConfig) -> Entity {
    app.world_mut()
        .spawn((Player, Transform::default(), config))
        .id()
}

fn spawn_target(app: &mut App, position: Vec3) -> Entity {
    app.world_mut()
        .spawn((
            TargetClass::new("enemy"),
            Targetable::default(),
            Transform::from_translation(position),
        ))
        .id()
}

fn request(app: &mut App, request: LockOnRequest) {
    app.world_mut().send_event(request);
    app.update();
}

fn session(app: &App, player: Entity) -> LockSession {
    app.world()
        .get::<LockSession>(player)
        .cloned()
        .expect("player has LockSession")
}

fn collected(app: &App) -> &Collected {
    app.world().resource::<Collected>()
}

#[test]
fn test_required_components_added() {
    let mut app = test_app();
    let player = spawn_player(&mut app, LockOnConfig::default());

    let world = app.world();
    assert!(world.get::<LockSession>(player).is_some());
    assert!(world.get::<ControlRotation>(player).is_some());
    assert!(world.get::<CharacterOrientation>(player).is_some());
}

#[test]
fn test_lock_acquires_nearest_and_attaches_indicator() {
    let mut app = test_app();
    let player = spawn_player(&mut app, LockOnConfig::default());
    let far = spawn_target(&mut app, Vec3::new(0.0, 0.0, -9.0));
    let near = spawn_target(&mut app, Vec3::new(3.0, 0.0, -3.0));

    request(&mut app, LockOnRequest::lock(player));

    assert_eq!(session(&app, player).target(), Some(near));
    assert_eq!(
        collected(&app).locked_on,
        vec![TargetLockedOn { owner: player, target: near }]
    );

    let indicator = app
        .world()
        .get::<LockedOnIndicator>(near)
        .expect("indicator on locked target");
    assert_eq!(indicator.owner, player);
    assert_eq!(indicator.relative_location, Vec3::new(0.0, 1.2, 0.0));
    assert!(app.world().get::<LockedOnIndicator>(far).is_none());
}

#[test]
fn test_lock_respects_class_filter() {
    let mut app = test_app();
    let player = spawn_player(
        &mut app,
        LockOnConfig {
            targetable_classes: TargetClassFilter::only("boss"),
            ..default()
        },
    );
    spawn_target(&mut app, Vec3::new(0.0, 0.0, -3.0));
    let boss = app
        .world_mut()
        .spawn((
            TargetClass::new("boss"),
            Targetable::default(),
            Transform::from_xyz(0.0, 0.0, -8.0),
        ))
        .id();

    request(&mut app, LockOnRequest::lock(player));
    assert_eq!(session(&app, player).target(), Some(boss));
}

#[test]
fn test_axis_switch_moves_indicator() {
    let mut app = test_app();
    let player = spawn_player(&mut app, LockOnConfig::default());
    let center = spawn_target(&mut app, Vec3::new(0.0, 0.0, -4.0));
    let right = spawn_target(&mut app, Vec3::new(3.0, 0.0, -6.0));

    request(&mut app, LockOnRequest::lock(player));
    assert_eq!(session(&app, player).target(), Some(center));

    request(&mut app, LockOnRequest::axis(player, 1.0));

    assert_eq!(session(&app, player).target(), Some(right));
    assert!(session(&app, player).is_switching());
    assert_eq!(
        collected(&app).locked_off,
        vec![TargetLockedOff { owner: player, target: center }]
    );
    assert_eq!(
        collected(&app).changes[1..],
        [
            TargetLockChanged { owner: player, target: center, locked: false },
            TargetLockChanged { owner: player, target: right, locked: true },
        ]
    );
    assert!(app.world().get::<LockedOnIndicator>(center).is_none());
    assert!(app.world().get::<LockedOnIndicator>(right).is_some());
}

#[test]
fn test_line_of_sight_debounce_recovers() {
    let mut app = test_app();
    let player = spawn_player(&mut app, LockOnConfig::default()); // break delay 2s
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -6.0));
    request(&mut app, LockOnRequest::lock(player));

    let wall = app
        .world_mut()
        .spawn((Occluder::cuboid(1.0, 2.0, 0.2), Transform::from_xyz(0.0, 1.0, -3.0)))
        .id();

    for _ in 0..10 {
        app.update();
    }
    let breaking = session(&app, player);
    assert_eq!(breaking.target(), Some(target));
    assert!(breaking.is_breaking_line_of_sight());
    let remaining = breaking.line_of_sight_break_remaining().expect("break timer");
    assert!(remaining > 0.0 && remaining < 2.0);

    app.world_mut().despawn(wall);
    app.update();

    let recovered = session(&app, player);
    assert_eq!(recovered.target(), Some(target));
    assert_eq!(recovered.phase(), Some(LockPhase::Steady));
    assert!(collected(&app).locked_off.is_empty());
}

#[test]
fn test_line_of_sight_break_unlocks_once() {
    let mut app = test_app();
    let player = spawn_player(&mut app, LockOnConfig::default());
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -6.0));
    request(&mut app, LockOnRequest::lock(player));

    app.world_mut()
        .spawn((Occluder::cuboid(1.0, 2.0, 0.2), Transform::from_xyz(0.0, 1.0, -3.0)));

    for _ in 0..30 {
        app.update();
    }

    assert!(!session(&app, player).is_locked());
    assert_eq!(
        collected(&app).locked_off,
        vec![TargetLockedOff { owner: player, target }]
    );
    assert!(app.world().get::<LockedOnIndicator>(target).is_none());
}

#[test]
fn test_pending_destroy_target_unlocks() {
    let mut app = test_app();
    let player = spawn_player(&mut app, LockOnConfig::default());
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -5.0));
    request(&mut app, LockOnRequest::lock(player));

    app.world_mut().entity_mut(target).insert(PendingDestroy);
    app.update();

    assert!(!session(&app, player).is_locked());
    assert_eq!(collected(&app).locked_off.len(), 1);
}

#[test]
fn test_despawned_target_unlocks() {
    let mut app = test_app();
    let player = spawn_player(&mut app, LockOnConfig::default());
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -5.0));
    request(&mut app, LockOnRequest::lock(player));

    app.world_mut().despawn(target);
    app.update();

    assert!(!session(&app, player).is_locked());
    assert_eq!(
        collected(&app).locked_off,
        vec![TargetLockedOff { owner: player, target }]
    );
}

#[test]
fn test_control_rotation_converges_to_target() {
    let mut app = test_app();
    let player = spawn_player(&mut app, LockOnConfig::default());
    // Справа (+X): yaw = -90°, на уровне глаз → pitch 0
    spawn_target(&mut app, Vec3::new(5.0, 0.0, 0.0));

    request(&mut app, LockOnRequest::lock(player));
    let first = *app.world().get::<ControlRotation>(player).expect("control rotation");
    assert!(first.yaw < 0.0 && first.yaw > -90.0);

    for _ in 0..10 {
        app.update();
    }

    let settled = *app.world().get::<ControlRotation>(player).expect("control rotation");
    assert!((settled.yaw - -90.0).abs() < 0.5, "yaw = {}", settled.yaw);
    assert!(settled.pitch.abs() < 0.5, "pitch = {}", settled.pitch);
    assert!(!collected(&app).rotations.is_empty());
}

#[test]
fn test_delegate_handler_only_emits_rotation() {
    let mut app = test_app();
    let player = spawn_player(&mut app, LockOnConfig::default());
    app.world_mut().entity_mut(player).insert(RotationHandler::Delegate);
    let target = spawn_target(&mut app, Vec3::new(5.0, 0.0, 0.0));

    request(&mut app, LockOnRequest::lock(player));

    assert_eq!(
        *app.world().get::<ControlRotation>(player).expect("control rotation"),
        ControlRotation::ZERO
    );
    let rotation = collected(&app).rotations.last().copied().expect("rotation event");
    assert_eq!(rotation.owner, player);
    assert_eq!(rotation.target, target);
    assert!((rotation.rotation.yaw - -90.0).abs() < 1e-3);
}

#[test]
fn test_rotation_control_disabled() {
    let mut app = test_app();
    let player = spawn_player(
        &mut app,
        LockOnConfig {
            enable_rotation_control: false,
            ..default()
        },
    );
    spawn_target(&mut app, Vec3::new(5.0, 0.0, 0.0));

    request(&mut app, LockOnRequest::lock(player));
    app.update();

    assert!(session(&app, player).is_locked());
    assert_eq!(
        *app.world().get::<ControlRotation>(player).expect("control rotation"),
        ControlRotation::ZERO
    );
    assert!(collected(&app).rotations.is_empty());
}

#[test]
fn test_strafe_orientation_round_trip() {
    let mut app = test_app();
    let player = spawn_player(
        &mut app,
        LockOnConfig {
            should_control_rotation: true,
            rotation_interp_speed: 0.0, // snap
            ..default()
        },
    );
    spawn_target(&mut app, Vec3::new(5.0, 0.0, 0.0));

    request(&mut app, LockOnRequest::lock(player));
    assert_eq!(
        *app.world().get::<CharacterOrientation>(player).expect("orientation"),
        CharacterOrientation::STRAFE
    );

    // Тело повернулось вслед за controller yaw (-90° → смотрит в +X)
    let transform = *app.world().get::<Transform>(player).expect("transform");
    assert!((transform.forward().x - 1.0).abs() < 1e-3);

    request(&mut app, LockOnRequest::unlock(player));
    assert_eq!(
        *app.world().get::<CharacterOrientation>(player).expect("orientation"),
        CharacterOrientation::default()
    );
}

#[test]
fn test_toggle_and_idempotent_lock() {
    let mut app = test_app();
    let player = spawn_player(&mut app, LockOnConfig::default());
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -5.0));

    request(&mut app, LockOnRequest::toggle(player));
    request(&mut app, LockOnRequest::lock(player));
    assert_eq!(session(&app, player).target(), Some(target));
    assert_eq!(collected(&app).locked_on.len(), 1);

    request(&mut app, LockOnRequest::toggle(player));
    assert!(!session(&app, player).is_locked());
    assert_eq!(collected(&app).locked_off.len(), 1);
}

#[test]
fn test_viewport_filters_targets_behind_camera() {
    let mut app = test_app();
    let player = spawn_player(&mut app, LockOnConfig::default());
    app.world_mut()
        .entity_mut(player)
        .insert(LockOnView::looking_at(Vec3::new(0.0, 1.5, 2.0), Vec3::new(0.0, 1.0, -5.0)));

    spawn_target(&mut app, Vec3::new(0.0, 0.0, 3.0)); // ближе, но за камерой
    let in_front = spawn_target(&mut app, Vec3::new(0.0, 0.0, -6.0));

    request(&mut app, LockOnRequest::lock(player));
    assert_eq!(session(&app, player).target(), Some(in_front));
}

#[test]
fn test_request_without_session_is_dropped() {
    let mut app = test_app();
    let stranger = app.world_mut().spawn(Transform::default()).id();
    spawn_target(&mut app, Vec3::new(0.0, 0.0, -5.0));

    request(&mut app, LockOnRequest::lock(stranger));

    assert!(app.world().get::<LockSession>(stranger).is_none());
    assert!(collected(&app).locked_on.is_empty());
}

#[test]
fn test_request_without_config_is_dropped() {
    let mut app = test_app();
    let owner = app
        .world_mut()
        .spawn((LockSession::default(), Transform::default()))
        .id();
    spawn_target(&mut app, Vec3::new(0.0, 0.0, -5.0));

    request(&mut app, LockOnRequest::lock(owner));

    assert!(!session(&app, owner).is_locked());
    assert!(collected(&app).changes.is_empty());
}

#[test]
fn test_lock_and_unlock_in_one_tick_keep_order() {
    let mut app = app_with(LineOfSightBackend::Occluders, |app| {
        app.add_plugins(ScenarioPlugin { scripted: true });
    });
    let player = spawn_player(&mut app, LockOnConfig::default());
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -5.0));

    app.world_mut().send_event(LockOnRequest::lock(player));
    app.world_mut().send_event(LockOnRequest::unlock(player));
    app.update();

    assert!(!session(&app, player).is_locked());
    assert_eq!(
        collected(&app).changes,
        vec![
            TargetLockChanged { owner: player, target, locked: true },
            TargetLockChanged { owner: player, target, locked: false },
        ]
    );
    assert!(app.world().get::<LockedOnIndicator>(target).is_none());

    let trace = &app.world().resource::<LockTrace>().entries;
    assert_eq!(trace.len(), 2);
    assert_eq!(trace.last().map(|entry| entry.locked), Some(false));
}

#[test]
fn test_unlock_and_relock_in_one_tick_keeps_indicator() {
    let mut app = test_app();
    let player = spawn_player(&mut app, LockOnConfig::default());
    let target = spawn_target(&mut app, Vec3::new(0.0, 0.0, -5.0));
    request(&mut app, LockOnRequest::lock(player));

    app.world_mut().send_event(LockOnRequest::unlock(player));
    app.world_mut().send_event(LockOnRequest::lock(player));
    app.update();

    assert_eq!(session(&app, player).target(), Some(target));
    assert_eq!(
        collected(&app).changes.last(),
        Some(&TargetLockChanged { owner: player, target, locked: true })
    );
    assert!(app.world().get::<LockedOnIndicator>(target).is_some());
}

fn spawn_rapier_actors(app: &mut App, target_position: Vec3) -> (Entity, Entity) {
    let player = spawn_player(app, LockOnConfig::default());
    let target = spawn_target(app, target_position);
    app.world_mut().entity_mut(player).insert(Collider::capsule_y(0.5, 0.4));
    app.world_mut().entity_mut(target).insert(Collider::capsule_y(0.5, 0.4));

    // Collider'ы попадают в Rapier в PostUpdate
    app.update();
    (player, target)
}

#[test]
fn test_rapier_clear_path_locks() {
    let mut app = rapier_app();
    let (player, target) = spawn_rapier_actors(&mut app, Vec3::new(0.0, 0.0, -6.0));

    request(&mut app, LockOnRequest::lock(player));

    assert_eq!(
        session(&app, player).state,
        LockState::Locked {
            target,
            phase: LockPhase::Steady
        }
    );
}

#[test]
fn test_rapier_wall_breaks_lock_and_blocks_acquisition() {
    let mut app = rapier_app();
    let (player, target) = spawn_rapier_actors(&mut app, Vec3::new(0.0, 0.0, -6.0));
    request(&mut app, LockOnRequest::lock(player));
    assert_eq!(session(&app, player).target(), Some(target));

    app.world_mut()
        .spawn((Collider::cuboid(1.0, 2.0, 0.2), Transform::from_xyz(0.0, 1.0, -3.0)));

    // break delay 2s при шаге 100ms
    for _ in 0..30 {
        app.update();
    }
    assert!(!session(&app, player).is_locked());
    assert_eq!(
        collected(&app).locked_off,
        vec![TargetLockedOff { owner: player, target }]
    );

    request(&mut app, LockOnRequest::lock(player));
    assert!(!session(&app, player).is_locked());
    assert_eq!(collected(&app).locked_on.len(), 1);
}

#[test]
fn test_rapier_without_physics_context_has_no_line_of_sight() {
    let mut world = World::new();

    let visible = world
        .run_system_once(|line_of_sight: RapierLineOfSight| {
            line_of_sight.probe_visibility(Vec3::ZERO, Vec3::new(0.0, 0.0, -5.0), &[])
        })
        .expect("system runs");

    assert!(!visible);
}
