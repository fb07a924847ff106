//! Demo arena: игрок в центре, кружащие мишени, колонны-occluders
//!
//! Используется headless runner'ом, determinism тестами и client'ом.
//! Раскладка берётся из DeterministicRng → одинаковый seed = одинаковая арена.

use bevy::prelude::*;
use bevy_rapier3d::prelude::Collider;
use rand::Rng;

use crate::components::{Health, Player, TargetClass, Targetable};
use crate::config::LockOnConfig;
use crate::lifecycle::{despawn_pending_destroy, mark_dead_actors};
use crate::lock::{LockOnRequest, LockOnSystems, LockSession, TargetLockChanged};
use crate::visibility::Occluder;
use crate::DeterministicRng;

/// Мишень, кружащая вокруг `center`
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Wanderer {
    pub center: Vec3,
    pub radius: f32,
    /// Радиан в секунду (знак = направление)
    pub angular_speed: f32,
    pub phase: f32,
}

impl Wanderer {
    pub fn position(&self) -> Vec3 {
        self.center + Vec3::new(self.phase.cos(), 0.0, self.phase.sin()) * self.radius
    }
}

/// Параметры раскладки арены
#[derive(Debug, Clone)]
pub struct ArenaLayout {
    pub enemy_count: usize,
    pub ally_count: usize,
    pub pillar_count: usize,
    /// Кольцо спавна мишеней вокруг игрока
    pub min_radius: f32,
    pub max_radius: f32,
    /// Rapier colliders на акторах и колоннах (для LineOfSightBackend::Rapier)
    pub with_colliders: bool,
    pub config: LockOnConfig,
}

impl Default for ArenaLayout {
    fn default() -> Self {
        Self {
            enemy_count: 6,
            ally_count: 2,
            pillar_count: 3,
            min_radius: 4.0,
            max_radius: 10.0,
            with_colliders: false,
            config: LockOnConfig {
                targetable_classes: crate::config::TargetClassFilter::only("enemy"),
                should_control_rotation: true,
                ..default()
            },
        }
    }
}

/// Спавнит арену, возвращает entity игрока
pub fn spawn_arena(world: &mut World, layout: &ArenaLayout) -> Entity {
    let mut player = world.spawn((
        Name::new("Player"),
        Player,
        Transform::default(),
        layout.config.clone(),
    ));
    if layout.with_colliders {
        player.insert(actor_collider());
    }
    let player = player.id();

    world.resource_scope(|world, mut rng: Mut<DeterministicRng>| {
        let classes = std::iter::repeat("enemy")
            .take(layout.enemy_count)
            .chain(std::iter::repeat("ally").take(layout.ally_count));

        for (index, class) in classes.enumerate() {
            let angle = rng.rng.gen_range(0.0..std::f32::consts::TAU);
            let radius = rng.rng.gen_range(layout.min_radius..layout.max_radius);
            let wanderer = Wanderer {
                center: Vec3::new(angle.sin() * radius, 0.0, -angle.cos() * radius),
                radius: rng.rng.gen_range(0.5..1.5),
                angular_speed: rng.rng.gen_range(-1.0..1.0),
                phase: rng.rng.gen_range(0.0..std::f32::consts::TAU),
            };

            let mut target = world.spawn((
                Name::new(format!("{class}_{index}")),
                TargetClass::new(class),
                Targetable::default(),
                Health::new(100),
                Transform::from_translation(wanderer.position()),
                wanderer,
            ));
            if layout.with_colliders {
                target.insert(actor_collider());
            }
        }

        for index in 0..layout.pillar_count {
            let angle = rng.rng.gen_range(0.0..std::f32::consts::TAU);
            let radius = rng.rng.gen_range(2.0..layout.min_radius);
            let occluder = Occluder::cuboid(0.4, 2.0, 0.4);
            let mut pillar = world.spawn((
                Name::new(format!("pillar_{index}")),
                occluder,
                Transform::from_xyz(angle.sin() * radius, 1.0, -angle.cos() * radius),
            ));
            if layout.with_colliders {
                let half = occluder.half_extents;
                pillar.insert(Collider::cuboid(half.x, half.y, half.z));
            }
        }
    });

    crate::log_info(&format!(
        "🏟️ Arena: {} enemies, {} allies, {} pillars (player {:?})",
        layout.enemy_count, layout.ally_count, layout.pillar_count, player
    ));

    player
}

/// Collider на самом actor entity (иначе ignore set LOS его не отфильтрует)
fn actor_collider() -> Collider {
    Collider::capsule_y(0.5, 0.4)
}

/// System: мишени двигаются по кругу
pub fn move_wanderers(time: Res<Time<Fixed>>, mut wanderers: Query<(&mut Wanderer, &mut Transform)>) {
    let delta = time.delta_secs();
    for (mut wanderer, mut transform) in wanderers.iter_mut() {
        wanderer.phase += wanderer.angular_speed * delta;
        transform.translation = wanderer.position();
    }
}

/// Счётчик fixed ticks сценария
#[derive(Resource, Debug, Default)]
pub struct ScenarioClock {
    pub tick: u64,
}

/// Одна запись lock trace (entity индексы, без generation)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockTraceEntry {
    pub tick: u64,
    pub owner: u32,
    pub target: u32,
    pub locked: bool,
}

/// Полная история lock-on/lock-off за прогон
#[derive(Resource, Debug, Default)]
pub struct LockTrace {
    pub entries: Vec<LockTraceEntry>,
}

/// Скриптованный input игрока (headless демо)
///
/// 10: lock, каждые 60 ticks: switch (чередуя стороны),
/// 300: убить текущую цель, 420: toggle off, 450: toggle on.
pub fn scripted_requests(
    mut clock: ResMut<ScenarioClock>,
    players: Query<(Entity, &LockSession), With<Player>>,
    mut healths: Query<&mut Health>,
    mut requests: EventWriter<LockOnRequest>,
) {
    clock.tick += 1;
    let tick = clock.tick;

    for (player, session) in players.iter() {
        match tick {
            10 => {
                requests.write(LockOnRequest::lock(player));
            }
            300 => {
                if let Some(mut health) = session.target().and_then(|t| healths.get_mut(t).ok()) {
                    let max = health.max;
                    health.take_damage(max);
                }
            }
            420 | 450 => {
                requests.write(LockOnRequest::toggle(player));
            }
            t if t % 60 == 0 => {
                let axis = if (t / 60) % 2 == 0 { -1.0 } else { 1.0 };
                requests.write(LockOnRequest::axis(player, axis));
            }
            _ => {}
        }
    }
}

/// System: пишет TargetLockChanged в LockTrace (в порядке возникновения)
pub fn record_lock_trace(
    clock: Res<ScenarioClock>,
    mut trace: ResMut<LockTrace>,
    mut changes: EventReader<TargetLockChanged>,
) {
    for event in changes.read() {
        trace.entries.push(LockTraceEntry {
            tick: clock.tick,
            owner: event.owner.index(),
            target: event.target.index(),
            locked: event.locked,
        });
    }
}

/// Арена: движение мишеней + lifecycle; `scripted` добавляет демо input и trace
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioPlugin {
    pub scripted: bool,
}

impl Plugin for ScenarioPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                (move_wanderers, mark_dead_actors).before(LockOnSystems),
                despawn_pending_destroy.after(LockOnSystems),
            ),
        );

        if self.scripted {
            app.init_resource::<ScenarioClock>()
                .init_resource::<LockTrace>()
                .add_systems(
                    FixedUpdate,
                    (
                        scripted_requests.before(mark_dead_actors).before(LockOnSystems),
                        record_lock_trace.after(LockOnSystems),
                    ),
                );
        }
    }
}
