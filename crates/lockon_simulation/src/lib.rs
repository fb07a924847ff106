//! Lock-On Simulation Core
//!
//! Target lock-on для third-person персонажа на Bevy 0.16:
//! выбор цели, переключение по axis input, удержание при потере видимости,
//! поворот control rotation к цели.
//!
//! Слои:
//! - geometry / targeting / lock::machine: чистая логика (тестируется без App)
//! - visibility: LOS бэкенды (Occluder volumes, bevy_rapier3d raycast)
//! - lock::systems / presentation: ECS обвязка в FixedUpdate

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod components;
pub mod config;
pub mod geometry;
pub mod lifecycle;
pub mod lock;
pub mod logger;
pub mod scenario;
pub mod targeting;
pub mod visibility;

// Re-export для удобства
pub use components::*;
pub use config::{ConfigError, IndicatorConfig, LockOnConfig, RotationBasis, TargetClassFilter};
pub use geometry::ControlRotation;
pub use lock::{
    LineOfSightBackend, LockOnPlugin, LockOnRequest, LockOnSystems, LockPhase, LockRequestKind, LockSession,
    LockState, LockedOnIndicator, RotationHandler, RotationStrategy, TargetLockChanged, TargetLockedOff,
    TargetLockedOn, TargetSetRotation,
};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, log_with_level, set_log_level, set_logger,
    set_logger_if_needed, LogLevel, LogPrinter,
};
pub use visibility::{Occluder, VisibilityProbe};

/// Главный plugin симуляции
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulationPlugin {
    pub line_of_sight: LineOfSightBackend,
}

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        // Seed из create_headless_app не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        // Timestep задаёт хост (create_headless_app или client main)
        app.add_plugins(LockOnPlugin {
            line_of_sight: self.line_of_sight,
        });
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Шаг headless симуляции (один FixedUpdate на app.update())
pub const HEADLESS_STEP: Duration = Duration::from_nanos(16_666_667);

/// Создаёт minimal Bevy App для headless симуляции
///
/// Время ручное: каждый update продвигает часы ровно на один fixed tick,
/// независимо от wall clock.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_duration(HEADLESS_STEP)) // ~60Hz FixedUpdate
        .insert_resource(TimeUpdateStrategy::ManualDuration(HEADLESS_STEP));

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    let mut snapshot = Vec::new();
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
