//! ECS Components для lock-on симуляции
//!
//! Организация по доменам:
//! - actor: что делает entity таргетируемым (TargetClass, Targetable, Health, PendingDestroy)
//! - movement: ориентация персонажа (CharacterOrientation)
//! - player: player control marker (Player)
//! - camera: view pose для viewport проверок (LockOnView)

pub mod actor;
pub mod camera;
pub mod movement;
pub mod player;

// Re-exports для удобного импорта
pub use actor::*;
pub use camera::*;
pub use movement::*;
pub use player::*;
