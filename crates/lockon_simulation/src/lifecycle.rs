//! Actor lifecycle: смерть → PendingDestroy → despawn
//!
//! Между пометкой и despawn lock-on успевает отпустить цель на своём tick
//! (PendingDestroy проваливает validity до LOS проверки).

use bevy::prelude::*;

use crate::components::{Health, PendingDestroy};

/// Мёртвые акторы помечаются на удаление
pub fn mark_dead_actors(
    mut commands: Commands,
    actors: Query<(Entity, &Health), Without<PendingDestroy>>,
) {
    for (entity, health) in actors.iter() {
        if !health.is_alive() {
            commands.entity(entity).insert(PendingDestroy);
            crate::log(&format!("💀 Actor {:?} died, pending destroy", entity));
        }
    }
}

/// Despawn помеченных (после lock-on систем)
pub fn despawn_pending_destroy(mut commands: Commands, pending: Query<Entity, With<PendingDestroy>>) {
    for entity in pending.iter() {
        commands.entity(entity).despawn();
    }
}
