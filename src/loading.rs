//! Asset loading with a single ready transition.
//!
//! Issues every texture and model load at startup, mirrors aggregate progress
//! onto the loading overlay, and leaves [`GameState::Loading`] exactly once
//! when all loads have settled or the timeout expires.

mod coordinator;
mod entities;
mod systems;

pub use entities::SceneAssets;

use bevy::prelude::*;

use crate::GameState;

/// Per-plugin configuration for asset loading.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct LoadingConfig {
    /// Seconds to wait before failing every pending load. `None` waits forever.
    pub timeout_secs: Option<f32>,
    /// Width of the progress slider track in logical pixels.
    pub track_width: f32,
    /// State entered once loading finishes.
    pub ready_state: GameState,
}

impl Default for LoadingConfig {
    fn default() -> Self {
        Self {
            timeout_secs: Some(30.0),
            track_width: 100.0,
            ready_state: GameState::Running,
        }
    }
}

/// Loads textures and models, drives the overlay, fires the ready transition.
pub struct LoadingPlugin(pub LoadingConfig);

impl Plugin for LoadingPlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<LoadingConfig>()
            .insert_resource(self.0.clone())
            .add_systems(Startup, (systems::start_loads, systems::spawn_overlay))
            .add_systems(
                Update,
                systems::poll_loads.run_if(in_state(GameState::Loading)),
            )
            .add_systems(
                OnExit(GameState::Loading),
                systems::reveal_surface.in_set(crate::ReadySet::Reveal),
            );
    }
}
