//! Scroll-driven animation timeline.
//!
//! A [`Sequencer`] holds an ordered list of tweens. Fixed segments play on the
//! clock, chained one after another; scroll segments map a pixel range of the
//! page onto their progress, optionally smoothed (scrub) and optionally
//! pinning their section on screen. Scrolling back up replays everything in
//! reverse and restores the captured entry values.

mod landing;
mod segment;
mod sequencer;
mod systems;

pub use segment::{Axis, Property};
pub use sequencer::Sequencer;

use bevy::prelude::*;

use crate::{FrameSet, GameState, ReadySet};

/// Builds the landing timeline on the ready transition and advances it each
/// frame.
pub struct TimelinePlugin;

impl Plugin for TimelinePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnExit(GameState::Loading),
            systems::build_timeline.in_set(ReadySet::Animate),
        )
        .add_systems(
            Update,
            systems::advance_timeline
                .run_if(resource_exists::<Sequencer>)
                .in_set(FrameSet::Animate),
        );
    }
}
