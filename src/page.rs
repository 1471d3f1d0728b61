//! Scrolling page overlaid on the 3D scene.
//!
//! Owns the virtual document the timeline resolves triggers against, the
//! scroll offset (mouse wheel and keyboard), and the UI nodes for each page
//! section. Section nodes follow the scroll offset unless a pinned timeline
//! segment holds them in place.

mod entities;
mod layout;
mod systems;

pub use entities::{PageElement, PageRefs};
pub use layout::{PageLayout, ScrollState};

use bevy::prelude::*;

use crate::FrameSet;

/// Per-plugin configuration for the page overlay.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct PageConfig {
    /// Section names top to bottom, with heights in viewport heights.
    pub sections: Vec<(String, f32)>,
    /// Pixels scrolled per mouse-wheel line or arrow key press.
    pub line_px: f32,
    /// Fraction of the viewport scrolled by PageUp/PageDown.
    pub page_fraction: f32,
    /// Viewport assumed when no primary window exists yet.
    pub fallback_viewport: Vec2,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            sections: vec![
                ("landing".into(), 1.0),
                ("section-one".into(), 1.0),
                ("section-two".into(), 1.0),
            ],
            line_px: 60.0,
            page_fraction: 0.9,
            fallback_viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

impl PageConfig {
    pub fn layout(&self, viewport: Vec2) -> PageLayout {
        PageLayout::stack(
            viewport,
            self.sections.iter().map(|(name, vh)| (name.as_str(), *vh)),
        )
    }
}

/// Page sections, scroll input, and resize handling.
pub struct PagePlugin(pub PageConfig);

impl Plugin for PagePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<PageConfig>()
            .register_type::<PageElement>()
            .register_type::<ScrollState>()
            .insert_resource(self.0.clone())
            .init_resource::<ScrollState>()
            .add_systems(Startup, systems::spawn_page)
            .add_systems(
                Update,
                (systems::scroll_input, systems::handle_resize).in_set(FrameSet::Input),
            )
            .add_systems(
                Update,
                (systems::place_sections, systems::apply_page_elements).in_set(FrameSet::Present),
            );
    }
}
