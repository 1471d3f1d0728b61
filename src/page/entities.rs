use bevy::prelude::*;

use crate::timeline::Property;

/// Animatable overlay state of a UI element.
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq)]
#[reflect(Component)]
pub struct PageElement {
    /// Vertical offset in percent of the element's own height.
    pub offset_y: f32,
    /// Multiplies the alpha of the element's text and background.
    pub opacity: f32,
}

impl Default for PageElement {
    fn default() -> Self {
        Self {
            offset_y: 0.0,
            opacity: 1.0,
        }
    }
}

impl PageElement {
    pub fn get(&self, property: Property) -> Option<f32> {
        match property {
            Property::OffsetY => Some(self.offset_y),
            Property::Opacity => Some(self.opacity),
            _ => None,
        }
    }

    pub fn set(&mut self, property: Property, value: f32) -> bool {
        match property {
            Property::OffsetY => self.offset_y = value,
            Property::Opacity => self.opacity = value.clamp(0.0, 1.0),
            _ => return false,
        }
        true
    }
}

/// Full-width node for one page section; `index` points into
/// [`PageLayout::sections`](super::PageLayout).
#[derive(Component)]
pub struct SectionNode {
    pub index: usize,
}

/// Text that takes its alpha from another entity's [`PageElement`].
#[derive(Component)]
pub struct FadeWith(pub Entity);

/// UI elements the landing timeline animates.
#[derive(Resource)]
pub struct PageRefs {
    /// Text block on the landing section, slid up as the page scrolls.
    pub landing_content: Entity,
    pub heading: Entity,
    pub paragraph: Entity,
    pub button: Entity,
    /// Left column of the first content section.
    pub section_one_left: Entity,
}
