use bevy::prelude::*;

/// One full-width page section in document coordinates (logical pixels).
#[derive(Clone, Debug, PartialEq)]
pub struct SectionBox {
    pub name: String,
    /// Distance from the document top, before pin spacing.
    pub top: f32,
    pub height: f32,
}

/// Virtual document the scroll timeline resolves its triggers against.
///
/// Sections stack vertically and are sized in viewport heights, so the whole
/// layout scales with the window.
#[derive(Resource, Clone, Debug)]
pub struct PageLayout {
    pub viewport: Vec2,
    pub sections: Vec<SectionBox>,
}

impl PageLayout {
    /// Stacks `(name, height in viewport heights)` pairs top to bottom.
    pub fn stack<'a>(viewport: Vec2, sections: impl IntoIterator<Item = (&'a str, f32)>) -> Self {
        let mut top = 0.0;
        let sections = sections
            .into_iter()
            .map(|(name, vh)| {
                let height = vh * viewport.y;
                let section = SectionBox {
                    name: name.to_owned(),
                    top,
                    height,
                };
                top += height;
                section
            })
            .collect();
        Self { viewport, sections }
    }

    /// Index of the named section.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.sections.iter().position(|s| s.name == name)
    }

    /// Document height without pin spacing.
    pub fn height(&self) -> f32 {
        self.sections.last().map_or(0.0, |s| s.top + s.height)
    }
}

/// Page scroll offset, clamped to the scrollable range.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct ScrollState {
    /// Pixels scrolled from the document top.
    pub offset: f32,
    /// Largest reachable offset (document height minus viewport height).
    pub max: f32,
    /// Ignores input while the loading overlay is up.
    pub locked: bool,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self {
            offset: 0.0,
            max: 0.0,
            locked: true,
        }
    }
}

impl ScrollState {
    /// Scrolls by `delta` pixels (positive is down). Returns `true` if the
    /// offset changed.
    pub fn scroll_by(&mut self, delta: f32) -> bool {
        if self.locked {
            return false;
        }
        let next = (self.offset + delta).clamp(0.0, self.max.max(0.0));
        let changed = next != self.offset;
        self.offset = next;
        changed
    }

    /// Jumps to an absolute offset, clamped to the scrollable range.
    pub fn scroll_to(&mut self, offset: f32) -> bool {
        self.scroll_by(offset - self.offset)
    }

    /// Updates the scrollable range for a new document height, keeping the
    /// offset at the same fraction of the document when the viewport scales.
    pub fn rescale(&mut self, old_viewport_height: f32, new_viewport_height: f32, max: f32) {
        if old_viewport_height > 0.0 {
            self.offset *= new_viewport_height / old_viewport_height;
        }
        self.max = max.max(0.0);
        self.offset = self.offset.clamp(0.0, self.max);
    }
}
