use std::str::FromStr;

use bevy::prelude::*;

use crate::math;

/// Errors raised while building or resolving a timeline.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TimelineError {
    #[error("segment declares no end values")]
    EmptySegment,
    #[error("no page section named `{0}`")]
    UnknownSection(String),
    #[error("cannot parse trigger condition `{0}`")]
    BadCondition(String),
    #[error("start condition for section `{0}` must be anchored, not relative")]
    RelativeStart(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub fn get(self, v: Vec3) -> f32 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
            Axis::Z => v.z,
        }
    }

    pub fn set(self, v: &mut Vec3, value: f32) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
            Axis::Z => v.z = value,
        }
    }
}

/// A single animatable numeric field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Property {
    /// `Pose::translation` component.
    Translation(Axis),
    /// `Pose::rotation` Euler angle, radians.
    Rotation(Axis),
    /// `Pose::scale` component.
    Scale(Axis),
    /// Vertical UI offset in percent of the element's own height.
    OffsetY,
    /// UI element opacity in `[0, 1]`.
    Opacity,
    /// Point light intensity.
    Intensity,
}

/// Easing curve applied to normalized progress.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Ease {
    Linear,
    #[default]
    QuadOut,
    CubicOut,
    ExpoOut,
}

impl Ease {
    pub fn apply(self, t: f32) -> f32 {
        match self {
            Ease::Linear => t,
            Ease::QuadOut => math::ease_out_quad(t),
            Ease::CubicOut => math::ease_out_cubic(t),
            Ease::ExpoOut => math::ease_out_expo(t),
        }
    }
}

/// Direction of a tween relative to the declared values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tween {
    /// From the value at window entry to the declared value.
    To,
    /// From the declared value back to the value captured at build time.
    From,
}

/// A length along the scroll axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    /// Percent of the reference extent.
    Percent(f32),
    Px(f32),
}

impl Length {
    pub fn resolve(self, extent: f32) -> f32 {
        match self {
            Length::Percent(p) => p / 100.0 * extent,
            Length::Px(px) => px,
        }
    }
}

impl FromStr for Length {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || TimelineError::BadCondition(s.to_owned());
        let s = s.trim();
        let (num, ctor): (&str, fn(f32) -> Length) = if let Some(n) = s.strip_suffix('%') {
            (n, Length::Percent)
        } else if let Some(n) = s.strip_suffix("px") {
            (n, Length::Px)
        } else {
            (s, Length::Px)
        };
        num.trim().parse::<f32>().map(ctor).map_err(|_| bad())
    }
}

/// Point on a box measured from its top edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    Top,
    Center,
    Bottom,
    At(Length),
}

impl Anchor {
    /// Offset from the top of a box `extent` tall.
    pub fn offset(self, extent: f32) -> f32 {
        match self {
            Anchor::Top => 0.0,
            Anchor::Center => extent / 2.0,
            Anchor::Bottom => extent,
            Anchor::At(len) => len.resolve(extent),
        }
    }
}

impl FromStr for Anchor {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "top" => Ok(Anchor::Top),
            "center" => Ok(Anchor::Center),
            "bottom" => Ok(Anchor::Bottom),
            other => other.parse().map(Anchor::At),
        }
    }
}

/// Scroll position at which a trigger boundary is reached.
///
/// Parsed from `"<element> <viewport>"` (e.g. `"top top"`: the section's top
/// meets the viewport's top) or `"+=<length>"`, relative to the resolved start
/// with percentages taken of the viewport height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Condition {
    Anchored { element: Anchor, viewport: Anchor },
    Relative(Length),
}

impl FromStr for Condition {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || TimelineError::BadCondition(s.to_owned());
        if let Some(rest) = s.trim().strip_prefix("+=") {
            return rest.parse().map(Condition::Relative).map_err(|_| bad());
        }
        let mut parts = s.split_whitespace();
        let (Some(element), Some(viewport), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(bad());
        };
        Ok(Condition::Anchored {
            element: element.parse().map_err(|_| bad())?,
            viewport: viewport.parse().map_err(|_| bad())?,
        })
    }
}

/// Scroll-bound trigger: a section plus start/end conditions.
#[derive(Clone, Debug, PartialEq)]
pub struct ScrollTrigger {
    /// Page section whose box the conditions refer to.
    pub section: String,
    pub start: Condition,
    pub end: Condition,
    /// Smoothing time constant in seconds; `None` follows scroll exactly.
    pub scrub: Option<f32>,
    /// Holds the section fixed on screen for the trigger's range.
    pub pin: bool,
}

impl ScrollTrigger {
    /// Parses both conditions; scrub defaults to one second, no pin.
    pub fn new(section: &str, start: &str, end: &str) -> Result<Self, TimelineError> {
        Ok(Self {
            section: section.to_owned(),
            start: start.parse()?,
            end: end.parse()?,
            scrub: Some(1.0),
            pin: false,
        })
    }

    pub fn pinned(mut self) -> Self {
        self.pin = true;
        self
    }
}

/// What drives a segment's progress.
#[derive(Clone, Debug, PartialEq)]
pub enum Trigger {
    /// Plays on the clock, chained after the previous fixed segment.
    Fixed {
        duration: f32,
        /// Shift relative to the previous fixed segment's end (may be negative).
        offset: f32,
    },
    Scroll(ScrollTrigger),
}

/// One animation step: a target, the fields it moves, and what drives it.
#[derive(Clone, Debug)]
pub struct Segment {
    pub target: Entity,
    pub tween: Tween,
    pub values: Vec<(Property, f32)>,
    pub trigger: Trigger,
    pub ease: Ease,
    /// Writes start values while still pending, before the window is reached.
    pub immediate: bool,
}

impl Segment {
    pub fn to(target: Entity, trigger: Trigger) -> Self {
        Self {
            target,
            tween: Tween::To,
            values: Vec::new(),
            trigger,
            ease: Ease::default(),
            immediate: false,
        }
    }

    pub fn from_values(target: Entity, trigger: Trigger) -> Self {
        Self {
            tween: Tween::From,
            ..Self::to(target, trigger)
        }
    }

    pub fn with(mut self, property: Property, value: f32) -> Self {
        self.values.push((property, value));
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn immediate(mut self) -> Self {
        self.immediate = true;
        self
    }
}
