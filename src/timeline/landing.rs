//! The landing page's animation sequence.

use super::segment::{Axis, Ease, Property, ScrollTrigger, Segment, TimelineError, Trigger};
use crate::page::PageRefs;
use crate::scene::{LightRefs, Pose, SceneRefs};

/// Live values some segments are relative to.
pub struct Baseline {
    pub camera: Pose,
    pub bin_light_intensity: f32,
}

fn fixed(duration: f32, offset: f32) -> Trigger {
    Trigger::Fixed { duration, offset }
}

fn scroll(section: &str, start: &str, end: &str) -> Result<Trigger, TimelineError> {
    ScrollTrigger::new(section, start, end).map(Trigger::Scroll)
}

fn pinned(section: &str, start: &str, end: &str) -> Result<Trigger, TimelineError> {
    ScrollTrigger::new(section, start, end).map(|t| Trigger::Scroll(t.pinned()))
}

/// Segments in declaration order. The bin segments are left out when the
/// model is missing.
pub fn segments(
    page: &PageRefs,
    scene: &SceneRefs,
    lights: &LightRefs,
    base: &Baseline,
) -> Result<Vec<Segment>, TimelineError> {
    use Property::*;

    let mut out = vec![
        // Intro text drops in on the clock
        Segment::from_values(page.heading, fixed(3.0, 0.0))
            .with(OffsetY, -100.0)
            .with(Opacity, 0.0)
            .ease(Ease::ExpoOut)
            .immediate(),
        Segment::from_values(page.paragraph, fixed(2.0, -2.0))
            .with(OffsetY, -10.0)
            .with(Opacity, 0.0)
            .ease(Ease::ExpoOut)
            .immediate(),
        Segment::from_values(page.button, fixed(2.0, -2.0))
            .with(OffsetY, 20.0)
            .with(Opacity, 0.0)
            .ease(Ease::ExpoOut)
            .immediate(),
        Segment::from_values(scene.camera, fixed(5.0, -3.0))
            .with(Rotation(Axis::X), 0.05)
            .ease(Ease::CubicOut)
            .immediate(),
        // Landing text slides out while the section is held
        Segment::to(page.landing_content, pinned("landing", "top top", "+=100%")?)
            .with(OffsetY, -100.0)
            .ease(Ease::Linear),
    ];

    if let Some(bin) = scene.bin {
        let trigger = scroll("landing", "bottom bottom", "+=100%")?;
        out.push(
            Segment::from_values(bin, trigger.clone())
                .with(Translation(Axis::X), 10.0)
                .with(Scale(Axis::X), 0.0)
                .with(Scale(Axis::Y), 0.0)
                .with(Scale(Axis::Z), 0.0)
                .immediate(),
        );
        out.push(
            Segment::to(bin, trigger)
                .with(Rotation(Axis::X), -8.5)
                .with(Rotation(Axis::Z), 0.6),
        );
    }

    let camera = base.camera.translation;
    out.extend([
        Segment::to(page.section_one_left, pinned("section-one", "top top", "+=100%")?)
            .with(OffsetY, -100.0)
            .ease(Ease::Linear),
        Segment::to(lights.bin_light, scroll("section-one", "top top", "+=100%")?)
            .with(Translation(Axis::Y), 100.0)
            .with(Translation(Axis::X), 150.0)
            .with(Intensity, base.bin_light_intensity * 1.5),
        Segment::to(scene.camera, scroll("section-two", "top bottom", "+=100%")?)
            .with(Translation(Axis::Z), camera.z - 400.0),
        Segment::to(scene.camera, pinned("section-two", "top top", "+=100%")?)
            .with(Translation(Axis::Y), camera.y + 100.0),
    ]);
    Ok(out)
}
