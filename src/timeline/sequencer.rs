use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::segment::{Condition, Property, Segment, TimelineError, Trigger, Tween};
use crate::math;
use crate::page::PageLayout;

/// Smoothed progress closer than this to its target snaps onto it.
const SCRUB_SNAP: f32 = 1e-4;

/// Position of a segment relative to its window.
///
/// Moves `Pending → Active → Completed` as the playhead advances and back
/// again when it retreats.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SegmentState {
    #[default]
    Pending,
    Active,
    Completed,
}

impl SegmentState {
    fn from_progress(p: f32) -> Self {
        if p <= 0.0 {
            Self::Pending
        } else if p >= 1.0 {
            Self::Completed
        } else {
            Self::Active
        }
    }
}

/// Resolved active range of a segment: seconds for fixed segments, scroll
/// pixels for scroll-bound ones.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Window {
    pub start: f32,
    pub end: f32,
}

/// Current timeline position: the clock drives fixed segments, the page
/// scroll offset drives scroll-bound ones.
#[derive(Clone, Copy, Debug, Default)]
pub struct Playhead {
    pub elapsed: f32,
    pub scroll: f32,
}

/// One field update produced by an evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Write {
    pub target: Entity,
    pub property: Property,
    pub value: f32,
}

#[derive(Clone, Copy, Debug)]
struct Track {
    property: Property,
    from: f32,
    to: f32,
}

#[derive(Debug)]
struct Slot {
    segment: Segment,
    window: Window,
    section: Option<usize>,
    tracks: Vec<Track>,
    state: SegmentState,
    progress: f32,
    primed: bool,
}

/// Ordered, scroll-scrubbed sequence of property tweens.
///
/// Built once the scene exists: [`append`](Self::append) segments,
/// [`resolve`](Self::resolve) windows against the page layout,
/// [`capture`](Self::capture) entry values, then [`play`](Self::play).
#[derive(Resource, Debug, Default)]
pub struct Sequencer {
    slots: Vec<Slot>,
    section_shift: Vec<f32>,
    document_height: f32,
    clock: f32,
    playing: bool,
}

impl Sequencer {
    /// Adds a segment to the end of the sequence.
    pub fn append(&mut self, segment: Segment) -> Result<(), TimelineError> {
        if segment.values.is_empty() {
            return Err(TimelineError::EmptySegment);
        }
        self.slots.push(Slot {
            segment,
            window: Window::default(),
            section: None,
            tracks: Vec::new(),
            state: SegmentState::Pending,
            progress: 0.0,
            primed: false,
        });
        Ok(())
    }

    pub fn segment_count(&self) -> usize {
        self.slots.len()
    }

    /// Computes every segment's window.
    ///
    /// Fixed segments chain on the clock, each starting where the previous
    /// fixed segment ended plus its offset. Scroll segments resolve their
    /// conditions against `layout`; a pinned segment pushes every later section
    /// down by its range length for segments resolved after it.
    ///
    /// Segment states are left untouched, so this is also how the timeline is
    /// relaid out after a resize.
    pub fn resolve(&mut self, layout: &PageLayout) -> Result<(), TimelineError> {
        let vh = layout.viewport.y;
        let mut shift = vec![0.0; layout.sections.len()];
        let mut spacing = 0.0;
        let mut fixed_end = 0.0_f32;

        for slot in &mut self.slots {
            match &slot.segment.trigger {
                Trigger::Fixed { duration, offset } => {
                    let start = (fixed_end + offset).max(0.0);
                    let end = start + duration.max(0.0);
                    slot.window = Window { start, end };
                    fixed_end = end;
                }
                Trigger::Scroll(trigger) => {
                    let idx = layout
                        .index_of(&trigger.section)
                        .ok_or_else(|| TimelineError::UnknownSection(trigger.section.clone()))?;
                    let section = &layout.sections[idx];
                    let top = section.top + shift[idx];
                    let anchored = |c: Condition| match c {
                        Condition::Anchored { element, viewport } => {
                            Some(top + element.offset(section.height) - viewport.offset(vh))
                        }
                        Condition::Relative(_) => None,
                    };

                    let start = anchored(trigger.start)
                        .ok_or_else(|| TimelineError::RelativeStart(trigger.section.clone()))?;
                    let end = match trigger.end {
                        Condition::Relative(len) => start + len.resolve(vh),
                        anchored_end => anchored(anchored_end).unwrap_or(start),
                    };
                    if end <= start {
                        warn!(
                            "degenerate scroll range on `{}`: {start}..{end}",
                            trigger.section
                        );
                    }

                    slot.window = Window { start, end };
                    slot.section = Some(idx);
                    if trigger.pin {
                        let span = (end - start).max(0.0);
                        for s in shift.iter_mut().skip(idx + 1) {
                            *s += span;
                        }
                        spacing += span;
                    }
                }
            }
        }

        self.section_shift = shift;
        self.document_height = layout.height() + spacing;
        Ok(())
    }

    /// Re-resolves scroll windows for a new layout without resetting any
    /// segment's state or progress.
    pub fn relayout(&mut self, layout: &PageLayout) -> Result<(), TimelineError> {
        self.resolve(layout)?;
        debug!(
            "timeline relaid out for {}x{}, document height {}",
            layout.viewport.x, layout.viewport.y, self.document_height
        );
        Ok(())
    }

    /// Records start and end values for every animated field.
    ///
    /// A field's entry value is the end value of the previous segment (in
    /// declaration order) that animates the same field, or `read` of the live
    /// value when no earlier segment touches it. Fields `read` cannot resolve
    /// are skipped.
    pub fn capture(&mut self, read: impl Fn(Entity, Property) -> Option<f32>) {
        let mut current: HashMap<(Entity, Property), f32> = HashMap::default();
        for slot in &mut self.slots {
            slot.tracks.clear();
            let target = slot.segment.target;
            for &(property, value) in &slot.segment.values {
                let key = (target, property);
                let Some(base) = current.get(&key).copied().or_else(|| read(target, property))
                else {
                    warn!("timeline target {target} has no {property:?}; skipping");
                    continue;
                };
                let track = match slot.segment.tween {
                    Tween::To => Track {
                        property,
                        from: base,
                        to: value,
                    },
                    Tween::From => Track {
                        property,
                        from: value,
                        to: base,
                    },
                };
                current.insert(key, track.to);
                slot.tracks.push(track);
            }
        }
    }

    /// Starts the clock. Evaluation before `play` produces no writes.
    pub fn play(&mut self) {
        self.playing = true;
    }

    /// Advances the clock by `dt` and evaluates at the given scroll offset.
    pub fn tick(&mut self, dt: f32, scroll: f32) -> Vec<Write> {
        if self.playing {
            self.clock += dt;
        }
        let playhead = Playhead {
            elapsed: self.clock,
            scroll,
        };
        self.evaluate(playhead, dt)
    }

    /// Evaluates every segment at `playhead`.
    ///
    /// Active segments write interpolated values; segments that just crossed
    /// a window boundary write their entry or end values once, so scrubbing
    /// backwards restores fields exactly.
    ///
    /// Each field touched this frame gets one write, settled by state: the
    /// latest segment on the field that has started (or renders immediately)
    /// owns it, and when none has, the earliest segment's entry value does.
    pub fn evaluate(&mut self, playhead: Playhead, dt: f32) -> Vec<Write> {
        if !self.playing {
            return Vec::new();
        }

        let mut emitted = Vec::with_capacity(self.slots.len());
        for slot in &mut self.slots {
            let (position, scrub) = match &slot.segment.trigger {
                Trigger::Fixed { .. } => (playhead.elapsed, None),
                Trigger::Scroll(trigger) => (playhead.scroll, trigger.scrub),
            };
            let target = math::window_progress(position, slot.window.start, slot.window.end);
            slot.progress = match scrub {
                Some(tau) if slot.primed => {
                    math::smooth_toward(slot.progress, target, dt, tau, SCRUB_SNAP)
                }
                _ => target,
            };
            slot.primed = true;

            let next = SegmentState::from_progress(slot.progress);
            let changed = next != slot.state;
            slot.state = next;

            emitted.push(
                next == SegmentState::Active
                    || changed
                    || (slot.segment.immediate && next == SegmentState::Pending),
            );
        }

        // field -> (owning slot, touched this frame)
        let mut owners: HashMap<(Entity, Property), (usize, bool)> = HashMap::default();
        let mut order = Vec::new();
        for (i, slot) in self.slots.iter().enumerate() {
            let started = slot.state != SegmentState::Pending || slot.segment.immediate;
            for track in &slot.tracks {
                let key = (slot.segment.target, track.property);
                let (owner, touched) = owners.entry(key).or_insert_with(|| {
                    order.push(key);
                    (i, false)
                });
                *touched |= emitted[i];
                if started {
                    *owner = i;
                }
            }
        }

        order
            .into_iter()
            .filter_map(|key| {
                let &(owner, touched) = owners.get(&key)?;
                if !touched {
                    return None;
                }
                let slot = &self.slots[owner];
                let track = slot.tracks.iter().find(|t| t.property == key.1)?;
                let eased = slot.segment.ease.apply(slot.progress);
                Some(Write {
                    target: key.0,
                    property: key.1,
                    value: math::lerp(track.from, track.to, eased),
                })
            })
            .collect()
    }

    /// Whether an active segment is currently animating `property` on `target`.
    pub fn drives(&self, target: Entity, property: Property) -> bool {
        self.slots.iter().any(|slot| {
            slot.state == SegmentState::Active
                && slot.segment.target == target
                && slot.tracks.iter().any(|t| t.property == property)
        })
    }

    /// Extra downward offset that holds a pinned section in place while the
    /// page scrolls through its pin ranges.
    pub fn pin_offset(&self, section: usize, scroll: f32) -> f32 {
        self.slots
            .iter()
            .filter(|slot| slot.section == Some(section))
            .filter(|slot| matches!(&slot.segment.trigger, Trigger::Scroll(t) if t.pin))
            .map(|slot| {
                let end = slot.window.end.max(slot.window.start);
                scroll.clamp(slot.window.start, end) - slot.window.start
            })
            .sum()
    }

    /// Pin spacing inserted above a section by earlier pinned segments.
    pub fn section_shift(&self, section: usize) -> f32 {
        self.section_shift.get(section).copied().unwrap_or(0.0)
    }

    /// Document height including pin spacing.
    pub fn document_height(&self) -> f32 {
        self.document_height
    }

    #[cfg(test)]
    fn window(&self, i: usize) -> Window {
        self.slots[i].window
    }

    #[cfg(test)]
    fn state(&self, i: usize) -> SegmentState {
        self.slots[i].state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::segment::{Axis, Ease, ScrollTrigger};

    const VIEWPORT: Vec2 = Vec2::new(1280.0, 720.0);

    fn layout(viewport: Vec2) -> PageLayout {
        PageLayout::stack(
            viewport,
            [("landing", 1.0), ("section-one", 1.0), ("section-two", 1.5)],
        )
    }

    fn entities(n: usize) -> Vec<Entity> {
        let mut world = World::new();
        (0..n).map(|_| world.spawn_empty().id()).collect()
    }

    fn fixed(duration: f32, offset: f32) -> Trigger {
        Trigger::Fixed { duration, offset }
    }

    fn exact(section: &str, start: &str, end: &str) -> ScrollTrigger {
        let mut trigger = ScrollTrigger::new(section, start, end).unwrap();
        trigger.scrub = None;
        trigger
    }

    fn zero(_: Entity, _: Property) -> Option<f32> {
        Some(0.0)
    }

    fn value_of(writes: &[Write], property: Property) -> Option<f32> {
        writes
            .iter()
            .rev()
            .find(|w| w.property == property)
            .map(|w| w.value)
    }

    // ── building ────────────────────────────────────────────────────

    #[test]
    fn empty_segment_is_rejected() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        assert_eq!(
            seq.append(Segment::to(e, fixed(1.0, 0.0))),
            Err(TimelineError::EmptySegment)
        );
        assert_eq!(seq.segment_count(), 0);
    }

    #[test]
    fn unknown_section_fails_resolution() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(
            Segment::to(e, Trigger::Scroll(exact("footer", "top top", "+=100%")))
                .with(Property::Opacity, 0.0),
        )
        .unwrap();
        assert_eq!(
            seq.resolve(&layout(VIEWPORT)),
            Err(TimelineError::UnknownSection("footer".into()))
        );
    }

    #[test]
    fn relative_start_fails_resolution() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(
            Segment::to(e, Trigger::Scroll(exact("landing", "+=10%", "+=100%")))
                .with(Property::Opacity, 0.0),
        )
        .unwrap();
        assert_eq!(
            seq.resolve(&layout(VIEWPORT)),
            Err(TimelineError::RelativeStart("landing".into()))
        );
    }

    // ── window resolution ───────────────────────────────────────────

    #[test]
    fn fixed_windows_are_contiguous() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        for duration in [3.0, 0.5, 2.0, 1.25] {
            seq.append(Segment::to(e, fixed(duration, 0.0)).with(Property::Opacity, 1.0))
                .unwrap();
        }
        seq.resolve(&layout(VIEWPORT)).unwrap();
        assert_eq!(seq.window(0).start, 0.0);
        for i in 0..3 {
            assert_eq!(seq.window(i + 1).start, seq.window(i).end);
        }
        assert_eq!(seq.window(3).end, 6.75);
    }

    #[test]
    fn negative_offsets_overlap_previous_segment() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(Segment::to(e, fixed(3.0, 0.0)).with(Property::Opacity, 1.0))
            .unwrap();
        seq.append(Segment::to(e, fixed(2.0, -2.0)).with(Property::OffsetY, 0.0))
            .unwrap();
        seq.resolve(&layout(VIEWPORT)).unwrap();
        assert_eq!(seq.window(1), Window { start: 1.0, end: 3.0 });
    }

    #[test]
    fn top_top_plus_full_viewport_spans_one_viewport() {
        for heights in [0.5, 1.0, 3.0] {
            let viewport = Vec2::new(800.0, 600.0);
            let layout = PageLayout::stack(viewport, [("intro", 0.25), ("hero", heights)]);
            let e = entities(1)[0];
            let mut seq = Sequencer::default();
            seq.append(
                Segment::to(e, Trigger::Scroll(exact("hero", "top top", "+=100%")))
                    .with(Property::Opacity, 0.0),
            )
            .unwrap();
            seq.resolve(&layout).unwrap();
            let w = seq.window(0);
            assert_eq!(w.start, 150.0);
            assert_eq!(w.end - w.start, 600.0);
        }
    }

    #[test]
    fn anchored_conditions_resolve_against_section_box() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(
            Segment::to(e, Trigger::Scroll(exact("landing", "bottom bottom", "+=100%")))
                .with(Property::Opacity, 0.0),
        )
        .unwrap();
        seq.append(
            Segment::to(e, Trigger::Scroll(exact("section-two", "top bottom", "bottom top")))
                .with(Property::OffsetY, 0.0),
        )
        .unwrap();
        seq.resolve(&layout(VIEWPORT)).unwrap();
        assert_eq!(seq.window(0), Window { start: 0.0, end: 720.0 });
        // section-two spans 1440..2520
        assert_eq!(seq.window(1), Window { start: 720.0, end: 2520.0 });
    }

    #[test]
    fn pins_push_later_sections_down() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(
            Segment::to(
                e,
                Trigger::Scroll(exact("landing", "top top", "+=100%").pinned()),
            )
            .with(Property::OffsetY, -100.0),
        )
        .unwrap();
        seq.append(
            Segment::to(e, Trigger::Scroll(exact("section-one", "top top", "+=100%")))
                .with(Property::Opacity, 0.0),
        )
        .unwrap();
        seq.resolve(&layout(VIEWPORT)).unwrap();

        assert_eq!(seq.window(1).start, 1440.0);
        assert_eq!(seq.section_shift(0), 0.0);
        assert_eq!(seq.section_shift(1), 720.0);
        assert_eq!(seq.section_shift(2), 720.0);
        assert_eq!(seq.document_height(), 2520.0 + 720.0);

        assert_eq!(seq.pin_offset(0, 0.0), 0.0);
        assert_eq!(seq.pin_offset(0, 300.0), 300.0);
        assert_eq!(seq.pin_offset(0, 5000.0), 720.0);
        assert_eq!(seq.pin_offset(1, 300.0), 0.0);
    }

    // ── evaluation ──────────────────────────────────────────────────

    #[test]
    fn nothing_plays_before_play() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(Segment::to(e, fixed(1.0, 0.0)).with(Property::Opacity, 1.0))
            .unwrap();
        seq.resolve(&layout(VIEWPORT)).unwrap();
        seq.capture(zero);
        assert!(seq.tick(0.5, 0.0).is_empty());
        seq.play();
        assert_eq!(seq.tick(0.5, 0.0).len(), 1);
    }

    #[test]
    fn fixed_segments_follow_the_clock() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(
            Segment::to(e, fixed(2.0, 0.0))
                .with(Property::Translation(Axis::X), 10.0)
                .ease(Ease::Linear),
        )
        .unwrap();
        seq.resolve(&layout(VIEWPORT)).unwrap();
        seq.capture(zero);
        seq.play();

        let w = seq.tick(0.5, 0.0);
        assert!((value_of(&w, Property::Translation(Axis::X)).unwrap() - 2.5).abs() < 1e-5);
        assert_eq!(seq.state(0), SegmentState::Active);

        let w = seq.tick(5.0, 0.0);
        assert_eq!(value_of(&w, Property::Translation(Axis::X)), Some(10.0));
        assert_eq!(seq.state(0), SegmentState::Completed);
        assert!(seq.tick(1.0, 0.0).is_empty(), "completed segments stay quiet");
    }

    #[test]
    fn from_tween_runs_toward_captured_value() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(
            Segment::from_values(e, fixed(1.0, 0.0))
                .with(Property::Rotation(Axis::X), 0.05)
                .immediate(),
        )
        .unwrap();
        seq.resolve(&layout(VIEWPORT)).unwrap();
        seq.capture(|_, _| Some(0.0));
        seq.play();

        let w = seq.evaluate(Playhead::default(), 0.0);
        assert_eq!(value_of(&w, Property::Rotation(Axis::X)), Some(0.05));
        let w = seq.tick(2.0, 0.0);
        assert_eq!(value_of(&w, Property::Rotation(Axis::X)), Some(0.0));
    }

    #[test]
    fn scrubbing_back_restores_entry_values_exactly() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(
            Segment::to(e, Trigger::Scroll(exact("landing", "top top", "+=100%")))
                .with(Property::Translation(Axis::Z), 1100.0)
                .with(Property::Rotation(Axis::Y), 0.4),
        )
        .unwrap();
        seq.resolve(&layout(VIEWPORT)).unwrap();
        seq.capture(|_, p| match p {
            Property::Translation(Axis::Z) => Some(1500.0),
            Property::Rotation(Axis::Y) => Some(0.123_456),
            _ => None,
        });
        seq.play();

        for scroll in [100.0, 250.0, 719.0, 333.3] {
            let w = seq.tick(0.016, scroll);
            assert!(!w.is_empty());
        }
        let w = seq.tick(0.016, 0.0);
        assert_eq!(value_of(&w, Property::Translation(Axis::Z)), Some(1500.0));
        assert_eq!(value_of(&w, Property::Rotation(Axis::Y)), Some(0.123_456));
        assert_eq!(seq.state(0), SegmentState::Pending);
    }

    #[test]
    fn states_reverse_with_scroll() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(
            Segment::to(e, Trigger::Scroll(exact("section-one", "top top", "+=100%")))
                .with(Property::Opacity, 0.0),
        )
        .unwrap();
        seq.resolve(&layout(VIEWPORT)).unwrap();
        seq.capture(|_, _| Some(1.0));
        seq.play();

        let mut seen = Vec::new();
        for scroll in [0.0, 1000.0, 2000.0, 1000.0, 0.0] {
            seq.tick(0.016, scroll);
            seen.push(seq.state(0));
        }
        use SegmentState::*;
        assert_eq!(seen, vec![Pending, Active, Completed, Active, Pending]);
    }

    #[test]
    fn scrub_lags_behind_scroll() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        let trigger = ScrollTrigger::new("landing", "top top", "+=100%").unwrap();
        seq.append(
            Segment::to(e, Trigger::Scroll(trigger))
                .with(Property::Opacity, 0.0)
                .ease(Ease::Linear),
        )
        .unwrap();
        seq.resolve(&layout(VIEWPORT)).unwrap();
        seq.capture(|_, _| Some(1.0));
        seq.play();

        seq.tick(0.016, 0.0);
        let w = seq.tick(0.016, 720.0);
        let opacity = value_of(&w, Property::Opacity).unwrap();
        assert!(opacity > 0.9, "one frame of scrub should barely move, got {opacity}");

        let mut last = Vec::new();
        for _ in 0..1000 {
            let w = seq.tick(0.016, 720.0);
            if !w.is_empty() {
                last = w;
            }
        }
        assert_eq!(value_of(&last, Property::Opacity), Some(0.0));
        assert_eq!(seq.state(0), SegmentState::Completed);
    }

    #[test]
    fn chained_segments_start_from_previous_end() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(
            Segment::to(e, Trigger::Scroll(exact("landing", "top top", "+=100%")))
                .with(Property::Translation(Axis::Z), 1100.0),
        )
        .unwrap();
        seq.append(
            Segment::to(e, Trigger::Scroll(exact("section-one", "top top", "+=100%")))
                .with(Property::Translation(Axis::Z), 900.0)
                .ease(Ease::Linear),
        )
        .unwrap();
        seq.resolve(&layout(VIEWPORT)).unwrap();
        seq.capture(|_, _| Some(1500.0));
        seq.play();

        let w = seq.tick(0.016, 720.0 + 360.0);
        assert!((value_of(&w, Property::Translation(Axis::Z)).unwrap() - 1000.0).abs() < 1e-3);
    }

    #[test]
    fn overlapping_segments_later_declaration_wins() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(
            Segment::to(e, Trigger::Scroll(exact("landing", "top top", "+=100%")))
                .with(Property::Opacity, 0.5)
                .ease(Ease::Linear),
        )
        .unwrap();
        seq.append(
            Segment::to(e, Trigger::Scroll(exact("landing", "center top", "+=100%")))
                .with(Property::Opacity, 0.0)
                .ease(Ease::Linear),
        )
        .unwrap();
        seq.resolve(&layout(VIEWPORT)).unwrap();
        seq.capture(|_, _| Some(1.0));
        seq.play();

        let w = seq.tick(0.016, 540.0);
        let opacities: Vec<f32> = w
            .iter()
            .filter(|w| w.property == Property::Opacity)
            .map(|w| w.value)
            .collect();
        assert_eq!(opacities.len(), 1, "one settled write per field");
        // second segment enters at the first one's end value (0.5)
        assert!((opacities[0] - 0.375).abs() < 1e-5);
    }

    fn chained_dolly(scrub: Option<f32>) -> Sequencer {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        for (section, z) in [("landing", 1100.0), ("section-one", 900.0)] {
            let mut trigger = exact(section, "top top", "+=100%");
            trigger.scrub = scrub;
            seq.append(
                Segment::to(e, Trigger::Scroll(trigger)).with(Property::Translation(Axis::Z), z),
            )
            .unwrap();
        }
        seq.resolve(&layout(VIEWPORT)).unwrap();
        seq.capture(|_, _| Some(1500.0));
        seq.play();
        seq
    }

    /// Ticks at `scroll` until the sequencer goes quiet, returning the last
    /// value written to the dolly field.
    fn settle(seq: &mut Sequencer, scroll: f32) -> Option<f32> {
        let mut last = None;
        for _ in 0..2000 {
            let w = seq.tick(0.016, scroll);
            if let Some(z) = value_of(&w, Property::Translation(Axis::Z)) {
                last = Some(z);
            }
        }
        last
    }

    #[test]
    fn scrolling_back_through_chained_segments_restores_entry() {
        let mut seq = chained_dolly(None);
        seq.tick(0.016, 0.0);

        let w = seq.tick(0.016, 3000.0);
        assert_eq!(value_of(&w, Property::Translation(Axis::Z)), Some(900.0));
        assert_eq!(seq.state(0), SegmentState::Completed);
        assert_eq!(seq.state(1), SegmentState::Completed);

        let w = seq.tick(0.016, 0.0);
        assert_eq!(value_of(&w, Property::Translation(Axis::Z)), Some(1500.0));
        assert_eq!(seq.state(0), SegmentState::Pending);
        assert_eq!(seq.state(1), SegmentState::Pending);
    }

    #[test]
    fn scrolling_back_into_first_of_chained_segments_keeps_its_end() {
        let mut seq = chained_dolly(None);
        seq.tick(0.016, 3000.0);
        // between the two windows: first completed, second pending again
        let w = seq.tick(0.016, 720.0);
        assert_eq!(value_of(&w, Property::Translation(Axis::Z)), Some(1100.0));
    }

    #[test]
    fn scrubbed_chained_segments_settle_back_to_entry() {
        let mut seq = chained_dolly(Some(1.0));
        seq.tick(0.016, 0.0);
        assert_eq!(settle(&mut seq, 3000.0), Some(900.0));
        assert_eq!(settle(&mut seq, 0.0), Some(1500.0));
        assert_eq!(seq.state(0), SegmentState::Pending);
        assert_eq!(seq.state(1), SegmentState::Pending);
    }

    #[test]
    fn drives_reports_active_fields_only() {
        let ents = entities(2);
        let (earth, bin) = (ents[0], ents[1]);
        let mut seq = Sequencer::default();
        seq.append(
            Segment::to(earth, Trigger::Scroll(exact("landing", "top top", "+=100%")))
                .with(Property::Rotation(Axis::Y), 3.0),
        )
        .unwrap();
        seq.resolve(&layout(VIEWPORT)).unwrap();
        seq.capture(zero);
        seq.play();

        seq.tick(0.016, 0.0);
        assert!(!seq.drives(earth, Property::Rotation(Axis::Y)));
        seq.tick(0.016, 100.0);
        assert!(seq.drives(earth, Property::Rotation(Axis::Y)));
        assert!(!seq.drives(earth, Property::Rotation(Axis::X)));
        assert!(!seq.drives(bin, Property::Rotation(Axis::Y)));
        seq.tick(0.016, 2000.0);
        assert!(!seq.drives(earth, Property::Rotation(Axis::Y)));
    }

    #[test]
    fn missing_fields_are_skipped() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(
            Segment::to(e, fixed(1.0, 0.0))
                .with(Property::Intensity, 5.0)
                .with(Property::Opacity, 1.0),
        )
        .unwrap();
        seq.resolve(&layout(VIEWPORT)).unwrap();
        seq.capture(|_, p| (p == Property::Opacity).then_some(0.0));
        seq.play();
        let w = seq.tick(0.5, 0.0);
        assert_eq!(w.len(), 1);
        assert_eq!(w[0].property, Property::Opacity);
    }

    // ── resize ──────────────────────────────────────────────────────

    #[test]
    fn relayout_scales_ranges_and_keeps_states() {
        let e = entities(1)[0];
        let mut seq = Sequencer::default();
        seq.append(
            Segment::to(
                e,
                Trigger::Scroll(exact("landing", "top top", "+=100%").pinned()),
            )
            .with(Property::OffsetY, -100.0),
        )
        .unwrap();
        seq.append(
            Segment::to(e, Trigger::Scroll(exact("section-two", "top bottom", "+=100%")))
                .with(Property::Opacity, 0.0),
        )
        .unwrap();
        let small = Vec2::new(1280.0, 720.0);
        let large = Vec2::new(1920.0, 1080.0);
        seq.resolve(&layout(small)).unwrap();
        seq.capture(zero);
        seq.play();

        let scroll = 1000.0;
        seq.tick(0.016, scroll);
        assert_eq!(seq.state(0), SegmentState::Completed);
        let before = [seq.window(0), seq.window(1)];
        let state_before = seq.state(1);

        seq.relayout(&layout(large)).unwrap();
        let ratio = large.y / small.y;
        for (i, old) in before.iter().enumerate() {
            let new = seq.window(i);
            assert!((new.start - old.start * ratio).abs() < 1e-3);
            assert!(((new.end - new.start) - (old.end - old.start) * ratio).abs() < 1e-3);
        }
        assert_eq!(seq.state(0), SegmentState::Completed);

        seq.tick(0.016, scroll * ratio);
        assert_eq!(seq.state(0), SegmentState::Completed);
        assert_eq!(seq.state(1), state_before);
    }
}
