use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use super::landing::{self, Baseline};
use super::segment::{Property, TimelineError};
use super::sequencer::{Sequencer, Write};
use crate::page::{PageElement, PageLayout, PageRefs, ScrollState};
use crate::scene::{LightRefs, Pose, SceneRefs};

/// Every component the timeline can read from or write to.
#[derive(SystemParam)]
pub struct Animatables<'w, 's> {
    poses: Query<'w, 's, &'static mut Pose>,
    elements: Query<'w, 's, &'static mut PageElement>,
    lights: Query<'w, 's, &'static mut PointLight>,
}

impl Animatables<'_, '_> {
    fn read(&self, target: Entity, property: Property) -> Option<f32> {
        match property {
            Property::OffsetY | Property::Opacity => self.elements.get(target).ok()?.get(property),
            Property::Intensity => self.lights.get(target).ok().map(|light| light.intensity),
            _ => self.poses.get(target).ok()?.get(property),
        }
    }

    fn write(&mut self, write: &Write) {
        let applied = match write.property {
            Property::OffsetY | Property::Opacity => self
                .elements
                .get_mut(write.target)
                .is_ok_and(|mut el| el.set(write.property, write.value)),
            Property::Intensity => match self.lights.get_mut(write.target) {
                Ok(mut light) => {
                    light.intensity = write.value;
                    true
                }
                Err(_) => false,
            },
            _ => self
                .poses
                .get_mut(write.target)
                .is_ok_and(|mut pose| pose.set(write.property, write.value)),
        };
        if !applied {
            debug!("timeline target {} is gone", write.target);
        }
    }
}

/// Builds the landing sequence, captures entry values, and starts it.
///
/// Runs last in the ready transition, once the scene and lights exist.
pub fn build_timeline(
    mut commands: Commands,
    page: Res<PageRefs>,
    scene: Option<Res<SceneRefs>>,
    lights: Option<Res<LightRefs>>,
    layout: Res<PageLayout>,
    mut scroll: ResMut<ScrollState>,
    anim: Animatables,
) {
    let (Some(scene), Some(lights)) = (scene, lights) else {
        error!("scene not populated; timeline disabled");
        return;
    };
    let Ok(camera) = anim.poses.get(scene.camera).copied() else {
        error!("camera has no pose; timeline disabled");
        return;
    };
    let base = Baseline {
        camera,
        bin_light_intensity: anim
            .read(lights.bin_light, Property::Intensity)
            .unwrap_or_default(),
    };

    let mut seq = Sequencer::default();
    let built: Result<(), TimelineError> =
        landing::segments(&page, &scene, &lights, &base).and_then(|segments| {
            for segment in segments {
                seq.append(segment)?;
            }
            seq.resolve(&layout)
        });
    if let Err(err) = built {
        error!("timeline not built: {err}");
        return;
    }

    seq.capture(|target, property| anim.read(target, property));
    seq.play();
    scroll.max = (seq.document_height() - layout.viewport.y).max(0.0);
    info!(
        "timeline playing: {} segments, document height {}",
        seq.segment_count(),
        seq.document_height()
    );
    commands.insert_resource(seq);
}

/// Advances the clock and applies this frame's writes.
pub fn advance_timeline(
    time: Res<Time>,
    scroll: Res<ScrollState>,
    mut seq: ResMut<Sequencer>,
    mut anim: Animatables,
) {
    for write in seq.tick(time.delta_secs(), scroll.offset) {
        anim.write(&write);
    }
}
