use bevy::prelude::*;

use crate::timeline::Property;

/// Animatable placement of a scene object.
///
/// Rotation is stored as XYZ Euler angles so the timeline can tween each axis
/// independently; [`sync_poses`](super::systems::sync_poses) writes it into
/// the entity's `Transform`.
#[derive(Component, Reflect, Clone, Copy, Debug, PartialEq)]
#[reflect(Component)]
pub struct Pose {
    /// World-space position.
    pub translation: Vec3,
    /// Euler angles in radians, applied X then Y then Z.
    pub rotation: Vec3,
    /// Per-axis scale.
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Pose {
    pub fn new(translation: Vec3, rotation: Vec3) -> Self {
        Self {
            translation,
            rotation,
            ..default()
        }
    }

    pub fn get(&self, property: Property) -> Option<f32> {
        match property {
            Property::Translation(axis) => Some(axis.get(self.translation)),
            Property::Rotation(axis) => Some(axis.get(self.rotation)),
            Property::Scale(axis) => Some(axis.get(self.scale)),
            _ => None,
        }
    }

    pub fn set(&mut self, property: Property, value: f32) -> bool {
        match property {
            Property::Translation(axis) => axis.set(&mut self.translation, value),
            Property::Rotation(axis) => axis.set(&mut self.rotation, value),
            Property::Scale(axis) => axis.set(&mut self.scale, value),
            _ => return false,
        }
        true
    }

    pub fn transform(&self) -> Transform {
        let r = self.rotation;
        Transform {
            translation: self.translation,
            rotation: Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
            scale: self.scale,
        }
    }
}

/// Continuous rotation about the local Y axis.
#[derive(Component, Reflect, Clone, Copy, Debug)]
#[reflect(Component)]
pub struct Spin {
    /// Radians per second.
    pub rate: f32,
}

/// Marker for the scene camera.
#[derive(Component)]
pub struct MainCamera;

/// Keeps the entity's height level with the camera.
#[derive(Component)]
pub struct FollowCameraY;

/// Scene entities the timeline animates.
#[derive(Resource)]
pub struct SceneRefs {
    /// The main camera.
    pub camera: Entity,
    /// Absent when the model failed to load.
    pub bin: Option<Entity>,
}

/// Lights spawned after the scene is populated.
#[derive(Resource)]
pub struct LightRefs {
    /// Point light that brightens while section one is on screen.
    pub bin_light: Entity,
}
