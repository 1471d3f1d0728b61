//! The 3D scene behind the page.
//!
//! Spawns the camera at startup; everything that needs loaded assets (Earth,
//! clouds, starfield, recycling bin) is added in the ready transition, followed
//! by the lights. Each frame the Earth and clouds spin, the bin tracks the
//! camera height, and [`Pose`] is synced into `Transform`.

mod entities;
mod starfield;
mod systems;

pub use entities::{LightRefs, Pose, SceneRefs};

use bevy::prelude::*;

use crate::{FrameSet, GameState, ReadySet};

/// Per-plugin configuration for the scene.
#[derive(Resource, Clone, Debug, Reflect)]
pub struct SceneConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clip plane distance.
    pub near: f32,
    /// Far clip plane distance; must reach the far side of the starfield.
    pub far: f32,
    /// Camera start position, looking down -Z at the Earth.
    pub camera_position: Vec3,
    /// Radius of the Earth sphere.
    pub earth_radius: f32,
    /// Radius of the cloud shell, just above the surface.
    pub cloud_radius: f32,
    /// Sectors and stacks of both sphere meshes.
    pub sphere_segments: u32,
    /// Parallax depth of the bump map.
    pub bump_scale: f32,
    /// Earth spin in radians per second.
    pub earth_speed: f32,
    /// Cloud layer spin in radians per second.
    pub cloud_speed: f32,
    /// Number of stars in the point cloud.
    pub star_count: usize,
    /// Stars are scattered inside `[0, star_extent]^3`.
    pub star_extent: f32,
    /// Noise seed for star placement.
    pub star_seed: u32,
    /// Recycling bin position, just in front of the camera.
    pub bin_position: Vec3,
    /// XYZ Euler angles in radians.
    pub bin_rotation: Vec3,
    /// Uniform scale of the bin model.
    pub bin_scale: f32,
    /// Sun light color, a warm white.
    pub sun_color: Color,
    /// The sun shines from here toward the origin.
    pub sun_position: Vec3,
    /// Sun illuminance in lux.
    pub sun_illuminance: f32,
    /// Point light above the camera that picks out the bin.
    pub bin_light_position: Vec3,
    /// Bin light intensity in lumens.
    pub bin_light_intensity: f32,
    /// Bin light falloff range.
    pub bin_light_range: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 50.0,
            near: 0.1,
            far: 40000.0,
            camera_position: Vec3::new(0.0, 0.0, 1500.0),
            earth_radius: 500.0,
            cloud_radius: 502.0,
            sphere_segments: 64,
            bump_scale: 0.02,
            earth_speed: 0.006,
            cloud_speed: 0.0054,
            star_count: 1000,
            star_extent: 20000.0,
            star_seed: 1000,
            bin_position: Vec3::new(1.0, 0.0, 1496.0),
            bin_rotation: Vec3::new(-1.5, 0.4, 0.0),
            bin_scale: 1.0,
            sun_color: Color::srgb_u8(0xff, 0xfa, 0xd9),
            sun_position: Vec3::new(200.0, 100.0, 100.0),
            sun_illuminance: 10_000.0,
            bin_light_position: Vec3::new(0.0, 200.0, 1500.0),
            bin_light_intensity: 2_000_000.0,
            bin_light_range: 500.0,
        }
    }
}

/// Camera, Earth, clouds, stars, model, and lights.
pub struct ScenePlugin(pub SceneConfig);

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.register_type::<SceneConfig>()
            .register_type::<Pose>()
            .register_type::<entities::Spin>()
            .insert_resource(self.0.clone())
            .insert_resource(ClearColor(Color::BLACK))
            .add_systems(Startup, systems::spawn_camera)
            .add_systems(
                OnExit(GameState::Loading),
                (
                    systems::populate_scene.in_set(ReadySet::Populate),
                    systems::spawn_lights.in_set(ReadySet::Derive),
                ),
            )
            .add_systems(
                Update,
                (systems::spin, systems::follow_camera).in_set(FrameSet::Motion),
            )
            .add_systems(Update, systems::sync_poses.in_set(FrameSet::Present));
    }
}
