use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::render_resource::PrimitiveTopology;

use super::SceneConfig;
use super::entities::{FollowCameraY, LightRefs, MainCamera, Pose, SceneRefs, Spin};
use super::starfield;
use crate::loading::SceneAssets;
use crate::timeline::{Axis, Property, Sequencer};

pub fn spawn_camera(mut commands: Commands, cfg: Res<SceneConfig>) {
    let pose = Pose::new(cfg.camera_position, Vec3::ZERO);
    commands.spawn((
        Name::new("Camera"),
        MainCamera,
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            fov: cfg.fov_degrees.to_radians(),
            near: cfg.near,
            far: cfg.far,
            ..default()
        }),
        pose.transform(),
        pose,
    ));
}

/// Adds the Earth, clouds, starfield and model once loading has settled.
///
/// Textures or the model that failed to load are left out rather than holding
/// up the scene.
pub fn populate_scene(
    mut commands: Commands,
    cfg: Res<SceneConfig>,
    assets: Res<SceneAssets>,
    asset_server: Res<AssetServer>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    camera: Query<Entity, With<MainCamera>>,
) {
    let Ok(camera) = camera.single() else {
        error!("no scene camera; skipping scene population");
        return;
    };
    let loaded = |handle: &Handle<Image>| {
        asset_server
            .is_loaded_with_dependencies(handle)
            .then(|| handle.clone())
    };

    // Earth
    let mut earth_mesh = Sphere::new(cfg.earth_radius)
        .mesh()
        .uv(cfg.sphere_segments, cfg.sphere_segments);
    let tangents = earth_mesh
        .attribute(Mesh::ATTRIBUTE_POSITION)
        .and_then(|positions| positions.as_float3())
        .map(sphere_tangents);
    let bump = match tangents {
        Some(tangents) => {
            earth_mesh.insert_attribute(Mesh::ATTRIBUTE_TANGENT, tangents);
            loaded(&assets.bump)
        }
        None => {
            warn!("earth mesh has no positions; bump map disabled");
            None
        }
    };
    let earth_material = StandardMaterial {
        base_color_texture: loaded(&assets.land),
        depth_map: bump,
        parallax_depth_scale: cfg.bump_scale,
        specular_texture: loaded(&assets.water),
        perceptual_roughness: 0.8,
        ..default()
    };
    commands.spawn((
        Name::new("Earth"),
        Mesh3d(meshes.add(earth_mesh)),
        MeshMaterial3d(materials.add(earth_material)),
        Spin {
            rate: cfg.earth_speed,
        },
        Pose::default(),
        Transform::default(),
    ));

    // Clouds: additive so dark texels vanish
    let clouds = loaded(&assets.clouds);
    let cloud_material = StandardMaterial {
        base_color: if clouds.is_some() {
            Color::WHITE
        } else {
            Color::BLACK
        },
        base_color_texture: clouds,
        alpha_mode: AlphaMode::Add,
        ..default()
    };
    commands.spawn((
        Name::new("Clouds"),
        Mesh3d(meshes.add(
            Sphere::new(cfg.cloud_radius)
                .mesh()
                .uv(cfg.sphere_segments, cfg.sphere_segments),
        )),
        MeshMaterial3d(materials.add(cloud_material)),
        Spin {
            rate: cfg.cloud_speed,
        },
        Pose::default(),
        Transform::default(),
    ));

    // Starfield
    let stars = starfield::scatter(cfg.star_count, cfg.star_extent, cfg.star_seed);
    let uvs = vec![[0.5_f32, 0.5]; stars.len()];
    let star_mesh = Mesh::new(PrimitiveTopology::PointList, RenderAssetUsages::RENDER_WORLD)
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, stars)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
    commands.spawn((
        Name::new("Stars"),
        Mesh3d(meshes.add(star_mesh)),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color_texture: loaded(&assets.star),
            unlit: true,
            alpha_mode: AlphaMode::Add,
            ..default()
        })),
        Transform::default(),
    ));

    // Recycling bin
    let bin = if asset_server.is_loaded_with_dependencies(&assets.bin) {
        let pose = Pose {
            scale: Vec3::splat(cfg.bin_scale),
            ..Pose::new(cfg.bin_position, cfg.bin_rotation)
        };
        let entity = commands
            .spawn((
                Name::new("RecyclingBin"),
                SceneRoot(assets.bin.clone()),
                FollowCameraY,
                pose.transform(),
                pose,
            ))
            .id();
        Some(entity)
    } else {
        warn!("recycling bin model unavailable; continuing without it");
        None
    };

    info!("scene populated (bin: {})", bin.is_some());
    commands.insert_resource(SceneRefs { camera, bin });
}

/// Tangents along lines of latitude, pointing east, for a sphere centred on
/// the origin. Poles fall back to +X.
fn sphere_tangents(positions: &[[f32; 3]]) -> Vec<[f32; 4]> {
    positions
        .iter()
        .map(|&p| {
            let t = Vec3::Y.cross(Vec3::from(p)).normalize_or(Vec3::X);
            [t.x, t.y, t.z, 1.0]
        })
        .collect()
}

/// Sun and the point light that follows the bin through the timeline.
pub fn spawn_lights(mut commands: Commands, cfg: Res<SceneConfig>) {
    commands.spawn((
        Name::new("Sun"),
        DirectionalLight {
            color: cfg.sun_color,
            illuminance: cfg.sun_illuminance,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_translation(cfg.sun_position).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let pose = Pose::new(cfg.bin_light_position, Vec3::ZERO);
    let bin_light = commands
        .spawn((
            Name::new("BinLight"),
            PointLight {
                intensity: cfg.bin_light_intensity,
                range: cfg.bin_light_range,
                ..default()
            },
            pose.transform(),
            pose,
        ))
        .id();
    commands.insert_resource(LightRefs { bin_light });
}

// ── Per-frame ───────────────────────────────────────────────────────

/// Spins the Earth and clouds, except while the timeline animates their yaw.
pub fn spin(
    time: Res<Time>,
    sequencer: Option<Res<Sequencer>>,
    mut spinners: Query<(Entity, &Spin, &mut Pose)>,
) {
    let dt = time.delta_secs();
    for (entity, spin, mut pose) in &mut spinners {
        let driven = sequencer
            .as_ref()
            .is_some_and(|seq| seq.drives(entity, Property::Rotation(Axis::Y)));
        if !driven {
            pose.rotation.y += spin.rate * dt;
        }
    }
}

/// Keeps followers level with the camera.
pub fn follow_camera(
    sequencer: Option<Res<Sequencer>>,
    camera: Query<&Pose, With<MainCamera>>,
    mut followers: Query<(Entity, &mut Pose), (With<FollowCameraY>, Without<MainCamera>)>,
) {
    let Ok(camera) = camera.single() else {
        return;
    };
    let y = camera.translation.y;
    for (entity, mut pose) in &mut followers {
        let driven = sequencer
            .as_ref()
            .is_some_and(|seq| seq.drives(entity, Property::Translation(Axis::Y)));
        if !driven && pose.translation.y != y {
            pose.translation.y = y;
        }
    }
}

pub fn sync_poses(mut poses: Query<(&Pose, &mut Transform), Changed<Pose>>) {
    for (pose, mut transform) in &mut poses {
        *transform = pose.transform();
    }
}
