use bevy::asset::{RecursiveDependencyLoadState, UntypedAssetId};
use bevy::prelude::*;

use super::LoadingConfig;
use super::coordinator::{AssetLoadCoordinator, LoadError, LoadKind};
use super::entities::{LoadTracker, LoadingLabel, LoadingOverlay, SceneAssets, SliderThumb};
use crate::GameState;
use crate::page::ScrollState;

const LAND: &str = "earthmap10.jpg";
const BUMP: &str = "bump.jpg";
const WATER: &str = "water.png";
const CLOUDS: &str = "clouds.jpg";
const STAR: &str = "star.png";
const BIN: &str = "models/recycling_bin/scene.gltf";

// ── Startup ─────────────────────────────────────────────────────────

/// Issues every load and seeds the coordinator with the expected total.
pub fn start_loads(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    cfg: Res<LoadingConfig>,
) {
    let mut coordinator = AssetLoadCoordinator::new(cfg.timeout_secs);
    // Six loads: five textures and one glTF scene.
    if let Err(err) = coordinator.register_expected(6) {
        error!("load coordinator rejected expected count: {err}");
    }

    let mut texture = |path: &'static str| -> Handle<Image> {
        let handle = asset_server.load(path);
        coordinator.track(handle.id().untyped(), path, LoadKind::Texture);
        handle
    };
    let land = texture(LAND);
    let bump = texture(BUMP);
    let water = texture(WATER);
    let clouds = texture(CLOUDS);
    let star = texture(STAR);

    let bin: Handle<Scene> = asset_server.load(GltfAssetLabel::Scene(0).from_asset(BIN));
    coordinator.track(bin.id().untyped(), BIN, LoadKind::Model);

    info!(
        "loading {} textures and {} models",
        coordinator.count(LoadKind::Texture),
        coordinator.count(LoadKind::Model)
    );

    commands.insert_resource(LoadTracker(coordinator));
    commands.insert_resource(SceneAssets {
        land,
        bump,
        water,
        clouds,
        star,
        bin,
    });
}

/// Full-window overlay with a caption and a sliding progress thumb.
pub fn spawn_overlay(mut commands: Commands, cfg: Res<LoadingConfig>) {
    commands
        .spawn((
            Name::new("LoadingOverlay"),
            LoadingOverlay,
            Node {
                position_type: PositionType::Absolute,
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                row_gap: Val::Px(16.0),
                ..default()
            },
            BackgroundColor(Color::BLACK),
            GlobalZIndex(100),
        ))
        .with_children(|overlay| {
            overlay.spawn((
                LoadingLabel,
                Text::new("Loading..."),
                TextFont {
                    font_size: 32.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
            overlay
                .spawn((
                    Node {
                        width: Val::Px(cfg.track_width),
                        height: Val::Px(4.0),
                        overflow: Overflow::clip(),
                        ..default()
                    },
                    BackgroundColor(Color::srgb(0.2, 0.2, 0.2)),
                ))
                .with_child((
                    SliderThumb,
                    Node {
                        width: Val::Percent(100.0),
                        height: Val::Percent(100.0),
                        left: Val::Px(-cfg.track_width),
                        ..default()
                    },
                    BackgroundColor(Color::WHITE),
                ));
        });
}

// ── Update: polling ─────────────────────────────────────────────────

/// Settles finished loads, refreshes the overlay, and leaves
/// [`GameState::Loading`] once the coordinator reports ready.
pub fn poll_loads(
    time: Res<Time>,
    asset_server: Res<AssetServer>,
    cfg: Res<LoadingConfig>,
    mut tracker: ResMut<LoadTracker>,
    mut label_q: Query<&mut Text, With<LoadingLabel>>,
    mut thumb_q: Query<&mut Node, With<SliderThumb>>,
    mut next: ResMut<NextState<GameState>>,
) {
    let coordinator = &mut tracker.0;
    if coordinator.is_ready() {
        return;
    }

    let pending: Vec<UntypedAssetId> = coordinator.pending().copied().collect();
    for id in pending {
        match asset_server.get_recursive_dependency_load_state(id) {
            Some(RecursiveDependencyLoadState::Loaded) => {
                coordinator.complete(&id);
            }
            Some(RecursiveDependencyLoadState::Failed(err)) => {
                if let Some(err) = coordinator.fail(&id, err.to_string()) {
                    warn!("{err}");
                }
            }
            _ => {}
        }
    }

    // poll first: a timeout settles every remaining load
    let outcome = coordinator.poll(time.elapsed_secs());

    let progress = coordinator.progress();
    for mut text in &mut label_q {
        text.0 = progress.label();
    }
    for mut node in &mut thumb_q {
        node.left = Val::Px(progress.slider_offset(cfg.track_width));
    }

    let Some(outcome) = outcome else {
        return;
    };
    for err in &outcome.failed {
        if matches!(err, LoadError::TimedOut { .. }) {
            warn!("{err}");
        }
    }
    info!(
        "all items settled: {} loaded, {} failed",
        outcome.loaded,
        outcome.failed.len()
    );
    next.set(cfg.ready_state.clone());
}

// ── Ready ───────────────────────────────────────────────────────────

/// Removes the loading overlay and unlocks page scrolling.
pub fn reveal_surface(
    mut commands: Commands,
    overlay_q: Query<Entity, With<LoadingOverlay>>,
    mut scroll: ResMut<ScrollState>,
) {
    for entity in &overlay_q {
        commands.entity(entity).despawn();
    }
    scroll.locked = false;
}
