#![warn(missing_docs)]
//! 3D Earth landing page.
//!
//! A spinning textured Earth with a cloud layer, a starfield and a recycling
//! bin model sit behind a scrolling page. Assets load behind an overlay; once
//! every load has settled the scene is populated and a scroll-driven timeline
//! moves the camera, the model and the page text.

mod loading;
pub mod math;
mod page;
mod scene;
mod timeline;

use bevy::app::AppExit;
use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy_inspector_egui::quick::WorldInspectorPlugin;

/// Application-wide state, used for system scheduling.
#[derive(States, Default, Debug, Clone, PartialEq, Eq, Hash, Reflect)]
pub enum GameState {
    /// Assets are loading behind the overlay.
    #[default]
    Loading,
    /// Scene populated, page scrolling, timeline playing.
    Running,
    /// Debug inspector open (Tab to toggle).
    Debugging,
}

/// Steps of the ready transition, run in order in `OnExit(GameState::Loading)`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReadySet {
    /// Add loaded assets to the scene.
    Populate,
    /// Spawn lights that depend on the populated scene.
    Derive,
    /// Hide the loading overlay and unlock scrolling.
    Reveal,
    /// Build and start the timeline.
    Animate,
}

/// Per-frame ordering in `Update`.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum FrameSet {
    /// Scroll and resize input.
    Input,
    /// Timeline evaluation.
    Animate,
    /// Continuous motion: spin and camera follow.
    Motion,
    /// Copy animated state into transforms and UI nodes.
    Present,
}

/// Command-line overrides for the native build.
#[cfg(feature = "native")]
#[derive(clap::Parser, Debug)]
#[command(version, about = "3D Earth landing page")]
struct Cli {
    /// Seconds to wait for assets before continuing without the missing ones.
    #[arg(long, default_value_t = 30.0)]
    asset_timeout: f32,
    /// Wait for assets indefinitely.
    #[arg(long, conflicts_with = "asset_timeout")]
    no_timeout: bool,
    /// Asset root directory.
    #[arg(long, default_value = "assets")]
    assets: String,
    /// Open the world inspector as soon as loading finishes.
    #[arg(long)]
    debug: bool,
}

#[cfg(feature = "native")]
fn settings() -> (loading::LoadingConfig, String) {
    use clap::Parser;

    let cli = Cli::parse();
    let loading = loading::LoadingConfig {
        timeout_secs: (!cli.no_timeout).then_some(cli.asset_timeout),
        ready_state: if cli.debug {
            GameState::Debugging
        } else {
            GameState::Running
        },
        ..default()
    };
    (loading, cli.assets)
}

#[cfg(not(feature = "native"))]
fn settings() -> (loading::LoadingConfig, String) {
    (loading::LoadingConfig::default(), "assets".into())
}

fn main() {
    let (loading_cfg, asset_root) = settings();
    let mut app = App::new();

    app.add_plugins(
        DefaultPlugins
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: "Earth".into(),
                    canvas: Some("#bevy".into()),
                    fit_canvas_to_parent: true,
                    ..default()
                }),
                ..default()
            })
            .set(AssetPlugin {
                file_path: asset_root,
                meta_check: AssetMetaCheck::Never,
                ..default()
            }),
    )
    .register_type::<GameState>()
    .init_state::<GameState>()
    .configure_sets(
        OnExit(GameState::Loading),
        (
            ReadySet::Populate,
            ReadySet::Derive,
            ReadySet::Reveal,
            ReadySet::Animate,
        )
            .chain(),
    )
    .configure_sets(
        Update,
        (
            FrameSet::Input,
            FrameSet::Animate,
            FrameSet::Motion,
            FrameSet::Present,
        )
            .chain(),
    )
    .configure_sets(Update, (FrameSet::Animate, FrameSet::Motion).run_if(live))
    .add_plugins(bevy_egui::EguiPlugin::default())
    .add_plugins(loading::LoadingPlugin(loading_cfg))
    .add_plugins(page::PagePlugin(page::PageConfig::default()))
    .add_plugins(scene::ScenePlugin(scene::SceneConfig::default()))
    .add_plugins(timeline::TimelinePlugin)
    .add_systems(Update, exit_on_esc)
    .add_systems(Update, toggle_inspector)
    .add_plugins(WorldInspectorPlugin::new().run_if(in_state(GameState::Debugging)));

    app.run();
}

/// Animation and motion only run once loading has finished.
fn live(state: Res<State<GameState>>) -> bool {
    *state.get() != GameState::Loading
}

fn toggle_inspector(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<GameState>>,
    mut next: ResMut<NextState<GameState>>,
) {
    if keys.just_pressed(KeyCode::Tab) {
        let new_state = match state.get() {
            GameState::Running => GameState::Debugging,
            GameState::Debugging => GameState::Running,
            GameState::Loading => return,
        };
        info!("switching to {new_state:?}");
        next.set(new_state);
    }
}

fn exit_on_esc(keys: Res<ButtonInput<KeyCode>>, mut exit: MessageWriter<AppExit>) {
    if keys.just_pressed(KeyCode::Escape) {
        exit.write(AppExit::Success);
    }
}
