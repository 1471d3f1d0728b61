use bevy::asset::UntypedAssetId;
use bevy::prelude::*;

use super::coordinator::AssetLoadCoordinator;

/// Handles to every asset the landing scene needs.
///
/// Holding the strong handles here keeps the assets alive between the load
/// request and scene population.
#[derive(Resource)]
pub struct SceneAssets {
    /// Equirectangular land/ocean color map.
    pub land: Handle<Image>,
    /// Height map used for parallax relief.
    pub bump: Handle<Image>,
    /// Ocean mask driving specular strength.
    pub water: Handle<Image>,
    /// Greyscale cloud cover, blended additively.
    pub clouds: Handle<Image>,
    /// Sprite sampled by the starfield points.
    pub star: Handle<Image>,
    /// First scene of the recycling bin glTF.
    pub bin: Handle<Scene>,
}

/// Wraps the coordinator keyed by Bevy asset ids.
#[derive(Resource)]
pub struct LoadTracker(pub AssetLoadCoordinator<UntypedAssetId>);

/// Root node of the loading overlay.
#[derive(Component)]
pub struct LoadingOverlay;

/// `Loading... n/N` caption.
#[derive(Component)]
pub struct LoadingLabel;

/// Thumb sliding along the progress track.
#[derive(Component)]
pub struct SliderThumb;
