//! Pinpoint Scene - 3D presentation for the GLB hotspot viewer
//!
//! Everything here is a view over [`pinpoint_core::ViewerSession`]: the
//! installed model, the hotspot markers and their labels are re-derived
//! from the session whenever it changes. Input systems translate clicks
//! and key presses into session operations.

pub mod camera;
pub mod hotspots;
pub mod models;
pub mod picking;
pub mod scene;
pub mod types;
pub mod ui;

use bevy::prelude::*;

pub use camera::{CameraPlugin, CameraSettings, MainCamera};
pub use hotspots::{HotspotMarker, HotspotsPlugin, LabelPlate};
pub use models::{AssetRoot, ModelsPlugin};
pub use picking::{camera_view, ClickPickingPlugin};
pub use scene::SceneSetupPlugin;
pub use types::{NamePrompt, Session, ViewerSettings};

/// All scene plugins. Expects `Session` and `ViewerSettings` to be inserted
/// and the egui plugin to be added by the host app.
pub struct PinpointScenePlugin;

impl Plugin for PinpointScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<NamePrompt>().add_plugins((
            CameraPlugin,
            SceneSetupPlugin,
            ModelsPlugin,
            HotspotsPlugin,
            ClickPickingPlugin,
        ));
    }
}
