//! Bevy application setup

use bevy::prelude::*;
use bevy::window::WindowResolution;
use bevy_egui::EguiPlugin;
use pinpoint_core::ViewerConfig;
use pinpoint_scene::types::color_from_rgb;
use pinpoint_scene::{PinpointScenePlugin, Session, ViewerSettings};
use std::path::PathBuf;

use crate::file_loader::{FileLoaderPlugin, InitialModel};
use crate::ui::UiPlugin;

/// Build and run the viewer until the window closes
pub fn run(config: ViewerConfig, initial_model: Option<PathBuf>) {
    let window = &config.window;

    App::new()
        .insert_resource(ClearColor(color_from_rgb(config.scene.background)))
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: window.title.clone(),
                        resolution: WindowResolution::new(window.width, window.height),
                        canvas: Some(window.canvas.clone()),
                        fit_canvas_to_parent: true,
                        prevent_default_event_handling: false,
                        ..default()
                    }),
                    ..default()
                })
                // The host installs its own tracing subscriber
                .disable::<bevy::log::LogPlugin>(),
        )
        .add_plugins(EguiPlugin::default())
        .insert_resource(Session::from_config(&config))
        .insert_resource(InitialModel(initial_model))
        .insert_resource(ViewerSettings(config))
        .add_plugins(PinpointScenePlugin)
        .add_plugins(FileLoaderPlugin)
        .add_plugins(UiPlugin)
        .run();
}
