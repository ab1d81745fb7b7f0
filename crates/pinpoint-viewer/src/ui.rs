//! Main egui panel: model import, hotspot controls and status

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts, EguiPrimaryContextPass};
use pinpoint_core::PlacementMode;
use pinpoint_scene::ui::{
    apply_hotspot_action, render_empty_hint, render_hotspot_list, render_instructions,
    render_name_prompt, render_notice, render_status_bar, PromptResponse,
};
use pinpoint_scene::{CameraSettings, NamePrompt, Session};

use crate::file_loader::{LoadTasks, ModelPathInput, PendingFileResults};

/// Grouped system parameters for the main UI system
#[derive(SystemParam)]
pub struct UiParams<'w, 's> {
    pub contexts: EguiContexts<'w, 's>,
    pub session: ResMut<'w, Session>,
    pub camera_settings: ResMut<'w, CameraSettings>,
    pub prompt: ResMut<'w, NamePrompt>,
    pub pending_file_results: Res<'w, PendingFileResults>,
    pub load_tasks: ResMut<'w, LoadTasks>,
    pub path_input: ResMut<'w, ModelPathInput>,
}

pub struct UiPlugin;

impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(EguiPrimaryContextPass, ui_system);
    }
}

fn ui_system(mut params: UiParams) {
    let Ok(ctx) = params.contexts.ctx_mut() else {
        return;
    };

    egui::SidePanel::left("controls")
        .default_width(260.0)
        .resizable(true)
        .show(ctx, |ui| {
            ui.heading("Pinpoint");
            ui.separator();

            ui.label(egui::RichText::new("Model").strong());
            render_import_controls(
                ui,
                &mut params.session,
                &mut params.load_tasks,
                &mut params.path_input,
                &params.pending_file_results,
            );
            if let Some(asset) = params.session.asset() {
                ui.label(
                    egui::RichText::new(format!(
                        "{} meshes, {} vertices",
                        asset.meshes().len(),
                        asset.vertex_count()
                    ))
                    .small()
                    .color(egui::Color32::GRAY),
                );
            }

            ui.separator();

            match params.session.placement_mode() {
                PlacementMode::AwaitingClick => {
                    ui.label(
                        egui::RichText::new("Click on the model to place the hotspot")
                            .color(egui::Color32::LIGHT_BLUE),
                    );
                    if ui.button("Cancel").clicked() {
                        params.session.cancel_placement();
                    }
                }
                PlacementMode::Naming { .. } => {
                    ui.add_enabled(false, egui::Button::new("Add Hotspot"));
                }
                PlacementMode::Idle => {
                    if ui.button("Add Hotspot").clicked() {
                        if let Err(error) = params.session.start_placement() {
                            params.session.report(&error);
                        }
                    }
                }
            }

            ui.separator();

            egui::ScrollArea::vertical()
                .auto_shrink([false, true])
                .max_height((ui.available_height() - 120.0).max(120.0))
                .show(ui, |ui| {
                    if let Some(action) = render_hotspot_list(ui, &params.session) {
                        apply_hotspot_action(
                            &mut params.session,
                            &mut params.camera_settings,
                            action,
                        );
                    }
                });

            ui.separator();
            render_instructions(ui);
        });

    render_overlays(ctx, &mut params.session, &mut params.prompt);
}

/// Status bar, empty-scene hint, name prompt and notice.
///
/// The session is only dereferenced mutably when the user acts, so frames
/// without input leave it unchanged for change-detecting systems.
fn render_overlays(ctx: &egui::Context, session: &mut ResMut<Session>, prompt: &mut NamePrompt) {
    render_status_bar(ctx, session);

    if !session.has_asset() && !session.is_loading() {
        render_empty_hint(ctx);
    }

    if matches!(session.placement_mode(), PlacementMode::Naming { .. }) {
        match render_name_prompt(ctx, prompt) {
            Some(PromptResponse::Confirm(name)) => {
                if let Err(error) = session.confirm_name(&name) {
                    session.report(&error);
                }
            }
            Some(PromptResponse::Cancel) => session.cancel_placement(),
            None => {}
        }
    }

    if render_notice(ctx, session) {
        session.dismiss_notice();
    }
}

#[cfg(target_arch = "wasm32")]
fn render_import_controls(
    ui: &mut egui::Ui,
    _session: &mut ResMut<Session>,
    _tasks: &mut LoadTasks,
    _path_input: &mut ModelPathInput,
    pending: &PendingFileResults,
) {
    if ui.button("Import GLB Model").clicked() {
        crate::file_loader::js_interop::open_file_picker(
            crate::file_loader::GLB_ACCEPT,
            pending.clone(),
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn render_import_controls(
    ui: &mut egui::Ui,
    session: &mut ResMut<Session>,
    tasks: &mut LoadTasks,
    path_input: &mut ModelPathInput,
    _pending: &PendingFileResults,
) {
    ui.horizontal(|ui| {
        let field = ui.add(
            egui::TextEdit::singleline(&mut path_input.0)
                .hint_text("path/to/model.glb")
                .desired_width(170.0),
        );
        let submitted = field.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
        let load = ui.add_enabled(
            !path_input.0.trim().is_empty(),
            egui::Button::new("Load"),
        );

        if load.clicked() || (submitted && !path_input.0.trim().is_empty()) {
            let path = std::path::PathBuf::from(path_input.0.trim());
            crate::file_loader::request_path_load(session, tasks, path);
        }
    });
}
