//! Shared UI components for hotspot annotation

use bevy_egui::egui;
use pinpoint_core::{HotspotId, PlacementMode, ViewerSession};

use crate::camera::CameraSettings;
use crate::types::NamePrompt;

/// Row button pressed in the hotspot list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotspotAction {
    View(HotspotId),
    Delete(HotspotId),
}

/// Outcome of the name prompt for one frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    Confirm(String),
    Cancel,
}

/// Render the hotspot list with View/Delete buttons per row
pub fn render_hotspot_list(ui: &mut egui::Ui, session: &ViewerSession) -> Option<HotspotAction> {
    ui.label(egui::RichText::new("Hotspots").strong());

    let store = session.hotspots();
    if store.is_empty() {
        ui.label(
            egui::RichText::new("No hotspots added")
                .small()
                .color(egui::Color32::GRAY),
        );
        return None;
    }

    let mut action = None;
    for hotspot in store.iter() {
        let selected = session.selected() == Some(hotspot.id);
        ui.horizontal(|ui| {
            let text = if selected {
                egui::RichText::new(&hotspot.name).color(egui::Color32::YELLOW)
            } else {
                egui::RichText::new(&hotspot.name)
            };
            ui.label(text).on_hover_text(format!(
                "{} at [{:.2}, {:.2}, {:.2}]",
                hotspot.id, hotspot.position.x, hotspot.position.y, hotspot.position.z
            ));

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.small_button("Delete").clicked() {
                    action = Some(HotspotAction::Delete(hotspot.id));
                }
                if ui.small_button("View").clicked() {
                    action = Some(HotspotAction::View(hotspot.id));
                }
            });
        });
    }
    action
}

/// Apply a list action to the session and camera
pub fn apply_hotspot_action(
    session: &mut ViewerSession,
    camera: &mut CameraSettings,
    action: HotspotAction,
) {
    match action {
        HotspotAction::View(id) => match session.focus_hotspot(id) {
            Ok(target) => camera.snap_to(target),
            Err(e) => session.report(&e),
        },
        HotspotAction::Delete(id) => {
            session.delete_hotspot(id);
        }
    }
}

/// Short hint describing the current placement state
pub fn placement_hint(mode: PlacementMode) -> Option<&'static str> {
    match mode {
        PlacementMode::Idle => None,
        PlacementMode::AwaitingClick => Some("Click on the model to place the hotspot"),
        PlacementMode::Naming { .. } => Some("Name the new hotspot"),
    }
}

/// Modal prompt for naming a freshly picked hotspot
pub fn render_name_prompt(ctx: &egui::Context, prompt: &mut NamePrompt) -> Option<PromptResponse> {
    let mut response = None;

    egui::Window::new("New Hotspot")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.label("Enter a name for this hotspot:");
            let edit = ui.add(
                egui::TextEdit::singleline(&mut prompt.text)
                    .hint_text("e.g. Engine")
                    .desired_width(220.0),
            );
            if prompt.request_focus {
                edit.request_focus();
                prompt.request_focus = false;
            }
            let submitted = edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));

            ui.horizontal(|ui| {
                if ui.button("Add").clicked() || submitted {
                    response = Some(PromptResponse::Confirm(prompt.take()));
                }
                if ui.button("Cancel").clicked() {
                    prompt.take();
                    response = Some(PromptResponse::Cancel);
                }
            });
        });

    response
}

/// Status line along the bottom of the viewport
pub fn render_status_bar(ctx: &egui::Context, session: &ViewerSession) {
    egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
        ui.horizontal(|ui| {
            if session.is_loading() {
                ui.spinner();
            }
            ui.label(session.status());
            if let Some(hint) = placement_hint(session.placement_mode()) {
                ui.separator();
                ui.label(egui::RichText::new(hint).color(egui::Color32::LIGHT_BLUE));
            }
            if let Some(asset) = session.asset() {
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.label(
                        egui::RichText::new(format!(
                            "{} triangles, {} hotspots",
                            asset.triangle_count(),
                            session.hotspots().len()
                        ))
                        .small()
                        .color(egui::Color32::GRAY),
                    );
                });
            }
        });
    });
}

/// Centered hint shown before any model is loaded
pub fn render_empty_hint(ctx: &egui::Context) {
    egui::Area::new(egui::Id::new("empty_hint"))
        .anchor(egui::Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .interactable(false)
        .show(ctx, |ui| {
            ui.label(
                egui::RichText::new("Load a model to begin")
                    .size(20.0)
                    .color(egui::Color32::GRAY),
            );
        });
}

/// Notice for rejected actions; returns true when the user dismissed it
pub fn render_notice(ctx: &egui::Context, session: &ViewerSession) -> bool {
    let Some(message) = session.notice() else {
        return false;
    };

    let mut dismissed = false;
    egui::Window::new("Notice")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_TOP, egui::vec2(0.0, 40.0))
        .show(ctx, |ui| {
            ui.label(message);
            if ui.button("OK").clicked() {
                dismissed = true;
            }
        });
    dismissed
}

/// Usage notes
pub fn render_instructions(ui: &mut egui::Ui) {
    ui.collapsing("How to use", |ui| {
        ui.label("Import a .glb model to view it");
        ui.label("Left drag to rotate, right drag to pan, scroll to zoom");
        ui.label("Add Hotspot, then click the model to place a marker");
        ui.label("View focuses the camera on a hotspot, Delete removes it");
        ui.label("Click a marker to select it, Escape to cancel or deselect");
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::math::Vec3;
    use pinpoint_core::{AssetMesh, LoadedAsset, ViewerError};

    fn session_with_hotspot() -> (ViewerSession, HotspotId) {
        let mut session = ViewerSession::default();
        let mesh = AssetMesh {
            name: None,
            positions: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
            normals: vec![Vec3::Z; 3],
            indices: vec![0, 1, 2],
            base_color: [1.0; 4],
        };
        let ticket = session.begin_load("tri.glb").unwrap();
        session.complete_load(ticket, LoadedAsset::from_meshes("tri.glb", vec![mesh]));

        // Place through the session so the store stays the single source of truth
        session.start_placement().unwrap();
        let view = pinpoint_core::CameraView::looking_at(
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::ZERO,
            1.0,
            1.0,
        );
        let viewport = pinpoint_core::Viewport::new(100.0, 100.0);
        session.pick(&view, bevy::math::Vec2::new(48.0, 52.0), viewport);
        let id = session.confirm_name("Corner").unwrap().unwrap();
        (session, id)
    }

    #[test]
    fn test_view_action_focuses_camera() {
        let (mut session, id) = session_with_hotspot();
        let mut camera = CameraSettings::default();

        apply_hotspot_action(&mut session, &mut camera, HotspotAction::View(id));
        assert_eq!(session.selected(), Some(id));
        let position = session.hotspots().get(id).unwrap().position;
        assert!(camera.target.abs_diff_eq(position, 1e-5));
    }

    #[test]
    fn test_stale_view_action_reports() {
        let (mut session, id) = session_with_hotspot();
        let mut camera = CameraSettings::default();
        apply_hotspot_action(&mut session, &mut camera, HotspotAction::Delete(id));
        assert!(session.hotspots().is_empty());

        apply_hotspot_action(&mut session, &mut camera, HotspotAction::View(id));
        assert_eq!(
            session.notice(),
            Some(ViewerError::NotFound(id).user_message().as_str())
        );
    }

    #[test]
    fn test_placement_hint() {
        assert_eq!(placement_hint(PlacementMode::Idle), None);
        assert!(placement_hint(PlacementMode::AwaitingClick).is_some());
    }
}
