//! Pointer clicks on the 3D view: hotspot placement and marker selection

use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use pinpoint_core::{CameraView, PickOutcome, PlacementMode, Viewport};

use crate::camera::{CameraSettings, MainCamera};
use crate::types::{NamePrompt, Session};

/// Press-to-release movement above which a press counts as a drag
pub const CLICK_DRAG_THRESHOLD: f32 = 6.0;

/// Tracks an in-progress press so clicks can be told apart from drags
#[derive(Resource, Default)]
pub struct ClickTracker {
    start_position: Option<Vec2>,
    is_dragging: bool,
}

impl ClickTracker {
    pub fn press(&mut self, position: Vec2) {
        self.start_position = Some(position);
        self.is_dragging = false;
    }

    pub fn moved_to(&mut self, position: Vec2) {
        if let Some(start) = self.start_position {
            if position.distance(start) > CLICK_DRAG_THRESHOLD {
                self.is_dragging = true;
            }
        }
    }

    /// Finish the press; returns the click position if it was not a drag
    pub fn release(&mut self, position: Vec2) -> Option<Vec2> {
        self.moved_to(position);
        let click = self.start_position.take().filter(|_| !self.is_dragging);
        self.is_dragging = false;
        click.map(|_| position)
    }

    pub fn cancel(&mut self) {
        self.start_position = None;
        self.is_dragging = false;
    }
}

pub struct ClickPickingPlugin;

impl Plugin for ClickPickingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ClickTracker>()
            .add_systems(Update, (handle_canvas_clicks, handle_escape));
    }
}

/// Build a backend-free camera description from the render camera
pub fn camera_view(
    transform: &GlobalTransform,
    projection: &Projection,
    viewport: Viewport,
) -> CameraView {
    let (fov_y, near, far) = match projection {
        Projection::Perspective(p) => (p.fov, p.near, p.far),
        _ => (std::f32::consts::FRAC_PI_4, 0.1, 1000.0),
    };
    CameraView {
        position: transform.translation(),
        rotation: transform.rotation(),
        fov_y,
        aspect: viewport.aspect(),
        near,
        far,
    }
}

fn handle_canvas_clicks(
    mut session: ResMut<Session>,
    mut camera_settings: ResMut<CameraSettings>,
    mut tracker: ResMut<ClickTracker>,
    mut prompt: ResMut<NamePrompt>,
    camera_query: Query<(&GlobalTransform, &Projection), With<MainCamera>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    touch_input: Res<Touches>,
    mut contexts: bevy_egui::EguiContexts,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .map(|ctx| ctx.wants_pointer_input() || ctx.is_pointer_over_area())
        .unwrap_or(false);
    let Ok(window) = windows.single() else {
        return;
    };

    let mut click: Option<Vec2> = None;

    // Touch taps
    for touch in touch_input.iter_just_pressed() {
        if !egui_wants_pointer {
            tracker.press(touch.position());
        }
    }
    for touch in touch_input.iter() {
        tracker.moved_to(touch.position());
    }
    for touch in touch_input.iter_just_released() {
        click = click.or(tracker.release(touch.position()));
    }

    // Mouse
    if let Some(cursor) = window.cursor_position() {
        if mouse_button.just_pressed(MouseButton::Left) {
            if egui_wants_pointer {
                tracker.cancel();
            } else {
                tracker.press(cursor);
            }
        } else if mouse_button.pressed(MouseButton::Left) {
            tracker.moved_to(cursor);
        }
        if mouse_button.just_released(MouseButton::Left) {
            click = click.or(tracker.release(cursor));
        }
    } else if mouse_button.just_released(MouseButton::Left) {
        tracker.cancel();
    }

    let Some(pointer) = click else {
        return;
    };
    let Ok((camera_transform, projection)) = camera_query.single() else {
        return;
    };

    let viewport = Viewport::new(window.width(), window.height());
    let view = camera_view(camera_transform, projection, viewport);

    match session.pick(&view, pointer, viewport) {
        PickOutcome::PromptName { .. } => prompt.open(),
        PickOutcome::Miss => {}
        PickOutcome::Ignored if session.placement_mode() == PlacementMode::Idle => {
            if let Some((_, target)) = session.select_marker_at(&view, pointer, viewport) {
                camera_settings.snap_to(target);
            }
        }
        PickOutcome::Ignored => {}
    }
}

/// Escape cancels placement and clears the selection
fn handle_escape(
    mut session: ResMut<Session>,
    mut prompt: ResMut<NamePrompt>,
    keyboard: Res<ButtonInput<KeyCode>>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        session.cancel_placement();
        session.clear_selection();
        prompt.take();
    }
}
