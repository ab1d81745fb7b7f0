//! Viewer session: the explicit context object that owns the loaded asset,
//! the hotspot store and the placement state.
//!
//! Every user-facing operation goes through here so that graphics code only
//! has to mirror the resulting state.

use bevy_math::{Vec2, Vec3};
use tracing::{debug, info, warn};

use crate::asset::{validate_file_name, LoadedAsset};
use crate::camera::CameraTarget;
use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::framing::{frame_bounds, Framing};
use crate::hotspot::{Hotspot, HotspotId, HotspotStore};
use crate::picking::{pick_surface, pixel_to_ndc, CameraView, Viewport};
use crate::placement::{PickOutcome, Placement, PlacementMode};

pub const STATUS_EMPTY: &str = "No model loaded";
pub const STATUS_LOADING: &str = "Loading model...";
pub const STATUS_FAILED: &str = "Error loading model";

/// Handle for an in-flight load, stamped with the generation it was issued at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    file_name: String,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// The asset replaced the previous one; apply this framing to the camera
    Installed(Framing),
    /// A newer load was requested meanwhile; the result was dropped
    Superseded,
    /// Parsing failed; the previous scene is untouched
    Failed(ViewerError),
}

/// Tunables the session needs from the configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionSettings {
    pub fov_y: f32,
    pub framing_margin: f32,
    pub focus_offset: Vec3,
    pub marker_radius: f32,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from(&ViewerConfig::default())
    }
}

impl From<&ViewerConfig> for SessionSettings {
    fn from(config: &ViewerConfig) -> Self {
        Self {
            fov_y: config.camera.fov_radians(),
            framing_margin: config.camera.framing_margin,
            focus_offset: Vec3::from_array(config.camera.focus_offset),
            marker_radius: config.hotspots.marker_radius,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ViewerSession {
    settings: SessionSettings,
    asset: Option<LoadedAsset>,
    hotspots: HotspotStore,
    placement: Placement,
    generation: u64,
    in_flight: Option<u64>,
    installed: u64,
    status: String,
    notice: Option<String>,
}

impl Default for ViewerSession {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl ViewerSession {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            settings,
            asset: None,
            hotspots: HotspotStore::new(settings.focus_offset),
            placement: Placement::default(),
            generation: 0,
            in_flight: None,
            installed: 0,
            status: STATUS_EMPTY.to_string(),
            notice: None,
        }
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    pub fn asset(&self) -> Option<&LoadedAsset> {
        self.asset.as_ref()
    }

    pub fn has_asset(&self) -> bool {
        self.asset.is_some()
    }

    /// Generation of the installed asset, 0 before the first install.
    /// Changes exactly when the asset is replaced.
    pub fn asset_revision(&self) -> u64 {
        self.installed
    }

    pub fn hotspots(&self) -> &HotspotStore {
        &self.hotspots
    }

    pub fn placement_mode(&self) -> PlacementMode {
        self.placement.mode()
    }

    pub fn selected(&self) -> Option<HotspotId> {
        self.hotspots.selected()
    }

    /// Status bar text
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Last rejected action, shown until dismissed
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    /// Record a rejected action for the UI
    pub fn report(&mut self, error: &ViewerError) {
        warn!(%error, "Action rejected");
        self.notice = Some(error.user_message());
    }

    /// Start a load. Only the file name is checked here; nothing changes on failure.
    pub fn begin_load(&mut self, file_name: &str) -> Result<LoadTicket, ViewerError> {
        validate_file_name(file_name)?;

        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.status = STATUS_LOADING.to_string();
        self.notice = None;
        info!(file = file_name, generation = self.generation, "Loading model");

        Ok(LoadTicket {
            generation: self.generation,
            file_name: file_name.to_string(),
        })
    }

    /// Hand back the result of a load started with `begin_load`
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<LoadedAsset, ViewerError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            debug!(
                file = %ticket.file_name,
                generation = ticket.generation,
                current = self.generation,
                "Discarding superseded load"
            );
            return LoadOutcome::Superseded;
        }
        self.in_flight = None;

        let asset = match result {
            Ok(asset) => asset,
            Err(error) => {
                warn!(file = %ticket.file_name, %error, "Failed to load model");
                self.status = STATUS_FAILED.to_string();
                return LoadOutcome::Failed(error);
            }
        };

        let removed = self.hotspots.len();
        self.hotspots.clear_all();
        self.placement.reset();

        let framing = frame_bounds(
            &asset.world_bounds(),
            self.settings.fov_y,
            self.settings.framing_margin,
        );
        self.status = format!("Model: {}", ticket.file_name);
        info!(
            file = %ticket.file_name,
            triangles = asset.triangle_count(),
            removed_hotspots = removed,
            "Model installed"
        );
        self.asset = Some(asset);
        self.installed = ticket.generation;

        LoadOutcome::Installed(framing)
    }

    pub fn start_placement(&mut self) -> Result<(), ViewerError> {
        self.placement.begin(self.asset.is_some())?;
        debug!("Placement armed");
        Ok(())
    }

    pub fn cancel_placement(&mut self) {
        if self.placement.is_active() {
            debug!("Placement cancelled");
        }
        self.placement.cancel();
    }

    /// Feed a canvas click into placement mode
    pub fn pick(&mut self, view: &CameraView, pointer: Vec2, viewport: Viewport) -> PickOutcome {
        if self.placement.mode() != PlacementMode::AwaitingClick {
            return PickOutcome::Ignored;
        }
        let hit = self
            .asset
            .as_ref()
            .and_then(|asset| pick_surface(view, pointer, viewport, asset));
        let outcome = self.placement.on_pick(hit);
        if outcome == PickOutcome::Miss {
            debug!(?pointer, "Placement click missed the model");
        }
        outcome
    }

    /// Name the picked point. Blank names abort; both paths end placement.
    pub fn confirm_name(&mut self, name: &str) -> Result<Option<HotspotId>, ViewerError> {
        let created = self.placement.confirm_name(&mut self.hotspots, name)?;
        if let Some(id) = created {
            info!(%id, name = name.trim(), "Hotspot added");
        }
        Ok(created)
    }

    pub fn delete_hotspot(&mut self, id: HotspotId) -> Option<Hotspot> {
        let removed = self.hotspots.delete(id);
        if removed.is_some() {
            info!(%id, "Hotspot removed");
        }
        removed
    }

    pub fn focus_hotspot(&mut self, id: HotspotId) -> Result<CameraTarget, ViewerError> {
        self.hotspots.focus(id)
    }

    /// Select and focus the marker under the pointer, if any
    pub fn select_marker_at(
        &mut self,
        view: &CameraView,
        pointer: Vec2,
        viewport: Viewport,
    ) -> Option<(HotspotId, CameraTarget)> {
        if viewport.is_degenerate() {
            return None;
        }
        let direction = view.ray_through_ndc(pixel_to_ndc(pointer, viewport));
        let id = self
            .hotspots
            .pick_marker(view.position, direction, self.settings.marker_radius)?;
        let target = self.hotspots.focus(id).ok()?;
        debug!(%id, "Marker selected");
        Some((id, target))
    }

    pub fn clear_selection(&mut self) {
        self.hotspots.clear_selection();
    }
}
