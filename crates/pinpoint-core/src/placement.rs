//! Placement mode: arming, picking, and naming a new hotspot

use bevy_math::Vec3;

use crate::error::ViewerError;
use crate::hotspot::{HotspotId, HotspotStore};
use crate::picking::PickHit;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PlacementMode {
    #[default]
    Idle,
    /// The next click on the model picks the anchor
    AwaitingClick,
    /// A point was picked; waiting for the user to name it
    Naming { position: Vec3 },
}

/// Result of feeding a click into the placement state machine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickOutcome {
    /// Placement is not armed; the click was not consumed
    Ignored,
    /// Armed, but the ray missed the model; still waiting for a click
    Miss,
    /// Hit; the UI should prompt for a name
    PromptName { position: Vec3 },
}

#[derive(Debug, Clone, Default)]
pub struct Placement {
    mode: PlacementMode,
}

impl Placement {
    pub fn mode(&self) -> PlacementMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != PlacementMode::Idle
    }

    pub fn begin(&mut self, asset_loaded: bool) -> Result<(), ViewerError> {
        if !asset_loaded {
            return Err(ViewerError::NoAssetLoaded);
        }
        if self.mode == PlacementMode::Idle {
            self.mode = PlacementMode::AwaitingClick;
        }
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.mode = PlacementMode::Idle;
    }

    pub fn on_pick(&mut self, hit: Option<PickHit>) -> PickOutcome {
        if self.mode != PlacementMode::AwaitingClick {
            return PickOutcome::Ignored;
        }
        match hit {
            None => PickOutcome::Miss,
            Some(hit) => {
                self.mode = PlacementMode::Naming {
                    position: hit.point,
                };
                PickOutcome::PromptName {
                    position: hit.point,
                }
            }
        }
    }

    /// Finish naming. A blank name aborts creation; both paths return to `Idle`.
    ///
    /// Returns `Ok(None)` when nothing was created.
    pub fn confirm_name(
        &mut self,
        store: &mut HotspotStore,
        name: &str,
    ) -> Result<Option<HotspotId>, ViewerError> {
        let PlacementMode::Naming { position } = self.mode else {
            return Ok(None);
        };
        self.mode = PlacementMode::Idle;

        match store.create(position, name) {
            Ok(id) => Ok(Some(id)),
            Err(ViewerError::InvalidName) => {
                tracing::debug!("Blank hotspot name, placement aborted");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub fn reset(&mut self) {
        self.mode = PlacementMode::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit_at(point: Vec3) -> PickHit {
        PickHit {
            point,
            distance: 1.0,
            triangle: 0,
        }
    }

    #[test]
    fn test_begin_requires_asset() {
        let mut placement = Placement::default();
        assert_eq!(placement.begin(false), Err(ViewerError::NoAssetLoaded));
        assert_eq!(placement.mode(), PlacementMode::Idle);

        placement.begin(true).unwrap();
        assert_eq!(placement.mode(), PlacementMode::AwaitingClick);
        assert!(placement.is_active());
    }

    #[test]
    fn test_miss_keeps_waiting() {
        let mut placement = Placement::default();
        placement.begin(true).unwrap();
        assert_eq!(placement.on_pick(None), PickOutcome::Miss);
        assert_eq!(placement.mode(), PlacementMode::AwaitingClick);
    }

    #[test]
    fn test_click_while_idle_is_ignored() {
        let mut placement = Placement::default();
        assert_eq!(placement.on_pick(Some(hit_at(Vec3::ONE))), PickOutcome::Ignored);
        assert_eq!(placement.mode(), PlacementMode::Idle);
    }

    #[test]
    fn test_hit_then_name_creates_hotspot() {
        let mut placement = Placement::default();
        let mut store = HotspotStore::default();
        let point = Vec3::new(0.4, 0.2, -0.1);

        placement.begin(true).unwrap();
        assert_eq!(
            placement.on_pick(Some(hit_at(point))),
            PickOutcome::PromptName { position: point }
        );
        assert_eq!(placement.mode(), PlacementMode::Naming { position: point });

        // Clicks during the prompt do not move the anchor
        assert_eq!(placement.on_pick(Some(hit_at(Vec3::ZERO))), PickOutcome::Ignored);

        let id = placement.confirm_name(&mut store, "Engine").unwrap().unwrap();
        assert_eq!(placement.mode(), PlacementMode::Idle);
        assert_eq!(store.len(), 1);
        let hotspot = store.get(id).unwrap();
        assert_eq!(hotspot.name, "Engine");
        assert_eq!(hotspot.position, point);
    }

    #[test]
    fn test_blank_name_aborts() {
        let mut placement = Placement::default();
        let mut store = HotspotStore::default();
        placement.begin(true).unwrap();
        placement.on_pick(Some(hit_at(Vec3::ONE)));

        assert_eq!(placement.confirm_name(&mut store, "  "), Ok(None));
        assert_eq!(placement.mode(), PlacementMode::Idle);
        assert!(store.is_empty());
    }

    #[test]
    fn test_cancel_and_reset() {
        let mut placement = Placement::default();
        placement.begin(true).unwrap();
        placement.cancel();
        assert_eq!(placement.mode(), PlacementMode::Idle);

        placement.begin(true).unwrap();
        placement.on_pick(Some(hit_at(Vec3::ONE)));
        placement.reset();
        assert_eq!(placement.mode(), PlacementMode::Idle);

        let mut store = HotspotStore::default();
        assert_eq!(placement.confirm_name(&mut store, "Late"), Ok(None));
        assert!(store.is_empty());
    }
}
