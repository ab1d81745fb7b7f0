//! Hotspot records and their store

use std::fmt;

use bevy_math::Vec3;
use serde::{Deserialize, Serialize};

use crate::camera::CameraTarget;
use crate::error::ViewerError;
use crate::picking::ray_sphere;

/// Unique hotspot identifier, monotonically increasing within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HotspotId(pub u64);

impl fmt::Display for HotspotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A named annotation anchored at a point on the model surface
#[derive(Debug, Clone, PartialEq)]
pub struct Hotspot {
    pub id: HotspotId,
    pub name: String,
    /// Anchor in world space
    pub position: Vec3,
}

impl Hotspot {
    /// Camera pose that views this hotspot from a fixed offset
    pub fn view_target(&self, offset: Vec3) -> CameraTarget {
        CameraTarget {
            eye: self.position + offset,
            look_at: self.position,
        }
    }
}

/// Ordered collection of hotspots, in creation order, with at most one
/// selected entry
#[derive(Debug, Clone)]
pub struct HotspotStore {
    hotspots: Vec<Hotspot>,
    next_id: u64,
    selected: Option<HotspotId>,
    focus_offset: Vec3,
}

impl Default for HotspotStore {
    fn default() -> Self {
        Self::new(Vec3::splat(2.0))
    }
}

impl HotspotStore {
    pub fn new(focus_offset: Vec3) -> Self {
        Self {
            hotspots: Vec::new(),
            next_id: 1,
            selected: None,
            focus_offset,
        }
    }

    /// Append a hotspot; the name is stored trimmed. Selection is untouched.
    pub fn create(&mut self, position: Vec3, name: &str) -> Result<HotspotId, ViewerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ViewerError::InvalidName);
        }

        let id = HotspotId(self.next_id);
        self.next_id += 1;
        self.hotspots.push(Hotspot {
            id,
            name: name.to_string(),
            position,
        });
        tracing::debug!(%id, name, "Created hotspot");

        Ok(id)
    }

    /// Remove a hotspot, returning it if it existed. Unknown ids are a no-op.
    pub fn delete(&mut self, id: HotspotId) -> Option<Hotspot> {
        let index = self.hotspots.iter().position(|h| h.id == id)?;
        let removed = self.hotspots.remove(index);
        if self.selected == Some(id) {
            self.selected = None;
        }
        tracing::debug!(%id, "Deleted hotspot");
        Some(removed)
    }

    /// Select a hotspot and return the camera target for viewing it
    pub fn focus(&mut self, id: HotspotId) -> Result<CameraTarget, ViewerError> {
        let target = self
            .get(id)
            .map(|h| h.view_target(self.focus_offset))
            .ok_or(ViewerError::NotFound(id))?;
        self.selected = Some(id);
        Ok(target)
    }

    /// Remove every hotspot. Ids are not reused afterwards.
    pub fn clear_all(&mut self) {
        self.hotspots.clear();
        self.selected = None;
    }

    pub fn selected(&self) -> Option<HotspotId> {
        self.selected
    }

    /// Select an existing hotspot without moving the camera
    pub fn select(&mut self, id: HotspotId) -> Result<(), ViewerError> {
        if !self.contains(id) {
            return Err(ViewerError::NotFound(id));
        }
        self.selected = Some(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn get(&self, id: HotspotId) -> Option<&Hotspot> {
        self.hotspots.iter().find(|h| h.id == id)
    }

    pub fn contains(&self, id: HotspotId) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hotspot> {
        self.hotspots.iter()
    }

    pub fn len(&self) -> usize {
        self.hotspots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hotspots.is_empty()
    }

    pub fn focus_offset(&self) -> Vec3 {
        self.focus_offset
    }

    /// Closest marker sphere hit by a ray, if any
    pub fn pick_marker(&self, origin: Vec3, direction: Vec3, radius: f32) -> Option<HotspotId> {
        self.hotspots
            .iter()
            .filter_map(|h| ray_sphere(origin, direction, h.position, radius).map(|t| (t, h.id)))
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, id)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_assigns_unique_ids() {
        let mut store = HotspotStore::default();
        let a = store.create(Vec3::X, "Valve").unwrap();
        let b = store.create(Vec3::Y, "Pump").unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len(), 2);

        let names: Vec<_> = store.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, ["Valve", "Pump"]);
    }

    #[test]
    fn test_create_rejects_blank_names() {
        let mut store = HotspotStore::default();
        assert_eq!(store.create(Vec3::ZERO, "").unwrap_err(), ViewerError::InvalidName);
        assert_eq!(store.create(Vec3::ZERO, "   \t").unwrap_err(), ViewerError::InvalidName);
        assert!(store.is_empty());

        let id = store.create(Vec3::ZERO, "  Inlet  ").unwrap();
        assert_eq!(store.get(id).unwrap().name, "Inlet");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let mut store = HotspotStore::default();
        let id = store.create(Vec3::ZERO, "Valve").unwrap();
        let other = store.create(Vec3::ONE, "Pump").unwrap();
        store.focus(id).unwrap();

        assert_eq!(store.delete(id).map(|h| h.name), Some("Valve".to_string()));
        assert!(store.delete(id).is_none());
        assert!(store.delete(HotspotId(999)).is_none());
        assert_eq!(store.len(), 1);
        assert!(!store.contains(id));
        assert_eq!(store.selected(), None);
        assert_eq!(store.iter().next().map(|h| h.id), Some(other));
    }

    #[test]
    fn test_delete_keeps_unrelated_selection() {
        let mut store = HotspotStore::default();
        let a = store.create(Vec3::ZERO, "A").unwrap();
        let b = store.create(Vec3::ONE, "B").unwrap();
        store.focus(b).unwrap();
        store.delete(a);
        assert_eq!(store.selected(), Some(b));
    }

    #[test]
    fn test_focus_uses_offset() {
        let mut store = HotspotStore::default();
        let id = store.create(Vec3::new(1.0, 0.0, -1.0), "Valve").unwrap();
        assert_eq!(store.selected(), None);

        let target = store.focus(id).unwrap();
        assert_eq!(target.eye, Vec3::new(3.0, 2.0, 1.0));
        assert_eq!(target.look_at, Vec3::new(1.0, 0.0, -1.0));
        assert_eq!(store.selected(), Some(id));

        assert_eq!(
            store.focus(HotspotId(42)).unwrap_err(),
            ViewerError::NotFound(HotspotId(42))
        );
        assert_eq!(store.selected(), Some(id));
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let mut store = HotspotStore::default();
        let first = store.create(Vec3::ZERO, "A").unwrap();
        store.focus(first).unwrap();
        store.clear_all();
        store.clear_all();
        assert!(store.is_empty());
        assert_eq!(store.selected(), None);
        let second = store.create(Vec3::ZERO, "B").unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_pick_marker_prefers_nearest() {
        let mut store = HotspotStore::default();
        let far = store.create(Vec3::new(0.0, 0.0, -10.0), "Far").unwrap();
        let near = store.create(Vec3::new(0.0, 0.0, -5.0), "Near").unwrap();

        let hit = store.pick_marker(Vec3::ZERO, Vec3::NEG_Z, 0.1);
        assert_eq!(hit, Some(near));
        store.delete(near);
        assert_eq!(store.pick_marker(Vec3::ZERO, Vec3::NEG_Z, 0.1), Some(far));
        assert_eq!(store.pick_marker(Vec3::ZERO, Vec3::X, 0.1), None);
    }

    #[test]
    fn test_display_id() {
        assert_eq!(HotspotId(3).to_string(), "#3");
    }
}
