//! Viewer error taxonomy

use thiserror::Error;

use crate::hotspot::HotspotId;

/// Errors surfaced by viewer operations. All of them are recoverable and
/// end up as a short status line in the UI.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ViewerError {
    /// Upload is not a well-formed binary scene container, or has the wrong extension
    #[error("invalid asset format: {0}")]
    InvalidAssetFormat(String),
    /// Annotation or framing requested with nothing loaded
    #[error("no model loaded")]
    NoAssetLoaded,
    /// Empty or whitespace-only hotspot name
    #[error("hotspot name must not be empty")]
    InvalidName,
    /// Stale or unknown hotspot id
    #[error("hotspot {0} not found")]
    NotFound(HotspotId),
}

impl ViewerError {
    /// Short message for the status bar
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidAssetFormat(_) => "Please select a valid GLB file".to_string(),
            Self::NoAssetLoaded => "Please load a model first".to_string(),
            Self::InvalidName => "Hotspot name is empty".to_string(),
            Self::NotFound(id) => format!("Hotspot {} no longer exists", id),
        }
    }
}
