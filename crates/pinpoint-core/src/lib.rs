//! Pinpoint Core - Asset loading, picking, and hotspot annotation
//!
//! This crate provides the graphics-independent parts of the Pinpoint viewer:
//! - GLB parsing into CPU meshes with bounding volumes
//! - Camera framing and orbit pose math
//! - Ray-based surface picking against loaded geometry
//! - The hotspot store and the placement-mode state machine
//! - Label layout and billboard orientation
//! - The viewer session that ties them together, and file configuration

pub mod asset;
pub mod bounds;
pub mod camera;
pub mod config;
pub mod error;
pub mod framing;
pub mod hotspot;
pub mod label;
pub mod picking;
pub mod placement;
pub mod session;

pub use asset::{AssetMesh, LoadedAsset};
pub use bounds::Aabb;
pub use camera::{CameraTarget, OrbitPose};
pub use config::{ConfigError, ViewerConfig};
pub use error::ViewerError;
pub use framing::Framing;
pub use hotspot::{Hotspot, HotspotId, HotspotStore};
pub use picking::{CameraView, PickHit, Viewport};
pub use placement::{PickOutcome, Placement, PlacementMode};
pub use session::{LoadOutcome, LoadTicket, SessionSettings, ViewerSession};
