//! Parameter definitions with physical units and documented semantics.
//!
//! All magic numbers are extracted here with:
//! - Physical units (meters, seconds, newtons, etc.)
//! - Documented ranges and meanings
//! - Type safety where possible

mod camera;
mod flight;
mod ocean;
mod physics;
mod render;

// Re-export all types
pub use camera::ChaseCamera;
pub use flight::FlightTuning;
pub use ocean::OceanPatch;
pub use physics::PhysicsParams;
pub use render::{RecordingConfig, RenderConfig};
