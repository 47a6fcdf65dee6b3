//! Heliwave: an interactive helicopter over an endless Gerstner-wave ocean.
//!
//! The simulation core is plain state-in, state-out Rust — [`sim::Simulation`]
//! owns everything a frame touches and `advance` runs one frame — while the
//! winit/wgpu shell in the binary drives it and draws the result.

pub mod camera;
pub mod cli;
pub mod flight;
pub mod helipad;
pub mod input;
pub mod ocean;
pub mod params;
pub mod physics;
pub mod rendering;
pub mod sim;
