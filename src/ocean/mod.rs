//! Gerstner ocean: the wave field shared by CPU and GPU, plus the disc mesh.

pub mod mesh;
pub mod waves;

pub use mesh::{OceanMesh, OceanVertex};
pub use waves::{SeaState, Wave, WaveSample};
