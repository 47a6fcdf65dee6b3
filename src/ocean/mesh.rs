//! Ocean patch mesh: a radial disc, dense at the center and coarse far out.
//!
//! The disc is generated once and never touched again on the CPU; all wave
//! motion happens in the vertex shader. Each frame the whole patch is
//! re-centered under the helicopter and the shader's phase offset moves by
//! the same amount, so the surface never appears to slide.

use bytemuck::{Pod, Zeroable};

use crate::params::OceanPatch;
use std::f32::consts::TAU;

/// Vertex data for the ocean mesh (rest position only; y is always 0)
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct OceanVertex {
    pub position: [f32; 3],
}

/// Static ocean disc geometry
pub struct OceanMesh {
    pub vertices: Vec<OceanVertex>,
    pub indices: Vec<u32>,
}

impl OceanMesh {
    /// Build the disc: one center vertex, then `rings` concentric rings of
    /// `theta_segments` vertices with geometrically growing spacing.
    pub fn new(patch: &OceanPatch) -> Self {
        let theta_segments = patch.theta_segments;
        let rings = patch.rings;

        let mut vertices = Vec::with_capacity(1 + rings * theta_segments);
        vertices.push(OceanVertex {
            position: [0.0, 0.0, 0.0],
        });

        let mut radius = 0.0f32;
        let mut step = patch.base_ring_step_m;
        for _ in 0..rings {
            radius += step;
            step *= patch.ring_growth;
            for s in 0..theta_segments {
                let theta = TAU * s as f32 / theta_segments as f32;
                vertices.push(OceanVertex {
                    position: [radius * theta.cos(), 0.0, radius * theta.sin()],
                });
            }
        }

        // Innermost ring fans out from the center vertex; every further ring
        // pairs with the previous one as quads (counter-clockwise from +y).
        let mut indices = Vec::with_capacity(3 * (theta_segments + (rings - 1) * theta_segments * 2));
        let ring_start = |ring: usize| (1 + ring * theta_segments) as u32;

        for s in 0..theta_segments {
            let next = (s + 1) % theta_segments;
            indices.extend_from_slice(&[
                0,
                ring_start(0) + s as u32,
                ring_start(0) + next as u32,
            ]);
        }

        for ring in 1..rings {
            let inner = ring_start(ring - 1);
            let outer = ring_start(ring);
            for s in 0..theta_segments {
                let next = ((s + 1) % theta_segments) as u32;
                let s = s as u32;
                indices.extend_from_slice(&[
                    inner + s,
                    outer + s,
                    outer + next,
                    inner + s,
                    outer + next,
                    inner + next,
                ]);
            }
        }

        Self { vertices, indices }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_disc_counts() {
        let patch = OceanPatch::default();
        let mesh = OceanMesh::new(&patch);

        // Center vertex plus full rings
        assert_eq!(
            mesh.vertices.len(),
            1 + patch.rings * patch.theta_segments
        );

        // Fan triangles for the first ring, two per quad after that
        let triangles = patch.theta_segments + (patch.rings - 1) * patch.theta_segments * 2;
        assert_eq!(mesh.indices.len(), triangles * 3);
    }

    #[test]
    fn test_indices_in_range() {
        let patch = OceanPatch {
            theta_segments: 8,
            rings: 4,
            ..OceanPatch::default()
        };
        let mesh = OceanMesh::new(&patch);
        let count = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < count));
    }

    #[test]
    fn test_outer_ring_sits_at_the_computed_radius() {
        let patch = OceanPatch::default();
        let mesh = OceanMesh::new(&patch);
        let outer = mesh.vertices.last().unwrap().position;
        let radius = (outer[0] * outer[0] + outer[2] * outer[2]).sqrt();
        assert_relative_eq!(radius, patch.outer_radius_m(), epsilon = 1.0);
    }

    #[test]
    fn test_rest_surface_is_flat() {
        let patch = OceanPatch {
            theta_segments: 16,
            rings: 8,
            ..OceanPatch::default()
        };
        let mesh = OceanMesh::new(&patch);
        assert!(mesh.vertices.iter().all(|v| v.position[1] == 0.0));
    }
}
