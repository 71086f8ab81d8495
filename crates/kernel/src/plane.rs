use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Distance between block origins: a 10-unit block plus a 2-unit street.
pub const BLOCK_PITCH: i32 = 12;
/// Side length of a city block.
pub const DEFAULT_BLOCK_SIZE: f32 = 10.0;
/// Extent of the generated city in both X and -Z.
pub const DEFAULT_EXTENT: i32 = 196;
/// Largest extent a city is generated for; larger requests are clamped.
pub const MAX_EXTENT: i32 = 4096;

/// The ground the city is built on.
///
/// The plane spans +X and -Z from the origin. Blocks are laid out every
/// [`BLOCK_PITCH`] units; the outer boundary leaves a margin of 2 units
/// before the origin and 8 past the extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneSpec {
    pub extent: i32,
    pub block_size: f32,
}

impl Default for PlaneSpec {
    fn default() -> Self {
        Self::new(DEFAULT_EXTENT)
    }
}

impl PlaneSpec {
    /// Extents above [`MAX_EXTENT`] are clamped to it.
    pub fn new(extent: i32) -> Self {
        Self {
            extent: extent.min(MAX_EXTENT),
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// `(x, z_depth)` origin of every block, row by row. A block covers
    /// `x..x+block_size` and `-z_depth-block_size..-z_depth`.
    pub fn block_origins(&self) -> Vec<(i32, i32)> {
        let steps = || (0..self.extent.max(0)).step_by(BLOCK_PITCH as usize);
        steps()
            .flat_map(|j| steps().map(move |i| (i, j)))
            .collect()
    }

    /// Corners of the outer boundary, in outline order.
    pub fn boundary_corners(&self) -> [Vec3; 4] {
        let near = 2.0;
        let far = -(self.extent as f32) - 8.0;
        let left = -2.0;
        let right = self.extent as f32 + 8.0;
        [
            Vec3::new(left, 0.0, near),
            Vec3::new(left, 0.0, far),
            Vec3::new(right, 0.0, far),
            Vec3::new(right, 0.0, near),
        ]
    }

    /// Closed outline as four segments.
    pub fn boundary_segments(&self) -> [(Vec3, Vec3); 4] {
        let c = self.boundary_corners();
        [(c[0], c[1]), (c[1], c[2]), (c[2], c[3]), (c[3], c[0])]
    }

    /// Whether the XZ point lies inside the boundary outline.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        let c = self.boundary_corners();
        x >= c[0].x && x <= c[2].x && z <= c[0].z && z >= c[1].z
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_origins_step_by_pitch() {
        let plane = PlaneSpec::new(25);
        assert_eq!(
            plane.block_origins(),
            vec![
                (0, 0),
                (12, 0),
                (24, 0),
                (0, 12),
                (12, 12),
                (24, 12),
                (0, 24),
                (12, 24),
                (24, 24)
            ]
        );
    }

    #[test]
    fn default_plane_has_seventeen_by_seventeen_blocks() {
        let plane = PlaneSpec::default();
        assert_eq!(plane.block_size, 10.0);
        assert_eq!(plane.block_origins().len(), 17 * 17);
    }

    #[test]
    fn empty_plane_has_no_blocks() {
        assert!(PlaneSpec::new(0).block_origins().is_empty());
        assert!(PlaneSpec::new(-12).block_origins().is_empty());
        assert_eq!(PlaneSpec::new(i32::MAX).extent, MAX_EXTENT);
    }

    #[test]
    fn boundary_wraps_the_extent() {
        let plane = PlaneSpec::new(12);
        let c = plane.boundary_corners();
        assert_eq!(c[0], Vec3::new(-2.0, 0.0, 2.0));
        assert_eq!(c[1], Vec3::new(-2.0, 0.0, -20.0));
        assert_eq!(c[2], Vec3::new(20.0, 0.0, -20.0));
        assert_eq!(c[3], Vec3::new(20.0, 0.0, 2.0));

        let segments = plane.boundary_segments();
        assert_eq!(segments[3].1, segments[0].0, "outline closes");
        assert!(plane.contains(0.0, 0.0));
        assert!(!plane.contains(21.0, 0.0));
        assert!(!plane.contains(0.0, 3.0));
    }
}
