//! Procedural building placement.
//!
//! Buildings sit on a 2-unit grid inside each city block. Rows run every
//! 6 units into -Z starting at -2; columns run every 2 units along +X.
//! Columns whose offset within a block is 0 or 10 are streets and stay empty.

use crate::plane::{BLOCK_PITCH, MAX_EXTENT};
use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use skyline_common::FacadeTexture;

const FIRST_ROW: i32 = -2;
const ROW_STEP: i32 = 6;
const COLUMN_STEP: i32 = 2;
/// Rows and columns run 6 units past the extent.
const OVERSHOOT: i32 = 6;
const STREET_OFFSETS: [i32; 2] = [0, 10];

/// One in `TALL_ODDS` buildings is drawn from the tall height range.
const TALL_ODDS: u32 = 5;
const TALL_MAX_HEIGHT: u32 = 12;
const SHORT_MAX_HEIGHT: u32 = 7;

/// A generated building: a box centered on `(grid_x, grid_z)` rising from
/// the ground to `height`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuildingSpec {
    pub grid_x: i32,
    pub grid_z: i32,
    pub half_size: f32,
    pub height: f32,
    pub texture: FacadeTexture,
}

impl BuildingSpec {
    /// XZ rectangle covered by the building, as `(min, max)`.
    pub fn footprint(&self) -> (Vec2, Vec2) {
        let center = Vec2::new(self.grid_x as f32, self.grid_z as f32);
        (center - self.half_size, center + self.half_size)
    }

    /// Taller than any building from the short branch can be. Tall-branch
    /// buildings may still land inside the short range.
    pub fn exceeds_short_range(&self) -> bool {
        self.height > SHORT_MAX_HEIGHT as f32
    }
}

/// Whether column `x` falls on a street between blocks.
pub fn is_street_column(x: i32) -> bool {
    STREET_OFFSETS.contains(&x.rem_euclid(BLOCK_PITCH))
}

/// Z coordinates of every building row, nearest first.
pub fn row_origins(extent: i32) -> Vec<i32> {
    let extent = extent.min(MAX_EXTENT);
    if extent <= 0 {
        return Vec::new();
    }
    let far = -extent - OVERSHOOT;
    let mut rows = Vec::new();
    let mut j = FIRST_ROW;
    while j > far {
        rows.push(j);
        j -= ROW_STEP;
    }
    rows
}

/// X coordinates of every non-street column, left to right.
pub fn eligible_columns(extent: i32) -> Vec<i32> {
    let extent = extent.min(MAX_EXTENT);
    if extent <= 0 {
        return Vec::new();
    }
    (0..extent + OVERSHOOT)
        .step_by(COLUMN_STEP as usize)
        .filter(|&i| !is_street_column(i))
        .collect()
}

/// Place buildings for a city of the given extent.
///
/// Each cell draws, in order: half size (1 or 2), the tall branch (1 in 5),
/// the height within that branch, and the facade texture. Output follows
/// row-major loop order, so a seeded generator reproduces the same city.
/// Extents above [`MAX_EXTENT`] are clamped.
pub fn generate_buildings<R: Rng + ?Sized>(extent: i32, rng: &mut R) -> Vec<BuildingSpec> {
    if extent > MAX_EXTENT {
        tracing::warn!(extent, max = MAX_EXTENT, "extent clamped");
    }
    let rows = row_origins(extent);
    let columns = eligible_columns(extent);
    let mut buildings = Vec::with_capacity(rows.len() * columns.len());

    for &grid_z in &rows {
        for &grid_x in &columns {
            let half_size = rng.random_range(1..=2u32) as f32;
            let max_height = if rng.random_range(1..=TALL_ODDS) == 1 {
                TALL_MAX_HEIGHT
            } else {
                SHORT_MAX_HEIGHT
            };
            let height = rng.random_range(1..=max_height) as f32;
            let texture = if rng.random_bool(0.5) {
                FacadeTexture::B
            } else {
                FacadeTexture::A
            };
            let building = BuildingSpec {
                grid_x,
                grid_z,
                half_size,
                height,
                texture,
            };
            tracing::trace!(?building, "placed building");
            buildings.push(building);
        }
    }

    tracing::debug!(
        extent,
        rows = rows.len(),
        columns = columns.len(),
        buildings = buildings.len(),
        above_short_range = buildings.iter().filter(|b| b.exceeds_short_range()).count(),
        "generated city layout"
    );
    buildings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plane::PlaneSpec;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn rng(seed: u64) -> Xoshiro256PlusPlus {
        Xoshiro256PlusPlus::seed_from_u64(seed)
    }

    #[test]
    fn small_extent_loop_bounds() {
        assert_eq!(row_origins(12), vec![-2, -8, -14]);
        assert_eq!(eligible_columns(12), vec![2, 4, 6, 8, 14, 16]);
        assert_eq!(generate_buildings(12, &mut rng(1)).len(), 18);
    }

    #[test]
    fn counts_are_rows_times_columns() {
        assert_eq!(row_origins(24).len(), 5);
        assert_eq!(eligible_columns(24).len(), 10);
        assert_eq!(generate_buildings(24, &mut rng(2)).len(), 50);

        assert_eq!(row_origins(196).len(), 34);
        assert_eq!(eligible_columns(196).len(), 68);
        assert_eq!(generate_buildings(196, &mut rng(3)).len(), 2312);
    }

    #[test]
    fn non_positive_extent_is_empty() {
        for extent in [0, -1, -100] {
            assert!(row_origins(extent).is_empty());
            assert!(eligible_columns(extent).is_empty());
            assert!(generate_buildings(extent, &mut rng(4)).is_empty());
        }
    }

    #[test]
    fn values_stay_in_range() {
        let buildings = generate_buildings(196, &mut rng(5));
        for b in &buildings {
            assert!(b.half_size == 1.0 || b.half_size == 2.0);
            assert!((1.0..=12.0).contains(&b.height));
            assert_eq!(b.height.fract(), 0.0);
        }
        // With 2312 draws both textures and both branches show up.
        assert!(buildings.iter().any(|b| b.texture == FacadeTexture::A));
        assert!(buildings.iter().any(|b| b.texture == FacadeTexture::B));
        assert!(buildings.iter().any(|b| b.exceeds_short_range()));
    }

    #[test]
    fn draws_follow_cell_order() {
        let buildings = generate_buildings(48, &mut rng(8));
        let mut replay = rng(8);
        let mut expected = Vec::new();
        for grid_z in row_origins(48) {
            for grid_x in eligible_columns(48) {
                let half_size = replay.random_range(1..=2u32) as f32;
                let max = if replay.random_range(1..=5u32) == 1 { 12u32 } else { 7 };
                let height = replay.random_range(1..=max) as f32;
                let texture = if replay.random_bool(0.5) {
                    FacadeTexture::B
                } else {
                    FacadeTexture::A
                };
                expected.push(BuildingSpec {
                    grid_x,
                    grid_z,
                    half_size,
                    height,
                    texture,
                });
            }
        }
        assert_eq!(buildings, expected);
    }

    #[test]
    fn tall_branch_is_one_in_five() {
        // Only the tall branch reaches 8..=12: P = 1/5 * 5/12 = 1/12.
        let mut total = 0;
        let mut above = 0;
        let mut b_textures = 0;
        for seed in 0..20 {
            for b in generate_buildings(196, &mut rng(seed)) {
                total += 1;
                above += usize::from(b.exceeds_short_range());
                b_textures += usize::from(b.texture == FacadeTexture::B);
            }
        }
        let above_share = above as f64 / total as f64;
        let b_share = b_textures as f64 / total as f64;
        assert!((above_share - 1.0 / 12.0).abs() < 0.01, "{above_share}");
        assert!((b_share - 0.5).abs() < 0.02, "{b_share}");
    }

    #[test]
    fn huge_extent_is_clamped() {
        assert_eq!(row_origins(i32::MAX), row_origins(MAX_EXTENT));
        assert_eq!(eligible_columns(i32::MAX), eligible_columns(MAX_EXTENT));
        assert_eq!(row_origins(MAX_EXTENT).last(), Some(&-4100));
    }

    #[test]
    fn output_follows_loop_order() {
        let buildings = generate_buildings(24, &mut rng(6));
        let cells: Vec<(i32, i32)> = buildings.iter().map(|b| (b.grid_z, b.grid_x)).collect();
        let expected: Vec<(i32, i32)> = row_origins(24)
            .into_iter()
            .flat_map(|z| eligible_columns(24).into_iter().map(move |x| (z, x)))
            .collect();
        assert_eq!(cells, expected);
    }

    #[test]
    fn footprints_avoid_streets_and_stay_inside_boundary() {
        let extent = 196;
        let plane = PlaneSpec::new(extent);
        let pitch = BLOCK_PITCH as f32;
        for b in generate_buildings(extent, &mut rng(7)) {
            let (min, max) = b.footprint();
            let block_x = (b.grid_x / BLOCK_PITCH) as f32 * pitch;
            assert!(min.x >= block_x && max.x <= block_x + 10.0, "{b:?}");

            let depth = -b.grid_z;
            let block_z = -((depth / BLOCK_PITCH) as f32 * pitch);
            assert!(max.y <= block_z && min.y >= block_z - 10.0, "{b:?}");

            assert!(plane.contains(min.x, min.y) && plane.contains(max.x, max.y));
        }
    }

    #[test]
    fn same_seed_same_city() {
        let a = generate_buildings(60, &mut rng(42));
        let b = generate_buildings(60, &mut rng(42));
        assert_eq!(a, b);
        let c = generate_buildings(60, &mut rng(43));
        assert_ne!(a, c);
    }

    #[test]
    fn street_columns() {
        assert!(is_street_column(0));
        assert!(is_street_column(10));
        assert!(is_street_column(22));
        assert!(!is_street_column(2));
        assert!(!is_street_column(14));
    }
}
