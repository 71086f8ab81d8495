use crate::layout::{BuildingSpec, generate_buildings};
use crate::plane::PlaneSpec;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::{Deserialize, Serialize};

/// The static part of the city: its ground plane and every building on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    pub plane: PlaneSpec,
    pub buildings: Vec<BuildingSpec>,
}

impl Scene {
    /// Deterministic city for `seed`.
    pub fn generate(extent: i32, seed: u64) -> Self {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        Self::from_rng(extent, &mut rng)
    }

    pub fn from_rng<R: Rng + ?Sized>(extent: i32, rng: &mut R) -> Self {
        Self {
            plane: PlaneSpec::new(extent),
            buildings: generate_buildings(extent, rng),
        }
    }

    pub fn building_count(&self) -> usize {
        self.buildings.len()
    }

    pub fn tallest(&self) -> Option<&BuildingSpec> {
        self.buildings
            .iter()
            .max_by(|a, b| a.height.total_cmp(&b.height))
    }
}
