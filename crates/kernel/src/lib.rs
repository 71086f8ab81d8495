//! City Kernel: procedural layout, camera and spinning light, viewer state machine.
//!
//! # Invariants
//! - The same extent and seed always produce the same buildings, in the same order.
//! - No building footprint crosses a street row or column.
//! - Camera and light bases stay orthonormal under any sequence of rotations.
//! - State changes only through discrete commands applied by [`viewer::apply`].

pub mod basis;
pub mod camera;
pub mod error;
pub mod layout;
pub mod light;
pub mod plane;
pub mod scene;
pub mod viewer;

pub use basis::{OrthonormalBasis, Sign};
pub use camera::Camera;
pub use error::SceneError;
pub use layout::{BuildingSpec, eligible_columns, generate_buildings, row_origins};
pub use light::SpinningLight;
pub use plane::PlaneSpec;
pub use scene::Scene;
pub use viewer::{Transition, ViewerState, apply};

pub fn crate_info() -> &'static str {
    "skyline-kernel v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("kernel"));
    }
}
