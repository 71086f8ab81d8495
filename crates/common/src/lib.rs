//! Shared leaf types used across the skyline crates.
//!
//! Nothing here depends on a renderer or a windowing system.

pub mod types;

pub use types::{FacadeTexture, SkyboxFace, approx_eq_vec3, EPSILON};
