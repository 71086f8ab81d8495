use glam::Vec3;

/// Errors raised while constructing scene state.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("light position {position} coincides with its orbit center {center}")]
    DegenerateLight { position: Vec3, center: Vec3 },
    #[error("camera forward {forward} cannot be oriented against world up {world_up}")]
    DegenerateCamera { forward: Vec3, world_up: Vec3 },
    #[error("non-finite coordinate in {what}: {value}")]
    NonFinite { what: &'static str, value: Vec3 },
}
