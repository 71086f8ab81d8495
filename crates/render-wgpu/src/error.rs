use std::path::PathBuf;

/// Errors from the GPU backend.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to read shader {path}: {source}")]
    ShaderRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Shader compilation or pipeline creation failed validation.
    #[error("{program} program failed to link: {message}")]
    ShaderLink {
        program: &'static str,
        message: String,
    },
    /// Buffer or texture creation for the scene failed validation, e.g. an
    /// image larger than the device allows.
    #[error("scene upload failed: {message}")]
    Upload { message: String },
}
