use thiserror::Error;

/// Top-level error type for the globe drawer.
#[derive(Debug, Error)]
pub enum DrawerError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Tessellation(#[from] TessellationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Host(#[from] HostError),

    #[error(transparent)]
    Sampling(#[from] SamplingError),
}

/// Errors related to geometric computations.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("degenerate geometry: {0}")]
    Degenerate(String),

    #[error("zero-length vector")]
    ZeroVector,
}

/// Errors related to mesh generation.
#[derive(Debug, Error)]
pub enum TessellationError {
    #[error("invalid tessellation parameters: {0}")]
    InvalidParameters(String),

    #[error("positions and {name} must have the same length ({expected} != {actual})")]
    LengthMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("degenerate input: {0}")]
    Degenerate(String),

    #[error("tessellation failed: {0}")]
    Failed(String),
}

/// Errors related to the drawer lifecycle.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("drawer has been torn down")]
    Destroyed,
}

/// Errors related to the host viewer binding.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("viewer is required")]
    MissingViewer,

    #[error("data source `{0}` is no longer attached to the viewer")]
    DataSourceDetached(String),
}

/// Errors reported by terrain sampling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SamplingError {
    #[error("no positions to sample")]
    EmptyRequest,

    #[error("position {index} has no cartographic representation")]
    InvalidPosition { index: usize },

    #[error("terrain provider failed: {0}")]
    Provider(String),
}

/// Convenience type alias for results using [`DrawerError`].
pub type Result<T> = std::result::Result<T, DrawerError>;
