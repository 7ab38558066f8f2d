//! Point selection from mesh geometry and per-point color extraction.
//!
//! Two stages run per frame:
//! - `points`: resolve an ordered point set from the mesh (vertex mode or
//!   area-weighted surface sampling)
//! - `colors`: read a parallel RGBA sample per point from the mesh's color
//!   source

mod colors;
mod points;

use thiserror::Error;

// Re-export public types and functions
pub use colors::{extract_colors, ColorSample, ColorSource};
pub use points::{resolve_points, Point, PointSource};

/// Errors produced while turning a mesh into points and colors.
///
/// All of these are detected on the first frame before any artifact is
/// written, so a bad job fails with a single clear report.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("mesh '{0}' has no geometry for the requested sampling mode")]
    EmptyMesh(String),

    #[error("mesh '{0}' has zero total surface area; cannot distribute surface samples")]
    DegenerateFaces(String),

    #[error("mesh '{0}' has no color attribute and no base color; refusing to guess")]
    MissingColorSource(String),
}
