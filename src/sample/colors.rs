//! Per-point color extraction.
//!
//! Given a resolved point set, produce one RGBA sample per point from the
//! mesh's color source. Vertex points read their owning vertex's color;
//! surface points interpolate the three corner colors of their face with
//! their barycentric weights.
//!
//! Resolution order: the mesh's active color attribute if present, else the
//! uniform base color. If neither exists the extraction fails rather than
//! defaulting to opaque white, because a fabricated alpha channel silently
//! corrupts every downstream opacity.

use crate::core::TriangleMesh;
use crate::sample::{Point, PointSource, SampleError};

/// One RGBA sample, channels in linear [0, 1], paired 1:1 with a point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorSample {
    pub rgba: [f32; 4],
}

impl ColorSample {
    /// Create a sample, clamping every channel to [0, 1].
    pub fn new(rgba: [f32; 4]) -> Self {
        Self {
            rgba: rgba.map(|c| c.clamp(0.0, 1.0)),
        }
    }

    /// The RGB channels.
    pub fn rgb(&self) -> [f32; 3] {
        [self.rgba[0], self.rgba[1], self.rgba[2]]
    }

    /// The alpha channel.
    pub fn alpha(&self) -> f32 {
        self.rgba[3]
    }
}

/// Where per-point colors come from.
#[derive(Clone, Debug, PartialEq)]
pub enum ColorSource {
    /// A named per-vertex RGBA attribute on the mesh.
    Attribute(String),

    /// A single uniform RGBA value applied to every point.
    Uniform([f32; 4]),
}

impl ColorSource {
    /// Pick the color source for a mesh: the active attribute when one is
    /// set, else the uniform base color, else fail.
    pub fn resolve(mesh: &TriangleMesh) -> Result<Self, SampleError> {
        if let Some(name) = &mesh.active_color {
            return Ok(ColorSource::Attribute(name.clone()));
        }
        if let Some(rgba) = mesh.base_color {
            return Ok(ColorSource::Uniform(rgba));
        }
        Err(SampleError::MissingColorSource(mesh.name.clone()))
    }
}

/// Extract one `ColorSample` per point, in point order.
pub fn extract_colors(
    mesh: &TriangleMesh,
    points: &[Point],
    source: &ColorSource,
) -> Result<Vec<ColorSample>, SampleError> {
    match source {
        ColorSource::Uniform(rgba) => Ok(vec![ColorSample::new(*rgba); points.len()]),
        ColorSource::Attribute(name) => {
            let colors = mesh
                .color_attributes
                .get(name)
                .ok_or_else(|| SampleError::MissingColorSource(mesh.name.clone()))?;

            points
                .iter()
                .map(|p| sample_attribute(mesh, colors, p))
                .collect()
        }
    }
}

fn sample_attribute(
    mesh: &TriangleMesh,
    colors: &[[f32; 4]],
    point: &Point,
) -> Result<ColorSample, SampleError> {
    match point.source {
        PointSource::Vertex(v) => {
            let rgba = colors
                .get(v as usize)
                .ok_or_else(|| SampleError::MissingColorSource(mesh.name.clone()))?;
            Ok(ColorSample::new(*rgba))
        }
        PointSource::Surface { face, bary } => {
            let [a, b, c] = *mesh
                .faces
                .get(face as usize)
                .ok_or_else(|| SampleError::MissingColorSource(mesh.name.clone()))?;

            let mut rgba = [0.0f32; 4];
            for (vertex, weight) in [(a, bary[0]), (b, bary[1]), (c, bary[2])] {
                let corner = colors
                    .get(vertex as usize)
                    .ok_or_else(|| SampleError::MissingColorSource(mesh.name.clone()))?;
                for (acc, ch) in rgba.iter_mut().zip(corner) {
                    *acc += weight * ch;
                }
            }
            Ok(ColorSample::new(rgba))
        }
    }
}
