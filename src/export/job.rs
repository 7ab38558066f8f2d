//! Export job configuration.
//!
//! An `ExportJob` captures everything one export invocation needs, as an
//! explicit immutable value: which mesh, which frames, how to sample, how
//! to size and shade splats, and where the artifacts go. It is validated
//! once up front and then only read, so no implicit shared state leaks
//! into the pipeline.

use crate::export::ExportError;
use crate::io::PlyFormat;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How points are taken from the mesh.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SampleMode {
    /// One point per mesh vertex, in native vertex order. Index-stable
    /// across frames.
    Vertices,

    /// Area-weighted random samples across the surface, `density` samples
    /// per square unit. Not index-stable across frames.
    Surface { density: f32 },
}

/// Configuration for one export invocation.
///
/// Deserializable from JSON so jobs can be kept as files; all tuning
/// fields have defaults matching a plain vertex export.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportJob {
    /// Name used for artifact files
    pub mesh_name: String,

    /// Frame labels to export, ascending, no duplicates
    pub frames: Vec<i32>,

    #[serde(default = "default_mode")]
    pub mode: SampleMode,

    /// Multiplier applied to every sample's alpha, in [0, 1]
    #[serde(default = "default_opacity")]
    pub global_opacity: f32,

    /// Base splat size in world units, > 0
    #[serde(default = "default_size")]
    pub global_size: f32,

    /// Derive per-splat scale from nearest-neighbor spacing
    #[serde(default)]
    pub autosize: bool,

    /// Proportionality constant from neighbor distance to scale factor
    #[serde(default = "default_gain")]
    pub autosize_gain: f32,

    #[serde(default = "default_format")]
    pub format: PlyFormat,

    pub output_dir: PathBuf,

    /// Also write a companion transform script next to each artifact
    #[serde(default)]
    pub write_transform_script: bool,
}

fn default_mode() -> SampleMode {
    SampleMode::Vertices
}

fn default_opacity() -> f32 {
    1.0
}

fn default_size() -> f32 {
    0.05
}

fn default_gain() -> f32 {
    1.0
}

fn default_format() -> PlyFormat {
    PlyFormat::BinaryLittleEndian
}

impl ExportJob {
    /// A job with default tuning: vertex mode, binary output, opacity 1.0,
    /// size 0.05, autosize off.
    pub fn new(mesh_name: impl Into<String>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            mesh_name: mesh_name.into(),
            frames: vec![1],
            mode: default_mode(),
            global_opacity: default_opacity(),
            global_size: default_size(),
            autosize: false,
            autosize_gain: default_gain(),
            format: default_format(),
            output_dir: output_dir.into(),
            write_transform_script: false,
        }
    }

    /// Check the configuration before any frame is touched.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.mesh_name.is_empty() {
            return Err(ExportError::InvalidJob("mesh name is empty".to_string()));
        }
        if self.frames.is_empty() {
            return Err(ExportError::InvalidJob("frame list is empty".to_string()));
        }
        if let Some(w) = self.frames.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ExportError::InvalidJob(format!(
                "frames must be strictly ascending, got {} then {}",
                w[0], w[1]
            )));
        }
        if !(0.0..=1.0).contains(&self.global_opacity) {
            return Err(ExportError::InvalidJob(format!(
                "global opacity {} outside [0, 1]",
                self.global_opacity
            )));
        }
        if !(self.global_size > 0.0 && self.global_size.is_finite()) {
            return Err(ExportError::InvalidJob(format!(
                "global size {} must be a positive finite number",
                self.global_size
            )));
        }
        if !(self.autosize_gain > 0.0 && self.autosize_gain.is_finite()) {
            return Err(ExportError::InvalidJob(format!(
                "autosize gain {} must be a positive finite number",
                self.autosize_gain
            )));
        }
        if let SampleMode::Surface { density } = self.mode {
            if !(density > 0.0 && density.is_finite()) {
                return Err(ExportError::InvalidJob(format!(
                    "surface sample density {} must be a positive finite number",
                    density
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_job_validates() {
        let job = ExportJob::new("cube", "out");
        assert!(job.validate().is_ok());
    }

    #[test]
    fn test_duplicate_frames_rejected() {
        let mut job = ExportJob::new("cube", "out");
        job.frames = vec![1, 5, 5, 12];
        assert!(matches!(job.validate(), Err(ExportError::InvalidJob(_))));
    }

    #[test]
    fn test_descending_frames_rejected() {
        let mut job = ExportJob::new("cube", "out");
        job.frames = vec![12, 5, 1];
        assert!(matches!(job.validate(), Err(ExportError::InvalidJob(_))));
    }

    #[test]
    fn test_opacity_out_of_range_rejected() {
        let mut job = ExportJob::new("cube", "out");
        job.global_opacity = 1.5;
        assert!(matches!(job.validate(), Err(ExportError::InvalidJob(_))));
    }

    #[test]
    fn test_zero_size_rejected() {
        let mut job = ExportJob::new("cube", "out");
        job.global_size = 0.0;
        assert!(matches!(job.validate(), Err(ExportError::InvalidJob(_))));
    }

    #[test]
    fn test_zero_density_rejected() {
        let mut job = ExportJob::new("cube", "out");
        job.mode = SampleMode::Surface { density: 0.0 };
        assert!(matches!(job.validate(), Err(ExportError::InvalidJob(_))));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{
            "mesh_name": "cube",
            "frames": [1, 5, 12],
            "output_dir": "out"
        }"#;
        let job: ExportJob = serde_json::from_str(json).unwrap();

        assert_eq!(job.mode, SampleMode::Vertices);
        assert_eq!(job.global_opacity, 1.0);
        assert_eq!(job.global_size, 0.05);
        assert!(!job.autosize);
        assert_eq!(job.format, PlyFormat::BinaryLittleEndian);
        assert!(job.validate().is_ok());
    }
}
