//! Frame sequencing: drive the conversion pipeline over a job's frames.
//!
//! The sequencer owns the per-job state machine. For every frame it asks
//! the host's `MeshEvaluator` for a mesh snapshot, resolves points and
//! colors, sizes the splats, and hands the finished cloud to the
//! serializer. The first error fails the whole job; frames already on disk
//! stay there because each artifact is independently valid.

use crate::core::{FrameSplatCloud, Splat, TriangleMesh};
use crate::export::{ExportError, ExportJob};
use crate::io;
use crate::io::TransformScript;
use crate::sample::{extract_colors, resolve_points, ColorSample, ColorSource, Point};
use crate::spatial::autosize_scales;
use rand::Rng;
use std::path::PathBuf;

/// Host capability: evaluate the mesh at one animation frame.
///
/// The returned mesh must reflect all animation and deformation at that
/// frame, in world space. The call is treated as a blocking, serialized
/// boundary into the host; the pipeline never calls it concurrently.
pub trait MeshEvaluator {
    fn evaluate(
        &mut self,
        frame: i32,
    ) -> Result<TriangleMesh, Box<dyn std::error::Error + Send + Sync>>;
}

/// An evaluator for static geometry: every frame sees the same mesh.
pub struct StaticMeshEvaluator {
    mesh: TriangleMesh,
}

impl StaticMeshEvaluator {
    pub fn new(mesh: TriangleMesh) -> Self {
        Self { mesh }
    }
}

impl MeshEvaluator for StaticMeshEvaluator {
    fn evaluate(
        &mut self,
        _frame: i32,
    ) -> Result<TriangleMesh, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.mesh.clone())
    }
}

/// Where the job currently is. Loops through the middle three states once
/// per frame; any error moves it to `Failed` and stops the job.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JobPhase {
    Pending,
    EvaluatingFrame,
    BuildingSplats,
    Serializing,
    Done,
    Failed,
}

/// One artifact the job produced.
#[derive(Clone, Debug)]
pub struct FrameArtifact {
    pub frame: i32,
    pub path: PathBuf,
    pub splat_count: usize,

    /// Companion transform script, when the job asked for one
    pub transform_script: Option<PathBuf>,
}

/// Summary of a completed job.
#[derive(Clone, Debug, Default)]
pub struct ExportReport {
    pub artifacts: Vec<FrameArtifact>,
}

impl ExportReport {
    pub fn total_splats(&self) -> usize {
        self.artifacts.iter().map(|a| a.splat_count).sum()
    }
}

/// Combine one point, its color sample and its scale into a splat.
///
/// Opacity is the sample's alpha times the job's global multiplier;
/// `Splat::new` applies the [0, 1] clamp and the minimum-scale floor.
pub fn build_splat(
    point: &Point,
    color: &ColorSample,
    scale: f32,
    global_opacity: f32,
) -> Splat {
    Splat::new(
        point.position,
        color.rgb(),
        color.alpha() * global_opacity,
        scale,
    )
}

/// Run an export job to completion.
///
/// Frames are processed in the caller's (ascending) order. Fail-fast: the
/// first error aborts the remaining frames, and artifacts written for
/// earlier frames are kept.
pub fn run_export<E: MeshEvaluator>(
    job: &ExportJob,
    evaluator: &mut E,
    rng: &mut impl Rng,
) -> Result<ExportReport, ExportError> {
    let mut phase = JobPhase::Pending;
    job.validate().inspect_err(|_| fail(&mut phase))?;

    log::info!(
        "export '{}': {} frame(s) -> {}",
        job.mesh_name,
        job.frames.len(),
        job.output_dir.display()
    );

    let mut report = ExportReport::default();
    for &frame in &job.frames {
        enter(&mut phase, JobPhase::EvaluatingFrame, frame);
        let mesh = evaluator
            .evaluate(frame)
            .map_err(|e| ExportError::FrameEvaluation {
                frame,
                reason: e.to_string(),
            })
            .inspect_err(|_| fail(&mut phase))?;

        enter(&mut phase, JobPhase::BuildingSplats, frame);
        let cloud = build_frame_cloud(job, &mesh, frame, rng).inspect_err(|_| fail(&mut phase))?;

        enter(&mut phase, JobPhase::Serializing, frame);
        let path = io::artifact_path(&job.output_dir, &job.mesh_name, frame);
        io::save_ply(&cloud, &path, job.format)
            .map_err(|source| ExportError::Serialization { frame, source })
            .inspect_err(|_| fail(&mut phase))?;

        let transform_script = if job.write_transform_script {
            let script_path = io::transform_script_path(&path);
            TransformScript::for_artifact(&path)
                .save(&script_path)
                .map_err(|source| ExportError::Serialization { frame, source })
                .inspect_err(|_| fail(&mut phase))?;
            Some(script_path)
        } else {
            None
        };

        log::info!("frame {}: {} splats -> {}", frame, cloud.len(), path.display());
        report.artifacts.push(FrameArtifact {
            frame,
            path,
            splat_count: cloud.len(),
            transform_script,
        });
    }

    phase = JobPhase::Done;
    log::info!(
        "export '{}' {:?}: {} artifact(s), {} splats total",
        job.mesh_name,
        phase,
        report.artifacts.len(),
        report.total_splats()
    );
    Ok(report)
}

/// Run the per-frame conversion: points -> colors -> scales -> splats.
fn build_frame_cloud(
    job: &ExportJob,
    mesh: &TriangleMesh,
    frame: i32,
    rng: &mut impl Rng,
) -> Result<FrameSplatCloud, ExportError> {
    let sample_err = |source| ExportError::Sample { frame, source };

    let points = resolve_points(mesh, &job.mode, rng).map_err(sample_err)?;
    let source = ColorSource::resolve(mesh).map_err(sample_err)?;
    let colors = extract_colors(mesh, &points, &source).map_err(sample_err)?;

    let scales = if job.autosize {
        autosize_scales(&points, job.autosize_gain, job.global_size)
    } else {
        vec![job.global_size; points.len()]
    };

    let splats = points
        .iter()
        .zip(&colors)
        .zip(&scales)
        .map(|((point, color), &scale)| build_splat(point, color, scale, job.global_opacity))
        .collect();

    Ok(FrameSplatCloud::from_splats(frame, splats))
}

fn enter(phase: &mut JobPhase, next: JobPhase, frame: i32) {
    *phase = next;
    log::debug!("frame {}: phase {:?}", frame, next);
}

fn fail(phase: &mut JobPhase) {
    *phase = JobPhase::Failed;
}
