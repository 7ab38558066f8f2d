//! I/O operations for meshes and splat artifacts.
//!
//! This module handles all file formats the pipeline touches:
//! - PLY splat artifacts (write + read-back)
//! - Companion transform scripts for the external compaction tool
//! - OBJ meshes (CLI input)

mod obj;
mod ply;
mod transform;

use std::path::{Path, PathBuf};

// Re-export public types and functions
pub use obj::load_obj;
pub use ply::{load_ply, save_ply, LoadError, PlyFormat, WriteError};
pub use transform::{transform_script_path, TransformScript};

/// Artifact file stem for one frame: `<mesh_name>_<frame>` with the frame
/// label zero-padded to five digits so a batch of frames sorts in animation
/// order by filename. The label is the caller's exact frame number, never a
/// re-derived counter.
pub fn artifact_stem(mesh_name: &str, frame: i32) -> String {
    format!("{}_{:05}", mesh_name, frame)
}

/// Full path of the PLY artifact for one frame.
pub fn artifact_path(dir: &Path, mesh_name: &str, frame: i32) -> PathBuf {
    dir.join(format!("{}.ply", artifact_stem(mesh_name, frame)))
}
