//! # splat4d-rs: mesh to 4D Gaussian Splat conversion in Rust
//!
//! This crate converts static or animated mesh geometry into a sequence of
//! Gaussian-splat point clouds, one per animation frame, suitable for 4DGS
//! (3D + time) rendering pipelines.
//!
//! ## Architecture
//!
//! The crate is organized into several modules:
//!
//! - `core`: Fundamental data structures (meshes, splats, math utilities)
//! - `sample`: Point selection from mesh geometry and color extraction
//! - `spatial`: Nearest-neighbor queries and density-based splat sizing
//! - `export`: The per-frame export pipeline (jobs, sequencing)
//! - `io`: File I/O (PLY artifacts, OBJ meshes, transform scripts)
//!
//! ## Pipeline
//!
//! For every frame of an `ExportJob`:
//! 1. A host-supplied `MeshEvaluator` produces the mesh snapshot for the frame.
//! 2. `sample` turns the mesh into points and per-point colors.
//! 3. `spatial` derives per-point scales from local point density (autosize).
//! 4. `io` serializes the resulting splat cloud to a PLY artifact atomically.
//!
//! Frames are independent; the pipeline holds no state across them beyond
//! the read-only job configuration.

// Core data structures and math
pub mod core;

// Point sampling and color extraction
pub mod sample;

// Spatial queries and autosize
pub mod spatial;

// Per-frame export pipeline
pub mod export;

// I/O operations (PLY, OBJ, transform scripts)
pub mod io;

// Re-export commonly used types at crate root for convenience
pub use crate::core::{FrameSplatCloud, Splat, TriangleMesh};
pub use crate::export::{ExportJob, ExportReport, MeshEvaluator, SampleMode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
