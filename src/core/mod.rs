//! Core data structures and mathematical operations.
//!
//! This module contains the fundamental types used throughout the system:
//! - `TriangleMesh`: evaluated mesh geometry with color attributes
//! - `Splat` / `FrameSplatCloud`: the canonical splat records per frame
//! - Math and color utilities (logit packing, SH DC color packing)
//!
//! All types here are "pure data" - no I/O, no pipeline logic.

mod color;
mod math;
mod mesh;
mod splat;

// Re-export public types
pub use color::{linear_to_srgb, pack_sh_dc, srgb_to_linear, unpack_sh_dc, SH_C0};
pub use math::{inverse_sigmoid, sigmoid};
pub use mesh::TriangleMesh;
pub use splat::{FrameSplatCloud, Splat, MIN_SCALE};
