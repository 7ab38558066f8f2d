//! Splat representation and per-frame cloud data structure.
//!
//! A splat is parameterized by:
//! - Position (mean μ, world space)
//! - Color (linear RGB, view-independent)
//! - Opacity in [0, 1]
//! - Isotropic scale (world units, always > 0)
//! - Rotation (quaternion, identity for mesh-derived splats)
//!
//! Unlike trained splat models, values are stored in their actual space;
//! log/logit packing happens only at the serialization boundary.

use nalgebra::{UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// Floor applied to splat scales.
///
/// Coincident points produce a zero nearest-neighbor distance; flooring here
/// keeps every emitted splat renderable instead of degenerating to a point.
pub const MIN_SCALE: f32 = 1e-6;

/// A single Gaussian splat primitive.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Splat {
    /// Position (mean μ) in world space
    pub position: Vector3<f32>,

    /// Linear RGB color, each channel in [0, 1]
    pub color: [f32; 3],

    /// Opacity in [0, 1]
    pub opacity: f32,

    /// Isotropic scale in world units, always >= `MIN_SCALE`
    pub scale: f32,

    /// Rotation as unit quaternion; identity unless a host supplies one
    pub rotation: UnitQuaternion<f32>,
}

impl Splat {
    /// Create a splat with the invariants of the record enforced:
    /// opacity clamped to [0, 1], scale floored to `MIN_SCALE`.
    pub fn new(position: Vector3<f32>, color: [f32; 3], opacity: f32, scale: f32) -> Self {
        Self {
            position,
            color,
            opacity: opacity.clamp(0.0, 1.0),
            scale: scale.max(MIN_SCALE),
            rotation: UnitQuaternion::identity(),
        }
    }
}

/// An ordered collection of splats for a single animation frame.
///
/// The frame number is a label used for artifact naming only; it carries
/// no interpolation semantics. Clouds are independent per frame and are
/// dropped after serialization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameSplatCloud {
    /// Frame label as supplied by the caller
    pub frame: i32,

    pub splats: Vec<Splat>,
}

impl FrameSplatCloud {
    /// Create a new empty cloud for a frame.
    pub fn new(frame: i32) -> Self {
        Self {
            frame,
            splats: Vec::new(),
        }
    }

    /// Create a cloud from a vector of splats.
    pub fn from_splats(frame: i32, splats: Vec<Splat>) -> Self {
        Self { frame, splats }
    }

    /// Number of splats in the cloud.
    pub fn len(&self) -> usize {
        self.splats.len()
    }

    /// Check if the cloud is empty.
    pub fn is_empty(&self) -> bool {
        self.splats.is_empty()
    }

    /// Add a splat to the cloud.
    pub fn push(&mut self, splat: Splat) {
        self.splats.push(splat);
    }

    /// Get a reference to the splats.
    pub fn as_slice(&self) -> &[Splat] {
        &self.splats
    }
}
