//! Evaluated triangle mesh geometry.
//!
//! A `TriangleMesh` is a snapshot of a mesh at one animation frame, as
//! produced by a host mesh evaluator: world-space vertex positions, triangle
//! topology, and per-vertex color data. The conversion pipeline never
//! mutates a mesh; deformation happens on the host side before evaluation.

use nalgebra::Vector3;
use std::collections::HashMap;

/// An evaluated triangle mesh with optional per-vertex color attributes.
///
/// Color attributes are RGBA with channels in linear [0, 1], one entry per
/// vertex. `active_color` names the attribute the pipeline should read;
/// `base_color` is the uniform fallback when no attribute is available
/// (e.g. a material base color).
#[derive(Clone, Debug)]
pub struct TriangleMesh {
    /// Mesh name, used for artifact naming
    pub name: String,

    /// World-space vertex positions, native vertex order
    pub positions: Vec<Vector3<f32>>,

    /// Triangle faces as vertex index triples
    pub faces: Vec<[u32; 3]>,

    /// Named per-vertex RGBA color attributes
    pub color_attributes: HashMap<String, Vec<[f32; 4]>>,

    /// Name of the active color attribute, if any
    pub active_color: Option<String>,

    /// Uniform RGBA fallback color, if any
    pub base_color: Option<[f32; 4]>,
}

impl TriangleMesh {
    /// Create an empty mesh with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positions: Vec::new(),
            faces: Vec::new(),
            color_attributes: HashMap::new(),
            active_color: None,
            base_color: None,
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Number of triangle faces.
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Add a per-vertex color attribute and mark it active.
    ///
    /// The attribute must have exactly one RGBA entry per vertex; a
    /// mismatched attribute is rejected and the mesh is left unchanged.
    pub fn set_color_attribute(&mut self, name: impl Into<String>, colors: Vec<[f32; 4]>) -> bool {
        if colors.len() != self.positions.len() {
            return false;
        }
        let name = name.into();
        self.active_color = Some(name.clone());
        self.color_attributes.insert(name, colors);
        true
    }

    /// The three corner positions of a face.
    pub fn face_positions(&self, face: usize) -> [Vector3<f32>; 3] {
        let [a, b, c] = self.faces[face];
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    /// Area of a single triangle face.
    pub fn face_area(&self, face: usize) -> f32 {
        let [v0, v1, v2] = self.face_positions(face);
        0.5 * (v1 - v0).cross(&(v2 - v0)).norm()
    }

    /// Total surface area over all faces.
    pub fn surface_area(&self) -> f32 {
        (0..self.faces.len()).map(|f| self.face_area(f)).sum()
    }
}
