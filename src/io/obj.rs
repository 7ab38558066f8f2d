//! OBJ mesh loading for the CLI front end.
//!
//! Supports the subset the exporter needs: `v x y z` with the optional
//! per-vertex color extension (`v x y z r g b`), and `f` lines with
//! `v`, `v/vt`, `v//vn`, or `v/vt/vn` references. Polygons are
//! fan-triangulated. When every vertex carries a color, the colors become
//! the mesh's active `Col` attribute with alpha 1.0.

use crate::core::TriangleMesh;
use crate::io::LoadError;
use nalgebra::Vector3;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Load a triangle mesh from an OBJ file. The mesh name is the file stem.
pub fn load_obj(path: &Path) -> Result<TriangleMesh, LoadError> {
    let file = std::fs::File::open(path)?;
    let reader = BufReader::new(file);

    let name = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string());
    let mut mesh = TriangleMesh::new(name);
    let mut colors: Vec<Option<[f32; 4]>> = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let values: Vec<f32> = tokens
                    .map(|t| {
                        t.parse().map_err(|_| {
                            LoadError::InvalidFormat(format!(
                                "line {}: bad vertex component '{}'",
                                line_no + 1,
                                t
                            ))
                        })
                    })
                    .collect::<Result<_, _>>()?;

                if values.len() < 3 {
                    return Err(LoadError::InvalidFormat(format!(
                        "line {}: vertex needs at least 3 coordinates",
                        line_no + 1
                    )));
                }
                mesh.positions
                    .push(Vector3::new(values[0], values[1], values[2]));
                colors.push(if values.len() >= 6 {
                    Some([values[3], values[4], values[5], 1.0])
                } else {
                    None
                });
            }
            Some("f") => {
                let indices: Vec<u32> = tokens
                    .map(|t| parse_face_index(t, mesh.positions.len(), line_no))
                    .collect::<Result<_, _>>()?;

                if indices.len() < 3 {
                    return Err(LoadError::InvalidFormat(format!(
                        "line {}: face needs at least 3 vertices",
                        line_no + 1
                    )));
                }
                for i in 1..indices.len() - 1 {
                    mesh.faces.push([indices[0], indices[i], indices[i + 1]]);
                }
            }
            // Normals, texture coordinates, groups, materials: not needed.
            _ => {}
        }
    }

    if colors.iter().all(|c| c.is_some()) && !colors.is_empty() {
        let colors: Vec<[f32; 4]> = colors.into_iter().flatten().collect();
        mesh.set_color_attribute("Col", colors);
    }

    Ok(mesh)
}

/// Parse one face reference (`7`, `7/1`, `7//3`, `7/1/3`, or a negative
/// relative index) into a zero-based vertex index.
fn parse_face_index(token: &str, vertex_count: usize, line_no: usize) -> Result<u32, LoadError> {
    let vertex_part = token.split('/').next().unwrap_or("");
    let raw: i64 = vertex_part.parse().map_err(|_| {
        LoadError::InvalidFormat(format!("line {}: bad face index '{}'", line_no + 1, token))
    })?;

    let index = if raw < 0 {
        vertex_count as i64 + raw
    } else {
        raw - 1
    };

    if index < 0 || index >= vertex_count as i64 {
        return Err(LoadError::InvalidFormat(format!(
            "line {}: face index {} out of range",
            line_no + 1,
            raw
        )));
    }
    Ok(index as u32)
}
