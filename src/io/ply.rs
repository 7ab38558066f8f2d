//! PLY splat artifact serialization.
//!
//! One artifact per frame, in the field layout 3DGS viewers expect:
//! `x y z f_dc_0 f_dc_1 f_dc_2 opacity scale_0 scale_1 scale_2
//! rot_0 rot_1 rot_2 rot_3`, all `float` (f32, little-endian in binary
//! mode). The header is self-describing, so a conformant reader needs no
//! external schema.
//!
//! Field packing:
//! - color channel c → `(c - 0.5) / SH_C0` (SH DC coefficient)
//! - opacity → logit, saturating to ±20.0 at 0 and 1
//! - isotropic scale → ln(scale), duplicated into all three scale fields
//! - rotation → quaternion w, x, y, z (identity = 1, 0, 0, 0)
//!
//! Writes are atomic: the artifact is written to a `.tmp` sibling and
//! renamed into place, so a failed write never leaves a half-written file
//! at the final path.

use crate::core::{pack_sh_dc, sigmoid, unpack_sh_dc, FrameSplatCloud, Splat};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use nalgebra::{Quaternion, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Artifact encoding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlyFormat {
    BinaryLittleEndian,
    Ascii,
}

/// Errors while writing a splat artifact.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors while reading a splat artifact (or an OBJ mesh).
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid format: {0}")]
    InvalidFormat(String),
}

/// Per-splat field names, in artifact order.
const PROPERTIES: [&str; 14] = [
    "x", "y", "z", "f_dc_0", "f_dc_1", "f_dc_2", "opacity", "scale_0", "scale_1", "scale_2",
    "rot_0", "rot_1", "rot_2", "rot_3",
];

/// Logit opacity with hard saturation, matching what splat viewers accept
/// for fully transparent/opaque points (the plain logit diverges there).
fn pack_opacity(alpha: f32) -> f32 {
    if alpha <= 0.0 {
        -20.0
    } else if alpha >= 1.0 {
        20.0
    } else {
        (alpha / (1.0 - alpha)).ln()
    }
}

fn splat_row(splat: &Splat) -> [f32; 14] {
    let q = splat.rotation.quaternion();
    let log_scale = splat.scale.ln();
    [
        splat.position.x,
        splat.position.y,
        splat.position.z,
        pack_sh_dc(splat.color[0]),
        pack_sh_dc(splat.color[1]),
        pack_sh_dc(splat.color[2]),
        pack_opacity(splat.opacity),
        log_scale,
        log_scale,
        log_scale,
        q.w,
        q.i,
        q.j,
        q.k,
    ]
}

fn row_to_splat(row: &[f32; 14]) -> Splat {
    let rotation = UnitQuaternion::from_quaternion(Quaternion::new(row[10], row[11], row[12], row[13]));
    let mut splat = Splat::new(
        Vector3::new(row[0], row[1], row[2]),
        [
            unpack_sh_dc(row[3]).clamp(0.0, 1.0),
            unpack_sh_dc(row[4]).clamp(0.0, 1.0),
            unpack_sh_dc(row[5]).clamp(0.0, 1.0),
        ],
        sigmoid(row[6]),
        row[7].exp(),
    );
    splat.rotation = rotation;
    splat
}

/// Write a frame's splat cloud to `path`, atomically.
///
/// The data is staged in `<path>.tmp` and renamed over the final path only
/// after a successful flush; on failure the temporary file is removed and
/// nothing appears at `path`.
pub fn save_ply(cloud: &FrameSplatCloud, path: &Path, format: PlyFormat) -> Result<(), WriteError> {
    let tmp = tmp_path(path);

    let result = write_artifact(cloud, &tmp, format)
        .and_then(|_| std::fs::rename(&tmp, path).map_err(WriteError::from));

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

fn write_artifact(
    cloud: &FrameSplatCloud,
    path: &Path,
    format: PlyFormat,
) -> Result<(), WriteError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    // Header
    writeln!(writer, "ply")?;
    match format {
        PlyFormat::BinaryLittleEndian => writeln!(writer, "format binary_little_endian 1.0")?,
        PlyFormat::Ascii => writeln!(writer, "format ascii 1.0")?,
    }
    writeln!(writer, "comment frame {}", cloud.frame)?;
    writeln!(writer, "element vertex {}", cloud.len())?;
    for name in PROPERTIES {
        writeln!(writer, "property float {}", name)?;
    }
    writeln!(writer, "end_header")?;

    // Body
    for splat in cloud.as_slice() {
        let row = splat_row(splat);
        match format {
            PlyFormat::BinaryLittleEndian => {
                for value in row {
                    writer.write_f32::<LittleEndian>(value)?;
                }
            }
            PlyFormat::Ascii => {
                let fields: Vec<String> = row.iter().map(|v| format!("{}", v)).collect();
                writeln!(writer, "{}", fields.join(" "))?;
            }
        }
    }

    writer.flush()?;
    Ok(())
}

/// Read a splat artifact back into a `FrameSplatCloud`.
///
/// Accepts both encodings `save_ply` produces. The header is checked
/// strictly: the element count and the exact property order must match the
/// writer's layout.
pub fn load_ply(path: &Path) -> Result<FrameSplatCloud, LoadError> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let (format, frame, count) = read_header(&mut reader)?;

    let mut cloud = FrameSplatCloud::new(frame);
    match format {
        PlyFormat::BinaryLittleEndian => {
            for _ in 0..count {
                let mut row = [0.0f32; 14];
                for value in row.iter_mut() {
                    *value = reader.read_f32::<LittleEndian>()?;
                }
                cloud.push(row_to_splat(&row));
            }
        }
        PlyFormat::Ascii => {
            let mut line = String::new();
            for i in 0..count {
                line.clear();
                if reader.read_line(&mut line)? == 0 {
                    return Err(LoadError::InvalidFormat(format!(
                        "expected {} splat rows, found {}",
                        count, i
                    )));
                }
                let mut row = [0.0f32; 14];
                let mut fields = line.split_whitespace();
                for value in row.iter_mut() {
                    let field = fields.next().ok_or_else(|| {
                        LoadError::InvalidFormat(format!("splat row {} is too short", i))
                    })?;
                    *value = field.parse().map_err(|_| {
                        LoadError::InvalidFormat(format!("bad float '{}' in row {}", field, i))
                    })?;
                }
                cloud.push(row_to_splat(&row));
            }
        }
    }

    Ok(cloud)
}

fn read_header(reader: &mut impl BufRead) -> Result<(PlyFormat, i32, usize), LoadError> {
    let mut line = String::new();

    reader.read_line(&mut line)?;
    if line.trim_end() != "ply" {
        return Err(LoadError::InvalidFormat("missing 'ply' magic".to_string()));
    }

    let mut format = None;
    let mut frame = 0i32;
    let mut count = None;
    let mut properties = Vec::new();

    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            return Err(LoadError::InvalidFormat(
                "header ended before end_header".to_string(),
            ));
        }
        let trimmed = line.trim_end();
        let mut tokens = trimmed.split_whitespace();

        match tokens.next() {
            Some("format") => {
                format = Some(match tokens.next() {
                    Some("binary_little_endian") => PlyFormat::BinaryLittleEndian,
                    Some("ascii") => PlyFormat::Ascii,
                    other => {
                        return Err(LoadError::InvalidFormat(format!(
                            "unsupported format '{}'",
                            other.unwrap_or("")
                        )))
                    }
                });
            }
            Some("comment") => {
                // The writer records the frame label as `comment frame N`.
                if tokens.next() == Some("frame") {
                    if let Some(Ok(n)) = tokens.next().map(str::parse) {
                        frame = n;
                    }
                }
            }
            Some("element") => {
                if tokens.next() != Some("vertex") {
                    return Err(LoadError::InvalidFormat(
                        "expected a single 'element vertex'".to_string(),
                    ));
                }
                let n = tokens
                    .next()
                    .and_then(|t| t.parse::<usize>().ok())
                    .ok_or_else(|| {
                        LoadError::InvalidFormat("bad element vertex count".to_string())
                    })?;
                count = Some(n);
            }
            Some("property") => {
                if tokens.next() != Some("float") {
                    return Err(LoadError::InvalidFormat(
                        "only float properties are supported".to_string(),
                    ));
                }
                if let Some(name) = tokens.next() {
                    properties.push(name.to_string());
                }
            }
            Some("end_header") => break,
            _ => {
                return Err(LoadError::InvalidFormat(format!(
                    "unexpected header line '{}'",
                    trimmed
                )))
            }
        }
    }

    if properties != PROPERTIES {
        return Err(LoadError::InvalidFormat(format!(
            "unexpected property layout: {:?}",
            properties
        )));
    }

    let format =
        format.ok_or_else(|| LoadError::InvalidFormat("missing format line".to_string()))?;
    let count =
        count.ok_or_else(|| LoadError::InvalidFormat("missing element vertex line".to_string()))?;

    Ok((format, frame, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use tempfile::tempdir;

    fn sample_cloud() -> FrameSplatCloud {
        let mut cloud = FrameSplatCloud::new(12);
        cloud.push(Splat::new(
            Vector3::new(0.0, 0.0, 0.0),
            [1.0, 0.0, 0.0],
            0.5,
            2.0,
        ));
        cloud.push(Splat::new(
            Vector3::new(1.5, -2.0, 3.25),
            [0.2, 0.6, 0.9],
            0.25,
            0.05,
        ));
        cloud
    }

    fn assert_clouds_close(a: &FrameSplatCloud, b: &FrameSplatCloud) {
        assert_eq!(a.frame, b.frame);
        assert_eq!(a.len(), b.len());
        for (x, y) in a.as_slice().iter().zip(b.as_slice()) {
            assert_relative_eq!(x.position.x, y.position.x, epsilon = 1e-5);
            assert_relative_eq!(x.position.y, y.position.y, epsilon = 1e-5);
            assert_relative_eq!(x.position.z, y.position.z, epsilon = 1e-5);
            for c in 0..3 {
                assert_relative_eq!(x.color[c], y.color[c], epsilon = 1e-5);
            }
            assert_relative_eq!(x.opacity, y.opacity, epsilon = 1e-5);
            assert_relative_eq!(x.scale, y.scale, max_relative = 1e-4);
        }
    }

    #[test]
    fn test_binary_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.ply");
        let cloud = sample_cloud();

        save_ply(&cloud, &path, PlyFormat::BinaryLittleEndian).unwrap();
        let loaded = load_ply(&path).unwrap();
        assert_clouds_close(&cloud, &loaded);
    }

    #[test]
    fn test_ascii_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.ply");
        let cloud = sample_cloud();

        save_ply(&cloud, &path, PlyFormat::Ascii).unwrap();
        let loaded = load_ply(&path).unwrap();
        assert_clouds_close(&cloud, &loaded);
    }

    #[test]
    fn test_saturated_opacity_roundtrips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.ply");
        let mut cloud = FrameSplatCloud::new(0);
        cloud.push(Splat::new(Vector3::zeros(), [0.5, 0.5, 0.5], 0.0, 1.0));
        cloud.push(Splat::new(Vector3::zeros(), [0.5, 0.5, 0.5], 1.0, 1.0));

        save_ply(&cloud, &path, PlyFormat::BinaryLittleEndian).unwrap();
        let loaded = load_ply(&path).unwrap();
        assert_relative_eq!(loaded.splats[0].opacity, 0.0, epsilon = 1e-6);
        assert_relative_eq!(loaded.splats[1].opacity, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_header_is_self_describing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.ply");
        save_ply(&sample_cloud(), &path, PlyFormat::Ascii).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("ply\nformat ascii 1.0\n"));
        assert!(text.contains("comment frame 12"));
        assert!(text.contains("element vertex 2"));
        assert!(text.contains("property float x"));
        assert!(text.contains("property float rot_3"));
        assert!(text.contains("end_header"));
    }

    #[test]
    fn test_failed_write_leaves_no_artifact() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("does_not_exist").join("frame.ply");

        let err = save_ply(&sample_cloud(), &path, PlyFormat::BinaryLittleEndian).unwrap_err();
        assert!(matches!(err, WriteError::Io(_)));
        assert!(!path.exists());
    }

    #[test]
    fn test_no_tmp_file_left_after_save() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("frame.ply");
        save_ply(&sample_cloud(), &path, PlyFormat::BinaryLittleEndian).unwrap();

        assert!(path.exists());
        assert!(!tmp_path(&path).exists());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bogus.ply");
        std::fs::write(&path, "not a ply file\n").unwrap();

        let err = load_ply(&path).unwrap_err();
        assert!(matches!(err, LoadError::InvalidFormat(_)));
    }

    #[test]
    fn test_load_rejects_wrong_property_layout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("short.ply");
        std::fs::write(
            &path,
            "ply\nformat ascii 1.0\nelement vertex 1\nproperty float x\nend_header\n0.0\n",
        )
        .unwrap();

        let err = load_ply(&path).unwrap_err();
        assert!(matches!(err, LoadError::InvalidFormat(_)));
    }

    #[test]
    fn test_empty_cloud_roundtrips() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("empty.ply");
        let cloud = FrameSplatCloud::new(3);

        save_ply(&cloud, &path, PlyFormat::BinaryLittleEndian).unwrap();
        let loaded = load_ply(&path).unwrap();
        assert_eq!(loaded.frame, 3);
        assert!(loaded.is_empty());
    }
}
