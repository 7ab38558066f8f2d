//! Companion transform scripts for the external compaction tool.
//!
//! Downstream, each PLY artifact is typically fed through a splat
//! compaction/conversion tool (e.g. PlayCanvas `splat-transform`) to
//! produce a viewer-ready file. The pipeline never invokes that tool; it
//! can optionally write a small declarative JSON script next to each
//! artifact describing the intended invocation, so the conversion is
//! reproducible later without re-running the export.

use crate::io::{LoadError, WriteError};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A declarative description of one compaction run over one artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransformScript {
    /// Command name of the external tool
    pub tool: String,

    /// The PLY artifact this script refers to (file name, relative to the
    /// script's own directory)
    pub input: String,

    /// Desired output file name for the compacted artifact
    pub output: String,

    /// Extra arguments to pass through to the tool
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

impl TransformScript {
    /// Build the default script for one artifact: compact `<stem>.ply`
    /// into `<stem>.compressed.ply` with no extra transforms.
    pub fn for_artifact(artifact: &Path) -> Self {
        let input = artifact
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = artifact
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            tool: "splat-transform".to_string(),
            input,
            output: format!("{}.compressed.ply", stem),
            args: Vec::new(),
        }
    }

    /// Write the script as pretty-printed JSON, atomically (tmp + rename).
    pub fn save(&self, path: &Path) -> Result<(), WriteError> {
        let mut os = path.as_os_str().to_owned();
        os.push(".tmp");
        let tmp = PathBuf::from(os);

        let result = (|| -> Result<(), WriteError> {
            let json = serde_json::to_string_pretty(self)
                .map_err(|e| WriteError::Io(std::io::Error::other(e)))?;
            let mut file = std::fs::File::create(&tmp)?;
            file.write_all(json.as_bytes())?;
            file.write_all(b"\n")?;
            file.flush()?;
            std::fs::rename(&tmp, path)?;
            Ok(())
        })();

        if result.is_err() {
            let _ = std::fs::remove_file(&tmp);
        }
        result
    }

    /// Read a script back from disk.
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| LoadError::InvalidFormat(e.to_string()))
    }
}

/// Script path for an artifact: `<stem>.transform.json` next to the PLY.
pub fn transform_script_path(artifact: &Path) -> PathBuf {
    let stem = artifact
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    artifact.with_file_name(format!("{}.transform.json", stem))
}
