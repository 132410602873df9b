//! Scene document format
//!
//! A scene document is a JSON object carrying the format tag, the file
//! header with its version tokens, and the node arena:
//!
//! ```json
//! {
//!   "format": "skinrt-scene",
//!   "header": { "version": { "version": 335544325, "user_version": 11 } },
//!   "scene": { "nodes": [ { "name": "Scene Root", "type": "node" } ], "roots": [0] }
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};
use skinrt_core::{
    Error, FileHeader, FormatVersion, Result, Scene, SceneFile, SceneReader, SceneWriter,
};

use crate::error::IoError;

/// Value of the `format` field of every scene document
pub const FORMAT_TAG: &str = "skinrt-scene";

#[derive(Debug, Serialize, Deserialize)]
struct SceneDocument {
    format: String,
    header: FileHeader,
    scene: Scene,
}

/// Reader for scene documents
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSceneReader;

/// Writer for scene documents
#[derive(Debug, Clone, Copy)]
pub struct JsonSceneWriter {
    pub pretty: bool,
}

impl Default for JsonSceneWriter {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl JsonSceneReader {
    /// Parse a document from any reader
    pub fn read_from<R: Read>(
        reader: R,
        origin: &str,
        expected: Option<FormatVersion>,
    ) -> Result<SceneFile> {
        let document: SceneDocument =
            serde_json::from_reader(reader).map_err(|e| IoError::ParseError {
                path: origin.to_string(),
                message: e.to_string(),
            })?;

        if document.format != FORMAT_TAG {
            return Err(IoError::InvalidFormat {
                format: format!("{} (expected {})", document.format, FORMAT_TAG),
            }
            .into());
        }

        if let Some(expected) = expected {
            if document.header.version != expected {
                return Err(Error::VersionMismatch {
                    path: origin.to_string(),
                    expected,
                    found: document.header.version,
                });
            }
        }

        document.scene.validate()?;
        debug!(
            "read {} nodes, {} roots from {}",
            document.scene.len(),
            document.scene.roots().len(),
            origin
        );
        Ok(SceneFile::new(document.header, document.scene))
    }
}

impl SceneReader for JsonSceneReader {
    fn read(&self, path: &Path, expected: Option<FormatVersion>) -> Result<SceneFile> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => IoError::FileNotFound {
                path: path.display().to_string(),
            },
            _ => IoError::Io(e),
        })?;
        Self::read_from(BufReader::new(file), &path.display().to_string(), expected)
    }

    fn can_read(&self, path: &Path) -> bool {
        let mut head = [0u8; 256];
        let read = match File::open(path).and_then(|mut f| f.read(&mut head)) {
            Ok(n) => n,
            Err(_) => return false,
        };
        let head = String::from_utf8_lossy(&head[..read]);
        head.trim_start().starts_with('{') && head.contains(FORMAT_TAG)
    }

    fn format_name(&self) -> &'static str {
        "json"
    }
}

impl JsonSceneWriter {
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// Serialize a file into any writer
    pub fn write_to<W: Write>(&self, file: &SceneFile, writer: W) -> Result<()> {
        let document = SceneDocument {
            format: FORMAT_TAG.to_string(),
            header: file.header.clone(),
            scene: file.scene.clone(),
        };
        let result = if self.pretty {
            serde_json::to_writer_pretty(writer, &document)
        } else {
            serde_json::to_writer(writer, &document)
        };
        result.map_err(|e| {
            IoError::WriteError {
                message: e.to_string(),
            }
            .into()
        })
    }
}

impl SceneWriter for JsonSceneWriter {
    fn write(&self, file: &SceneFile, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        self.write_to(file, &mut writer)?;
        writer.flush()?;
        debug!("wrote {} nodes to {}", file.scene.len(), path.display());
        Ok(())
    }

    fn format_name(&self) -> &'static str {
        "json"
    }
}

/// Build a header for files written by this crate
pub fn header_for(version: FormatVersion) -> FileHeader {
    FileHeader::new(version).with_creator(concat!("skinrt ", env!("CARGO_PKG_VERSION")))
}
