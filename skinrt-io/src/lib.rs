//! I/O operations for scene files
//!
//! This crate reads and writes scene documents, the textual form of the
//! scene trees the skinning comparator works on, and picks a reader for a
//! path through a registry.

pub mod document;
pub mod error;
pub mod registry;

pub use document::{header_for, JsonSceneReader, JsonSceneWriter, FORMAT_TAG};
pub use error::*;
pub use registry::ReaderRegistry;

use std::path::{Path, PathBuf};

use skinrt_core::{FormatVersion, Result, SceneFile};

/// Auto-detect format and read a scene file
pub fn read_scene<P: AsRef<Path>>(path: P, expected: Option<FormatVersion>) -> Result<SceneFile> {
    ReaderRegistry::with_defaults().read(path.as_ref(), expected)
}

/// Write a scene file in the format given by its extension
pub fn write_scene<P: AsRef<Path>>(file: &SceneFile, path: P) -> Result<()> {
    ReaderRegistry::with_defaults().write(file, path.as_ref())
}

/// Path an export of `source` is written to: same directory, `_` prefix
pub fn exported_path<P: AsRef<Path>>(source: P) -> PathBuf {
    let source = source.as_ref();
    let name = source
        .file_name()
        .map(|n| format!("_{}", n.to_string_lossy()))
        .unwrap_or_else(|| "_export.json".to_string());
    source.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exported_path() {
        assert_eq!(
            exported_path("fixtures/cuirass.json"),
            PathBuf::from("fixtures/_cuirass.json")
        );
        assert_eq!(exported_path("body.json"), PathBuf::from("_body.json"));
    }
}
