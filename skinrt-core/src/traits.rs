//! Core traits for skinrt
//!
//! Asset readers, writers and import/export pipelines are collaborators
//! of the comparator; these traits are the seams they plug into.

use std::path::Path;

use crate::error::Result;
use crate::file::SceneFile;
use crate::pipeline::{ExportConfig, ImportConfig};
use crate::version::FormatVersion;

/// Trait for reading asset files
pub trait SceneReader: Send + Sync {
    /// Read a file. When `expected` is given, a header carrying different
    /// version tokens is an error.
    fn read(&self, path: &Path, expected: Option<FormatVersion>) -> Result<SceneFile>;

    /// Check if this reader can handle the given file by examining its header
    fn can_read(&self, path: &Path) -> bool;

    /// Get the format name this reader handles
    fn format_name(&self) -> &'static str;
}

/// Trait for writing asset files
pub trait SceneWriter: Send + Sync {
    fn write(&self, file: &SceneFile, path: &Path) -> Result<()>;

    /// Get the format name this writer handles
    fn format_name(&self) -> &'static str;
}

/// An import/export pipeline working on one in-memory session.
///
/// Both operations return the file as it was materialized so callers can
/// inspect its root blocks.
pub trait ExportPipeline {
    fn import(&mut self, path: &Path, config: &ImportConfig) -> Result<SceneFile>;

    /// Export the named roots (every root when `selection` is empty) to `path`
    fn export(
        &mut self,
        path: &Path,
        config: &ExportConfig,
        selection: &[String],
    ) -> Result<SceneFile>;
}
