//! Unified IO registry for format-agnostic reading and writing
//!
//! Readers and writers are registered under a format name. Reading picks a
//! reader from the file extension, then by sniffing the file header, so
//! downstream code can load any supported file without knowing its format.

use std::collections::HashMap;
use std::path::Path;

use log::debug;
use skinrt_core::{Error, FormatVersion, Result, SceneFile, SceneReader, SceneWriter};

use crate::document::{JsonSceneReader, JsonSceneWriter};

/// IO registry that manages format handlers and provides unified access
pub struct ReaderRegistry {
    readers: HashMap<String, Box<dyn SceneReader>>,
    writers: HashMap<String, Box<dyn SceneWriter>>,
    extensions: HashMap<String, String>,
}

impl ReaderRegistry {
    /// Create a new empty IO registry
    pub fn new() -> Self {
        Self {
            readers: HashMap::new(),
            writers: HashMap::new(),
            extensions: HashMap::new(),
        }
    }

    /// Registry with the scene document handlers installed
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_reader("json", Box::new(JsonSceneReader));
        registry.register_writer("json", Box::new(JsonSceneWriter::default()));
        registry.register_extension("json", "json");
        registry
    }

    /// Register a reader for a specific format
    pub fn register_reader(&mut self, format: &str, reader: Box<dyn SceneReader>) {
        self.readers.insert(format.to_lowercase(), reader);
    }

    /// Register a writer for a specific format
    pub fn register_writer(&mut self, format: &str, writer: Box<dyn SceneWriter>) {
        self.writers.insert(format.to_lowercase(), writer);
    }

    /// Map a file extension onto a registered format
    pub fn register_extension(&mut self, extension: &str, format: &str) {
        self.extensions
            .insert(extension.to_lowercase(), format.to_lowercase());
    }

    fn format_for_extension(&self, path: &Path) -> Option<&str> {
        let extension = path.extension()?.to_str()?.to_lowercase();
        self.extensions.get(&extension).map(String::as_str)
    }

    /// Read a file, detecting the format from its extension or header
    pub fn read(&self, path: &Path, expected: Option<FormatVersion>) -> Result<SceneFile> {
        if let Some(reader) = self
            .format_for_extension(path)
            .and_then(|format| self.readers.get(format))
        {
            return reader.read(path, expected);
        }

        // Try to detect format by header signature
        if let Some((format, reader)) = self.readers.iter().find(|(_, r)| r.can_read(path)) {
            debug!("detected {} format for {}", format, path.display());
            return reader.read(path, expected);
        }

        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path.display()),
            )));
        }

        Err(Error::UnsupportedFormat(format!(
            "No reader found for {}",
            path.display()
        )))
    }

    /// Write a file in the format selected by its extension
    pub fn write(&self, file: &SceneFile, path: &Path) -> Result<()> {
        let writer = self
            .format_for_extension(path)
            .and_then(|format| self.writers.get(format))
            .ok_or_else(|| {
                Error::UnsupportedFormat(format!("No writer found for {}", path.display()))
            })?;
        writer.write(file, path)
    }

    /// Get a list of formats that can be read
    pub fn supported_formats(&self) -> Vec<String> {
        self.readers.keys().cloned().collect()
    }

    /// Check if a format is supported for reading
    pub fn supports_reading(&self, format: &str) -> bool {
        self.readers.contains_key(&format.to_lowercase())
    }

    /// Check if a format is supported for writing
    pub fn supports_writing(&self, format: &str) -> bool {
        self.writers.contains_key(&format.to_lowercase())
    }
}

impl Default for ReaderRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::header_for;
    use skinrt_core::{Scene, SceneNode};
    use std::fs;

    // Mock reader that accepts any file
    struct MockReader;

    impl SceneReader for MockReader {
        fn read(&self, _path: &Path, _expected: Option<FormatVersion>) -> Result<SceneFile> {
            let mut scene = Scene::new();
            scene.add_root(SceneNode::node("Mock Root"));
            Ok(SceneFile::new(header_for(FormatVersion::MORROWIND), scene))
        }

        fn can_read(&self, _path: &Path) -> bool {
            true
        }

        fn format_name(&self) -> &'static str {
            "mock"
        }
    }

    fn sample() -> SceneFile {
        let mut scene = Scene::new();
        scene.add_root(SceneNode::node("Scene Root"));
        SceneFile::new(header_for(FormatVersion::OBLIVION), scene)
    }

    #[test]
    fn test_registry_registration() {
        let mut registry = ReaderRegistry::new();
        assert!(!registry.supports_reading("json"));

        registry.register_reader("MOCK", Box::new(MockReader));
        assert!(registry.supports_reading("mock"));
        assert!(!registry.supports_writing("mock"));
        assert_eq!(registry.supported_formats(), vec!["mock".to_string()]);
    }

    #[test]
    fn test_extension_and_header_detection() {
        let registry = ReaderRegistry::with_defaults();
        let dir = std::env::temp_dir();
        let by_extension = dir.join(format!("skinrt_registry_{}.json", std::process::id()));
        let by_header = dir.join(format!("skinrt_registry_{}.scene", std::process::id()));

        registry.write(&sample(), &by_extension).unwrap();
        fs::copy(&by_extension, &by_header).unwrap();

        let a = registry.read(&by_extension, Some(FormatVersion::OBLIVION)).unwrap();
        let b = registry.read(&by_header, None).unwrap();
        assert_eq!(a.root().unwrap().name(), "Scene Root");
        assert_eq!(a.scene, b.scene);

        // no writer for an unknown extension
        assert!(registry.write(&sample(), &by_header).is_err());

        let _ = fs::remove_file(&by_extension);
        let _ = fs::remove_file(&by_header);
    }

    #[test]
    fn test_unsupported_and_missing() {
        let registry = ReaderRegistry::with_defaults();
        assert!(matches!(
            registry.read(Path::new("missing.scene"), None),
            Err(Error::Io(_))
        ));
        // a known extension reaches the reader, which must agree on the kind
        assert!(matches!(
            registry.read(Path::new("does/not/exist.json"), None),
            Err(Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound
        ));

        let path = std::env::temp_dir().join(format!("skinrt_registry_{}.txt", std::process::id()));
        fs::write(&path, "plain text").unwrap();
        assert!(matches!(registry.read(&path, None), Err(Error::UnsupportedFormat(_))));
        let _ = fs::remove_file(&path);
    }
}
