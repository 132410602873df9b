//! In-memory form of one asset file

use serde::{Deserialize, Serialize};

use crate::scene::{NodeRef, Scene};
use crate::version::FormatVersion;

/// Metadata carried next to the node tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileHeader {
    pub version: FormatVersion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creator: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub export_info: Vec<String>,
}

impl FileHeader {
    pub fn new(version: FormatVersion) -> Self {
        Self {
            version,
            creator: None,
            export_info: Vec::new(),
        }
    }

    pub fn with_creator<S: Into<String>>(mut self, creator: S) -> Self {
        self.creator = Some(creator.into());
        self
    }
}

/// A materialized asset: header plus scene tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    pub header: FileHeader,
    pub scene: Scene,
}

impl SceneFile {
    pub fn new(header: FileHeader, scene: Scene) -> Self {
        Self { header, scene }
    }

    /// Root blocks in file order
    pub fn root_blocks(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.scene.root_blocks()
    }

    /// The first root block, which is what comparisons operate on
    pub fn root(&self) -> Option<NodeRef<'_>> {
        self.scene.first_root()
    }
}
