//! Import/export configuration records

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::version::GameTarget;

/// How bones of an imported file relate to the skeleton already in the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SkeletonImportMode {
    /// Import the file as-is, as new root blocks
    #[default]
    Default,
    /// Import only the node hierarchy and make it the session skeleton
    RootSkeletonOnly,
    /// Merge bones into the session skeleton by name and attach the geometry
    FullSkeletonMerge,
}

impl SkeletonImportMode {
    /// Numeric code used by scripted configurations (0, 1, 2)
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(SkeletonImportMode::Default),
            1 => Ok(SkeletonImportMode::RootSkeletonOnly),
            2 => Ok(SkeletonImportMode::FullSkeletonMerge),
            other => Err(Error::Pipeline(format!("Unknown skeleton import mode {}", other))),
        }
    }
}

/// Configuration for importing a file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    pub skeleton: SkeletonImportMode,
}

impl ImportConfig {
    pub fn with_skeleton(mut self, mode: SkeletonImportMode) -> Self {
        self.skeleton = mode;
        self
    }
}

/// Configuration for exporting the session scene
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Target game, which fixes the written version tokens
    pub target: GameTarget,
    /// Average normals of coincident vertices across all exported geometry
    pub smooth_seams: bool,
    /// Reparent every bone directly under its skeleton root
    pub flatten_skin: bool,
    /// Convert triangle lists into strips
    pub stripify: bool,
    /// Group skin bones into partitions
    pub skin_partition: bool,
    pub max_bones_per_partition: usize,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            target: GameTarget::Oblivion,
            smooth_seams: false,
            flatten_skin: false,
            stripify: true,
            skin_partition: true,
            max_bones_per_partition: 4,
        }
    }
}

impl ExportConfig {
    pub fn for_target(target: GameTarget) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    pub fn with_smooth_seams(mut self, enabled: bool) -> Self {
        self.smooth_seams = enabled;
        self
    }

    pub fn with_flatten_skin(mut self, enabled: bool) -> Self {
        self.flatten_skin = enabled;
        self
    }

    pub fn with_stripify(mut self, enabled: bool) -> Self {
        self.stripify = enabled;
        self
    }

    pub fn with_skin_partition(mut self, enabled: bool) -> Self {
        self.skin_partition = enabled;
        self
    }

    /// Short description of the enabled options, recorded in the file header
    pub fn describe(&self) -> Vec<String> {
        let mut info = vec![format!("target={}", self.target)];
        for (enabled, name) in [
            (self.smooth_seams, "smooth_seams"),
            (self.flatten_skin, "flatten_skin"),
            (self.stripify, "stripify"),
            (self.skin_partition, "skin_partition"),
        ] {
            if enabled {
                info.push(name.to_string());
            }
        }
        info
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_codes() {
        assert_eq!(
            SkeletonImportMode::from_code(1).unwrap(),
            SkeletonImportMode::RootSkeletonOnly
        );
        assert_eq!(
            SkeletonImportMode::from_code(2).unwrap(),
            SkeletonImportMode::FullSkeletonMerge
        );
        assert!(SkeletonImportMode::from_code(3).is_err());
    }

    #[test]
    fn test_describe_lists_enabled_flags() {
        let config = ExportConfig::for_target(GameTarget::Morrowind)
            .with_stripify(false)
            .with_skin_partition(false)
            .with_smooth_seams(true);
        assert_eq!(config.describe(), vec!["target=Morrowind", "smooth_seams"]);
    }
}
