//! Format version tokens

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The pair of version tokens carried in every file header.
///
/// `version` is the packed format version (one byte per component, so
/// `0x14000005` is `20.0.0.5`); `user_version` is the vendor-specific token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FormatVersion {
    pub version: u32,
    pub user_version: u32,
}

impl FormatVersion {
    pub const OBLIVION: Self = Self::new(0x1400_0005, 11);
    pub const MORROWIND: Self = Self::new(0x0400_0002, 0);

    pub const fn new(version: u32, user_version: u32) -> Self {
        Self {
            version,
            user_version,
        }
    }

    /// Split the packed version into its four dotted components
    pub fn components(&self) -> [u8; 4] {
        self.version.to_be_bytes()
    }
}

impl fmt::Display for FormatVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.components();
        write!(f, "{}.{}.{}.{} (user {})", a, b, c, d, self.user_version)
    }
}

/// Named export targets understood by the pipeline configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameTarget {
    Oblivion,
    Morrowind,
}

impl GameTarget {
    pub fn version(self) -> FormatVersion {
        match self {
            GameTarget::Oblivion => FormatVersion::OBLIVION,
            GameTarget::Morrowind => FormatVersion::MORROWIND,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GameTarget::Oblivion => "Oblivion",
            GameTarget::Morrowind => "Morrowind",
        }
    }
}

impl Default for GameTarget {
    fn default() -> Self {
        GameTarget::Oblivion
    }
}

impl fmt::Display for GameTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GameTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "oblivion" => Ok(GameTarget::Oblivion),
            "morrowind" => Ok(GameTarget::Morrowind),
            other => Err(Error::UnsupportedFormat(format!(
                "Unknown export target: {}",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_display() {
        assert_eq!(FormatVersion::OBLIVION.to_string(), "20.0.0.5 (user 11)");
        assert_eq!(FormatVersion::MORROWIND.to_string(), "4.0.0.2 (user 0)");
    }

    #[test]
    fn test_target_parsing() {
        assert_eq!("Oblivion".parse::<GameTarget>().unwrap(), GameTarget::Oblivion);
        assert_eq!("morrowind".parse::<GameTarget>().unwrap(), GameTarget::Morrowind);
        assert!("Skyrim".parse::<GameTarget>().is_err());
        assert_eq!(GameTarget::Morrowind.version(), FormatVersion::MORROWIND);
    }
}
