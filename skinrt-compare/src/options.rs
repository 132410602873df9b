//! Comparator configuration

use serde::{Deserialize, Serialize};
use skinrt_core::Tolerance;

/// How geometry nodes of the old tree are paired with those of the new tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GeometryPairing {
    /// The n-th old geometry named `X` pairs with the n-th new geometry named `X`
    #[default]
    ByName,
    /// Geometries pair by their position in pre-order
    ByOrder,
    /// Every old geometry against every new geometry. Missing bones are not
    /// reported in this mode.
    CrossProduct,
}

/// Configuration for a skinning comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareOptions {
    pub tolerance: Tolerance,
    pub pairing: GeometryPairing,
    /// Report bones that only exist in the new tree
    pub report_extra_bones: bool,
    /// Report skinned old geometries that found no partner
    pub report_missing_geometry: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            tolerance: Tolerance::default(),
            pairing: GeometryPairing::ByName,
            report_extra_bones: true,
            report_missing_geometry: true,
        }
    }
}

impl CompareOptions {
    /// All-pairs matching with missing bones ignored
    pub fn legacy() -> Self {
        Self {
            pairing: GeometryPairing::CrossProduct,
            report_extra_bones: false,
            report_missing_geometry: false,
            ..Self::default()
        }
    }

    pub fn with_tolerance<T: Into<Tolerance>>(mut self, tolerance: T) -> Self {
        self.tolerance = tolerance.into();
        self
    }

    pub fn with_pairing(mut self, pairing: GeometryPairing) -> Self {
        self.pairing = pairing;
        self
    }

    pub fn with_extra_bones(mut self, report: bool) -> Self {
        self.report_extra_bones = report;
        self
    }

    pub fn with_missing_geometry(mut self, report: bool) -> Self {
        self.report_missing_geometry = report;
        self
    }
}
