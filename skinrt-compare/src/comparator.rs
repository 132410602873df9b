//! Skinning comparator

use log::{debug, info};
use skinrt_core::{NodeRef, Result, SkinBinding};

use crate::matching::{compare_bind_data, duplicate_bones, match_bones, BoneMatch};
use crate::options::{CompareOptions, GeometryPairing};
use crate::pairing::pair_geometries;
use crate::report::{Discrepancy, DiscrepancyReport, NumericMismatch, Side, StructuralKind};

/// Compares the skin bindings found under two scene roots
#[derive(Debug, Clone, Default)]
pub struct SkinningComparator {
    options: CompareOptions,
}

impl SkinningComparator {
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CompareOptions {
        &self.options
    }

    /// Walk both trees and collect every discrepancy. Never fails.
    pub fn compare(&self, old_root: NodeRef<'_>, new_root: NodeRef<'_>) -> DiscrepancyReport {
        info!(
            "checking skinning data of '{}' against '{}'",
            old_root.name(),
            new_root.name()
        );
        let old_geoms: Vec<_> = old_root.geometries().collect();
        let new_geoms: Vec<_> = new_root.geometries().collect();
        let mut report = DiscrepancyReport::new();

        if self.options.pairing == GeometryPairing::CrossProduct {
            let pairs = pair_geometries(&old_geoms, &new_geoms, GeometryPairing::CrossProduct);
            for (old, new) in pairs.pairs {
                if let (Some(old_skin), Some(new_skin)) = (skin_of(old), skin_of(new)) {
                    report.geometry_pairs += 1;
                    self.compare_all_pairs(old.name(), old_skin, new_skin, &mut report);
                }
            }
            return report;
        }

        let pairs = pair_geometries(&old_geoms, &new_geoms, self.options.pairing);
        for (old, new) in pairs.pairs {
            report.geometry_pairs += 1;
            self.compare_geometry(old, new, &mut report);
        }
        if self.options.report_missing_geometry {
            for old in pairs.unmatched_old.into_iter().filter(|g| skin_of(*g).is_some()) {
                report.push_structural(old.name(), StructuralKind::GeometryMissingInNew);
            }
        }
        debug!(
            "{} geometry pairs, {} bones compared, {} discrepancies",
            report.geometry_pairs,
            report.bones_compared,
            report.len()
        );
        report
    }

    /// Strict variant: a non-empty report is an error
    pub fn compare_strict(
        &self,
        old_root: NodeRef<'_>,
        new_root: NodeRef<'_>,
    ) -> Result<DiscrepancyReport> {
        self.compare(old_root, new_root).into_result()
    }

    fn compare_geometry(&self, old: NodeRef<'_>, new: NodeRef<'_>, report: &mut DiscrepancyReport) {
        let geometry = old.name();
        let (old_skin, new_skin) = match (skin_of(old), skin_of(new)) {
            (Some(o), Some(n)) => (o, n),
            (None, None) => return,
            (Some(_), None) => {
                report.push_structural(geometry, StructuralKind::SkinMissing { side: Side::New });
                return;
            }
            (None, Some(_)) => {
                report.push_structural(geometry, StructuralKind::SkinMissing { side: Side::Old });
                return;
            }
        };

        for (side, skin) in [(Side::Old, old_skin), (Side::New, new_skin)] {
            if !skin.is_aligned() {
                report.push_structural(
                    geometry,
                    StructuralKind::MisalignedBindData {
                        side,
                        bones: skin.bones.len(),
                        bind_data: skin.bind_data.len(),
                    },
                );
            }
            for bone in duplicate_bones(skin) {
                report.push_structural(
                    geometry,
                    StructuralKind::DuplicateBone {
                        side,
                        bone: bone.to_string(),
                    },
                );
            }
        }

        for bone_match in match_bones(old_skin, new_skin, self.options.tolerance) {
            match bone_match {
                BoneMatch::Matched(comparison) => {
                    report.bones_compared += 1;
                    for value in comparison.mismatches {
                        report.push(Discrepancy::Numeric(NumericMismatch {
                            geometry: geometry.to_string(),
                            bone: comparison.name.clone(),
                            value,
                        }));
                    }
                }
                BoneMatch::MissingInNew { name } => {
                    report.push_structural(geometry, StructuralKind::MissingInNew { bone: name });
                }
                BoneMatch::MissingInOld { name } if self.options.report_extra_bones => {
                    report.push_structural(geometry, StructuralKind::MissingInOld { bone: name });
                }
                BoneMatch::MissingInOld { .. } => {}
            }
        }
    }

    /// Every old bone against every equally named new bone, as the legacy
    /// harness did. Bones without a partner are skipped.
    fn compare_all_pairs(
        &self,
        geometry: &str,
        old_skin: &SkinBinding,
        new_skin: &SkinBinding,
        report: &mut DiscrepancyReport,
    ) {
        for (old_bone, old_bind) in old_skin.iter() {
            for (new_bone, new_bind) in new_skin.iter() {
                if old_bone.name != new_bone.name {
                    continue;
                }
                debug!("checking bone {}", old_bone.name);
                report.bones_compared += 1;
                for value in compare_bind_data(old_bind, new_bind, self.options.tolerance) {
                    report.push(Discrepancy::Numeric(NumericMismatch {
                        geometry: geometry.to_string(),
                        bone: old_bone.name.clone(),
                        value,
                    }));
                }
            }
        }
    }
}

fn skin_of(node: NodeRef<'_>) -> Option<&SkinBinding> {
    node.geometry().and_then(|g| g.skin.as_ref())
}

/// Compare the skinning of two roots with default options
pub fn compare_skinning_info(old_root: NodeRef<'_>, new_root: NodeRef<'_>) -> DiscrepancyReport {
    SkinningComparator::default().compare(old_root, new_root)
}
