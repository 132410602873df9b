//! Bone matching by name

use std::collections::HashMap;

use log::debug;
use skinrt_core::{matrix_rows, ApproxEq, BoneBindData, SkinBinding, Tolerance};

use crate::report::ValueMismatch;

/// Outcome of comparing one bone present in both skins
#[derive(Debug, Clone, PartialEq)]
pub struct BoneComparison {
    pub name: String,
    pub old_index: usize,
    pub new_index: usize,
    pub mismatches: Vec<ValueMismatch>,
}

impl BoneComparison {
    pub fn is_equal(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Per-name result of matching two skins
#[derive(Debug, Clone, PartialEq)]
pub enum BoneMatch {
    Matched(BoneComparison),
    MissingInOld { name: String },
    MissingInNew { name: String },
}

impl BoneMatch {
    pub fn name(&self) -> &str {
        match self {
            BoneMatch::Matched(c) => &c.name,
            BoneMatch::MissingInOld { name } | BoneMatch::MissingInNew { name } => name,
        }
    }
}

/// Compare rotation, translation and scale of two bind transforms.
///
/// Each component out of tolerance yields one entry, in that order.
pub fn compare_bind_data(
    old: &BoneBindData,
    new: &BoneBindData,
    tolerance: Tolerance,
) -> Vec<ValueMismatch> {
    let mut mismatches = Vec::new();
    if !old.rotation.approx_eq(&new.rotation, tolerance) {
        mismatches.push(ValueMismatch::Rotation {
            old: matrix_rows(&old.rotation),
            new: matrix_rows(&new.rotation),
        });
    }
    if !old.translation.approx_eq(&new.translation, tolerance) {
        mismatches.push(ValueMismatch::Translation {
            old: old.translation.into(),
            new: new.translation.into(),
        });
    }
    if !old.scale.approx_eq(&new.scale, tolerance) {
        mismatches.push(ValueMismatch::Scale {
            old: old.scale,
            new: new.scale,
        });
    }
    mismatches
}

/// First index of every listed bone name
fn index_by_name(skin: &SkinBinding) -> HashMap<&str, usize> {
    let mut index = HashMap::new();
    for (i, name) in skin.bone_names().enumerate() {
        index.entry(name).or_insert(i);
    }
    index
}

/// Match the bones of two skins by name.
///
/// Old bones come first in old order, followed by bones only the new skin
/// has, in new order. A name listed twice only matches at its first
/// occurrence. Bones past the end of the bind data are neither matched nor
/// reported missing; the misalignment itself covers them.
pub fn match_bones(old: &SkinBinding, new: &SkinBinding, tolerance: Tolerance) -> Vec<BoneMatch> {
    let old_index = index_by_name(old);
    let new_index = index_by_name(new);
    let mut matches = Vec::new();

    for (i, (bone, old_bind)) in old.iter().enumerate() {
        if old_index.get(bone.name.as_str()) != Some(&i) {
            continue;
        }
        match new_index.get(bone.name.as_str()) {
            Some(&j) => {
                let Some(new_bind) = new.bind_data.get(j) else {
                    continue;
                };
                debug!("checking bone {}", bone.name);
                matches.push(BoneMatch::Matched(BoneComparison {
                    name: bone.name.clone(),
                    old_index: i,
                    new_index: j,
                    mismatches: compare_bind_data(old_bind, new_bind, tolerance),
                }));
            }
            None => matches.push(BoneMatch::MissingInNew {
                name: bone.name.clone(),
            }),
        }
    }

    for (j, (bone, _)) in new.iter().enumerate() {
        let first = new_index.get(bone.name.as_str()) == Some(&j);
        if first && !old_index.contains_key(bone.name.as_str()) {
            matches.push(BoneMatch::MissingInOld {
                name: bone.name.clone(),
            });
        }
    }

    matches
}

/// Bone names occurring more than once, each reported once
pub fn duplicate_bones(skin: &SkinBinding) -> Vec<&str> {
    let mut seen = HashMap::new();
    let mut duplicates = Vec::new();
    for name in skin.bone_names() {
        let count = seen.entry(name).or_insert(0usize);
        *count += 1;
        if *count == 2 {
            duplicates.push(name);
        }
    }
    duplicates
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinrt_core::{NodeId, Vector3f};
    use approx::assert_relative_eq;

    fn skin(bones: &[(&str, f32)]) -> SkinBinding {
        let mut skin = SkinBinding::new();
        for (i, (name, z)) in bones.iter().enumerate() {
            let bind = BoneBindData::from_translation(Vector3f::new(0.0, 0.0, *z));
            skin.push_bone(*name, NodeId(i), bind);
        }
        skin
    }

    #[test]
    fn test_match_order_and_tags() {
        let old = skin(&[("Pelvis", 0.0), ("Spine", 1.0), ("Head", 2.0)]);
        let new = skin(&[("Spine", 1.0), ("Pelvis", 0.0), ("Tail", 3.0)]);
        let matches = match_bones(&old, &new, Tolerance::default());

        let names: Vec<_> = matches.iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["Pelvis", "Spine", "Head", "Tail"]);
        assert!(matches!(&matches[0], BoneMatch::Matched(c) if c.new_index == 1 && c.is_equal()));
        assert!(matches!(&matches[2], BoneMatch::MissingInNew { .. }));
        assert!(matches!(&matches[3], BoneMatch::MissingInOld { .. }));
    }

    #[test]
    fn test_each_component_reported_once() {
        let old = BoneBindData::identity();
        let mut new = old;
        new.rotation[(0, 1)] = 0.5;
        new.translation.x = 0.2;
        new.scale = 1.1;
        let mismatches = compare_bind_data(&old, &new, Tolerance::default());
        let components: Vec<_> = mismatches.iter().map(|m| m.component()).collect();
        assert_eq!(components, vec!["rotation", "translation", "scale"]);

        match &mismatches[1] {
            ValueMismatch::Translation { old, new } => assert_relative_eq!(new[0] - old[0], 0.2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_duplicates_match_first_occurrence() {
        let old = skin(&[("Spine", 1.0), ("Spine", 5.0)]);
        let new = skin(&[("Spine", 1.0)]);
        let matches = match_bones(&old, &new, Tolerance::default());
        assert_eq!(matches.len(), 1);
        assert!(matches!(&matches[0], BoneMatch::Matched(c) if c.is_equal()));
        assert_eq!(duplicate_bones(&old), vec!["Spine"]);
        assert!(duplicate_bones(&new).is_empty());
    }

    #[test]
    fn test_unaligned_tail_is_not_reported_missing() {
        let old = skin(&[("Pelvis", 0.0), ("Spine", 1.0)]);
        let mut new = old.clone();
        new.bind_data.pop();
        let matches = match_bones(&old, &new, Tolerance::default());
        assert_eq!(matches.len(), 1);
        assert!(matches!(&matches[0], BoneMatch::Matched(c) if c.name == "Pelvis"));

        // the same holds with the sides swapped
        let matches = match_bones(&new, &old, Tolerance::default());
        assert_eq!(matches.len(), 1);
        assert!(matches.iter().all(|m| !matches!(
            m,
            BoneMatch::MissingInOld { .. } | BoneMatch::MissingInNew { .. }
        )));
    }
}
