//! Integration tests for skinrt-compare
//!
//! These tests build small skinned scenes by hand and check the report the
//! comparator produces for them.

use skinrt_compare::*;
use skinrt_core::{
    BoneBindData, BoneRef, Error, GeometryData, NodeId, RigidTransform, Scene, SceneNode,
    SkinBinding, UnitQuaternion, Vector3f,
};

const BONES: [(&str, f32); 4] = [
    ("Bip01", 0.0),
    ("Bip01 Pelvis", 0.9),
    ("Bip01 Spine", 1.1),
    ("Bip01 Head", 1.6),
];

/// Bind data of a bone standing `height` units above the mesh origin
fn bind_for(height: f32) -> BoneBindData {
    RigidTransform::from_translation_rotation(
        Vector3f::new(0.0, 0.0, height),
        UnitQuaternion::from_euler_angles(0.0, 0.0, height),
    )
    .inverse()
    .unwrap()
}

/// A root with a bone chain and one skinned geometry per name in `geometries`
fn skinned_scene(geometries: &[&str], bones: &[(&str, f32)]) -> Scene {
    let mut scene = Scene::new();
    let root = scene.add_root(SceneNode::node("Scene Root"));
    let mut parent = root;
    let mut bone_ids = Vec::new();
    for (name, height) in bones {
        let local = RigidTransform::from_translation(Vector3f::new(0.0, 0.0, *height));
        parent = scene.add_child(parent, SceneNode::bone(*name, local)).unwrap();
        bone_ids.push(parent);
    }
    for geometry in geometries {
        let mut skin = SkinBinding::new().with_skeleton_root(root);
        for ((name, height), id) in bones.iter().zip(&bone_ids) {
            skin.push_bone(*name, *id, bind_for(*height));
        }
        let data = GeometryData::default().with_skin(skin);
        scene.add_child(root, SceneNode::geometry(*geometry, data)).unwrap();
    }
    scene
}

fn skin_mut<'a>(scene: &'a mut Scene, geometry: &str) -> &'a mut SkinBinding {
    let id = scene.find(geometry).unwrap();
    scene
        .node_mut(id)
        .and_then(|n| n.geometry_data_mut())
        .and_then(|g| g.skin.as_mut())
        .unwrap()
}

fn compare(old: &Scene, new: &Scene) -> DiscrepancyReport {
    compare_skinning_info(old.first_root().unwrap(), new.first_root().unwrap())
}

#[test]
fn test_identical_trees_have_no_discrepancies() {
    let old = skinned_scene(&["UpperBody", "LowerBody"], &BONES);
    let new = old.clone();
    let report = compare(&old, &new);
    assert!(report.is_empty(), "{}", report);
    assert_eq!(report.geometry_pairs, 2);
    assert_eq!(report.bones_compared, 8);
}

#[test]
fn test_single_bone_perturbation_is_reported_once() {
    let old = skinned_scene(&["UpperBody"], &BONES);
    let mut new = old.clone();
    skin_mut(&mut new, "UpperBody").bind_data[2].translation.y += 0.05;

    let report = compare(&old, &new);
    assert_eq!(report.len(), 1, "{}", report);
    let entry = &report.entries()[0];
    assert_eq!(entry.bone(), Some("Bip01 Spine"));
    assert!(matches!(
        entry,
        Discrepancy::Numeric(NumericMismatch { value: ValueMismatch::Translation { .. }, .. })
    ));
}

#[test]
fn test_drift_within_tolerance_is_accepted() {
    let old = skinned_scene(&["UpperBody"], &BONES);
    let mut new = old.clone();
    let skin = skin_mut(&mut new, "UpperBody");
    skin.bind_data[1].translation.x += 0.009;
    skin.bind_data[1].rotation[(1, 2)] += 0.009;
    skin.bind_data[1].scale -= 0.009;
    assert!(compare(&old, &new).is_empty());

    // a looser tolerance accepts larger drift too
    skin_mut(&mut new, "UpperBody").bind_data[3].scale += 0.05;
    assert_eq!(compare(&old, &new).len(), 1);
    let loose = SkinningComparator::new(CompareOptions::default().with_tolerance(0.1));
    assert!(loose.compare(old.first_root().unwrap(), new.first_root().unwrap()).is_empty());
}

#[test]
fn test_missing_bone_is_structural() {
    let old = skinned_scene(&["UpperBody"], &BONES);
    let new = skinned_scene(&["UpperBody"], &BONES[..3]);

    let report = compare(&old, &new);
    assert_eq!(report.len(), 1, "{}", report);
    let structural: Vec<_> = report.structural().collect();
    assert_eq!(
        structural[0].kind,
        StructuralKind::MissingInNew {
            bone: "Bip01 Head".to_string()
        }
    );
    assert_eq!(report.for_bone("Bip01 Head").count(), 1);
}

#[test]
fn test_extra_bone_in_new_tree() {
    let old = skinned_scene(&["UpperBody"], &BONES[..3]);
    let new = skinned_scene(&["UpperBody"], &BONES);

    let report = compare(&old, &new);
    assert_eq!(report.len(), 1);
    assert!(matches!(
        &report.structural().next().unwrap().kind,
        StructuralKind::MissingInOld { bone } if bone == "Bip01 Head"
    ));

    let lenient = SkinningComparator::new(CompareOptions::default().with_extra_bones(false));
    assert!(lenient.compare(old.first_root().unwrap(), new.first_root().unwrap()).is_empty());
}

#[test]
fn test_geometry_pairing_ignores_new_only_geometry() {
    let old = skinned_scene(&["Hand"], &BONES);
    let new = skinned_scene(&["UpperBody", "Hand", "Foot"], &BONES);
    let report = compare(&old, &new);
    assert!(report.is_empty(), "{}", report);
    assert_eq!(report.geometry_pairs, 1);

    let report = compare(&new, &old);
    let missing: Vec<_> = report
        .structural()
        .filter(|m| m.kind == StructuralKind::GeometryMissingInNew)
        .map(|m| m.geometry.as_str())
        .collect();
    assert_eq!(missing, vec!["UpperBody", "Foot"]);
}

#[test]
fn test_misaligned_and_duplicate_bones() {
    let old = skinned_scene(&["UpperBody"], &BONES);
    let mut new = old.clone();
    // a second "Bip01 Spine" without bind data of its own
    skin_mut(&mut new, "UpperBody").bones.push(BoneRef::new("Bip01 Spine", NodeId(3)));

    let report = compare(&old, &new);
    let kinds: Vec<_> = report.structural().map(|m| m.kind.clone()).collect();
    assert!(kinds.contains(&StructuralKind::MisalignedBindData {
        side: Side::New,
        bones: 5,
        bind_data: 4,
    }));
    assert!(kinds.contains(&StructuralKind::DuplicateBone {
        side: Side::New,
        bone: "Bip01 Spine".to_string(),
    }));
    assert_eq!(kinds.len(), 2);
    assert_eq!(report.numeric().count(), 0);
    assert_eq!(report.bones_compared, 4);
}

#[test]
fn test_missing_bind_transform_is_only_a_misalignment() {
    let old = skinned_scene(&["UpperBody"], &BONES);
    let mut new = old.clone();
    skin_mut(&mut new, "UpperBody").bind_data.pop();

    let report = compare(&old, &new);
    assert_eq!(report.len(), 1, "{}", report);
    assert_eq!(
        report.structural().next().unwrap().kind,
        StructuralKind::MisalignedBindData {
            side: Side::New,
            bones: 4,
            bind_data: 3,
        }
    );
    assert!(!report.structural().any(|m| matches!(
        m.kind,
        StructuralKind::MissingInNew { .. } | StructuralKind::MissingInOld { .. }
    )));
    assert_eq!(report.bones_compared, 3);
}

#[test]
fn test_skin_missing_on_one_side() {
    let old = skinned_scene(&["UpperBody"], &BONES);
    let mut new = old.clone();
    let id = new.find("UpperBody").unwrap();
    new.node_mut(id).unwrap().geometry_data_mut().unwrap().skin = None;

    let report = compare(&old, &new);
    assert_eq!(report.len(), 1);
    assert_eq!(
        report.structural().next().unwrap().kind,
        StructuralKind::SkinMissing { side: Side::New }
    );
}

#[test]
fn test_cross_product_mode_reproduces_legacy_walk() {
    let old = skinned_scene(&["UpperBody", "LowerBody"], &BONES);
    let mut new = skinned_scene(&["UpperBody", "LowerBody"], &BONES[..3]);
    skin_mut(&mut new, "LowerBody").bind_data[0].scale = 2.0;

    let legacy = SkinningComparator::new(CompareOptions::legacy());
    let report = legacy.compare(old.first_root().unwrap(), new.first_root().unwrap());

    // 2x2 geometry pairs, 3 shared bones each; the missing head is not reported
    assert_eq!(report.geometry_pairs, 4);
    assert_eq!(report.bones_compared, 12);
    assert_eq!(report.structural().count(), 0);
    // the perturbed LowerBody bone is seen once from each old geometry
    assert_eq!(report.for_bone("Bip01").count(), 2);
}

#[test]
fn test_strict_mode_fails_on_any_entry() {
    let old = skinned_scene(&["UpperBody"], &BONES);
    let mut new = old.clone();
    skin_mut(&mut new, "UpperBody").bind_data[0].rotation[(0, 0)] = 0.5;

    let comparator = SkinningComparator::default();
    let err = comparator
        .compare_strict(old.first_root().unwrap(), new.first_root().unwrap())
        .unwrap_err();
    assert!(matches!(err, Error::Discrepancies { count: 1 }));

    assert!(comparator
        .compare_strict(old.first_root().unwrap(), old.first_root().unwrap())
        .is_ok());
}

#[test]
fn test_report_display_and_serialization() -> anyhow::Result<()> {
    let old = skinned_scene(&["UpperBody"], &BONES);
    let mut new = skinned_scene(&["UpperBody"], &BONES[..3]);
    skin_mut(&mut new, "UpperBody").bind_data[1].scale = 1.5;

    let report = compare(&old, &new);
    let text = report.to_string();
    assert!(text.contains("scale mismatch 1 != 1.5"), "{}", text);
    assert!(text.contains("bone 'Bip01 Head' missing in new tree"), "{}", text);

    let json = serde_json::to_value(&report)?;
    assert_eq!(json["bones_compared"], 3);
    assert_eq!(json["entries"].as_array().map(|a| a.len()), Some(2));
    Ok(())
}
