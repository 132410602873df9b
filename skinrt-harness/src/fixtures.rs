//! Generated fixture files
//!
//! The scenarios run against a small set of scene documents: a biped
//! skeleton, four body parts skinned to it, an armor piece, a creature and
//! a single-file body mesh. They are generated rather than checked in so
//! the rig stays consistent across files.

use std::collections::HashMap;
use std::f32::consts::FRAC_PI_2;
use std::path::{Path, PathBuf};

use log::info;
use skinrt_core::{
    Error, FormatVersion, GeometryData, NodeId, Point3f, Result, RigidTransform, Scene, SceneFile,
    SceneNode, SkinBinding, UnitQuaternion, Vector3f,
};
use skinrt_io::{header_for, write_scene};

pub const SKELETON: &str = "skeleton.json";
pub const UPPER_BODY: &str = "upperbody.json";
pub const LOWER_BODY: &str = "lowerbody.json";
pub const HAND: &str = "hand.json";
pub const FOOT: &str = "foot.json";
/// Output of the full body merge; never generated
pub const FULL_BODY: &str = "fulloblivionbody.json";
pub const CUIRASS: &str = "cuirass.json";
pub const BABELFISH: &str = "babelfish.json";
pub const BODY_MESH: &str = "bb_skinf_br.json";

/// Bone name, parent name (empty for the attachment node), offset, twist
type BoneSpec = (&'static str, &'static str, [f32; 3], f32);

const BIPED: &[BoneSpec] = &[
    ("Bip01", "", [0.0, 0.0, 1.0], 0.0),
    ("Bip01 Pelvis", "Bip01", [0.0, 0.0, 0.0], 0.05),
    ("Bip01 Spine", "Bip01 Pelvis", [0.0, 0.0, 0.1], 0.02),
    ("Bip01 Spine1", "Bip01 Spine", [0.0, 0.0, 0.2], -0.03),
    ("Bip01 Neck", "Bip01 Spine1", [0.0, 0.0, 0.25], 0.0),
    ("Bip01 Head", "Bip01 Neck", [0.0, 0.0, 0.1], 0.1),
    ("Bip01 L UpperArm", "Bip01 Spine1", [0.18, 0.0, 0.2], 0.3),
    ("Bip01 L Forearm", "Bip01 L UpperArm", [0.28, 0.0, 0.0], 0.1),
    ("Bip01 L Hand", "Bip01 L Forearm", [0.25, 0.0, 0.0], 0.05),
    ("Bip01 R UpperArm", "Bip01 Spine1", [-0.18, 0.0, 0.2], -0.3),
    ("Bip01 R Forearm", "Bip01 R UpperArm", [-0.28, 0.0, 0.0], -0.1),
    ("Bip01 R Hand", "Bip01 R Forearm", [-0.25, 0.0, 0.0], -0.05),
    ("Bip01 L Thigh", "Bip01 Pelvis", [0.1, 0.0, -0.05], 0.02),
    ("Bip01 L Calf", "Bip01 L Thigh", [0.0, 0.0, -0.45], -0.02),
    ("Bip01 L Foot", "Bip01 L Calf", [0.0, 0.0, -0.42], 0.0),
    ("Bip01 R Thigh", "Bip01 Pelvis", [-0.1, 0.0, -0.05], -0.02),
    ("Bip01 R Calf", "Bip01 R Thigh", [0.0, 0.0, -0.45], 0.02),
    ("Bip01 R Foot", "Bip01 R Calf", [0.0, 0.0, -0.42], 0.0),
];

const FISH: &[BoneSpec] = &[
    ("Fish Spine", "Root Bone", [0.1, 0.0, 0.0], 0.0),
    ("Fish Spine1", "Fish Spine", [-0.2, 0.0, 0.0], 0.08),
    ("Fish Tail", "Fish Spine1", [-0.25, 0.0, 0.0], -0.15),
    ("Fish Jaw", "Fish Spine", [0.3, 0.0, -0.05], 0.2),
];

fn bone_transform(offset: [f32; 3], twist: f32) -> RigidTransform {
    RigidTransform::from_translation_rotation(
        Vector3f::new(offset[0], offset[1], offset[2]),
        UnitQuaternion::from_euler_angles(twist, 0.0, twist * 0.5),
    )
}

/// Add the bones of `rig` below the nodes already present in `ids`
fn add_rig(
    scene: &mut Scene,
    ids: &mut HashMap<&'static str, NodeId>,
    attach: NodeId,
    rig: &[BoneSpec],
) -> Result<()> {
    for &(name, parent, offset, twist) in rig {
        if ids.contains_key(name) {
            continue;
        }
        let parent = if parent.is_empty() {
            attach
        } else {
            *ids.get(parent).ok_or_else(|| {
                Error::InvalidData(format!("Bone '{}' is listed before its parent", name))
            })?
        };
        let id = scene.add_child(parent, SceneNode::bone(name, bone_transform(offset, twist)))?;
        ids.insert(name, id);
    }
    Ok(())
}

/// Square tubes along each chain of points, with radial normals
fn tubes(chains: &[Vec<Point3f>], radius: f32) -> GeometryData {
    let mut vertices = Vec::new();
    let mut normals = Vec::new();
    let mut triangles = Vec::new();

    for chain in chains {
        let first = vertices.len();
        for center in chain {
            for k in 0..4 {
                let angle = k as f32 * FRAC_PI_2;
                let direction = Vector3f::new(angle.cos(), angle.sin(), 0.0);
                vertices.push(*center + direction * radius);
                normals.push(direction);
            }
        }
        for ring in 0..chain.len().saturating_sub(1) {
            for k in 0..4 {
                let a = (first + ring * 4 + k) as u16;
                let b = (first + ring * 4 + (k + 1) % 4) as u16;
                let c = a + 4;
                let d = b + 4;
                triangles.push([a, b, d]);
                triangles.push([a, d, c]);
            }
        }
    }
    GeometryData::new(vertices, triangles).with_normals(normals)
}

/// A skinned mesh: tubes along `chains`, bound to `bones`
struct Part<'a> {
    name: &'a str,
    chains: &'a [&'a [&'a str]],
    bones: &'a [&'a str],
    radius: f32,
}

/// Attach `part` under `parent`; its skin is rooted at `skeleton_root`
fn add_skinned_part(
    scene: &mut Scene,
    ids: &HashMap<&'static str, NodeId>,
    parent: NodeId,
    skeleton_root: NodeId,
    part: &Part<'_>,
) -> Result<NodeId> {
    let Part { name, chains, bones, radius } = *part;
    let lookup = |bone: &str| {
        ids.get(bone)
            .copied()
            .ok_or_else(|| {
                Error::InvalidData(format!("Unknown bone '{}' in part '{}'", bone, name))
            })
    };

    let mesh_world = scene.world_transform(parent);
    let to_mesh = mesh_world
        .inverse()
        .ok_or_else(|| Error::InvalidData(format!("Parent of '{}' has zero scale", name)))?;
    let chains = chains
        .iter()
        .map(|chain| {
            chain
                .iter()
                .map(|bone| {
                    let world = scene.world_transform(lookup(bone)?);
                    Ok(to_mesh.transform_point(&Point3f::from(world.translation)))
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let mut skin = SkinBinding::new().with_skeleton_root(skeleton_root);
    for bone in bones {
        let id = lookup(bone)?;
        let bind = scene
            .world_transform(id)
            .inverse()
            .map(|inverse| inverse.compose(&mesh_world))
            .ok_or_else(|| Error::InvalidData(format!("Bone '{}' has zero scale", bone)))?;
        skin.push_bone(*bone, id, bind);
    }

    scene.add_child(parent, SceneNode::geometry(name, tubes(&chains, radius).with_skin(skin)))
}

fn biped(root_name: &str) -> Result<(Scene, HashMap<&'static str, NodeId>, NodeId)> {
    let mut scene = Scene::new();
    let root = scene.add_root(SceneNode::node(root_name));
    let mut ids = HashMap::new();
    add_rig(&mut scene, &mut ids, root, BIPED)?;
    Ok((scene, ids, root))
}

const UPPER_CHAINS: &[&[&str]] = &[
    &["Bip01 Pelvis", "Bip01 Spine", "Bip01 Spine1", "Bip01 Neck"],
    &["Bip01 L UpperArm", "Bip01 L Forearm"],
    &["Bip01 R UpperArm", "Bip01 R Forearm"],
];
const UPPER_BONES: &[&str] = &[
    "Bip01 Pelvis",
    "Bip01 Spine",
    "Bip01 Spine1",
    "Bip01 Neck",
    "Bip01 L UpperArm",
    "Bip01 L Forearm",
    "Bip01 R UpperArm",
    "Bip01 R Forearm",
];
const LOWER_CHAINS: &[&[&str]] = &[
    &["Bip01 Pelvis", "Bip01 L Thigh", "Bip01 L Calf"],
    &["Bip01 Pelvis", "Bip01 R Thigh", "Bip01 R Calf"],
];
const LOWER_BONES: &[&str] = &[
    "Bip01 Pelvis",
    "Bip01 L Thigh",
    "Bip01 L Calf",
    "Bip01 R Thigh",
    "Bip01 R Calf",
];

fn body_part(name: &str, chains: &[&[&str]], bones: &[&str]) -> Result<Scene> {
    let (mut scene, ids, root) = biped("Scene Root")?;
    let part = Part { name, chains, bones, radius: 0.12 };
    add_skinned_part(&mut scene, &ids, root, root, &part)?;
    Ok(scene)
}

pub fn skeleton() -> Result<Scene> {
    Ok(biped("Scene Root")?.0)
}

pub fn upper_body() -> Result<Scene> {
    body_part("UpperBody", UPPER_CHAINS, UPPER_BONES)
}

pub fn lower_body() -> Result<Scene> {
    body_part("LowerBody", LOWER_CHAINS, LOWER_BONES)
}

pub fn hand() -> Result<Scene> {
    body_part(
        "Hand",
        &[
            &["Bip01 L Forearm", "Bip01 L Hand"],
            &["Bip01 R Forearm", "Bip01 R Hand"],
        ],
        &["Bip01 L Forearm", "Bip01 L Hand", "Bip01 R Forearm", "Bip01 R Hand"],
    )
}

pub fn foot() -> Result<Scene> {
    body_part(
        "Foot",
        &[&["Bip01 L Calf", "Bip01 L Foot"], &["Bip01 R Calf", "Bip01 R Foot"]],
        &["Bip01 L Calf", "Bip01 L Foot", "Bip01 R Calf", "Bip01 R Foot"],
    )
}

pub fn cuirass() -> Result<Scene> {
    let (mut scene, ids, root) = biped("Scene Root")?;
    let part = Part {
        name: "Cuirass",
        chains: &[&["Bip01 Pelvis", "Bip01 Spine", "Bip01 Spine1", "Bip01 Neck"]],
        bones: &[
            "Bip01 Pelvis",
            "Bip01 Spine",
            "Bip01 Spine1",
            "Bip01 Neck",
            "Bip01 L UpperArm",
            "Bip01 R UpperArm",
        ],
        radius: 0.16,
    };
    add_skinned_part(&mut scene, &ids, root, root, &part)?;
    Ok(scene)
}

/// Creature whose root block is a bone
pub fn babelfish() -> Result<Scene> {
    let mut scene = Scene::new();
    let root = scene.add_root(SceneNode::bone("Root Bone", bone_transform([0.0, 0.0, 0.6], 0.0)));
    let mut ids = HashMap::from([("Root Bone", root)]);
    add_rig(&mut scene, &mut ids, root, FISH)?;
    let part = Part {
        name: "Tri Fish",
        chains: &[&["Fish Jaw", "Fish Spine", "Fish Spine1", "Fish Tail"]],
        bones: &["Fish Spine", "Fish Spine1", "Fish Tail", "Fish Jaw"],
        radius: 0.08,
    };
    add_skinned_part(&mut scene, &ids, root, root, &part)?;
    Ok(scene)
}

/// Single-file body whose root block is the skeleton root with the mesh below it
pub fn body_mesh() -> Result<Scene> {
    let mut scene = Scene::new();
    let (name, _, offset, twist) = BIPED[0];
    let root = scene.add_root(SceneNode::bone(name, bone_transform(offset, twist)));
    let mut ids = HashMap::from([(name, root)]);
    add_rig(&mut scene, &mut ids, root, BIPED)?;
    let chains: Vec<&[&str]> = UPPER_CHAINS.iter().chain(LOWER_CHAINS).copied().collect();
    let bones: Vec<&str> = UPPER_BONES
        .iter()
        .chain(LOWER_BONES.iter().skip(1))
        .copied()
        .collect();
    let part = Part {
        name: "Tri Skin",
        chains: &chains,
        bones: &bones,
        radius: 0.12,
    };
    add_skinned_part(&mut scene, &ids, root, root, &part)?;
    Ok(scene)
}

/// Every fixture with its file name and header version
pub fn builtin_fixtures() -> Result<Vec<(&'static str, SceneFile)>> {
    let oblivion = |scene: Scene| SceneFile::new(header_for(FormatVersion::OBLIVION), scene);
    let morrowind = |scene: Scene| SceneFile::new(header_for(FormatVersion::MORROWIND), scene);
    Ok(vec![
        (SKELETON, oblivion(skeleton()?)),
        (UPPER_BODY, oblivion(upper_body()?)),
        (LOWER_BODY, oblivion(lower_body()?)),
        (HAND, oblivion(hand()?)),
        (FOOT, oblivion(foot()?)),
        (CUIRASS, oblivion(cuirass()?)),
        (BABELFISH, morrowind(babelfish()?)),
        (BODY_MESH, morrowind(body_mesh()?)),
    ])
}

/// Write every fixture into `dir`, replacing existing files
pub fn write_fixtures(dir: &Path) -> Result<Vec<PathBuf>> {
    builtin_fixtures()?
        .into_iter()
        .map(|(name, file)| {
            let path = dir.join(name);
            write_scene(&file, &path)?;
            Ok(path)
        })
        .collect()
}

/// Write the fixtures missing from `dir`. Returns the paths written.
pub fn ensure_fixtures(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::new();
    for (name, file) in builtin_fixtures()? {
        let path = dir.join(name);
        if !path.exists() {
            write_scene(&file, &path)?;
            info!("generated fixture {}", path.display());
            written.push(path);
        }
    }
    Ok(written)
}
