//! Skin binding data

use serde::{Deserialize, Serialize};

use crate::{Point3f, Vector3f};
use crate::scene::NodeId;
use crate::transform::RigidTransform;

/// Bind-pose offset of a bone relative to the skinned mesh
pub type BoneBindData = RigidTransform;

/// A named reference to a bone node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoneRef {
    pub name: String,
    pub node: NodeId,
}

impl BoneRef {
    pub fn new<S: Into<String>>(name: S, node: NodeId) -> Self {
        Self {
            name: name.into(),
            node,
        }
    }
}

/// A group of bone indices that are submitted together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkinPartition {
    pub bones: Vec<u16>,
}

/// The binding between a geometry and a bone hierarchy.
///
/// `bones` and `bind_data` are parallel sequences: the bind data at index
/// `i` belongs to the bone at index `i`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkinBinding {
    pub bones: Vec<BoneRef>,
    pub bind_data: Vec<BoneBindData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skeleton_root: Option<NodeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitions: Option<Vec<SkinPartition>>,
}

impl SkinBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skeleton_root(mut self, root: NodeId) -> Self {
        self.skeleton_root = Some(root);
        self
    }

    /// Append a bone together with its bind data
    pub fn push_bone<S: Into<String>>(&mut self, name: S, node: NodeId, bind: BoneBindData) {
        self.bones.push(BoneRef::new(name, node));
        self.bind_data.push(bind);
    }

    pub fn bone_count(&self) -> usize {
        self.bones.len()
    }

    /// Whether the bone and bind-data sequences have equal length
    pub fn is_aligned(&self) -> bool {
        self.bones.len() == self.bind_data.len()
    }

    /// Bones paired with their bind data; stops at the shorter sequence
    pub fn iter(&self) -> impl Iterator<Item = (&BoneRef, &BoneBindData)> {
        self.bones.iter().zip(self.bind_data.iter())
    }

    pub fn bone_names(&self) -> impl Iterator<Item = &str> {
        self.bones.iter().map(|b| b.name.as_str())
    }

    /// Index of the first bone with the given name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b.name == name)
    }

    pub fn bind_data_for(&self, name: &str) -> Option<&BoneBindData> {
        self.position(name).and_then(|i| self.bind_data.get(i))
    }

    /// Rewrite every node reference through `map`
    pub fn remap_nodes<F: FnMut(NodeId) -> Option<NodeId>>(&mut self, mut map: F) -> Option<()> {
        for bone in &mut self.bones {
            bone.node = map(bone.node)?;
        }
        if let Some(root) = self.skeleton_root {
            self.skeleton_root = Some(map(root)?);
        }
        Some(())
    }
}

/// Mesh data of a geometry node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeometryData {
    #[serde(default)]
    pub vertices: Vec<Point3f>,
    #[serde(default)]
    pub normals: Vec<Vector3f>,
    #[serde(default)]
    pub triangles: Vec<[u16; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strips: Option<Vec<Vec<u16>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skin: Option<SkinBinding>,
}

impl GeometryData {
    pub fn new(vertices: Vec<Point3f>, triangles: Vec<[u16; 3]>) -> Self {
        Self {
            vertices,
            triangles,
            ..Self::default()
        }
    }

    pub fn with_normals(mut self, normals: Vec<Vector3f>) -> Self {
        self.normals = normals;
        self
    }

    pub fn with_skin(mut self, skin: SkinBinding) -> Self {
        self.skin = Some(skin);
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_skinned(&self) -> bool {
        self.skin.is_some()
    }
}
