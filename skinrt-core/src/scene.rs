//! Scene-graph tree
//!
//! Nodes are stored in an arena owned by [`Scene`] and addressed by
//! [`NodeId`]. Parent and child links are kept consistent by the mutating
//! methods; [`Scene::validate`] checks them for data that came from a file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::skin::GeometryData;
use crate::transform::RigidTransform;

/// Index of a node inside its [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

/// Type tag of a scene node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeKind {
    Node,
    Bone,
    Geometry(Box<GeometryData>),
}

/// A node of the scene tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub transform: RigidTransform,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
}

impl SceneNode {
    pub fn new<S: Into<String>>(name: S, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: RigidTransform::identity(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// A plain grouping node
    pub fn node<S: Into<String>>(name: S) -> Self {
        Self::new(name, NodeKind::Node)
    }

    pub fn bone<S: Into<String>>(name: S, transform: RigidTransform) -> Self {
        Self::new(name, NodeKind::Bone).with_transform(transform)
    }

    pub fn geometry<S: Into<String>>(name: S, data: GeometryData) -> Self {
        Self::new(name, NodeKind::Geometry(Box::new(data)))
    }

    pub fn with_transform(mut self, transform: RigidTransform) -> Self {
        self.transform = transform;
        self
    }

    pub fn geometry_data(&self) -> Option<&GeometryData> {
        match &self.kind {
            NodeKind::Geometry(data) => Some(data),
            _ => None,
        }
    }

    pub fn geometry_data_mut(&mut self) -> Option<&mut GeometryData> {
        match &mut self.kind {
            NodeKind::Geometry(data) => Some(data),
            _ => None,
        }
    }
}

/// An arena of scene nodes with an ordered list of root blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    roots: Vec<NodeId>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node as a new root block
    pub fn add_root(&mut self, mut node: SceneNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = None;
        node.children.clear();
        self.nodes.push(node);
        self.roots.push(id);
        id
    }

    /// Add a node as the last child of `parent`
    pub fn add_child(&mut self, parent: NodeId, mut node: SceneNode) -> Result<NodeId> {
        if parent.0 >= self.nodes.len() {
            return Err(Error::InvalidData(format!("Parent node {} does not exist", parent.0)));
        }
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.0)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.node(id).map(|_| NodeRef { scene: self, id })
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Root blocks in file order
    pub fn root_blocks(&self) -> impl Iterator<Item = NodeRef<'_>> {
        self.roots.iter().map(move |&id| NodeRef { scene: self, id })
    }

    pub fn first_root(&self) -> Option<NodeRef<'_>> {
        self.root_blocks().next()
    }

    /// Ids of every node in arena order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// First node with the given name, searching each root tree in pre-order
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.root_blocks()
            .flat_map(|root| root.tree())
            .find(|node| node.name() == name)
            .map(|node| node.id())
    }

    /// Transform from the node's space into scene space
    pub fn world_transform(&self, id: NodeId) -> RigidTransform {
        let mut chain = Vec::new();
        let mut current = Some(id);
        while let Some(node) = current.and_then(|id| self.node(id)) {
            chain.push(node.transform);
            current = node.parent;
        }
        chain
            .iter()
            .rev()
            .fold(RigidTransform::identity(), |acc, t| acc.compose(t))
    }

    /// Move `id` under `new_parent`, keeping its local transform
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) -> Result<()> {
        if self.node(id).is_none() || self.node(new_parent).is_none() {
            return Err(Error::InvalidData(format!(
                "Cannot reparent {} under {}: node missing",
                id.0, new_parent.0
            )));
        }
        let mut ancestor = Some(new_parent);
        while let Some(a) = ancestor {
            if a == id {
                return Err(Error::InvalidData(format!(
                    "Cannot reparent {} under its own descendant {}",
                    id.0, new_parent.0
                )));
            }
            ancestor = self.nodes[a.0].parent;
        }

        match self.nodes[id.0].parent {
            Some(old) => self.nodes[old.0].children.retain(|&c| c != id),
            None => self.roots.retain(|&r| r != id),
        }
        self.nodes[id.0].parent = Some(new_parent);
        self.nodes[new_parent.0].children.push(id);
        Ok(())
    }

    /// Copy the subtrees under `roots` into a new scene, one root block each.
    ///
    /// Skin bone references must stay inside the copied subtrees.
    pub fn extract(&self, roots: &[NodeId]) -> Result<Scene> {
        let mut dest = Scene::new();
        let mut map = HashMap::new();
        for &root in roots {
            self.copy_subtree(root, &mut dest, None, &mut map)?;
        }
        dest.remap_skins(&map)?;
        Ok(dest)
    }

    /// Append every root block of `other`, returning the old-to-new id map
    pub fn append(&mut self, other: &Scene) -> Result<HashMap<NodeId, NodeId>> {
        let mut map = HashMap::new();
        let first_new = self.nodes.len();
        for &root in &other.roots {
            other.copy_subtree(root, self, None, &mut map)?;
        }
        self.remap_skins_from(first_new, &map)?;
        Ok(map)
    }

    /// Copy the subtree at `src` into `dest`, under `dest_parent` or as a new root
    pub fn copy_subtree(
        &self,
        src: NodeId,
        dest: &mut Scene,
        dest_parent: Option<NodeId>,
        map: &mut HashMap<NodeId, NodeId>,
    ) -> Result<NodeId> {
        let mut stack = vec![(src, dest_parent)];
        let mut top = None;
        while let Some((id, parent)) = stack.pop() {
            let node = self
                .node(id)
                .ok_or_else(|| Error::InvalidData(format!("Node {} does not exist", id.0)))?;
            let copy = node.clone();
            let new_id = match parent {
                Some(p) => dest.add_child(p, copy)?,
                None => dest.add_root(copy),
            };
            map.insert(id, new_id);
            top.get_or_insert(new_id);
            for &child in node.children.iter().rev() {
                stack.push((child, Some(new_id)));
            }
        }
        top.ok_or_else(|| Error::InvalidData(format!("Node {} does not exist", src.0)))
    }

    fn remap_skins(&mut self, map: &HashMap<NodeId, NodeId>) -> Result<()> {
        self.remap_skins_from(0, map)
    }

    fn remap_skins_from(&mut self, first: usize, map: &HashMap<NodeId, NodeId>) -> Result<()> {
        for node in &mut self.nodes[first..] {
            let name = node.name.clone();
            if let Some(skin) = node.geometry_data_mut().and_then(|g| g.skin.as_mut()) {
                skin.remap_nodes(|id| map.get(&id).copied()).ok_or_else(|| {
                    Error::InvalidData(format!(
                        "Geometry '{}' references a bone outside the copied nodes",
                        name
                    ))
                })?;
            }
        }
        Ok(())
    }

    /// Check link consistency, acyclicity and skin references
    pub fn validate(&self) -> Result<()> {
        let count = self.nodes.len();
        let check = |id: NodeId, what: &str| {
            if id.0 < count {
                Ok(())
            } else {
                Err(Error::InvalidData(format!("{} refers to missing node {}", what, id.0)))
            }
        };

        for &root in &self.roots {
            check(root, "Root list")?;
            if self.nodes[root.0].parent.is_some() {
                return Err(Error::InvalidData(format!(
                    "Root '{}' has a parent",
                    self.nodes[root.0].name
                )));
            }
        }

        for (index, node) in self.nodes.iter().enumerate() {
            let id = NodeId(index);
            match node.parent {
                Some(parent) => {
                    check(parent, &node.name)?;
                    if !self.nodes[parent.0].children.contains(&id) {
                        return Err(Error::InvalidData(format!(
                            "Node '{}' is not listed as a child of its parent",
                            node.name
                        )));
                    }
                }
                None if !self.roots.contains(&id) => {
                    return Err(Error::InvalidData(format!(
                        "Node '{}' is detached from every root",
                        node.name
                    )));
                }
                None => {}
            }
            for &child in &node.children {
                check(child, &node.name)?;
                if self.nodes[child.0].parent != Some(id) {
                    return Err(Error::InvalidData(format!(
                        "Child {} of '{}' points at another parent",
                        child.0, node.name
                    )));
                }
            }
            if let Some(skin) = node.geometry_data().and_then(|g| g.skin.as_ref()) {
                for bone in &skin.bones {
                    check(bone.node, &node.name)?;
                }
                if let Some(root) = skin.skeleton_root {
                    check(root, &node.name)?;
                }
            }
        }

        // every node reachable exactly once from the roots means no cycles
        let visited: usize = self.root_blocks().map(|root| root.tree().count()).sum();
        if visited != count {
            return Err(Error::InvalidData(format!(
                "Scene tree reaches {} of {} nodes",
                visited, count
            )));
        }
        Ok(())
    }
}

/// A borrowed handle to one node of a scene
#[derive(Debug, Clone, Copy)]
pub struct NodeRef<'a> {
    scene: &'a Scene,
    id: NodeId,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn scene(&self) -> &'a Scene {
        self.scene
    }

    pub fn node(&self) -> &'a SceneNode {
        &self.scene.nodes[self.id.0]
    }

    pub fn name(&self) -> &'a str {
        &self.node().name
    }

    pub fn geometry(&self) -> Option<&'a GeometryData> {
        self.node().geometry_data()
    }

    pub fn parent(&self) -> Option<NodeRef<'a>> {
        self.node().parent.and_then(|id| self.scene.get(id))
    }

    pub fn children(&self) -> impl Iterator<Item = NodeRef<'a>> + 'a {
        let scene = self.scene;
        self.node().children.iter().map(move |&id| NodeRef { scene, id })
    }

    /// This node and all its descendants in pre-order
    pub fn tree(&self) -> PreOrder<'a> {
        PreOrder {
            scene: self.scene,
            stack: vec![self.id],
        }
    }

    /// Geometry nodes of this subtree in pre-order
    pub fn geometries(&self) -> impl Iterator<Item = NodeRef<'a>> {
        self.tree().filter(|node| node.geometry().is_some())
    }

    pub fn world_transform(&self) -> RigidTransform {
        self.scene.world_transform(self.id)
    }
}

/// Pre-order traversal of a subtree
pub struct PreOrder<'a> {
    scene: &'a Scene,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = NodeRef<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let node = self.scene.node(id)?;
        self.stack.extend(node.children.iter().rev());
        Some(NodeRef { scene: self.scene, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::skin::{BoneBindData, SkinBinding};
    use crate::Vector3f;
    use approx::assert_relative_eq;

    fn sample_scene() -> Scene {
        let mut scene = Scene::new();
        let root = scene.add_root(SceneNode::node("Scene Root"));
        let up = |z| RigidTransform::from_translation(Vector3f::new(0.0, 0.0, z));
        let pelvis = scene.add_child(root, SceneNode::bone("Bip01", up(1.0))).unwrap();
        let spine = scene
            .add_child(pelvis, SceneNode::bone("Bip01 Spine", up(0.5)))
            .unwrap();
        let mut skin = SkinBinding::new().with_skeleton_root(root);
        skin.push_bone("Bip01", pelvis, BoneBindData::identity());
        skin.push_bone("Bip01 Spine", spine, BoneBindData::identity());
        scene
            .add_child(root, SceneNode::geometry("Body", GeometryData::default().with_skin(skin)))
            .unwrap();
        scene
    }

    #[test]
    fn test_pre_order_traversal() {
        let scene = sample_scene();
        let names: Vec<_> = scene.first_root().unwrap().tree().map(|n| n.name()).collect();
        assert_eq!(names, vec!["Scene Root", "Bip01", "Bip01 Spine", "Body"]);

        let geoms: Vec<_> = scene.first_root().unwrap().geometries().map(|n| n.name()).collect();
        assert_eq!(geoms, vec!["Body"]);
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_world_transform() {
        let scene = sample_scene();
        let spine = scene.find("Bip01 Spine").unwrap();
        assert_relative_eq!(scene.world_transform(spine).translation, Vector3f::new(0.0, 0.0, 1.5));
    }

    #[test]
    fn test_reparent_rejects_cycles() {
        let mut scene = sample_scene();
        let pelvis = scene.find("Bip01").unwrap();
        let spine = scene.find("Bip01 Spine").unwrap();
        assert!(scene.reparent(pelvis, spine).is_err());

        let root = scene.find("Scene Root").unwrap();
        scene.reparent(spine, root).unwrap();
        assert_eq!(scene.get(spine).unwrap().parent().unwrap().name(), "Scene Root");
        assert!(scene.node(pelvis).unwrap().children.is_empty());
        assert!(scene.validate().is_ok());
    }

    #[test]
    fn test_extract_remaps_skin() {
        let scene = sample_scene();
        let root = scene.find("Scene Root").unwrap();
        let copy = scene.extract(&[root]).unwrap();
        assert_eq!(copy.len(), scene.len());
        assert!(copy.validate().is_ok());

        let body = copy.get(copy.find("Body").unwrap()).unwrap();
        let skin = body.geometry().unwrap().skin.as_ref().unwrap();
        assert_eq!(copy.node(skin.bones[1].node).unwrap().name, "Bip01 Spine");

        // the geometry alone leaves its bones behind
        let body_id = scene.find("Body").unwrap();
        assert!(scene.extract(&[body_id]).is_err());
    }

    #[test]
    fn test_append_offsets_ids() {
        let mut scene = sample_scene();
        let other = sample_scene();
        let map = scene.append(&other).unwrap();
        assert_eq!(scene.roots().len(), 2);
        assert_eq!(map[&NodeId(0)], NodeId(4));
        assert!(scene.validate().is_ok());

        let second_root = scene.root_blocks().nth(1).unwrap();
        let body = second_root.geometries().next().unwrap();
        let skin = body.geometry().unwrap().skin.as_ref().unwrap();
        assert!(skin.bones.iter().all(|b| b.node.0 >= 4));
    }

    #[test]
    fn test_validate_detects_bad_links() {
        let mut scene = sample_scene();
        scene.nodes[2].parent = Some(NodeId(0));
        assert!(scene.validate().is_err());

        let mut scene = sample_scene();
        scene.nodes[1].children.push(NodeId(0));
        scene.nodes[0].parent = Some(NodeId(1));
        scene.roots.clear();
        assert!(scene.validate().is_err());
    }
}
