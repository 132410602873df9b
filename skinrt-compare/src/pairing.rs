//! Geometry pairing between two trees

use std::collections::HashSet;

use itertools::Itertools;
use skinrt_core::NodeRef;

use crate::options::GeometryPairing;

/// Geometry nodes of the old and new tree, paired up
#[derive(Debug, Clone, Default)]
pub struct GeometryPairs<'a> {
    pub pairs: Vec<(NodeRef<'a>, NodeRef<'a>)>,
    pub unmatched_old: Vec<NodeRef<'a>>,
    pub unmatched_new: Vec<NodeRef<'a>>,
}

/// Pair old geometries with new geometries using the given strategy
pub fn pair_geometries<'a>(
    old: &[NodeRef<'a>],
    new: &[NodeRef<'a>],
    strategy: GeometryPairing,
) -> GeometryPairs<'a> {
    match strategy {
        GeometryPairing::ByName => pair_by_name(old, new),
        GeometryPairing::ByOrder => GeometryPairs {
            pairs: old.iter().copied().zip(new.iter().copied()).collect(),
            unmatched_old: old.iter().skip(new.len()).copied().collect(),
            unmatched_new: new.iter().skip(old.len()).copied().collect(),
        },
        GeometryPairing::CrossProduct => GeometryPairs {
            pairs: old
                .iter()
                .copied()
                .cartesian_product(new.iter().copied())
                .collect(),
            ..GeometryPairs::default()
        },
    }
}

fn pair_by_name<'a>(old: &[NodeRef<'a>], new: &[NodeRef<'a>]) -> GeometryPairs<'a> {
    let mut by_name = new
        .iter()
        .copied()
        .into_group_map_by(|node| node.name())
        .into_iter()
        .map(|(name, nodes)| (name, nodes.into_iter()))
        .collect::<std::collections::HashMap<_, _>>();

    let mut result = GeometryPairs::default();
    let mut used = HashSet::new();
    for &old_node in old {
        match by_name.get_mut(old_node.name()).and_then(|nodes| nodes.next()) {
            Some(new_node) => {
                used.insert(new_node.id());
                result.pairs.push((old_node, new_node));
            }
            None => result.unmatched_old.push(old_node),
        }
    }
    result.unmatched_new = new
        .iter()
        .copied()
        .filter(|node| !used.contains(&node.id()))
        .collect();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use skinrt_core::{GeometryData, Scene, SceneNode};

    fn scene(names: &[&str]) -> Scene {
        let mut scene = Scene::new();
        let root = scene.add_root(SceneNode::node("Scene Root"));
        for name in names {
            scene
                .add_child(root, SceneNode::geometry(*name, GeometryData::default()))
                .unwrap();
        }
        scene
    }

    fn names<'a>(pairs: &[(NodeRef<'a>, NodeRef<'a>)]) -> Vec<(&'a str, &'a str)> {
        pairs.iter().map(|(a, b)| (a.name(), b.name())).collect()
    }

    #[test]
    fn test_pair_by_name_handles_repeats() {
        let old = scene(&["Body", "Hand", "Hand"]);
        let new = scene(&["Hand", "Foot", "Body"]);
        let old_geoms: Vec<_> = old.first_root().unwrap().geometries().collect();
        let new_geoms: Vec<_> = new.first_root().unwrap().geometries().collect();

        let pairs = pair_geometries(&old_geoms, &new_geoms, GeometryPairing::ByName);
        assert_eq!(names(&pairs.pairs), vec![("Body", "Body"), ("Hand", "Hand")]);
        assert_eq!(pairs.unmatched_old.len(), 1);
        assert_eq!(pairs.unmatched_new.iter().map(|n| n.name()).collect::<Vec<_>>(), vec!["Foot"]);
    }

    #[test]
    fn test_pair_by_order_and_cross_product() {
        let old = scene(&["A", "B"]);
        let new = scene(&["X", "Y", "Z"]);
        let old_geoms: Vec<_> = old.first_root().unwrap().geometries().collect();
        let new_geoms: Vec<_> = new.first_root().unwrap().geometries().collect();

        let by_order = pair_geometries(&old_geoms, &new_geoms, GeometryPairing::ByOrder);
        assert_eq!(names(&by_order.pairs), vec![("A", "X"), ("B", "Y")]);
        assert_eq!(by_order.unmatched_new.len(), 1);

        let cross = pair_geometries(&old_geoms, &new_geoms, GeometryPairing::CrossProduct);
        assert_eq!(cross.pairs.len(), 6);
        assert!(cross.unmatched_old.is_empty());
    }
}
