//! Export passes
//!
//! Transformations applied to the selected part of a session before it is
//! written. None of them touch skin bind data: flattening moves bones but
//! keeps their world transforms, the other passes only rewrite mesh data.

use std::collections::HashMap;

use itertools::Itertools;
use log::{debug, warn};
use skinrt_core::{
    Error, ExportConfig, NodeId, Point3f, Result, RigidTransform, Scene, SkinPartition, Tolerance,
    Vector3f,
};

/// Run every pass enabled in `config`, in a fixed order
pub fn apply_export_passes(
    scene: &mut Scene,
    config: &ExportConfig,
    tolerance: Tolerance,
) -> Result<()> {
    if config.flatten_skin {
        let moved = flatten_skin(scene)?;
        debug!("flatten skin: moved {} bones", moved);
    }
    if config.smooth_seams {
        let smoothed = smooth_seams(scene, tolerance);
        debug!("smooth seams: {} vertices", smoothed);
    }
    if config.stripify {
        let strips = stripify(scene);
        debug!("stripify: {} strips", strips);
    }
    if config.skin_partition {
        let partitions = partition_skins(scene, config.max_bones_per_partition)?;
        debug!("skin partition: {} partitions", partitions);
    }
    Ok(())
}

fn skinned_geometries(scene: &Scene) -> Vec<NodeId> {
    scene
        .node_ids()
        .filter(|&id| {
            scene
                .node(id)
                .and_then(|n| n.geometry_data())
                .map_or(false, |g| g.is_skinned())
        })
        .collect()
}

fn tree_root(scene: &Scene, mut id: NodeId) -> NodeId {
    while let Some(parent) = scene.node(id).and_then(|n| n.parent) {
        id = parent;
    }
    id
}

/// Reparent every skin bone directly under its skeleton root.
///
/// The local transform of a moved bone becomes its transform relative to
/// the skeleton root, so world transforms are unchanged. Returns the number
/// of bones moved.
pub fn flatten_skin(scene: &mut Scene) -> Result<usize> {
    let mut moves: Vec<(NodeId, NodeId, RigidTransform)> = Vec::new();

    for geometry in skinned_geometries(scene) {
        let Some(node) = scene.get(geometry) else { continue };
        let Some(skin) = node.geometry().and_then(|g| g.skin.as_ref()) else { continue };
        let root = skin.skeleton_root.unwrap_or_else(|| tree_root(scene, geometry));
        let root_inverse = scene.world_transform(root).inverse().ok_or_else(|| {
            Error::Pipeline(format!("Skeleton root of '{}' has zero scale", node.name()))
        })?;

        for bone in &skin.bones {
            let parent = scene.node(bone.node).and_then(|n| n.parent);
            let queued = moves.iter().any(|(id, _, _)| *id == bone.node);
            if bone.node == root || parent == Some(root) || queued {
                continue;
            }
            let local = root_inverse.compose(&scene.world_transform(bone.node));
            moves.push((bone.node, root, local));
        }
    }

    let moved = moves.len();
    for (bone, root, local) in moves {
        scene.reparent(bone, root)?;
        if let Some(node) = scene.node_mut(bone) {
            node.transform = local;
        }
    }
    Ok(moved)
}

struct SeamSample {
    geometry: NodeId,
    vertex: usize,
    position: Point3f,
    normal: Vector3f,
}

/// Average the normals of coincident vertices that belong to different
/// geometries. Positions are compared in scene space with the max-norm.
///
/// Returns the number of vertices whose normal was rewritten.
pub fn smooth_seams(scene: &mut Scene, tolerance: Tolerance) -> usize {
    let mut samples = Vec::new();
    let mut inverses = HashMap::new();

    for id in scene.node_ids() {
        let Some(data) = scene.node(id).and_then(|n| n.geometry_data()) else { continue };
        if data.normals.len() != data.vertex_count() {
            if !data.normals.is_empty() {
                warn!(
                    "geometry '{}' has {} normals for {} vertices, skipping seam smoothing",
                    scene.node(id).map_or("", |n| n.name.as_str()),
                    data.normals.len(),
                    data.vertex_count()
                );
            }
            continue;
        }
        let world = scene.world_transform(id);
        let Some(inverse) = world.inverse() else { continue };
        inverses.insert(id, inverse);
        for (vertex, (position, normal)) in data.vertices.iter().zip(&data.normals).enumerate() {
            samples.push(SeamSample {
                geometry: id,
                vertex,
                position: world.transform_point(position),
                normal: world.transform_vector(normal),
            });
        }
    }

    let mut grouped = vec![false; samples.len()];
    let mut updates: Vec<(NodeId, usize, Vector3f)> = Vec::new();
    for i in 0..samples.len() {
        if grouped[i] {
            continue;
        }
        let members: Vec<usize> = (i..samples.len())
            .filter(|&j| {
                !grouped[j]
                    && (samples[j].position - samples[i].position).amax() < tolerance.value()
            })
            .collect();
        for &j in &members {
            grouped[j] = true;
        }
        if members.iter().map(|&j| samples[j].geometry).all_equal() {
            continue;
        }

        let sum: Vector3f = members.iter().map(|&j| samples[j].normal).sum();
        let Some(average) = sum.try_normalize(f32::EPSILON) else { continue };
        for &j in &members {
            let sample = &samples[j];
            let local = inverses[&sample.geometry].transform_vector(&average);
            let local = local.try_normalize(f32::EPSILON).unwrap_or(average);
            updates.push((sample.geometry, sample.vertex, local));
        }
    }

    let smoothed = updates.len();
    for (geometry, vertex, normal) in updates {
        if let Some(data) = scene.node_mut(geometry).and_then(|n| n.geometry_data_mut()) {
            data.normals[vertex] = normal;
        }
    }
    smoothed
}

/// Replace the triangle list of every geometry by triangle strips.
/// Returns the number of strips built.
pub fn stripify(scene: &mut Scene) -> usize {
    let ids: Vec<_> = scene.node_ids().collect();
    let mut count = 0;
    for id in ids {
        let Some(data) = scene.node_mut(id).and_then(|n| n.geometry_data_mut()) else { continue };
        if data.triangles.is_empty() {
            continue;
        }
        let strips = build_strips(&data.triangles);
        count += strips.len();
        data.strips = Some(strips);
        data.triangles.clear();
    }
    count
}

fn third_vertex(triangle: [u16; 3], x: u16, y: u16) -> Option<u16> {
    (0..3)
        .find(|&i| triangle[i] == x && triangle[(i + 1) % 3] == y)
        .map(|i| triangle[(i + 2) % 3])
}

fn is_degenerate(t: [u16; 3]) -> bool {
    t[0] == t[1] || t[1] == t[2] || t[0] == t[2]
}

/// Greedy strip builder.
///
/// A strip grows while some unused triangle shares its last edge with the
/// winding the next strip position requires. Degenerate triangles are
/// dropped.
pub fn build_strips(triangles: &[[u16; 3]]) -> Vec<Vec<u16>> {
    let mut edges: HashMap<(u16, u16), Vec<usize>> = HashMap::new();
    for (index, &[a, b, c]) in triangles.iter().enumerate() {
        for edge in [(a, b), (b, c), (c, a)] {
            edges.entry(edge).or_default().push(index);
        }
    }

    let mut used: Vec<bool> = triangles.iter().map(|&t| is_degenerate(t)).collect();
    let mut strips = Vec::new();
    for start in 0..triangles.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut strip = triangles[start].to_vec();
        loop {
            let n = strip.len();
            // odd positions flip winding
            let (x, y) = if n % 2 == 0 {
                (strip[n - 2], strip[n - 1])
            } else {
                (strip[n - 1], strip[n - 2])
            };
            let next = edges
                .get(&(x, y))
                .and_then(|candidates| candidates.iter().copied().find(|&t| !used[t]));
            let Some(t) = next else { break };
            let Some(v) = third_vertex(triangles[t], x, y) else { break };
            used[t] = true;
            strip.push(v);
        }
        strips.push(strip);
    }
    strips
}

/// Triangles encoded by a strip, in strip order and original winding
pub fn strip_triangles(strip: &[u16]) -> Vec<[u16; 3]> {
    strip
        .windows(3)
        .enumerate()
        .filter_map(|(k, w)| {
            let triangle = if k % 2 == 0 { [w[0], w[1], w[2]] } else { [w[1], w[0], w[2]] };
            (!is_degenerate(triangle)).then_some(triangle)
        })
        .collect()
}

/// Group the bones of every skin into partitions of at most `max_bones`.
/// Returns the number of partitions created.
pub fn partition_skins(scene: &mut Scene, max_bones: usize) -> Result<usize> {
    if max_bones == 0 {
        return Err(Error::Pipeline(
            "Skin partitions need room for at least one bone".to_string(),
        ));
    }
    let mut count = 0;
    for id in skinned_geometries(scene) {
        let Some(skin) = scene
            .node_mut(id)
            .and_then(|n| n.geometry_data_mut())
            .and_then(|g| g.skin.as_mut())
        else {
            continue;
        };
        let indices = (0..skin.bones.len())
            .map(|i| {
                u16::try_from(i).map_err(|_| {
                    Error::Pipeline(format!("Bone index {} does not fit a partition", i))
                })
            })
            .collect::<Result<Vec<u16>>>()?;
        let partitions: Vec<SkinPartition> = indices
            .chunks(max_bones)
            .map(|chunk| SkinPartition { bones: chunk.to_vec() })
            .collect();
        count += partitions.len();
        skin.partitions = Some(partitions);
    }
    Ok(count)
}
