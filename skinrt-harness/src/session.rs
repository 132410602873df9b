//! Reference import/export pipeline
//!
//! A [`SceneSession`] holds one in-memory scene that files are imported
//! into and exported from, the way an authoring tool holds its open scene.

use std::collections::HashMap;
use std::path::Path;

use log::{debug, info, warn};
use skinrt_core::{
    Error, ExportConfig, ExportPipeline, ImportConfig, NodeId, NodeRef, Result, Scene, SceneFile,
    SkeletonImportMode, Tolerance,
};
use skinrt_io::{header_for, ReaderRegistry};

use crate::passes::apply_export_passes;

/// In-memory session implementing [`ExportPipeline`]
pub struct SceneSession {
    scene: Scene,
    armature: Option<NodeId>,
    registry: ReaderRegistry,
    tolerance: Tolerance,
}

impl SceneSession {
    pub fn new() -> Self {
        Self::with_registry(ReaderRegistry::with_defaults())
    }

    pub fn with_registry(registry: ReaderRegistry) -> Self {
        Self {
            scene: Scene::new(),
            armature: None,
            registry,
            tolerance: Tolerance::default(),
        }
    }

    /// Distance under which vertices count as coincident when smoothing seams
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Root node of the session skeleton, once one has been imported
    pub fn armature(&self) -> Option<NodeRef<'_>> {
        self.armature.and_then(|id| self.scene.get(id))
    }

    /// Merge the node trees of `source` into the armature.
    ///
    /// Each root of `source` maps onto the armature root. Nodes whose name
    /// already exists under the armature are reused; others are created under
    /// their mapped parent. Geometry is attached when `with_geometry` is set,
    /// with its skin rebound to the armature bones. Returns the number of
    /// nodes created.
    fn merge_into_armature(&mut self, source: &Scene, with_geometry: bool) -> Result<usize> {
        let mut map: HashMap<NodeId, NodeId> = HashMap::new();
        let mut geometries = Vec::new();
        let mut created = 0;

        for root in source.root_blocks() {
            if root.geometry().is_some() {
                warn!("root block '{}' is a geometry, not merged", root.name());
                continue;
            }
            let armature = match self.armature {
                Some(id) => id,
                None => {
                    let id = self.scene.add_root(root.node().clone());
                    info!("'{}' becomes the session skeleton", root.name());
                    self.armature = Some(id);
                    created += 1;
                    id
                }
            };
            map.insert(root.id(), armature);

            let mut by_name: HashMap<String, NodeId> = HashMap::new();
            if let Some(armature) = self.scene.get(armature) {
                for node in armature.tree() {
                    by_name.entry(node.name().to_string()).or_insert(node.id());
                }
            }

            for node in root.tree().skip(1) {
                // children of skipped geometry have no mapped parent
                let Some(parent) = node.node().parent.and_then(|p| map.get(&p).copied()) else {
                    continue;
                };
                if node.geometry().is_some() {
                    if with_geometry {
                        geometries.push((node, parent));
                    }
                    continue;
                }
                let target = match by_name.get(node.name()) {
                    Some(&existing) => existing,
                    None => {
                        let id = self.scene.add_child(parent, node.node().clone())?;
                        debug!("created '{}' in the session skeleton", node.name());
                        by_name.insert(node.name().to_string(), id);
                        created += 1;
                        id
                    }
                };
                map.insert(node.id(), target);
            }
        }

        for (node, parent) in geometries {
            let mut copy = node.node().clone();
            if let Some(skin) = copy.geometry_data_mut().and_then(|g| g.skin.as_mut()) {
                skin.remap_nodes(|id| map.get(&id).copied()).ok_or_else(|| {
                    Error::Pipeline(format!(
                        "Geometry '{}' is skinned to a node that was not merged",
                        node.name()
                    ))
                })?;
            }
            self.scene.add_child(parent, copy)?;
            created += 1;
        }
        Ok(created)
    }

    /// Session nodes to export: named nodes, or every root when empty
    fn resolve_selection(&self, selection: &[String]) -> Result<Vec<NodeId>> {
        if selection.is_empty() {
            if self.scene.is_empty() {
                return Err(Error::Pipeline("Nothing to export".to_string()));
            }
            return Ok(self.scene.roots().to_vec());
        }
        selection
            .iter()
            .map(|name| {
                self.scene
                    .find(name)
                    .ok_or_else(|| Error::Pipeline(format!("Nothing named '{}' to export", name)))
            })
            .collect()
    }
}

impl Default for SceneSession {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportPipeline for SceneSession {
    fn import(&mut self, path: &Path, config: &ImportConfig) -> Result<SceneFile> {
        let file = self.registry.read(path, None)?;
        match config.skeleton {
            SkeletonImportMode::Default => {
                self.scene.append(&file.scene)?;
            }
            SkeletonImportMode::RootSkeletonOnly => {
                let created = self.merge_into_armature(&file.scene, false)?;
                debug!("skeleton import created {} nodes", created);
            }
            SkeletonImportMode::FullSkeletonMerge => {
                let created = self.merge_into_armature(&file.scene, true)?;
                debug!("skeleton merge created {} nodes", created);
            }
        }
        info!(
            "imported {} ({:?}), session has {} nodes",
            path.display(),
            config.skeleton,
            self.scene.len()
        );
        Ok(file)
    }

    fn export(
        &mut self,
        path: &Path,
        config: &ExportConfig,
        selection: &[String],
    ) -> Result<SceneFile> {
        let roots = self.resolve_selection(selection)?;
        let mut scene = self.scene.extract(&roots)?;
        apply_export_passes(&mut scene, config, self.tolerance)?;

        let mut header = header_for(config.target.version());
        header.export_info = config.describe();
        let file = SceneFile::new(header, scene);
        self.registry.write(&file, path)?;
        info!(
            "exported {} roots to {} for {}",
            roots.len(),
            path.display(),
            config.target
        );
        Ok(file)
    }
}
