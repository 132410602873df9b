//! # skinrt
//!
//! Skinning round-trip verification for scene-graph assets.
//!
//! This is the umbrella crate that provides convenient access to all skinrt functionality.
//! You can use this crate to get everything in one place, or use individual crates for
//! more granular control over dependencies.
//!
//! ## Features
//!
//! - **Core**: Scene graph, skin bindings, bind transforms and tolerance equality
//! - **Compare**: The skinning comparator and its discrepancy report
//! - **I/O**: Scene documents and the reader registry
//! - **Harness**: Reference import/export pipeline, fixtures and test suites
//!
//! ## Quick Start
//!
//! ```rust
//! use skinrt::prelude::*;
//!
//! let mut scene = Scene::new();
//! let root = scene.add_root(SceneNode::node("Scene Root"));
//! let bone = scene.add_child(root, SceneNode::bone("Bip01", RigidTransform::identity()))?;
//! let mut skin = SkinBinding::new().with_skeleton_root(root);
//! skin.push_bone("Bip01", bone, BoneBindData::identity());
//! scene.add_child(root, SceneNode::geometry("Body", GeometryData::default().with_skin(skin)))?;
//!
//! let copy = scene.clone();
//! let report = compare_skinning_info(scene.first_root().unwrap(), copy.first_root().unwrap());
//! assert!(report.is_empty());
//! # Ok::<(), skinrt::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! - `default`: Enables core, compare, io, and harness
//! - `io`: Scene document reading and writing
//! - `harness`: Reference pipeline and scenario runner (implies `io`)

// Re-export core functionality
pub use skinrt_core::*;

// Re-export sub-crates
pub use skinrt_compare as compare;

#[cfg(feature = "io")]
pub use skinrt_io as io;

#[cfg(feature = "harness")]
pub use skinrt_harness as harness;

/// Convenient imports for common use cases
pub mod prelude {
    pub use skinrt_compare::*;
    pub use skinrt_core::*;

    #[cfg(feature = "io")]
    pub use skinrt_io::{read_scene, write_scene, ReaderRegistry};

    #[cfg(feature = "harness")]
    pub use skinrt_harness::{RunContext, Scenario, SceneSession, Suite};
}
