//! Core data structures and traits for skinrt
//!
//! This crate provides the scene-graph types consumed by the skinning
//! comparator (nodes, geometry, skin bindings and bind transforms), the
//! tolerance-based equality helpers, and the traits through which asset
//! readers and import/export pipelines plug in.

pub mod error;
pub mod file;
pub mod pipeline;
pub mod scene;
pub mod skin;
pub mod tolerance;
pub mod transform;
pub mod traits;
pub mod version;

pub use error::*;
pub use file::*;
pub use pipeline::*;
pub use scene::*;
pub use skin::*;
pub use tolerance::*;
pub use transform::*;
pub use traits::*;
pub use version::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix3, Matrix4, Point3, UnitQuaternion, Vector3};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;
