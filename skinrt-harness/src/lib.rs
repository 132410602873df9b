//! Round-trip test harness for skinrt
//!
//! This crate provides an in-process reference import/export pipeline, the
//! fixture files it runs on, and the scenario and suite runner that feeds
//! pipeline output to the skinning comparator.

pub mod fixtures;
pub mod passes;
pub mod scenario;
pub mod session;
pub mod suite;

pub use scenario::*;
pub use session::SceneSession;
pub use suite::*;
