//! # skinrt Compare
//!
//! Decides whether the skin bindings of two scene trees are the same under
//! an absolute floating-point tolerance.
//!
//! Geometry nodes of the two trees are paired, bones inside each pair are
//! matched by name, and the bind transform of every matched bone is compared
//! component by component. Every difference found, numeric or structural,
//! ends up in a [`DiscrepancyReport`]; nothing aborts the walk.

pub mod comparator;
pub mod matching;
pub mod options;
pub mod pairing;
pub mod report;

// Re-export commonly used items
pub use comparator::*;
pub use matching::*;
pub use options::*;
pub use pairing::*;
pub use report::*;
