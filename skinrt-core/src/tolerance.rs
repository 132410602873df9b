//! Tolerance-based numeric equality
//!
//! All comparisons use the same rule: the largest absolute difference
//! between corresponding components must be strictly below the tolerance.
//! Scalars, vectors and matrices are governed by one absolute tolerance;
//! NaN never compares equal.

use log::warn;
use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};

use crate::transform::RigidTransform;

/// Tolerance used when none is given
pub const DEFAULT_TOLERANCE: f32 = 0.01;

/// Maximum permitted absolute deviation between two values still considered equal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance(pub f32);

impl Tolerance {
    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance(DEFAULT_TOLERANCE)
    }
}

impl From<f32> for Tolerance {
    fn from(value: f32) -> Self {
        Tolerance(value)
    }
}

/// `true` iff `|old - new| < tolerance`
pub fn floats_equal(old: f32, new: f32, tolerance: f32) -> bool {
    (old - new).abs() < tolerance
}

/// Largest absolute component difference, or `None` when the lengths differ.
///
/// Two empty sequences have a difference of zero.
pub fn max_abs_difference(old: &[f32], new: &[f32]) -> Option<f32> {
    if old.len() != new.len() {
        return None;
    }
    Some(
        old.iter()
            .zip(new)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0_f32, |acc, d| if d.is_nan() || acc.is_nan() { f32::NAN } else { acc.max(d) }),
    )
}

/// `true` iff the maximum absolute per-component difference is below `tolerance`.
///
/// Vectors of different length are a precondition violation and never equal.
pub fn vectors_equal(old: &[f32], new: &[f32], tolerance: f32) -> bool {
    match max_abs_difference(old, new) {
        Some(diff) => diff < tolerance,
        None => {
            warn!(
                "comparing vectors of different length ({} vs {})",
                old.len(),
                new.len()
            );
            false
        }
    }
}

/// `true` iff the maximum absolute per-element difference over all rows is
/// below `tolerance`. Equivalent to flattening both matrices row by row and
/// calling [`vectors_equal`].
pub fn matrices_equal<R: AsRef<[f32]>>(old: &[R], new: &[R], tolerance: f32) -> bool {
    if old.len() != new.len() {
        warn!(
            "comparing matrices with different row counts ({} vs {})",
            old.len(),
            new.len()
        );
        return false;
    }
    let mut worst = 0.0_f32;
    for (old_row, new_row) in old.iter().zip(new) {
        match max_abs_difference(old_row.as_ref(), new_row.as_ref()) {
            Some(diff) if diff.is_nan() => return false,
            Some(diff) => worst = worst.max(diff),
            None => {
                warn!("comparing matrices with ragged rows");
                return false;
            }
        }
    }
    worst < tolerance
}

/// Row-major flattening used by the matrix comparison
pub fn flatten<R: AsRef<[f32]>>(rows: &[R]) -> Vec<f32> {
    rows.iter().flat_map(|row| row.as_ref().iter().copied()).collect()
}

/// Rows of a 3x3 matrix in the order the asset format stores them
pub fn matrix_rows(matrix: &Matrix3<f32>) -> [[f32; 3]; 3] {
    std::array::from_fn(|r| std::array::from_fn(|c| matrix[(r, c)]))
}

/// Equality under an absolute max-norm tolerance
pub trait ApproxEq {
    fn approx_eq(&self, other: &Self, tolerance: Tolerance) -> bool;
}

impl ApproxEq for f32 {
    fn approx_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        floats_equal(*self, *other, tolerance.value())
    }
}

impl ApproxEq for Vector3<f32> {
    fn approx_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        vectors_equal(self.as_slice(), other.as_slice(), tolerance.value())
    }
}

impl ApproxEq for Matrix3<f32> {
    fn approx_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        matrices_equal(&matrix_rows(self), &matrix_rows(other), tolerance.value())
    }
}

impl ApproxEq for [f32] {
    fn approx_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        vectors_equal(self, other, tolerance.value())
    }
}

impl ApproxEq for RigidTransform {
    fn approx_eq(&self, other: &Self, tolerance: Tolerance) -> bool {
        self.rotation.approx_eq(&other.rotation, tolerance)
            && self.translation.approx_eq(&other.translation, tolerance)
            && self.scale.approx_eq(&other.scale, tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    #[test]
    fn test_threshold_boundary() {
        assert!(!floats_equal(0.0, 0.01, 0.01));
        assert!(floats_equal(0.0, 0.009, 0.01));
        assert!(!vectors_equal(&[0.0, 0.0], &[0.0, 0.01], 0.01));
        assert!(vectors_equal(&[0.0, 0.0], &[0.005, 0.009], 0.01));
    }

    #[test]
    fn test_symmetry_and_reflexivity() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let a: f32 = rng.gen_range(-10.0..10.0);
            let b: f32 = a + rng.gen_range(-0.05..0.05);
            let t: f32 = rng.gen_range(0.001..0.1);
            assert_eq!(floats_equal(a, b, t), floats_equal(b, a, t));
            assert!(floats_equal(a, a, t));

            let va: Vec<f32> = (0..3).map(|_| rng.gen_range(-5.0..5.0)).collect();
            let vb: Vec<f32> = va.iter().map(|x| x + rng.gen_range(-0.05..0.05)).collect();
            assert_eq!(vectors_equal(&va, &vb, t), vectors_equal(&vb, &va, t));
            assert!(vectors_equal(&va, &va, t));
        }
    }

    #[test]
    fn test_matrix_flattening_equivalence() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..200 {
            let rows = rng.gen_range(1..5);
            let cols = rng.gen_range(1..5);
            let m1: Vec<Vec<f32>> = (0..rows)
                .map(|_| (0..cols).map(|_| rng.gen_range(-1.0..1.0)).collect())
                .collect();
            let m2: Vec<Vec<f32>> = m1
                .iter()
                .map(|row| row.iter().map(|x| x + rng.gen_range(-0.02..0.02)).collect())
                .collect();
            let t = 0.01;
            assert_eq!(
                matrices_equal(&m1, &m2, t),
                vectors_equal(&flatten(&m1), &flatten(&m2), t)
            );
        }
    }

    #[test]
    fn test_length_mismatch_is_never_equal() {
        assert!(!vectors_equal(&[1.0, 2.0], &[1.0, 2.0, 3.0], 1.0));
        assert!(!matrices_equal(&[[1.0, 0.0]], &[[1.0, 0.0], [0.0, 1.0]], 1.0));
    }

    #[test]
    fn test_nan_never_equal() {
        assert!(!floats_equal(f32::NAN, f32::NAN, 1.0));
        assert!(!vectors_equal(&[0.0, f32::NAN], &[0.0, 0.0], 1.0));
        assert!(!matrices_equal(&[[f32::NAN]], &[[0.0]], 1.0));
    }

    #[test]
    fn test_approx_eq_on_nalgebra_types() {
        let tol = Tolerance::default();
        let m = Matrix3::identity();
        let mut n = m;
        n[(2, 1)] = 0.02;
        assert!(m.approx_eq(&m, tol));
        assert!(!m.approx_eq(&n, tol));

        let v = Vector3::new(1.0, 2.0, 3.0);
        assert!(v.approx_eq(&(v + Vector3::repeat(0.005)), tol));
        assert!(!v.approx_eq(&(v + Vector3::new(0.0, 0.0, 0.011)), tol));
    }
}
