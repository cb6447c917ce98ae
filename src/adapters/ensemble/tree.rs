//! Flat-array decision trees (scikit-learn `tree_` layout).

use serde::{Deserialize, Serialize};

/// Marker for "no child" in `children_left` / `children_right`.
pub const TREE_LEAF: i64 = -1;

/// What a leaf's `value` row holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeafKind {
    /// Class weights or counts (forest members), normalized at evaluation
    Distribution(usize),
    /// Single regression output (boosting members)
    Scalar,
}

/// A binary decision tree stored as parallel arrays.
///
/// Node `i` is a leaf when `children_left[i] == -1`; otherwise samples with
/// `x[feature[i]] <= threshold[i]` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    pub value: Vec<Vec<f64>>,
}

impl Tree {
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.children_left.len()
    }

    /// Check structure against the row width and expected leaf shape.
    ///
    /// Children must have a larger index than their parent, which rules out
    /// cycles and guarantees every walk terminates.
    ///
    /// # Errors
    /// Returns a description of the first structural problem found.
    pub fn validate(&self, n_features: usize, leaf: LeafKind) -> Result<(), String> {
        let n = self.node_count();
        if n == 0 {
            return Err("tree has no nodes".into());
        }
        if self.children_right.len() != n
            || self.feature.len() != n
            || self.threshold.len() != n
            || self.value.len() != n
        {
            return Err(format!(
                "tree arrays have inconsistent lengths (children_left={n}, children_right={}, feature={}, threshold={}, value={})",
                self.children_right.len(),
                self.feature.len(),
                self.threshold.len(),
                self.value.len()
            ));
        }

        for i in 0..n {
            let left = self.children_left[i];
            let right = self.children_right[i];

            if left == TREE_LEAF {
                if right != TREE_LEAF {
                    return Err(format!("node {i}: leaf has a right child"));
                }
                let v = &self.value[i];
                match leaf {
                    LeafKind::Distribution(k) => {
                        if v.len() != k {
                            return Err(format!(
                                "node {i}: leaf has {} class weights, expected {k}",
                                v.len()
                            ));
                        }
                        if v.iter().any(|w| !w.is_finite() || *w < 0.0) {
                            return Err(format!("node {i}: negative or non-finite class weight"));
                        }
                        if v.iter().sum::<f64>() <= 0.0 {
                            return Err(format!("node {i}: class weights sum to zero"));
                        }
                    }
                    LeafKind::Scalar => {
                        if v.len() != 1 || !v[0].is_finite() {
                            return Err(format!("node {i}: boosting leaf must hold one finite value"));
                        }
                    }
                }
                continue;
            }

            for child in [left, right] {
                let in_range = usize::try_from(child).map(|c| c > i && c < n).unwrap_or(false);
                if !in_range {
                    return Err(format!("node {i}: child index {child} out of range"));
                }
            }

            let f = self.feature[i];
            if usize::try_from(f).map(|f| f >= n_features).unwrap_or(true) {
                return Err(format!(
                    "node {i}: feature index {f} out of range (row has {n_features} columns)"
                ));
            }
            if !self.threshold[i].is_finite() {
                return Err(format!("node {i}: non-finite threshold"));
            }
        }

        Ok(())
    }

    /// Walk to the leaf for `x` and return its value row.
    ///
    /// # Errors
    /// Returns an error on malformed structure (only possible for trees that
    /// skipped [`Tree::validate`]).
    pub fn leaf_value(&self, x: &[f64]) -> Result<&[f64], String> {
        let n = self.node_count();
        let mut node = 0usize;

        for _ in 0..=n {
            let left = *self
                .children_left
                .get(node)
                .ok_or_else(|| format!("node {node} out of range"))?;
            if left == TREE_LEAF {
                return self
                    .value
                    .get(node)
                    .map(Vec::as_slice)
                    .ok_or_else(|| format!("node {node} has no value"));
            }

            let f = usize::try_from(self.feature[node])
                .map_err(|_| format!("node {node}: invalid feature index"))?;
            let v = *x
                .get(f)
                .ok_or_else(|| format!("feature {f} missing from row"))?;

            let next = if v <= self.threshold[node] {
                left
            } else {
                self.children_right[node]
            };
            node = usize::try_from(next).map_err(|_| format!("node {node}: invalid child"))?;
        }

        Err("tree walk did not terminate".into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// x[0] <= 0.5 → [1, 0]; else x[1] <= 1.5 → [1, 1]; else [0, 2]
    fn sample_tree() -> Tree {
        Tree {
            children_left: vec![1, -1, 3, -1, -1],
            children_right: vec![2, -1, 4, -1, -1],
            feature: vec![0, -2, 1, -2, -2],
            threshold: vec![0.5, -2.0, 1.5, -2.0, -2.0],
            value: vec![vec![], vec![1.0, 0.0], vec![], vec![1.0, 1.0], vec![0.0, 2.0]],
        }
    }

    #[test]
    fn test_walk() {
        let tree = sample_tree();
        tree.validate(2, LeafKind::Distribution(2)).expect("valid");

        assert_eq!(tree.leaf_value(&[0.0, 9.0]).expect("walk"), &[1.0, 0.0]);
        assert_eq!(tree.leaf_value(&[0.5, 9.0]).expect("walk"), &[1.0, 0.0]);
        assert_eq!(tree.leaf_value(&[1.0, 1.5]).expect("walk"), &[1.0, 1.0]);
        assert_eq!(tree.leaf_value(&[1.0, 2.0]).expect("walk"), &[0.0, 2.0]);
    }

    #[test]
    fn test_rejects_wrong_leaf_width() {
        let err = sample_tree()
            .validate(2, LeafKind::Distribution(3))
            .expect_err("width mismatch");
        assert!(err.contains("expected 3"));
    }

    #[test]
    fn test_rejects_feature_out_of_range() {
        let err = sample_tree()
            .validate(1, LeafKind::Distribution(2))
            .expect_err("feature 1 does not exist");
        assert!(err.contains("feature index 1"));
    }

    #[test]
    fn test_rejects_backward_child() {
        let mut tree = sample_tree();
        tree.children_left[2] = 0;
        let err = tree
            .validate(2, LeafKind::Distribution(2))
            .expect_err("cycle");
        assert!(err.contains("out of range"));
    }

    #[test]
    fn test_rejects_inconsistent_lengths() {
        let mut tree = sample_tree();
        tree.threshold.pop();
        assert!(tree.validate(2, LeafKind::Distribution(2)).is_err());
    }

    #[test]
    fn test_scalar_leaves() {
        let tree = Tree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![0.0, -2.0, -2.0],
            value: vec![vec![0.0], vec![-0.5], vec![0.5]],
        };
        tree.validate(1, LeafKind::Scalar).expect("valid");
        assert_eq!(tree.leaf_value(&[1.0]).expect("walk"), &[0.5]);
        assert!(tree.validate(1, LeafKind::Distribution(2)).is_err());
    }

    #[test]
    fn test_unvalidated_cycle_does_not_hang() {
        let tree = Tree {
            children_left: vec![0],
            children_right: vec![0],
            feature: vec![0],
            threshold: vec![1.0],
            value: vec![vec![]],
        };
        assert!(tree.leaf_value(&[0.0]).is_err());
    }
}
