//! Tree ensemble - validated runtime form of the artifact trees
//!
//! Raw output = base_score + sum of leaf values (log-odds for the binary
//! objective). Splits send `value <= threshold` left; missing values follow
//! `default_left`.

use super::artifact::{NodeSpec, TreeSpec};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Split {
    pub feature: usize,
    pub threshold: f64,
    pub default_left: bool,
    pub left: usize,
    pub right: usize,
}

impl Split {
    #[inline]
    pub fn goes_left(&self, value: f64) -> bool {
        if value.is_nan() {
            self.default_left
        } else {
            value <= self.threshold
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Node {
    Split(Split),
    Leaf(f64),
}

#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    covers: Vec<f64>,
}

impl Tree {
    /// Validate an artifact tree against the number of model features
    pub fn from_spec(spec: &TreeSpec, n_features: usize) -> Result<Self, String> {
        if spec.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        let mut nodes = Vec::with_capacity(spec.nodes.len());
        let mut covers = Vec::with_capacity(spec.nodes.len());

        for (idx, node) in spec.nodes.iter().enumerate() {
            match *node {
                NodeSpec::Split { feature, threshold, default_left, left, right, cover } => {
                    if feature >= n_features {
                        return Err(format!("node {}: feature {} out of range", idx, feature));
                    }
                    if threshold.is_nan() {
                        return Err(format!("node {}: threshold is NaN", idx));
                    }
                    for child in [left, right] {
                        if child <= idx || child >= spec.nodes.len() {
                            return Err(format!("node {}: invalid child index {}", idx, child));
                        }
                    }
                    check_cover(idx, cover)?;
                    nodes.push(Node::Split(Split { feature, threshold, default_left, left, right }));
                    covers.push(cover);
                }
                NodeSpec::Leaf { value, cover } => {
                    if !value.is_finite() {
                        return Err(format!("node {}: leaf value is not finite", idx));
                    }
                    check_cover(idx, cover)?;
                    nodes.push(Node::Leaf(value));
                    covers.push(cover);
                }
            }
        }

        Ok(Self { nodes, covers })
    }

    #[inline]
    pub fn node(&self, idx: usize) -> &Node {
        &self.nodes[idx]
    }

    #[inline]
    pub fn cover(&self, idx: usize) -> f64 {
        self.covers[idx]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Leaf value reached by `row`
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(value) => return *value,
                Node::Split(split) => {
                    let value = row.get(split.feature).copied().unwrap_or(f64::NAN);
                    idx = if split.goes_left(value) { split.left } else { split.right };
                }
            }
        }
    }

    /// Cover-weighted mean leaf value (the tree's expected output)
    pub fn expected_value(&self) -> f64 {
        self.node_expectation(0)
    }

    fn node_expectation(&self, idx: usize) -> f64 {
        match &self.nodes[idx] {
            Node::Leaf(value) => *value,
            Node::Split(split) => {
                let left_cover = self.covers[split.left];
                let right_cover = self.covers[split.right];
                (left_cover * self.node_expectation(split.left)
                    + right_cover * self.node_expectation(split.right))
                    / (left_cover + right_cover)
            }
        }
    }
}

fn check_cover(idx: usize, cover: f64) -> Result<(), String> {
    if !cover.is_finite() || cover <= 0.0 {
        return Err(format!("node {}: cover must be positive (got {})", idx, cover));
    }
    Ok(())
}

/// Additive ensemble of regression trees
#[derive(Debug, Clone)]
pub struct Forest {
    base_score: f64,
    trees: Vec<Tree>,
}

impl Forest {
    pub fn from_spec(base_score: f64, specs: &[TreeSpec], n_features: usize) -> Result<Self, String> {
        if !base_score.is_finite() {
            return Err("base_score is not finite".to_string());
        }
        let trees = specs
            .iter()
            .enumerate()
            .map(|(i, spec)| Tree::from_spec(spec, n_features).map_err(|e| format!("tree {}: {}", i, e)))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { base_score, trees })
    }

    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    /// Raw output for one encoded row
    pub fn predict(&self, row: &[f64]) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.predict(row)).sum::<f64>()
    }

    /// Expected raw output under the training distribution (covers)
    pub fn expected_value(&self) -> f64 {
        self.base_score + self.trees.iter().map(Tree::expected_value).sum::<f64>()
    }
}
