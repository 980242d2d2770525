//! TreeSHAP - exact path-dependent Shapley values for tree ensembles
//!
//! Walks every root-to-leaf path once, tracking for each unique feature on
//! the path the fraction of "zero" (cover-weighted) and "one" (follows the
//! record) paths. Polynomial in depth; attributions sum exactly to
//! `predict(x) - expected_value()`.

use crate::logic::model::forest::{Forest, Node, Tree};
use crate::logic::model::Attribution;

#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: Option<usize>,
    zero: f64,
    one: f64,
    weight: f64,
}

/// Attribute the raw output of `forest` for an encoded row
pub fn tree_shap(forest: &Forest, row: &[f64]) -> Attribution {
    let mut values = vec![0.0; row.len()];
    for tree in forest.trees() {
        recurse(tree, row, &mut values, 0, Vec::new(), 1.0, 1.0, None);
    }

    Attribution {
        base_value: forest.expected_value(),
        output: forest.predict(row),
        values,
    }
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &Tree,
    row: &[f64],
    phi: &mut [f64],
    node: usize,
    mut path: Vec<PathElement>,
    zero: f64,
    one: f64,
    feature: Option<usize>,
) {
    extend(&mut path, zero, one, feature);

    match tree.node(node) {
        Node::Leaf(value) => {
            for i in 1..path.len() {
                let w = unwound_sum(&path, i);
                let el = path[i];
                if let Some(f) = el.feature {
                    phi[f] += w * (el.one - el.zero) * value;
                }
            }
        }
        Node::Split(split) => {
            let x = row.get(split.feature).copied().unwrap_or(f64::NAN);
            let (hot, cold) = if split.goes_left(x) {
                (split.left, split.right)
            } else {
                (split.right, split.left)
            };

            let total = tree.cover(split.left) + tree.cover(split.right);
            let hot_zero = tree.cover(hot) / total;
            let cold_zero = tree.cover(cold) / total;

            // Feature already on the path: undo it and carry its fractions
            let mut incoming_zero = 1.0;
            let mut incoming_one = 1.0;
            if let Some(k) = (1..path.len()).find(|&k| path[k].feature == Some(split.feature)) {
                incoming_zero = path[k].zero;
                incoming_one = path[k].one;
                unwind(&mut path, k);
            }

            recurse(
                tree,
                row,
                phi,
                hot,
                path.clone(),
                hot_zero * incoming_zero,
                incoming_one,
                Some(split.feature),
            );
            recurse(tree, row, phi, cold, path, cold_zero * incoming_zero, 0.0, Some(split.feature));
        }
    }
}

fn extend(path: &mut Vec<PathElement>, zero: f64, one: f64, feature: Option<usize>) {
    let depth = path.len();
    path.push(PathElement {
        feature,
        zero,
        one,
        weight: if depth == 0 { 1.0 } else { 0.0 },
    });

    let d1 = (depth + 1) as f64;
    for i in (0..depth).rev() {
        path[i + 1].weight += one * path[i].weight * (i + 1) as f64 / d1;
        path[i].weight = zero * path[i].weight * (depth - i) as f64 / d1;
    }
}

fn unwind(path: &mut Vec<PathElement>, index: usize) {
    let depth = path.len() - 1;
    let one = path[index].one;
    let zero = path[index].zero;
    let d1 = (depth + 1) as f64;

    let mut next = path[depth].weight;
    for i in (0..depth).rev() {
        if one != 0.0 {
            let tmp = path[i].weight;
            path[i].weight = next * d1 / ((i + 1) as f64 * one);
            next = tmp - path[i].weight * zero * (depth - i) as f64 / d1;
        } else {
            path[i].weight = path[i].weight * d1 / (zero * (depth - i) as f64);
        }
    }

    for i in index..depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero = path[i + 1].zero;
        path[i].one = path[i + 1].one;
    }
    path.pop();
}

/// Total permutation weight of the path with element `index` removed
fn unwound_sum(path: &[PathElement], index: usize) -> f64 {
    let depth = path.len() - 1;
    let one = path[index].one;
    let zero = path[index].zero;
    let d1 = (depth + 1) as f64;

    let mut total = 0.0;
    let mut next = path[depth].weight;
    for i in (0..depth).rev() {
        if one != 0.0 {
            let tmp = next * d1 / ((i + 1) as f64 * one);
            total += tmp;
            next = path[i].weight - tmp * zero * (depth - i) as f64 / d1;
        } else if zero != 0.0 {
            total += path[i].weight / zero / ((depth - i) as f64 / d1);
        }
    }
    total
}
