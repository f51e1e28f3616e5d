// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of SolarLens.

//! Isolation forest over a single output column.
//!
//! Anomalies need fewer random splits to isolate, so their average path
//! length through the trees is short and their score close to 1.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{Decision, FitParams, OutlierDetector};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

#[derive(Debug, Clone)]
enum Node {
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
    Leaf {
        size: usize,
    },
}

/// Average path length of an unsuccessful BST search over `n` items
#[expect(
    clippy::cast_precision_loss,
    reason = "sample sizes are far below f64 mantissa precision"
)]
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

#[derive(Debug, Clone)]
struct IsolationTree {
    root: Node,
}

impl IsolationTree {
    fn build(values: &[f64], max_depth: u32, rng: &mut StdRng) -> Self {
        Self {
            root: Self::build_node(values, 0, max_depth, rng),
        }
    }

    fn build_node(values: &[f64], depth: u32, max_depth: u32, rng: &mut StdRng) -> Node {
        if depth >= max_depth || values.len() <= 1 {
            return Node::Leaf { size: values.len() };
        }

        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if max - min <= 0.0 {
            return Node::Leaf { size: values.len() };
        }

        let threshold = rng.gen_range(min..max);
        let (left, right): (Vec<f64>, Vec<f64>) = values.iter().partition(|&&v| v < threshold);
        if left.is_empty() || right.is_empty() {
            return Node::Leaf { size: values.len() };
        }

        Node::Split {
            threshold,
            left: Box::new(Self::build_node(&left, depth + 1, max_depth, rng)),
            right: Box::new(Self::build_node(&right, depth + 1, max_depth, rng)),
        }
    }

    #[expect(
        clippy::cast_precision_loss,
        reason = "tree depth is bounded by log2 of the sample size"
    )]
    fn path_length(&self, value: f64) -> f64 {
        let mut node = &self.root;
        let mut depth = 0_u32;
        loop {
            match node {
                Node::Split {
                    threshold,
                    left,
                    right,
                } => {
                    node = if value < *threshold { left } else { right };
                    depth += 1;
                }
                Node::Leaf { size } => return f64::from(depth) + average_path_length(*size),
            }
        }
    }
}

/// Fitted isolation forest with a contamination-derived decision offset.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<IsolationTree>,
    sample_size: usize,
    /// Scores strictly above this are anomalous
    offset: f64,
    contamination: f64,
}

impl IsolationForest {
    /// Build the ensemble. `outputs` must not be empty.
    ///
    /// Identical data, parameters and `random_seed` always give the same
    /// trees and therefore the same labels.
    #[must_use]
    pub fn fit(outputs: &[f64], params: &FitParams) -> Self {
        let n = outputs.len();
        let sample_size = params.max_samples.min(n).max(1);
        // ceil(log2(sample_size))
        let max_depth = if sample_size <= 1 {
            0
        } else {
            (sample_size - 1).ilog2() + 1
        };

        let mut rng = StdRng::seed_from_u64(params.random_seed);
        let trees = (0..params.n_estimators)
            .map(|_| {
                let sample: Vec<f64> = rand::seq::index::sample(&mut rng, n, sample_size)
                    .into_iter()
                    .map(|i| outputs[i])
                    .collect();
                IsolationTree::build(&sample, max_depth, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            sample_size,
            offset: 0.5,
            contamination: params.contamination,
        };

        let mut scores: Vec<f64> = outputs.iter().map(|&v| forest.anomaly_score(v)).collect();
        scores.sort_by(f64::total_cmp);
        forest.offset = percentile(&scores, 1.0 - params.contamination);
        forest
    }

    /// Anomaly score in `(0, 1]`; higher is more anomalous.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "tree count is far below f64 mantissa precision"
    )]
    pub fn anomaly_score(&self, value: f64) -> f64 {
        let c = average_path_length(self.sample_size);
        if c <= 0.0 || self.trees.is_empty() {
            return 0.5;
        }
        let mean_path = self
            .trees
            .iter()
            .map(|tree| tree.path_length(value))
            .sum::<f64>()
            / self.trees.len() as f64;
        2.0_f64.powf(-mean_path / c)
    }

    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    #[must_use]
    pub fn contamination(&self) -> f64 {
        self.contamination
    }
}

/// Linear-interpolated quantile of an ascending, non-empty slice
#[expect(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "index math on a bounded, non-negative position"
)]
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let Some(&last) = sorted.last() else {
        return 0.0;
    };
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let (Some(&lo), Some(&hi)) = (sorted.get(lower), sorted.get(upper)) else {
        return last;
    };
    lo + (hi - lo) * (pos - pos.floor())
}

impl OutlierDetector for IsolationForest {
    fn decide(&self, output: f64) -> Decision {
        Decision {
            is_anomalous: self.anomaly_score(output) > self.offset,
            score: None,
        }
    }

    fn name(&self) -> &'static str {
        "IsolationForest"
    }
}
