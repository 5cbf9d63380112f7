//! Training progress logging.
//!
//! The logger only decides *whether* something is reported; events go out
//! through `tracing`, so the embedding application picks the subscriber.

use std::time::Instant;

use super::tree::Tree;

/// Verbosity level for training output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Warnings only (unknown parameters, degenerate rounds).
    Warning,
    /// Start/finish summaries and per-round metrics.
    Info,
    /// Per-tree detail.
    Debug,
}

impl Verbosity {
    /// LightGBM-style integer: `<0` silent, `0` warning, `1` info, `>=2` debug.
    pub fn from_leaf_wise(level: i64) -> Self {
        match level {
            i64::MIN..=-1 => Self::Silent,
            0 => Self::Warning,
            1 => Self::Info,
            _ => Self::Debug,
        }
    }

    /// XGBoost-style integer: `0` silent, `1` warning, `2` info, `>=3` debug.
    pub fn from_depth_wise(level: i64) -> Self {
        match level {
            i64::MIN..=0 => Self::Silent,
            1 => Self::Warning,
            2 => Self::Info,
            _ => Self::Debug,
        }
    }
}

/// Verbosity-gated logger for one training run.
#[derive(Debug)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    started: Option<Instant>,
    n_rounds: usize,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            started: None,
            n_rounds: 0,
        }
    }

    #[inline]
    pub fn enabled(&self, level: Verbosity) -> bool {
        self.verbosity != Verbosity::Silent && self.verbosity >= level
    }

    pub fn start_training(&mut self, n_rounds: usize, n_rows: usize, n_features: usize) {
        self.started = Some(Instant::now());
        self.n_rounds = n_rounds;
        if self.enabled(Verbosity::Info) {
            tracing::info!(n_rounds, n_rows, n_features, "starting training");
        }
    }

    /// Report one finished round. `metric` is `(name, value)` when an
    /// evaluation metric is attached.
    pub fn log_round(&self, round: usize, tree: &Tree, metric: Option<(&str, f64)>) {
        let n_leaves = tree.n_leaves();
        if let Some((name, value)) = metric {
            if self.enabled(Verbosity::Info) {
                tracing::info!(round, metric = name, value, "[{}/{}]", round + 1, self.n_rounds);
            }
        }
        if self.enabled(Verbosity::Debug) {
            tracing::debug!(
                round,
                n_leaves,
                split_gain = tree.split_gain(),
                cover = tree.cover(0),
                "tree grown"
            );
        }
        if n_leaves == 1 && self.enabled(Verbosity::Warning) {
            tracing::warn!(round, "no split with positive gain, tree is a single leaf");
        }
    }

    pub fn warn_unknown_param(&self, key: &str) {
        if self.enabled(Verbosity::Warning) {
            tracing::warn!(key, "unknown parameter ignored");
        }
    }

    pub fn finish_training(&self, n_trees: usize) {
        if self.enabled(Verbosity::Info) {
            let elapsed_ms = self
                .started
                .map(|t| t.elapsed().as_millis() as u64)
                .unwrap_or_default();
            tracing::info!(n_trees, elapsed_ms, "training finished");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_wise_levels() {
        assert_eq!(Verbosity::from_leaf_wise(-1), Verbosity::Silent);
        assert_eq!(Verbosity::from_leaf_wise(0), Verbosity::Warning);
        assert_eq!(Verbosity::from_leaf_wise(1), Verbosity::Info);
        assert_eq!(Verbosity::from_leaf_wise(7), Verbosity::Debug);
    }

    #[test]
    fn depth_wise_levels() {
        assert_eq!(Verbosity::from_depth_wise(0), Verbosity::Silent);
        assert_eq!(Verbosity::from_depth_wise(1), Verbosity::Warning);
        assert_eq!(Verbosity::from_depth_wise(2), Verbosity::Info);
        assert_eq!(Verbosity::from_depth_wise(3), Verbosity::Debug);
    }

    #[test]
    fn debug_round_reports_tree_summary() {
        let mut tree = Tree::default();
        let root = tree.push_leaf(0.0, 8.0);
        let left = tree.push_leaf(-0.5, 3.0);
        let right = tree.push_leaf(0.5, 5.0);
        tree.set_split(root, 0, 1.5, left, right, 4.0);

        let mut logger = TrainingLogger::new(Verbosity::Debug);
        logger.start_training(1, 8, 1);
        logger.log_round(0, &tree, Some(("quantile", 0.25)));
        logger.finish_training(1);
        assert_eq!(tree.split_gain(), 4.0);
    }

    #[test]
    fn silent_disables_everything() {
        let logger = TrainingLogger::new(Verbosity::Silent);
        assert!(!logger.enabled(Verbosity::Warning));
        assert!(!logger.enabled(Verbosity::Debug));

        let logger = TrainingLogger::new(Verbosity::Info);
        assert!(logger.enabled(Verbosity::Warning));
        assert!(logger.enabled(Verbosity::Info));
        assert!(!logger.enabled(Verbosity::Debug));
    }
}
