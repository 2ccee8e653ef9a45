//! Random forest classifier backed by smartcore.
//!
//! The forest itself is smartcore's; this module maps the pipeline's feature rows
//! and 0/1 targets onto its matrix types and reads the win column of
//! `predict_proba`.

use std::fmt;

use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::error::Failed;
use smartcore::linalg::basic::arrays::Array;
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::PipelineError;
use crate::predictor::BinaryClassifier;

type Forest = RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>;

/// Column of the win class in smartcore's probability matrix (classes are sorted).
const WIN_COLUMN: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestConfig {
    pub n_trees: u16,
    /// A node with fewer samples than this becomes a leaf.
    pub min_samples_split: usize,
    pub max_depth: Option<u16>,
    /// Features tried per split; `None` leaves smartcore's sqrt default.
    pub max_features: Option<usize>,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 50,
            min_samples_split: 10,
            max_depth: None,
            max_features: None,
            seed: 1,
        }
    }
}

impl ForestConfig {
    fn parameters(&self) -> RandomForestClassifierParameters {
        let mut params = RandomForestClassifierParameters::default()
            .with_n_trees(self.n_trees)
            .with_min_samples_split(self.min_samples_split)
            .with_seed(self.seed);
        if let Some(depth) = self.max_depth {
            params = params.with_max_depth(depth);
        }
        if let Some(m) = self.max_features {
            params = params.with_m(m);
        }
        params
    }
}

enum Model {
    Unfitted,
    /// Training labels held a single class; smartcore would emit one column.
    Constant(f64),
    Trained(Box<Forest>),
}

pub struct RandomForest {
    config: ForestConfig,
    model: Model,
}

impl fmt::Debug for RandomForest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &self.model {
            Model::Unfitted => "unfitted".to_string(),
            Model::Constant(p) => format!("constant({p})"),
            Model::Trained(_) => "trained".to_string(),
        };
        f.debug_struct("RandomForest")
            .field("config", &self.config)
            .field("model", &state)
            .finish()
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(ForestConfig::default())
    }
}

impl RandomForest {
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            model: Model::Unfitted,
        }
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn is_fitted(&self) -> bool {
        !matches!(self.model, Model::Unfitted)
    }
}

fn classifier_error(err: Failed) -> PipelineError {
    PipelineError::Classifier(err.to_string())
}

fn dense(rows: &[Vec<f64>]) -> Result<DenseMatrix<f64>, PipelineError> {
    DenseMatrix::from_2d_vec(&rows.to_vec()).map_err(classifier_error)
}

impl BinaryClassifier for RandomForest {
    fn fit(&mut self, features: &[Vec<f64>], labels: &[u8]) -> Result<(), PipelineError> {
        let n = features.len().min(labels.len());
        if n == 0 {
            self.model = Model::Unfitted;
            return Ok(());
        }
        let positives = labels[..n].iter().filter(|&&l| l == 1).count();
        if positives == 0 || positives == n {
            self.model = Model::Constant(positives as f64 / n as f64);
            return Ok(());
        }

        let x = dense(&features[..n])?;
        let y: Vec<i32> = labels[..n].iter().map(|&l| i32::from(l)).collect();
        let forest = RandomForestClassifier::fit(&x, &y, self.config.parameters())
            .map_err(classifier_error)?;
        log::debug!(
            "fitted {} trees on {n} rows ({positives} wins)",
            self.config.n_trees
        );
        self.model = Model::Trained(Box::new(forest));
        Ok(())
    }

    fn predict_proba(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, PipelineError> {
        match &self.model {
            Model::Unfitted => Ok(vec![0.5; features.len()]),
            Model::Constant(p) => Ok(vec![*p; features.len()]),
            Model::Trained(_) if features.is_empty() => Ok(Vec::new()),
            Model::Trained(forest) => {
                let probs = forest
                    .predict_proba(&dense(features)?)
                    .map_err(classifier_error)?;
                Ok((0..features.len())
                    .map(|row| *probs.get((row, WIN_COLUMN)))
                    .collect())
            }
        }
    }
}
