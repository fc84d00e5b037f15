//! Risk engine: owns the current model and exposes train / predict

use super::artifact::{ModelStore, TrainedModel};
use super::explain::{top_reasons, FeatureImportance};
use super::risk::RiskResult;
use crate::config::EngineConfig;
use crate::data::StudentRecord;
use crate::error::{Error, Result};
use crate::features::FeatureBuilder;
use crate::models::{ClassificationReport, RandomForest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, info, warn};

/// Diagnostics from one training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub n_records: usize,
    pub n_train: usize,
    pub n_test: usize,
    /// (stayed, dropped out) counts in the whole batch
    pub class_counts: (usize, usize),
    /// Held-out metrics; `None` when the evaluation partition is empty
    pub evaluation: Option<ClassificationReport>,
    pub trained_at: DateTime<Utc>,
    pub artifact_path: PathBuf,
}

/// Summary of the model currently in use
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub trained_at: DateTime<Utc>,
    pub n_trees: usize,
    pub feature_names: Vec<String>,
}

/// Dropout risk engine.
///
/// Holds at most one trained model. `train` replaces it wholesale; `predict`
/// and `feature_importance` load the persisted artifact on first use when no
/// model is in memory. Scoring holds its own handle to the model, so a
/// concurrent retrain never changes a prediction that is already running.
pub struct RiskEngine {
    config: EngineConfig,
    store: ModelStore,
    current: RwLock<Option<Arc<TrainedModel>>>,
}

impl RiskEngine {
    /// Create an untrained engine
    pub fn new(config: EngineConfig) -> Self {
        let store = ModelStore::new(config.model_dir.clone());
        Self {
            config,
            store,
            current: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &ModelStore {
        &self.store
    }

    /// Path of this engine's artifact
    pub fn artifact_path(&self) -> PathBuf {
        self.store.path_for(&self.config.model_name)
    }

    /// Whether a model is held in memory
    pub fn is_trained(&self) -> bool {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Train on a labelled batch, persist the result and make it current
    pub fn train(&self, batch: &[StudentRecord]) -> Result<TrainingReport> {
        info!("Starting model training on {} records", batch.len());

        let mut builder = FeatureBuilder::new();
        let processed = builder.preprocess(batch, true)?;
        let dataset = processed.into_dataset()?;

        let class_counts = dataset.class_counts();
        match class_counts {
            (0, _) => return Err(Error::InsufficientLabelDiversity(1)),
            (_, 0) => return Err(Error::InsufficientLabelDiversity(0)),
            (stayed, dropped) => debug!("Label balance: {} stayed, {} dropped out", stayed, dropped),
        }

        let split = dataset.random_split(self.config.test_ratio, self.config.split_seed);
        info!(
            "Train set: {} samples, evaluation set: {} samples",
            split.train.n_samples(),
            split.test.n_samples()
        );

        let start_time = std::time::Instant::now();
        let mut forest = RandomForest::new(self.config.forest.clone());
        forest.fit(&split.train);
        info!(
            "Fitted {} trees in {:.2}s",
            forest.n_trees(),
            start_time.elapsed().as_secs_f64()
        );

        let evaluation = if split.test.is_empty() {
            warn!("Evaluation set is empty; skipping held-out metrics");
            None
        } else {
            let predictions = forest.predict(&split.test);
            let report = ClassificationReport::from_predictions(&split.test.labels, &predictions);
            info!("Classification report:\n{}", report);
            Some(report)
        };

        let scaler = builder.into_scaler().ok_or_else(|| {
            Error::ModelNotTrained("standardization statistics have not been fit".to_string())
        })?;
        let trained_at = Utc::now();
        let model = TrainedModel::new(forest, scaler, trained_at);

        let artifact_path = self.store.save(&self.config.model_name, &model)?;
        self.replace(model);

        Ok(TrainingReport {
            n_records: batch.len(),
            n_train: split.train.n_samples(),
            n_test: split.test.n_samples(),
            class_counts,
            evaluation,
            trained_at,
            artifact_path,
        })
    }

    /// Score and explain one student
    pub fn predict(&self, record: &StudentRecord) -> Result<RiskResult> {
        let model = self.current_model()?;
        let score = model
            .score(std::slice::from_ref(record))?
            .into_iter()
            .next()
            .ok_or(Error::EmptyBatch)?;

        let importance = model.feature_importance();
        Ok(RiskResult::new(score, top_reasons(record, &importance)))
    }

    /// Score a batch; missing values are imputed with medians of this batch.
    ///
    /// Labels are ignored, but a batch where only some records carry
    /// `dropout` is rejected with `Schema("dropout")`.
    pub fn predict_batch(&self, records: &[StudentRecord]) -> Result<Vec<RiskResult>> {
        let model = self.current_model()?;
        let scores = model.score(records)?;
        let importance = model.feature_importance();

        Ok(records
            .iter()
            .zip(scores)
            .map(|(record, score)| RiskResult::new(score, top_reasons(record, &importance)))
            .collect())
    }

    /// Global per-feature importance of the current model
    pub fn feature_importance(&self) -> Result<FeatureImportance> {
        Ok(self.current_model()?.feature_importance())
    }

    /// Summary of the current model
    pub fn model_info(&self) -> Result<ModelInfo> {
        let model = self.current_model()?;
        Ok(ModelInfo {
            model_name: self.config.model_name.clone(),
            trained_at: model.trained_at(),
            n_trees: model.forest().n_trees(),
            feature_names: model.feature_names().to_vec(),
        })
    }

    /// Load the persisted artifact into memory. Returns false when none exists.
    pub fn load(&self) -> Result<bool> {
        match self.store.load(&self.config.model_name)? {
            Some(model) => {
                self.replace(model);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn replace(&self, model: TrainedModel) {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *current = Some(Arc::new(model));
    }

    /// Current model, loading the artifact when nothing is in memory
    fn current_model(&self) -> Result<Arc<TrainedModel>> {
        if let Some(model) = self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return Ok(Arc::clone(model));
        }

        let loaded = self.store.load(&self.config.model_name)?.ok_or_else(|| {
            Error::ModelNotTrained(format!(
                "no model in memory and no artifact at {:?}",
                self.artifact_path()
            ))
        })?;

        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have trained or loaded meanwhile
        let model = current.get_or_insert_with(|| Arc::new(loaded));
        Ok(Arc::clone(model))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::generate_sample_data;
    use crate::engine::RiskLevel;
    use crate::models::ForestConfig;
    use tempfile::tempdir;

    fn test_config(dir: &std::path::Path) -> EngineConfig {
        EngineConfig {
            forest: ForestConfig {
                n_trees: 20,
                ..Default::default()
            },
            ..EngineConfig::default().with_model_dir(dir)
        }
    }

    #[test]
    fn test_untrained_predict_fails() {
        let dir = tempdir().unwrap();
        let engine = RiskEngine::new(test_config(dir.path()));
        let record = StudentRecord::new(80.0, 7.0, 0.0, 9.0, 0.1);

        assert!(!engine.is_trained());
        assert!(matches!(engine.predict(&record), Err(Error::ModelNotTrained(_))));
        assert!(matches!(engine.feature_importance(), Err(Error::ModelNotTrained(_))));
        assert!(!engine.load().unwrap());
    }

    #[test]
    fn test_single_class_batch_rejected() {
        let dir = tempdir().unwrap();
        let engine = RiskEngine::new(test_config(dir.path()));
        let batch: Vec<StudentRecord> = (0..10)
            .map(|i| StudentRecord::new(70.0 + i as f64, 6.0, 1.0, 8.0, 0.2).with_dropout(0))
            .collect();

        assert!(matches!(
            engine.train(&batch),
            Err(Error::InsufficientLabelDiversity(0))
        ));
        assert!(!engine.is_trained());
        assert!(!engine.store().exists("dropout_model"));
    }

    #[test]
    fn test_unlabelled_batch_rejected() {
        let dir = tempdir().unwrap();
        let engine = RiskEngine::new(test_config(dir.path()));
        let batch = vec![
            StudentRecord::new(70.0, 6.0, 1.0, 8.0, 0.2),
            StudentRecord::new(50.0, 3.0, 4.0, 2.0, 0.7),
        ];

        assert!(matches!(engine.train(&batch), Err(Error::Schema(f)) if f == "dropout"));
    }

    #[test]
    fn test_field_missing_everywhere_is_not_persisted() {
        let dir = tempdir().unwrap();
        let engine = RiskEngine::new(test_config(dir.path()));
        let batch: Vec<StudentRecord> = generate_sample_data(200, 42)
            .unwrap()
            .into_iter()
            .map(|mut r| {
                r.pending_fee_ratio = None;
                r
            })
            .collect();

        assert!(matches!(
            engine.train(&batch),
            Err(Error::InvalidValue { field, .. }) if field == "pending_fee_ratio"
        ));
        assert!(!engine.is_trained());
        assert!(!engine.artifact_path().exists());
    }

    #[test]
    fn test_mixed_labels_rejected_for_batch_scoring() {
        let dir = tempdir().unwrap();
        let engine = RiskEngine::new(test_config(dir.path()));
        engine.train(&generate_sample_data(200, 9).unwrap()).unwrap();

        let records = vec![
            StudentRecord::new(92.0, 8.5, 0.0, 12.0, 0.05).with_dropout(0),
            StudentRecord::new(48.0, 3.2, 6.0, 1.0, 0.8),
        ];
        assert!(matches!(
            engine.predict_batch(&records),
            Err(Error::Schema(f)) if f == "dropout"
        ));
    }

    #[test]
    fn test_train_then_predict() {
        let dir = tempdir().unwrap();
        let engine = RiskEngine::new(test_config(dir.path()));

        let report = engine.train(&generate_sample_data(300, 42).unwrap()).unwrap();
        assert_eq!(report.n_records, 300);
        assert_eq!(report.n_train, 240);
        assert_eq!(report.n_test, 60);
        assert!(report.evaluation.is_some());
        assert!(report.artifact_path.exists());

        let result = engine
            .predict(&StudentRecord::new(65.0, 2.8, 3.0, 5.0, 0.4))
            .unwrap();
        assert!((0.0..=1.0).contains(&result.risk_score));
        assert_eq!(result.risk_level, RiskLevel::from_score(result.risk_score));
        assert!(result.top_reasons.len() <= 3);

        let info = engine.model_info().unwrap();
        assert_eq!(info.n_trees, 20);
        assert_eq!(info.trained_at, report.trained_at);
    }

    #[test]
    fn test_predict_batch_matches_single_for_complete_records() {
        let dir = tempdir().unwrap();
        let engine = RiskEngine::new(test_config(dir.path()));
        engine.train(&generate_sample_data(200, 9).unwrap()).unwrap();

        let records = vec![
            StudentRecord::new(92.0, 8.5, 0.0, 12.0, 0.05),
            StudentRecord::new(48.0, 3.2, 6.0, 1.0, 0.8),
        ];
        let batch = engine.predict_batch(&records).unwrap();
        let single = engine.predict(&records[1]).unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch[1].risk_score.to_bits(), single.risk_score.to_bits());
    }
}
