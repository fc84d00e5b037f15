//! Trained model bundle and its on-disk store

use super::explain::FeatureImportance;
use crate::data::StudentRecord;
use crate::error::{Error, Result};
use crate::features::{feature_names, FeatureBuilder, StandardScaler, FEATURE_NAMES};
use crate::models::RandomForest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Classifier, standardization statistics and feature order, used as one unit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    forest: RandomForest,
    scaler: StandardScaler,
    feature_names: Vec<String>,
    trained_at: DateTime<Utc>,
}

impl TrainedModel {
    pub fn new(forest: RandomForest, scaler: StandardScaler, trained_at: DateTime<Utc>) -> Self {
        Self {
            forest,
            scaler,
            feature_names: feature_names(),
            trained_at,
        }
    }

    /// Check that every part of the bundle uses the crate's feature order
    pub fn validate(&self) -> Result<()> {
        for names in [
            self.feature_names.as_slice(),
            self.scaler.feature_names(),
            self.forest.feature_names(),
        ] {
            if names.iter().map(String::as_str).ne(FEATURE_NAMES.iter().copied()) {
                return Err(Error::FeatureMismatch {
                    expected: feature_names(),
                    found: names.to_vec(),
                });
            }
        }
        Ok(())
    }

    /// Positive-class probabilities for a batch, imputing over that batch
    pub fn score(&self, batch: &[StudentRecord]) -> Result<Vec<f64>> {
        let mut builder = FeatureBuilder::with_scaler(self.scaler.clone());
        let processed = builder.preprocess(batch, false)?;
        Ok(self.forest.predict_proba(&processed.rows()))
    }

    pub fn feature_importance(&self) -> FeatureImportance {
        FeatureImportance::from_forest(&self.forest)
    }

    pub fn forest(&self) -> &RandomForest {
        &self.forest
    }

    pub fn scaler(&self) -> &StandardScaler {
        &self.scaler
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }
}

/// Directory of model artifacts, one JSON file per model name
#[derive(Debug, Clone)]
pub struct ModelStore {
    dir: PathBuf,
}

impl ModelStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.json", name))
    }

    pub fn exists(&self, name: &str) -> bool {
        self.path_for(name).is_file()
    }

    /// Persist a model, replacing any earlier artifact of the same name.
    ///
    /// The artifact is written to a temporary sibling and renamed into place, so
    /// readers see either the old or the new file, never a partial one.
    pub fn save(&self, name: &str, model: &TrainedModel) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir).map_err(|e| Error::io(&self.dir, e))?;

        let path = self.path_for(name);
        let tmp = self.dir.join(format!(".{}.json.tmp", name));

        let file = File::create(&tmp).map_err(|e| Error::io(&tmp, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, model)?;
        writer.flush().map_err(|e| Error::io(&tmp, e))?;
        drop(writer);

        fs::rename(&tmp, &path).map_err(|e| Error::io(&path, e))?;
        info!("Model saved to {:?}", path);
        Ok(path)
    }

    /// Load a model; `Ok(None)` when no artifact exists under that name
    pub fn load(&self, name: &str) -> Result<Option<TrainedModel>> {
        let path = self.path_for(name);
        if !path.exists() {
            debug!("No saved model found at {:?}", path);
            return Ok(None);
        }

        let file = File::open(&path).map_err(|e| Error::io(&path, e))?;
        let model: TrainedModel = serde_json::from_reader(BufReader::new(file))?;
        model.validate()?;

        info!("Model loaded from {:?}", path);
        Ok(Some(model))
    }
}
