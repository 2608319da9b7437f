use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Fine-tune a YOLO pose model and prepare its keypoint dataset.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Write the dataset descriptor and launch pose training
    Train {
        /// YAML file overriding the built-in training and dataset parameters
        #[arg(short = 'c', long = "config")]
        config: Option<PathBuf>,

        /// Training executable to invoke
        #[arg(long = "yolo_bin", default_value = "yolo")]
        yolo_bin: String,

        /// Log the training command instead of running it
        #[arg(long = "dry_run")]
        dry_run: bool,
    },

    /// Flatten per-video image/label folders into sequentially numbered pairs
    Flatten {
        /// Root of the per-video dataset
        #[arg(short = 's', long = "source", default_value = ".")]
        source: PathBuf,

        /// Root of the flattened dataset, created as needed
        #[arg(short = 't', long = "target", default_value = ".")]
        target: PathBuf,
    },
}

/// Model and run parameters handed to the trainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrainingConfig {
    /// Descriptor file written before training, relative to the working directory
    pub dataset_yaml: PathBuf,
    pub model: String,
    pub epochs: u32,
    /// Number of keypoints and values per keypoint (2 = x,y; 3 = x,y,visibility)
    pub kpt_shape: [u32; 2],
    pub project: String,
    /// Run name; derived from the model and epoch count when absent
    pub name: Option<String>,
    pub classes: BTreeMap<u32, String>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset_yaml: PathBuf::from("horse-keypoints.yaml"),
            model: "yolov8m-pose.pt".to_string(),
            epochs: 100,
            kpt_shape: [40, 3],
            project: "Horse_Keypoints".to_string(),
            name: None,
            classes: BTreeMap::from([(0, "Equestrian".to_string())]),
        }
    }
}

impl TrainingConfig {
    /// The run directory name, e.g. `yolov8m-pose_100_epochs`.
    pub fn run_name(&self) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        let file_name = Path::new(&self.model)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.model.clone());
        let stem = file_name.split('.').next().unwrap_or_default();
        format!("{}_{}_epochs", stem, self.epochs)
    }
}

/// Dataset location and loader/augmentation parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    /// Dataset root, resolved against the working directory
    pub data_dir: PathBuf,
    pub image_size: u32,
    /// Images per batch; -1 lets the trainer pick one automatically
    pub batch_size: i32,
    /// Number of final epochs trained with mosaic disabled
    pub close_mosaic: u32,
    pub mosaic: f64,
    /// Horizontal flip probability; flips would swap left/right keypoints
    pub flip_lr: f64,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            image_size: 640,
            batch_size: 64,
            close_mosaic: 10,
            mosaic: 0.4,
            flip_lr: 0.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinetuneConfig {
    pub training: TrainingConfig,
    pub dataset: DatasetConfig,
}

impl FinetuneConfig {
    /// Load overrides from a YAML file; absent fields keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let config: FinetuneConfig =
            serde_yaml::from_reader(file).map_err(|source| Error::Yaml {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let training = &self.training;
        let dataset = &self.dataset;

        if training.model.trim().is_empty() {
            return Err(Error::InvalidConfig("model must not be empty".into()));
        }
        if training.epochs == 0 {
            return Err(Error::InvalidConfig("epochs must be at least 1".into()));
        }
        if training.kpt_shape[0] == 0 || !matches!(training.kpt_shape[1], 2 | 3) {
            return Err(Error::InvalidConfig(format!(
                "kpt_shape must be [N > 0, 2 or 3], got {:?}",
                training.kpt_shape
            )));
        }
        if training.classes.is_empty() {
            return Err(Error::InvalidConfig("at least one class is required".into()));
        }
        if dataset.image_size == 0 {
            return Err(Error::InvalidConfig("image_size must be at least 1".into()));
        }
        if dataset.batch_size == 0 || dataset.batch_size < -1 {
            return Err(Error::InvalidConfig(format!(
                "batch_size must be positive or -1, got {}",
                dataset.batch_size
            )));
        }
        for (key, value) in [("mosaic", dataset.mosaic), ("flip_lr", dataset.flip_lr)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!(
                    "{} must be between 0.0 and 1.0, got {}",
                    key, value
                )));
            }
        }
        Ok(())
    }
}
