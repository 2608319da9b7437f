//! Fine-tuning launcher and dataset preparation for YOLO pose models.
//!
//! Two independent entry points share this crate:
//! [`run_finetune`] writes the dataset descriptor and hands off to an
//! external trainer, and [`flatten_dataset`] turns a per-video keypoint
//! dataset into sequentially numbered image/label pairs.

pub mod config;
pub mod error;
pub mod finetune;
pub mod flatten;
pub mod io;
pub mod trainer;
pub mod types;
pub mod utils;

// Re-export commonly used types and functions
pub use config::{Args, Command, DatasetConfig, FinetuneConfig, TrainingConfig};
pub use error::{Error, Result};
pub use finetune::{build_train_request, run_finetune};
pub use flatten::flatten_dataset;
pub use io::{build_descriptor, prepare_dataset_dirs, write_descriptor};
pub use trainer::{DryRun, TrainRequest, Trainer, UltralyticsCli};
pub use types::{DatasetDescriptor, FlattenOutcome, FlattenReport, Skip, Split, SplitReport};
