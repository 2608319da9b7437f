use log::info;
use std::path::Path;

use crate::config::FinetuneConfig;
use crate::error::Result;
use crate::io::{build_descriptor, prepare_dataset_dirs, write_descriptor};
use crate::trainer::{TrainRequest, Trainer};

/// Build the trainer request; `data` is the descriptor path as written.
pub fn build_train_request(config: &FinetuneConfig, descriptor_path: &Path) -> TrainRequest {
    let training = &config.training;
    let dataset = &config.dataset;
    TrainRequest {
        model: training.model.clone(),
        data: descriptor_path.to_path_buf(),
        epochs: training.epochs,
        imgsz: dataset.image_size,
        batch: dataset.batch_size,
        project: training.project.clone(),
        name: training.run_name(),
        close_mosaic: dataset.close_mosaic,
        mosaic: dataset.mosaic,
        fliplr: dataset.flip_lr,
    }
}

/// Prepare the dataset layout, write the descriptor and hand off to `trainer`.
///
/// Relative paths in `config` are resolved against `cwd`. Any failure stops
/// the run before the trainer is invoked.
pub fn run_finetune(config: &FinetuneConfig, cwd: &Path, trainer: &dyn Trainer) -> Result<()> {
    config.validate()?;

    let descriptor = build_descriptor(config, cwd);
    info!("Preparing dataset directories under {}", descriptor.path.display());
    prepare_dataset_dirs(&descriptor.path)?;

    let descriptor_path = cwd.join(&config.training.dataset_yaml);
    write_descriptor(&descriptor, &descriptor_path)?;

    let request = build_train_request(config, &descriptor_path);
    info!(
        "Fine-tuning {} for {} epochs as {}/{}",
        request.model, request.epochs, request.project, request.name
    );
    trainer.train(&request)
}
