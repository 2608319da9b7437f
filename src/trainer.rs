//! The external training collaborator.
//!
//! Training itself (model loading, the optimisation loop, checkpointing) is
//! done by the Ultralytics `yolo` command; this module only decides how it is
//! invoked.

use log::info;
use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};

/// Everything the trainer needs for one fine-tuning run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainRequest {
    pub model: String,
    pub data: PathBuf,
    pub epochs: u32,
    pub imgsz: u32,
    pub batch: i32,
    pub project: String,
    pub name: String,
    pub close_mosaic: u32,
    pub mosaic: f64,
    pub fliplr: f64,
}

impl TrainRequest {
    /// Render as `key=value` arguments.
    pub fn to_args(&self) -> Vec<String> {
        vec![
            format!("model={}", self.model),
            format!("data={}", self.data.display()),
            format!("epochs={}", self.epochs),
            format!("imgsz={}", self.imgsz),
            format!("batch={}", self.batch),
            format!("project={}", self.project),
            format!("name={}", self.name),
            format!("close_mosaic={}", self.close_mosaic),
            format!("mosaic={}", self.mosaic),
            format!("fliplr={}", self.fliplr),
        ]
    }
}

pub trait Trainer {
    /// Run training to completion. Artifacts land under `project/name`.
    fn train(&self, request: &TrainRequest) -> Result<()>;
}

/// Runs `<program> pose train key=value...`.
#[derive(Debug, Clone)]
pub struct UltralyticsCli {
    pub program: String,
}

impl Default for UltralyticsCli {
    fn default() -> Self {
        Self {
            program: "yolo".to_string(),
        }
    }
}

impl UltralyticsCli {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn command(&self, request: &TrainRequest) -> Command {
        let mut command = Command::new(&self.program);
        command.arg("pose").arg("train").args(request.to_args());
        command
    }
}

impl Trainer for UltralyticsCli {
    fn train(&self, request: &TrainRequest) -> Result<()> {
        info!(
            "Launching: {} pose train {}",
            self.program,
            request.to_args().join(" ")
        );
        let status = self
            .command(request)
            .status()
            .map_err(|source| Error::TrainerSpawn {
                program: self.program.clone(),
                source,
            })?;
        if !status.success() {
            return Err(Error::TrainerFailed {
                program: self.program.clone(),
                status,
            });
        }
        info!("Training finished: {}/{}", request.project, request.name);
        Ok(())
    }
}

/// Logs the invocation without running anything.
#[derive(Debug, Clone, Default)]
pub struct DryRun {
    pub program: String,
}

impl Trainer for DryRun {
    fn train(&self, request: &TrainRequest) -> Result<()> {
        info!(
            "Dry run, would execute: {} pose train {}",
            self.program,
            request.to_args().join(" ")
        );
        Ok(())
    }
}
