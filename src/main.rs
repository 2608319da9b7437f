use clap::Parser;

use log::{error, info};
use std::env;
use std::process::ExitCode;

use pose_finetune::{
    flatten_dataset, run_finetune, Args, Command, DryRun, Error, FinetuneConfig, Result, Trainer,
    UltralyticsCli,
};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Train {
            config,
            yolo_bin,
            dry_run,
        } => {
            let config = match config {
                Some(path) => {
                    info!("Loading configuration from {}", path.display());
                    FinetuneConfig::from_yaml_file(&path)?
                }
                None => FinetuneConfig::default(),
            };
            let cwd = env::current_dir().map_err(|e| Error::Io {
                path: ".".into(),
                source: e,
            })?;
            let trainer: Box<dyn Trainer> = if dry_run {
                Box::new(DryRun { program: yolo_bin })
            } else {
                Box::new(UltralyticsCli::new(yolo_bin))
            };
            run_finetune(&config, &cwd, trainer.as_ref())
        }
        // A missing source is reported by the flattener and is not a failure.
        Command::Flatten { source, target } => flatten_dataset(&source, &target).map(|_| ()),
    }
}
