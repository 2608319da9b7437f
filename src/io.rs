use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::config::FinetuneConfig;
use crate::error::{Error, Result};
use crate::types::{DatasetDescriptor, Split, IMAGES_DIR, LABELS_DIR};
use crate::utils::ensure_dir;

/// Create `{train,valid}/{images,labels}` under the dataset root.
pub fn prepare_dataset_dirs(data_root: &Path) -> Result<()> {
    for split in Split::ALL {
        for kind in [IMAGES_DIR, LABELS_DIR] {
            let dir = data_root.join(split.as_str()).join(kind);
            ensure_dir(&dir)?;
            debug!("Ensured {}", dir.display());
        }
    }
    Ok(())
}

/// Build the dataset descriptor; an absolute `data_dir` replaces `cwd`.
pub fn build_descriptor(config: &FinetuneConfig, cwd: &Path) -> DatasetDescriptor {
    let relative_images = |split: Split| format!("{}/{}", split.as_str(), IMAGES_DIR);
    DatasetDescriptor {
        path: cwd.join(&config.dataset.data_dir),
        train: relative_images(Split::Train),
        val: relative_images(Split::Valid),
        names: config.training.classes.clone(),
        kpt_shape: config.training.kpt_shape,
    }
}

/// Write the dataset descriptor as YAML, replacing any existing file
pub fn write_descriptor(descriptor: &DatasetDescriptor, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| Error::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_yaml::to_writer(&mut writer, descriptor).map_err(|source| Error::Yaml {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(|e| Error::io(path, e))?;
    info!("Wrote dataset descriptor to {}", path.display());
    Ok(())
}
