//! Flatten a per-video keypoint dataset.
//!
//! From:
//!     source/train/images/<video>/<frame>.jpg
//!     source/train/labels/<video>/<frame>.txt
//! To:
//!     target/train/images/0.jpg, 1.jpg, ...
//!     target/train/labels/0.txt, 1.txt, ...
//!
//! and the same for `valid`. Files are moved, not copied. Indices restart at
//! zero for each split and follow sorted video then sorted frame order.

use log::{error, info, warn};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::{
    FlattenOutcome, FlattenReport, Skip, Split, SplitReport, IMAGES_DIR, LABELS_DIR,
    LABEL_EXTENSION,
};
use crate::utils::{create_progress_bar, ensure_dir, move_file};

/// Source and target directories for one split.
struct SplitDirs {
    source_images: PathBuf,
    source_labels: PathBuf,
    target_images: PathBuf,
    target_labels: PathBuf,
}

impl SplitDirs {
    fn new(source: &Path, target: &Path, split: Split) -> Self {
        let source_split = source.join(split.as_str());
        let target_split = target.join(split.as_str());
        Self {
            source_images: source_split.join(IMAGES_DIR),
            source_labels: source_split.join(LABELS_DIR),
            target_images: target_split.join(IMAGES_DIR),
            target_labels: target_split.join(LABELS_DIR),
        }
    }
}

/// Move every image/label pair under `source` into the flat layout under `target`.
///
/// A missing `source` is reported and returns [`FlattenOutcome::SourceNotFound`]
/// without touching the filesystem. Data irregularities are skipped and
/// recorded in the report; I/O failures abort the run without undoing moves
/// already made.
pub fn flatten_dataset(source: &Path, target: &Path) -> Result<FlattenOutcome> {
    if !source.is_dir() {
        error!("Source directory not found at '{}'", source.display());
        return Ok(FlattenOutcome::SourceNotFound);
    }

    info!("Source directory: {}", display_path(source));
    info!("Target directory: {}", display_path(target));

    let mut report = FlattenReport::default();
    for split in Split::ALL {
        info!("Processing '{}' split", split);
        let split_report = flatten_split(&SplitDirs::new(source, target, split), split)?;
        if !split_report.is_skipped() {
            info!(
                "Finished '{}' split. Moved {} image/label pairs.",
                split, split_report.moved
            );
        }
        report.splits.push(split_report);
    }

    report.print_summary();
    info!("Dataset reorganization complete.");
    Ok(FlattenOutcome::Flattened(report))
}

fn flatten_split(dirs: &SplitDirs, split: Split) -> Result<SplitReport> {
    let mut report = SplitReport::new(split);

    if !dirs.source_images.is_dir() {
        skip(&mut report, Skip::MissingImagesDir);
        return Ok(report);
    }

    ensure_dir(&dirs.target_images)?;
    ensure_dir(&dirs.target_labels)?;

    let videos: Vec<PathBuf> = sorted_entries(&dirs.source_images)?
        .into_iter()
        .filter(|path| path.is_dir())
        .collect();
    if videos.is_empty() {
        skip(&mut report, Skip::NoVideoGroups);
        return Ok(report);
    }

    for video_dir in &videos {
        flatten_video(dirs, video_dir, &mut report)?;
    }
    Ok(report)
}

fn flatten_video(dirs: &SplitDirs, video_dir: &Path, report: &mut SplitReport) -> Result<()> {
    let video = file_name_lossy(video_dir);
    info!("Scanning: {}/{}/{}", report.split, IMAGES_DIR, video);

    let labels_dir = dirs
        .source_labels
        .join(video_dir.file_name().unwrap_or_default());
    if !labels_dir.is_dir() {
        skip(report, Skip::MissingLabelsDir { video });
        return Ok(());
    }

    let frames = sorted_entries(video_dir)?;
    let pb = create_progress_bar(frames.len() as u64, &format!("{}/{}", report.split, video));

    for image in frames {
        pb.inc(1);
        if !image.is_file() {
            pb.suspend(|| skip(report, Skip::NotAFile { path: image }));
            continue;
        }
        let label = labels_dir.join(label_file_name(&image));
        if !label.is_file() {
            pb.suspend(|| skip(report, Skip::MissingLabel { image }));
            continue;
        }
        move_pair(dirs, &image, &label, report.moved)?;
        report.moved += 1;
    }

    pb.finish_and_clear();
    Ok(())
}

/// Move one pair to `<index><image ext>` and `<index>.txt`, replacing existing files.
fn move_pair(dirs: &SplitDirs, image: &Path, label: &Path, index: usize) -> Result<()> {
    let mut image_name = OsString::from(index.to_string());
    if let Some(ext) = image.extension() {
        image_name.push(".");
        image_name.push(ext);
    }
    let dest_image = dirs.target_images.join(image_name);
    let dest_label = dirs
        .target_labels
        .join(format!("{}.{}", index, LABEL_EXTENSION));

    move_file(image, &dest_image)?;
    move_file(label, &dest_label)
}

/// `frame.jpg` -> `frame.txt`
fn label_file_name(image: &Path) -> OsString {
    let mut name = image
        .file_stem()
        .map(|stem| stem.to_os_string())
        .unwrap_or_default();
    name.push(".");
    name.push(LABEL_EXTENSION);
    name
}

fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .map_err(|e| Error::io(dir, e))?
        .map(|entry| entry.map(|entry| entry.path()))
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(|e| Error::io(dir, e))?;
    entries.sort();
    Ok(entries)
}

fn skip(report: &mut SplitReport, reason: Skip) {
    warn!("[{}] Skipping: {}", report.split, reason);
    report.skipped.push(reason);
}

fn file_name_lossy(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn display_path(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
