use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

// Image and label subdirectory names inside every split
pub const IMAGES_DIR: &str = "images";
pub const LABELS_DIR: &str = "labels";
pub const LABEL_EXTENSION: &str = "txt";

/// A dataset partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    Train,
    Valid,
}

impl Split {
    /// Splits in processing order.
    pub const ALL: [Split; 2] = [Split::Train, Split::Valid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Valid => "valid",
        }
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// The descriptor consumed by the trainer as its `data` argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub path: PathBuf,
    pub train: String,
    pub val: String,
    pub names: BTreeMap<u32, String>,
    pub kpt_shape: [u32; 2],
}

/// A unit of the source tree left untouched during flattening, and why.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// The split has no `images` directory.
    MissingImagesDir,
    /// The split's `images` directory has no video subdirectories.
    NoVideoGroups,
    /// A video has images but no matching `labels` subdirectory.
    MissingLabelsDir { video: String },
    /// An image has no label file with the same stem.
    MissingLabel { image: PathBuf },
    /// A non-file entry inside a video's image directory.
    NotAFile { path: PathBuf },
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Skip::MissingImagesDir => write!(f, "no '{}' directory", IMAGES_DIR),
            Skip::NoVideoGroups => write!(f, "no video subdirectories"),
            Skip::MissingLabelsDir { video } => {
                write!(f, "missing labels directory for video '{}'", video)
            }
            Skip::MissingLabel { image } => write!(f, "missing label for '{}'", image.display()),
            Skip::NotAFile { path } => write!(f, "'{}' is not a file", path.display()),
        }
    }
}

/// Result of flattening one split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReport {
    pub split: Split,
    /// Image/label pairs moved; also the next free index.
    pub moved: usize,
    pub skipped: Vec<Skip>,
}

impl SplitReport {
    pub fn new(split: Split) -> Self {
        Self {
            split,
            moved: 0,
            skipped: Vec::new(),
        }
    }

    /// True when the whole split was skipped.
    pub fn is_skipped(&self) -> bool {
        self.skipped
            .iter()
            .any(|skip| matches!(skip, Skip::MissingImagesDir | Skip::NoVideoGroups))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FlattenReport {
    pub splits: Vec<SplitReport>,
}

impl FlattenReport {
    pub fn split(&self, split: Split) -> Option<&SplitReport> {
        self.splits.iter().find(|report| report.split == split)
    }

    pub fn total_moved(&self) -> usize {
        self.splits.iter().map(|report| report.moved).sum()
    }

    pub fn print_summary(&self) {
        log::info!("=== Flatten Summary ===");
        for report in &self.splits {
            if report.is_skipped() {
                log::info!("{}: skipped", report.split);
            } else {
                log::info!(
                    "{}: moved {} image/label pairs, {} skipped entries",
                    report.split,
                    report.moved,
                    report.skipped.len()
                );
            }
        }
        log::info!("Total pairs moved: {}", self.total_moved());
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlattenOutcome {
    /// The source root is not a directory; nothing was touched.
    SourceNotFound,
    Flattened(FlattenReport),
}
