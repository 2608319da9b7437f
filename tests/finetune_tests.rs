use pose_finetune::{
    run_finetune, DatasetDescriptor, Error, FinetuneConfig, Result, TrainRequest, Trainer,
};
use std::cell::RefCell;
use std::fs;
use std::path::Path;

/// Records every request instead of training.
#[derive(Default)]
struct RecordingTrainer {
    requests: RefCell<Vec<TrainRequest>>,
}

impl Trainer for RecordingTrainer {
    fn train(&self, request: &TrainRequest) -> Result<()> {
        self.requests.borrow_mut().push(request.clone());
        Ok(())
    }
}

fn read_descriptor(path: &Path) -> DatasetDescriptor {
    serde_yaml::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn test_default_run() {
    let temp_dir = tempfile::tempdir().unwrap();
    let cwd = temp_dir.path();
    let trainer = RecordingTrainer::default();

    run_finetune(&FinetuneConfig::default(), cwd, &trainer).unwrap();

    for dir in ["train/images", "train/labels", "valid/images", "valid/labels"] {
        assert!(cwd.join(dir).is_dir(), "{} should exist", dir);
    }

    let descriptor_path = cwd.join("horse-keypoints.yaml");
    let descriptor = read_descriptor(&descriptor_path);
    assert_eq!(descriptor.path, cwd.join("."));
    assert_eq!(descriptor.train, "train/images");
    assert_eq!(descriptor.val, "valid/images");
    assert_eq!(descriptor.names.get(&0).map(String::as_str), Some("Equestrian"));
    assert_eq!(descriptor.kpt_shape, [40, 3]);

    let requests = trainer.requests.borrow();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.model, "yolov8m-pose.pt");
    assert_eq!(request.data, descriptor_path);
    assert_eq!(request.epochs, 100);
    assert_eq!(request.imgsz, 640);
    assert_eq!(request.batch, 64);
    assert_eq!(request.project, "Horse_Keypoints");
    assert_eq!(request.name, "yolov8m-pose_100_epochs");
    assert_eq!(request.close_mosaic, 10);
    assert_eq!(request.mosaic, 0.4);
    assert_eq!(request.fliplr, 0.0);
}

#[test]
fn test_descriptor_yaml_keys() {
    let temp_dir = tempfile::tempdir().unwrap();
    run_finetune(
        &FinetuneConfig::default(),
        temp_dir.path(),
        &RecordingTrainer::default(),
    )
    .unwrap();

    let yaml_content = fs::read_to_string(temp_dir.path().join("horse-keypoints.yaml")).unwrap();
    assert!(yaml_content.contains("path:"));
    assert!(yaml_content.contains("train: train/images"));
    assert!(yaml_content.contains("val: valid/images"));
    assert!(yaml_content.contains("names:"));
    assert!(yaml_content.contains("0: Equestrian"));
    assert!(yaml_content.contains("kpt_shape:"));
}

#[test]
fn test_existing_layout_and_descriptor_are_reused() {
    let temp_dir = tempfile::tempdir().unwrap();
    let cwd = temp_dir.path();
    fs::create_dir_all(cwd.join("train/images")).unwrap();
    fs::write(cwd.join("train/images/keep.jpg"), "x").unwrap();
    fs::write(cwd.join("horse-keypoints.yaml"), "stale: true\n").unwrap();

    run_finetune(&FinetuneConfig::default(), cwd, &RecordingTrainer::default()).unwrap();

    assert!(cwd.join("train/images/keep.jpg").exists());
    let yaml_content = fs::read_to_string(cwd.join("horse-keypoints.yaml")).unwrap();
    assert!(!yaml_content.contains("stale"));
}

#[test]
fn test_custom_config_from_yaml() {
    let temp_dir = tempfile::tempdir().unwrap();
    let cwd = temp_dir.path();
    let config_path = cwd.join("finetune.yaml");
    fs::write(
        &config_path,
        "training:\n  model: yolov8n-pose.pt\n  epochs: 3\n  kpt_shape: [17, 3]\n  classes:\n    0: person\n    1: rider\n  dataset_yaml: data/pose.yaml\ndataset:\n  data_dir: data\n  batch_size: 8\n",
    )
    .unwrap();
    fs::create_dir_all(cwd.join("data")).unwrap();

    let config = FinetuneConfig::from_yaml_file(&config_path).unwrap();
    let trainer = RecordingTrainer::default();
    run_finetune(&config, cwd, &trainer).unwrap();

    assert!(cwd.join("data/valid/labels").is_dir());
    let descriptor = read_descriptor(&cwd.join("data/pose.yaml"));
    assert_eq!(descriptor.path, cwd.join("data"));
    assert_eq!(descriptor.kpt_shape, [17, 3]);
    assert_eq!(descriptor.names.len(), 2);

    let request = &trainer.requests.borrow()[0];
    assert_eq!(request.name, "yolov8n-pose_3_epochs");
    assert_eq!(request.batch, 8);
    assert_eq!(request.imgsz, 640);
}

#[test]
fn test_invalid_config_stops_before_side_effects() {
    let temp_dir = tempfile::tempdir().unwrap();
    let cwd = temp_dir.path();
    let mut config = FinetuneConfig::default();
    config.training.epochs = 0;
    let trainer = RecordingTrainer::default();

    let err = run_finetune(&config, cwd, &trainer).unwrap_err();

    assert!(matches!(err, Error::InvalidConfig(_)));
    assert!(!cwd.join("train").exists());
    assert!(trainer.requests.borrow().is_empty());
}

#[test]
fn test_unwritable_descriptor_propagates() {
    let temp_dir = tempfile::tempdir().unwrap();
    let cwd = temp_dir.path();
    let mut config = FinetuneConfig::default();
    config.training.dataset_yaml = "missing_dir/data.yaml".into();
    let trainer = RecordingTrainer::default();

    let err = run_finetune(&config, cwd, &trainer).unwrap_err();

    assert!(matches!(err, Error::Io { .. }));
    assert!(trainer.requests.borrow().is_empty());
}

#[test]
fn test_malformed_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("bad.yaml");
    fs::write(&config_path, "training: [not, a, mapping]\n").unwrap();

    let err = FinetuneConfig::from_yaml_file(&config_path).unwrap_err();
    assert!(matches!(err, Error::Yaml { .. }));
}
