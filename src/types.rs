use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::error::SkipReason;

// Image suffixes tried, in order, when an annotation's filename hint does not resolve
pub const IMG_EXTS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

// The only class this dataset carries
pub const LOGO_CLASS_ID: u32 = 0;
pub const LOGO_CLASS_NAME: &str = "logo";

/// A bounding box normalized to the image's declared size, in YOLO order.
///
/// Values are not clamped: corners outside the image produce values outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub class_id: u32,
    pub cx: f64,
    pub cy: f64,
    pub w: f64,
    pub h: f64,
}

impl NormalizedBox {
    pub fn logo(cx: f64, cy: f64, w: f64, h: f64) -> Self {
        Self {
            class_id: LOGO_CLASS_ID,
            cx,
            cy,
            w,
            h,
        }
    }
}

// One YOLO label line, without the trailing newline
impl fmt::Display for NormalizedBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.6} {:.6} {:.6} {:.6}",
            self.class_id, self.cx, self.cy, self.w, self.h
        )
    }
}

// One parsed annotation file: the absolute image it describes and its boxes
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRecord {
    pub image_path: String,
    pub boxes: Vec<NormalizedBox>,
}

// Result of parsing one annotation file, plus the boxes dropped for missing fields
#[derive(Debug, Clone, PartialEq)]
pub struct ParseOutcome {
    pub result: Result<AnnotationRecord, SkipReason>,
    pub skipped_boxes: usize,
}

// Struct to hold the paths the converter writes to
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub out_dir: PathBuf,
    pub labels_dir: PathBuf,
    pub train_list: PathBuf,
    pub val_list: PathBuf,
    pub yaml_path: PathBuf,
}

// Struct to hold the deduplicated records split into training and validation sets
#[derive(Debug, Clone, Default)]
pub struct DatasetSplit {
    pub train: Vec<AnnotationRecord>,
    pub val: Vec<AnnotationRecord>,
}

impl DatasetSplit {
    pub fn total(&self) -> usize {
        self.train.len() + self.val.len()
    }
}

/// The dataset YAML handed to the trainer: class names plus the two path lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetDescriptor {
    pub names: BTreeMap<u32, String>,
    pub train: String,
    pub val: String,
}

impl DatasetDescriptor {
    pub fn single_class(train: String, val: String) -> Self {
        let mut names = BTreeMap::new();
        names.insert(LOGO_CLASS_ID, LOGO_CLASS_NAME.to_string());
        Self { names, train, val }
    }
}

// Struct to hold processing statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ProcessingStats {
    pub xml_files_found: usize,
    pub records_parsed: usize,
    pub skipped_malformed: usize,
    pub skipped_invalid_size: usize,
    pub skipped_missing_image: usize,
    pub skipped_no_boxes: usize,
    pub boxes_skipped: usize,
    pub duplicates_dropped: usize,
    pub labels_written: usize,
    pub labels_existing: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_outcome(&mut self, outcome: &ParseOutcome) {
        self.boxes_skipped += outcome.skipped_boxes;
        match &outcome.result {
            Ok(_) => self.records_parsed += 1,
            Err(SkipReason::MalformedXml(_)) => self.skipped_malformed += 1,
            Err(SkipReason::InvalidSize { .. }) => self.skipped_invalid_size += 1,
            Err(SkipReason::MissingImage) => self.skipped_missing_image += 1,
            Err(SkipReason::NoBoxes) => self.skipped_no_boxes += 1,
        }
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped_malformed
            + self.skipped_invalid_size
            + self.skipped_missing_image
            + self.skipped_no_boxes
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("XML files found: {}", self.xml_files_found);
        log::info!("Records parsed: {}", self.records_parsed);
        log::info!("Duplicate image paths dropped: {}", self.duplicates_dropped);
        log::info!(
            "Label files written: {} (already present: {})",
            self.labels_written,
            self.labels_existing
        );

        let total_skipped = self.total_skipped();
        if total_skipped > 0 {
            log::warn!(
                "Skipped annotation files: {} (malformed: {}, bad size: {}, missing image: {}, no boxes: {})",
                total_skipped,
                self.skipped_malformed,
                self.skipped_invalid_size,
                self.skipped_missing_image,
                self.skipped_no_boxes
            );
        }
        if self.boxes_skipped > 0 {
            log::warn!("Boxes skipped for missing fields: {}", self.boxes_skipped);
        }
    }
}
