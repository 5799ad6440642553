use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SkipReason;
use crate::types::{AnnotationRecord, NormalizedBox, ParseOutcome, IMG_EXTS};
use crate::voc::VocAnnotation;

/// Calculate a YOLO box from pixel corners and the declared image size
pub fn calculate_bounding_box(
    (x1, y1, x2, y2): (f64, f64, f64, f64),
    width: u32,
    height: u32,
) -> NormalizedBox {
    let w = width as f64;
    let h = height as f64;
    NormalizedBox::logo(
        (x1 + x2) / 2.0 / w,
        (y1 + y2) / 2.0 / h,
        (x2 - x1) / w,
        (y2 - y1) / h,
    )
}

/// Render boxes as the contents of a YOLO label file
pub fn convert_to_yolo_format(boxes: &[NormalizedBox]) -> String {
    let mut yolo_data = String::with_capacity(boxes.len() * 48);
    for bbox in boxes {
        yolo_data.push_str(&bbox.to_string());
        yolo_data.push('\n');
    }
    yolo_data
}

/// Locate the image an annotation describes.
///
/// The `<filename>` hint is tried first, reduced to its basename and looked up
/// next to the XML file. Otherwise the XML path itself is tried with each known
/// image suffix in turn.
pub fn resolve_image_path(xml_path: &Path, filename_hint: Option<&str>) -> Option<PathBuf> {
    if let Some(hint) = filename_hint {
        if let (Some(parent), Some(name)) = (xml_path.parent(), Path::new(hint).file_name()) {
            let candidate = parent.join(name);
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }

    IMG_EXTS
        .iter()
        .map(|ext| xml_path.with_extension(ext))
        .find(|candidate| candidate.is_file())
}

/// Parse one VOC annotation file into a record.
///
/// Pure apart from reads: safe to call from any worker thread.
pub fn parse_annotation(xml_path: &Path) -> ParseOutcome {
    let mut skipped_boxes = 0;
    let result = parse_annotation_inner(xml_path, &mut skipped_boxes);
    if let Err(reason) = &result {
        debug!("Skipping {}: {}", xml_path.display(), reason);
    }
    ParseOutcome {
        result,
        skipped_boxes,
    }
}

fn parse_annotation_inner(
    xml_path: &Path,
    skipped_boxes: &mut usize,
) -> Result<AnnotationRecord, SkipReason> {
    let annotation = VocAnnotation::read(xml_path)?;
    let (width, height) = annotation.dimensions()?;

    let image_path = resolve_image_path(xml_path, annotation.filename_hint())
        .and_then(|path| fs::canonicalize(path).ok())
        .ok_or(SkipReason::MissingImage)?;

    let mut boxes = Vec::with_capacity(annotation.objects.len());
    for object in &annotation.objects {
        match object.corners() {
            Some(corners) => boxes.push(calculate_bounding_box(corners, width, height)),
            None => *skipped_boxes += 1,
        }
    }

    if boxes.is_empty() {
        return Err(SkipReason::NoBoxes);
    }

    Ok(AnnotationRecord {
        image_path: image_path.to_string_lossy().into_owned(),
        boxes,
    })
}
