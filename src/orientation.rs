//! EXIF orientation handling.

use exif::{In, Reader, Tag};
use glob::{glob, Pattern};
use image::{DynamicImage, ImageReader};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrientationStatus {
    Upright,
    NeedsRotation(u32),
    Error(String),
}

/// EXIF orientation tag of an image file.
///
/// Files without EXIF data, or with EXIF that fails to parse, yield `None`.
pub fn read_orientation(path: &Path) -> std::io::Result<Option<u32>> {
    let mut reader = BufReader::new(File::open(path)?);
    let exif = match Reader::new().read_from_container(&mut reader) {
        Ok(exif) => exif,
        Err(_) => return Ok(None),
    };
    Ok(exif
        .get_field(Tag::Orientation, In::PRIMARY)
        .and_then(|field| field.value.get_uint(0)))
}

/// Rotate/flip an image so that it displays upright for the given EXIF orientation
pub fn apply_orientation(img: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate90().fliph(),
        6 => img.rotate90(),
        7 => img.rotate270().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

/// Decode an image and undo its EXIF orientation
pub fn open_upright(path: &Path) -> image::ImageResult<DynamicImage> {
    let img = ImageReader::open(path)?.with_guessed_format()?.decode()?;
    let orientation = read_orientation(path)?.unwrap_or(1);
    Ok(apply_orientation(img, orientation))
}

pub fn orientation_status(path: &Path) -> OrientationStatus {
    let format = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map(|reader| reader.format());
    match format {
        Ok(Some(_)) => {}
        Ok(None) => return OrientationStatus::Error("unrecognized image format".to_string()),
        Err(e) => return OrientationStatus::Error(e.to_string()),
    }

    match read_orientation(path) {
        Ok(Some(orientation)) if orientation != 1 => OrientationStatus::NeedsRotation(orientation),
        Ok(_) => OrientationStatus::Upright,
        Err(e) => OrientationStatus::Error(e.to_string()),
    }
}

/// Files directly inside `folder`, sorted
pub fn list_folder(folder: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/*", Pattern::escape(&folder.to_string_lossy()));
    let mut files: Vec<PathBuf> = glob(&pattern)
        .map(|paths| {
            paths
                .filter_map(|entry| entry.ok())
                .filter(|path| path.is_file())
                .collect()
        })
        .unwrap_or_default();
    files.sort();
    files
}

/// Orientation status of every file in a folder
pub fn check_folder(folder: &Path) -> Vec<(PathBuf, OrientationStatus)> {
    list_folder(folder)
        .into_iter()
        .map(|path| {
            let status = orientation_status(&path);
            (path, status)
        })
        .collect()
}
