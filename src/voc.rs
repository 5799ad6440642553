//! Pascal-VOC annotation documents.
//!
//! Only the elements the converter reads are modeled; everything else in the
//! document (`source`, `segmented`, `pose`, ...) is ignored. Every element is
//! collected as a list and read from its first occurrence, so a repeated
//! `<filename>` or `<size>` does not reject the document. Numeric fields are
//! kept as text so that a single bad value drops one box instead of the file.

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::SkipReason;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VocAnnotation {
    pub filename: Vec<String>,
    pub size: Vec<VocSize>,
    #[serde(rename = "object")]
    pub objects: Vec<VocObject>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VocSize {
    pub width: Vec<String>,
    pub height: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VocObject {
    pub bndbox: Vec<VocBndBox>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct VocBndBox {
    pub xmin: Vec<String>,
    pub ymin: Vec<String>,
    pub xmax: Vec<String>,
    pub ymax: Vec<String>,
}

// Repeated elements are legal input; the first occurrence wins
fn parse_number<T: std::str::FromStr>(field: &[String]) -> Option<T> {
    field.first().and_then(|text| text.trim().parse().ok())
}

impl VocAnnotation {
    /// Parse an annotation document from text
    pub fn from_xml(content: &str) -> Result<Self, SkipReason> {
        quick_xml::de::from_str(content).map_err(|e| SkipReason::MalformedXml(e.to_string()))
    }

    /// Read and parse an annotation file
    pub fn read(path: &Path) -> Result<Self, SkipReason> {
        let content = fs::read_to_string(path)
            .map_err(|e| SkipReason::MalformedXml(format!("{}: {}", path.display(), e)))?;
        Self::from_xml(&content)
    }

    /// Declared `(width, height)` in pixels.
    ///
    /// Both must be present and integral. A zero dimension is rejected since
    /// every box would divide by it.
    pub fn dimensions(&self) -> Result<(u32, u32), SkipReason> {
        let size = self
            .size
            .first()
            .ok_or_else(|| SkipReason::MalformedXml("missing <size>".to_string()))?;
        let width: u32 = parse_number(&size.width)
            .ok_or_else(|| SkipReason::MalformedXml("missing or invalid size/width".to_string()))?;
        let height: u32 = parse_number(&size.height).ok_or_else(|| {
            SkipReason::MalformedXml("missing or invalid size/height".to_string())
        })?;
        if width == 0 || height == 0 {
            return Err(SkipReason::InvalidSize { width, height });
        }
        Ok((width, height))
    }

    /// The filename hint, if present and not blank
    pub fn filename_hint(&self) -> Option<&str> {
        self.filename
            .first()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
    }
}

impl VocObject {
    /// Corners of the object's first `<bndbox>`
    pub fn corners(&self) -> Option<(f64, f64, f64, f64)> {
        self.bndbox.first().and_then(VocBndBox::corners)
    }
}

impl VocBndBox {
    /// Pixel corners `(xmin, ymin, xmax, ymax)`, or `None` if any is missing or not a number
    pub fn corners(&self) -> Option<(f64, f64, f64, f64)> {
        Some((
            parse_number(&self.xmin)?,
            parse_number(&self.ymin)?,
            parse_number(&self.xmax)?,
            parse_number(&self.ymax)?,
        ))
    }
}
