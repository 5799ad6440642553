//! Merging hand-annotated invoices into a converted dataset.
//!
//! Invoice labels come from an annotation tool in YOLO format and may carry
//! arbitrary class ids; every box is folded into the single logo class.

use glob::{glob, Pattern};
use log::{info, warn};
use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{MergeConfig, TRAIN_LIST_NAME};
use crate::types::LOGO_CLASS_ID;
use crate::utils::{absolute_path, ensure_directory, mangle_label_name, read_path_list};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub found: usize,
    pub added: usize,
    pub skipped_unlabeled: usize,
    pub skipped_invalid: usize,
    pub train_total: usize,
    pub train_invoice_lines: usize,
}

/// Keep `class cx cy w h` lines, forcing the class to the logo id
pub fn normalize_invoice_labels(content: &str) -> Vec<String> {
    content
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() != 5 {
                return None;
            }
            Some(format!("{} {}", LOGO_CLASS_ID, parts[1..].join(" ")))
        })
        .collect()
}

/// Invoice `.jpg` files in `dir`, sorted
pub fn list_invoice_images(dir: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/*.jpg", Pattern::escape(&dir.to_string_lossy()));
    let mut images: Vec<PathBuf> = match glob(&pattern) {
        Ok(paths) => paths.filter_map(|entry| entry.ok()).collect(),
        Err(e) => {
            warn!("Invalid invoice pattern {}: {}", pattern, e);
            Vec::new()
        }
    };
    images.sort();
    images
}

/// Add labelled invoices to `labels_all/` and append them to the train list
pub fn merge_invoices(config: &MergeConfig) -> std::io::Result<MergeReport> {
    let labels_dir = ensure_directory(&config.data_dir.join(&config.labels_dir_name))?;
    let train_list = config.data_dir.join(TRAIN_LIST_NAME);
    let mut report = MergeReport::default();

    info!("Adding invoice images to YOLO dataset...");
    let images = list_invoice_images(&config.invoices_dir);
    report.found = images.len();
    if images.is_empty() {
        warn!("No .jpg files found in {}", config.invoices_dir.display());
        return Ok(report);
    }
    info!("Found {} invoice images", images.len());

    let mut added_paths = Vec::new();
    for image_path in &images {
        let label_path = image_path.with_extension("txt");
        if !label_path.is_file() {
            warn!(
                "No label file for {}; annotate it first",
                image_path.display()
            );
            report.skipped_unlabeled += 1;
            continue;
        }

        let lines = normalize_invoice_labels(&fs::read_to_string(&label_path)?);
        if lines.is_empty() {
            warn!("Empty or invalid label file: {}", label_path.display());
            report.skipped_invalid += 1;
            continue;
        }

        let abs_path = fs::canonicalize(image_path)?.to_string_lossy().into_owned();
        let mangled = mangle_label_name(&abs_path);
        let mut contents = lines.join("\n");
        contents.push('\n');
        fs::write(labels_dir.join(&mangled), contents)?;

        info!("Label saved: {}", mangled);
        added_paths.push(abs_path);
    }
    report.added = added_paths.len();

    if added_paths.is_empty() {
        warn!("No images were added: each invoice .jpg needs a YOLO .txt label next to it");
        return Ok(report);
    }

    info!("Appending {} invoice paths to {}", added_paths.len(), TRAIN_LIST_NAME);
    let mut list = BufWriter::new(
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&train_list)?,
    );
    for path in &added_paths {
        writeln!(list, "{}", path)?;
    }
    list.flush()?;
    drop(list);

    // Sanity check over the whole list, previous runs included
    let invoice_root = absolute_path(&config.invoices_dir)?;
    let entries = read_path_list(&train_list)?;
    let invoice_entries: Vec<&String> = entries
        .iter()
        .filter(|entry| Path::new(entry.as_str()).starts_with(&invoice_root))
        .collect();
    report.train_total = entries.len();
    report.train_invoice_lines = invoice_entries.len();

    info!("Invoice merge complete: {} labels added to {}", report.added, labels_dir.display());
    info!("Total images in {}: {}", TRAIN_LIST_NAME, report.train_total);
    info!("Invoice images in {}: {}", TRAIN_LIST_NAME, report.train_invoice_lines);
    for entry in invoice_entries.iter().take(3) {
        info!("  {}", entry);
    }

    Ok(report)
}
