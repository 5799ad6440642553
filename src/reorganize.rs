use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{ReorganizeConfig, TRAIN_LIST_NAME, VAL_LIST_NAME};
use crate::utils::{create_progress_bar, ensure_directory, mangle_label_name, read_path_list};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReorganizeReport {
    pub train: usize,
    pub val: usize,
    pub missing_images: usize,
    pub missing_labels: usize,
}

/// Sequential name for entry `index` of a split, e.g. `train_000042`
pub fn sequential_stem(split: &str, index: usize) -> String {
    format!("{}_{:06}", split, index)
}

fn image_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "jpg".to_string())
}

// Entries that already live in `images_dir`, typically from an earlier run
fn placed_entries(entries: &[String], images_dir: &Path) -> HashMap<usize, PathBuf> {
    entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let canonical = fs::canonicalize(entry).ok()?;
            (canonical.is_file() && canonical.parent() == Some(images_dir))
                .then_some((index, canonical))
        })
        .collect()
}

/// Copy one split into `images/<split>` and `labels/<split>`; returns the new image paths.
///
/// Entries already inside `images/<split>` stay where they are, so running
/// this again over rewritten manifests never copies a file onto itself.
fn reorganize_split(
    split: &str,
    entries: &[String],
    data_dir: &Path,
    labels_all: &Path,
    report: &mut ReorganizeReport,
) -> std::io::Result<Vec<PathBuf>> {
    let images_dir = fs::canonicalize(ensure_directory(&data_dir.join("images").join(split))?)?;
    let labels_dir = ensure_directory(&data_dir.join("labels").join(split))?;
    let pb = create_progress_bar(entries.len() as u64, split);

    let placed = placed_entries(entries, &images_dir);
    let taken: HashSet<String> = placed
        .values()
        .filter_map(|path| path.file_stem())
        .map(|stem| stem.to_string_lossy().into_owned())
        .collect();
    let mut next_free = entries.len();

    let mut new_paths = Vec::with_capacity(entries.len());
    for (index, entry) in entries.iter().enumerate() {
        pb.inc(1);
        if let Some(path) = placed.get(&index) {
            new_paths.push(path.clone());
            continue;
        }

        let source = Path::new(entry);
        if !source.is_file() {
            warn!("Image not found: {}", entry);
            report.missing_images += 1;
            continue;
        }

        let mut stem = sequential_stem(split, index);
        while taken.contains(&stem) {
            stem = sequential_stem(split, next_free);
            next_free += 1;
        }
        let target = images_dir.join(format!("{}.{}", stem, image_extension(source)));
        fs::copy(source, &target)?;
        new_paths.push(target);

        let label = labels_all.join(mangle_label_name(entry));
        if label.is_file() {
            fs::copy(&label, labels_dir.join(format!("{}.txt", stem)))?;
        } else {
            warn!("Label not found for {}", entry);
            report.missing_labels += 1;
        }
    }

    pb.finish_with_message(format!("{} split copied", split));
    Ok(new_paths)
}

fn write_path_list(path: &Path, entries: &[PathBuf]) -> std::io::Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for entry in entries {
        writeln!(writer, "{}", entry.display())?;
    }
    writer.flush()
}

/// Copy every manifest member into the fixed layout and point the manifests at the copies
pub fn reorganize_dataset(config: &ReorganizeConfig) -> std::io::Result<ReorganizeReport> {
    let data_dir = fs::canonicalize(&config.data_dir)?;
    let labels_all = data_dir.join(&config.labels_dir_name);
    let train_list = data_dir.join(TRAIN_LIST_NAME);
    let val_list = data_dir.join(VAL_LIST_NAME);

    let train_entries = read_path_list(&train_list)?;
    let val_entries = read_path_list(&val_list)?;
    info!(
        "Processing {} training images and {} validation images...",
        train_entries.len(),
        val_entries.len()
    );

    let mut report = ReorganizeReport::default();
    let new_train = reorganize_split("train", &train_entries, &data_dir, &labels_all, &mut report)?;
    let new_val = reorganize_split("val", &val_entries, &data_dir, &labels_all, &mut report)?;

    info!("Updating {} and {}...", TRAIN_LIST_NAME, VAL_LIST_NAME);
    write_path_list(&train_list, &new_train)?;
    write_path_list(&val_list, &new_val)?;

    report.train = new_train.len();
    report.val = new_val.len();
    info!("Dataset reorganization complete!");
    info!("Training images: {}", report.train);
    info!("Validation images: {}", report.val);
    if report.missing_images + report.missing_labels > 0 {
        warn!(
            "Missing images: {}, missing labels: {}",
            report.missing_images, report.missing_labels
        );
    }

    Ok(report)
}
