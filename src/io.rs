use jwalk::WalkDir;
use log::info;
use rayon::prelude::*;
use rayon::ThreadPool;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::config::{ConvertConfig, TRAIN_LIST_NAME, VAL_LIST_NAME};
use crate::conversion::{convert_to_yolo_format, parse_annotation};
use crate::error::Result;
use crate::types::{AnnotationRecord, DatasetDescriptor, OutputDirs, ParseOutcome, ProcessingStats};
use crate::utils::{absolute_path, create_progress_bar, ensure_directory, mangle_label_name};

const YAML_HEADER: &str = "# YOLO single-class dataset (no-copy lists)\n";

/// Recursively collect every `*.xml` file under `root`, sorted by path
pub fn discover_xml_files(root: &Path) -> Vec<PathBuf> {
    let mut xml_files: Vec<PathBuf> = WalkDir::new(root)
        .skip_hidden(false)
        .sort(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("xml"))
        })
        .map(|entry| entry.path())
        .collect();
    xml_files.sort();
    xml_files
}

/// Parse annotation files on `pool`.
///
/// Outcomes come back in the same order as `xml_files`, whatever order the
/// workers finish in.
pub fn parse_annotation_files(xml_files: &[PathBuf], pool: &ThreadPool) -> Vec<ParseOutcome> {
    let pb = create_progress_bar(xml_files.len() as u64, "Parse");
    let outcomes = pool.install(|| {
        xml_files
            .par_iter()
            .map(|xml_path| {
                let outcome = parse_annotation(xml_path);
                pb.inc(1);
                outcome
            })
            .collect()
    });
    pb.finish_with_message("Parsing complete");
    outcomes
}

/// Resolve the output paths and create the output and label directories
pub fn setup_output_directories(config: &ConvertConfig) -> std::io::Result<OutputDirs> {
    let out_dir = absolute_path(&ensure_directory(&config.out_dir)?)?;
    let labels_dir = ensure_directory(&out_dir.join(&config.labels_dir_name))?;

    Ok(OutputDirs {
        train_list: out_dir.join(TRAIN_LIST_NAME),
        val_list: out_dir.join(VAL_LIST_NAME),
        yaml_path: out_dir.join(&config.yaml_name),
        labels_dir,
        out_dir,
    })
}

/// Write one label file unless it already exists. Returns whether it was written.
pub fn write_label_file(labels_dir: &Path, record: &AnnotationRecord) -> std::io::Result<bool> {
    let label_path = labels_dir.join(mangle_label_name(&record.image_path));
    if label_path.exists() {
        return Ok(false);
    }
    fs::write(&label_path, convert_to_yolo_format(&record.boxes))?;
    Ok(true)
}

/// Emit the label files of a split and append its image paths to the manifest
pub fn write_split(
    name: &str,
    records: &[AnnotationRecord],
    list_path: &Path,
    labels_dir: &Path,
    stats: &mut ProcessingStats,
) -> std::io::Result<()> {
    let pb = create_progress_bar(records.len() as u64, name);
    let mut list = BufWriter::new(
        OpenOptions::new()
            .create(true)
            .append(true)
            .open(list_path)?,
    );

    for record in records {
        if write_label_file(labels_dir, record)? {
            stats.labels_written += 1;
        } else {
            stats.labels_existing += 1;
        }
        writeln!(list, "{}", record.image_path)?;
        pb.inc(1);
    }

    list.flush()?;
    pb.finish_with_message(format!("{} split written", name));
    Ok(())
}

/// Create the dataset YAML pointing at both manifests, replacing any previous one
pub fn create_dataset_yaml(output_dirs: &OutputDirs) -> Result<DatasetDescriptor> {
    let descriptor = DatasetDescriptor::single_class(
        output_dirs.train_list.to_string_lossy().into_owned(),
        output_dirs.val_list.to_string_lossy().into_owned(),
    );

    let mut writer = BufWriter::new(File::create(&output_dirs.yaml_path)?);
    writer.write_all(YAML_HEADER.as_bytes())?;
    serde_yaml::to_writer(&mut writer, &descriptor)?;
    writer.flush()?;

    info!("Dataset YAML written to {}", output_dirs.yaml_path.display());
    Ok(descriptor)
}
