use log::info;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;

use crate::config::ConvertConfig;
use crate::error::{ConvertError, Result};
use crate::io::{
    create_dataset_yaml, discover_xml_files, parse_annotation_files, setup_output_directories,
    write_split,
};
use crate::types::{AnnotationRecord, DatasetSplit, OutputDirs, ParseOutcome, ProcessingStats};
use crate::utils::create_parse_thread_pool;

/// What a finished conversion produced
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub output_dirs: OutputDirs,
    pub split: DatasetSplit,
    pub stats: ProcessingStats,
}

/// Keep the first record seen for each image path, preserving order
pub fn dedupe_records(records: Vec<AnnotationRecord>) -> (Vec<AnnotationRecord>, usize) {
    let mut seen = HashSet::with_capacity(records.len());
    let total = records.len();
    let unique: Vec<_> = records
        .into_iter()
        .filter(|record| seen.insert(record.image_path.clone()))
        .collect();
    let dropped = total - unique.len();
    (unique, dropped)
}

/// Number of validation records: the floored fraction, at least one, at most all
pub fn validation_count(total: usize, val_fraction: f64) -> usize {
    ((total as f64 * val_fraction).floor() as usize)
        .max(1)
        .min(total)
}

/// Shuffle with a seeded generator and split off the validation records
pub fn split_records(
    mut records: Vec<AnnotationRecord>,
    val_fraction: f64,
    seed: u64,
) -> DatasetSplit {
    let mut rng = StdRng::seed_from_u64(seed);
    records.shuffle(&mut rng);

    let n_val = validation_count(records.len(), val_fraction);
    let train = records.split_off(n_val);

    DatasetSplit {
        train,
        val: records,
    }
}

/// Collect the parsed records and tally every outcome
pub fn collect_records(outcomes: Vec<ParseOutcome>, stats: &mut ProcessingStats) -> Vec<AnnotationRecord> {
    let mut records = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        stats.record_outcome(&outcome);
        if let Ok(record) = outcome.result {
            records.push(record);
        }
    }
    records
}

/// Main conversion pipeline.
///
/// Nothing is written until at least one valid record has been parsed, so
/// both fatal conditions leave the output directory untouched.
pub fn process_dataset(config: &ConvertConfig) -> Result<ConversionReport> {
    // NaN fails both comparisons
    if !(config.val_fraction > 0.0 && config.val_fraction < 1.0) {
        return Err(ConvertError::InvalidValFraction(config.val_fraction));
    }

    let mut stats = ProcessingStats::new();

    let xml_files = discover_xml_files(&config.source);
    stats.xml_files_found = xml_files.len();
    if xml_files.is_empty() {
        return Err(ConvertError::NoInput(config.source.clone()));
    }
    info!("Found {} XML files under {}", xml_files.len(), config.source.display());

    let pool = create_parse_thread_pool(config.workers)?;
    info!("Parsing with {} workers...", pool.current_num_threads());
    let outcomes = parse_annotation_files(&xml_files, &pool);

    let records = collect_records(outcomes, &mut stats);
    if records.is_empty() {
        stats.print_summary();
        return Err(ConvertError::NoValidRecords(config.source.clone()));
    }

    let (unique, duplicates) = dedupe_records(records);
    stats.duplicates_dropped = duplicates;

    let split = split_records(unique, config.val_fraction, config.seed);

    let output_dirs = setup_output_directories(config)?;
    write_split(
        "Train",
        &split.train,
        &output_dirs.train_list,
        &output_dirs.labels_dir,
        &mut stats,
    )?;
    write_split(
        "Val",
        &split.val,
        &output_dirs.val_list,
        &output_dirs.labels_dir,
        &mut stats,
    )?;
    create_dataset_yaml(&output_dirs)?;

    stats.print_summary();
    info!(
        "Total images: {} | Train: {} | Val: {}",
        split.total(),
        split.train.len(),
        split.val.len()
    );
    info!(
        "Lists: {} , {}",
        output_dirs.train_list.display(),
        output_dirs.val_list.display()
    );
    info!("Labels dir: {}", output_dirs.labels_dir.display());
    if let Some(example) = split.train.first() {
        info!("Example image path: {}", example.image_path);
    }

    Ok(ConversionReport {
        output_dirs,
        split,
        stats,
    })
}
