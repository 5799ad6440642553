use indicatif::{ProgressBar, ProgressStyle};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::fs;
use std::path::{Path, PathBuf};

const MIN_WORKERS: usize = 4;
const MAX_WORKERS: usize = 32;

/// Flat label filename for an absolute image path.
///
/// Path separators become `__` and drive colons become `_`, so labels of
/// images that share a basename in different directories do not collide.
pub fn mangle_label_name(image_path: &str) -> String {
    format!("{}.txt", image_path.replace(':', "_").replace('/', "__"))
}

/// Parser pool size: one core left free, clamped to `[4, 32]`
pub fn default_worker_count() -> usize {
    num_cpus::get()
        .saturating_sub(1)
        .clamp(MIN_WORKERS, MAX_WORKERS)
}

/// Build the thread pool used for annotation parsing
pub fn create_parse_thread_pool(workers: Option<usize>) -> Result<ThreadPool, rayon::ThreadPoolBuildError> {
    let num_threads = workers.filter(|&n| n > 0).unwrap_or_else(default_worker_count);
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("voc-parse-{}", i))
        .build()
}

/// Create a progress bar with the given length and label
pub fn create_progress_bar(len: u64, label: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} [{}] [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} ({{eta}})",
                label
            ))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Create a directory and its parents if missing, keeping existing contents
pub fn ensure_directory(path: &Path) -> std::io::Result<PathBuf> {
    fs::create_dir_all(path)?;
    Ok(path.to_path_buf())
}

/// Absolute form of a path that may not exist yet
pub fn absolute_path(path: &Path) -> std::io::Result<PathBuf> {
    if path.exists() {
        fs::canonicalize(path)
    } else if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Read a manifest, skipping blank lines
pub fn read_path_list(path: &Path) -> std::io::Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}
