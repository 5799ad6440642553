use clap::Parser;
use log::{error, info, warn};

use logodet2yolo::config::ExifArgs;
use logodet2yolo::orientation::{check_folder, OrientationStatus};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ExifArgs::parse();

    for folder in &args.folders {
        info!("Checking: {}", folder.display());
        for (path, status) in check_folder(folder) {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            match status {
                OrientationStatus::Upright => info!("  {} -> OK (no rotation)", name),
                OrientationStatus::NeedsRotation(o) => {
                    warn!("  {} -> EXIF orientation: {} (needs rotation)", name, o)
                }
                OrientationStatus::Error(e) => error!("  {} -> ERROR: {}", name, e),
            }
        }
    }
}
