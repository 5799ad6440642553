use clap::Parser;
use log::error;
use std::process;

use logodet2yolo::config::{ReorganizeArgs, ReorganizeConfig};
use logodet2yolo::reorganize_dataset;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = ReorganizeArgs::parse();

    if !args.data.is_dir() {
        error!("The specified data directory does not exist: {}", args.data.display());
        process::exit(1);
    }

    if let Err(e) = reorganize_dataset(&ReorganizeConfig::from(&args)) {
        error!("Failed to reorganize dataset: {}", e);
        process::exit(1);
    }
}
