use clap::Parser;
use log::{error, info};
use std::process;

use logodet2yolo::config::{SynthArgs, SynthConfig};
use logodet2yolo::generate_synthetic_dataset;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = SynthArgs::parse();

    info!("Generating synthetic logo composites...");
    if let Err(e) = generate_synthetic_dataset(&SynthConfig::from(&args)) {
        error!("Failed to generate synthetic dataset: {}", e);
        process::exit(1);
    }
}
