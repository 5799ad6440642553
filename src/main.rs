use clap::Parser;

use log::{error, info};
use std::process;

use logodet2yolo::{process_dataset, Args, ConvertConfig};

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    if !args.source.is_dir() {
        error!(
            "The specified source directory does not exist: {}",
            args.source.display()
        );
        process::exit(1);
    }

    info!("Starting the conversion process...");

    let config = ConvertConfig::from(&args);
    match process_dataset(&config) {
        Ok(report) => info!(
            "Conversion complete. YAML: {}",
            report.output_dirs.yaml_path.display()
        ),
        Err(e) => {
            error!("Failed to process dataset: {}", e);
            process::exit(1);
        }
    }
}
