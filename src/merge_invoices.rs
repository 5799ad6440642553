use clap::Parser;
use log::error;
use std::process;

use logodet2yolo::config::{MergeArgs, MergeConfig};
use logodet2yolo::merge_invoices;

fn main() {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = MergeArgs::parse();

    if let Err(e) = merge_invoices(&MergeConfig::from(&args)) {
        error!("Failed to merge invoices: {}", e);
        process::exit(1);
    }
}
