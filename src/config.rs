use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

pub const DEFAULT_OUT_DIR: &str = "data_logodet_yolo";
pub const DEFAULT_VAL_FRACTION: f64 = 0.10;
pub const DEFAULT_SEED: u64 = 1337;
pub const LABELS_DIR_NAME: &str = "labels_all";
pub const DATASET_YAML_NAME: &str = "logodet.yaml";
pub const TRAIN_LIST_NAME: &str = "train.txt";
pub const VAL_LIST_NAME: &str = "val.txt";
pub const DEFAULT_INVOICES_DIR: &str = "invoices_raw";
pub const DEFAULT_LOGOS_DIR: &str = "logos";

/// Converts a LogoDet-3K style tree of Pascal-VOC XML files into a YOLO dataset.
///
/// Images are not copied: labels are stored flat under `labels_all/` and the
/// splits are plain lists of absolute image paths.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Root folder containing the LogoDet-3K categories
    #[arg(short = 's', long = "source")]
    pub source: PathBuf,

    /// Output directory for labels, lists and the dataset YAML
    #[arg(short = 'o', long = "out", default_value = DEFAULT_OUT_DIR)]
    pub out: PathBuf,

    /// Fraction of images held out for validation
    #[arg(long = "val", default_value_t = DEFAULT_VAL_FRACTION, value_parser = validate_fraction)]
    pub val: f64,

    /// Seed for the train/val shuffle
    #[arg(long = "seed", default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Number of parser threads (defaults to the available cores minus one, between 4 and 32)
    #[arg(long = "workers")]
    pub workers: Option<usize>,
}

/// Everything a conversion run needs; no process-wide state is consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertConfig {
    pub source: PathBuf,
    pub out_dir: PathBuf,
    pub val_fraction: f64,
    pub seed: u64,
    pub workers: Option<usize>,
    pub labels_dir_name: String,
    pub yaml_name: String,
}

impl ConvertConfig {
    pub fn new(source: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            out_dir: out_dir.into(),
            ..Self::default()
        }
    }
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("."),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            val_fraction: DEFAULT_VAL_FRACTION,
            seed: DEFAULT_SEED,
            workers: None,
            labels_dir_name: LABELS_DIR_NAME.to_string(),
            yaml_name: DATASET_YAML_NAME.to_string(),
        }
    }
}

impl From<&Args> for ConvertConfig {
    fn from(args: &Args) -> Self {
        Self {
            source: args.source.clone(),
            out_dir: args.out.clone(),
            val_fraction: args.val,
            seed: args.seed,
            workers: args.workers,
            ..Self::default()
        }
    }
}

/// Merges hand-annotated invoice images into an existing converter output.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct MergeArgs {
    /// Folder with invoice `.jpg` files and their YOLO `.txt` labels
    #[arg(long = "invoices", default_value = DEFAULT_INVOICES_DIR)]
    pub invoices: PathBuf,

    /// Converter output directory to merge into
    #[arg(long = "data", default_value = DEFAULT_OUT_DIR)]
    pub data: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergeConfig {
    pub invoices_dir: PathBuf,
    pub data_dir: PathBuf,
    pub labels_dir_name: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            invoices_dir: PathBuf::from(DEFAULT_INVOICES_DIR),
            data_dir: PathBuf::from(DEFAULT_OUT_DIR),
            labels_dir_name: LABELS_DIR_NAME.to_string(),
        }
    }
}

impl From<&MergeArgs> for MergeConfig {
    fn from(args: &MergeArgs) -> Self {
        Self {
            invoices_dir: args.invoices.clone(),
            data_dir: args.data.clone(),
            ..Self::default()
        }
    }
}

/// Copies manifest members into an `images/{train,val}` + `labels/{train,val}` layout.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct ReorganizeArgs {
    /// Converter output directory holding train.txt, val.txt and labels_all/
    #[arg(long = "data", default_value = DEFAULT_OUT_DIR)]
    pub data: PathBuf,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReorganizeConfig {
    pub data_dir: PathBuf,
    pub labels_dir_name: String,
}

impl Default for ReorganizeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_OUT_DIR),
            labels_dir_name: LABELS_DIR_NAME.to_string(),
        }
    }
}

impl From<&ReorganizeArgs> for ReorganizeConfig {
    fn from(args: &ReorganizeArgs) -> Self {
        Self {
            data_dir: args.data.clone(),
            ..Self::default()
        }
    }
}

/// Generates synthetic training images by pasting logos onto invoice backgrounds.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct SynthArgs {
    /// Folder of logo cutouts (transparency is respected)
    #[arg(long = "logos", default_value = DEFAULT_LOGOS_DIR)]
    pub logos: PathBuf,

    /// Folder of background pages
    #[arg(long = "backgrounds", default_value = DEFAULT_INVOICES_DIR)]
    pub backgrounds: PathBuf,

    /// Output directory; images/ and labels/ are created below it
    #[arg(long = "out", default_value = "data")]
    pub out: PathBuf,

    /// Number of training samples
    #[arg(long = "n_train", default_value_t = 2000)]
    pub n_train: usize,

    /// Number of validation samples
    #[arg(long = "n_val", default_value_t = 300)]
    pub n_val: usize,

    /// Side length of the square canvas in pixels
    #[arg(long = "canvas", default_value_t = 1600, value_parser = clap::value_parser!(u32).range(16..))]
    pub canvas: u32,

    /// Seed for every random choice
    #[arg(long = "seed", default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SynthConfig {
    pub logo_dir: PathBuf,
    pub background_dir: PathBuf,
    pub out_dir: PathBuf,
    pub n_train: usize,
    pub n_val: usize,
    pub canvas_size: u32,
    pub seed: u64,
    pub jpeg_quality: u8,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            logo_dir: PathBuf::from(DEFAULT_LOGOS_DIR),
            background_dir: PathBuf::from(DEFAULT_INVOICES_DIR),
            out_dir: PathBuf::from("data"),
            n_train: 2000,
            n_val: 300,
            canvas_size: 1600,
            seed: DEFAULT_SEED,
            jpeg_quality: 92,
        }
    }
}

impl From<&SynthArgs> for SynthConfig {
    fn from(args: &SynthArgs) -> Self {
        Self {
            logo_dir: args.logos.clone(),
            background_dir: args.backgrounds.clone(),
            out_dir: args.out.clone(),
            n_train: args.n_train,
            n_val: args.n_val,
            canvas_size: args.canvas,
            seed: args.seed,
            ..Self::default()
        }
    }
}

/// Reports images whose EXIF orientation would need a rotation.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct ExifArgs {
    /// Folders to check
    #[arg(default_values = [DEFAULT_LOGOS_DIR, DEFAULT_INVOICES_DIR])]
    pub folders: Vec<PathBuf>,
}

// The validation fraction must leave both splits a share of the data
pub fn validate_fraction(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if val > 0.0 && val < 1.0 => Ok(val),
        _ => Err("fraction must be strictly between 0.0 and 1.0".to_string()),
    }
}
