//! LogoDet-3K to YOLO dataset tooling
//!
//! This library converts Pascal-VOC XML annotations into a single-class YOLO
//! dataset built from path lists, and provides the helpers around it: merging
//! hand-annotated invoices, reorganizing the dataset into a copied layout,
//! generating synthetic composites and checking EXIF orientation.

pub mod config;
pub mod conversion;
pub mod dataset;
pub mod error;
pub mod invoices;
pub mod io;
pub mod orientation;
pub mod reorganize;
pub mod synth;
pub mod types;
pub mod utils;
pub mod voc;

// Re-export commonly used types and functions
pub use config::{Args, ConvertConfig};
pub use conversion::{calculate_bounding_box, parse_annotation};
pub use dataset::{process_dataset, ConversionReport};
pub use error::{ConvertError, SkipReason, SynthError};
pub use types::{AnnotationRecord, DatasetSplit, NormalizedBox, OutputDirs, ProcessingStats};

pub use invoices::{merge_invoices, MergeReport};
pub use reorganize::{reorganize_dataset, ReorganizeReport};
pub use synth::{generate_synthetic_dataset, SynthReport};
