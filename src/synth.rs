//! Synthetic training samples: logo cutouts composited onto invoice pages.
//!
//! Every random decision draws from one seeded generator, so a given seed and
//! set of source images always yields the same samples under the same names.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage, RgbImage};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use crate::config::SynthConfig;
use crate::conversion::convert_to_yolo_format;
use crate::error::SynthError;
use crate::orientation::{list_folder, open_upright};
use crate::types::NormalizedBox;
use crate::utils::{create_progress_bar, ensure_directory};

const LOGO_WIDTH_RANGE: (f64, f64) = (0.10, 0.22);
const LEFT_X_RANGE: (f64, f64) = (0.01, 0.22);
const CENTER_X_RANGE: (f64, f64) = (0.35, 0.75);
const TOP_Y_RANGE: (f64, f64) = (0.01, 0.18);
const CENTER_PLACEMENT_P: f64 = 0.15;
const AUTOCONTRAST_P: f64 = 0.5;
const LOGO_BLUR_P: f64 = 0.25;
const LOGO_BLUR_SIGMA: (f32, f32) = (0.3, 1.2);
const SINGLE_LOGO_P: f64 = 0.85;
const PAGE_BLUR_P: f64 = 0.6;
const PAGE_BLUR_SIGMA: (f32, f32) = (0.2, 0.8);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SynthReport {
    pub train: usize,
    pub val: usize,
}

/// Every decodable image in `folder`, upright and as RGBA
pub fn load_rgba_folder(folder: &Path) -> Result<Vec<RgbaImage>, SynthError> {
    let images: Vec<RgbaImage> = list_folder(folder)
        .into_iter()
        .filter_map(|path| match open_upright(&path) {
            Ok(img) => Some(img.to_rgba8()),
            Err(e) => {
                debug!("Skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect();
    if images.is_empty() {
        return Err(SynthError::NoImages(folder.to_path_buf()));
    }
    Ok(images)
}

/// Stretch each color channel to the full range; alpha is left alone
pub fn autocontrast(img: &mut RgbaImage) {
    let mut lo = [u8::MAX; 3];
    let mut hi = [u8::MIN; 3];
    for pixel in img.pixels() {
        for c in 0..3 {
            lo[c] = lo[c].min(pixel[c]);
            hi[c] = hi[c].max(pixel[c]);
        }
    }
    for pixel in img.pixels_mut() {
        for c in 0..3 {
            if hi[c] > lo[c] {
                let span = (hi[c] - lo[c]) as u32;
                pixel[c] = ((pixel[c] - lo[c]) as u32 * 255 / span) as u8;
            }
        }
    }
}

// Blurs color only; the cutout's transparency mask is kept sharp
fn blur_keep_alpha(img: &RgbaImage, sigma: f32) -> RgbaImage {
    let mut blurred = imageops::blur(img, sigma);
    for (dst, src) in blurred.pixels_mut().zip(img.pixels()) {
        dst[3] = src[3];
    }
    blurred
}

/// Scale a logo relative to the canvas width and apply random color jitter
pub fn random_logo_transform(logo: &RgbaImage, canvas_width: u32, rng: &mut StdRng) -> RgbaImage {
    let scale = rng.gen_range(LOGO_WIDTH_RANGE.0..LOGO_WIDTH_RANGE.1);
    let w_target = ((canvas_width as f64 * scale) as u32).max(1);
    let ratio = w_target as f64 / logo.width().max(1) as f64;
    let h_target = ((logo.height() as f64 * ratio) as u32).max(1);
    let mut resized = imageops::resize(logo, w_target, h_target, FilterType::Lanczos3);

    if rng.gen::<f64>() < AUTOCONTRAST_P {
        autocontrast(&mut resized);
    }
    if rng.gen::<f64>() < LOGO_BLUR_P {
        let sigma = rng.gen_range(LOGO_BLUR_SIGMA.0..LOGO_BLUR_SIGMA.1);
        resized = blur_keep_alpha(&resized, sigma);
    }
    resized
}

/// Composite a logo near the top of the page and return its YOLO box.
///
/// Logos land mostly top-left, sometimes top-center/right.
pub fn place_logo(canvas: &mut RgbaImage, logo: &RgbaImage, rng: &mut StdRng) -> NormalizedBox {
    let cw = canvas.width() as f64;
    let ch = canvas.height() as f64;
    let mut x = (rng.gen_range(LEFT_X_RANGE.0..LEFT_X_RANGE.1) * cw) as i64;
    let y = (rng.gen_range(TOP_Y_RANGE.0..TOP_Y_RANGE.1) * ch) as i64;
    if rng.gen::<f64>() < CENTER_PLACEMENT_P {
        x = (rng.gen_range(CENTER_X_RANGE.0..CENTER_X_RANGE.1) * cw) as i64;
    }
    imageops::overlay(canvas, logo, x, y);

    let lw = logo.width() as f64;
    let lh = logo.height() as f64;
    NormalizedBox::logo(
        (x as f64 + lw / 2.0) / cw,
        (y as f64 + lh / 2.0) / ch,
        lw / cw,
        lh / ch,
    )
}

/// Build one sample from a background already sized to the canvas
pub fn compose_sample(
    background: &RgbaImage,
    logos: &[RgbaImage],
    rng: &mut StdRng,
) -> (RgbImage, Vec<NormalizedBox>) {
    let mut canvas = RgbaImage::from_pixel(
        background.width(),
        background.height(),
        Rgba([255, 255, 255, 255]),
    );
    imageops::overlay(&mut canvas, background, 0, 0);

    let n_logos = if rng.gen::<f64>() < SINGLE_LOGO_P { 1 } else { 2 };
    let mut boxes = Vec::with_capacity(n_logos);
    for _ in 0..n_logos {
        if let Some(logo) = logos.choose(rng) {
            let transformed = random_logo_transform(logo, canvas.width(), rng);
            boxes.push(place_logo(&mut canvas, &transformed, rng));
        }
    }

    // light page noise
    if rng.gen::<f64>() < PAGE_BLUR_P {
        let sigma = rng.gen_range(PAGE_BLUR_SIGMA.0..PAGE_BLUR_SIGMA.1);
        canvas = imageops::blur(&canvas, sigma);
    }

    (image::DynamicImage::ImageRgba8(canvas).to_rgb8(), boxes)
}

// 12 hex chars of a v4 UUID drawn from the seeded generator
fn sample_id(rng: &mut StdRng) -> String {
    let uuid = uuid::Builder::from_random_bytes(rng.gen()).into_uuid();
    uuid.simple().to_string()[..12].to_string()
}

fn save_jpeg(img: &RgbImage, path: &Path, quality: u8) -> Result<(), SynthError> {
    let mut writer = BufWriter::new(File::create(path)?);
    let encoder = JpegEncoder::new_with_quality(&mut writer, quality);
    img.write_with_encoder(encoder)?;
    Ok(())
}

/// Generate `n` samples into `images/<split>` and `labels/<split>` under the output dir
pub fn make_split(
    split: &str,
    n: usize,
    backgrounds: &[RgbaImage],
    logos: &[RgbaImage],
    config: &SynthConfig,
    rng: &mut StdRng,
) -> Result<usize, SynthError> {
    let images_dir = ensure_directory(&config.out_dir.join("images").join(split))?;
    let labels_dir = ensure_directory(&config.out_dir.join("labels").join(split))?;
    let pb = create_progress_bar(n as u64, &format!("gen {}", split));

    let mut written = 0;
    for _ in 0..n {
        let Some(background) = backgrounds.choose(rng) else {
            break;
        };
        let (img, boxes) = compose_sample(background, logos, rng);

        let uid = sample_id(rng);
        save_jpeg(&img, &images_dir.join(format!("{}.jpg", uid)), config.jpeg_quality)?;
        fs::write(
            labels_dir.join(format!("{}.txt", uid)),
            convert_to_yolo_format(&boxes),
        )?;
        written += 1;
        pb.inc(1);
    }

    pb.finish_with_message(format!("{} samples generated", split));
    Ok(written)
}

/// Generate the synthetic train and val splits
pub fn generate_synthetic_dataset(config: &SynthConfig) -> Result<SynthReport, SynthError> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    ensure_directory(&config.out_dir)?;

    let logos = load_rgba_folder(&config.logo_dir)?;
    let backgrounds: Vec<RgbaImage> = load_rgba_folder(&config.background_dir)?
        .iter()
        .map(|bg| {
            imageops::resize(
                bg,
                config.canvas_size,
                config.canvas_size,
                FilterType::CatmullRom,
            )
        })
        .collect();
    info!(
        "Loaded {} logos and {} backgrounds",
        logos.len(),
        backgrounds.len()
    );

    let train = make_split("train", config.n_train, &backgrounds, &logos, config, &mut rng)?;
    let val = make_split("val", config.n_val, &backgrounds, &logos, config, &mut rng)?;
    info!("Generated {} train and {} val samples in {}", train, val, config.out_dir.display());

    Ok(SynthReport { train, val })
}
