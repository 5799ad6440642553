use std::fs;

use image::{Rgba, RgbaImage};
use logodet2yolo::config::validate_fraction;
use logodet2yolo::conversion::{convert_to_yolo_format, resolve_image_path};
use logodet2yolo::dataset::{dedupe_records, split_records, validation_count};
use logodet2yolo::invoices::normalize_invoice_labels;
use logodet2yolo::orientation::apply_orientation;
use logodet2yolo::reorganize::sequential_stem;
use logodet2yolo::synth::autocontrast;
use logodet2yolo::utils::mangle_label_name;
use logodet2yolo::voc::VocAnnotation;
use logodet2yolo::{calculate_bounding_box, AnnotationRecord, NormalizedBox, SkipReason};

fn record(path: &str) -> AnnotationRecord {
    AnnotationRecord {
        image_path: path.to_string(),
        boxes: vec![NormalizedBox::logo(0.5, 0.5, 0.1, 0.1)],
    }
}

#[test]
fn test_validate_fraction() {
    assert!(validate_fraction("0.1").is_ok());
    assert!(validate_fraction("0.99").is_ok());
    assert!(validate_fraction("0.0").is_err());
    assert!(validate_fraction("1.0").is_err());
    assert!(validate_fraction("-0.1").is_err());
    assert!(validate_fraction("abc").is_err());
}

#[test]
fn test_calculate_bounding_box() {
    let bbox = calculate_bounding_box((10.0, 10.0, 20.0, 20.0), 100, 100);

    assert_eq!(bbox.class_id, 0);
    assert_eq!(bbox.cx, 0.15);
    assert_eq!(bbox.cy, 0.15);
    assert_eq!(bbox.w, 0.1);
    assert_eq!(bbox.h, 0.1);
}

#[test]
fn test_bounding_box_is_not_clamped() {
    let bbox = calculate_bounding_box((-10.0, 0.0, 110.0, 50.0), 100, 100);

    assert_eq!(bbox.cx, 0.5);
    assert_eq!(bbox.cy, 0.25);
    assert_eq!(bbox.w, 1.2);
    assert_eq!(bbox.h, 0.5);
}

#[test]
fn test_convert_to_yolo_format() {
    let boxes = vec![
        calculate_bounding_box((10.0, 10.0, 20.0, 20.0), 100, 100),
        calculate_bounding_box((0.0, 0.0, 50.0, 25.0), 200, 100),
    ];

    assert_eq!(
        convert_to_yolo_format(&boxes),
        "0 0.150000 0.150000 0.100000 0.100000\n0 0.125000 0.125000 0.250000 0.250000\n"
    );
}

#[test]
fn test_mangle_label_name() {
    assert_eq!(
        mangle_label_name("/data/LogoDet-3K/Food/Coca/1.jpg"),
        "__data__LogoDet-3K__Food__Coca__1.jpg.txt"
    );
    assert_eq!(mangle_label_name("C:/imgs/a.png"), "C___imgs__a.png.txt");
}

#[test]
fn test_voc_parsing() {
    let xml = r#"<?xml version="1.0" encoding="utf-8"?>
<annotation>
        <folder>Coca</folder>
        <filename>1.jpg</filename>
        <size><width>500</width><height>250</height><depth>3</depth></size>
        <segmented>0</segmented>
        <object>
            <name>coca</name>
            <difficult>0</difficult>
            <bndbox><xmin>50</xmin><ymin>25</ymin><xmax>150.5</xmax><ymax>75</ymax></bndbox>
        </object>
        <object>
            <name>coca</name>
            <bndbox><xmin>10</xmin><ymin>10</ymin><ymax>20</ymax></bndbox>
        </object>
    </annotation>"#;

    let annotation = VocAnnotation::from_xml(xml).unwrap();

    assert_eq!(annotation.filename_hint(), Some("1.jpg"));
    assert_eq!(annotation.dimensions().unwrap(), (500, 250));
    assert_eq!(annotation.objects.len(), 2);
    assert_eq!(annotation.objects[0].corners(), Some((50.0, 25.0, 150.5, 75.0)));
    // missing xmax
    assert_eq!(annotation.objects[1].corners(), None);
}

#[test]
fn test_voc_repeated_elements_use_first() {
    let xml = "\u{feff}<?xml version=\"1.0\" encoding=\"utf-8\"?>
        <annotation>
            <filename>first.jpg</filename>
            <size><width>300</width><height>200</height></size>
            <filename>second.jpg</filename>
            <size><width>1</width><height>1</height></size>
            <object>
                <bndbox><xmin>0</xmin><ymin>0</ymin><xmax>30</xmax><ymax>20</ymax></bndbox>
                <bndbox><xmin>5</xmin><ymin>5</ymin><xmax>6</xmax><ymax>6</ymax></bndbox>
            </object>
        </annotation>";

    let annotation = VocAnnotation::from_xml(xml).unwrap();

    assert_eq!(annotation.filename_hint(), Some("first.jpg"));
    assert_eq!(annotation.dimensions().unwrap(), (300, 200));
    assert_eq!(annotation.objects.len(), 1);
    assert_eq!(annotation.objects[0].corners(), Some((0.0, 0.0, 30.0, 20.0)));
}

#[test]
fn test_voc_invalid_size() {
    let fractional = VocAnnotation::from_xml(
        "<annotation><size><width>500.0</width><height>250</height></size></annotation>",
    )
    .unwrap();
    assert!(matches!(
        fractional.dimensions(),
        Err(SkipReason::MalformedXml(_))
    ));

    let zero = VocAnnotation::from_xml(
        "<annotation><size><width>0</width><height>250</height></size></annotation>",
    )
    .unwrap();
    assert_eq!(
        zero.dimensions(),
        Err(SkipReason::InvalidSize {
            width: 0,
            height: 250
        })
    );

    let missing = VocAnnotation::from_xml("<annotation><filename>a.jpg</filename></annotation>")
        .unwrap();
    assert!(missing.dimensions().is_err());
}

#[test]
fn test_voc_malformed_document() {
    assert!(matches!(
        VocAnnotation::from_xml("<annotation><size><width>1</height></size></annotation>"),
        Err(SkipReason::MalformedXml(_))
    ));
}

#[test]
fn test_resolve_image_path() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path();
    let xml_path = dir.join("7.xml");
    fs::write(&xml_path, "<annotation/>").unwrap();

    // Nothing on disk yet
    assert_eq!(resolve_image_path(&xml_path, Some("7.jpg")), None);

    // Suffix fallback prefers jpg over png
    fs::write(dir.join("7.png"), b"png").unwrap();
    assert_eq!(resolve_image_path(&xml_path, None), Some(dir.join("7.png")));
    fs::write(dir.join("7.jpg"), b"jpg").unwrap();
    assert_eq!(resolve_image_path(&xml_path, None), Some(dir.join("7.jpg")));

    // The hint wins and is reduced to its basename
    fs::write(dir.join("photo.jpeg"), b"jpeg").unwrap();
    assert_eq!(
        resolve_image_path(&xml_path, Some("/elsewhere/photo.jpeg")),
        Some(dir.join("photo.jpeg"))
    );

    // A stale hint falls back to the suffix search
    assert_eq!(
        resolve_image_path(&xml_path, Some("gone.jpg")),
        Some(dir.join("7.jpg"))
    );
}

#[test]
fn test_validation_count() {
    assert_eq!(validation_count(10, 0.10), 1);
    assert_eq!(validation_count(3, 0.10), 1);
    assert_eq!(validation_count(100, 0.25), 25);
    assert_eq!(validation_count(19, 0.10), 1);
    assert_eq!(validation_count(1, 0.5), 1);
    assert_eq!(validation_count(0, 0.5), 0);
}

#[test]
fn test_split_records() {
    let records: Vec<_> = (0..10).map(|i| record(&format!("/img/{}.jpg", i))).collect();

    let split = split_records(records.clone(), 0.10, 1337);
    assert_eq!(split.val.len(), 1);
    assert_eq!(split.train.len(), 9);
    assert_eq!(split.total(), 10);

    let again = split_records(records, 0.10, 1337);
    assert_eq!(split.val, again.val);
    assert_eq!(split.train, again.train);
}

#[test]
fn test_dedupe_records() {
    let mut first = record("/img/a.jpg");
    first.boxes[0].cx = 0.25;
    let records = vec![
        first.clone(),
        record("/img/b.jpg"),
        record("/img/a.jpg"),
        record("/img/c.jpg"),
        record("/img/b.jpg"),
    ];

    let (unique, dropped) = dedupe_records(records);

    assert_eq!(dropped, 2);
    let paths: Vec<_> = unique.iter().map(|r| r.image_path.as_str()).collect();
    assert_eq!(paths, vec!["/img/a.jpg", "/img/b.jpg", "/img/c.jpg"]);
    assert_eq!(unique[0], first);
}

#[test]
fn test_normalize_invoice_labels() {
    let content = "3 0.5 0.5 0.2 0.2\n\nbad line\n1 0.1 0.2 0.3\n0 0.9 0.9 0.1 0.1 extra\n15 0.25 0.25 0.5 0.5";

    assert_eq!(
        normalize_invoice_labels(content),
        vec!["0 0.5 0.5 0.2 0.2", "0 0.25 0.25 0.5 0.5"]
    );
}

#[test]
fn test_sequential_stem() {
    assert_eq!(sequential_stem("train", 0), "train_000000");
    assert_eq!(sequential_stem("val", 1234), "val_001234");
}

#[test]
fn test_apply_orientation() {
    let img = image::DynamicImage::ImageRgba8(RgbaImage::new(4, 2));

    let rotated = apply_orientation(img.clone(), 6);
    assert_eq!((rotated.width(), rotated.height()), (2, 4));

    let transposed = apply_orientation(img.clone(), 5);
    assert_eq!((transposed.width(), transposed.height()), (2, 4));

    let flipped = apply_orientation(img.clone(), 3);
    assert_eq!((flipped.width(), flipped.height()), (4, 2));

    let untouched = apply_orientation(img, 1);
    assert_eq!((untouched.width(), untouched.height()), (4, 2));
}

#[test]
fn test_apply_orientation_moves_pixels() {
    let mut img = RgbaImage::new(2, 1);
    img.put_pixel(0, 0, Rgba([255, 0, 0, 255]));

    // mirrored horizontally: the red pixel moves to the right
    let mirrored = apply_orientation(image::DynamicImage::ImageRgba8(img), 2).to_rgba8();
    assert_eq!(mirrored.get_pixel(1, 0), &Rgba([255, 0, 0, 255]));
    assert_eq!(mirrored.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
}

#[test]
fn test_autocontrast_keeps_alpha() {
    let mut img = RgbaImage::new(2, 1);
    img.put_pixel(0, 0, Rgba([100, 50, 7, 10]));
    img.put_pixel(1, 0, Rgba([150, 50, 9, 200]));

    autocontrast(&mut img);

    assert_eq!(img.get_pixel(0, 0), &Rgba([0, 50, 0, 10]));
    assert_eq!(img.get_pixel(1, 0), &Rgba([255, 50, 255, 200]));
}

#[test]
fn test_label_display_matches_file_format() {
    let bbox = NormalizedBox::logo(0.1234567, 1.5, -0.25, 0.0);
    assert_eq!(bbox.to_string(), "0 0.123457 1.500000 -0.250000 0.000000");
}
