//! End-to-end tests for the extraction, organizing and audit stages

use cranium_atlas::audit::Auditor;
use cranium_atlas::classify::{ImageClassifier, SizeHeuristic, StaticMapping};
use cranium_atlas::codec;
use cranium_atlas::extract::Extractor;
use cranium_atlas::pdf::{
    DocumentSource, EmbeddedImage, ImageEncoding, MemoryDocument, MemoryPage, PdfReader,
};
use cranium_atlas::{Bone, Category, Error};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use image::{DynamicImage, RgbImage};
use lopdf::{dictionary, Document, Object, ObjectId, Stream};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;

fn png_image(width: u32, height: u32, shade: u8) -> EmbeddedImage {
    let pixels = DynamicImage::ImageRgb8(RgbImage::from_pixel(
        width,
        height,
        image::Rgb([shade, 0, 255 - shade]),
    ));
    EmbeddedImage {
        width,
        height,
        data: codec::encode_png(&pixels, false).unwrap(),
        encoding: ImageEncoding::Container,
        samples: None,
    }
}

fn page(images: Vec<EmbeddedImage>, text: &str) -> MemoryPage {
    MemoryPage {
        images,
        text: text.to_string(),
    }
}

fn file_names(dir: &Path) -> BTreeSet<String> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

/// Flate-compressed RGB image XObject filled with one color
fn image_stream(width: i64, height: i64, shade: u8) -> Stream {
    let samples = vec![shade; (width * height * 3) as usize];
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&samples).unwrap();
    let content = encoder.finish().unwrap();

    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Filter" => "FlateDecode",
        },
        content,
    )
}

/// Flate RGB image with PNG `Up` row predictors; row `r` has shade `r`
fn predicted_image_stream(width: i64, height: i64) -> Stream {
    let mut rows = Vec::new();
    for row in 0..height {
        rows.push(2u8);
        let delta = if row == 0 { 0 } else { 1 };
        rows.extend(std::iter::repeat(delta).take((width * 3) as usize));
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&rows).unwrap();
    let content = encoder.finish().unwrap();

    Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8_i64,
            "Filter" => "FlateDecode",
            "DecodeParms" => dictionary! {
                "Predictor" => 15_i64,
                "Colors" => 3_i64,
                "BitsPerComponent" => 8_i64,
                "Columns" => width,
            },
        },
        content,
    )
}

/// Build a PDF whose pages carry the given image streams
fn build_pdf(pages: Vec<Vec<Stream>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut kids: Vec<Object> = Vec::new();
    for images in pages {
        let mut xobjects = lopdf::Dictionary::new();
        for (idx, stream) in images.into_iter().enumerate() {
            let id: ObjectId = doc.add_object(stream);
            xobjects.set(format!("Im{}", idx + 1), id);
        }
        let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => xobjects },
            "MediaBox" => vec![0_i64.into(), 0_i64.into(), 595_i64.into(), 842_i64.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).unwrap();
    bytes
}

#[test]
fn test_three_page_document_keeps_one_image() {
    let doc = MemoryDocument::new(vec![
        page(vec![png_image(50, 50, 1), png_image(450, 520, 2)], ""),
        page(vec![png_image(450, 520, 2)], ""),
        page(Vec::new(), ""),
    ]);
    let out = tempfile::tempdir().unwrap();

    let summary = Extractor::default().run(&doc, out.path()).unwrap();

    assert_eq!(
        file_names(&out.path().join("raw")),
        BTreeSet::from(["page_1_img_2.png".to_string()])
    );
    assert_eq!(summary.undersized, 1);
    assert_eq!(summary.duplicates, 1);
    assert_eq!(summary.failed, 0);
}

#[test]
fn test_three_page_pdf_keeps_one_image() {
    let pdf = build_pdf(vec![
        vec![image_stream(50, 50, 10), image_stream(450, 520, 200)],
        vec![image_stream(450, 520, 200)],
        Vec::new(),
    ]);
    let reader = PdfReader::open_bytes(&pdf).unwrap();
    assert_eq!(reader.page_count(), 3);
    assert_eq!(reader.page_images(1).unwrap().len(), 2);

    let out = tempfile::tempdir().unwrap();
    Extractor::default().run(&reader, out.path()).unwrap();

    let raw = out.path().join("raw");
    assert_eq!(
        file_names(&raw),
        BTreeSet::from(["page_1_img_2.png".to_string()])
    );
    let written = image::open(raw.join("page_1_img_2.png")).unwrap().to_rgb8();
    assert_eq!(written.dimensions(), (450, 520));
    assert_eq!(written.get_pixel(10, 10).0, [200, 200, 200]);
}

#[test]
fn test_pdf_opened_without_text_layer() {
    let pdf = build_pdf(vec![Vec::new()]);
    let reader = PdfReader::open_bytes(&pdf).unwrap();

    assert!(matches!(
        reader.page_text(1),
        Err(Error::TextUnavailable { page: 1 })
    ));
    assert!(matches!(
        reader.page_images(2),
        Err(Error::PageOutOfBounds { page: 2, total: 1 })
    ));
}

#[test]
fn test_rerun_is_reproducible() {
    let doc = MemoryDocument::new(vec![
        page(vec![png_image(300, 300, 1), png_image(20, 20, 2)], ""),
        page(vec![png_image(400, 500, 3), png_image(300, 300, 1)], ""),
    ]);
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();

    Extractor::default().run(&doc, first.path()).unwrap();
    Extractor::default().run(&doc, second.path()).unwrap();

    let names = file_names(&first.path().join("raw"));
    assert_eq!(names, file_names(&second.path().join("raw")));
    for name in &names {
        assert_eq!(
            std::fs::read(first.path().join("raw").join(name)).unwrap(),
            std::fs::read(second.path().join("raw").join(name)).unwrap()
        );
    }
}

#[test]
fn test_extract_then_organize_by_bone_then_audit() {
    let doc = MemoryDocument::new(vec![
        page(Vec::new(), "Cranium atlas"),
        page(
            vec![png_image(400, 500, 10), png_image(400, 500, 20)],
            "Frontal bone, anterior view",
        ),
        page(
            Vec::new(),
            "Introduction\n\n...the frontal bone articulates with the parietal bones...",
        ),
    ]);
    let out = tempfile::tempdir().unwrap();

    Extractor::default().run(&doc, out.path()).unwrap();
    let summary = StaticMapping::default()
        .organize(&out.path().join("raw"), out.path())
        .unwrap();

    assert_eq!(summary.total_written(), 2);
    let neuro = out.path().join(Category::Neurocranium.as_str());
    assert_eq!(
        file_names(&neuro),
        BTreeSet::from(["frontal.png".to_string(), "frontal_2.png".to_string()])
    );

    let report = Auditor::default().run(&doc, &neuro).unwrap();
    assert!(report.is_covered(Bone::Frontal));
    assert!(!report.is_covered(Bone::Parietal));
    assert_eq!(report.mentions(Bone::Frontal).len(), 2);
    assert!(report
        .to_string()
        .contains("Page 3: ...the frontal bone articulates"));
}

#[test]
fn test_classifiers_are_interchangeable() {
    let doc = MemoryDocument::new(vec![
        page(Vec::new(), ""),
        page(vec![png_image(410, 505, 1)], ""),
    ]);
    let out = tempfile::tempdir().unwrap();
    Extractor::default().run(&doc, out.path()).unwrap();
    let raw = out.path().join("raw");

    let strategies: Vec<Box<dyn ImageClassifier>> = vec![
        Box::new(SizeHeuristic::default()),
        Box::new(StaticMapping::default()),
    ];
    let expected = ["page_2_img_1.png", "frontal.png"];

    for (classifier, expected) in strategies.iter().zip(expected) {
        let organized = tempfile::tempdir().unwrap();
        let summary = classifier.organize(&raw, organized.path()).unwrap();

        assert_eq!(summary.total_written(), 1, "{}", classifier.name());
        assert!(organized
            .path()
            .join("neurocranium")
            .join(expected)
            .is_file());
    }
    // raw directory left in place
    assert!(raw.join("page_2_img_1.png").is_file());
}

#[test]
fn test_png_predictor_rows_are_undone() {
    let pdf = build_pdf(vec![vec![predicted_image_stream(200, 200)]]);
    let reader = PdfReader::open_bytes(&pdf).unwrap();
    let out = tempfile::tempdir().unwrap();

    let summary = Extractor::default().run(&reader, out.path()).unwrap();

    assert_eq!(summary.failed, 0);
    let written = image::open(out.path().join("raw/page_1_img_1.png"))
        .unwrap()
        .to_rgb8();
    assert_eq!(written.dimensions(), (200, 200));
    assert_eq!(written.get_pixel(0, 0).0, [0, 0, 0]);
    assert_eq!(written.get_pixel(150, 199).0, [199, 199, 199]);
}

#[test]
fn test_sixteen_bit_samples_are_a_per_image_failure() {
    let mut wide = image_stream(150, 150, 90);
    wide.dict.set("BitsPerComponent", 16_i64);
    let pdf = build_pdf(vec![vec![wide, image_stream(300, 300, 40)]]);
    let reader = PdfReader::open_bytes(&pdf).unwrap();
    let out = tempfile::tempdir().unwrap();

    let summary = Extractor::default().run(&reader, out.path()).unwrap();

    assert_eq!(summary.failed, 1);
    assert_eq!(
        file_names(&out.path().join("raw")),
        BTreeSet::from(["page_1_img_2.png".to_string()])
    );
}
