//! Integration tests for stepkit
//!
//! These exercise the library surface the commands are built on. Paths that
//! need external binaries (pdftk, agent-browser), the PDFium library, or the
//! network are covered by unit tests on their parsing/assembly halves
//! instead, so the suite runs anywhere.

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::Value;
use std::path::PathBuf;
use stepkit::imageops::{self, Dimensions, FitMode, OutputFormat, TransformOptions};
use stepkit::pdf::form::FormField;
use stepkit::pdf::{self, build_structure, parse_field_name};
use stepkit::render::inject_tailwind;
use stepkit::{input, jsonpath};

fn sample_image(width: u32, height: u32) -> image::DynamicImage {
    image::DynamicImage::ImageRgba8(image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    }))
}

fn text_field(name: &str) -> FormField {
    FormField {
        name: name.to_string(),
        field_type: "text".to_string(),
        options: None,
        tooltip: None,
        max_length: None,
        rect: None,
    }
}

// ---------------------------------------------------------------------------
// parse-input
// ---------------------------------------------------------------------------

#[test]
fn test_parse_input_round_trip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out = dir.path().join("run/context/input.json");

    let payload = r#"{"query":"running shoes","wp_post_url":"https://example.com/p/1","content_type":"service"}"#;
    let required = ["query".to_string(), "content_type".to_string()];

    let parsed = input::validate(payload, &required).expect("payload should validate");
    input::write_clean(&parsed, &out).expect("write should succeed");

    let written: Value =
        serde_json::from_str(&std::fs::read_to_string(&out).expect("read back")).expect("json");
    assert_eq!(written["query"], "running shoes");
    assert_eq!(written["content_type"], "service");

    assert!(parsed.summary.contains("3 fields"));
    assert!(parsed.summary.contains("  query: running shoes"));
}

#[test]
fn test_parse_input_rejects_incomplete_payload() {
    let err = input::validate(r#"{"query":""}"#, &["query".to_string()]).unwrap_err();
    assert_eq!(err.to_string(), "Missing required fields: query");
}

// ---------------------------------------------------------------------------
// json-extract
// ---------------------------------------------------------------------------

#[test]
fn test_json_extract_typical_pipeline_usage() {
    let doc = r#"{"structure":{"pages":{"Page1":{"Part1":{"fields":[{"name":"a"}]}}}},"fieldCount":1}"#;

    assert_eq!(
        jsonpath::extract(doc, "o.fieldCount").as_deref(),
        Some("1")
    );
    assert_eq!(
        jsonpath::extract(doc, r#"o.structure.pages["Page1"]["Part1"].fields[0].name"#).as_deref(),
        Some("a")
    );
    assert_eq!(jsonpath::extract(doc, "o.missing.deeply"), None);
    assert_eq!(jsonpath::extract("not json", "o.fieldCount"), None);
}

// ---------------------------------------------------------------------------
// resize-image
// ---------------------------------------------------------------------------

#[rstest]
#[case(FitMode::Inside, (100, 50))]
#[case(FitMode::Cover, (100, 100))]
#[case(FitMode::Fill, (100, 100))]
fn test_transform_fit_modes(#[case] fit: FitMode, #[case] expected: (u32, u32)) {
    let dir = tempfile::tempdir().expect("temp dir");
    let input_path = dir.path().join("wide.png");
    sample_image(400, 200).save(&input_path).expect("fixture");

    let options = TransformOptions {
        resize: Some(Dimensions {
            width: 100,
            height: 100,
        }),
        fit,
        output: Some(dir.path().join(format!("out-{fit:?}.png"))),
        ..Default::default()
    };

    let out = imageops::transform(&input_path, &options).expect("transform");
    let result = image::open(out).expect("reopen");
    assert_eq!((result.width(), result.height()), expected);
}

#[test]
fn test_transform_crop_then_resize() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input_path = dir.path().join("src.png");
    sample_image(200, 200).save(&input_path).expect("fixture");

    let options = TransformOptions {
        crop: Some(imageops::parse_crop_spec("100x100+50+50").expect("crop spec")),
        resize: Some(Dimensions {
            width: 40,
            height: 40,
        }),
        output: Some(dir.path().join("out.png")),
        ..Default::default()
    };

    let out = imageops::transform(&input_path, &options).expect("transform");
    let result = image::open(out).expect("reopen");
    assert_eq!((result.width(), result.height()), (40, 40));
}

#[test]
fn test_transform_format_conversion_chain() {
    let dir = tempfile::tempdir().expect("temp dir");
    let input_path = dir.path().join("src.png");
    sample_image(32, 32).save(&input_path).expect("fixture");

    for (format, magic) in [
        (OutputFormat::Jpeg, vec![0xFFu8, 0xD8]),
        (OutputFormat::Webp, b"RIFF".to_vec()),
        (OutputFormat::Png, vec![0x89, b'P', b'N', b'G']),
    ] {
        let options = TransformOptions {
            format: Some(format),
            output: Some(dir.path().join(format!("out.{format:?}"))),
            ..Default::default()
        };
        let out = imageops::transform(&input_path, &options).expect("transform");
        let bytes = std::fs::read(out).expect("read output");
        assert_eq!(&bytes[..magic.len()], &magic[..], "bad magic for {format:?}");
    }
}

#[test]
fn test_recompress_png_produces_valid_png() {
    let dir = tempfile::tempdir().expect("temp dir");
    let src = dir.path().join("shot.png");
    let dest = dir.path().join("compressed.png");
    sample_image(64, 64).save(&src).expect("fixture");

    imageops::recompress_png(&src, &dest).expect("recompress");
    let reopened = image::open(&dest).expect("reopen");
    assert_eq!((reopened.width(), reopened.height()), (64, 64));
}

// ---------------------------------------------------------------------------
// render-html (pure half)
// ---------------------------------------------------------------------------

#[test]
fn test_tailwind_injection_positions() {
    let full = "<html><head><title>x</title></head><body>hi</body></html>";
    assert!(inject_tailwind(full).contains("cdn.tailwindcss.com"));

    let fragment = "<p>fragment</p>";
    let injected = inject_tailwind(fragment);
    assert!(injected.starts_with("<script"));

    let already = r#"<head><script src="https://cdn.tailwindcss.com"></script></head>"#;
    assert_eq!(inject_tailwind(already), already);
}

// ---------------------------------------------------------------------------
// read-pdf / pdf-form (engine-independent halves)
// ---------------------------------------------------------------------------

fn fixture_path(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

#[test]
fn test_encryption_heuristic_on_fixtures() {
    let plain = std::fs::read(fixture_path("minimal.pdf")).expect("fixture");
    assert!(!pdf::is_encrypted(&plain));

    let encrypted = std::fs::read(fixture_path("encrypted-marker.pdf")).expect("fixture");
    assert!(pdf::is_encrypted(&encrypted));
}

#[test]
fn test_form_type_detection_on_xfa_marker_fixture() {
    let data = std::fs::read(fixture_path("xfa-marker.pdf")).expect("fixture");
    let form_type = pdf::detect_form_type(&data);
    assert!(form_type.has_xfa);
}

#[test]
fn test_page_range_validation() {
    assert_eq!(pdf::parse_page_range("1-3,7", 10).expect("range"), vec![1, 2, 3, 7]);
    assert!(pdf::parse_page_range("1-3", 2).is_err());
}

#[test]
fn test_field_name_to_structure_pipeline() {
    let parsed = parse_field_name("form1[0].Page3[0].Part2[0].Line6c_ZipCode[0]");
    assert_eq!(parsed.page.as_deref(), Some("Page3"));
    assert_eq!(parsed.part.as_deref(), Some("Part2"));
    assert_eq!(parsed.item.as_deref(), Some("6c"));
    assert_eq!(parsed.description.as_deref(), Some("ZipCode"));

    let fields = vec![
        text_field("form1[0].Page1[0].Part1[0].Line1a_FamilyName[0]"),
        text_field("form1[0].Page1[0].Part2[0].Line4_Email[0]"),
        text_field("form1[0].Page2[0].Part1[0].Line1_Number[0]"),
    ];
    let structure = build_structure(&fields).expect("structure");

    let pages = structure["pages"].as_object().expect("pages object");
    let page_keys: Vec<&str> = pages.keys().map(|k| k.as_str()).collect();
    assert_eq!(page_keys, vec!["Page1", "Page2"]);

    let page1 = pages["Page1"].as_object().expect("page1");
    let part_keys: Vec<&str> = page1.keys().map(|k| k.as_str()).collect();
    assert_eq!(part_keys, vec!["Part1", "Part2"]);
    assert_eq!(
        structure["pages"]["Page1"]["Part1"]["fields"][0]["description"],
        "FamilyName"
    );
}

#[test]
fn test_form_document_serialization_shape() {
    // The JSON contract downstream steps consume: camelCase keys, optional
    // keys omitted rather than null.
    let field = FormField {
        name: "form1[0].Page1[0].Line1_Name[0]".to_string(),
        field_type: "text".to_string(),
        options: None,
        tooltip: Some("Your full legal name".to_string()),
        max_length: Some(40),
        rect: None,
    };
    let value = serde_json::to_value(&field).expect("serialize");
    assert_eq!(value["type"], "text");
    assert_eq!(value["maxLength"], 40);
    assert_eq!(value["tooltip"], "Your full legal name");
    assert!(value.get("options").is_none());
    assert!(value.get("rect").is_none());
}
