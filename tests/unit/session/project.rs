use std::io::Cursor;

use super::*;
use crate::template::config::InMemoryConfigSource;

fn m(n: u8) -> Month {
    Month::new(n).unwrap()
}

fn png(w: u32, h: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(w, h, image::Rgba([10, 20, 30, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

const DOC: &str = r##"{
  "template": { "id": "frame-1", "name": "Basic", "config": "frame-1.json" },
  "images": [
    { "path": "a.png" },
    { "path": "b.png", "month": 6 },
    { "path": "notes.txt" },
    { "path": "missing.png" }
  ],
  "transforms": [ { "month": 6, "offset_x": 50, "offset_y": -20, "scale": 1.2 } ],
  "export": { "supersample": 1, "background": "#000000" },
  "fill_missing": true
}"##;

const CONFIG: &str = r#"{"rectangles":[
  {"id":1,"position":{"left":0,"top":0},"size":{"width":300,"height":200}},
  {"id":6,"position":{"left":800,"top":400},"size":{"width":300,"height":200}}
]}"#;

fn source() -> InMemoryConfigSource {
    let mut s = InMemoryConfigSource::new();
    s.insert("frame-1.json", CONFIG).unwrap();
    s.insert("a.png", png(4, 2)).unwrap();
    s.insert("b.png", png(600, 200)).unwrap();
    s.insert("notes.txt", b"hello".to_vec()).unwrap();
    s
}

#[test]
fn document_parses_with_defaults() {
    let doc = ProjectDocument::from_json(br#"{"template":{"id":"x","name":"x","config":"x.json"}}"#)
        .unwrap();
    assert!(doc.images.is_empty());
    assert!(doc.transforms.is_empty());
    assert_eq!(doc.export, ExportOverrides::default());
    assert!(!doc.fill_missing);
    assert_eq!(doc.template.canvas, crate::foundation::core::Canvas::HD);
}

#[test]
fn duplicate_transforms_are_rejected() {
    let err = ProjectDocument::from_json(
        br#"{"template":{"id":"x","name":"x","config":"x.json"},
             "transforms":[{"month":2},{"month":2,"scale":2}]}"#,
    )
    .unwrap_err();
    assert!(matches!(err, YearframeError::Validation(_)));
}

#[test]
fn out_of_range_month_is_a_parse_error() {
    assert!(
        ProjectDocument::from_json(
            br#"{"template":{"id":"x","name":"x","config":"x.json"},
                 "images":[{"path":"a.png","month":13}]}"#,
        )
        .is_err()
    );
}

#[test]
fn build_editor_applies_uploads_months_and_transforms() {
    let doc = ProjectDocument::from_json(DOC.as_bytes()).unwrap();
    let opened = build_editor(&doc, &source()).unwrap();
    let ed = &opened.editor;

    assert_eq!(ed.template().slots.len(), 2);
    assert!(ed.notice().is_none());

    assert_eq!(opened.uploads.added.len(), 2);
    let codes: Vec<_> = opened
        .uploads
        .rejected
        .iter()
        .map(|r| (r.file_name.as_str(), r.reason.code()))
        .collect();
    assert_eq!(codes, vec![("notes.txt", "invalid-type"), ("missing.png", "other")]);

    assert_eq!(
        ed.library().image_for_month(m(1)).unwrap().source_name,
        "a.png"
    );
    assert_eq!(
        ed.library().image_for_month(m(6)).unwrap().source_name,
        "b.png"
    );
    assert_eq!(ed.transforms().get(m(6)), Transform::new(50.0, -20.0, 1.2));

    // Everything except January and June got the default picture.
    assert_eq!(opened.filled.len(), 10);
    assert!(!opened.filled.contains(&m(1)) && !opened.filled.contains(&m(6)));
    assert!(ed.library().missing_months().is_empty());

    assert_eq!(ed.export_settings().supersample, 1);
    assert_eq!(ed.export_settings().background, ColorDef::from_rgba8(0, 0, 0, 255));
}

#[test]
fn invalid_export_override_fails_to_open() {
    let mut doc = ProjectDocument::from_json(DOC.as_bytes()).unwrap();
    doc.export.supersample = Some(9);
    assert!(build_editor(&doc, &source()).is_err());
}

#[test]
fn project_round_trips_through_json() {
    let doc = ProjectDocument::from_json(DOC.as_bytes()).unwrap();
    let json = serde_json::to_vec(&doc).unwrap();
    assert_eq!(ProjectDocument::from_json(&json).unwrap(), doc);
}
