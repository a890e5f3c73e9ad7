use std::io::Cursor;

use super::*;

fn encode(w: u32, h: u32, format: ImageFormat) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(w, h, image::Rgb([10, 20, 30]));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), format)
        .unwrap();
    buf
}

#[test]
fn accepts_png_and_jpeg() {
    let policy = UploadPolicy::default();

    let png = policy.check("a.png", &encode(6, 4, ImageFormat::Png)).unwrap();
    assert_eq!((png.width, png.height), (6, 4));

    let jpg = policy.check("b.jpg", &encode(8, 8, ImageFormat::Jpeg)).unwrap();
    assert_eq!(jpg.format, ImageFormat::Jpeg);
}

#[test]
fn rejects_oversized_before_sniffing() {
    let policy = UploadPolicy {
        max_bytes: 4,
        ..UploadPolicy::default()
    };
    let err = policy.check("big.png", b"garbage bytes").unwrap_err();
    assert_eq!(err.file_name, "big.png");
    assert_eq!(
        err.reason,
        RejectionReason::TooLarge {
            size_bytes: 13,
            max_bytes: 4
        }
    );
    assert_eq!(err.reason.code(), "too-large");
}

#[test]
fn rejects_unknown_and_unaccepted_types() {
    let policy = UploadPolicy::default();
    let err = policy.check("notes.txt", b"hello world").unwrap_err();
    assert_eq!(err.reason, RejectionReason::UnsupportedType { detected: None });
    assert_eq!(err.reason.code(), "invalid-type");

    let png_only = UploadPolicy {
        accepted: vec![ImageFormat::Png],
        ..UploadPolicy::default()
    };
    let err = png_only
        .check("photo.jpg", &encode(2, 2, ImageFormat::Jpeg))
        .unwrap_err();
    assert!(matches!(
        err.reason,
        RejectionReason::UnsupportedType { detected: Some(ref d) } if d == "jpeg"
    ));
}

#[test]
fn truncated_png_is_unreadable() {
    let bytes = encode(4, 4, ImageFormat::Png);
    let err = UploadPolicy::default()
        .check("cut.png", &bytes[..12])
        .unwrap_err();
    assert_eq!(err.reason.code(), "other");
    assert!(err.to_string().contains("cut.png"));
}
