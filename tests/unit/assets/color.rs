use super::*;
use serde_json::json;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 0.02
}

#[test]
fn parses_hex_variants() {
    let c: ColorDef = serde_json::from_value(json!("#ff0000")).unwrap();
    assert_eq!(c, ColorDef::rgba(1.0, 0.0, 0.0, 1.0));

    let c: ColorDef = serde_json::from_value(json!("#0000ff80")).unwrap();
    assert!((c.b - 1.0).abs() < 1e-9);
    assert!((c.a - (128.0 / 255.0)).abs() < 1e-9);

    let c = ColorDef::parse("#fff").unwrap();
    assert_eq!(c, ColorDef::WHITE);
}

#[test]
fn parses_rgb_functions() {
    let c = ColorDef::parse("rgb(255, 128, 0)").unwrap();
    assert_eq!(c.to_straight_rgba8(), [255, 128, 0, 255]);

    let c = ColorDef::parse("rgba(0 0 255 / 50%)").unwrap();
    assert_eq!(c.to_straight_rgba8(), [0, 0, 255, 128]);

    let c = ColorDef::parse("RGB(100%, 0%, 0%)").unwrap();
    assert_eq!(c.to_straight_rgba8(), [255, 0, 0, 255]);
}

#[test]
fn oklch_is_converted_to_rendered_srgb() {
    // CSS `red` expressed in oklch.
    let c = ColorDef::parse("oklch(62.8% 0.2577 29.23)").unwrap();
    assert!(close(c.r, 1.0), "r={}", c.r);
    assert!(close(c.g, 0.0), "g={}", c.g);
    assert!(close(c.b, 0.0), "b={}", c.b);

    let white = ColorDef::parse("oklch(1 0 0)").unwrap();
    assert_eq!(white.to_straight_rgba8(), [255, 255, 255, 255]);
}

#[test]
fn oklch_out_of_gamut_is_chroma_reduced_not_replaced() {
    // Far outside sRGB: huge chroma on a mid-lightness green.
    let c = ColorDef::parse("oklch(0.7 0.9 140 / 0.5)").unwrap();
    for ch in [c.r, c.g, c.b] {
        assert!((0.0..=1.0).contains(&ch));
    }
    // Still clearly green, not collapsed to black.
    assert!(c.g > c.r && c.g > c.b);
    assert!((c.a - 0.5).abs() < 1e-9);
}

#[test]
fn oklab_neutral_axis_is_gray() {
    let c = ColorDef::parse("oklab(0.5 0 0)").unwrap();
    assert!(close(c.r, c.g) && close(c.g, c.b));
}

#[test]
fn parses_rgba_object_and_array() {
    let c: ColorDef = serde_json::from_value(json!({"r": 0.25, "g": 0.5, "b": 0.75})).unwrap();
    assert_eq!(c, ColorDef::rgba(0.25, 0.5, 0.75, 1.0));

    let c: ColorDef = serde_json::from_value(json!([0.25, 0.5, 0.75, 0.9])).unwrap();
    assert_eq!(c, ColorDef::rgba(0.25, 0.5, 0.75, 0.9));

    assert!(serde_json::from_value::<ColorDef>(json!([1.0])).is_err());
}

#[test]
fn rejects_garbage() {
    assert!(ColorDef::parse("banana").is_err());
    assert!(ColorDef::parse("rgb(1, 2)").is_err());
    assert!(ColorDef::parse("#ggg").is_err());
}

#[test]
fn premul_conversion() {
    let c = ColorDef::rgba(1.0, 0.5, 0.0, 0.5);
    let p = c.to_rgba8_premul();
    assert_eq!(p.a, 128);
    assert_eq!(p.r, 128);
    assert_eq!(p.b, 0);
}

fn near8(a: [u8; 4], b: [u8; 4]) -> bool {
    a.iter().zip(b).all(|(x, y)| x.abs_diff(y) <= 2)
}

#[test]
fn display_p3_red_is_mapped_into_srgb() {
    let c = ColorDef::parse("color(display-p3 1 0 0)").unwrap();
    for ch in [c.r, c.g, c.b] {
        assert!((0.0..=1.0).contains(&ch));
    }
    // Wider than sRGB red: chroma reduced, still unmistakably red.
    assert!(c.r > 0.95, "r={}", c.r);
    assert!(c.g < 0.3 && c.b < 0.3, "g={} b={}", c.g, c.b);
    assert_eq!(c.a, 1.0);
}

#[test]
fn lab_and_lch_are_converted() {
    let lab = ColorDef::parse("lab(50% 40 30)").unwrap();
    assert!(
        near8(lab.to_straight_rgba8(), [187, 88, 70, 255]),
        "{:?}",
        lab.to_straight_rgba8()
    );

    // lch(L C H) is lab(L C*cos(H) C*sin(H)).
    let lch = ColorDef::parse("lch(50% 40 30)").unwrap();
    assert!(
        near8(lch.to_straight_rgba8(), [178, 93, 87, 255]),
        "{:?}",
        lch.to_straight_rgba8()
    );
}

#[test]
fn hsl_named_and_hue_units() {
    let c = ColorDef::parse("hsl(200 50% 50%)").unwrap();
    assert!(near8(c.to_straight_rgba8(), [64, 149, 191, 255]));

    let red = ColorDef::parse("red").unwrap();
    assert_eq!(red.to_straight_rgba8(), [255, 0, 0, 255]);
    assert_eq!(
        ColorDef::parse("transparent").unwrap().to_straight_rgba8()[3],
        0
    );

    let turn = ColorDef::parse("oklch(0.7 0.1 0.25turn)").unwrap();
    let deg = ColorDef::parse("oklch(0.7 0.1 90deg)").unwrap();
    assert_eq!(turn.to_straight_rgba8(), deg.to_straight_rgba8());
}

#[test]
fn parses_hsla_object() {
    let c: ColorDef = serde_json::from_value(json!({"h": 120.0, "s": 1.0, "l": 0.5})).unwrap();
    assert_eq!(c.to_straight_rgba8(), [0, 255, 0, 255]);

    let c: ColorDef =
        serde_json::from_value(json!({"h": 0.0, "s": 0.0, "l": 1.0, "a": 0.5})).unwrap();
    assert_eq!(c.to_straight_rgba8(), [255, 255, 255, 128]);
}
