use super::*;

#[test]
fn container_scale_rejects_degenerate_values() {
    assert!(ContainerScale::new(0.0).is_err());
    assert!(ContainerScale::new(-1.0).is_err());
    assert!(ContainerScale::new(f64::INFINITY).is_err());
    assert!(ContainerScale::from_widths(960.0, 0).is_err());
    assert_eq!(ContainerScale::from_widths(960.0, 1920).unwrap().get(), 0.5);
}

#[test]
fn pointer_delta_is_divided_by_scale() {
    let s = ContainerScale::new(0.5).unwrap();
    assert_eq!(s.to_template(Vec2::new(10.0, -4.0)), Vec2::new(20.0, -8.0));
}

#[test]
fn resize_recomputes_scale_and_keeps_aspect() {
    let mut vp = Viewport::new(Canvas::HD, 1920.0).unwrap();
    assert_eq!(vp.scale(), ContainerScale::IDENTITY);

    vp.resize(480.0).unwrap();
    assert_eq!(vp.scale().get(), 0.25);
    assert_eq!(vp.display_size(), Size::new(480.0, 270.0));

    assert!(vp.resize(0.0).is_err());
    assert_eq!(vp.scale().get(), 0.25);
}

#[test]
fn display_template_conversion_round_trips() {
    let vp = Viewport::new(Canvas::HD, 1280.0).unwrap();
    let t = vp.display_to_template(Point::new(640.0, 360.0));
    assert!((t.x - 960.0).abs() < 1e-9 && (t.y - 540.0).abs() < 1e-9);
    let d = vp.template_to_display(t);
    assert!((d.x - 640.0).abs() < 1e-9 && (d.y - 360.0).abs() < 1e-9);
}
