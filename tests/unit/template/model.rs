use super::*;

fn m(n: u8) -> Month {
    Month::new(n).unwrap()
}

fn descriptor() -> TemplateDescriptor {
    TemplateDescriptor {
        id: "t".to_owned(),
        name: "Test".to_owned(),
        config: "t.json".to_owned(),
        overlay: None,
        canvas: Canvas::HD,
    }
}

#[test]
fn template_sorts_slots_and_rejects_duplicates() {
    let t = Template::new(
        &descriptor(),
        vec![
            TemplateSlot::new(m(3), 0.0, 0.0, 10.0, 10.0),
            TemplateSlot::new(m(1), 20.0, 0.0, 10.0, 10.0),
        ],
    )
    .unwrap();
    let months: Vec<u8> = t.slots.iter().map(|s| s.month.get()).collect();
    assert_eq!(months, vec![1, 3]);

    let err = Template::new(
        &descriptor(),
        vec![
            TemplateSlot::new(m(2), 0.0, 0.0, 10.0, 10.0),
            TemplateSlot::new(m(2), 20.0, 0.0, 10.0, 10.0),
        ],
    )
    .unwrap_err();
    assert!(err.to_string().contains("duplicate"));
}

#[test]
fn slot_validation() {
    assert!(TemplateSlot::new(m(1), 0.0, 0.0, 0.0, 10.0).validate().is_err());
    assert!(
        TemplateSlot::new(m(1), f64::NAN, 0.0, 5.0, 10.0)
            .validate()
            .is_err()
    );
    assert!(TemplateSlot::new(m(1), -5.0, 0.0, 5.0, 10.0).validate().is_ok());
}

#[test]
fn slot_at_uses_half_open_rects() {
    let t = Template::new(
        &descriptor(),
        vec![
            TemplateSlot::new(m(1), 0.0, 0.0, 100.0, 100.0),
            TemplateSlot::new(m(2), 100.0, 0.0, 100.0, 100.0),
        ],
    )
    .unwrap();
    assert_eq!(t.slot_at(Point::new(99.9, 50.0)).unwrap().month, m(1));
    assert_eq!(t.slot_at(Point::new(100.0, 50.0)).unwrap().month, m(2));
    assert!(t.slot_at(Point::new(250.0, 50.0)).is_none());
}

#[test]
fn placeholder_color_defaults() {
    let s = TemplateSlot::new(m(1), 0.0, 0.0, 1.0, 1.0);
    assert_eq!(s.placeholder_color().to_straight_rgba8(), [0xf1, 0xf5, 0xf9, 0xff]);
}

#[test]
fn builtin_descriptors_are_hd() {
    let all = TemplateDescriptor::builtin();
    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|d| d.canvas == Canvas::HD));
    assert_eq!(all[1].config, "frame-2.json");
}

#[test]
fn slot_geometry_accessors_agree() {
    let s = TemplateSlot::new(m(9), 10.0, 20.0, 300.0, 150.0);
    assert_eq!(s.origin(), Point::new(10.0, 20.0));
    assert_eq!(s.size(), Size::new(300.0, 150.0));
    assert_eq!(s.rect(), Rect::new(10.0, 20.0, 310.0, 170.0));
    assert!(s.background.is_none());
}
