use std::time::Duration;

use super::*;
use crate::{
    edit::transform::Transform,
    export::sink::InMemorySink,
    foundation::core::Canvas,
    template::{config::InMemoryConfigSource, model::TemplateSlot},
};

fn m(n: u8) -> Month {
    Month::new(n).unwrap()
}

fn descriptor() -> TemplateDescriptor {
    TemplateDescriptor {
        id: "t".to_owned(),
        name: "t".to_owned(),
        config: "t.json".to_owned(),
        overlay: None,
        canvas: Canvas::HD,
    }
}

fn editor() -> Editor {
    let t = Template::new(
        &descriptor(),
        vec![
            TemplateSlot::new(m(6), 800.0, 400.0, 300.0, 200.0),
            TemplateSlot::new(m(7), 1200.0, 400.0, 300.0, 200.0),
        ],
    )
    .unwrap();
    let settings = ExportSettings {
        decode_timeout: Duration::from_millis(100),
        supersample: 1,
        ..ExportSettings::default()
    };
    let mut ed = Editor::new(t, settings).unwrap();
    let id = ed.library_mut().insert(
        "june.png",
        600,
        200,
        DecodeHandle::ready("june.png", PreparedImage::solid(6, 2, [0, 0, 255, 255])),
    );
    ed.library_mut().assign_month(id, Some(m(6))).unwrap();
    ed
}

#[test]
fn pointer_down_on_image_slot_selects_and_drags() {
    let mut ed = editor();
    ed.resize(960.0).unwrap();

    // Display (475, 250) is template (950, 500): inside June's slot.
    assert_eq!(ed.pointer_down(Point::new(475.0, 250.0)), Some(m(6)));
    assert_eq!(ed.selection(), Some(m(6)));

    assert!(ed.pointer_move(Point::new(485.0, 245.0)));
    assert!(ed.pointer_move(Point::new(500.0, 240.0)));
    ed.pointer_up();
    assert!(!ed.pointer_move(Point::new(600.0, 300.0)));

    let t = ed.transforms().get(m(6));
    assert_eq!((t.offset_x, t.offset_y), (50.0, -20.0));
}

#[test]
fn pointer_down_on_empty_slot_or_background_clears_selection() {
    let mut ed = editor();
    ed.select(m(6)).unwrap();

    // July has a slot but no image.
    assert_eq!(ed.pointer_down(Point::new(1300.0, 500.0)), None);
    assert_eq!(ed.selection(), None);

    ed.select(m(6)).unwrap();
    assert_eq!(ed.pointer_down(Point::new(10.0, 10.0)), None);
    assert_eq!(ed.selection(), None);
    assert_eq!(ed.transforms().active_month(), None);
}

#[test]
fn pointer_leave_ends_the_gesture_without_rollback() {
    let mut ed = editor();
    ed.pointer_down(Point::new(900.0, 500.0));
    ed.pointer_move(Point::new(930.0, 500.0));
    ed.pointer_leave();
    assert_eq!(ed.transforms().active_month(), None);
    assert_eq!(ed.transforms().get(m(6)).offset_x, 30.0);
}

#[test]
fn zoom_buttons_step_and_clamp_the_selected_month() {
    let mut ed = editor();
    assert_eq!(ed.zoom_in(), None);

    ed.select(m(6)).unwrap();
    let s = ed.zoom_in().unwrap();
    assert!((s - 1.1).abs() < 1e-9);
    for _ in 0..40 {
        ed.zoom_in();
    }
    assert_eq!(ed.transforms().get(m(6)).scale, 3.0);
    for _ in 0..40 {
        ed.zoom_out();
    }
    assert_eq!(ed.transforms().get(m(6)).scale, 0.5);

    assert!(ed.reset_selected());
    assert_eq!(ed.transforms().get(m(6)), Transform::IDENTITY);
}

#[test]
fn select_rejects_months_without_a_slot() {
    let mut ed = editor();
    assert!(ed.select(m(1)).is_err());
    assert_eq!(ed.selection(), None);
}

#[test]
fn failed_template_load_keeps_session_usable() {
    let mut ed = editor();
    ed.select(m(6)).unwrap();
    ed.transforms_mut().set(m(6), Transform::new(5.0, 5.0, 1.5));

    let source = InMemoryConfigSource::new();
    let notice = ed.load_template(&source, &descriptor()).unwrap();
    assert!(notice.is_some());
    assert!(ed.template().slots.is_empty());
    assert_eq!(ed.selection(), None);
    assert_eq!(ed.hit_test(Point::new(900.0, 500.0)), None);
    // Transforms are keyed by month and survive the switch.
    assert_eq!(ed.transforms().get(m(6)).scale, 1.5);

    let frame = ed.render_preview().unwrap();
    assert_eq!((frame.width, frame.height), (1920, 1080));
}

#[test]
fn template_load_from_source_replaces_slots() {
    let mut ed = editor();
    let mut source = InMemoryConfigSource::new();
    source
        .insert(
            "t.json",
            r#"{"rectangles":[{"id":3,"position":{"left":0,"top":0},"size":{"width":100,"height":100}}]}"#,
        )
        .unwrap();
    assert!(ed.load_template(&source, &descriptor()).unwrap().is_none());
    assert_eq!(ed.template().slots.len(), 1);
    assert_eq!(ed.template().slots[0].month, m(3));
    assert!(ed.overlay().is_none());
}

#[test]
fn preview_and_export_share_geometry() {
    let mut ed = editor();
    ed.resize(960.0).unwrap();
    ed.transforms_mut().set(m(6), Transform::new(50.0, -20.0, 1.2));

    let views = ed.slot_views();
    let june = views.iter().find(|v| v.month == m(6)).unwrap();
    let placed = june.image.unwrap();
    assert_eq!((placed.size.width, placed.size.height), (720.0, 240.0));
    assert_eq!((placed.local.x0, placed.local.y0), (-160.0, -40.0));

    let mut sink = InMemorySink::new();
    let report = ed.export(&mut sink).unwrap();
    assert_eq!(report.placements[&m(6)], placed);
    assert_eq!((report.width, report.height), (1920, 1080));

    let frame = ed.render_preview().unwrap();
    assert_eq!((frame.width, frame.height), (960, 540));
}

#[test]
fn export_failure_leaves_state_untouched() {
    let mut ed = editor();
    let id = ed
        .library_mut()
        .insert("slow.png", 10, 10, DecodeHandle::pending("slow.png"));
    ed.library_mut().assign_month(id, Some(m(7))).unwrap();
    ed.select(m(6)).unwrap();
    ed.transforms_mut().set(m(6), Transform::new(1.0, 2.0, 1.0));

    let mut sink = InMemorySink::new();
    assert!(ed.export(&mut sink).is_err());
    assert!(sink.artifacts().is_empty());
    assert_eq!(ed.selection(), Some(m(6)));
    assert_eq!(ed.transforms().get(m(6)), Transform::new(1.0, 2.0, 1.0));
}
