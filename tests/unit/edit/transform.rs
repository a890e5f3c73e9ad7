use super::*;

fn m(n: u8) -> Month {
    Month::new(n).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn defaults_are_identity() {
    let model = TransformModel::new();
    assert_eq!(model.get(m(4)), Transform::IDENTITY);
    assert_eq!(model.active_month(), None);
}

#[test]
fn drag_uses_fixed_baseline() {
    let mut model = TransformModel::new();
    let scale = ContainerScale::new(0.5).unwrap();

    model.begin_drag(m(1), Point::new(100.0, 100.0));
    let mut x = 100.0;
    for _ in 0..50 {
        x += 0.3;
        assert!(model.update_drag(m(1), Point::new(x, 100.0), scale));
    }
    let stepped = model.get(m(1));

    let mut single = TransformModel::new();
    single.begin_drag(m(1), Point::new(100.0, 100.0));
    single.update_drag(m(1), Point::new(x, 100.0), scale);

    assert!(close(stepped.offset_x, single.get(m(1)).offset_x));
    assert!(close(stepped.offset_x, 30.0));
    assert_eq!(stepped.offset_y, 0.0);
}

#[test]
fn repeated_positions_are_idempotent() {
    let mut model = TransformModel::new();
    model.begin_drag(m(2), Point::new(0.0, 0.0));
    for _ in 0..5 {
        model.update_drag(m(2), Point::new(12.0, -8.0), ContainerScale::IDENTITY);
    }
    assert_eq!(model.get(m(2)).offset(), Vec2::new(12.0, -8.0));
    model.update_drag(m(2), Point::new(0.0, 0.0), ContainerScale::IDENTITY);
    assert_eq!(model.get(m(2)).offset(), Vec2::ZERO);
}

#[test]
fn second_drag_starts_from_previous_result() {
    let mut model = TransformModel::new();
    model.begin_drag(m(3), Point::new(0.0, 0.0));
    model.update_drag(m(3), Point::new(10.0, 10.0), ContainerScale::IDENTITY);
    model.end_drag(m(3));
    assert_eq!(model.active_month(), None);

    model.begin_drag(m(3), Point::new(500.0, 500.0));
    model.update_drag(m(3), Point::new(505.0, 500.0), ContainerScale::IDENTITY);
    assert_eq!(model.get(m(3)).offset(), Vec2::new(15.0, 10.0));
}

#[test]
fn updates_for_other_months_are_ignored() {
    let mut model = TransformModel::new();
    model.begin_drag(m(1), Point::ZERO);
    assert!(!model.update_drag(m(2), Point::new(50.0, 0.0), ContainerScale::IDENTITY));
    assert_eq!(model.get(m(2)), Transform::IDENTITY);

    model.begin_drag(m(2), Point::ZERO);
    assert_eq!(model.active_month(), Some(m(2)));
    assert!(!model.update_drag(m(1), Point::new(50.0, 0.0), ContainerScale::IDENTITY));
}

#[test]
fn scale_is_clamped_and_leaves_offset() {
    let mut model = TransformModel::new();
    model.set(m(5), Transform::new(40.0, -10.0, 1.0));

    assert_eq!(model.set_scale(m(5), 9.0), MAX_SCALE);
    assert_eq!(model.set_scale(m(5), 0.01), MIN_SCALE);
    assert_eq!(model.set_scale(m(5), f64::NAN), 1.0);
    assert_eq!(model.get(m(5)).offset(), Vec2::new(40.0, -10.0));
}

#[test]
fn nudge_adds_then_clamps() {
    let mut model = TransformModel::new();
    for _ in 0..3 {
        model.nudge_scale(m(6), SCALE_STEP);
    }
    assert!(close(model.get(m(6)).scale, 1.3));
    for _ in 0..30 {
        model.nudge_scale(m(6), -SCALE_STEP);
    }
    assert_eq!(model.get(m(6)).scale, MIN_SCALE);

    model.set_scale(m(6), 1.25);
    assert!(close(model.nudge_scale(m(6), SCALE_STEP), 1.35));
    model.set_scale(m(6), 2.95);
    assert_eq!(model.nudge_scale(m(6), SCALE_STEP), MAX_SCALE);
}

#[test]
fn reset_and_set_sanitize() {
    let mut model = TransformModel::new();
    model.set(m(7), Transform::new(f64::INFINITY, 3.0, 10.0));
    assert_eq!(model.get(m(7)), Transform::new(0.0, 3.0, MAX_SCALE));

    model.begin_drag(m(7), Point::ZERO);
    model.reset(m(7));
    assert_eq!(model.get(m(7)), Transform::IDENTITY);
    assert_eq!(model.active_month(), None);
    assert_eq!(model.iter().count(), 0);
}

#[test]
fn transform_deserializes_with_defaults() {
    let t: Transform = serde_json::from_str(r#"{"offset_x": 5}"#).unwrap();
    assert_eq!(t, Transform::new(5.0, 0.0, 1.0));
}
