use super::*;
use crate::foundation::palette::{BLUE, GREEN, WHITE};

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn rect_bounds_follow_center() {
    let m = Mobject::rect(2.0, 1.0).at(Point::new(3.0, -1.0));
    let b = m.bounds();
    assert!(approx(b.x0, 2.0) && approx(b.x1, 4.0));
    assert!(approx(b.y0, -1.5) && approx(b.y1, -0.5));
}

#[test]
fn arrow_is_shortened_by_buff_on_both_ends() {
    let m = Mobject::arrow(Point::new(0.0, 0.0), Point::new(2.0, 0.0), 0.1);
    let b = m.bounds();
    assert!(approx(b.x0, 0.1));
    assert!(approx(b.x1, 1.9));
    let Shape::Arrow { tip_length, .. } = m.shape else {
        panic!("expected arrow");
    };
    assert!(approx(tip_length, DEFAULT_TIP_LENGTH));
    assert!(m.arrow_tip().is_some());
}

#[test]
fn short_arrow_tip_is_capped_at_half_length() {
    let m = Mobject::arrow(Point::new(0.0, 0.0), Point::new(0.3, 0.0), 0.0);
    let Shape::Arrow { tip_length, .. } = m.shape else {
        panic!("expected arrow");
    };
    assert!(approx(tip_length, 0.15));
}

#[test]
fn line_center_is_midpoint() {
    let m = Mobject::dashed_line(Point::new(-1.0, 2.0), Point::new(1.0, 2.0));
    assert_eq!(m.center, Point::new(0.0, 2.0));
    assert!(matches!(m.shape, Shape::Line { dash: Some(_), .. }));
}

#[test]
fn fit_to_matches_target_bounds() {
    let m = Mobject::square(0.5).at(Point::new(-5.0, 0.0));
    let target = Rect::new(1.0, 1.0, 2.5, 1.22);
    let fitted = m.fit_to(target);
    let b = fitted.bounds();
    assert!(approx(b.x0, target.x0) && approx(b.x1, target.x1));
    assert!(approx(b.y0, target.y0) && approx(b.y1, target.y1));
}

#[test]
fn same_kind_interpolation_blends_geometry_and_color() {
    let a = Mobject::square(0.5).with_fill(BLUE, 1.0);
    let b = Mobject::rect(1.5, 0.1)
        .with_fill(GREEN, 0.5)
        .at(Point::new(2.0, 0.0));
    let mid = Mobject::interpolate(&a, &b, 0.5).unwrap();
    let Shape::Rect { width, height, .. } = mid.shape else {
        panic!("expected rect");
    };
    assert!(approx(width, 1.0));
    assert!(approx(height, 0.3));
    assert!(approx(mid.center.x, 1.0));
    let fill = mid.style.fill.unwrap();
    assert!(approx(fill.opacity, 0.75));
    assert_eq!(fill.color, BLUE.lerp(GREEN, 0.5));
}

#[test]
fn mixed_kind_interpolation_is_none() {
    let a = Mobject::square(1.0);
    let b = Mobject::text(r"\text{cat}", 30.0, WHITE).unwrap();
    assert!(Mobject::interpolate(&a, &b, 0.5).is_none());
}

#[test]
fn style_opacity_multiplies_fill_and_stroke() {
    let m = Mobject::square(1.0)
        .with_fill(BLUE, 0.8)
        .with_stroke(WHITE, 2.0)
        .with_opacity(0.5);
    assert!(approx(m.style.fill.unwrap().opacity, 0.4));
    assert!(approx(m.style.stroke.unwrap().opacity, 0.5));
}

#[test]
fn scaled_about_moves_center_and_keeps_stroke_width() {
    let m = Mobject::square(1.0)
        .with_stroke(WHITE, 2.0)
        .at(Point::new(2.0, 0.0));
    let s = m.scaled_about(0.5, Point::ORIGIN);
    assert_eq!(s.center, Point::new(1.0, 0.0));
    assert!(approx(s.bounds().width(), 0.5));
    assert!(approx(s.style.stroke.unwrap().width, 2.0));
}

#[test]
fn text_has_no_outline_but_shapes_do() {
    assert!(
        Mobject::text(r"\text{x}", 20.0, WHITE)
            .unwrap()
            .outline()
            .is_none()
    );
    assert!(Mobject::ellipse(5.0, 1.8).outline().is_some());
    assert!(Mobject::rounded_rect(2.2, 0.8, 0.15).outline().is_some());
}
