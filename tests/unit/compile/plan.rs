use super::*;
use crate::foundation::core::FrameIndex;
use crate::foundation::palette::{BLUE, WHITE, YELLOW};
use crate::scene::graph::MobjectId;
use kurbo::Shape as _;

fn canvas() -> Canvas {
    Canvas {
        width: 1280,
        height: 720,
    }
}

fn frame(items: Vec<DrawItem>) -> EvaluatedFrame {
    EvaluatedFrame {
        frame: FrameIndex(0),
        time_secs: 0.0,
        step: Some(0),
        background: BLACK,
        items,
    }
}

fn item(mobject: Mobject, opacity: f64, reveal: f64) -> DrawItem {
    DrawItem {
        source: MobjectId(0),
        mobject,
        opacity,
        reveal,
    }
}

#[test]
fn filled_stroked_rect_emits_fill_then_stroke_in_pixels() {
    let m = Mobject::square(1.0)
        .with_fill(BLUE, 0.5)
        .with_stroke(WHITE, 2.0);
    let plan = compile_frame(&frame(vec![item(m, 1.0, 1.0)]), canvas()).unwrap();
    assert_eq!(plan.ops.len(), 2);

    let DrawOp::FillPath { path, opacity, .. } = &plan.ops[0] else {
        panic!("expected fill first");
    };
    assert!((*opacity - 0.5).abs() < 1e-6);
    let bb = path.bounding_box();
    // 90 px per unit on a 720 px tall canvas, centered.
    assert!((bb.x0 - 595.0).abs() < 1e-6 && (bb.x1 - 685.0).abs() < 1e-6);
    assert!((bb.y0 - 315.0).abs() < 1e-6 && (bb.y1 - 405.0).abs() < 1e-6);

    let DrawOp::StrokePath { width, dash, .. } = &plan.ops[1] else {
        panic!("expected stroke second");
    };
    assert!((width - 2.0 * 720.0 / 1080.0).abs() < 1e-9);
    assert!(dash.is_none());
}

#[test]
fn scene_y_up_maps_to_pixel_y_down() {
    let m = Mobject::dot(0.1, YELLOW).at(crate::foundation::core::Point::new(0.0, 2.0));
    let plan = compile_frame(&frame(vec![item(m, 1.0, 1.0)]), canvas()).unwrap();
    let DrawOp::FillPath { path, .. } = &plan.ops[0] else {
        panic!("expected fill");
    };
    assert!((path.bounding_box().center().y - 180.0).abs() < 1e-6);
}

#[test]
fn invisible_items_emit_nothing() {
    let m = Mobject::square(1.0).with_fill(BLUE, 1.0);
    let plan = compile_frame(
        &frame(vec![item(m.clone(), 0.0, 1.0), item(m, 1.0, 0.0)]),
        canvas(),
    )
    .unwrap();
    assert!(plan.ops.is_empty());
}

#[test]
fn dashed_lines_carry_pixel_dash_length() {
    let m = Mobject::dashed_line(
        crate::foundation::core::Point::new(-1.0, 0.0),
        crate::foundation::core::Point::new(1.0, 0.0),
    )
    .with_stroke(YELLOW, 2.0);
    let plan = compile_frame(&frame(vec![item(m, 1.0, 1.0)]), canvas()).unwrap();
    let DrawOp::StrokePath { dash, .. } = &plan.ops[0] else {
        panic!("expected stroke");
    };
    assert!((dash.unwrap() - 0.05 * 90.0).abs() < 1e-9);
}

#[test]
fn partial_arrow_hides_tip_and_trims_shaft() {
    let m = Mobject::arrow(
        crate::foundation::core::Point::new(0.0, 0.0),
        crate::foundation::core::Point::new(2.0, 0.0),
        0.0,
    )
    .with_stroke(BLUE, 3.0);
    let half = compile_frame(&frame(vec![item(m.clone(), 1.0, 0.5)]), canvas()).unwrap();
    assert_eq!(half.ops.len(), 1);
    let full = compile_frame(&frame(vec![item(m, 1.0, 1.0)]), canvas()).unwrap();
    assert_eq!(full.ops.len(), 2);
    assert!(matches!(full.ops[1], DrawOp::FillPath { .. }));
}

#[test]
fn text_ops_are_placed_by_center() {
    let m = Mobject::text(r"\vec{e}_I", 28.0, BLUE)
        .unwrap()
        .with_backstroke(3.0);
    let plan = compile_frame(&frame(vec![item(m, 0.5, 0.4)]), canvas()).unwrap();
    let DrawOp::Text(t) = &plan.ops[0] else {
        panic!("expected text");
    };
    assert_eq!(t.center, crate::foundation::core::Point::new(640.0, 360.0));
    assert!((t.font_px - 28.0 * 0.0085 * 90.0).abs() < 1e-9);
    assert!((t.reveal - 0.4).abs() < 1e-6);
    assert!((t.opacity - 0.5).abs() < 1e-6);
    assert!(t.backstroke.is_some());
}

#[test]
fn trim_path_keeps_leading_length() {
    let mut p = BezPath::new();
    p.move_to((0.0, 0.0));
    p.line_to((10.0, 0.0));
    p.line_to((10.0, 10.0));
    let half = trim_path(&p, 0.5);
    let bb = half.bounding_box();
    assert!((bb.x1 - 10.0).abs() < 1e-6);
    assert!(bb.y1.abs() < 1e-6);

    let three_quarters = trim_path(&p, 0.75);
    assert!((three_quarters.bounding_box().y1 - 5.0).abs() < 1e-3);
    assert!(trim_path(&p, 0.0).elements().is_empty());
}

#[test]
fn fingerprint_tracks_content() {
    let m = Mobject::square(1.0).with_fill(BLUE, 1.0);
    let a = compile_frame(&frame(vec![item(m.clone(), 1.0, 1.0)]), canvas()).unwrap();
    let b = compile_frame(&frame(vec![item(m.clone(), 1.0, 1.0)]), canvas()).unwrap();
    let c = compile_frame(&frame(vec![item(m, 0.9, 1.0)]), canvas()).unwrap();
    assert_eq!(fingerprint_plan(&a), fingerprint_plan(&b));
    assert_ne!(fingerprint_plan(&a), fingerprint_plan(&c));
}

#[test]
fn zero_sized_canvas_is_rejected() {
    let bad = Canvas {
        width: 0,
        height: 720,
    };
    assert!(compile_frame(&frame(Vec::new()), bad).is_err());
}
