use super::*;
use crate::animation::ops::{fade_in, fade_out, lagged_start, replacement_transform, transform};
use crate::foundation::core::{Point, RIGHT};
use crate::scene::shape::Mobject;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn play_and_wait_advance_the_clock() {
    let mut d = Director::new("t");
    let a = d.graph_mut().add_leaf(Mobject::square(1.0));
    d.play([fade_in(a)], 1.5).unwrap();
    d.wait(0.5).unwrap();
    d.inspect();
    assert!(approx(d.clock_secs(), 2.0));

    let sb = d.finish();
    assert_eq!(sb.steps.len(), 3);
    assert!(approx(sb.steps[1].start_secs, 1.5));
    assert!(approx(sb.steps[2].duration_secs, 0.0));
}

#[test]
fn play_rejects_bad_run_time_and_empty_lists() {
    let mut d = Director::new("t");
    let a = d.graph_mut().add_leaf(Mobject::square(1.0));
    assert!(d.play([fade_in(a)], 0.0).is_err());
    assert!(d.play([fade_in(a)], f64::NAN).is_err());
    assert!(d.play(Vec::new(), 1.0).is_err());
    assert!(d.wait(-1.0).is_err());
    assert_eq!(d.step_count(), 0);
}

#[test]
fn play_rejects_unknown_ids_without_recording() {
    let mut d = Director::new("t");
    let err = d.play([fade_in(MobjectId(42))], 1.0).unwrap_err();
    assert!(matches!(err, StoryError::Validation(_)));
    assert_eq!(d.step_count(), 0);
}

#[test]
fn steps_snapshot_the_graph_before_effects() {
    let mut d = Director::new("t");
    let a = d.graph_mut().add_leaf(Mobject::square(1.0));
    d.play([fade_in(a)], 1.0).unwrap();
    assert!(d.graph().is_displayed(a));
    d.play([fade_out(a)], 1.0).unwrap();
    assert!(!d.graph().is_displayed(a));

    let sb = d.finish();
    assert!(!sb.steps[0].graph.is_displayed(a));
    assert!(sb.steps[1].graph.is_displayed(a));
    assert!(!sb.final_graph.is_displayed(a));
}

#[test]
fn replacement_transform_swaps_display() {
    let mut d = Director::new("t");
    let src = d.graph_mut().add_leaf(Mobject::square(1.0));
    let dst = d.graph_mut().add_leaf(Mobject::rect(2.0, 0.2));
    d.play([fade_in(src)], 1.0).unwrap();
    d.play([replacement_transform(src, dst)], 1.0).unwrap();
    assert!(!d.graph().is_displayed(src));
    assert!(d.graph().is_displayed(dst));
}

#[test]
fn lagged_copies_leave_originals_on_screen() {
    let mut d = Director::new("t");
    let g = d.graph_mut();
    let a = g.add_leaf(Mobject::square(1.0));
    let b = g.add_leaf(Mobject::square(1.0));
    let tokens = g.add_group([a, b]).unwrap();
    let bar_a = g.add_leaf(Mobject::rect(1.5, 0.2));
    let bar_b = g.add_leaf(Mobject::rect(1.5, 0.2));
    d.play([fade_in(tokens)], 1.0).unwrap();

    let g = d.graph_mut();
    let copies = [g.copy(a).unwrap(), g.copy(b).unwrap()];
    let anims = vec![
        replacement_transform(copies[0], bar_a),
        replacement_transform(copies[1], bar_b),
    ];
    d.play([lagged_start(anims, 0.25)], 1.8).unwrap();
    let shown = d.graph().displayed_leaves().unwrap();
    assert_eq!(shown, vec![a, b, bar_a, bar_b]);
}

#[test]
fn transform_rewrites_source_geometry() {
    let mut d = Director::new("t");
    let dashed = Mobject::dashed_line(Point::new(-1.0, 0.0), Point::new(1.0, 0.0));
    let line = d.graph_mut().add_leaf(dashed);
    let short = d
        .graph_mut()
        .add_leaf(Mobject::line(Point::new(-0.15, 0.0), Point::new(0.15, 0.0)));
    d.play([fade_in(line)], 1.0).unwrap();
    d.play([transform(line, short)], 1.5).unwrap();
    assert!(approx(d.graph().bounds(line).unwrap().width(), 0.3));
    assert!(d.graph().is_displayed(line));
    assert!(!d.graph().is_displayed(short));
}

#[test]
fn animate_records_after_states_without_touching_live_graph() {
    let mut d = Director::new("t");
    let a = d.graph_mut().add_leaf(Mobject::square(1.0));
    d.play([fade_in(a)], 1.0).unwrap();

    let anim = d.animate(a, |g, id| g.shift(id, RIGHT * 2.0)).unwrap();
    assert!(approx(d.graph().center_of(a).unwrap().x, 0.0));
    d.play([anim], 1.0).unwrap();
    assert!(approx(d.graph().center_of(a).unwrap().x, 2.0));
}

#[test]
fn background_is_carried_into_the_storyboard() {
    let mut d = Director::new("t");
    let color = Rgba8::rgb(10, 20, 30);
    d.set_background(color);
    assert_eq!(d.finish().background, color);
}
