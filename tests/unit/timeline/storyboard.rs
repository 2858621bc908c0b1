use super::*;
use crate::animation::ops::{fade_in, lagged_start_map, write};
use crate::scene::shape::Mobject;
use crate::timeline::director::Director;

fn sample() -> Storyboard {
    let mut d = Director::new("sample");
    let g = d.graph_mut();
    let a = g.add_leaf(Mobject::square(1.0));
    let b = g.add_leaf(Mobject::square(1.0));
    g.set_name(a, "square").unwrap();
    d.play([fade_in(a)], 1.0).unwrap();
    d.wait(0.5).unwrap();
    d.play([lagged_start_map([b], 0.1, write)], 0.5).unwrap();
    d.inspect();
    d.finish()
}

#[test]
fn duration_and_frame_count() {
    let sb = sample();
    assert!((sb.duration_secs() - 2.0).abs() < 1e-12);
    assert_eq!(sb.frame_count(Fps::new(30, 1).unwrap()), 60);
    assert_eq!(sb.frame_count(Fps::new(24, 1).unwrap()), 48);
}

#[test]
fn step_at_skips_zero_length_steps() {
    let sb = sample();
    assert_eq!(sb.step_at(0.0), Some(0));
    assert_eq!(sb.step_at(1.0), Some(1));
    assert_eq!(sb.step_at(1.99), Some(2));
    assert_eq!(sb.step_at(2.0), None);
}

#[test]
fn step_progress_is_clamped() {
    let sb = sample();
    let step = &sb.steps[1];
    assert_eq!(step.progress(1.25), 0.5);
    assert_eq!(step.progress(10.0), 1.0);
    assert_eq!(sb.steps[3].progress(2.0), 1.0);
}

#[test]
fn fingerprint_is_stable_across_recordings() {
    let fingerprint = sample().fingerprint().unwrap();
    assert_eq!(fingerprint, sample().fingerprint().unwrap());

    let mut other = sample();
    other.steps.pop();
    assert_ne!(fingerprint, other.fingerprint().unwrap());
}

#[test]
fn summary_names_steps() {
    let lines = sample().summary();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].contains("FadeIn(square)"));
    assert!(lines[1].ends_with("wait"));
    assert!(lines[2].contains("LaggedStart(1x Write)"));
    assert!(lines[3].ends_with("inspect"));
}
