use super::*;
use crate::{
    scene::shape::ShapeKind,
    scenes::build_storyboard,
    timeline::storyboard::{Storyboard, StepKind},
};

fn explainer() -> Storyboard {
    build_storyboard(&ClipExplainer).unwrap()
}

#[test]
fn recorded_timeline_matches_the_script() {
    let sb = explainer();
    assert_eq!(sb.scene, "clip-explainer");
    assert!((sb.duration_secs() - 23.2).abs() < 1e-9);
    let plays = sb
        .steps
        .iter()
        .filter(|s| matches!(s.kind, StepKind::Play { .. }))
        .count();
    assert_eq!(plays, 18);
    assert!(matches!(sb.steps.last().unwrap().kind, StepKind::Inspect));
}

#[test]
fn exactly_two_encoders_and_two_dots_with_distinct_colors() {
    let sb = explainer();
    let g = &sb.final_graph;
    let shown = g.displayed_leaves().unwrap();
    let blocks: Vec<_> = shown
        .iter()
        .filter(|&&l| {
            let m = g.leaf(l).unwrap();
            m.kind() == ShapeKind::Rect && m.bounds().width() > 2.0 && m.bounds().height() < 1.0
        })
        .collect();
    assert_eq!(blocks.len(), 2);
    let dots: Vec<_> = shown
        .iter()
        .filter(|&&l| g.leaf(l).unwrap().kind() == ShapeKind::Dot)
        .collect();
    assert_eq!(dots.len(), 2);

    let img = g.leaf(g.find("img_emb_dot").unwrap()).unwrap();
    let txt = g.leaf(g.find("txt_emb_dot").unwrap()).unwrap();
    assert_eq!(img.style.color(), Some(BLUE));
    assert_eq!(txt.style.color(), Some(GREEN));
    let color_of = |name: &str| g.leaf(g.find(name).unwrap()).unwrap().style.color();
    assert_ne!(color_of("img_encoder"), color_of("txt_encoder"));
}

#[test]
fn dots_converge_on_their_midpoint() {
    let sb = explainer();
    let g = &sb.final_graph;
    let a = g.center_of(g.find("img_emb_dot").unwrap()).unwrap();
    let b = g.center_of(g.find("txt_emb_dot").unwrap()).unwrap();
    assert!((a.x + 0.15).abs() < 1e-9 && (b.x - 0.15).abs() < 1e-9);
    assert!((a.y - SPACE_Y).abs() < 1e-9);
    let line = g.bounds(g.find("sim_line").unwrap()).unwrap();
    assert!((line.width() - 0.3).abs() < 1e-9);
}

#[test]
fn inputs_are_parked_along_the_top() {
    let sb = explainer();
    let g = &sb.final_graph;
    let img = g.center_of(g.find("image_group").unwrap()).unwrap();
    let txt = g.center_of(g.find("text_group").unwrap()).unwrap();
    assert!((img.x + 5.0).abs() < 1e-9 && (img.y - 2.8).abs() < 1e-9);
    assert!((txt.x - 5.0).abs() < 1e-9 && (txt.y - 2.8).abs() < 1e-9);
    let bars = g.bounds(g.find("token_bars").unwrap()).unwrap();
    assert!((bars.height() - BAR_STACK_HEIGHT).abs() < 1e-9);
}

#[test]
fn final_caption_replaces_space_label() {
    let sb = explainer();
    let g = &sb.final_graph;
    let shown = g.displayed_leaves().unwrap();
    assert!(shown.contains(&g.find("match_text").unwrap()));
    assert!(!shown.contains(&g.find("space_label").unwrap()));
    assert!(!shown.contains(&g.find("title").unwrap()));
    assert!(!shown.contains(&g.find("sentence").unwrap()));
}

#[test]
fn embedding_dots_shrink_onto_their_final_size() {
    use crate::{
        animation::anim::AnimKind,
        eval::evaluator::Evaluator,
        foundation::core::{Fps, FrameIndex},
    };

    let sb = explainer();
    let dot = sb.final_graph.find("img_emb_dot").unwrap();
    let step = sb
        .steps
        .iter()
        .find(|s| match &s.kind {
            StepKind::Play { animations } => animations
                .iter()
                .any(|a| matches!(a.kind, AnimKind::FadeIn { target, .. } if target == dot)),
            _ => false,
        })
        .unwrap();

    let fps = Fps::new(10, 1).unwrap();
    let secs = step.start_secs + 0.1 * step.duration_secs;
    let frame = Evaluator::eval_frame(&sb, fps, FrameIndex((secs * 10.0).round() as u64)).unwrap();
    let item = frame.items.iter().find(|i| i.source == dot).unwrap();
    let radius = item.mobject.bounds().width() / 2.0;
    assert!(
        radius > 0.3 && radius <= 0.12 / 0.3 + 1e-9,
        "radius {radius}"
    );
    assert!(item.opacity < 0.5);
}
