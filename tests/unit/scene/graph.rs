use super::*;

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn three_squares(g: &mut SceneGraph) -> (MobjectId, [MobjectId; 3]) {
    let a = g.add_leaf(Mobject::square(1.0));
    let b = g.add_leaf(Mobject::square(1.0));
    let c = g.add_leaf(Mobject::square(1.0));
    let group = g.add_group([a, b, c]).unwrap();
    (group, [a, b, c])
}

#[test]
fn add_group_rejects_unknown_children() {
    let mut g = SceneGraph::new();
    let err = g.add_group([MobjectId(7)]).unwrap_err();
    assert!(matches!(err, StoryError::Validation(_)));
}

#[test]
fn arrange_right_spaces_children_and_centers_group() {
    let mut g = SceneGraph::new();
    let (group, [a, b, c]) = three_squares(&mut g);
    g.arrange(group, RIGHT, 0.5).unwrap();

    let ba = g.bounds(a).unwrap();
    let bb = g.bounds(b).unwrap();
    let bc = g.bounds(c).unwrap();
    assert!(approx(bb.x0 - ba.x1, 0.5));
    assert!(approx(bc.x0 - bb.x1, 0.5));
    let center = g.center_of(group).unwrap();
    assert!(approx(center.x, 0.0) && approx(center.y, 0.0));
}

#[test]
fn arrange_down_stacks_top_to_bottom() {
    let mut g = SceneGraph::new();
    let (group, [a, b, _]) = three_squares(&mut g);
    g.arrange(group, DOWN, 0.1).unwrap();
    assert!(g.center_of(a).unwrap().y > g.center_of(b).unwrap().y);
    let gap = g.bounds(a).unwrap().y0 - g.bounds(b).unwrap().y1;
    assert!(approx(gap, 0.1));
}

#[test]
fn move_scale_and_set_height_compose() {
    let mut g = SceneGraph::new();
    let (group, _) = three_squares(&mut g);
    g.arrange(group, DOWN, 0.0).unwrap();
    g.set_height(group, 1.5).unwrap();
    assert!(approx(g.bounds(group).unwrap().height(), 1.5));

    g.move_to(group, Point::new(-5.0, -0.2)).unwrap();
    let c = g.center_of(group).unwrap();
    assert!(approx(c.x, -5.0) && approx(c.y, -0.2));

    g.scale(group, 2.0).unwrap();
    assert!(approx(g.bounds(group).unwrap().height(), 3.0));
    let c = g.center_of(group).unwrap();
    assert!(approx(c.x, -5.0) && approx(c.y, -0.2));
}

#[test]
fn scale_rejects_non_positive_factor() {
    let mut g = SceneGraph::new();
    let a = g.add_leaf(Mobject::square(1.0));
    assert!(g.scale(a, 0.0).is_err());
}

#[test]
fn to_edge_up_keeps_horizontal_position() {
    let mut g = SceneGraph::new();
    let a = g.add_leaf(Mobject::rect(2.0, 0.5).at(Point::new(1.0, 0.0)));
    g.to_edge(a, UP, 0.4).unwrap();
    let b = g.bounds(a).unwrap();
    assert!(approx(b.y1, FRAME_HEIGHT / 2.0 - 0.4));
    assert!(approx(b.center().x, 1.0));
}

#[test]
fn next_to_left_aligns_vertical_centers() {
    let mut g = SceneGraph::new();
    let anchor = g.add_leaf(Mobject::rect(1.0, 2.0).at(Point::new(0.0, 1.0)));
    let label = g.add_leaf(Mobject::square(0.4).at(Point::new(5.0, 5.0)));
    g.next_to(label, anchor, LEFT, 0.2).unwrap();
    let lb = g.bounds(label).unwrap();
    assert!(approx(lb.x1, -0.7));
    assert!(approx(lb.center().y, 1.0));
}

#[test]
fn copy_is_deep_and_independent() {
    let mut g = SceneGraph::new();
    let (group, _) = three_squares(&mut g);
    let dup = g.copy(group).unwrap();
    assert_ne!(dup, group);
    g.shift(dup, Vec2::new(3.0, 0.0)).unwrap();
    assert!(approx(g.center_of(group).unwrap().x, 0.0));
    assert!(approx(g.center_of(dup).unwrap().x, 3.0));
    assert!(!g.is_displayed(dup));
}

#[test]
fn shared_leaves_are_listed_once() {
    let mut g = SceneGraph::new();
    let a = g.add_leaf(Mobject::square(1.0));
    let b = g.add_leaf(Mobject::square(1.0));
    let inner = g.add_group([a]).unwrap();
    let outer = g.add_group([inner, a, b]).unwrap();
    assert_eq!(g.leaves(outer).unwrap(), vec![a, b]);

    g.show(inner).unwrap();
    g.show(outer).unwrap();
    g.show(outer).unwrap();
    assert_eq!(g.display_roots(), &[inner, outer]);
    assert_eq!(g.displayed_leaves().unwrap(), vec![a, b]);
}

#[test]
fn hide_removes_the_whole_family() {
    let mut g = SceneGraph::new();
    let a = g.add_leaf(Mobject::square(1.0));
    let group = g.add_group([a]).unwrap();
    g.show(a).unwrap();
    g.show(group).unwrap();
    g.hide(group).unwrap();
    assert!(!g.is_displayed(a));
    assert!(g.displayed_leaves().unwrap().is_empty());
}

#[test]
fn hiding_a_member_splits_its_displayed_group() {
    let mut g = SceneGraph::new();
    let (group, [a, b, c]) = three_squares(&mut g);
    g.show(group).unwrap();
    g.hide(b).unwrap();
    assert_eq!(g.display_roots(), &[a, c]);
    assert_eq!(g.displayed_leaves().unwrap(), vec![a, c]);
}

#[test]
fn empty_group_has_no_bounds() {
    let mut g = SceneGraph::new();
    let empty = g.add_group(Vec::new()).unwrap();
    assert!(g.bounds(empty).is_err());
}

#[test]
fn names_are_searchable() {
    let mut g = SceneGraph::new();
    let a = g.add_leaf(Mobject::square(1.0));
    g.set_name(a, "patch_grid").unwrap();
    assert_eq!(g.find("patch_grid"), Some(a));
    assert_eq!(g.name_of(a), Some("patch_grid"));
    assert_eq!(g.find("missing"), None);
}

#[test]
fn surrounding_rectangle_pads_bounds() {
    let mut g = SceneGraph::new();
    let a = g.add_leaf(Mobject::rect(2.0, 1.0).at(Point::new(1.0, 1.0)));
    let r = g.surrounding_rectangle(a, 0.1).unwrap();
    let b = r.bounds();
    assert!(approx(b.width(), 2.2) && approx(b.height(), 1.2));
    assert!(approx(b.center().x, 1.0) && approx(b.center().y, 1.0));
}

#[test]
fn leaf_and_children_report_kind_mismatch() {
    let mut g = SceneGraph::new();
    let (group, [a, ..]) = three_squares(&mut g);
    assert!(g.leaf(group).is_err());
    assert!(g.children(a).is_err());
    assert!(g.child(group, 5).is_err());
    assert_eq!(g.child(group, 0).unwrap(), a);
}

#[test]
fn set_stroke_and_fill_reach_every_nested_leaf() {
    let mut g = SceneGraph::new();
    let (inner, [a, b, c]) = three_squares(&mut g);
    let d = g.add_leaf(Mobject::dot(0.1, crate::foundation::palette::GREEN));
    let outer = g.add_group([inner, d]).unwrap();

    let yellow = crate::foundation::palette::YELLOW;
    g.set_stroke(outer, yellow, 3.0).unwrap();
    g.set_fill(inner, yellow, 0.4).unwrap();

    for leaf in [a, b, c, d] {
        let stroke = g.leaf(leaf).unwrap().style.stroke.unwrap();
        let got = (stroke.color, stroke.width, stroke.opacity);
        assert_eq!(got, (yellow, 3.0, 1.0));
    }
    for leaf in [a, b, c] {
        let fill = g.leaf(leaf).unwrap().style.fill.unwrap();
        assert_eq!((fill.color, fill.opacity), (yellow, 0.4));
    }
    let dot_fill = g.leaf(d).unwrap().style.fill.unwrap();
    assert_eq!(dot_fill.color, crate::foundation::palette::GREEN);
    assert!(g.set_fill(MobjectId(99), yellow, 1.0).is_err());
}
