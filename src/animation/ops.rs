use crate::{
    animation::anim::{AnimKind, Animation},
    animation::ease::Ease,
    foundation::core::Vec2,
    scene::graph::MobjectId,
};

pub fn fade_in(target: MobjectId) -> Animation {
    Animation::new(AnimKind::FadeIn {
        target,
        shift: Vec2::ZERO,
        scale: 1.0,
    })
}

pub fn fade_out(target: MobjectId) -> Animation {
    Animation::new(AnimKind::FadeOut {
        target,
        shift: Vec2::ZERO,
    })
}

/// Reveal runs at constant speed.
pub fn write(target: MobjectId) -> Animation {
    Animation::new(AnimKind::Write { target }).with_rate(Ease::Linear)
}

pub fn show_creation(target: MobjectId, lag_ratio: f64) -> Animation {
    Animation::new(AnimKind::ShowCreation { target, lag_ratio })
}

pub fn replacement_transform(source: MobjectId, target: MobjectId) -> Animation {
    Animation::new(AnimKind::ReplacementTransform { source, target })
}

pub fn transform(source: MobjectId, target: MobjectId) -> Animation {
    Animation::new(AnimKind::Transform { source, target })
}

/// Stagger `children`; the group clock is linear and each child keeps its own rate.
pub fn lagged_start(children: Vec<Animation>, lag_ratio: f64) -> Animation {
    Animation::new(AnimKind::LaggedStart {
        children,
        lag_ratio,
    })
    .with_rate(Ease::Linear)
}

/// Build one animation per target with `f` and stagger them.
pub fn lagged_start_map(
    targets: impl IntoIterator<Item = MobjectId>,
    lag_ratio: f64,
    f: impl FnMut(MobjectId) -> Animation,
) -> Animation {
    lagged_start(targets.into_iter().map(f).collect(), lag_ratio)
}
