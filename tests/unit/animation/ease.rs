use super::*;

const ALL: [Ease; 8] = [
    Ease::Linear,
    Ease::Smooth,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::InCubic,
    Ease::OutCubic,
    Ease::InOutCubic,
];

#[test]
fn every_ease_pins_endpoints_and_clamps() {
    for e in ALL {
        assert!(e.apply(0.0).abs() < 1e-12, "{e:?}");
        assert!((e.apply(1.0) - 1.0).abs() < 1e-12, "{e:?}");
        assert_eq!(e.apply(-3.0), e.apply(0.0));
        assert_eq!(e.apply(7.0), e.apply(1.0));
    }
}

#[test]
fn smooth_is_symmetric_and_monotone() {
    assert!((Ease::Smooth.apply(0.5) - 0.5).abs() < 1e-12);
    let mut prev = 0.0;
    for i in 1..=100 {
        let t = f64::from(i) / 100.0;
        let v = Ease::Smooth.apply(t);
        assert!(v >= prev);
        assert!((v + Ease::Smooth.apply(1.0 - t) - 1.0).abs() < 1e-9);
        prev = v;
    }
}

#[test]
fn smooth_is_the_default() {
    assert_eq!(Ease::default(), Ease::Smooth);
}
