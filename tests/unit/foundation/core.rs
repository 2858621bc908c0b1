use super::*;

#[test]
fn frame_range_contains_boundaries() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert!(!r.contains(FrameIndex(1)));
    assert!(r.contains(FrameIndex(2)));
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    assert_eq!(r.len_frames(), 3);
}

#[test]
fn frame_range_rejects_inverted() {
    assert!(FrameRange::new(FrameIndex(5), FrameIndex(2)).is_err());
}

#[test]
fn fps_ceil_does_not_overshoot_exact_durations() {
    let fps = Fps::new(30, 1).unwrap();
    assert_eq!(fps.secs_to_frames_ceil(2.0), 60);
    assert_eq!(fps.secs_to_frames_ceil(0.1 + 0.2), 9);
    assert_eq!(fps.secs_to_frames_ceil(0.01), 1);
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(30, 0).is_err());
}

#[test]
fn scene_to_pixels_maps_origin_to_center_and_flips_y() {
    let canvas = Canvas {
        width: 1280,
        height: 720,
    };
    let a = canvas.scene_to_pixels();
    let c = a * Point::ORIGIN;
    assert_eq!(c, Point::new(640.0, 360.0));

    let top = a * Point::new(0.0, FRAME_HEIGHT / 2.0);
    assert!((top.y - 0.0).abs() < 1e-9);
    assert!((canvas.frame_width() - 8.0 * 16.0 / 9.0).abs() < 1e-9);
}

#[test]
fn hex_colors_parse_and_premultiply() {
    let c = Rgba8::from_hex("#58C4DD").unwrap();
    assert_eq!(c, Rgba8::rgb(0x58, 0xc4, 0xdd));
    assert_eq!(c.to_hex(), "#58c4dd");
    assert!(Rgba8::from_hex("#12").is_err());
    assert!(Rgba8::from_hex("#zzzzzz").is_err());

    let half = Rgba8::from_hex("#ff000080").unwrap();
    assert_eq!(half.to_premul(), [128, 0, 0, 128]);
}

#[test]
fn color_lerp_hits_endpoints() {
    let a = Rgba8::rgb(0, 0, 0);
    let b = Rgba8::rgb(255, 100, 50);
    assert_eq!(a.lerp(b, 0.0), a);
    assert_eq!(a.lerp(b, 1.0), b);
    assert_eq!(a.lerp(b, 0.5), Rgba8::rgb(128, 50, 25));
}
