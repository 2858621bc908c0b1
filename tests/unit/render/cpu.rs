use super::*;
use crate::foundation::core::{Canvas, Rect};
use crate::foundation::palette::{BLACK, BLUE};
use kurbo::Shape as _;

fn backend() -> CpuBackend {
    CpuBackend::with_fontdb(
        RenderSettings::default(),
        Arc::new(usvg::fontdb::Database::new()),
    )
}

fn canvas() -> Canvas {
    Canvas {
        width: 64,
        height: 36,
    }
}

fn pixel(frame: &FrameRGBA, x: u32, y: u32) -> [u8; 4] {
    let i = ((y * frame.width + x) * 4) as usize;
    [
        frame.data[i],
        frame.data[i + 1],
        frame.data[i + 2],
        frame.data[i + 3],
    ]
}

#[test]
fn background_fills_every_pixel() {
    let plan = RenderPlan {
        canvas: canvas(),
        background: BLACK,
        ops: Vec::new(),
    };
    let frame = backend().render_plan(&plan).unwrap();
    assert_eq!(frame.data.len(), 64 * 36 * 4);
    assert!(frame.premultiplied);
    assert!(frame.data.chunks_exact(4).all(|px| px == [0, 0, 0, 255]));
}

#[test]
fn filled_paths_land_in_pixel_space() {
    let plan = RenderPlan {
        canvas: canvas(),
        background: BLACK,
        ops: vec![DrawOp::FillPath {
            path: Rect::new(8.0, 8.0, 24.0, 24.0).to_path(0.1),
            color: BLUE,
            opacity: 1.0,
        }],
    };
    let frame = backend().render_plan(&plan).unwrap();
    assert_eq!(pixel(&frame, 16, 16), [BLUE.r, BLUE.g, BLUE.b, 255]);
    assert_eq!(pixel(&frame, 40, 16), [0, 0, 0, 255]);
}

#[test]
fn half_opacity_blends_with_background() {
    let plan = RenderPlan {
        canvas: canvas(),
        background: BLACK,
        ops: vec![DrawOp::FillPath {
            path: Rect::new(0.0, 0.0, 64.0, 36.0).to_path(0.1),
            color: Rgba8::rgb(200, 200, 200),
            opacity: 0.5,
        }],
    };
    let frame = backend().render_plan(&plan).unwrap();
    let [r, _, _, a] = pixel(&frame, 30, 18);
    assert!((95..=105).contains(&r), "r = {r}");
    assert_eq!(a, 255);
}

#[test]
fn labels_are_rasterized_once_per_size() {
    let shape = crate::scene::text::TextShape::parse(r"\text{CLIP}", 40.0).unwrap();
    let text = TextOp {
        markup: shape.markup.clone(),
        runs: shape.runs,
        font_px: 12.0,
        center: Point::new(32.0, 18.0),
        color: BLUE,
        backstroke: None,
        reveal: 0.5,
        opacity: 1.0,
    };
    let plan = RenderPlan {
        canvas: canvas(),
        background: BLACK,
        ops: vec![DrawOp::Text(text.clone()), DrawOp::Text(text)],
    };
    let mut b = backend();
    b.render_plan(&plan).unwrap();
    b.render_plan(&plan).unwrap();
    assert_eq!(b.cached_labels(), 1);
}

#[test]
fn oversized_canvas_is_an_error() {
    let plan = RenderPlan {
        canvas: Canvas {
            width: 70_000,
            height: 10,
        },
        background: BLACK,
        ops: Vec::new(),
    };
    assert!(backend().render_plan(&plan).is_err());
}
