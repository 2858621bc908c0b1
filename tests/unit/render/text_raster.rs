use super::*;
use crate::foundation::core::{Point, Rgba8};
use crate::scene::text::TextShape;

fn op(markup: &str, backstroke: Option<f64>) -> TextOp {
    let shape = TextShape::parse(markup, 40.0).unwrap();
    TextOp {
        markup: shape.markup.clone(),
        runs: shape.runs,
        font_px: 30.6,
        center: Point::new(100.0, 100.0),
        color: Rgba8::rgb(0x58, 0xc4, 0xdd),
        backstroke,
        reveal: 1.0,
        opacity: 1.0,
    }
}

#[test]
fn svg_escapes_markup_and_centers_text() {
    let svg = text_svg(&op(r"\text{a < b & c}", None)).unwrap();
    assert!(svg.contains("a &lt; b &amp; c"));
    assert!(svg.contains("text-anchor=\"middle\""));
    assert!(svg.contains("fill=\"#58c4dd\""));
    assert!(!svg.contains("paint-order"));
}

#[test]
fn subscripts_become_shifted_tspans() {
    let svg = text_svg(&op(r"\vec{e}_I", None)).unwrap();
    assert!(svg.contains("baseline-shift=\"sub\""));
    assert!(svg.contains(">I</tspan>"));
}

#[test]
fn backstroke_paints_a_black_halo_under_the_fill() {
    let svg = text_svg(&op(r"\text{CLIP}", Some(2.5))).unwrap();
    assert!(svg.contains("stroke=\"#000000\""));
    assert!(svg.contains("stroke-width=\"2.50\""));
    assert!(svg.contains("paint-order=\"stroke\""));
}

#[test]
fn cache_keys_bucket_sizes_to_quarter_pixels() {
    let a = TextRasterKey::for_op(&op(r"\text{x}", None));
    let mut nudged = op(r"\text{x}", None);
    nudged.font_px += 0.05;
    assert_eq!(a, TextRasterKey::for_op(&nudged));
    nudged.font_px += 0.5;
    assert_ne!(a, TextRasterKey::for_op(&nudged));
}

#[test]
fn tiny_fonts_are_rejected() {
    let mut tiny = op(r"\text{x}", None);
    tiny.font_px = 0.01;
    assert!(text_svg(&tiny).is_err());
}

#[test]
fn ink_columns_find_covered_span() {
    let mut px = vec![0u8; 4 * 4 * 2];
    // Row 1, columns 1 and 2.
    px[(4 + 1) * 4 + 3] = 255;
    px[(4 + 2) * 4 + 3] = 10;
    assert_eq!(ink_columns(&px, 4), Some((1.0, 3.0)));
    assert_eq!(ink_columns(&[0u8; 16], 4), None);
}

#[test]
fn rasterizing_without_fonts_yields_a_blank_raster() {
    let db = Arc::new(usvg::fontdb::Database::new());
    let r = rasterize_text(&op(r"\text{CLIP}", None), &db).unwrap();
    assert_eq!(r.rgba8_premul.len(), (r.width * r.height * 4) as usize);
    assert!(r.anchor.0 > 0.0 && r.anchor.1 > 0.0);
    assert!(r.ink_x0 <= r.ink_x1);
}
