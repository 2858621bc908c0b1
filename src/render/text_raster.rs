//! Text rasterization through `usvg`/`resvg`.
//!
//! Each text op becomes a tiny SVG document with one `<text>` element. Layout metrics come from
//! [`crate::scene::text`]; only the glyph shapes come from the font database.

use std::{path::Path, sync::Arc};

use crate::{
    compile::plan::{BACKSTROKE_COLOR, TextOp},
    foundation::error::{StoryError, StoryResult},
    scene::text::{Baseline, HEIGHT_EM, SUBSCRIPT_SCALE},
};

/// Directory with extra `.ttf`/`.otf`/`.ttc` files to load next to the system fonts.
pub const FONT_DIR_ENV: &str = "CLIPSTORY_FONT_DIR";

const SUBSCRIPT_EXTRA_EM: f64 = 0.2;
const MAX_DIM: u32 = 8_192;

/// Cache key for a rasterized label. Sizes are bucketed to quarter pixels.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextRasterKey {
    pub markup: String,
    pub color: [u8; 4],
    pub size_q: u32,
    pub backstroke_q: u32,
}

impl TextRasterKey {
    pub fn for_op(op: &TextOp) -> Self {
        Self {
            markup: op.markup.clone(),
            color: [op.color.r, op.color.g, op.color.b, op.color.a],
            size_q: quantize(op.font_px),
            backstroke_q: op.backstroke.map_or(0, quantize),
        }
    }
}

fn quantize(px: f64) -> u32 {
    (px.max(0.0) * 4.0).round() as u32
}

/// Premultiplied RGBA8 raster of one label.
#[derive(Clone, Debug)]
pub struct TextRaster {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Vec<u8>,
    /// Raster point that lands on the op's center.
    pub anchor: (f64, f64),
    /// Horizontal extent of inked columns, used for left-to-right reveals.
    pub ink_x0: f64,
    pub ink_x1: f64,
}

pub fn build_fontdb() -> Arc<usvg::fontdb::Database> {
    let mut db = usvg::fontdb::Database::new();
    db.load_system_fonts();
    if let Some(dir) = std::env::var_os(FONT_DIR_ENV) {
        let dir = Path::new(&dir);
        load_fonts_from_dir(&mut db, dir);
        load_fonts_from_dir(&mut db, &dir.join("fonts"));
    }
    tracing::debug!(faces = db.len(), "font database ready");
    Arc::new(db)
}

fn load_fonts_from_dir(db: &mut usvg::fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

/// Prefer the requested families, then any sans-serif face, then whatever is installed.
fn font_resolver() -> usvg::FontResolver<'static> {
    usvg::FontResolver {
        select_font: Box::new(|font, fontdb| {
            let mut families = Vec::<usvg::fontdb::Family<'_>>::new();
            for family in font.families() {
                families.push(match family {
                    usvg::FontFamily::Serif => usvg::fontdb::Family::Serif,
                    usvg::FontFamily::SansSerif => usvg::fontdb::Family::SansSerif,
                    usvg::FontFamily::Cursive => usvg::fontdb::Family::Cursive,
                    usvg::FontFamily::Fantasy => usvg::fontdb::Family::Fantasy,
                    usvg::FontFamily::Monospace => usvg::fontdb::Family::Monospace,
                    usvg::FontFamily::Named(s) => usvg::fontdb::Family::Name(s),
                });
            }
            families.push(usvg::fontdb::Family::SansSerif);
            families.push(usvg::fontdb::Family::Serif);

            let query = usvg::fontdb::Query {
                families: &families,
                weight: usvg::fontdb::Weight(font.weight()),
                stretch: usvg::fontdb::Stretch::Normal,
                style: usvg::fontdb::Style::Normal,
            };
            fontdb
                .query(&query)
                .or_else(|| fontdb.faces().next().map(|f| f.id))
        }),
        select_fallback: usvg::FontResolver::default_fallback_selector(),
    }
}

/// Raster size and baseline for `op` at its bucketed size.
struct Layout {
    width: u32,
    height: u32,
    font_px: f64,
    baseline: f64,
    anchor: (f64, f64),
}

fn layout(op: &TextOp) -> StoryResult<Layout> {
    let font_px = f64::from(quantize(op.font_px)) / 4.0;
    if font_px <= 0.0 {
        return Err(StoryError::evaluation(
            "text font size rounds to zero pixels",
        ));
    }
    let halo = op.backstroke.unwrap_or(0.0);
    let pad = (font_px * 0.5 + halo).ceil();
    let glyphs: usize = op.runs.iter().map(|r| r.text.chars().count()).sum();
    let glyphs = glyphs as f64;
    let width = (glyphs * font_px + 2.0 * pad).ceil();
    let height = (font_px * 1.6 + 2.0 * pad).ceil();
    if width > f64::from(MAX_DIM) || height > f64::from(MAX_DIM) {
        return Err(StoryError::evaluation(format!(
            "text raster size too large: {width}x{height} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }

    let has_sub = op.runs.iter().any(|r| r.baseline == Baseline::Subscript);
    let box_em = HEIGHT_EM + if has_sub { SUBSCRIPT_EXTRA_EM } else { 0.0 };
    let sub_em = if has_sub { SUBSCRIPT_EXTRA_EM } else { 0.0 };
    let baseline = pad + font_px * 1.05;
    // Metric box center sits `box/2 - subscript depth` above the baseline.
    let anchor_y = baseline - (box_em / 2.0 - sub_em) * font_px;

    Ok(Layout {
        width: width as u32,
        height: height as u32,
        font_px,
        baseline,
        anchor: (width / 2.0, anchor_y),
    })
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// SVG document for `op`, sized to the raster layout.
pub fn text_svg(op: &TextOp) -> StoryResult<String> {
    let l = layout(op)?;
    let mut spans = String::new();
    for run in &op.runs {
        let text = escape_xml(&run.text);
        match run.baseline {
            Baseline::Normal => spans.push_str(&format!("<tspan>{text}</tspan>")),
            Baseline::Subscript => spans.push_str(&format!(
                "<tspan baseline-shift=\"sub\" font-size=\"{:.2}\">{text}</tspan>",
                l.font_px * SUBSCRIPT_SCALE
            )),
        }
    }

    let halo = match op.backstroke {
        Some(w) if w > 0.0 => format!(
            concat!(
                " stroke=\"{}\" stroke-width=\"{w:.2}\"",
                " stroke-linejoin=\"round\" paint-order=\"stroke\""
            ),
            BACKSTROKE_COLOR.to_hex(),
            w = w
        ),
        _ => String::new(),
    };

    Ok(format!(
        concat!(
            "<svg xmlns=\"http://www.w3.org/2000/svg\"",
            " width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">",
            "<text x=\"{x:.2}\" y=\"{y:.2}\" font-family=\"sans-serif\" font-size=\"{size:.2}\" ",
            "text-anchor=\"middle\" fill=\"{fill}\" fill-opacity=\"{alpha:.4}\"{halo}",
            " xml:space=\"preserve\">",
            "{spans}</text></svg>"
        ),
        w = l.width,
        h = l.height,
        x = f64::from(l.width) / 2.0,
        y = l.baseline,
        size = l.font_px,
        fill = op.color.to_hex(),
        alpha = f64::from(op.color.a) / 255.0,
        halo = halo,
        spans = spans,
    ))
}

#[tracing::instrument(skip(op, fontdb), fields(markup = %op.markup))]
pub fn rasterize_text(
    op: &TextOp,
    fontdb: &Arc<usvg::fontdb::Database>,
) -> StoryResult<TextRaster> {
    let l = layout(op)?;
    let svg = text_svg(op)?;
    let opts = usvg::Options {
        fontdb: fontdb.clone(),
        font_resolver: font_resolver(),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&svg, &opts)
        .map_err(|e| StoryError::evaluation(format!("text svg did not parse: {e}")))?;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(l.width, l.height)
        .ok_or_else(|| StoryError::evaluation("failed to allocate text pixmap"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );
    let rgba8_premul = pixmap.data().to_vec();
    let (ink_x0, ink_x1) = ink_columns(&rgba8_premul, l.width).unwrap_or((l.anchor.0, l.anchor.0));

    Ok(TextRaster {
        width: l.width,
        height: l.height,
        rgba8_premul,
        anchor: l.anchor,
        ink_x0,
        ink_x1,
    })
}

/// First and one-past-last column with any coverage.
fn ink_columns(rgba: &[u8], width: u32) -> Option<(f64, f64)> {
    let width = width as usize;
    if width == 0 {
        return None;
    }
    let mut lo = usize::MAX;
    let mut hi = 0usize;
    for (i, px) in rgba.chunks_exact(4).enumerate() {
        if px[3] != 0 {
            let x = i % width;
            lo = lo.min(x);
            hi = hi.max(x + 1);
        }
    }
    (lo < hi).then_some((lo as f64, hi as f64))
}

#[cfg(test)]
#[path = "../../tests/unit/render/text_raster.rs"]
mod tests;
