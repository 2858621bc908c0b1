//! Scene B: image and text travel through embeddings and encoders into a joint space.

use crate::{
    animation::ops::{fade_in, fade_out, lagged_start_map, show_creation, transform, write},
    foundation::core::{DOWN, LEFT, Point, RIGHT, Rgba8, UP, Vec2},
    foundation::error::StoryResult,
    foundation::palette::{
        BLACK, BLUE, BLUE_E, GREEN, GREEN_E, GREY_A, PURPLE, Palette, WHITE, YELLOW,
    },
    scene::graph::MobjectId,
    scene::shape::Mobject,
    scenes::{SceneDef, bar_stack, grid_lines, label, named, patch_grid, token_boxes},
    timeline::director::Director,
};

const PATCH_SIDE: f64 = 0.45;
const WORDS: [&str; 5] = ["A", "photo", "of", "a", "cat"];
const BAR_STACK_HEIGHT: f64 = 2.2;
const SPACE_Y: f64 = -2.5;

/// Full CLIP pipeline: both modalities are split, embedded, encoded and projected into one
/// space where the matching pair ends up close together.
pub struct ClipExplainer;

impl SceneDef for ClipExplainer {
    fn name(&self) -> &'static str {
        "clip-explainer"
    }

    fn description(&self) -> &'static str {
        "image and text encoders meeting in a joint embedding space"
    }

    fn construct(&self, d: &mut Director) -> StoryResult<()> {
        d.set_background(BLACK);

        let g = d.graph_mut();
        let title = named(
            g,
            "title",
            Mobject::text(
                r"\text{CLIP: Contrastive Language--Image Pre-training}",
                40.0,
                WHITE,
            )?,
        )?;
        g.to_edge(title, UP, 0.4)?;
        d.play([write(title)], 1.5)?;
        d.wait(0.5)?;

        let inputs = inputs(d)?;
        let stage_labels = split_and_tokenize(d, &inputs)?;

        // Clear the captions and park both inputs along the top edge.
        d.play([title, stage_labels.0, stage_labels.1].map(fade_out), 0.6)?;
        let g = d.graph_mut();
        let img_group =
            g.add_group([inputs.grid, inputs.border, inputs.lines, inputs.img_label])?;
        g.set_name(img_group, "image_group")?;
        let txt_group = g.add_group([inputs.tokens, inputs.txt_label])?;
        g.set_name(txt_group, "text_group")?;
        let img_park = d.animate(img_group, |g, id| {
            g.scale(id, 0.7)?;
            g.move_to(id, Point::new(-5.0, 2.8))
        })?;
        let txt_park = d.animate(txt_group, |g, id| {
            g.scale(id, 0.7)?;
            g.move_to(id, Point::new(5.0, 2.8))
        })?;
        d.play([img_park, txt_park], 1.0)?;
        d.wait(0.3)?;

        let patch_bars = embedding_column(
            d,
            Column {
                name: "patch_bars",
                source: img_group,
                colors: Palette::patches().colors(),
                bar: (0.6, 0.15),
                buff: 0.02,
                x: -5.0,
                label: ["Patch", "Embeddings"],
                label_side: LEFT,
                color: BLUE,
                lag: 0.05,
            },
        )?;
        let token_bars = embedding_column(
            d,
            Column {
                name: "token_bars",
                source: txt_group,
                colors: Palette::tokens().expect_len(WORDS.len())?,
                bar: (0.6, 0.3),
                buff: 0.04,
                x: 5.0,
                label: ["Token", "Embeddings"],
                label_side: RIGHT,
                color: GREEN,
                lag: 0.1,
            },
        )?;

        let img_encoder = encoder(
            d,
            "img_encoder",
            patch_bars,
            "Image Encoder (ViT)",
            (BLUE_E, BLUE),
        )?;
        let txt_encoder = encoder(
            d,
            "txt_encoder",
            token_bars,
            "Text Encoder",
            (GREEN_E, GREEN),
        )?;
        d.play(
            [
                show_creation(img_encoder.arrow, 0.0),
                show_creation(txt_encoder.arrow, 0.0),
            ],
            0.6,
        )?;
        d.play(
            [
                fade_in(img_encoder.block),
                fade_in(img_encoder.text),
                fade_in(txt_encoder.block),
                fade_in(txt_encoder.text),
            ],
            0.8,
        )?;
        d.wait(0.5)?;

        let space = joint_space(d, img_encoder.block, txt_encoder.block)?;
        similarity(d, &space)?;

        let g = d.graph_mut();
        let caption = named(
            g,
            "match_text",
            Mobject::text(
                r"\text{Matching pair} \rightarrow \text{High similarity}",
                28.0,
                YELLOW,
            )?
            .with_backstroke(4.0)
            .at(Point::new(0.0, -3.3)),
        )?;
        d.play(
            [fade_out(space.label), fade_in(caption).with_shift(UP * 0.2)],
            0.8,
        )?;
        d.wait(2.0)?;
        d.inspect();
        Ok(())
    }
}

struct Inputs {
    grid: MobjectId,
    border: MobjectId,
    lines: MobjectId,
    img_label: MobjectId,
    sentence: MobjectId,
    tokens: MobjectId,
    txt_label: MobjectId,
}

/// Grid and sentence fade in side by side. Border and lines are built but not shown yet.
fn inputs(d: &mut Director) -> StoryResult<Inputs> {
    let g = d.graph_mut();
    let (grid, cells) = patch_grid(
        g,
        &Palette::patches(),
        PATCH_SIDE,
        0.5,
        Point::new(-4.5, -0.3),
    )?;
    g.set_name(grid, "image_grid")?;
    let img_label = label(g, "Image", 28.0, BLUE)?;
    g.next_to(img_label, grid, UP, 0.25)?;
    let sentence = named(
        g,
        "sentence",
        Mobject::text(r"\text{A photo of a cat}", 30.0, GREEN)?.at(Point::new(4.5, -0.3)),
    )?;
    let txt_label = label(g, "Text", 28.0, GREEN)?;
    g.next_to(txt_label, sentence, UP, 0.25)?;

    d.play(
        [
            fade_in(grid).with_shift(UP * 0.3),
            fade_in(img_label),
            fade_in(sentence).with_shift(UP * 0.3),
            fade_in(txt_label),
        ],
        1.2,
    )?;
    d.wait(0.5)?;

    let g = d.graph_mut();
    let frame = g.surrounding_rectangle(grid, 0.02)?.with_stroke(WHITE, 2.0);
    let border = named(g, "grid_border", frame)?;
    let lines = grid_lines(g, &cells, PATCH_SIDE, 2.0)?;
    g.set_name(lines, "grid_lines")?;
    let tokens = token_boxes(g, &WORDS, &[GREEN; WORDS.len()], 26.0, 0.08)?;
    g.set_name(tokens, "tokens")?;
    g.arrange(tokens, RIGHT, 0.15)?;
    let at = g.center_of(sentence)?;
    g.move_to(tokens, at)?;

    Ok(Inputs {
        grid,
        border,
        lines,
        img_label,
        sentence,
        tokens,
        txt_label,
    })
}

/// Cut the grid into patches and the sentence into tokens. Returns the two stage captions.
fn split_and_tokenize(d: &mut Director, inputs: &Inputs) -> StoryResult<(MobjectId, MobjectId)> {
    let g = d.graph_mut();
    let patches_label = label(g, "Split into patches", 22.0, GREY_A)?;
    g.next_to(patches_label, inputs.grid, DOWN, 0.3)?;
    d.play(
        [
            show_creation(inputs.border, 0.0),
            show_creation(inputs.lines, 0.1),
            fade_in(patches_label).with_shift(DOWN * 0.2),
        ],
        1.2,
    )?;
    d.wait(0.5)?;

    let g = d.graph_mut();
    let tokens_label = label(g, "Tokenize", 22.0, GREY_A)?;
    g.next_to(tokens_label, inputs.tokens, DOWN, 0.3)?;
    let boxes = g.children(inputs.tokens)?.to_vec();
    d.play(
        [
            fade_out(inputs.sentence),
            lagged_start_map(boxes, 0.15, fade_in),
            fade_in(tokens_label).with_shift(DOWN * 0.2),
        ],
        1.2,
    )?;
    d.wait(0.5)?;
    Ok((patches_label, tokens_label))
}

struct Column<'a> {
    name: &'static str,
    source: MobjectId,
    colors: &'a [Rgba8],
    bar: (f64, f64),
    buff: f64,
    x: f64,
    label: [&'static str; 2],
    label_side: Vec2,
    color: Rgba8,
    lag: f64,
}

/// Bars below a parked input, an arrow feeding them, and a two-line caption beside them.
fn embedding_column(d: &mut Director, col: Column<'_>) -> StoryResult<MobjectId> {
    let g = d.graph_mut();
    let bars = bar_stack(g, col.colors, col.bar, 0.8, 0.5, col.buff)?;
    g.set_name(bars, col.name)?;
    g.set_height(bars, BAR_STACK_HEIGHT)?;
    g.move_to(bars, Point::new(col.x, -0.2))?;

    let lines = [
        label(g, col.label[0], 18.0, GREY_A)?,
        label(g, col.label[1], 18.0, GREY_A)?,
    ];
    let caption = g.add_group(lines)?;
    g.arrange(caption, DOWN, 0.05)?;
    g.next_to(caption, bars, col.label_side, 0.2)?;

    let start = g.bottom(col.source)? + DOWN * 0.1;
    let end = g.top(bars)? + UP * 0.1;
    let arrow = g.add_leaf(Mobject::arrow(start, end, 0.1).with_stroke(col.color, 3.0));

    d.play([show_creation(arrow, 0.0)], 0.6)?;
    let children = d.graph().children(bars)?.to_vec();
    d.play(
        [
            lagged_start_map(children, col.lag, |b| fade_in(b).with_shift(DOWN * 0.1)),
            fade_in(caption),
        ],
        1.0,
    )?;
    d.wait(0.3)?;
    Ok(bars)
}

struct Encoder {
    block: MobjectId,
    text: MobjectId,
    arrow: MobjectId,
}

/// Rounded block 0.6 below `bars` with its caption and feeding arrow, none shown yet.
fn encoder(
    d: &mut Director,
    name: &str,
    bars: MobjectId,
    text: &str,
    (fill, stroke): (Rgba8, Rgba8),
) -> StoryResult<Encoder> {
    let g = d.graph_mut();
    let block = named(g, name, Mobject::rounded_rect(2.2, 0.8, 0.15))?;
    g.set_fill(block, fill, 0.6)?;
    g.set_stroke(block, stroke, 2.0)?;
    g.next_to(block, bars, DOWN, 0.6)?;
    let caption = label(g, text, 16.0, WHITE)?;
    let at = g.center_of(block)?;
    g.move_to(caption, at)?;
    let feed = Mobject::arrow(g.bottom(bars)?, g.top(block)?, 0.1).with_stroke(stroke, 3.0);
    let arrow = g.add_leaf(feed);
    Ok(Encoder {
        block,
        text: caption,
        arrow,
    })
}

struct JointSpace {
    label: MobjectId,
    dots: [MobjectId; 2],
    dot_labels: [MobjectId; 2],
}

fn joint_space(
    d: &mut Director,
    img_encoder: MobjectId,
    txt_encoder: MobjectId,
) -> StoryResult<JointSpace> {
    let g = d.graph_mut();
    let space_label = named(
        g,
        "space_label",
        Mobject::text(r"\text{Joint Embedding Space}", 28.0, YELLOW)?.at(Point::new(0.0, -3.3)),
    )?;
    let sides = [
        (
            "img_emb_dot",
            BLUE,
            Point::new(-0.8, SPACE_Y),
            r"\vec{e}_I",
            img_encoder,
            LEFT,
        ),
        (
            "txt_emb_dot",
            GREEN,
            Point::new(0.8, SPACE_Y),
            r"\vec{e}_T",
            txt_encoder,
            RIGHT,
        ),
    ];

    let mut dots = Vec::with_capacity(2);
    let mut dot_labels = Vec::with_capacity(2);
    let mut arrows = Vec::with_capacity(2);
    let mut arrow_labels = Vec::with_capacity(2);
    for (name, color, at, markup, encoder, side) in sides {
        let dot = named(g, name, Mobject::dot(0.12, color).at(at))?;
        let dot_label = g.add_leaf(Mobject::text(markup, 28.0, color)?);
        g.next_to(dot_label, dot, UP, 0.15)?;

        let end = g.center_of(dot)? + UP * 0.2 + side * 0.5;
        let shaft = Mobject::arrow(g.bottom(encoder)?, end, 0.15).with_stroke(PURPLE, 3.0);
        let arrow = g.add_leaf(shaft);
        let project =
            g.add_leaf(Mobject::text(r"\text{project}", 16.0, PURPLE)?.with_backstroke(3.0));
        g.next_to(project, arrow, side, 0.1)?;

        dots.push(dot);
        dot_labels.push(dot_label);
        arrows.push(arrow);
        arrow_labels.push(project);
    }
    let ellipse = g.add_leaf(
        Mobject::ellipse(5.0, 1.8)
            .with_stroke(YELLOW, 1.5)
            .with_stroke_opacity(0.5)
            .at(Point::new(0.0, SPACE_Y)),
    );
    g.set_name(ellipse, "space_region")?;

    d.play(
        arrows
            .iter()
            .map(|&a| show_creation(a, 0.0))
            .chain(arrow_labels.iter().map(|&l| fade_in(l))),
        1.0,
    )?;
    d.play(
        [fade_in(ellipse), fade_in(space_label).with_shift(UP * 0.2)],
        0.8,
    )?;
    d.play(
        dots.iter()
            .map(|&dot| fade_in(dot).with_scale(0.3))
            .chain(dot_labels.iter().map(|&l| fade_in(l))),
        0.8,
    )?;
    d.wait(0.5)?;

    Ok(JointSpace {
        label: space_label,
        dots: [dots[0], dots[1]],
        dot_labels: [dot_labels[0], dot_labels[1]],
    })
}

/// Dashed cosine-similarity line, then the dots pull together around its midpoint.
fn similarity(d: &mut Director, space: &JointSpace) -> StoryResult<()> {
    let [img_dot, txt_dot] = space.dots;
    let g = d.graph_mut();
    let a = g.center_of(img_dot)?;
    let b = g.center_of(txt_dot)?;
    let line = named(
        g,
        "sim_line",
        Mobject::dashed_line(a, b).with_stroke(YELLOW, 2.0),
    )?;
    let caption = g.add_leaf(
        Mobject::text(r"\text{cosine similarity}", 22.0, YELLOW)?.with_backstroke(3.0),
    );
    g.set_name(caption, "sim_label")?;
    g.next_to(caption, line, DOWN, 0.15)?;
    d.play([show_creation(line, 0.0), fade_in(caption)], 0.8)?;
    d.wait(0.3)?;

    let m = a.midpoint(b);
    let off = Vec2::new(0.15, 0.0);
    let short = d
        .graph_mut()
        .add_leaf(Mobject::dashed_line(m - off, m + off).with_stroke(YELLOW, 2.0));

    let mut moves = Vec::with_capacity(5);
    for (k, sign) in [-1.0, 1.0].into_iter().enumerate() {
        let to = m + off * sign;
        moves.push(d.animate(space.dots[k], move |g, id| g.move_to(id, to))?);
        moves.push(d.animate(space.dot_labels[k], move |g, id| {
            g.move_to(id, to + UP * 0.3)
        })?);
    }
    moves.push(transform(line, short));
    d.play(moves, 1.5)?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/scenes/clip_explainer.rs"]
mod tests;
