//! Scene A: an image grid and a sentence become patch and text embedding bars.

use crate::{
    animation::anim::Animation,
    animation::ops::{fade_in, fade_out, lagged_start, replacement_transform, show_creation, write},
    foundation::core::{DOWN, LEFT, Point, UP},
    foundation::error::StoryResult,
    foundation::palette::{BLACK, GREEN_C, GREY_A, GREY_B, Palette},
    scene::graph::MobjectId,
    scene::shape::Mobject,
    scenes::{SceneDef, bar_stack, grid_lines, label, named, patch_grid, token_boxes},
    timeline::director::Director,
};

const PATCH_SIDE: f64 = 0.5;
const WORDS: [&str; 5] = ["a", "photo", "of", "a", "cat"];

/// Patch and token encoding walkthrough: the image is cut into patches, the sentence into
/// tokens, and both morph into embedding bars.
pub struct ClipEncoding;

impl SceneDef for ClipEncoding {
    fn name(&self) -> &'static str {
        "clip-encoding"
    }

    fn description(&self) -> &'static str {
        "patches and tokens morph into embedding bars"
    }

    fn construct(&self, d: &mut Director) -> StoryResult<()> {
        d.set_background(BLACK);
        let patch_colors = Palette::patches();
        let token_colors = Palette::tokens();
        let token_colors = token_colors.expect_len(WORDS.len())?;

        // Image and sentence side by side.
        let g = d.graph_mut();
        let (grid, cells) = patch_grid(g, &patch_colors, PATCH_SIDE, 0.8, Point::new(-5.0, 0.0))?;
        g.set_name(grid, "image_grid")?;
        let sentence = named(
            g,
            "sentence",
            Mobject::text(r"\text{a photo of a cat}", 44.0, GREEN_C)?.at(Point::new(4.0, 0.0)),
        )?;
        let img_lbl = label(g, "Image", 26.0, GREY_B)?;
        g.next_to(img_lbl, grid, UP, 0.3)?;
        let txt_lbl = label(g, "Text", 26.0, GREY_B)?;
        g.next_to(txt_lbl, sentence, UP, 0.3)?;

        d.play(
            [
                fade_in(grid).with_shift(UP * 0.3),
                fade_in(img_lbl),
                write(sentence),
                fade_in(txt_lbl),
            ],
            1.5,
        )?;
        d.wait(1.0)?;

        // Sentence -> token column -> text embeddings.
        d.play([fade_out(img_lbl), fade_out(txt_lbl)], 0.4)?;

        let g = d.graph_mut();
        let tokens = token_boxes(g, &WORDS, token_colors, 34.0, 0.1)?;
        g.set_name(tokens, "tokens")?;
        g.arrange(tokens, DOWN, 0.12)?;
        let at = g.center_of(sentence)?;
        g.move_to(tokens, at)?;
        d.play([replacement_transform(sentence, tokens)], 1.2)?;
        d.wait(0.4)?;

        let g = d.graph_mut();
        let text_bars = bar_stack(g, token_colors, (1.5, 0.22), 0.9, 0.5, 0.07)?;
        g.set_name(text_bars, "text_bars")?;
        g.move_to(text_bars, Point::new(1.8, 0.0))?;
        let morphs = pairwise_copies(d, tokens, text_bars)?;
        d.play([lagged_start(morphs, 0.25)], 1.8)?;
        d.play([fade_out(tokens)], 0.5)?;

        let g = d.graph_mut();
        let txt_emb_lbl = label(g, "Text Embeddings", 22.0, GREY_A)?;
        g.set_name(txt_emb_lbl, "text_emb_label")?;
        g.next_to(txt_emb_lbl, text_bars, UP, 0.25)?;
        d.play([fade_in(txt_emb_lbl)], 0.5)?;
        d.wait(0.8)?;

        // Grid lines, then patches -> patch embeddings.
        let g = d.graph_mut();
        let lines = grid_lines(g, &cells, PATCH_SIDE, 2.5)?;
        g.set_name(lines, "grid_lines")?;
        let patch_lbl = label(g, "Split into patches", 22.0, GREY_A)?;
        g.next_to(patch_lbl, grid, DOWN, 0.3)?;
        d.play(
            [
                show_creation(lines, 0.05),
                fade_in(patch_lbl).with_shift(DOWN * 0.15),
            ],
            0.9,
        )?;
        d.wait(0.5)?;
        d.play([fade_out(patch_lbl)], 0.4)?;

        let g = d.graph_mut();
        let patch_bars = bar_stack(g, patch_colors.colors(), (1.5, 0.135), 0.9, 0.4, 0.03)?;
        g.set_name(patch_bars, "patch_bars")?;
        g.move_to(patch_bars, Point::ORIGIN + LEFT * 1.8)?;
        let morphs = pairwise_copies(d, grid, patch_bars)?;
        d.play([lagged_start(morphs, 0.06)], 2.5)?;

        let g = d.graph_mut();
        let patch_emb_lbl = label(g, "Patch Embeddings", 22.0, GREY_A)?;
        g.set_name(patch_emb_lbl, "patch_emb_label")?;
        g.next_to(patch_emb_lbl, patch_bars, UP, 0.25)?;
        d.play([fade_in(patch_emb_lbl)], 0.5)?;
        d.wait(2.0)?;
        d.inspect();
        Ok(())
    }
}

/// `ReplacementTransform(copy of source[i] -> target[i])` for every child pair.
fn pairwise_copies(
    d: &mut Director,
    sources: MobjectId,
    targets: MobjectId,
) -> StoryResult<Vec<Animation>> {
    let g = d.graph_mut();
    let src = g.children(sources)?.to_vec();
    let dst = g.children(targets)?.to_vec();
    let mut out = Vec::with_capacity(src.len());
    for (s, t) in src.into_iter().zip(dst) {
        let copy = g.copy(s)?;
        out.push(replacement_transform(copy, t));
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/scenes/clip_encoding.rs"]
mod tests;
