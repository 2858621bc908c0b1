//! Text markup and deterministic text metrics.
//!
//! Labels are authored in a small TeX-like subset:
//!
//! - `\text{...}` literal text (inside it, `--` becomes an en dash)
//! - `\rightarrow` a spaced arrow
//! - `\vec{x}` `x` with a combining right arrow above
//! - `_x` / `_{...}` subscripts
//!
//! Whitespace outside `\text{}` is ignored, like math mode. Metrics never touch font files, so
//! layout and evaluation stay pure. The rasterizer picks a real font later.

use crate::foundation::error::{StoryError, StoryResult};

/// Scene units per font-size point.
pub const EM_PER_FONT_SIZE: f64 = 0.0085;
/// Glyph box height relative to the em size.
pub const HEIGHT_EM: f64 = 0.75;
/// Scale applied to subscript runs.
pub const SUBSCRIPT_SCALE: f64 = 0.7;

const COMBINING_ARROW: char = '\u{20D7}';

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum Baseline {
    Normal,
    Subscript,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextRun {
    pub text: String,
    pub baseline: Baseline,
}

/// Parsed text with its nominal font size.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextShape {
    pub markup: String,
    pub runs: Vec<TextRun>,
    pub font_size: f64,
}

impl TextShape {
    pub fn parse(markup: &str, font_size: f64) -> StoryResult<Self> {
        if !(font_size.is_finite() && font_size > 0.0) {
            return Err(StoryError::validation("text font size must be > 0"));
        }
        Ok(Self {
            markup: markup.to_string(),
            runs: parse_markup(markup)?,
            font_size,
        })
    }

    /// Em size in scene units.
    pub fn em(&self) -> f64 {
        self.font_size * EM_PER_FONT_SIZE
    }

    /// The rendered characters, subscripts inline.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn width(&self) -> f64 {
        let em = self.em();
        self.runs
            .iter()
            .map(|run| {
                let scale = match run.baseline {
                    Baseline::Normal => 1.0,
                    Baseline::Subscript => SUBSCRIPT_SCALE,
                };
                run.text.chars().map(advance_em).sum::<f64>() * em * scale
            })
            .sum()
    }

    pub fn height(&self) -> f64 {
        let extra = if self.runs.iter().any(|r| r.baseline == Baseline::Subscript) {
            0.2
        } else {
            0.0
        };
        (HEIGHT_EM + extra) * self.em()
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            font_size: self.font_size * factor,
            ..self.clone()
        }
    }
}

fn advance_em(c: char) -> f64 {
    match c {
        COMBINING_ARROW => 0.0,
        ' ' => 0.3,
        'i' | 'l' | 'j' | 't' | 'f' | 'I' | '.' | ',' | ':' | ';' | '(' | ')' | '|' | '\'' => 0.3,
        'm' | 'w' | 'M' | 'W' => 0.8,
        '→' | '–' => 0.9,
        c if c.is_ascii_uppercase() => 0.65,
        _ => 0.52,
    }
}

fn parse_markup(src: &str) -> StoryResult<Vec<TextRun>> {
    let mut runs = Vec::<TextRun>::new();
    let mut chars = src.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let name = read_command_name(&mut chars);
                match name.as_str() {
                    "text" => {
                        let body = read_group(&mut chars, src)?;
                        push(&mut runs, &body.replace("--", "–"), Baseline::Normal);
                    }
                    "rightarrow" | "to" => push(&mut runs, " → ", Baseline::Normal),
                    "vec" => {
                        let body = read_group(&mut chars, src)?;
                        let mut s = body.trim().to_string();
                        s.push(COMBINING_ARROW);
                        push(&mut runs, &s, Baseline::Normal);
                    }
                    "" => {
                        return Err(StoryError::validation(format!(
                            "dangling backslash in text markup '{src}'"
                        )));
                    }
                    other => {
                        return Err(StoryError::validation(format!(
                            "unsupported text command '\\{other}' in '{src}'"
                        )));
                    }
                }
            }
            '_' => {
                let body = if chars.peek() == Some(&'{') {
                    read_group(&mut chars, src)?
                } else {
                    chars
                        .next()
                        .map(String::from)
                        .ok_or_else(|| StoryError::validation("subscript is missing its body"))?
                };
                push(&mut runs, &body, Baseline::Subscript);
            }
            '{' | '}' => {}
            c if c.is_whitespace() => {}
            c => push(&mut runs, &c.to_string(), Baseline::Normal),
        }
    }

    if runs.is_empty() {
        return Err(StoryError::validation("text markup renders no characters"));
    }
    Ok(runs)
}

fn read_command_name(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut name = String::new();
    while let Some(&c) = chars.peek() {
        if !c.is_ascii_alphabetic() {
            break;
        }
        name.push(c);
        chars.next();
    }
    name
}

fn read_group(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    src: &str,
) -> StoryResult<String> {
    if chars.next() != Some('{') {
        return Err(StoryError::validation(format!(
            "expected '{{' in text markup '{src}'"
        )));
    }
    let mut depth = 1usize;
    let mut body = String::new();
    for c in chars.by_ref() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(body);
                }
            }
            _ => {}
        }
        body.push(c);
    }
    Err(StoryError::validation(format!(
        "unbalanced braces in text markup '{src}'"
    )))
}

fn push(runs: &mut Vec<TextRun>, text: &str, baseline: Baseline) {
    if text.is_empty() {
        return;
    }
    match runs.last_mut() {
        Some(last) if last.baseline == baseline => last.text.push_str(text),
        _ => runs.push(TextRun {
            text: text.to_string(),
            baseline,
        }),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/scene/text.rs"]
mod tests;
