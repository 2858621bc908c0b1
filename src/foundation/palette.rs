//! Named display colors and fixed-length palettes.

use crate::foundation::core::Rgba8;
use crate::foundation::error::{StoryError, StoryResult};

pub const WHITE: Rgba8 = Rgba8::rgb(0xff, 0xff, 0xff);
pub const BLACK: Rgba8 = Rgba8::rgb(0x00, 0x00, 0x00);
pub const GREY_A: Rgba8 = Rgba8::rgb(0xdd, 0xdd, 0xdd);
pub const GREY_B: Rgba8 = Rgba8::rgb(0xbb, 0xbb, 0xbb);

pub const BLUE_E: Rgba8 = Rgba8::rgb(0x1c, 0x75, 0x8a);
pub const BLUE_D: Rgba8 = Rgba8::rgb(0x29, 0xab, 0xca);
pub const BLUE_C: Rgba8 = Rgba8::rgb(0x58, 0xc4, 0xdd);
pub const BLUE: Rgba8 = BLUE_C;

pub const TEAL_E: Rgba8 = Rgba8::rgb(0x49, 0xa8, 0x8f);
pub const TEAL_D: Rgba8 = Rgba8::rgb(0x55, 0xc1, 0xa7);
pub const TEAL_C: Rgba8 = Rgba8::rgb(0x5c, 0xd0, 0xb3);

pub const GREEN_E: Rgba8 = Rgba8::rgb(0x69, 0x9c, 0x52);
pub const GREEN_D: Rgba8 = Rgba8::rgb(0x77, 0xb0, 0x5d);
pub const GREEN_C: Rgba8 = Rgba8::rgb(0x83, 0xc1, 0x67);
pub const GREEN_B: Rgba8 = Rgba8::rgb(0xa6, 0xcf, 0x8c);
pub const GREEN_A: Rgba8 = Rgba8::rgb(0xc9, 0xe2, 0xae);
pub const GREEN: Rgba8 = GREEN_C;

pub const YELLOW_E: Rgba8 = Rgba8::rgb(0xe8, 0xc1, 0x1c);
pub const YELLOW: Rgba8 = Rgba8::rgb(0xff, 0xff, 0x00);

pub const PURPLE: Rgba8 = Rgba8::rgb(0x9a, 0x72, 0xac);

/// Ordered color sequence indexed positionally against a set of shapes.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Palette(Vec<Rgba8>);

impl Palette {
    fn new(colors: impl Into<Vec<Rgba8>>) -> Self {
        Self(colors.into())
    }

    /// Sixteen patch colors, row-major over a 4×4 grid (blue → teal → green → yellow).
    pub fn patches() -> Self {
        Self::new([
            BLUE_E, BLUE_D, BLUE_C, TEAL_E, //
            BLUE_D, TEAL_D, TEAL_C, GREEN_E, //
            TEAL_E, TEAL_D, GREEN_D, GREEN_C, //
            GREEN_E, GREEN_D, GREEN_C, YELLOW_E,
        ])
    }

    /// Five token colors, dark to light green.
    pub fn tokens() -> Self {
        Self::new([GREEN_E, GREEN_D, GREEN_C, GREEN_B, GREEN_A])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn colors(&self) -> &[Rgba8] {
        &self.0
    }

    /// Return the colors if the palette has exactly `count` entries.
    pub fn expect_len(&self, count: usize) -> StoryResult<&[Rgba8]> {
        if self.0.len() != count {
            return Err(StoryError::validation(format!(
                "palette has {} colors but is applied to {count} shapes",
                self.0.len()
            )));
        }
        Ok(&self.0)
    }
}
