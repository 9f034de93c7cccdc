use crate::{
    face::{Face, for_each_glyph},
    layout::TextLayout,
    palette::Rgb8,
};

/// Colors, offset and coverage threshold of the outlined caption.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct InkStyle {
    pub fill: Rgb8,
    pub shadow: Rgb8,
    pub shadow_offset: (i32, i32),
    /// Indexed canvases paint a mask pixel only when its coverage exceeds this.
    pub threshold: u8,
}

impl Default for InkStyle {
    fn default() -> Self {
        Self {
            fill: Rgb8::WHITE,
            shadow: Rgb8::BLACK,
            shadow_offset: (1, 1),
            threshold: 128,
        }
    }
}

/// A canvas an outlined caption can be painted onto.
///
/// The full-color and indexed canvases are the two implementations; each picks
/// its own ink representation (a color, or a palette index resolved for that
/// canvas).
pub trait CaptionCanvas {
    type Ink: Copy;

    /// Applies `ink` at `(x, y)` for a mask pixel with non-zero `coverage`.
    fn plot(&mut self, x: i32, y: i32, coverage: u8, ink: Self::Ink);
}

/// Draws every line twice: `shadow` at the offset first, then `fill` on top.
pub fn paint_caption<C, F>(
    canvas: &mut C,
    layout: &TextLayout,
    face: &F,
    shadow_offset: (i32, i32),
    shadow: C::Ink,
    fill: C::Ink,
) where
    C: CaptionCanvas + ?Sized,
    F: Face + ?Sized,
{
    for line in &layout.lines {
        let (x, y) = line.origin;
        draw_string(
            canvas,
            face,
            &line.text,
            (x + shadow_offset.0, y + shadow_offset.1),
            shadow,
        );
        draw_string(canvas, face, &line.text, (x, y), fill);
    }
}

fn draw_string<C, F>(canvas: &mut C, face: &F, text: &str, origin: (i32, i32), ink: C::Ink)
where
    C: CaptionCanvas + ?Sized,
    F: Face + ?Sized,
{
    for_each_glyph(face, text, origin, |mask| {
        for (x, y, coverage) in mask.covered() {
            canvas.plot(x, y, coverage, ink);
        }
    });
}
