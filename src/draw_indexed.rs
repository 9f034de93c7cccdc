use crate::{
    canvas::IndexedCanvas,
    compact::compact_palette,
    draw::{CaptionCanvas, InkStyle, paint_caption},
    error::{CaptionError, CaptionResult},
    face::Face,
    layout::TextLayout,
    palette::Rgb8,
};

/// How a frame's palette is made to hold the two ink colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaletteStrategy {
    /// Exact match against the existing table; a missing ink is an error.
    #[default]
    Exact,
    /// Append missing inks while the table has fewer than 256 entries.
    Extend,
    /// Reorder the table so the inks occupy slots 0 and 1.
    Compact,
}

/// A palette index valid for one specific canvas, plus the coverage cut-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IndexedInk {
    index: u8,
    threshold: u8,
}

impl CaptionCanvas for IndexedCanvas {
    type Ink = IndexedInk;

    fn plot(&mut self, x: i32, y: i32, coverage: u8, ink: IndexedInk) {
        if coverage > ink.threshold {
            self.put(x, y, ink.index);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedInks {
    pub fill: u8,
    pub shadow: u8,
    /// The palette (and possibly pixel indices) changed while resolving.
    pub palette_rewritten: bool,
}

/// Resolves both inks by exact color match in this canvas's own palette.
///
/// The transparent slot never matches. `frame` only labels the error.
pub fn resolve_inks(
    canvas: &IndexedCanvas,
    frame: usize,
    ink: &InkStyle,
) -> CaptionResult<ResolvedInks> {
    let find = |color: Rgb8| {
        canvas
            .palette()
            .position_exact(color, canvas.transparent())
            .ok_or(CaptionError::PaletteResolution { frame, color })
    };
    Ok(ResolvedInks {
        fill: find(ink.fill)?,
        shadow: find(ink.shadow)?,
        palette_rewritten: false,
    })
}

/// Makes the inks resolvable in `canvas` according to `strategy`, then resolves them.
pub fn prepare_inks(
    canvas: &mut IndexedCanvas,
    frame: usize,
    ink: &InkStyle,
    strategy: PaletteStrategy,
) -> CaptionResult<ResolvedInks> {
    match strategy {
        PaletteStrategy::Exact => resolve_inks(canvas, frame, ink),
        PaletteStrategy::Extend => {
            let transparent = canvas.transparent();
            let mut rewritten = false;
            let mut ensure = |color: Rgb8| -> CaptionResult<u8> {
                let palette = canvas.palette_mut();
                if let Some(i) = palette.position_exact(color, transparent) {
                    return Ok(i);
                }
                let i = palette
                    .try_push(color)
                    .ok_or(CaptionError::PaletteResolution { frame, color })?;
                rewritten = true;
                Ok(i)
            };
            let fill = ensure(ink.fill)?;
            let shadow = ensure(ink.shadow)?;
            if rewritten {
                tracing::warn!(frame, "extended frame palette with ink colors");
            }
            Ok(ResolvedInks {
                fill,
                shadow,
                palette_rewritten: rewritten,
            })
        }
        PaletteStrategy::Compact => {
            compact_palette(canvas, ink)?;
            tracing::warn!(frame, "compacted frame palette around ink colors");
            let resolved = resolve_inks(canvas, frame, ink)?;
            Ok(ResolvedInks {
                palette_rewritten: true,
                ..resolved
            })
        }
    }
}

/// Paints the outlined caption onto one frame, writing palette indices.
///
/// Inks are resolved against this frame's palette on every call; a caption
/// without visible glyphs leaves the frame (and its palette) untouched.
pub fn caption_indexed<F: Face + ?Sized>(
    canvas: &mut IndexedCanvas,
    frame: usize,
    layout: &TextLayout,
    face: &F,
    ink: &InkStyle,
    strategy: PaletteStrategy,
) -> CaptionResult<ResolvedInks> {
    if !layout.has_ink() {
        return Ok(ResolvedInks {
            fill: 0,
            shadow: 0,
            palette_rewritten: false,
        });
    }

    let resolved = prepare_inks(canvas, frame, ink, strategy)?;
    paint_caption(
        canvas,
        layout,
        face,
        ink.shadow_offset,
        IndexedInk {
            index: resolved.shadow,
            threshold: ink.threshold,
        },
        IndexedInk {
            index: resolved.fill,
            threshold: ink.threshold,
        },
    );
    Ok(resolved)
}
