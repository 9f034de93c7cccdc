//! Palette compaction: reorders a frame's color table so the fill ink sits in
//! slot 0 and the shadow ink in slot 1, rewriting pixel indices to match.
//!
//! The new table is built in a separate slot arena from a read-only view of the
//! old one, and the old→new translation table is applied to pixels in a second
//! pass, so no entry is read after it has been overwritten.

use crate::{
    canvas::IndexedCanvas,
    draw::InkStyle,
    error::{CaptionError, CaptionResult},
    palette::{Palette, Rgb8},
};

pub const FILL_SLOT: u8 = 0;
pub const SHADOW_SLOT: u8 = 1;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompactionPlan {
    pub palette: Palette,
    /// `translation[old_index] == new_index` for every index of the old palette.
    pub translation: Vec<u8>,
    pub transparent: Option<u8>,
}

/// Computes the reordered palette and index translation without touching any pixels.
///
/// Every entry equal to an ink color (other than the transparent slot) collapses
/// onto that ink's reserved slot; all other entries, the transparent one
/// included, move into slots counted down from the top of the table.
pub fn plan_compaction(
    palette: &Palette,
    transparent: Option<u8>,
    ink: &InkStyle,
) -> CaptionResult<CompactionPlan> {
    if palette.is_empty() {
        return Err(CaptionError::precondition("cannot compact an empty palette"));
    }
    if ink.fill == ink.shadow {
        return Err(CaptionError::precondition(
            "fill and shadow inks must differ to occupy separate slots",
        ));
    }
    for color in [ink.fill, ink.shadow] {
        if palette.position_exact(color, transparent).is_none() {
            return Err(CaptionError::precondition(format!(
                "palette must already contain ink color {color} before compaction"
            )));
        }
    }

    let len = palette.len();
    let mut slots: Vec<Option<Rgb8>> = vec![None; len];
    let mut translation = vec![0u8; len];
    let mut next_free = len - 1;

    for (src, &color) in palette.colors().iter().enumerate().rev() {
        let is_transparent = transparent.is_some_and(|t| usize::from(t) == src);
        if !is_transparent && color == ink.fill {
            translation[src] = FILL_SLOT;
            continue;
        }
        if !is_transparent && color == ink.shadow {
            translation[src] = SHADOW_SLOT;
            continue;
        }
        // at least one fill and one shadow entry exist, so this never reaches slot 1
        if next_free <= usize::from(SHADOW_SLOT) {
            return Err(CaptionError::precondition(
                "palette has no room left for the reserved ink slots",
            ));
        }
        slots[next_free] = Some(color);
        translation[src] = next_free as u8;
        next_free -= 1;
    }

    slots[usize::from(FILL_SLOT)] = Some(ink.fill);
    slots[usize::from(SHADOW_SLOT)] = Some(ink.shadow);
    let colors = slots
        .into_iter()
        .map(|slot| slot.unwrap_or(ink.shadow))
        .collect();

    Ok(CompactionPlan {
        palette: Palette::new(colors)?,
        transparent: transparent.map(|t| translation.get(usize::from(t)).copied().unwrap_or(t)),
        translation,
    })
}

/// Compacts `canvas`'s palette in place, remapping every pixel.
///
/// Fails without modifying the canvas if any precondition does not hold,
/// including pixels that reference indices past the end of the palette.
pub fn compact_palette(canvas: &mut IndexedCanvas, ink: &InkStyle) -> CaptionResult<()> {
    let plan = plan_compaction(canvas.palette(), canvas.transparent(), ink)?;
    if let Some(&bad) = canvas
        .pixels()
        .iter()
        .find(|&&p| usize::from(p) >= plan.translation.len())
    {
        return Err(CaptionError::precondition(format!(
            "pixel index {bad} is outside the palette of {} entries",
            plan.translation.len()
        )));
    }
    canvas.replace_palette(plan.palette, &plan.translation, plan.transparent);
    Ok(())
}
