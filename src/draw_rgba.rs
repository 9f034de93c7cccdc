use crate::{
    canvas::RgbaCanvas,
    draw::{CaptionCanvas, InkStyle, paint_caption},
    face::Face,
    layout::TextLayout,
};

pub type PremulRgba8 = [u8; 4];

impl CaptionCanvas for RgbaCanvas {
    type Ink = PremulRgba8;

    fn plot(&mut self, x: i32, y: i32, coverage: u8, ink: PremulRgba8) {
        if let Some(px) = self.pixel_mut(x, y) {
            let out = over([px[0], px[1], px[2], px[3]], ink, coverage);
            px.copy_from_slice(&out);
        }
    }
}

/// Paints the outlined caption onto a full-color canvas.
///
/// Mask coverage is used as blend opacity (source-over); the hard threshold in
/// `ink` is not consulted on this path.
pub fn caption_rgba<F: Face + ?Sized>(
    canvas: &mut RgbaCanvas,
    layout: &TextLayout,
    face: &F,
    ink: &InkStyle,
) {
    paint_caption(
        canvas,
        layout,
        face,
        ink.shadow_offset,
        ink.shadow.to_premul_rgba8(),
        ink.fill.to_premul_rgba8(),
    );
}

/// Source-over of premultiplied `src` onto `dst`, with `src` scaled by `coverage / 255`.
pub fn over(dst: PremulRgba8, src: PremulRgba8, coverage: u8) -> PremulRgba8 {
    if coverage == 0 || src[3] == 0 {
        return dst;
    }

    let op = u16::from(coverage);
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

fn mul_div255(x: u16, y: u16) -> u8 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u8
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        face::block::{BlockFace, EDGE_COVERAGE, GLYPH_H, GLYPH_W},
        layout::DEFAULT_ANCHOR_RATIO,
    };

    fn solid(w: u32, h: u32, px: PremulRgba8) -> RgbaCanvas {
        let data = px.iter().copied().cycle().take((w * h * 4) as usize).collect();
        RgbaCanvas::from_premul_rgba8(w, h, data).unwrap()
    }

    #[test]
    fn over_zero_coverage_is_noop() {
        let dst = [1, 2, 3, 4];
        assert_eq!(over(dst, [255, 255, 255, 255], 0), dst);
    }

    #[test]
    fn over_full_coverage_replaces_dst() {
        assert_eq!(over([0, 0, 0, 255], [255, 0, 0, 255], 255), [255, 0, 0, 255]);
    }

    #[test]
    fn over_partial_coverage_blends() {
        let out = over([0, 0, 0, 255], [255, 255, 255, 255], EDGE_COVERAGE);
        assert_eq!(out, [100, 100, 100, 255]);
    }

    #[test]
    fn caption_paints_fill_and_shadow_at_the_layout_origin() {
        let grey = [90, 90, 90, 255];
        let mut canvas = solid(100, 100, grey);
        let layout = TextLayout::new("a", &BlockFace, 100, 100, DEFAULT_ANCHOR_RATIO);
        caption_rgba(&mut canvas, &layout, &BlockFace, &InkStyle::default());

        let (ox, oy) = layout.lines[0].origin;
        let top = (oy - GLYPH_H as i32) as u32;
        let left = ox as u32;
        // glyph interior is fill
        assert_eq!(canvas.pixel(left, top).unwrap(), [255, 255, 255, 255]);
        // bottom-right corner of the shadow peeks out under the fill
        assert_eq!(
            canvas.pixel(left + 1, top + GLYPH_H).unwrap(),
            [0, 0, 0, 255]
        );
        // right edge column is a partial-coverage blend of fill over shadow/background
        let edge = canvas.pixel(left + GLYPH_W - 1, top + 1).unwrap();
        assert_ne!(edge, [255, 255, 255, 255]);
        assert_ne!(edge, grey);
        // far away is untouched
        assert_eq!(canvas.pixel(0, 0).unwrap(), grey);
    }

    #[test]
    fn rendering_twice_on_independent_copies_is_identical() {
        let src = solid(64, 48, [10, 200, 30, 255]);
        let layout = TextLayout::new("AV\nhi", &BlockFace, 64, 48, DEFAULT_ANCHOR_RATIO);
        let mut a = src.clone();
        let mut b = src.clone();
        caption_rgba(&mut a, &layout, &BlockFace, &InkStyle::default());
        caption_rgba(&mut b, &layout, &BlockFace, &InkStyle::default());
        assert_eq!(a, b);
        assert_ne!(a, src);
    }

    #[test]
    fn glyphs_past_the_edges_are_clipped() {
        let mut canvas = solid(4, 4, [0, 0, 0, 255]);
        let layout = TextLayout::new("wide caption", &BlockFace, 4, 4, DEFAULT_ANCHOR_RATIO);
        caption_rgba(&mut canvas, &layout, &BlockFace, &InkStyle::default());
        assert_eq!(canvas.width(), 4);
        assert_eq!(canvas.data().len(), 64);
    }
}
