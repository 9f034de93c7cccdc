#![allow(dead_code)]

use std::{borrow::Cow, io::Cursor};

use catcaption::{CaptionResult, CoverageMask, Face, FaceFactory, FaceOptions, Pen, Rgb8};

pub const ADVANCE: f32 = 8.0;
pub const GLYPH_W: u32 = 6;
pub const GLYPH_H: u32 = 12;
pub const LINE_HEIGHT: i32 = 14;

/// Every visible glyph is a solid `GLYPH_W` x `GLYPH_H` block sitting on the baseline.
#[derive(Clone, Copy, Debug, Default)]
pub struct BlockFace;

impl Face for BlockFace {
    fn line_height(&self) -> i32 {
        LINE_HEIGHT
    }

    fn advance(&self, _c: char) -> f32 {
        ADVANCE
    }

    fn kern(&self, _prev: char, _next: char) -> f32 {
        0.0
    }

    fn rasterize(&self, c: char, pen: Pen) -> Option<CoverageMask> {
        if c.is_whitespace() {
            return None;
        }
        Some(CoverageMask {
            left: pen.x.round() as i32,
            top: pen.y.round() as i32 - GLYPH_H as i32,
            width: GLYPH_W,
            height: GLYPH_H,
            alpha: vec![255; (GLYPH_W * GLYPH_H) as usize],
        })
    }
}

pub struct BlockFont;

impl FaceFactory for BlockFont {
    type Face = BlockFace;

    fn face(&self, _options: &FaceOptions) -> CaptionResult<BlockFace> {
        Ok(BlockFace)
    }
}

pub fn solid_png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

pub fn rgb_bytes(colors: &[Rgb8]) -> Vec<u8> {
    colors.iter().flat_map(|c| [c.r, c.g, c.b]).collect()
}

/// A full-screen frame filled with palette index `fill`.
pub struct FrameSpec {
    pub palette: Vec<Rgb8>,
    pub fill: u8,
    pub delay: u16,
    pub dispose: gif::DisposalMethod,
}

/// Encodes an animation where every frame carries its own color table.
pub fn local_palette_gif(width: u16, height: u16, frames: &[FrameSpec]) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut enc = gif::Encoder::new(&mut out, width, height, &[]).unwrap();
        enc.set_repeat(gif::Repeat::Infinite).unwrap();
        for spec in frames {
            let frame = gif::Frame {
                delay: spec.delay,
                dispose: spec.dispose,
                width,
                height,
                palette: Some(rgb_bytes(&spec.palette)),
                buffer: Cow::Owned(vec![spec.fill; usize::from(width) * usize::from(height)]),
                ..gif::Frame::default()
            };
            enc.write_frame(&frame).unwrap();
        }
    }
    out
}

/// Encodes a single-frame animation that uses the global color table.
pub fn global_palette_gif(width: u16, height: u16, palette: &[Rgb8], fill: u8) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut enc = gif::Encoder::new(&mut out, width, height, &rgb_bytes(palette)).unwrap();
        let frame = gif::Frame {
            delay: 10,
            width,
            height,
            buffer: Cow::Owned(vec![fill; usize::from(width) * usize::from(height)]),
            ..gif::Frame::default()
        };
        enc.write_frame(&frame).unwrap();
    }
    out
}
