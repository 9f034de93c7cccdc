use crate::{
    error::{CaptionError, CaptionResult},
    palette::Palette,
};

/// True-color canvas. Pixels are premultiplied RGBA8, row-major, tightly packed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RgbaCanvas {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl RgbaCanvas {
    pub fn new(width: u32, height: u32) -> CaptionResult<Self> {
        let len = buffer_len(width, height, 4)?;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    pub fn from_premul_rgba8(width: u32, height: u32, data: Vec<u8>) -> CaptionResult<Self> {
        if data.len() != buffer_len(width, height, 4)? {
            return Err(CaptionError::validation(
                "rgba canvas expects data matching width*height*4",
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Copies a straight-alpha image into a fresh premultiplied canvas.
    pub fn from_rgba_image(img: &image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        let mut data = img.as_raw().clone();
        premultiply_rgba8_in_place(&mut data);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let i = self.offset(x as i64, y as i64)?;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }

    pub(crate) fn pixel_mut(&mut self, x: i32, y: i32) -> Option<&mut [u8]> {
        let i = self.offset(i64::from(x), i64::from(y))?;
        Some(&mut self.data[i..i + 4])
    }

    /// RGB8 bytes composited onto opaque black, for targets without alpha.
    pub fn to_rgb8_over_black(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() / 4 * 3);
        for px in self.data.chunks_exact(4) {
            out.extend_from_slice(&px[..3]);
        }
        out
    }

    fn offset(&self, x: i64, y: i64) -> Option<usize> {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return None;
        }
        Some(((y as usize) * (self.width as usize) + (x as usize)) * 4)
    }
}

/// Palette-indexed canvas for one animation frame.
///
/// `left`/`top` place the frame inside the animation's logical screen; all
/// coordinates taken by the plotting API are logical-screen coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexedCanvas {
    pub left: u16,
    pub top: u16,
    width: u16,
    height: u16,
    pixels: Vec<u8>,
    palette: Palette,
    transparent: Option<u8>,
}

impl IndexedCanvas {
    pub fn new(
        left: u16,
        top: u16,
        width: u16,
        height: u16,
        pixels: Vec<u8>,
        palette: Palette,
        transparent: Option<u8>,
    ) -> CaptionResult<Self> {
        if pixels.len() != buffer_len(u32::from(width), u32::from(height), 1)? {
            return Err(CaptionError::validation(
                "indexed canvas expects pixels matching width*height",
            ));
        }
        Ok(Self {
            left,
            top,
            width,
            height,
            pixels,
            palette,
            transparent,
        })
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn transparent(&self) -> Option<u8> {
        self.transparent
    }

    /// Index stored at logical-screen position `(x, y)`, if inside this frame.
    pub fn index_at(&self, x: i32, y: i32) -> Option<u8> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    /// Writes `index` at logical-screen position `(x, y)`.
    ///
    /// Positions outside the frame are clipped. An index outside the palette is
    /// rejected rather than clamped.
    pub fn set_index(&mut self, x: i32, y: i32, index: u8) -> CaptionResult<()> {
        if usize::from(index) >= self.palette.len() {
            return Err(CaptionError::validation(format!(
                "palette index {index} out of range for palette of {} entries",
                self.palette.len()
            )));
        }
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = index;
        }
        Ok(())
    }

    pub(crate) fn palette_mut(&mut self) -> &mut Palette {
        &mut self.palette
    }

    /// Replaces the palette and remaps every pixel through `translation`.
    ///
    /// Callers must guarantee every pixel index has an entry in `translation`.
    pub(crate) fn replace_palette(
        &mut self,
        palette: Palette,
        translation: &[u8],
        transparent: Option<u8>,
    ) {
        for px in &mut self.pixels {
            *px = translation[usize::from(*px)];
        }
        self.palette = palette;
        self.transparent = transparent;
    }

    /// Writes an index already resolved against this palette, clipping to the frame.
    pub(crate) fn put(&mut self, x: i32, y: i32, index: u8) {
        debug_assert!(usize::from(index) < self.palette.len());
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = index;
        }
    }

    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        let lx = i64::from(x) - i64::from(self.left);
        let ly = i64::from(y) - i64::from(self.top);
        if lx < 0 || ly < 0 || lx >= i64::from(self.width) || ly >= i64::from(self.height) {
            return None;
        }
        Some((ly as usize) * usize::from(self.width) + lx as usize)
    }
}

fn buffer_len(width: u32, height: u32, channels: usize) -> CaptionResult<usize> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(channels))
        .ok_or_else(|| CaptionError::validation("canvas buffer size overflow"))
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}
