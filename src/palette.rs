use std::fmt;

use crate::error::{CaptionError, CaptionResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb8 {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Opaque premultiplied RGBA8 (identical to straight alpha at a = 255).
    pub fn to_premul_rgba8(self) -> [u8; 4] {
        [self.r, self.g, self.b, 255]
    }
}

impl fmt::Display for Rgb8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Color table shared by every pixel of one indexed canvas.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb8>,
}

impl Palette {
    pub const MAX_LEN: usize = 256;

    pub fn new(colors: Vec<Rgb8>) -> CaptionResult<Self> {
        if colors.len() > Self::MAX_LEN {
            return Err(CaptionError::validation(format!(
                "palette has {} entries (max {})",
                colors.len(),
                Self::MAX_LEN
            )));
        }
        Ok(Self { colors })
    }

    /// Parses a packed `[r, g, b, r, g, b, ...]` table as found in GIF color tables.
    pub fn from_rgb_bytes(bytes: &[u8]) -> CaptionResult<Self> {
        if !bytes.len().is_multiple_of(3) {
            return Err(CaptionError::validation(
                "palette byte length must be a multiple of 3",
            ));
        }
        let colors = bytes
            .chunks_exact(3)
            .map(|c| Rgb8::new(c[0], c[1], c[2]))
            .collect();
        Self::new(colors)
    }

    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.colors.len() * 3);
        for c in &self.colors {
            out.extend_from_slice(&[c.r, c.g, c.b]);
        }
        out
    }

    pub fn len(&self) -> usize {
        self.colors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    pub fn get(&self, index: u8) -> Option<Rgb8> {
        self.colors.get(usize::from(index)).copied()
    }

    pub fn colors(&self) -> &[Rgb8] {
        &self.colors
    }

    /// First index holding exactly `color`, never returning `skip`.
    ///
    /// `skip` is how the transparent slot of a frame is kept out of ink resolution.
    pub fn position_exact(&self, color: Rgb8, skip: Option<u8>) -> Option<u8> {
        self.colors
            .iter()
            .enumerate()
            .filter(|(i, _)| skip.is_none_or(|s| usize::from(s) != *i))
            .find(|(_, c)| **c == color)
            .map(|(i, _)| i as u8)
    }

    /// Appends `color` and returns its index, or `None` when the table is full.
    pub fn try_push(&mut self, color: Rgb8) -> Option<u8> {
        if self.colors.len() >= Self::MAX_LEN {
            return None;
        }
        self.colors.push(color);
        Some((self.colors.len() - 1) as u8)
    }
}
