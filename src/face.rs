use crate::error::CaptionResult;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Hinting {
    None,
    Vertical,
    #[default]
    Full,
}

/// Point size, resolution and hinting for one rendering face.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FaceOptions {
    pub size: f32,
    pub dpi: f32,
    pub hinting: Hinting,
}

impl Default for FaceOptions {
    fn default() -> Self {
        Self {
            size: 30.0,
            dpi: 72.0,
            hinting: Hinting::Full,
        }
    }
}

impl FaceOptions {
    pub fn px_per_em(&self) -> f32 {
        self.size * self.dpi / 72.0
    }
}

/// Pen position on the baseline, in canvas pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pen {
    pub x: f32,
    pub y: f32,
}

impl Pen {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Alpha coverage of one rasterized glyph, placed in canvas pixel coordinates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverageMask {
    pub left: i32,
    pub top: i32,
    pub width: u32,
    pub height: u32,
    /// Row-major coverage, 0 (empty) to 255 (fully covered).
    pub alpha: Vec<u8>,
}

impl CoverageMask {
    /// Iterates `(x, y, coverage)` in canvas coordinates, skipping empty pixels.
    pub fn covered(&self) -> impl Iterator<Item = (i32, i32, u8)> + '_ {
        let w = self.width as usize;
        self.alpha
            .iter()
            .enumerate()
            .filter(|(_, a)| **a > 0)
            .map(move |(i, a)| {
                let x = self.left + (i % w) as i32;
                let y = self.top + (i / w) as i32;
                (x, y, *a)
            })
    }
}

/// A sized, immutable rendering face.
///
/// Faces hold no mutable state, so one face may be shared by concurrent
/// compositing calls (for example one per animation frame).
pub trait Face: Send + Sync {
    /// Line height (ascent + descent + gap), rounded to whole pixels.
    fn line_height(&self) -> i32;

    fn advance(&self, c: char) -> f32;

    /// Horizontal adjustment applied between `prev` and `next`.
    fn kern(&self, prev: char, next: char) -> f32;

    /// Coverage mask for `c` drawn with its origin at `pen`; `None` for blank glyphs.
    fn rasterize(&self, c: char, pen: Pen) -> Option<CoverageMask>;

    /// Width of `text` in pixels: advances plus pairwise kerning.
    fn measure(&self, text: &str) -> f32 {
        let mut width = 0.0;
        let mut prev = None;
        for c in text.chars() {
            if let Some(p) = prev {
                width += self.kern(p, c);
            }
            width += self.advance(c);
            prev = Some(c);
        }
        width
    }
}

/// Produces faces from a loaded font program.
///
/// This is the seam through which the process-wide font is handed to the
/// compositing code, and where tests substitute a synthetic font.
pub trait FaceFactory: Sync {
    type Face: Face;

    fn face(&self, options: &FaceOptions) -> CaptionResult<Self::Face>;
}

impl<T: FaceFactory + ?Sized> FaceFactory for &T {
    type Face = T::Face;

    fn face(&self, options: &FaceOptions) -> CaptionResult<Self::Face> {
        (**self).face(options)
    }
}

/// Walks `text` glyph by glyph from `origin`, applying kerning and advancing the pen.
pub fn for_each_glyph<F: Face + ?Sized>(
    face: &F,
    text: &str,
    origin: (i32, i32),
    mut sink: impl FnMut(&CoverageMask),
) {
    let mut pen = Pen::new(origin.0 as f32, origin.1 as f32);
    let mut prev = None;
    for c in text.chars() {
        if let Some(p) = prev {
            pen.x += face.kern(p, c);
        }
        if let Some(mask) = face.rasterize(c, pen) {
            sink(&mask);
        }
        pen.x += face.advance(c);
        prev = Some(c);
    }
}
