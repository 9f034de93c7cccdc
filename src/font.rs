use std::path::Path;

use ab_glyph::{Font as _, FontArc, PxScale, PxScaleFont, ScaleFont as _, point};
use anyhow::Context as _;

use crate::{
    error::{CaptionError, CaptionResult},
    face::{CoverageMask, Face, FaceFactory, FaceOptions, Hinting, Pen},
};

/// Environment variable naming the caption font file.
pub const FONT_ENV_VAR: &str = "IMPACT_FILENAME";
pub const DEFAULT_FONT_PATH: &str = "impact.ttf";

/// One parsed font program, loaded once and shared read-only for the process lifetime.
///
/// Cloning is cheap (the program is reference counted).
#[derive(Clone)]
pub struct FontResource {
    font: FontArc,
}

impl std::fmt::Debug for FontResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontResource")
            .field("glyph_count", &self.font.glyph_count())
            .finish()
    }
}

impl FontResource {
    pub fn from_bytes(bytes: Vec<u8>) -> CaptionResult<Self> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| CaptionError::font_load(format!("parse font program: {e}")))?;
        if font.units_per_em().is_none() {
            return Err(CaptionError::font_load("font program has no units-per-em"));
        }
        Ok(Self { font })
    }

    pub fn from_path(path: &Path) -> CaptionResult<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("read font '{}'", path.display()))
            .map_err(|e| CaptionError::font_load(format!("{e:#}")))?;
        let len = bytes.len();
        let resource = Self::from_bytes(bytes)?;
        tracing::info!(path = %path.display(), bytes = len, "loaded caption font");
        Ok(resource)
    }

    /// Loads the font named by `IMPACT_FILENAME`, or `impact.ttf` when unset.
    pub fn from_env() -> CaptionResult<Self> {
        let path = std::env::var(FONT_ENV_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_FONT_PATH.to_string());
        Self::from_path(Path::new(&path))
    }
}

impl FaceFactory for FontResource {
    type Face = FontFace;

    fn face(&self, options: &FaceOptions) -> CaptionResult<FontFace> {
        let px_per_em = options.px_per_em();
        if !px_per_em.is_finite() || px_per_em <= 0.0 {
            return Err(CaptionError::validation(
                "face size and dpi must be positive",
            ));
        }
        let units_per_em = self
            .font
            .units_per_em()
            .ok_or_else(|| CaptionError::font_load("font program has no units-per-em"))?;
        let scale = PxScale::from(px_per_em * self.font.height_unscaled() / units_per_em);
        Ok(FontFace {
            scaled: self.font.clone().into_scaled(scale),
            hinting: options.hinting,
        })
    }
}

/// Face backed by the shared font program at a fixed scale.
pub struct FontFace {
    scaled: PxScaleFont<FontArc>,
    hinting: Hinting,
}

impl FontFace {
    fn snap(&self, v: f32) -> f32 {
        match self.hinting {
            Hinting::Full => v.round(),
            Hinting::None | Hinting::Vertical => v,
        }
    }
}

impl Face for FontFace {
    fn line_height(&self) -> i32 {
        let s = &self.scaled;
        (s.ascent() - s.descent() + s.line_gap()).round() as i32
    }

    fn advance(&self, c: char) -> f32 {
        self.snap(self.scaled.h_advance(self.scaled.glyph_id(c)))
    }

    fn kern(&self, prev: char, next: char) -> f32 {
        let s = &self.scaled;
        self.snap(s.kern(s.glyph_id(prev), s.glyph_id(next)))
    }

    fn rasterize(&self, c: char, pen: Pen) -> Option<CoverageMask> {
        let s = &self.scaled;
        let x = self.snap(pen.x);
        let y = match self.hinting {
            Hinting::None => pen.y,
            Hinting::Vertical | Hinting::Full => pen.y.round(),
        };
        let glyph = s
            .glyph_id(c)
            .with_scale_and_position(s.scale(), point(x, y));
        let outlined = s.outline_glyph(glyph)?;
        let bounds = outlined.px_bounds();
        let width = bounds.width() as u32;
        let height = bounds.height() as u32;
        if width == 0 || height == 0 {
            return None;
        }

        let mut alpha = vec![0u8; (width as usize) * (height as usize)];
        outlined.draw(|gx, gy, coverage| {
            let i = (gy as usize) * (width as usize) + gx as usize;
            if let Some(a) = alpha.get_mut(i) {
                *a = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
            }
        });

        Some(CoverageMask {
            left: bounds.min.x as i32,
            top: bounds.min.y as i32,
            width,
            height,
            alpha,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbage_bytes_are_a_font_load_error() {
        let err = FontResource::from_bytes(b"definitely not a font".to_vec()).unwrap_err();
        assert!(matches!(err, CaptionError::FontLoad(_)));
    }

    #[test]
    fn missing_file_is_a_font_load_error() {
        let err = FontResource::from_path(Path::new("/nonexistent/caption-font.ttf")).unwrap_err();
        assert!(matches!(err, CaptionError::FontLoad(_)));
        assert!(err.to_string().contains("caption-font.ttf"));
    }
}
