use std::path::Path;

use anyhow::Context as _;

use crate::{
    draw::InkStyle,
    draw_indexed::PaletteStrategy,
    error::{CaptionError, CaptionResult},
    face::FaceOptions,
    layout::DEFAULT_ANCHOR_RATIO,
};

/// Per-frame parallelism for animations. Frames are independent, so enabling
/// this changes throughput only, never output.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FrameThreading {
    pub parallel: bool,
    /// Worker count for the dedicated pool; `None` uses rayon defaults.
    pub threads: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CaptionSettings {
    pub static_face: FaceOptions,
    pub animated_face: FaceOptions,
    pub ink: InkStyle,
    pub anchor_ratio: f64,
    pub jpeg_quality: u8,
    pub palette_strategy: PaletteStrategy,
    pub threading: FrameThreading,
}

impl Default for CaptionSettings {
    fn default() -> Self {
        Self {
            static_face: FaceOptions::default(),
            animated_face: FaceOptions::default(),
            ink: InkStyle::default(),
            anchor_ratio: DEFAULT_ANCHOR_RATIO,
            jpeg_quality: 75,
            palette_strategy: PaletteStrategy::Exact,
            threading: FrameThreading::default(),
        }
    }
}

impl CaptionSettings {
    pub fn validate(&self) -> CaptionResult<()> {
        for (name, face) in [("static_face", &self.static_face), ("animated_face", &self.animated_face)] {
            if !face.size.is_finite() || face.size <= 0.0 {
                return Err(CaptionError::validation(format!("{name}.size must be > 0")));
            }
            if !face.dpi.is_finite() || face.dpi <= 0.0 {
                return Err(CaptionError::validation(format!("{name}.dpi must be > 0")));
            }
        }
        if !self.anchor_ratio.is_finite() || !(0.0..=1.0).contains(&self.anchor_ratio) {
            return Err(CaptionError::validation(
                "anchor_ratio must be within [0, 1]",
            ));
        }
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(CaptionError::validation(
                "jpeg_quality must be within 1..=100",
            ));
        }
        if self.threading.threads == Some(0) {
            return Err(CaptionError::validation(
                "threading.threads must be >= 1 when set",
            ));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> CaptionResult<Self> {
        let settings: Self = serde_json::from_str(json)
            .map_err(|e| CaptionError::validation(format!("parse caption settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_json_path(path: &Path) -> CaptionResult<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read caption settings '{}'", path.display()))?;
        Self::from_json_str(&json)
    }
}
