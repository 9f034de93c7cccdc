use crate::palette::Rgb8;

pub type CaptionResult<T> = Result<T, CaptionError>;

#[derive(thiserror::Error, Debug)]
pub enum CaptionError {
    #[error("font load error: {0}")]
    FontLoad(String),

    #[error("decode error: {0}")]
    Decode(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("palette resolution error: frame {frame} has no palette entry for ink color {color}")]
    PaletteResolution { frame: usize, color: Rgb8 },

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CaptionError {
    pub fn font_load(msg: impl Into<String>) -> Self {
        Self::FontLoad(msg.into())
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn precondition(msg: impl Into<String>) -> Self {
        Self::Precondition(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
