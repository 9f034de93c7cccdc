//! Stamps outlined, multi-line captions onto raster images.
//!
//! Still images are composited in full color and re-encoded as JPEG. GIF
//! animations are composited frame by frame directly in palette indices, each
//! frame resolving the ink colors against its own color table, and re-encoded
//! with their timing and disposal untouched.
#![forbid(unsafe_code)]

pub mod animation;
pub mod canvas;
pub mod codec;
pub mod compact;
pub mod config;
pub mod draw;
pub mod draw_indexed;
pub mod draw_rgba;
pub mod error;
pub mod face;
pub mod font;
pub mod layout;
pub mod palette;
pub mod pipeline;

pub use animation::{AnimatedImage, DisposalMethod, Frame, Repeat, decode_gif, encode_gif};
pub use canvas::{IndexedCanvas, RgbaCanvas};
pub use codec::{DecodedImage, OutputFormat, decode_image, encode_jpeg, sniff_format};
pub use compact::{CompactionPlan, compact_palette, plan_compaction};
pub use config::{CaptionSettings, FrameThreading};
pub use draw::{CaptionCanvas, InkStyle, paint_caption};
pub use draw_indexed::{PaletteStrategy, ResolvedInks, caption_indexed, resolve_inks};
pub use draw_rgba::caption_rgba;
pub use error::{CaptionError, CaptionResult};
pub use face::{CoverageMask, Face, FaceFactory, FaceOptions, Hinting, Pen};
pub use font::{FontFace, FontResource};
pub use layout::{PositionedLine, TextLayout};
pub use palette::{Palette, Rgb8};
pub use pipeline::{
    CaptionedImage, Captioner, caption_animation, caption_image, caption_still,
};
