use rayon::prelude::*;

use crate::{
    animation::AnimatedImage,
    canvas::RgbaCanvas,
    codec::{DecodedImage, OutputFormat, decode_image, encode_animation, encode_jpeg},
    config::{CaptionSettings, FrameThreading},
    draw_indexed::caption_indexed,
    draw_rgba::caption_rgba,
    error::{CaptionError, CaptionResult},
    face::{Face, FaceFactory},
    layout::TextLayout,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaptionedImage {
    pub format: OutputFormat,
    pub bytes: Vec<u8>,
}

/// Captions encoded images using one shared font source.
///
/// Holds no mutable state; a single `Captioner` can serve concurrent callers.
#[derive(Clone, Debug)]
pub struct Captioner<F> {
    fonts: F,
    settings: CaptionSettings,
}

impl<F: FaceFactory> Captioner<F> {
    pub fn new(fonts: F, settings: CaptionSettings) -> CaptionResult<Self> {
        settings.validate()?;
        Ok(Self { fonts, settings })
    }

    pub fn settings(&self) -> &CaptionSettings {
        &self.settings
    }

    /// Decodes `bytes`, stamps `text` and re-encodes.
    ///
    /// Animations come back in their original container; everything else is
    /// re-encoded as JPEG.
    ///
    /// Pipeline:
    /// 1. [`decode_image`] (format sniffed from content)
    /// 2. [`caption_animation`] per frame, or [`caption_still`]
    /// 3. re-encode
    #[tracing::instrument(skip_all, fields(input_bytes = bytes.len(), lines = text.split('\n').count()))]
    pub fn caption(&self, bytes: &[u8], text: &str) -> CaptionResult<CaptionedImage> {
        let out = match decode_image(bytes)? {
            DecodedImage::Animated(mut anim) => {
                let face = self.fonts.face(&self.settings.animated_face)?;
                caption_animation(&mut anim, text, &face, &self.settings)?;
                CaptionedImage {
                    format: OutputFormat::Gif,
                    bytes: encode_animation(&anim)?,
                }
            }
            DecodedImage::Static(mut canvas) => {
                let face = self.fonts.face(&self.settings.static_face)?;
                caption_still(&mut canvas, text, &face, &self.settings);
                CaptionedImage {
                    format: OutputFormat::Jpeg,
                    bytes: encode_jpeg(&canvas, self.settings.jpeg_quality)?,
                }
            }
        };
        tracing::info!(
            format = ?out.format,
            output_bytes = out.bytes.len(),
            "captioned image"
        );
        Ok(out)
    }
}

/// One-shot form of [`Captioner::caption`].
pub fn caption_image<F: FaceFactory>(
    bytes: &[u8],
    text: &str,
    fonts: &F,
    settings: &CaptionSettings,
) -> CaptionResult<CaptionedImage> {
    Captioner::new(fonts, settings.clone())?.caption(bytes, text)
}

/// Stamps `text` onto a full-color canvas.
pub fn caption_still<F: Face + ?Sized>(
    canvas: &mut RgbaCanvas,
    text: &str,
    face: &F,
    settings: &CaptionSettings,
) {
    let layout = TextLayout::new(
        text,
        face,
        canvas.width(),
        canvas.height(),
        settings.anchor_ratio,
    );
    caption_rgba(canvas, &layout, face, &settings.ink);
}

/// Stamps `text` onto every frame, resolving inks against each frame's own palette.
///
/// The layout is computed once against the logical screen so the caption sits
/// still across frames. Frame order, timing and disposal are left as decoded.
pub fn caption_animation<F: Face + ?Sized>(
    anim: &mut AnimatedImage,
    text: &str,
    face: &F,
    settings: &CaptionSettings,
) -> CaptionResult<()> {
    let layout = TextLayout::new(
        text,
        face,
        u32::from(anim.width),
        u32::from(anim.height),
        settings.anchor_ratio,
    );

    let caption_frame = |index: usize, frame: &mut crate::animation::Frame| -> CaptionResult<()> {
        let resolved = caption_indexed(
            &mut frame.canvas,
            index,
            &layout,
            face,
            &settings.ink,
            settings.palette_strategy,
        )?;
        if resolved.palette_rewritten {
            frame.local_palette = true;
        }
        tracing::debug!(
            frame = index,
            fill = resolved.fill,
            shadow = resolved.shadow,
            "captioned frame"
        );
        Ok(())
    };

    if !settings.threading.parallel {
        for (index, frame) in anim.frames.iter_mut().enumerate() {
            caption_frame(index, frame)?;
        }
        return Ok(());
    }

    let pool = build_thread_pool(&settings.threading)?;
    pool.install(|| {
        anim.frames
            .par_iter_mut()
            .enumerate()
            .try_for_each(|(index, frame)| caption_frame(index, frame))
    })
}

fn build_thread_pool(threading: &FrameThreading) -> CaptionResult<rayon::ThreadPool> {
    if threading.threads == Some(0) {
        return Err(CaptionError::validation(
            "threading.threads must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threading.threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| CaptionError::validation(format!("failed to build rayon thread pool: {e}")))
}
