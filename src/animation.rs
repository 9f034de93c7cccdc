use std::{borrow::Cow, io::Cursor};

use crate::{
    canvas::IndexedCanvas,
    error::{CaptionError, CaptionResult},
    palette::Palette,
};

pub use gif::{DisposalMethod, Repeat};

/// One frame of an indexed animation, with the palette it is drawn with.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub canvas: IndexedCanvas,
    /// Delay in units of 10 ms.
    pub delay: u16,
    pub dispose: DisposalMethod,
    pub needs_user_input: bool,
    /// Whether `canvas.palette()` is written as this frame's own color table.
    ///
    /// Frames that use the global table carry a copy of it and leave this unset
    /// until their palette is rewritten.
    pub local_palette: bool,
}

/// An indexed animation in playback order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnimatedImage {
    pub width: u16,
    pub height: u16,
    pub global_palette: Option<Palette>,
    pub background_index: Option<u8>,
    pub repeat: Repeat,
    pub frames: Vec<Frame>,
}

impl AnimatedImage {
    pub fn delays(&self) -> Vec<u16> {
        self.frames.iter().map(|f| f.delay).collect()
    }

    pub fn disposals(&self) -> Vec<DisposalMethod> {
        self.frames.iter().map(|f| f.dispose).collect()
    }
}

/// Decodes every GIF frame as palette indices, keeping timing and disposal.
pub fn decode_gif(bytes: &[u8]) -> CaptionResult<AnimatedImage> {
    let mut opts = gif::DecodeOptions::new();
    opts.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = opts
        .read_info(Cursor::new(bytes))
        .map_err(|e| CaptionError::decode(format!("read gif header: {e}")))?;

    let global_palette = decoder
        .global_palette()
        .map(Palette::from_rgb_bytes)
        .transpose()
        .map_err(|e| CaptionError::decode(format!("global color table: {e}")))?;
    let width = decoder.width();
    let height = decoder.height();
    let background_index = decoder.bg_color().and_then(|i| u8::try_from(i).ok());

    let mut frames = Vec::new();
    while let Some(raw) = decoder
        .read_next_frame()
        .map_err(|e| CaptionError::decode(format!("gif frame {}: {e}", frames.len())))?
    {
        let index = frames.len();
        let (palette, local_palette) = match (&raw.palette, &global_palette) {
            (Some(local), _) => (
                Palette::from_rgb_bytes(local).map_err(|e| {
                    CaptionError::decode(format!("gif frame {index} color table: {e}"))
                })?,
                true,
            ),
            (None, Some(global)) => (global.clone(), false),
            (None, None) => {
                return Err(CaptionError::decode(format!(
                    "gif frame {index} has no color table"
                )));
            }
        };
        let canvas = IndexedCanvas::new(
            raw.left,
            raw.top,
            raw.width,
            raw.height,
            raw.buffer.to_vec(),
            palette,
            raw.transparent,
        )
        .map_err(|e| CaptionError::decode(format!("gif frame {index}: {e}")))?;
        frames.push(Frame {
            canvas,
            delay: raw.delay,
            dispose: raw.dispose,
            needs_user_input: raw.needs_user_input,
            local_palette,
        });
    }

    if frames.is_empty() {
        return Err(CaptionError::decode("gif contains no frames"));
    }

    tracing::debug!(
        width,
        height,
        frames = frames.len(),
        "decoded indexed animation"
    );

    Ok(AnimatedImage {
        width,
        height,
        global_palette,
        background_index,
        repeat: decoder.repeat(),
        frames,
    })
}

/// Encodes frames in order with their original timing, disposal and placement.
///
/// Frames are written progressively; decoded buffers are already de-interlaced.
pub fn encode_gif(anim: &AnimatedImage) -> CaptionResult<Vec<u8>> {
    let global = anim
        .global_palette
        .as_ref()
        .map(Palette::to_rgb_bytes)
        .unwrap_or_default();

    let mut out = Vec::new();
    {
        let mut encoder = gif::Encoder::new(&mut out, anim.width, anim.height, &global)
            .map_err(|e| CaptionError::encode(format!("write gif header: {e}")))?;
        if anim.repeat != Repeat::Finite(0) {
            encoder
                .set_repeat(anim.repeat)
                .map_err(|e| CaptionError::encode(format!("write gif loop count: {e}")))?;
        }

        for (index, frame) in anim.frames.iter().enumerate() {
            let canvas = &frame.canvas;
            let palette = (frame.local_palette || anim.global_palette.is_none())
                .then(|| canvas.palette().to_rgb_bytes());
            let raw = gif::Frame {
                delay: frame.delay,
                dispose: frame.dispose,
                transparent: canvas.transparent(),
                needs_user_input: frame.needs_user_input,
                top: canvas.top,
                left: canvas.left,
                width: canvas.width(),
                height: canvas.height(),
                interlaced: false,
                palette,
                buffer: Cow::Borrowed(canvas.pixels()),
            };
            encoder
                .write_frame(&raw)
                .map_err(|e| CaptionError::encode(format!("gif frame {index}: {e}")))?;
        }
        encoder
            .into_inner()
            .map_err(|e| CaptionError::encode(format!("write gif trailer: {e}")))?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::palette::Rgb8;

    fn two_frame_gif() -> Vec<u8> {
        let mut out = Vec::new();
        {
            let mut enc = gif::Encoder::new(&mut out, 4, 2, &[0, 0, 0, 255, 255, 255]).unwrap();
            enc.set_repeat(Repeat::Infinite).unwrap();
            let f0 = gif::Frame {
                delay: 7,
                dispose: DisposalMethod::Background,
                width: 4,
                height: 2,
                buffer: Cow::Owned(vec![0, 1, 0, 1, 1, 0, 1, 0]),
                ..gif::Frame::default()
            };
            let f1 = gif::Frame {
                delay: 9,
                dispose: DisposalMethod::Keep,
                left: 1,
                top: 1,
                width: 2,
                height: 1,
                transparent: Some(2),
                palette: Some(vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120]),
                buffer: Cow::Owned(vec![3, 2]),
                ..gif::Frame::default()
            };
            enc.write_frame(&f0).unwrap();
            enc.write_frame(&f1).unwrap();
        }
        out
    }

    #[test]
    fn decode_keeps_palettes_placement_and_timing() {
        let anim = decode_gif(&two_frame_gif()).unwrap();
        assert_eq!((anim.width, anim.height), (4, 2));
        assert_eq!(anim.repeat, Repeat::Infinite);
        assert_eq!(anim.delays(), vec![7, 9]);
        assert_eq!(
            anim.disposals(),
            vec![DisposalMethod::Background, DisposalMethod::Keep]
        );

        let f0 = &anim.frames[0];
        assert!(!f0.local_palette);
        assert_eq!(f0.canvas.palette().get(1), Some(Rgb8::WHITE));
        assert_eq!(f0.canvas.pixels(), &[0, 1, 0, 1, 1, 0, 1, 0]);

        let f1 = &anim.frames[1];
        assert!(f1.local_palette);
        assert_eq!((f1.canvas.left, f1.canvas.top), (1, 1));
        assert_eq!(f1.canvas.transparent(), Some(2));
        assert_eq!(f1.canvas.palette().get(3), Some(Rgb8::new(100, 110, 120)));
    }

    #[test]
    fn encode_then_decode_preserves_structure() {
        let anim = decode_gif(&two_frame_gif()).unwrap();
        let again = decode_gif(&encode_gif(&anim).unwrap()).unwrap();
        assert_eq!(again, anim);
    }

    #[test]
    fn rewritten_global_palette_is_written_locally() {
        let mut anim = decode_gif(&two_frame_gif()).unwrap();
        let swapped = Palette::new(vec![Rgb8::WHITE, Rgb8::BLACK]).unwrap();
        let f0 = &mut anim.frames[0];
        f0.canvas.replace_palette(swapped, &[1, 0], None);
        f0.local_palette = true;

        let again = decode_gif(&encode_gif(&anim).unwrap()).unwrap();
        assert!(again.frames[0].local_palette);
        assert_eq!(again.frames[0].canvas.pixels(), &[1, 0, 1, 0, 0, 1, 0, 1]);
        assert_eq!(again.frames[0].canvas.palette().get(0), Some(Rgb8::WHITE));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            decode_gif(b"GIF89a-not-really"),
            Err(CaptionError::Decode(_))
        ));
    }
}
