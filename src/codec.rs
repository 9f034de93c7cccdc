use image::{ImageFormat, codecs::jpeg::JpegEncoder};

use crate::{
    animation::{AnimatedImage, decode_gif, encode_gif},
    canvas::RgbaCanvas,
    error::{CaptionError, CaptionResult},
};

/// Decoded input, tagged by which compositing path it takes.
#[derive(Clone, Debug)]
pub enum DecodedImage {
    Animated(AnimatedImage),
    Static(RgbaCanvas),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Gif,
    Jpeg,
}

impl OutputFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Gif => "image/gif",
            Self::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Gif => "gif",
            Self::Jpeg => "jpg",
        }
    }
}

/// Detects the container format from the leading bytes.
pub fn sniff_format(bytes: &[u8]) -> CaptionResult<ImageFormat> {
    image::guess_format(bytes)
        .map_err(|e| CaptionError::decode(format!("unrecognized image format: {e}")))
}

/// Sniffs and decodes `bytes`: GIFs to indexed frames, anything else to a
/// freshly allocated full-color canvas.
pub fn decode_image(bytes: &[u8]) -> CaptionResult<DecodedImage> {
    let format = sniff_format(bytes)?;
    if format == ImageFormat::Gif {
        return decode_gif(bytes).map(DecodedImage::Animated);
    }

    let img = image::load_from_memory_with_format(bytes, format)
        .map_err(|e| CaptionError::decode(format!("decode {format:?}: {e}")))?;
    let rgba = img.to_rgba8();
    tracing::debug!(
        ?format,
        width = rgba.width(),
        height = rgba.height(),
        "decoded still image"
    );
    Ok(DecodedImage::Static(RgbaCanvas::from_rgba_image(&rgba)))
}

/// Encodes the canvas as JPEG, flattening any transparency onto black.
pub fn encode_jpeg(canvas: &RgbaCanvas, quality: u8) -> CaptionResult<Vec<u8>> {
    let rgb = image::RgbImage::from_raw(canvas.width(), canvas.height(), canvas.to_rgb8_over_black())
        .ok_or_else(|| CaptionError::encode("rgb buffer does not match canvas dimensions"))?;
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality)
        .encode_image(&rgb)
        .map_err(|e| CaptionError::encode(format!("encode jpeg: {e}")))?;
    Ok(out)
}

/// Re-encodes an animation in its original container.
pub fn encode_animation(anim: &AnimatedImage) -> CaptionResult<Vec<u8>> {
    encode_gif(anim)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn png_bytes(w: u32, h: u32, px: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(w, h, image::Rgba(px));
        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
            .unwrap();
        buf
    }

    #[test]
    fn png_takes_the_static_path() {
        let decoded = decode_image(&png_bytes(3, 2, [1, 2, 3, 255])).unwrap();
        let DecodedImage::Static(canvas) = decoded else {
            panic!("png decoded as animation");
        };
        assert_eq!((canvas.width(), canvas.height()), (3, 2));
        assert_eq!(canvas.pixel(2, 1), Some([1, 2, 3, 255]));
    }

    #[test]
    fn sniffing_ignores_everything_but_content() {
        assert_eq!(sniff_format(&png_bytes(1, 1, [0; 4])).unwrap(), ImageFormat::Png);
        assert!(matches!(
            decode_image(b"plain text, not pixels"),
            Err(CaptionError::Decode(_))
        ));
    }

    #[test]
    fn truncated_png_is_a_decode_error() {
        let bytes = png_bytes(8, 8, [9, 9, 9, 255]);
        assert!(matches!(
            decode_image(&bytes[..bytes.len() / 2]),
            Err(CaptionError::Decode(_))
        ));
    }

    #[test]
    fn jpeg_output_keeps_dimensions() {
        let canvas = RgbaCanvas::from_premul_rgba8(10, 6, vec![128; 10 * 6 * 4]).unwrap();
        let bytes = encode_jpeg(&canvas, 75).unwrap();
        assert_eq!(sniff_format(&bytes).unwrap(), ImageFormat::Jpeg);
        let back = image::load_from_memory(&bytes).unwrap();
        assert_eq!((back.width(), back.height()), (10, 6));
    }

    #[test]
    fn mime_and_extension() {
        assert_eq!(OutputFormat::Gif.mime_type(), "image/gif");
        assert_eq!(OutputFormat::Jpeg.extension(), "jpg");
    }
}
