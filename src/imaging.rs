//! Decoding, resizing, captioning and encoding of cat pictures.

use std::io::Cursor;
use std::path::Path;
use std::str::FromStr;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, Rgba};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::debug;

use crate::constants::{CAPTION_FONT_SIZE, CAPTION_LINE_SPACING, CAPTION_MARGIN};

/// Errors from the image stages.
#[derive(Debug)]
pub enum ImagingError {
    /// Reading a local asset failed.
    Io(std::io::Error),
    /// The image library couldn't decode or encode.
    Image(image::ImageError),
    /// The caption font couldn't be loaded.
    Font(String),
}

impl std::fmt::Display for ImagingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "Failed to read image asset: {err}"),
            Self::Image(err) => write!(f, "Image processing failed: {err}"),
            Self::Font(err) => write!(f, "Failed to load font: {err}"),
        }
    }
}

impl std::error::Error for ImagingError {}

impl From<std::io::Error> for ImagingError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<image::ImageError> for ImagingError {
    fn from(err: image::ImageError) -> Self {
        Self::Image(err)
    }
}

/// Coarse picture sizes, by target height.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SizeToken {
    /// 50px tall
    XSmall,
    /// 100px tall
    Small,
    /// 300px tall
    Medium,
    /// 1000px tall
    Large,
}

impl SizeToken {
    /// Every size, smallest first.
    pub const ALL: [SizeToken; 4] = [
        SizeToken::XSmall,
        SizeToken::Small,
        SizeToken::Medium,
        SizeToken::Large,
    ];

    /// Target height in pixels.
    pub fn height(self) -> u32 {
        match self {
            SizeToken::XSmall => 50,
            SizeToken::Small => 100,
            SizeToken::Medium => 300,
            SizeToken::Large => 1000,
        }
    }

    /// The token as it appears in a query string.
    pub fn as_str(self) -> &'static str {
        match self {
            SizeToken::XSmall => "x-small",
            SizeToken::Small => "small",
            SizeToken::Medium => "medium",
            SizeToken::Large => "large",
        }
    }
}

impl std::fmt::Display for SizeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An unrecognised size token.
#[derive(Debug, Eq, PartialEq)]
pub struct InvalidSizeToken(pub String);

impl std::fmt::Display for InvalidSizeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown size {:?}, expected one of x-small, small, medium, large",
            self.0
        )
    }
}

impl std::error::Error for InvalidSizeToken {}

impl FromStr for SizeToken {
    type Err = InvalidSizeToken;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        SizeToken::ALL
            .into_iter()
            .find(|token| token.as_str() == value)
            .ok_or_else(|| InvalidSizeToken(value.to_string()))
    }
}

/// Decodes bytes in any supported format (GIF, PNG, JPEG), going by content.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ImagingError> {
    let reader = ImageReader::new(Cursor::new(bytes)).with_guessed_format()?;
    debug!("Decoding image, detected format {:?}", reader.format());
    Ok(reader.decode()?)
}

/// Reads and decodes an image from disk.
pub fn open(path: &Path) -> Result<DynamicImage, ImagingError> {
    let bytes = std::fs::read(path)?;
    decode(&bytes)
}

/// Rescales to the token's height, keeping the aspect ratio.
pub fn resize(image: &DynamicImage, size: SizeToken) -> DynamicImage {
    let height = size.height();
    let width = scaled_width(image.width(), image.height(), height);
    image.resize_exact(width, height, FilterType::Lanczos3)
}

fn scaled_width(width: u32, height: u32, target_height: u32) -> u32 {
    if height == 0 {
        return 1;
    }
    let scaled = (f64::from(width) * f64::from(target_height) / f64::from(height)).round();
    (scaled as u32).max(1)
}

/// Serializes to PNG.
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>, ImagingError> {
    let mut output = Cursor::new(Vec::new());
    image.write_to(&mut output, ImageFormat::Png)?;
    Ok(output.into_inner())
}

/// Draws `text` near the top of a copy of `image`, word-wrapped and centred.
///
/// The font is loaded from `font_path` on every call. The source image is left alone.
pub fn overlay_text(
    image: &DynamicImage,
    text: &str,
    font_path: &Path,
) -> Result<DynamicImage, ImagingError> {
    let font_bytes = std::fs::read(font_path)
        .map_err(|err| ImagingError::Font(format!("{}: {err}", font_path.display())))?;
    let font = FontVec::try_from_vec(font_bytes)
        .map_err(|err| ImagingError::Font(format!("{}: {err}", font_path.display())))?;

    let mut canvas = image.to_rgba8();
    let (width, height) = canvas.dimensions();
    let scale = PxScale::from(CAPTION_FONT_SIZE);
    let max_width = width.saturating_sub(CAPTION_MARGIN).max(1);
    let lines = wrap_text(text, max_width, |line| text_size(scale, &font, line).0);

    let line_height = font.as_scaled(scale).height() * CAPTION_LINE_SPACING;
    let block_height = line_height * lines.len() as f32;
    let centre_y = height as f32 / 12.0;
    let top = (centre_y - block_height / 2.0).max(0.0);

    for (index, line) in lines.iter().enumerate() {
        let (line_width, _) = text_size(scale, &font, line);
        let x = (i64::from(width) - i64::from(line_width)) / 2;
        let y = top + line_height * index as f32;
        draw_text_mut(
            &mut canvas,
            Rgba([0, 0, 0, 255]),
            x as i32,
            y as i32,
            scale,
            &font,
            line,
        );
    }

    Ok(DynamicImage::ImageRgba8(canvas))
}

/// Greedy word wrap. A single word wider than `max_width` gets a line to itself.
fn wrap_text(text: &str, max_width: u32, measure: impl Fn(&str) -> u32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if measure(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
