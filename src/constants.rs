//! Shared constants/setters for things
//!

/// Custom header set when the fallback image was served, carries the reason.
pub const X_KUTEGO_FALLBACK: &str = "x-kutego-fallback";

/// User agent sent upstream, GitHub rejects requests without one.
pub const USER_AGENT: &str = concat!("kutego/", env!("CARGO_PKG_VERSION"));

/// Media type GitHub recommends for the REST API.
pub const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Files in the cat repository that aren't cats.
pub const RESERVED_FILENAMES: [&str; 2] = [".gitignore", "README.md"];

/// Caption drawn on the fallback image.
pub const FALLBACK_MESSAGE: &str = "Ooops, Error! It's on fire!";

/// Pixel size the fallback caption is rendered at.
pub const CAPTION_FONT_SIZE: f32 = 50.0;

/// Horizontal space (in pixels, both sides together) kept clear of the caption.
pub const CAPTION_MARGIN: u32 = 60;

/// Line height multiplier for wrapped captions.
pub const CAPTION_LINE_SPACING: f32 = 1.5;

/// Cache-Control for responses that must not be reused, eg random picks.
pub const NO_STORE: &str = "no-store";
