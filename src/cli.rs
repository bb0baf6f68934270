//! CLI parser
use clap::Parser;
use std::num::NonZeroU16;
use std::path::PathBuf;

#[derive(Parser, Debug)]
/// CLI Options
pub struct CliOptions {
    #[clap(long, help = "Enable debug logging", env = "KUTEGO_DEBUG")]
    /// Enable debug logging. Env: KUTEGO_DEBUG
    pub debug: bool,
    #[clap(long, short, default_value = "8080", env = "KUTEGO_PORT")]
    /// http listener, defaults to `8080`.
    /// Env: KUTEGO_PORT
    pub port: NonZeroU16,
    #[clap(
        long,
        short,
        default_value = "127.0.0.1",
        env = "KUTEGO_LISTEN_ADDRESS"
    )]
    /// Listen address, defaults to `127.0.0.1`.
    /// Env: KUTEGO_LISTEN_ADDRESS
    pub listen_address: String,

    #[clap(
        long,
        default_value = "https://github.com/Pandahoro/cats/raw/main/",
        env = "KUTEGO_IMAGE_BASE_URL"
    )]
    /// Where the cat pictures live, `<base>/<name>.<extension>`.
    /// Env: KUTEGO_IMAGE_BASE_URL
    pub image_base_url: String,

    #[clap(long, default_value = "gif", env = "KUTEGO_IMAGE_EXTENSION")]
    /// File extension of the remote pictures, without the dot.
    /// Env: KUTEGO_IMAGE_EXTENSION
    pub image_extension: String,

    #[clap(
        long,
        default_value = "https://api.github.com/repos/Pandahoro/cats/contents/",
        env = "KUTEGO_LISTING_URL"
    )]
    /// GitHub contents API URL for the directory holding the pictures.
    /// Env: KUTEGO_LISTING_URL
    pub listing_url: String,

    #[clap(long, default_value = "SadCatto", env = "KUTEGO_DEFAULT_CAT")]
    /// Cat served when no name is given.
    /// Env: KUTEGO_DEFAULT_CAT
    pub default_cat: String,

    #[clap(
        long,
        default_value = "./assets/fire-cat.png",
        env = "KUTEGO_FALLBACK_IMAGE"
    )]
    /// Image served when the remote picture can't be fetched.
    /// Env: KUTEGO_FALLBACK_IMAGE
    pub fallback_image: PathBuf,

    #[clap(
        long,
        default_value = "./assets/DejaVuSans.ttf",
        env = "KUTEGO_FONT"
    )]
    /// TrueType font used to caption the fallback image.
    /// Env: KUTEGO_FONT
    pub font: PathBuf,

    #[clap(long, env = "KUTEGO_GITHUB_TOKEN", hide_env_values = true)]
    /// Optional GitHub token for the listing API, avoids the anonymous rate limit.
    /// Env: KUTEGO_GITHUB_TOKEN
    pub github_token: Option<String>,
}
