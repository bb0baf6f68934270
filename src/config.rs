//! Config handling

use std::path::PathBuf;

use tracing::log::LevelFilter;
use url::Url;

use crate::cli::CliOptions;
use crate::constants::USER_AGENT;
use crate::error::KutegoError;

/// Sets up logging based on the debug flag
pub fn setup_logging(debug: bool) -> Result<(), Box<std::io::Error>> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut logger = simple_logger::SimpleLogger::new().with_level(level);
    if !debug {
        logger = logger
            .with_module_level("tracing", LevelFilter::Warn)
            .with_module_level("rustls", LevelFilter::Info)
            .with_module_level("reqwest", LevelFilter::Info)
            .with_module_level("hyper_util", LevelFilter::Info)
            .with_module_level("h2", LevelFilter::Info);
    }
    logger.init().map_err(|err| {
        eprintln!("Failed to initialize logger: {}", err);
        Box::new(std::io::Error::other(err))
    })
}

/// Local files used to build the fallback image. Read on every use, never cached.
#[derive(Clone, Debug)]
pub struct FallbackAssets {
    /// The image served when the real one is unavailable.
    pub image: PathBuf,
    /// TrueType font for the caption.
    pub font: PathBuf,
}

/// Everything the handlers need to find cats.
#[derive(Clone, Debug)]
pub struct CatConfig {
    /// Base URL pictures are fetched from.
    pub image_base_url: Url,
    /// Extension appended to the cat name, without the dot.
    pub image_extension: String,
    /// GitHub contents API URL of the cat directory.
    pub listing_url: Url,
    /// Cat served when the request doesn't name one.
    pub default_cat: String,
    /// Fallback image and font.
    pub fallback: FallbackAssets,
    /// Bearer token for the listing API.
    pub github_token: Option<String>,
}

impl CatConfig {
    /// Validates the CLI options into a config.
    pub fn from_cli(cli: &CliOptions) -> Result<Self, KutegoError> {
        let image_extension = cli.image_extension.trim_start_matches('.').to_string();
        if image_extension.is_empty() {
            return Err(KutegoError::BadRequest(
                "image extension can't be empty".to_string(),
            ));
        }
        let default_cat = cli.default_cat.trim().to_string();
        if default_cat.is_empty() {
            return Err(KutegoError::BadRequest(
                "default cat name can't be empty".to_string(),
            ));
        }
        Ok(Self {
            image_base_url: Url::parse(&cli.image_base_url)?,
            image_extension,
            listing_url: Url::parse(&cli.listing_url)?,
            default_cat,
            fallback: FallbackAssets {
                image: cli.fallback_image.clone(),
                font: cli.font.clone(),
            },
            github_token: cli.github_token.clone().filter(|token| !token.is_empty()),
        })
    }
}

/// Builds the HTTP client shared by every request.
pub fn build_client() -> Result<reqwest::Client, KutegoError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|err| KutegoError::InternalServerError(format!("HTTP client setup: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn cli_defaults_become_config() {
        let cli = CliOptions::parse_from(["kutego"]);
        let config = CatConfig::from_cli(&cli).expect("default config");
        assert_eq!(
            config.image_base_url.as_str(),
            "https://github.com/Pandahoro/cats/raw/main/"
        );
        assert_eq!(config.image_extension, "gif");
        assert_eq!(config.default_cat, "SadCatto");
        assert_eq!(
            config.fallback.image,
            PathBuf::from("./assets/fire-cat.png")
        );
        assert!(config.github_token.is_none());
    }

    #[test]
    fn bad_urls_are_rejected() {
        let cli = CliOptions::parse_from(["kutego", "--image-base-url", "not a url"]);
        assert!(CatConfig::from_cli(&cli).is_err());
    }

    #[test]
    fn extension_dot_is_optional() {
        let cli = CliOptions::parse_from(["kutego", "--image-extension", ".png"]);
        let config = CatConfig::from_cli(&cli).expect("config");
        assert_eq!(config.image_extension, "png");
    }
}
