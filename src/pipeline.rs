//! Fetches a cat, falling back to the fire cat when that doesn't work out.
//!
//! Whatever goes wrong with the remote picture (transport, status, body, decode)
//! ends in the fallback image. Only problems with the fallback assets themselves,
//! or with encoding, are errors.

use tracing::{debug, instrument, warn};
use url::Url;

use crate::config::{CatConfig, FallbackAssets};
use crate::constants::FALLBACK_MESSAGE;
use crate::error::KutegoError;
use crate::imaging::{self, SizeToken};
use image::DynamicImage;

/// Why the remote picture wasn't used.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FetchFailure {
    /// The request never got an answer.
    Transport(String),
    /// The answer wasn't a success.
    Status(u16),
    /// The body couldn't be read.
    Body(String),
    /// The body wasn't an image.
    Decode(String),
}

impl FetchFailure {
    /// Short form for the fallback response header.
    pub fn reason(&self) -> String {
        match self {
            Self::Transport(_) => "transport".to_string(),
            Self::Status(status) => format!("status-{status}"),
            Self::Body(_) => "body".to_string(),
            Self::Decode(_) => "decode".to_string(),
        }
    }
}

impl std::fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "request failed: {err}"),
            Self::Status(status) => write!(f, "upstream returned HTTP {status}"),
            Self::Body(err) => write!(f, "failed to read body: {err}"),
            Self::Decode(err) => write!(f, "failed to decode image: {err}"),
        }
    }
}

/// Where the served picture came from.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ImageOrigin {
    /// The requested cat.
    Fetched,
    /// The fire cat, and why.
    Fallback(FetchFailure),
}

/// A PNG ready to send.
#[derive(Debug)]
pub struct CatImage {
    /// PNG bytes.
    pub png: Vec<u8>,
    /// Real cat or fallback.
    pub origin: ImageOrigin,
}

/// The requested name, or the default when it's blank.
pub fn resolve_name<'a>(requested: &'a str, default_cat: &'a str) -> &'a str {
    let requested = requested.trim();
    if requested.is_empty() {
        default_cat
    } else {
        requested
    }
}

/// `<base>/<name>.<extension>`, the name pushed as one encoded path segment.
pub fn cat_url(base: &Url, name: &str, extension: &str) -> Result<Url, KutegoError> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| KutegoError::InternalServerError(format!("{base} can't be a base URL")))?
        .pop_if_empty()
        .push(&format!("{name}.{extension}"));
    Ok(url)
}

/// Fetch, decode or fall back, resize, encode.
#[instrument(level = "debug", skip(client, config))]
pub async fn fetch_cat(
    client: &reqwest::Client,
    config: &CatConfig,
    name: &str,
    size: Option<SizeToken>,
) -> Result<CatImage, KutegoError> {
    let name = resolve_name(name, &config.default_cat);
    let url = cat_url(&config.image_base_url, name, &config.image_extension)?;
    debug!("Fetching {}", url);
    let fetched = fetch_bytes(client, url).await;

    let assets = config.fallback.clone();
    tokio::task::spawn_blocking(move || render(fetched, &assets, size)).await?
}

async fn fetch_bytes(client: &reqwest::Client, url: Url) -> Result<Vec<u8>, FetchFailure> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| FetchFailure::Transport(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchFailure::Status(status.as_u16()));
    }
    let body = response
        .bytes()
        .await
        .map_err(|err| FetchFailure::Body(err.to_string()))?;
    Ok(body.to_vec())
}

/// Turns whatever the fetch produced into a PNG.
///
/// The fetched picture is resized only when a size was asked for. The fallback
/// honours the requested size too, and is `medium` when none was given.
pub fn render(
    fetched: Result<Vec<u8>, FetchFailure>,
    assets: &FallbackAssets,
    size: Option<SizeToken>,
) -> Result<CatImage, KutegoError> {
    let decoded = fetched.and_then(|bytes| {
        imaging::decode(&bytes).map_err(|err| FetchFailure::Decode(err.to_string()))
    });
    let (image, origin, size) = match decoded {
        Ok(image) => (image, ImageOrigin::Fetched, size),
        Err(failure) => {
            warn!("Serving the fallback image, {}", failure);
            (
                fallback_image(assets)?,
                ImageOrigin::Fallback(failure),
                Some(size.unwrap_or(SizeToken::Medium)),
            )
        }
    };

    let image = match size {
        Some(size) => imaging::resize(&image, size),
        None => image,
    };
    let png = imaging::encode_png(&image)?;
    Ok(CatImage { png, origin })
}

/// The fire cat with its caption.
pub fn fallback_image(assets: &FallbackAssets) -> Result<DynamicImage, KutegoError> {
    let image = imaging::open(&assets.image)?;
    Ok(imaging::overlay_text(&image, FALLBACK_MESSAGE, &assets.font)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{gif_bytes, listing_json, spawn_upstream, test_client, test_config};

    fn assets() -> FallbackAssets {
        FallbackAssets {
            image: crate::testing::fallback_image_path(),
            font: crate::testing::font_path(),
        }
    }

    fn dimensions(png: &[u8]) -> (u32, u32) {
        let image = imaging::decode(png).expect("decode png");
        (image.width(), image.height())
    }

    #[test]
    fn blank_names_use_the_default() {
        assert_eq!(resolve_name("", "SadCatto"), "SadCatto");
        assert_eq!(resolve_name("  ", "SadCatto"), "SadCatto");
        assert_eq!(resolve_name("Gandalf", "SadCatto"), "Gandalf");
    }

    #[test]
    fn urls_are_built_from_segments() {
        let base = Url::parse("https://github.com/Pandahoro/cats/raw/main/").expect("url");
        assert_eq!(
            cat_url(&base, "SadCatto", "gif").expect("url").as_str(),
            "https://github.com/Pandahoro/cats/raw/main/SadCatto.gif"
        );
        let base = Url::parse("http://localhost:1234/raw").expect("url");
        assert_eq!(
            cat_url(&base, "Sad Catto?", "gif").expect("url").as_str(),
            "http://localhost:1234/raw/Sad%20Catto%3F.gif"
        );
        let base = Url::parse("mailto:cat@example.org").expect("url");
        assert!(cat_url(&base, "x", "gif").is_err());
    }

    #[test]
    fn fetched_image_without_size_is_untouched() {
        let cat = render(Ok(gif_bytes(200, 150)), &assets(), None).expect("render");
        assert_eq!(cat.origin, ImageOrigin::Fetched);
        assert_eq!(dimensions(&cat.png), (200, 150));
    }

    #[test]
    fn fetched_image_is_resized() {
        let cat = render(Ok(gif_bytes(200, 150)), &assets(), Some(SizeToken::Small))
            .expect("render");
        assert_eq!(cat.origin, ImageOrigin::Fetched);
        assert_eq!(dimensions(&cat.png), (133, 100));
    }

    #[test]
    fn failures_fall_back() {
        let failures = [
            FetchFailure::Transport("connection refused".to_string()),
            FetchFailure::Status(404),
            FetchFailure::Body("reset".to_string()),
        ];
        for failure in failures {
            let cat = render(Err(failure.clone()), &assets(), Some(SizeToken::Small))
                .expect("render");
            assert_eq!(cat.origin, ImageOrigin::Fallback(failure));
            assert_eq!(dimensions(&cat.png).1, 100);
        }

        let cat = render(Ok(b"GIF89a but not really".to_vec()), &assets(), None).expect("render");
        assert!(matches!(
            cat.origin,
            ImageOrigin::Fallback(FetchFailure::Decode(_))
        ));
        // no size asked for, the fallback is medium
        assert_eq!(dimensions(&cat.png), (300, 300));
    }

    #[test]
    fn broken_fallback_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing_font = FallbackAssets {
            image: crate::testing::fallback_image_path(),
            font: dir.path().join("missing.ttf"),
        };
        let result = render(Err(FetchFailure::Status(500)), &missing_font, None);
        assert!(matches!(result, Err(KutegoError::InternalServerError(_))));

        let missing_image = FallbackAssets {
            image: dir.path().join("missing.png"),
            font: crate::testing::font_path(),
        };
        let result = render(Err(FetchFailure::Status(500)), &missing_image, None);
        assert!(matches!(result, Err(KutegoError::InternalServerError(_))));

        // a good fetch never touches the assets
        assert!(render(Ok(gif_bytes(10, 10)), &missing_image, None).is_ok());
    }

    #[test]
    fn failure_reasons_are_header_safe() {
        assert_eq!(FetchFailure::Status(404).reason(), "status-404");
        assert_eq!(
            FetchFailure::Transport("dns: no such host\n".to_string()).reason(),
            "transport"
        );
    }

    #[tokio::test]
    async fn fetches_from_upstream() {
        let addr = spawn_upstream(listing_json(&[])).await;
        let config = test_config(addr);
        let client = test_client();

        let cat = fetch_cat(&client, &config, "", Some(SizeToken::XSmall))
            .await
            .expect("default cat");
        assert_eq!(cat.origin, ImageOrigin::Fetched);
        assert_eq!(dimensions(&cat.png), (67, 50));

        let cat = fetch_cat(&client, &config, "Nobody", None)
            .await
            .expect("fallback");
        assert_eq!(cat.origin, ImageOrigin::Fallback(FetchFailure::Status(404)));

        let cat = fetch_cat(&client, &config, "Broken", None)
            .await
            .expect("fallback");
        assert!(matches!(
            cat.origin,
            ImageOrigin::Fallback(FetchFailure::Decode(_))
        ));
    }

    #[tokio::test]
    async fn unreachable_upstream_falls_back() {
        // grab a free port, then let it go so nothing is listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let config = test_config(addr);
        let cat = fetch_cat(&test_client(), &config, "SadCatto", None)
            .await
            .expect("fallback");
        assert!(matches!(
            cat.origin,
            ImageOrigin::Fallback(FetchFailure::Transport(_))
        ));
    }
}
