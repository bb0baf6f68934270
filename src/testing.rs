//! Test helpers: fixture images and a stand-in for GitHub.

use std::io::Cursor;
use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Json;
use axum::Router;
use axum::routing::get;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use serde_json::{Value, json};
use url::Url;

use crate::config::{CatConfig, FallbackAssets};

/// The name the fake upstream serves a picture for.
pub(crate) const KNOWN_CAT: &str = "SadCatto";

pub(crate) fn solid_image(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        Rgba([255, 120, 0, 255]),
    ))
}

pub(crate) fn font_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/DejaVuSans.ttf")
}

pub(crate) fn fallback_image_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fire-cat.png")
}

pub(crate) fn gif_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut output = Cursor::new(Vec::new());
    solid_image(width, height)
        .write_to(&mut output, ImageFormat::Gif)
        .expect("encode gif");
    output.into_inner()
}

/// A GitHub contents listing, the way the API shapes it.
pub(crate) fn listing_json(files: &[&str]) -> Value {
    Value::Array(
        files
            .iter()
            .map(|file| {
                json!({
                    "name": file,
                    "path": file,
                    "sha": "0000000000000000000000000000000000000000",
                    "size": 1234,
                    "type": "file",
                    "download_url": format!("https://raw.githubusercontent.com/Pandahoro/cats/main/{file}"),
                })
            })
            .collect(),
    )
}

/// Serves `/raw/SadCatto.gif` (200x150), a 404 for any other picture,
/// garbage at `/raw/Broken.gif`, and `listing` at `/contents/`.
pub(crate) async fn spawn_upstream(listing: Value) -> SocketAddr {
    let gif = gif_bytes(200, 150);
    let app = Router::new()
        .route(
            &format!("/raw/{KNOWN_CAT}.gif"),
            get(move || {
                let gif = gif.clone();
                async move { ([(axum::http::header::CONTENT_TYPE, "image/gif")], gif) }
            }),
        )
        .route("/raw/Broken.gif", get(|| async { "this is not a gif" }))
        .route(
            "/contents/",
            get(move || {
                let listing = listing.clone();
                async move { Json(listing) }
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind upstream");
    let addr = listener.local_addr().expect("upstream addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

pub(crate) fn test_config(addr: SocketAddr) -> CatConfig {
    CatConfig {
        image_base_url: Url::parse(&format!("http://{addr}/raw/")).expect("base url"),
        image_extension: "gif".to_string(),
        listing_url: Url::parse(&format!("http://{addr}/contents/")).expect("listing url"),
        default_cat: KNOWN_CAT.to_string(),
        fallback: FallbackAssets {
            image: fallback_image_path(),
            font: font_path(),
        },
        github_token: None,
    }
}

/// Talks to the fake upstream directly, whatever proxy the environment sets.
pub(crate) fn test_client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .build()
        .expect("test client")
}
