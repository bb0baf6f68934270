//! The catalogue of available cats, as listed by GitHub.

use axum::http::header::ACCEPT;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::CatConfig;
use crate::constants::{GITHUB_ACCEPT, RESERVED_FILENAMES};
use crate::error::KutegoError;

/// One picture available in the cat repository.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    /// Cat name, the filename without its extension.
    pub name: String,
    /// Path inside the repository.
    pub path: String,
    /// Direct download link.
    #[serde(rename = "downloadURL")]
    pub download_url: String,
}

/// The parts of a GitHub contents entry we care about.
#[derive(Debug, Deserialize)]
pub(crate) struct ContentEntry {
    name: String,
    path: String,
    // null for directories and submodules
    download_url: Option<String>,
}

/// Strips one trailing extension, `Gandalf.gif` becomes `Gandalf`.
pub fn image_name(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => filename,
    }
}

pub(crate) fn image_refs(entries: Vec<ContentEntry>) -> Vec<ImageRef> {
    entries
        .into_iter()
        .filter(|entry| !RESERVED_FILENAMES.contains(&entry.name.as_str()))
        .filter_map(|entry| {
            let Some(download_url) = entry.download_url else {
                debug!("Skipping {}, nothing to download", entry.path);
                return None;
            };
            Some(ImageRef {
                name: image_name(&entry.name).to_string(),
                path: entry.path,
                download_url,
            })
        })
        .collect()
}

/// Asks GitHub what's in the cat directory, once, no retries.
#[instrument(level = "debug", skip_all, fields(url = %config.listing_url))]
pub async fn list_cats(
    client: &reqwest::Client,
    config: &CatConfig,
) -> Result<Vec<ImageRef>, KutegoError> {
    let mut request = client
        .get(config.listing_url.clone())
        .header(ACCEPT, GITHUB_ACCEPT);
    if let Some(token) = config.github_token.as_deref() {
        request = request.bearer_auth(token);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(KutegoError::Upstream(format!(
            "listing {} returned {}",
            config.listing_url, status
        )));
    }
    let entries: Vec<ContentEntry> = response.json().await?;
    let cats = image_refs(entries);
    debug!("Listed {} cats", cats.len());
    Ok(cats)
}

/// Keeps the first cat called `name`, or nothing.
///
/// Names come from unique filenames so more than one match only happens when the
/// same cat exists with two extensions, and then the first listed wins.
pub fn find_by_name(cats: Vec<ImageRef>, name: &str) -> Vec<ImageRef> {
    cats.into_iter()
        .find(|cat| cat.name == name)
        .into_iter()
        .collect()
}

/// Picks a cat uniformly at random, `None` when there are none.
pub fn choose_random(cats: &[ImageRef]) -> Option<&ImageRef> {
    cats.choose(&mut rand::rng())
}
