use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::info;

use super::AppState;
use crate::cats::{self, ImageRef};
use crate::constants::{NO_STORE, X_KUTEGO_FALLBACK};
use crate::error::KutegoError;
use crate::imaging::SizeToken;
use crate::pipeline::{self, CatImage, ImageOrigin};

#[derive(Debug, Deserialize)]
pub(crate) struct CatQuery {
    size: Option<String>,
}

impl CatQuery {
    /// Blank counts as not given, anything unknown is the client's problem.
    fn size(&self) -> Result<Option<SizeToken>, KutegoError> {
        self.size
            .as_deref()
            .filter(|size| !size.is_empty())
            .map(str::parse::<SizeToken>)
            .transpose()
            .map_err(|err| KutegoError::BadRequest(err.to_string()))
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListQuery {
    name: Option<String>,
}

pub(crate) async fn health_handler() -> impl IntoResponse {
    "OK"
}

/// GET /cats, optionally narrowed to one cat by `name`
pub(crate) async fn list_cats_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ImageRef>>, KutegoError> {
    let cats = cats::list_cats(&state.client, &state.config).await?;
    let cats = match query.name.as_deref() {
        Some(name) => cats::find_by_name(cats, name),
        None => cats,
    };
    Ok(Json(cats))
}

pub(crate) async fn cat_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(query): Query<CatQuery>,
) -> Result<Response, KutegoError> {
    let size = query.size()?;
    let cat = pipeline::fetch_cat(&state.client, &state.config, &name, size).await?;
    png_response(cat, None)
}

/// GET /cats/ with no name serves the default cat
pub(crate) async fn default_cat_handler(
    State(state): State<AppState>,
    Query(query): Query<CatQuery>,
) -> Result<Response, KutegoError> {
    let size = query.size()?;
    let cat = pipeline::fetch_cat(&state.client, &state.config, "", size).await?;
    png_response(cat, None)
}

pub(crate) async fn random_cat_handler(
    State(state): State<AppState>,
    Query(query): Query<CatQuery>,
) -> Result<Response, KutegoError> {
    let size = query.size()?;
    let cats = cats::list_cats(&state.client, &state.config).await?;
    let Some(cat) = cats::choose_random(&cats) else {
        return Err(KutegoError::NotFound("no cats to choose from".to_string()));
    };
    info!("Random pick: {}", cat.name);
    let cat = pipeline::fetch_cat(&state.client, &state.config, &cat.name, size).await?;
    png_response(cat, Some(NO_STORE))
}

fn png_response(
    cat: CatImage,
    cache_control: Option<&'static str>,
) -> Result<Response, KutegoError> {
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, "image/png");
    if let Some(cache_control) = cache_control {
        builder = builder.header(CACHE_CONTROL, cache_control);
    }
    if let ImageOrigin::Fallback(failure) = &cat.origin
        && let Ok(value) = HeaderValue::from_str(&failure.reason())
    {
        builder = builder.header(X_KUTEGO_FALLBACK, value);
    }
    builder.body(Body::from(cat.png)).map_err(KutegoError::from)
}
