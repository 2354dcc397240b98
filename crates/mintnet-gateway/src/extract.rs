//! Request extractors.
//!
//! The body, path and query extractors wrap axum's own and turn their
//! rejections into [`AppError`], so malformed requests get the same JSON
//! error body as every other failure.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::request::Parts,
    Json,
};
use mintnet_core::Viewer;
use mintnet_proto::EntityId;

use crate::error::AppError;

/// Header carrying the signed-in profile, set by the authenticating proxy.
pub const PROFILE_HEADER: &str = "x-mintnet-profile";

/// The viewer of a request. Anonymous if the profile header is absent.
#[derive(Debug, Clone)]
pub struct CurrentViewer(pub Viewer);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentViewer {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(PROFILE_HEADER) else {
            return Ok(Self(Viewer::anonymous()));
        };
        let profile = value
            .to_str()
            .map_err(|_| AppError::bad_request(format!("{} is not valid ASCII", PROFILE_HEADER)))?
            .trim()
            .parse::<EntityId>()
            .map_err(|e| AppError::bad_request(format!("{}: {}", PROFILE_HEADER, e)))?;
        Ok(Self(Viewer::signed_in(profile)))
    }
}

/// JSON request body.
#[derive(Debug)]
pub struct AppJson<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequest<S> for AppJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(request: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(request, state).await?;
        Ok(Self(value))
    }
}

/// Path parameters.
#[derive(Debug)]
pub struct AppPath<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for AppPath<T>
where
    Path<T>: FromRequestParts<S, Rejection = PathRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}

/// Query string parameters.
#[derive(Debug)]
pub struct AppQuery<T>(pub T);

#[axum::async_trait]
impl<S, T> FromRequestParts<S> for AppQuery<T>
where
    Query<T>: FromRequestParts<S, Rejection = QueryRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(Self(value))
    }
}
