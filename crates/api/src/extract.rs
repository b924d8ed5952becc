//! Request extractors.
//!
//! Authentication happens upstream; the gateway forwards the authenticated
//! user id in the `x-user-id` header. The body, query and path wrappers turn
//! axum's plain-text rejections into `AppError::BadRequest` so every
//! malformed request gets the JSON error shape.

use axum::extract::{FromRequest, FromRequestParts, Json, Multipart, Path, Query, Request};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use serde::de::DeserializeOwned;

use instabids_core::types::EntityId;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";

/// The authenticated caller. Rejects with 401 when the header is missing.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser {
    pub user_id: EntityId,
}

/// The caller, if the request carries an identity.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Option<EntityId>);

fn user_from_headers(headers: &HeaderMap) -> Result<Option<EntityId>, AppError> {
    let Some(raw) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };
    raw.to_str()
        .ok()
        .and_then(|s| EntityId::parse_str(s.trim()).ok())
        .map(Some)
        .ok_or_else(|| AppError::Unauthorized(format!("Invalid {USER_ID_HEADER} header")))
}

impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match user_from_headers(&parts.headers)? {
            Some(user_id) => Ok(CurrentUser { user_id }),
            None => Err(AppError::Unauthorized(format!(
                "Missing {USER_ID_HEADER} header"
            ))),
        }
    }
}

impl<S: Send + Sync> FromRequestParts<S> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        user_from_headers(&parts.headers).map(MaybeUser)
    }
}

/// `Json<T>` with a JSON 400 on a missing, malformed or mistyped body.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppJson<T>(pub T);

impl<T, S> FromRequest<S> for AppJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Json::<T>::from_request(req, state)
            .await
            .map(|Json(value)| AppJson(value))
            .map_err(|e| AppError::BadRequest(e.body_text()))
    }
}

/// `Query<T>` with a JSON 400 on unparseable parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct AppQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for AppQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Query::<T>::from_request_parts(parts, state)
            .await
            .map(|Query(value)| AppQuery(value))
            .map_err(|e| AppError::BadRequest(e.body_text()))
    }
}

/// `Path<T>` with a JSON 400 when a segment does not parse, e.g. a
/// malformed id.
#[derive(Debug, Clone, Copy)]
pub struct AppPath<T>(pub T);

impl<T, S> FromRequestParts<S> for AppPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        Path::<T>::from_request_parts(parts, state)
            .await
            .map(|Path(value)| AppPath(value))
            .map_err(|e| AppError::BadRequest(e.body_text()))
    }
}

/// `Multipart` with a JSON 400 when the request is not `multipart/form-data`.
pub struct AppMultipart(pub Multipart);

impl<S: Send + Sync> FromRequest<S> for AppMultipart {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        Multipart::from_request(req, state)
            .await
            .map(AppMultipart)
            .map_err(|e| AppError::BadRequest(e.body_text()))
    }
}
