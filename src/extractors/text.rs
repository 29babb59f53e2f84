//! Plain-text body extractor (CSV uploads).

use crate::error::AppError;
use async_trait::async_trait;
use axum::extract::{FromRequest, Request};

/// The request body as UTF-8 text. Unreadable or non-UTF-8 bodies become a 400 `AppError::BadRequest`.
#[derive(Clone, Debug)]
pub struct ApiText(pub String);

#[async_trait]
impl<S> FromRequest<S> for ApiText
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match String::from_request(req, state).await {
            Ok(text) => Ok(ApiText(text)),
            Err(rejection) => Err(AppError::BadRequest(rejection.body_text())),
        }
    }
}
