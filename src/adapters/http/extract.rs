//! Request body extractors that answer in the API's error envelope.

use axum::{
    async_trait,
    extract::{rejection::JsonRejection, FromRequest, Request},
    response::{IntoResponse, Response},
    Json,
};
use serde::de::DeserializeOwned;

use super::dto::ErrorResponse;

/// `Json<T>` whose rejections are `{"success":false,"message":...}` bodies
/// instead of axum's plain-text ones. Status codes are axum's own
/// (400 syntax, 415 content type, 422 shape).
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonBodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(JsonBodyRejection)?;
        Ok(ApiJson(value))
    }
}

#[derive(Debug)]
pub struct JsonBodyRejection(pub JsonRejection);

impl IntoResponse for JsonBodyRejection {
    fn into_response(self) -> Response {
        let status = self.0.status();
        tracing::debug!(status = %status, error = %self.0.body_text(), "Rejected request body");
        (status, Json(ErrorResponse::new(self.0.body_text()))).into_response()
    }
}
