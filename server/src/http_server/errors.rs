use std::fmt::{Debug, Display};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use color_eyre::eyre::eyre;

/// A handler failure and the status it should be answered with.
pub struct ServerError(pub(crate) color_eyre::Report, pub(crate) StatusCode);

impl ServerError {
    pub(crate) fn not_found(what: &str) -> Self {
        Self(eyre!("{what} not found"), StatusCode::NOT_FOUND)
    }

    pub(crate) fn bad_request(msg: impl Display) -> Self {
        Self(eyre!("{msg}"), StatusCode::BAD_REQUEST)
    }
}

impl Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl Debug for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Status Code: {}", self.1)?;
        Debug::fmt(&self.0, f)
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        if self.1.is_server_error() {
            sentry::capture_error(&*self.0);
            tracing::error!(error = ?self.0, status = %self.1, "ServerError");
        } else {
            tracing::info!(error = %self.0, status = %self.1, "Request rejected");
        }

        let detail = if self.1.is_server_error() {
            self.1
                .canonical_reason()
                .unwrap_or("Internal Server Error")
                .to_string()
        } else {
            self.0.to_string()
        };

        (self.1, Json(serde_json::json!({ "detail": detail }))).into_response()
    }
}

impl<E> From<E> for ServerError
where
    E: Into<color_eyre::Report>,
{
    fn from(err: E) -> Self {
        ServerError(err.into(), StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub(crate) trait WithStatus<T> {
    fn with_status(self, status: StatusCode) -> Result<T, ServerError>;
}

impl<T, E> WithStatus<T> for Result<T, E>
where
    E: Into<color_eyre::Report>,
{
    fn with_status(self, status: StatusCode) -> Result<T, ServerError> {
        self.map_err(|e| ServerError(e.into(), status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_client_errors_show_their_message() {
        let response = ServerError::not_found("Recipe").into_response();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "detail": "Recipe not found" })
        );
    }

    #[tokio::test]
    async fn test_server_errors_hide_their_message() {
        let err: ServerError = eyre!("connection refused to 10.0.0.3").into();
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            serde_json::json!({ "detail": "Internal Server Error" })
        );
    }

    #[test]
    fn test_with_status() {
        let result: Result<(), _> = Err(eyre!("bad date")).with_status(StatusCode::BAD_REQUEST);

        assert_eq!(result.unwrap_err().1, StatusCode::BAD_REQUEST);
    }
}
