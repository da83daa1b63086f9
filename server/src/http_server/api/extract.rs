//! `Json`, `Path` and `Query` extractors whose rejections use the `{"detail": ..}` error body.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    response::{IntoResponse, Response},
};
use axum_macros::{FromRequest, FromRequestParts};
use color_eyre::eyre::eyre;
use serde::Serialize;

use crate::http_server::errors::ServerError;

pub(crate) struct Rejection(ServerError);

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        self.0.into_response()
    }
}

macro_rules! rejection_from {
    ($($rejection:ty),*) => {
        $(
            impl From<$rejection> for Rejection {
                fn from(rejection: $rejection) -> Self {
                    Self(ServerError(eyre!(rejection.body_text()), rejection.status()))
                }
            }
        )*
    };
}

rejection_from!(JsonRejection, PathRejection, QueryRejection);

#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(Rejection))]
pub(crate) struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(Rejection))]
pub(crate) struct Path<T>(pub T);

#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(Rejection))]
pub(crate) struct Query<T>(pub T);
