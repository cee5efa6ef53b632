//! Responses for requests no route handles

use crate::core::error::{ApiError, RequestError};
use axum::{
    http::{Method, StatusCode, Uri},
    response::{Html, IntoResponse},
};

const NOT_FOUND_PAGE: &str = "<!DOCTYPE html>
<html>
<head><meta charset=\"utf-8\"><title>Not found</title></head>
<body><h1>404</h1><p>Resource not found</p></body>
</html>
";

/// Unknown path under `/api`
pub async fn api_not_found(uri: Uri) -> ApiError {
    RequestError::NotFound {
        path: uri.path().to_string(),
    }
    .into()
}

/// Known path, unsupported method
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    RequestError::MethodNotAllowed {
        method: method.to_string(),
        path: uri.path().to_string(),
    }
    .into()
}

/// Unknown path outside `/api` that is not a client file either
pub async fn page_not_found(uri: Uri) -> impl IntoResponse {
    tracing::debug!(path = %uri.path(), "no such page");
    (StatusCode::NOT_FOUND, Html(NOT_FOUND_PAGE))
}
