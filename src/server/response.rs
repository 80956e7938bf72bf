use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::warn;

use crate::adapter::{HttpResponse, ResponseBody};

impl IntoResponse for HttpResponse {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or_else(|_| {
            warn!(status = self.status, "Handler returned an invalid status code");
            StatusCode::INTERNAL_SERVER_ERROR
        });

        let mut builder = Response::builder().status(status);
        let mut has_content_type = false;
        for (key, value) in &self.headers {
            match (HeaderName::try_from(key.as_str()), HeaderValue::from_str(value)) {
                (Ok(name), Ok(value)) => {
                    has_content_type |= name == CONTENT_TYPE;
                    builder = builder.header(name, value);
                }
                _ => warn!(header = %key, "Skipping invalid response header"),
            }
        }

        let content_type = match &self.body {
            ResponseBody::Json(_) => "application/json; charset=utf-8",
            ResponseBody::Text(_) => "text/html; charset=utf-8",
        };
        let body = self.body.into_string();
        if !has_content_type && !body.is_empty() {
            builder = builder.header(CONTENT_TYPE, content_type);
        }

        builder
            .body(Body::from(body))
            .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
    }
}
