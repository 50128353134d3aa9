use axum::{
    extract::Request,
    http::{header::HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::tracing::{scope_request_id, RequestId};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Ensures every request carries a request id: reuses the inbound
/// `x-request-id` header when present, otherwise mints a UUID. The id is
/// installed in the task-local scope for the duration of the request and
/// echoed on the response.
pub async fn request_id_middleware(mut req: Request, next: Next) -> Response {
    let header = HeaderName::from_static(REQUEST_ID_HEADER);

    let id = req
        .headers()
        .get(&header)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    if let Ok(value) = HeaderValue::from_str(&id) {
        req.headers_mut().insert(header.clone(), value.clone());
        let mut response = scope_request_id(RequestId::new(id), next.run(req)).await;
        response.headers_mut().insert(header, value);
        response
    } else {
        next.run(req).await
    }
}
