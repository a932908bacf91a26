//! HTMX request detection.

use axum::{extract::FromRequestParts, http::request::Parts};

/// Header HTMX sets on every request it issues.
pub const HX_REQUEST_HEADER: &str = "hx-request";

/// Whether the request was issued by HTMX.
///
/// HTMX requests get the directory fragment; plain requests get the full page.
///
/// # Example
///
/// ```ignore
/// async fn handler(HxRequest(partial): HxRequest) -> impl IntoResponse {
///     if partial { /* fragment */ } else { /* page */ }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HxRequest(pub bool);

impl<S> FromRequestParts<S> for HxRequest
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let is_htmx = parts
            .headers
            .get(HX_REQUEST_HEADER)
            .is_some_and(|v| v.as_bytes() == b"true");
        Ok(Self(is_htmx))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    async fn extract(request: Request<()>) -> HxRequest {
        let (mut parts, ()) = request.into_parts();
        HxRequest::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_htmx_header_detected() {
        let request = Request::builder()
            .header("HX-Request", "true")
            .body(())
            .unwrap();
        assert_eq!(extract(request).await, HxRequest(true));
    }

    #[tokio::test]
    async fn test_plain_request() {
        let request = Request::builder().body(()).unwrap();
        assert_eq!(extract(request).await, HxRequest(false));
    }
}
