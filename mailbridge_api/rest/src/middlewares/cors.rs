use anyhow::Context;
use axum::http::HeaderValue;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, Any, CorsLayer};

pub const ANY_ORIGIN: &str = "*";

/// Build the CORS layer for the configured origins.
///
/// `*` allows every origin but no credentials. An explicit list of origins
/// allows credentials and mirrors the requested methods and headers.
pub fn layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.iter().any(|origin| origin.trim() == ANY_ORIGIN) {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins = origins
        .iter()
        .map(|origin| origin.trim())
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("Invalid CORS origin {origin:?}"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request()))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header, Method, Request},
        routing, Router,
    };
    use pretty_assertions::assert_eq;
    use tower::ServiceExt;

    use super::*;

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/send-email")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    }

    fn make_sut(origins: &[&str]) -> Router {
        let origins = origins.iter().map(|&x| x.to_owned()).collect::<Vec<_>>();
        Router::new()
            .route("/send-email", routing::post(|| async { "ok" }))
            .layer(layer(&origins).unwrap())
    }

    #[tokio::test]
    async fn wildcard() {
        // Arrange
        let sut = make_sut(&["*"]);

        // Act
        let response = sut.oneshot(preflight("https://a.example")).await.unwrap();

        // Assert
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert!(headers
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .is_none());
    }

    #[tokio::test]
    async fn listed_origin() {
        // Arrange
        let sut = make_sut(&["https://a.example", "https://b.example"]);

        // Act
        let response = sut.oneshot(preflight("https://b.example")).await.unwrap();

        // Assert
        let headers = response.headers();
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://b.example"
        );
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "POST");
    }

    #[tokio::test]
    async fn unlisted_origin() {
        // Arrange
        let sut = make_sut(&["https://a.example"]);

        // Act
        let response = sut.oneshot(preflight("https://evil.example")).await.unwrap();

        // Assert
        assert!(response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none());
    }

    #[test]
    fn invalid_origin() {
        layer(&["https://a.example".into(), "bad\u{7f}origin".into()]).unwrap_err();
    }
}
