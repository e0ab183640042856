//! HTTP router configuration.

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware as axum_middleware, Router};
use nsbridge_core::error::ErrorCode;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::error::ApiError;
use crate::handlers::content_summary::{self, AppState};
use crate::handlers::health;
use crate::middleware::request_layer;

/// Create the bridge router.
///
/// Routes:
/// - `GET /contentSummary` and `GET /contentSummary/` - Summary of `/`
/// - `GET /contentSummary/{*path}` - Summary of `/{path}`
/// - `GET /health/live`, `GET /health/ready` - Probes
///
/// # Arguments
/// * `state` - Client factory and identity resolver shared by handlers
/// * `log_requests` - Whether to log HTTP requests
pub fn create_router(state: AppState, log_requests: bool) -> Router {
    let router = Router::new()
        .route("/contentSummary", get(content_summary::get_root_content_summary))
        .route("/contentSummary/", get(content_summary::get_root_content_summary))
        .route("/contentSummary/{*path}", get(content_summary::get_content_summary))
        .route("/health/live", get(health::health_live))
        .route("/health/ready", get(health::health_ready))
        .fallback(not_found)
        .with_state(state);

    let router = router.layer(axum_middleware::from_fn(request_layer));

    if log_requests {
        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO));
        router.layer(trace_layer)
    } else {
        router
    }
}

async fn not_found(request: Request) -> Response {
    ApiError::new(ErrorCode::NotFound, "No such endpoint")
        .with_resource(request.uri().path())
        .into_response()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::StatusCode;
    use nsbridge_core::client::MemoryNamespace;
    use nsbridge_core::config::IdentityConfig;
    use nsbridge_core::ContentSummary;
    use tower::ServiceExt;

    use super::*;
    use crate::identity::IdentityResolver;
    use crate::middleware::REQUEST_ID_HEADER;
    use crate::xml::{parse_summary_document, SummaryDocument};

    fn app_with(ns: MemoryNamespace, allow_anonymous: bool) -> Router {
        let config = IdentityConfig { allow_anonymous, ..IdentityConfig::default() };
        let identity = IdentityResolver::new(&config).unwrap();
        create_router(AppState::new(Arc::new(ns), identity), false)
    }

    fn app(ns: MemoryNamespace) -> Router {
        app_with(ns, true)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_root_summary() {
        let (status, headers, body) =
            get(app(MemoryNamespace::with_root()), "/contentSummary/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(headers["content-type"], "application/xml; charset=utf-8");
        assert!(headers.contains_key(REQUEST_ID_HEADER));
        assert_eq!(
            parse_summary_document(&body).unwrap(),
            SummaryDocument::Summary(ContentSummary::empty_directory())
        );
    }

    #[tokio::test]
    async fn test_bare_endpoint_is_root() {
        let (status, _, body) = get(app(MemoryNamespace::with_root()), "/contentSummary").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("directoryCount=\"1\""));
    }

    #[tokio::test]
    async fn test_nested_path() {
        let summary = ContentSummary {
            length: 10,
            file_count: 1,
            directory_count: 1,
            quota: 100,
            space_consumed: 30,
            space_quota: 1000,
        };
        let ns = MemoryNamespace::new().with_summary("/test/mkdirs", summary);
        let (_, _, body) = get(app(ns.clone()), "/contentSummary/test/mkdirs").await;

        assert_eq!(parse_summary_document(&body).unwrap(), SummaryDocument::Summary(summary));
        assert_eq!(ns.calls(), 1);
    }

    #[tokio::test]
    async fn test_percent_encoded_path_is_decoded() {
        let ns = MemoryNamespace::new()
            .with_summary("/dir with space", ContentSummary::empty_directory());
        let (_, _, body) = get(app(ns), "/contentSummary/dir%20with%20space").await;
        assert!(matches!(parse_summary_document(&body).unwrap(), SummaryDocument::Summary(_)));
    }

    #[tokio::test]
    async fn test_absent_path_is_empty_root() {
        let (status, _, body) = get(app(MemoryNamespace::new()), "/contentSummary/missing").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(parse_summary_document(&body).unwrap(), SummaryDocument::Empty);
    }

    #[tokio::test]
    async fn test_remote_failure_is_in_band() {
        let ns = MemoryNamespace::new().with_failure("/busy", "SafeModeException", "in safe mode");
        let (status, _, body) = get(app(ns), "/contentSummary/busy").await;

        assert_eq!(status, StatusCode::OK);
        let SummaryDocument::Fault(fault) = parse_summary_document(&body).unwrap() else {
            panic!("Expected fault document");
        };
        assert_eq!(fault.path, "/busy");
        assert_eq!(fault.class, "SafeModeException");
        assert_eq!(fault.message, "in safe mode");
    }

    #[tokio::test]
    async fn test_control_character_in_path_yields_well_formed_fault() {
        let ns = MemoryNamespace::new().with_failure(
            "/a\u{1}b",
            "FileNotFoundException",
            "File does not exist: /a\u{1}b",
        );
        let (status, _, body) = get(app(ns), "/contentSummary/a%01b").await;

        assert_eq!(status, StatusCode::OK);
        assert!(!body.contains('\u{1}'));
        let SummaryDocument::Fault(fault) = parse_summary_document(&body).unwrap() else {
            panic!("Expected fault document");
        };
        assert_eq!(fault.path, "/a\u{FFFD}b");
        assert_eq!(fault.message, "File does not exist: /a\u{FFFD}b");
    }

    #[tokio::test]
    async fn test_non_utf8_path_rejected() {
        let ns = MemoryNamespace::with_root();
        let (status, headers, body) = get(app(ns.clone()), "/contentSummary/%FF").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(headers["content-type"], "application/xml; charset=utf-8");
        assert!(body.contains("<Code>InvalidArgument</Code>"));
        assert_eq!(ns.calls(), 0);
    }

    #[tokio::test]
    async fn test_ugi_selects_identity() {
        let ns = MemoryNamespace::with_root().deny_user("mallory");
        let (_, _, body) = get(app(ns.clone()), "/contentSummary/?ugi=mallory,staff").await;
        assert!(matches!(parse_summary_document(&body).unwrap(), SummaryDocument::Fault(_)));

        let (_, _, body) = get(app(ns), "/contentSummary/?ugi=alice,staff").await;
        assert!(matches!(parse_summary_document(&body).unwrap(), SummaryDocument::Summary(_)));
    }

    #[tokio::test]
    async fn test_missing_identity_rejected() {
        let ns = MemoryNamespace::with_root();
        let (status, _, body) = get(app_with(ns.clone(), false), "/contentSummary/").await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("<Code>AccessDenied</Code>"));
        assert_eq!(ns.calls(), 0);
    }

    #[tokio::test]
    async fn test_empty_ugi_rejected() {
        let (status, _, body) =
            get(app(MemoryNamespace::with_root()), "/contentSummary/?ugi=").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("<Code>InvalidArgument</Code>"));
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, headers, body) = get(app(MemoryNamespace::new()), "/listStatus/x").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(headers.contains_key(REQUEST_ID_HEADER));
        assert!(body.contains("<Resource>/listStatus/x</Resource>"));
    }

    #[tokio::test]
    async fn test_health_probes() {
        let (status, _, _) = get(app(MemoryNamespace::new()), "/health/live").await;
        assert_eq!(status, StatusCode::OK);
        let (status, _, _) = get(app(MemoryNamespace::new()), "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
    }
}
