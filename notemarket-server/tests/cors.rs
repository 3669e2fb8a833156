use anyhow::Result;
use axum::body::Body;
use axum::http::{Method, Request, header};
use notemarket_server::build_router;
use notemarket_server::infra::config::{Config, ConfigOverrides, FileConfig};
use notemarket_server::infra::startup::build_state;
use tower::ServiceExt;

async fn router_with_origins(origins: &[&str]) -> Result<axum::Router> {
    let config = Config::resolve(
        FileConfig::default(),
        ConfigOverrides {
            jwt_secret: Some("cors-secret".into()),
            cors_origins: origins.iter().map(|o| o.to_string()).collect(),
            ..Default::default()
        },
    )?;
    Ok(build_router(build_state(config).await?))
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/documents")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "authorization,content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn configured_origins_are_allowed() -> Result<()> {
    let router = router_with_origins(&["https://notemarket.no"]).await?;

    let allowed = router.clone().oneshot(preflight("https://notemarket.no")).await?;
    assert_eq!(
        allowed.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&header::HeaderValue::from_static("https://notemarket.no"))
    );

    let denied = router.oneshot(preflight("https://evil.example")).await?;
    assert!(denied.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    Ok(())
}

#[tokio::test]
async fn no_origins_means_any_origin() -> Result<()> {
    let router = router_with_origins(&[]).await?;
    let response = router.oneshot(preflight("http://localhost:5173")).await?;
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN),
        Some(&header::HeaderValue::from_static("*"))
    );
    Ok(())
}
